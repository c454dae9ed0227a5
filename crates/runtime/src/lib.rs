//! Cooperative event-loop primitives shared by the browser controllers.
//!
//! Everything here is single-threaded and clock-free: hosts own timers and
//! sockets, controllers own tickets.

pub mod debounce;
pub mod slot;
pub mod ticket;

pub use debounce::*;
pub use slot::*;
pub use ticket::*;
