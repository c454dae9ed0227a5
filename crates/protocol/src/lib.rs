//! Wire contract between the browser controllers and the ajax backend.
//!
//! - [`Endpoint`] builds request URLs for every `/ajax/*` route.
//! - [`wire`] holds the JSON payloads, shared by both sides.
//! - [`TransferGroups`] keeps route groups in response key order.

pub mod endpoint;
pub mod error;
pub mod groups;
pub mod wire;

pub use endpoint::*;
pub use error::*;
pub use groups::*;
pub use wire::*;
