//! `wasm32` host: DOM, fetch, timers and the map provider behind the
//! controller ports, plus the functions the page script calls.

mod exports;
mod host;
mod logging;
mod maps;

pub use exports::*;
pub use host::BrowserHost;
