// crates/core/src/lib.rs
//! Domain types for the truck tracker: position records, motion status,
//! filters and the GeoJSON snapshot pushed to clients.

pub mod error;
pub mod filter;
pub mod position;
pub mod snapshot;
pub mod status;

pub use error::*;
pub use filter::*;
pub use position::*;
pub use snapshot::*;
pub use status::*;
