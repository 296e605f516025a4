// crates/db/src/queries/mod.rs
// Position reads and writes for the tracking_data table.

mod positions;

pub use positions::PositionRow;
