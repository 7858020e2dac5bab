pub mod protocol;

pub use protocol::{write_snapshot, EntityRecord, SnapshotHeader, BUFFER_TOTAL_FLOATS};
