//! # Formats
//!
//! Serialization formats for dependency lists. Pure transformations only;
//! file I/O lives in the app layer.

pub mod snapshot;

pub use snapshot::{
    MAX_SNAPSHOT_PAYLOAD_SIZE, SnapshotHeader, list_from_bytes, list_from_json, list_to_bytes,
    list_to_json,
};
