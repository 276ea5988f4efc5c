//! # Snapshot Format
//!
//! Binary serialization for dependency lists.
//!
//! Format: Header (5 bytes) + postcard-serialized rows.
//! - 4 bytes: Magic ("TDEP")
//! - 1 byte: Version
//!
//! Size and header are checked before the payload is decoded.

use crate::list::{DependencyList, SerializableList};
use crate::{TrigDepsError, primitives};

/// Maximum accepted snapshot size.
pub const MAX_SNAPSHOT_PAYLOAD_SIZE: usize = 64 * 1024 * 1024; // 64 MB

/// Header length in bytes.
const HEADER_SIZE: usize = 5;

// =============================================================================
// HEADER
// =============================================================================

/// The snapshot header precedes the encoded rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl SnapshotHeader {
    /// Create a header with the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *primitives::MAGIC_BYTES,
            version: primitives::FORMAT_VERSION,
        }
    }

    /// Validate magic and version.
    pub fn validate(&self) -> Result<(), TrigDepsError> {
        if &self.magic != primitives::MAGIC_BYTES {
            return Err(TrigDepsError::SerializationError(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != primitives::FORMAT_VERSION {
            return Err(TrigDepsError::SerializationError(format!(
                "Unsupported version: {} (expected {})",
                self.version,
                primitives::FORMAT_VERSION
            )));
        }
        Ok(())
    }

    /// Write header to bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    /// Read header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TrigDepsError> {
        let Some(header) = bytes.get(..HEADER_SIZE) else {
            return Err(TrigDepsError::SerializationError(
                "Header too short".to_string(),
            ));
        };
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&header[0..4]);
        Ok(Self {
            magic,
            version: header[4],
        })
    }
}

impl Default for SnapshotHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// BINARY
// =============================================================================

/// Serialize a list to bytes (header + payload).
pub fn list_to_bytes(list: &DependencyList) -> Result<Vec<u8>, TrigDepsError> {
    let payload = postcard::to_stdvec(&SerializableList::from(list))
        .map_err(|e| TrigDepsError::SerializationError(e.to_string()))?;

    let mut result = Vec::with_capacity(HEADER_SIZE + payload.len());
    result.extend_from_slice(&SnapshotHeader::new().to_bytes());
    result.extend_from_slice(&payload);
    Ok(result)
}

/// Deserialize a list from bytes.
///
/// Rejects oversized input, bad headers, undecodable payloads and stored
/// lists that contain the same trigger twice.
pub fn list_from_bytes(bytes: &[u8]) -> Result<DependencyList, TrigDepsError> {
    if bytes.len() > MAX_SNAPSHOT_PAYLOAD_SIZE {
        return Err(TrigDepsError::SerializationError(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_SNAPSHOT_PAYLOAD_SIZE
        )));
    }

    let header = SnapshotHeader::from_bytes(bytes)?;
    header.validate()?;

    let stored: SerializableList = postcard::from_bytes(&bytes[HEADER_SIZE..]).map_err(|e| {
        TrigDepsError::SerializationError(format!("Failed to decode snapshot: {}", e))
    })?;

    DependencyList::try_from(stored)
}

// =============================================================================
// JSON
// =============================================================================

/// Serialize a list to pretty JSON (`{"entries": [...]}`).
pub fn list_to_json(list: &DependencyList) -> Result<String, TrigDepsError> {
    serde_json::to_string_pretty(&SerializableList::from(list))
        .map_err(|e| TrigDepsError::SerializationError(e.to_string()))
}

/// Deserialize a list from JSON produced by `list_to_json`.
pub fn list_from_json(text: &str) -> Result<DependencyList, TrigDepsError> {
    let stored: SerializableList = serde_json::from_str(text)
        .map_err(|e| TrigDepsError::SerializationError(e.to_string()))?;
    DependencyList::try_from(stored)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dependency, TriggerId};

    fn sample() -> DependencyList {
        DependencyList::from_rendered(vec![
            Dependency::new(TriggerId::from(9), "B", "triggers.php?form=update&triggerid=9"),
            Dependency::new(TriggerId::from(3), "A", "triggers.php?form=update&triggerid=3"),
        ])
    }

    #[test]
    fn bytes_preserve_order_and_fields() {
        let list = sample();
        let restored = list_from_bytes(&list_to_bytes(&list).expect("encode")).expect("decode");

        assert_eq!(restored, list);
        assert_eq!(restored.ids(), vec![TriggerId::from(9), TriggerId::from(3)]);
        assert!(restored.field(&TriggerId::from(3)).is_some());
    }

    #[test]
    fn invalid_magic_rejected() {
        let mut bytes = list_to_bytes(&sample()).expect("encode");
        bytes[0..4].copy_from_slice(b"XXXX");
        assert!(list_from_bytes(&bytes).is_err());
    }

    #[test]
    fn future_version_rejected() {
        let mut bytes = list_to_bytes(&sample()).expect("encode");
        bytes[4] = primitives::FORMAT_VERSION + 1;
        assert!(list_from_bytes(&bytes).is_err());
    }

    #[test]
    fn short_input_rejected() {
        assert!(list_from_bytes(b"TDE").is_err());
    }

    #[test]
    fn oversized_input_rejected_before_decode() {
        let mut bytes = list_to_bytes(&sample()).expect("encode");
        bytes.resize(MAX_SNAPSHOT_PAYLOAD_SIZE + 1, 0);

        let err = list_from_bytes(&bytes).expect_err("oversized");
        assert!(matches!(err, TrigDepsError::SerializationError(ref msg) if msg.contains("exceeds")));
    }

    #[test]
    fn json_preserves_order_and_fields() {
        let list = sample();
        let text = list_to_json(&list).expect("encode");

        assert!(text.contains("\"triggerid\": \"9\""));
        let restored = list_from_json(&text).expect("decode");
        assert_eq!(restored, list);
        assert_eq!(restored.ids(), vec![TriggerId::from(9), TriggerId::from(3)]);
    }

    #[test]
    fn json_rejects_duplicates() {
        let text = r#"{"entries":[
            {"triggerid":"1","name":"A","url":"triggers.php?form=update&triggerid=1"},
            {"triggerid":"1","name":"A","url":"triggers.php?form=update&triggerid=1"}
        ]}"#;
        assert!(list_from_json(text).is_err());
    }

    #[test]
    fn json_rejects_invalid_ids() {
        let text = r#"{"entries":[{"triggerid":"abc","name":"x","url":"u"}]}"#;
        assert!(list_from_json(text).is_err());
    }
}
