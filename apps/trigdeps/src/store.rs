//! # Snapshot Store
//!
//! Reads and writes the dependency list snapshot file used by the CLI and,
//! optionally, by the HTTP server.

use std::path::Path;
use trigdeps_core::{DependencyList, TrigDepsError, list_from_bytes, list_to_bytes};

/// Maximum snapshot file size accepted on load (64 MB).
const MAX_STATE_FILE_SIZE: u64 = 64 * 1024 * 1024;

/// Load the list from `path`, or start empty if the file does not exist.
pub fn load_or_create_list(path: &Path) -> Result<DependencyList, TrigDepsError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No state file, starting with an empty list");
        return Ok(DependencyList::new());
    }

    let metadata = std::fs::metadata(path)
        .map_err(|e| TrigDepsError::IoError(format!("Cannot read file metadata: {}", e)))?;
    if metadata.len() > MAX_STATE_FILE_SIZE {
        return Err(TrigDepsError::SerializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_STATE_FILE_SIZE
        )));
    }

    let data = std::fs::read(path)
        .map_err(|e| TrigDepsError::IoError(format!("Read state: {}", e)))?;
    list_from_bytes(&data)
}

/// Write the list to `path`, replacing it atomically via a temporary sibling.
pub fn save_list(list: &DependencyList, path: &Path) -> Result<(), TrigDepsError> {
    let bytes = list_to_bytes(list)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = Path::new(&tmp);

    std::fs::write(tmp, &bytes)
        .map_err(|e| TrigDepsError::IoError(format!("Write state: {}", e)))?;
    std::fs::rename(tmp, path)
        .map_err(|e| TrigDepsError::IoError(format!("Replace state: {}", e)))?;

    tracing::debug!(path = %path.display(), rows = list.len(), "Saved state");
    Ok(())
}
