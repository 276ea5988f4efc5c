//! # Configuration
//!
//! Loads `trigdeps.toml` and applies command-line overrides.
//!
//! ```toml
//! [links]
//! prototype_tag = "deptrigger_prototype"
//! prototype_edit_path = "trigger_prototypes.php"
//! plain_edit_path = "triggers.php"
//! parent_discoveryid = "42"
//!
//! [merge]
//! malformed = "ignore"   # or "reject"
//! ```
//!
//! Every key is optional. A missing default config file is not an error;
//! a missing file named explicitly with `--config` is.

use serde::{Deserialize, Serialize};
use std::path::Path;
use trigdeps_core::{DependencyMerger, LinkTemplates, MalformedPolicy, TrigDepsError, TriggerId};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "trigdeps.toml";

/// Maximum config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Merge behaviour settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeConfig {
    pub malformed: MalformedPolicy,
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub links: LinkTemplates,
    pub merge: MergeConfig,
}

impl AppConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, TrigDepsError> {
        let config: Self =
            toml::from_str(text).map_err(|e| TrigDepsError::InvalidConfig(e.to_string()))?;
        config.links.validate()?;
        Ok(config)
    }

    /// Load configuration.
    ///
    /// With `Some(path)` the file must exist. With `None`, `trigdeps.toml`
    /// is used if present and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, TrigDepsError> {
        let path = match path {
            Some(p) => p,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                default
            }
        };

        let metadata = std::fs::metadata(path).map_err(|e| {
            TrigDepsError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(TrigDepsError::InvalidConfig(format!(
                "Config file {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            TrigDepsError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Apply command-line overrides.
    pub fn with_overrides(
        mut self,
        parent_discoveryid: Option<&str>,
        strict: bool,
    ) -> Result<Self, TrigDepsError> {
        if let Some(raw) = parent_discoveryid {
            self.links.parent_discoveryid = Some(TriggerId::parse(raw)?);
        }
        if strict {
            self.merge.malformed = MalformedPolicy::Reject;
        }
        Ok(self)
    }

    /// Build the merge engine for this configuration.
    #[must_use]
    pub fn merger(&self) -> DependencyMerger {
        DependencyMerger::new(self.links.clone())
    }
}

// =============================================================================
// TESTS
// =============================================================================
