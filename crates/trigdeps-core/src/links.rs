//! # Link Templates
//!
//! Builds the edit link stored on every appended dependency.
//!
//! The two shapes are a fixed contract with the frontend:
//!
//! ```text
//! <prototype-edit-path>?form=update&parent_discoveryid=<context-id>&triggerid=<id>
//! <plain-edit-path>?form=update&triggerid=<id>
//! ```

use crate::primitives::{PLAIN_EDIT_PATH, PROTOTYPE_EDIT_PATH, PROTOTYPE_TAG};
use crate::{TrigDepsError, TriggerId, Variant};
use serde::{Deserialize, Serialize};

/// Reference templates and the context they are evaluated in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkTemplates {
    /// Batch tag that selects the prototype template.
    pub prototype_tag: String,
    pub prototype_edit_path: String,
    pub plain_edit_path: String,
    /// Discovery rule owning the prototypes being edited, if any.
    pub parent_discoveryid: Option<TriggerId>,
}

impl Default for LinkTemplates {
    fn default() -> Self {
        Self {
            prototype_tag: PROTOTYPE_TAG.to_string(),
            prototype_edit_path: PROTOTYPE_EDIT_PATH.to_string(),
            plain_edit_path: PLAIN_EDIT_PATH.to_string(),
            parent_discoveryid: None,
        }
    }
}

impl LinkTemplates {
    /// Create templates with default paths and the given discovery rule context.
    #[must_use]
    pub fn with_context(parent_discoveryid: TriggerId) -> Self {
        Self {
            parent_discoveryid: Some(parent_discoveryid),
            ..Self::default()
        }
    }

    /// Classify a batch tag against the configured prototype tag.
    #[must_use]
    pub fn variant_of(&self, tag: &str) -> Variant {
        Variant::from_tag(tag, &self.prototype_tag)
    }

    /// Check that links of `variant` can be built at all.
    pub fn ensure_supported(&self, variant: Variant) -> Result<(), TrigDepsError> {
        match (variant, &self.parent_discoveryid) {
            (Variant::Prototype, None) => Err(TrigDepsError::MissingContext),
            _ => Ok(()),
        }
    }

    /// Build the edit link for a trigger.
    pub fn reference(
        &self,
        variant: Variant,
        triggerid: &TriggerId,
    ) -> Result<String, TrigDepsError> {
        match variant {
            Variant::Prototype => {
                let parent = self
                    .parent_discoveryid
                    .as_ref()
                    .ok_or(TrigDepsError::MissingContext)?;
                Ok(format!(
                    "{}?form=update&parent_discoveryid={}&triggerid={}",
                    self.prototype_edit_path, parent, triggerid
                ))
            }
            Variant::Plain => Ok(format!(
                "{}?form=update&triggerid={}",
                self.plain_edit_path, triggerid
            )),
        }
    }

    /// Reject templates that cannot produce a usable link.
    pub fn validate(&self) -> Result<(), TrigDepsError> {
        if self.prototype_tag.is_empty() {
            return Err(TrigDepsError::InvalidConfig(
                "prototype_tag must not be empty".to_string(),
            ));
        }
        for (key, path) in [
            ("prototype_edit_path", &self.prototype_edit_path),
            ("plain_edit_path", &self.plain_edit_path),
        ] {
            if path.is_empty() || path.contains(['?', '#', '&']) {
                return Err(TrigDepsError::InvalidConfig(format!(
                    "{} must be a bare path, got {:?}",
                    key, path
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prototype_reference_is_bit_exact() {
        let links = LinkTemplates::with_context(TriggerId::from(42));
        let url = links
            .reference(Variant::Prototype, &TriggerId::from(7))
            .expect("reference");
        assert_eq!(
            url,
            "trigger_prototypes.php?form=update&parent_discoveryid=42&triggerid=7"
        );
    }

    #[test]
    fn plain_reference_is_bit_exact() {
        let links = LinkTemplates::default();
        let url = links
            .reference(Variant::Plain, &TriggerId::from(7))
            .expect("reference");
        assert_eq!(url, "triggers.php?form=update&triggerid=7");
    }

    #[test]
    fn plain_reference_ignores_context() {
        let links = LinkTemplates::with_context(TriggerId::from(42));
        let url = links
            .reference(Variant::Plain, &TriggerId::from(7))
            .expect("reference");
        assert_eq!(url, "triggers.php?form=update&triggerid=7");
    }

    #[test]
    fn prototype_without_context_fails() {
        let links = LinkTemplates::default();
        assert!(matches!(
            links.reference(Variant::Prototype, &TriggerId::from(7)),
            Err(TrigDepsError::MissingContext)
        ));
        assert!(links.ensure_supported(Variant::Plain).is_ok());
    }

    #[test]
    fn validate_rejects_query_in_path() {
        let links = LinkTemplates {
            plain_edit_path: "triggers.php?x=1".to_string(),
            ..LinkTemplates::default()
        };
        assert!(links.validate().is_err());
        assert!(LinkTemplates::default().validate().is_ok());
    }
}
