//! # Core Type Definitions
//!
//! This module contains the core types of the dependency list engine:
//! - Identifiers (`TriggerId`) and link variants (`Variant`)
//! - Batch input (`Batch`, `Descriptor`)
//! - Collection members (`Dependency`, `FormField`)
//! - Error types (`TrigDepsError`)
//!
//! `TriggerId` implements `Ord` so it can key `BTreeMap`/`BTreeSet`
//! deterministically.

use crate::primitives::{FIELD_ID_PREFIX, FORM_FIELD_NAME, MAX_TRIGGER_ID_LENGTH};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// TRIGGER IDENTIFIER
// =============================================================================

/// Identifier of a trigger (or trigger prototype).
///
/// Always a non-empty string of ASCII decimal digits. It is kept as text so
/// that links are built from exactly the digits that were submitted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TriggerId(String);

impl TriggerId {
    /// Parse and validate a trigger id.
    pub fn parse(raw: impl Into<String>) -> Result<Self, TrigDepsError> {
        let raw = raw.into();
        if raw.is_empty()
            || raw.len() > MAX_TRIGGER_ID_LENGTH
            || !raw.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(TrigDepsError::InvalidTriggerId(raw));
        }
        Ok(Self(raw))
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for TriggerId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl TryFrom<String> for TriggerId {
    type Error = TrigDepsError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(raw)
    }
}

impl From<TriggerId> for String {
    fn from(id: TriggerId) -> Self {
        id.0
    }
}

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

// =============================================================================
// VARIANT
// =============================================================================

/// Which edit page a dependency links to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// A regular trigger.
    Plain,
    /// A trigger prototype belonging to a discovery rule.
    Prototype,
}

impl Variant {
    /// Classify a batch tag. Only an exact match of `prototype_tag` is a prototype.
    #[must_use]
    pub fn from_tag(tag: &str, prototype_tag: &str) -> Self {
        if tag == prototype_tag {
            Self::Prototype
        } else {
            Self::Plain
        }
    }
}

// =============================================================================
// BATCH INPUT
// =============================================================================

/// Trigger ids arrive either as JSON strings or as JSON numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTriggerId {
    Text(String),
    Number(u64),
}

fn deserialize_raw_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<RawTriggerId>::deserialize(deserializer)?.map(|raw| match raw {
            RawTriggerId::Text(s) => s,
            RawTriggerId::Number(n) => n.to_string(),
        }),
    )
}

/// A raw candidate as delivered by the selection popup.
///
/// The id is unvalidated; `DependencyMerger::merge` rejects the whole batch
/// if any descriptor lacks a usable id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    #[serde(default, deserialize_with = "deserialize_raw_id")]
    pub triggerid: Option<String>,
    #[serde(default)]
    pub name: String,
}

impl Descriptor {
    /// Create a descriptor with an id.
    #[must_use]
    pub fn new(triggerid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            triggerid: Some(triggerid.into()),
            name: name.into(),
        }
    }

    /// Create a descriptor that carries only a name.
    #[must_use]
    pub fn without_id(name: impl Into<String>) -> Self {
        Self {
            triggerid: None,
            name: name.into(),
        }
    }
}

/// A set of candidates submitted together.
///
/// `object` is the variant tag; `values` keeps submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub object: String,
    #[serde(default)]
    pub values: Vec<Descriptor>,
}

impl Batch {
    /// Create a batch.
    #[must_use]
    pub fn new(object: impl Into<String>, values: Vec<Descriptor>) -> Self {
        Self {
            object: object.into(),
            values,
        }
    }
}

// =============================================================================
// DEPENDENCY
// =============================================================================

/// A single row of the dependency list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub triggerid: TriggerId,
    pub name: String,
    /// Edit link, relative to the frontend root.
    pub url: String,
}

impl Dependency {
    /// Create a dependency.
    #[must_use]
    pub fn new(triggerid: TriggerId, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            triggerid,
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Hidden form input submitted alongside each row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    /// Element id, `dependencies_<triggerid>`.
    pub id: String,
    pub name: String,
    pub value: TriggerId,
}

impl FormField {
    /// Build the field paired with a trigger id.
    #[must_use]
    pub fn for_trigger(triggerid: &TriggerId) -> Self {
        Self {
            id: format!("{}{}", FIELD_ID_PREFIX, triggerid),
            name: FORM_FIELD_NAME.to_string(),
            value: triggerid.clone(),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the trigdeps system.
///
/// Duplicate ids, empty batches and removal of absent ids are not errors.
#[derive(Debug, Error)]
pub enum TrigDepsError {
    /// The batch payload does not have the expected shape.
    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    /// A trigger id is empty, too long or not numeric.
    #[error("Invalid trigger id: {0:?}")]
    InvalidTriggerId(String),

    /// A prototype link was requested without a parent discovery rule id.
    #[error("Prototype link requires a parent discovery rule id")]
    MissingContext,

    /// Configuration could not be parsed or is inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
