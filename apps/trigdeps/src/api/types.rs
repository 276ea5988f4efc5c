//! # API Request/Response Types
//!
//! JSON structures for the HTTP API.

use serde::{Deserialize, Serialize};
use trigdeps_core::{Dependency, DependencyList, RenderedRow};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// LIST RESPONSE
// =============================================================================

/// Current dependency list, in display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub count: usize,
    pub dependencies: Vec<Dependency>,
}

impl From<&DependencyList> for ListResponse {
    fn from(list: &DependencyList) -> Self {
        Self {
            count: list.len(),
            dependencies: list.entries().to_vec(),
        }
    }
}

// =============================================================================
// POPUP RESPONSE
// =============================================================================

/// Result of posting a popup batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopupResponse {
    pub success: bool,
    /// Rows appended by this batch, rendered for insertion after the last row.
    pub appended: Vec<RenderedRow>,
    /// Rows in the list after the merge.
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PopupResponse {
    /// Create a success response.
    #[must_use]
    pub fn success(appended: Vec<RenderedRow>, total: usize) -> Self {
        Self {
            success: true,
            appended,
            total,
            error: None,
        }
    }

    /// Create an error response.
    #[must_use]
    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            appended: Vec::new(),
            total: 0,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// REMOVE REQUEST/RESPONSE
// =============================================================================

/// Request to drop one dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveRequest {
    pub triggerid: String,
}

/// Result of a removal. `removed` is false when the id was not listed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveResponse {
    pub success: bool,
    pub removed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RemoveResponse {
    /// Create a success response.
    #[must_use]
    pub fn success(removed: bool) -> Self {
        Self {
            success: true,
            removed,
            error: None,
        }
    }

    /// Create an error response.
    #[must_use]
    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            removed: false,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// FORM RESPONSE
// =============================================================================

/// One submitted form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldJson {
    pub name: String,
    pub value: String,
}

/// What the containing form submits for the dependency list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormResponse {
    pub fields: Vec<FieldJson>,
    /// `application/x-www-form-urlencoded` body fragment.
    pub encoded: String,
}

impl From<&DependencyList> for FormResponse {
    fn from(list: &DependencyList) -> Self {
        let pairs = list.to_form_pairs();
        Self {
            encoded: encode_form(&pairs),
            fields: pairs
                .into_iter()
                .map(|(name, value)| FieldJson { name, value })
                .collect(),
        }
    }
}

/// Encode `(name, value)` pairs as an `application/x-www-form-urlencoded` body.
pub fn encode_form(pairs: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}
