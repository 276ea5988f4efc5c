//! # Dependency List
//!
//! The ordered, identifier-unique collection of dependencies shown in the
//! trigger form.
//!
//! Rows live in a `Vec` in display order. Membership is answered by a
//! `BTreeMap` index keyed by trigger id that also holds the hidden form field
//! paired with each row. Both always contain exactly the same ids.

use crate::{Dependency, FormField, TrigDepsError, TriggerId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered dependency rows plus their paired form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyList {
    entries: Vec<Dependency>,
    fields: BTreeMap<TriggerId, FormField>,
}

impl DependencyList {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialise from the rows the page rendered.
    ///
    /// If the same id was rendered twice, the first row wins.
    pub fn from_rendered(rows: impl IntoIterator<Item = Dependency>) -> Self {
        let mut list = Self::new();
        for row in rows {
            list.push(row);
        }
        list
    }

    /// Append a row after the current last row.
    ///
    /// Returns `false` (and changes nothing) if the id is already present.
    pub fn push(&mut self, dependency: Dependency) -> bool {
        if self.fields.contains_key(&dependency.triggerid) {
            return false;
        }
        self.fields.insert(
            dependency.triggerid.clone(),
            FormField::for_trigger(&dependency.triggerid),
        );
        self.entries.push(dependency);
        true
    }

    /// Remove a row and its form field. Absent ids are a no-op.
    pub fn remove(&mut self, triggerid: &TriggerId) -> Option<Dependency> {
        self.fields.remove(triggerid)?;
        let position = self
            .entries
            .iter()
            .position(|d| &d.triggerid == triggerid)?;
        Some(self.entries.remove(position))
    }

    /// Check whether a trigger id is present.
    #[must_use]
    pub fn contains(&self, triggerid: &TriggerId) -> bool {
        self.fields.contains_key(triggerid)
    }

    /// Get a row by trigger id.
    #[must_use]
    pub fn get(&self, triggerid: &TriggerId) -> Option<&Dependency> {
        if !self.contains(triggerid) {
            return None;
        }
        self.entries.iter().find(|d| &d.triggerid == triggerid)
    }

    /// Get the form field paired with a row.
    #[must_use]
    pub fn field(&self, triggerid: &TriggerId) -> Option<&FormField> {
        self.fields.get(triggerid)
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the list has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate rows in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, Dependency> {
        self.entries.iter()
    }

    /// All rows in display order.
    #[must_use]
    pub fn entries(&self) -> &[Dependency] {
        &self.entries
    }

    /// Trigger ids in display order.
    #[must_use]
    pub fn ids(&self) -> Vec<TriggerId> {
        self.entries.iter().map(|d| d.triggerid.clone()).collect()
    }

    /// Form fields in display order.
    #[must_use]
    pub fn form_fields(&self) -> Vec<&FormField> {
        self.entries
            .iter()
            .filter_map(|d| self.fields.get(&d.triggerid))
            .collect()
    }

    /// `(name, value)` pairs as the containing form submits them.
    #[must_use]
    pub fn to_form_pairs(&self) -> Vec<(String, String)> {
        self.form_fields()
            .into_iter()
            .map(|f| (f.name.clone(), f.value.to_string()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a DependencyList {
    type Item = &'a Dependency;
    type IntoIter = std::slice::Iter<'a, Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// =============================================================================
// SERIALIZABLE LIST
// =============================================================================

/// Wire form of a `DependencyList`: the rows only.
///
/// Form fields are derived from the rows, so they are rebuilt on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableList {
    pub entries: Vec<Dependency>,
}

impl From<&DependencyList> for SerializableList {
    fn from(list: &DependencyList) -> Self {
        Self {
            entries: list.entries.clone(),
        }
    }
}

impl TryFrom<SerializableList> for DependencyList {
    type Error = TrigDepsError;

    /// Stored data must already be unique; a duplicate means corruption.
    fn try_from(stored: SerializableList) -> Result<Self, Self::Error> {
        let mut list = Self::new();
        for entry in stored.entries {
            let id = entry.triggerid.clone();
            if !list.push(entry) {
                return Err(TrigDepsError::SerializationError(format!(
                    "Duplicate trigger id in stored list: {}",
                    id
                )));
            }
        }
        Ok(list)
    }
}

// =============================================================================
// TESTS
// =============================================================================
