//! # Dependency Merger
//!
//! Merges batches of candidate triggers into a `DependencyList`.
//!
//! - A batch is validated as a whole before the list is touched
//! - Candidates whose id is already listed are skipped
//! - New rows go after the current last row, in batch order
//! - Each appended row gets its edit link from `LinkTemplates`
//!
//! Re-submitting the same batch is therefore a no-op.

use crate::links::LinkTemplates;
use crate::list::DependencyList;
use crate::primitives::{MAX_BATCH_LENGTH, MAX_NAME_LENGTH};
use crate::{Batch, Dependency, TrigDepsError, TriggerId, Variant};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// OUTCOMES & POLICY
// =============================================================================

/// Result of feeding a raw popup payload to the merger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The payload was not a batch (no `object` or no `values`); nothing happened.
    Ignored,
    /// The batch was merged; holds the rows actually appended.
    Merged(Vec<Dependency>),
    /// The batch was malformed and dropped under `MalformedPolicy::Ignore`.
    Dropped(String),
}

impl MergeOutcome {
    /// Rows appended, empty when ignored.
    #[must_use]
    pub fn into_appended(self) -> Vec<Dependency> {
        match self {
            Self::Ignored | Self::Dropped(_) => Vec::new(),
            Self::Merged(appended) => appended,
        }
    }
}

/// What to do with a payload that looks like a batch but is malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Drop the batch and report nothing appended.
    #[default]
    Ignore,
    /// Return the `InvalidBatch` error to the caller.
    Reject,
}

// =============================================================================
// MERGER
// =============================================================================

/// Stateless merge engine; the list it operates on is always passed in.
#[derive(Debug, Clone, Default)]
pub struct DependencyMerger {
    links: LinkTemplates,
}

impl DependencyMerger {
    /// Create a merger using the given link templates.
    #[must_use]
    pub fn new(links: LinkTemplates) -> Self {
        Self { links }
    }

    /// Validate a batch without touching any list.
    ///
    /// Returns the batch variant and the parsed ids in batch order.
    ///
    /// # Errors
    /// - `InvalidBatch` if the batch is too long, a descriptor has no id,
    ///   an id is not numeric, or a name is too long
    /// - `MissingContext` for a prototype batch without a parent discovery rule
    pub fn validate(&self, batch: &Batch) -> Result<(Variant, Vec<TriggerId>), TrigDepsError> {
        if batch.values.len() > MAX_BATCH_LENGTH {
            return Err(TrigDepsError::InvalidBatch(format!(
                "{} values exceeds maximum of {}",
                batch.values.len(),
                MAX_BATCH_LENGTH
            )));
        }

        let variant = self.links.variant_of(&batch.object);
        self.links.ensure_supported(variant)?;

        let mut ids = Vec::with_capacity(batch.values.len());
        for (index, descriptor) in batch.values.iter().enumerate() {
            let raw = descriptor.triggerid.as_deref().ok_or_else(|| {
                TrigDepsError::InvalidBatch(format!("value {} has no triggerid", index))
            })?;
            let id = TriggerId::parse(raw).map_err(|_| {
                TrigDepsError::InvalidBatch(format!("value {} has invalid triggerid {:?}", index, raw))
            })?;
            if descriptor.name.len() > MAX_NAME_LENGTH {
                return Err(TrigDepsError::InvalidBatch(format!(
                    "value {} name exceeds {} bytes",
                    index, MAX_NAME_LENGTH
                )));
            }
            ids.push(id);
        }

        Ok((variant, ids))
    }

    /// Merge a batch into the list.
    ///
    /// Returns the rows that were appended, in batch order. On error the list
    /// is left unchanged.
    pub fn merge(
        &self,
        list: &mut DependencyList,
        batch: &Batch,
    ) -> Result<Vec<Dependency>, TrigDepsError> {
        let (variant, ids) = self.validate(batch)?;

        let mut appended = Vec::new();
        for (id, descriptor) in ids.into_iter().zip(&batch.values) {
            if list.contains(&id) {
                continue;
            }
            let url = self.links.reference(variant, &id)?;
            let dependency = Dependency::new(id, descriptor.name.clone(), url);
            if list.push(dependency.clone()) {
                appended.push(dependency);
            }
        }

        Ok(appended)
    }

    /// Merge a raw popup payload (`{"object": ..., "values": [...]}`).
    ///
    /// A payload missing `object` or `values` is not a batch and yields
    /// `MergeOutcome::Ignored`. A payload that has both keys but the wrong
    /// shape is `InvalidBatch`.
    pub fn merge_payload(
        &self,
        list: &mut DependencyList,
        payload: &Value,
    ) -> Result<MergeOutcome, TrigDepsError> {
        let Some(fields) = payload.as_object() else {
            return Ok(MergeOutcome::Ignored);
        };
        if !fields.contains_key("object") || !fields.contains_key("values") {
            return Ok(MergeOutcome::Ignored);
        }

        let batch: Batch = serde_json::from_value(payload.clone())
            .map_err(|e| TrigDepsError::InvalidBatch(e.to_string()))?;

        self.merge(list, &batch).map(MergeOutcome::Merged)
    }

    /// Merge a raw payload, applying `policy` to malformed batches.
    ///
    /// With `MalformedPolicy::Ignore` an invalid batch leaves the list
    /// unchanged and yields `MergeOutcome::Dropped` with the reason.
    /// `MissingContext` is a configuration problem and is returned under
    /// either policy.
    pub fn apply(
        &self,
        list: &mut DependencyList,
        payload: &Value,
        policy: MalformedPolicy,
    ) -> Result<MergeOutcome, TrigDepsError> {
        match self.merge_payload(list, payload) {
            Err(TrigDepsError::InvalidBatch(reason)) if policy == MalformedPolicy::Ignore => {
                Ok(MergeOutcome::Dropped(reason))
            }
            other => other,
        }
    }

    /// Remove a dependency and its form field. Absent ids are a no-op.
    pub fn remove(&self, list: &mut DependencyList, triggerid: &TriggerId) -> Option<Dependency> {
        list.remove(triggerid)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Descriptor;
    use crate::primitives::{PLAIN_TAG, PROTOTYPE_TAG};
    use serde_json::json;

    fn plain_batch(values: &[(u64, &str)]) -> Batch {
        Batch::new(
            PLAIN_TAG,
            values
                .iter()
                .map(|(id, name)| Descriptor::new(id.to_string(), *name))
                .collect(),
        )
    }

    #[test]
    fn merge_appends_only_new_ids() {
        let merger = DependencyMerger::default();
        let mut list = DependencyList::new();
        merger
            .merge(&mut list, &plain_batch(&[(1, "A")]))
            .expect("first");

        let appended = merger
            .merge(&mut list, &plain_batch(&[(1, "A"), (2, "B")]))
            .expect("second");

        assert_eq!(appended.len(), 1);
        assert_eq!(appended[0].triggerid, TriggerId::from(2));
        assert_eq!(appended[0].url, "triggers.php?form=update&triggerid=2");
        assert_eq!(list.ids(), vec![TriggerId::from(1), TriggerId::from(2)]);
    }

    #[test]
    fn merge_skips_duplicates_within_one_batch() {
        let merger = DependencyMerger::default();
        let mut list = DependencyList::new();

        let appended = merger
            .merge(&mut list, &plain_batch(&[(5, "X"), (5, "X again")]))
            .expect("merge");

        assert_eq!(appended.len(), 1);
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(&TriggerId::from(5)).expect("row").name, "X");
    }

    #[test]
    fn merge_prototype_uses_context() {
        let merger = DependencyMerger::new(LinkTemplates::with_context(TriggerId::from(42)));
        let mut list = DependencyList::new();
        let batch = Batch::new(PROTOTYPE_TAG, vec![Descriptor::new("7", "proto")]);

        let appended = merger.merge(&mut list, &batch).expect("merge");

        assert_eq!(
            appended[0].url,
            "trigger_prototypes.php?form=update&parent_discoveryid=42&triggerid=7"
        );
    }

    #[test]
    fn merge_prototype_without_context_leaves_list_unchanged() {
        let merger = DependencyMerger::default();
        let mut list = DependencyList::new();
        let batch = Batch::new(PROTOTYPE_TAG, vec![Descriptor::new("7", "proto")]);

        let result = merger.merge(&mut list, &batch);

        assert!(matches!(result, Err(TrigDepsError::MissingContext)));
        assert!(list.is_empty());
    }

    #[test]
    fn invalid_descriptor_aborts_whole_batch() {
        let merger = DependencyMerger::default();
        let mut list = DependencyList::new();
        let batch = Batch::new(
            PLAIN_TAG,
            vec![Descriptor::new("1", "ok"), Descriptor::without_id("NoId")],
        );

        let result = merger.merge(&mut list, &batch);

        assert!(matches!(result, Err(TrigDepsError::InvalidBatch(_))));
        assert!(list.is_empty());
    }

    #[test]
    fn batch_over_length_limit_rejected() {
        let merger = DependencyMerger::default();
        let mut list = DependencyList::new();
        merger
            .merge(&mut list, &plain_batch(&[(1, "A")]))
            .expect("seed");
        let before = list.clone();
        let values = (0..=MAX_BATCH_LENGTH)
            .map(|i| Descriptor::new((i + 100).to_string(), "x"))
            .collect::<Vec<_>>();
        assert_eq!(values.len(), MAX_BATCH_LENGTH + 1);

        let result = merger.merge(&mut list, &Batch::new(PLAIN_TAG, values));

        assert!(matches!(result, Err(TrigDepsError::InvalidBatch(_))));
        assert_eq!(list, before);
    }

    #[test]
    fn name_length_limit() {
        let merger = DependencyMerger::default();
        let mut list = DependencyList::new();

        let too_long = Batch::new(
            PLAIN_TAG,
            vec![Descriptor::new("1", "n".repeat(MAX_NAME_LENGTH + 1))],
        );
        assert!(matches!(
            merger.merge(&mut list, &too_long),
            Err(TrigDepsError::InvalidBatch(_))
        ));
        assert!(list.is_empty());

        let at_limit = Batch::new(
            PLAIN_TAG,
            vec![Descriptor::new("1", "n".repeat(MAX_NAME_LENGTH))],
        );
        let appended = merger.merge(&mut list, &at_limit).expect("at limit");
        assert_eq!(appended[0].name.len(), MAX_NAME_LENGTH);
    }

    #[test]
    fn non_numeric_id_is_invalid_batch() {
        let merger = DependencyMerger::default();
        let mut list = DependencyList::new();
        let batch = Batch::new(PLAIN_TAG, vec![Descriptor::new("abc", "bad")]);

        assert!(matches!(
            merger.merge(&mut list, &batch),
            Err(TrigDepsError::InvalidBatch(_))
        ));
    }

    #[test]
    fn empty_batch_is_noop() {
        let merger = DependencyMerger::default();
        let mut list = DependencyList::new();

        let appended = merger.merge(&mut list, &plain_batch(&[])).expect("merge");
        assert!(appended.is_empty());
        assert!(list.is_empty());
    }

    #[test]
    fn payload_without_object_is_ignored() {
        let merger = DependencyMerger::default();
        let mut list = DependencyList::new();

        let outcome = merger
            .merge_payload(&mut list, &json!({"values": [{"triggerid": "1", "name": "A"}]}))
            .expect("payload");
        assert_eq!(outcome, MergeOutcome::Ignored);

        let outcome = merger
            .merge_payload(&mut list, &json!("not an object"))
            .expect("payload");
        assert_eq!(outcome, MergeOutcome::Ignored);
        assert!(list.is_empty());
    }

    #[test]
    fn payload_with_wrong_shape_is_invalid() {
        let merger = DependencyMerger::default();
        let mut list = DependencyList::new();

        let result = merger.merge_payload(&mut list, &json!({"object": "deptrigger", "values": 3}));
        assert!(matches!(result, Err(TrigDepsError::InvalidBatch(_))));
    }

    #[test]
    fn apply_ignore_policy_swallows_invalid_batch() {
        let merger = DependencyMerger::default();
        let mut list = DependencyList::new();
        let payload = json!({"object": "deptrigger", "values": [{"name": "NoId"}]});

        let outcome = merger
            .apply(&mut list, &payload, MalformedPolicy::Ignore)
            .expect("ignored");
        assert!(matches!(outcome, MergeOutcome::Dropped(_)));
        assert!(outcome.into_appended().is_empty());

        let rejected = merger.apply(&mut list, &payload, MalformedPolicy::Reject);
        assert!(matches!(rejected, Err(TrigDepsError::InvalidBatch(_))));
        assert!(list.is_empty());
    }

    #[test]
    fn apply_surfaces_missing_context_under_ignore() {
        let merger = DependencyMerger::default();
        let mut list = DependencyList::new();
        let payload = json!({"object": PROTOTYPE_TAG, "values": [{"triggerid": "7", "name": "P"}]});

        let result = merger.apply(&mut list, &payload, MalformedPolicy::Ignore);
        assert!(matches!(result, Err(TrigDepsError::MissingContext)));
    }

    #[test]
    fn remove_is_idempotent() {
        let merger = DependencyMerger::default();
        let mut list = DependencyList::new();
        merger
            .merge(&mut list, &plain_batch(&[(1, "A"), (2, "B")]))
            .expect("merge");

        assert!(merger.remove(&mut list, &TriggerId::from(1)).is_some());
        let once = list.clone();
        assert!(merger.remove(&mut list, &TriggerId::from(1)).is_none());
        assert_eq!(list, once);
    }
}
