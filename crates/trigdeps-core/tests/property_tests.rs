//! # Property-Based Tests
//!
//! Invariants of merge and remove, checked with proptest.

use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::BTreeSet;
use trigdeps_core::{
    Batch, Dependency, DependencyList, DependencyMerger, Descriptor, LinkTemplates, TriggerId,
    primitives::{PLAIN_TAG, PROTOTYPE_TAG},
};

// =============================================================================
// HELPERS
// =============================================================================

fn merger() -> DependencyMerger {
    DependencyMerger::new(LinkTemplates::with_context(TriggerId::from(42)))
}

fn batch(tag: &str, ids: &[u64]) -> Batch {
    Batch::new(
        tag,
        ids.iter()
            .map(|id| Descriptor::new(id.to_string(), format!("trigger {}", id)))
            .collect(),
    )
}

fn seeded(ids: &[u64]) -> DependencyList {
    DependencyList::from_rendered(ids.iter().map(|id| {
        Dependency::new(
            TriggerId::from(*id),
            format!("rendered {}", id),
            format!("triggers.php?form=update&triggerid={}", id),
        )
    }))
}

fn tag_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just(PLAIN_TAG), Just(PROTOTYPE_TAG)]
}

#[derive(Debug, Clone)]
enum Op {
    Merge(Vec<u64>),
    Remove(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        vec(0u64..30, 0..8).prop_map(Op::Merge),
        (0u64..30).prop_map(Op::Remove),
    ]
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Merging the same batch twice equals merging it once.
    #[test]
    fn merge_is_idempotent(
        initial in vec(0u64..50, 0..20),
        incoming in vec(0u64..50, 0..20),
        tag in tag_strategy(),
    ) {
        let merger = merger();
        let batch = batch(tag, &incoming);

        let mut once = seeded(&initial);
        merger.merge(&mut once, &batch).expect("merge");

        let mut twice = once.clone();
        let appended = merger.merge(&mut twice, &batch).expect("merge again");

        prop_assert!(appended.is_empty());
        prop_assert_eq!(once, twice);
    }

    /// Existing rows keep their order; new rows follow in batch order.
    #[test]
    fn merge_preserves_order(
        initial in vec(0u64..50, 0..20),
        incoming in vec(0u64..50, 0..20),
    ) {
        let merger = merger();
        let mut list = seeded(&initial);
        let before = list.ids();

        let appended = merger.merge(&mut list, &batch(PLAIN_TAG, &incoming)).expect("merge");

        let after = list.ids();
        prop_assert_eq!(&after[..before.len()], &before[..]);

        let appended_ids: Vec<TriggerId> = appended.iter().map(|d| d.triggerid.clone()).collect();
        prop_assert_eq!(&after[before.len()..], &appended_ids[..]);

        // Appended ids are the first occurrences of unseen ids, in batch order
        let mut seen: BTreeSet<u64> = initial.iter().copied().collect();
        let expected: Vec<TriggerId> = incoming
            .iter()
            .filter(|id| seen.insert(**id))
            .map(|id| TriggerId::from(*id))
            .collect();
        prop_assert_eq!(appended_ids, expected);
    }

    /// No sequence of merges and removes ever lists a trigger twice.
    #[test]
    fn no_duplicates_after_any_sequence(ops in vec(op_strategy(), 0..40)) {
        let merger = merger();
        let mut list = DependencyList::new();

        for op in ops {
            match op {
                Op::Merge(ids) => {
                    merger.merge(&mut list, &batch(PLAIN_TAG, &ids)).expect("merge");
                }
                Op::Remove(id) => {
                    merger.remove(&mut list, &TriggerId::from(id));
                }
            }

            let ids = list.ids();
            let unique: BTreeSet<_> = ids.iter().collect();
            prop_assert_eq!(unique.len(), ids.len());
            prop_assert_eq!(list.form_fields().len(), ids.len());
        }
    }

    /// Removing twice equals removing once.
    #[test]
    fn remove_is_idempotent(initial in vec(0u64..50, 0..20), target in 0u64..50) {
        let merger = merger();
        let id = TriggerId::from(target);

        let mut once = seeded(&initial);
        merger.remove(&mut once, &id);

        let mut twice = once.clone();
        prop_assert!(merger.remove(&mut twice, &id).is_none());
        prop_assert_eq!(once, twice);
    }

    /// Every appended row links to the page its batch variant selects.
    #[test]
    fn appended_links_match_variant(
        incoming in vec(0u64..1000, 1..10),
        tag in tag_strategy(),
    ) {
        let merger = merger();
        let mut list = DependencyList::new();

        let appended = merger.merge(&mut list, &batch(tag, &incoming)).expect("merge");

        for dependency in appended {
            let expected = if tag == PROTOTYPE_TAG {
                format!(
                    "trigger_prototypes.php?form=update&parent_discoveryid=42&triggerid={}",
                    dependency.triggerid
                )
            } else {
                format!("triggers.php?form=update&triggerid={}", dependency.triggerid)
            };
            prop_assert_eq!(dependency.url, expected);
        }
    }
}
