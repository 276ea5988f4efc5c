//! # Popup Batches
//!
//! Entry point shared by the CLI and the HTTP endpoint for batches coming
//! back from the trigger selection popup. Applies the malformed-batch policy
//! and logs what happened.

use serde_json::Value;
use trigdeps_core::{
    Dependency, DependencyList, DependencyMerger, MalformedPolicy, MergeOutcome, TrigDepsError,
};

/// Decode a raw request body or payload file.
///
/// Bytes that are not JSON count as a malformed batch: under
/// `MalformedPolicy::Ignore` they decode to `Value::Null`, which the merger
/// then ignores.
pub fn decode_payload(bytes: &[u8], policy: MalformedPolicy) -> Result<Value, TrigDepsError> {
    match serde_json::from_slice(bytes) {
        Ok(value) => Ok(value),
        Err(e) if policy == MalformedPolicy::Ignore => {
            tracing::warn!(event = "batch_dropped", reason = %e, "Dropped unreadable payload");
            Ok(Value::Null)
        }
        Err(e) => {
            tracing::warn!(event = "batch_rejected", error = %e, "Rejected unreadable payload");
            Err(TrigDepsError::InvalidBatch(format!("Payload is not JSON: {}", e)))
        }
    }
}

/// Merge a popup payload into `list` according to `policy`.
///
/// Returns the appended rows. Ignored and (under `MalformedPolicy::Ignore`)
/// malformed payloads return an empty vector.
pub fn handle_popup(
    merger: &DependencyMerger,
    list: &mut DependencyList,
    payload: &Value,
    policy: MalformedPolicy,
) -> Result<Vec<Dependency>, TrigDepsError> {
    match merger.apply(list, payload, policy) {
        Ok(MergeOutcome::Merged(appended)) => {
            tracing::info!(
                event = "batch_merged",
                appended = appended.len(),
                total = list.len(),
                "Merged popup batch"
            );
            Ok(appended)
        }
        Ok(MergeOutcome::Ignored) => {
            tracing::debug!(event = "batch_ignored", "Payload is not a popup batch");
            Ok(Vec::new())
        }
        Ok(MergeOutcome::Dropped(reason)) => {
            tracing::warn!(
                event = "batch_dropped",
                reason = %reason,
                "Dropped malformed popup batch"
            );
            Ok(Vec::new())
        }
        Err(e) => {
            tracing::warn!(event = "batch_rejected", error = %e, "Rejected popup batch");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn handle_popup_follows_policy() {
        let merger = DependencyMerger::default();
        let good = json!({"object": "deptrigger", "values": [{"triggerid": "1", "name": "A"}]});
        let bad = json!({"object": "deptrigger", "values": [{"name": "NoId"}]});

        for policy in [MalformedPolicy::Ignore, MalformedPolicy::Reject] {
            let mut list = DependencyList::new();

            let appended = handle_popup(&merger, &mut list, &good, policy).expect("merged");
            assert_eq!(appended.len(), 1);

            let ignored = handle_popup(&merger, &mut list, &json!({"values": []}), policy);
            assert!(ignored.expect("ignored").is_empty());

            let dropped = handle_popup(&merger, &mut list, &bad, policy);
            match policy {
                MalformedPolicy::Ignore => assert!(dropped.expect("dropped").is_empty()),
                MalformedPolicy::Reject => {
                    assert!(matches!(dropped, Err(TrigDepsError::InvalidBatch(_))))
                }
            }
            assert_eq!(list.len(), 1);
        }
    }

    #[test]
    fn decode_payload_follows_policy() {
        let value = decode_payload(br#"{"values": []}"#, MalformedPolicy::Reject).expect("json");
        assert_eq!(value, json!({"values": []}));

        assert_eq!(
            decode_payload(b"{{{", MalformedPolicy::Ignore).expect("ignored"),
            Value::Null
        );
        assert!(matches!(
            decode_payload(b"{{{", MalformedPolicy::Reject),
            Err(TrigDepsError::InvalidBatch(_))
        ));
    }
}
