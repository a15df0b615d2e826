//! State version history — an append-only audit trail with rollback lookup.
//!
//! Versions are 1-based and gap-free; entries are never mutated after the
//! append. Each snapshot gets a BLAKE3 fingerprint so external audit can
//! compare versions without deep-diffing the snapshots themselves.

use crate::core::clock::now_iso8601;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A saved state version. `state_snapshot` is whatever the apply system
/// handed over, stored verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateVersion {
    pub version: u64,
    pub intent_id: String,
    pub state_snapshot: Value,
    pub applied_at: String,
    pub applied_by: String,
    pub change_description: String,
    pub fingerprint: String,
}

/// What a caller supplies for a new version; the history assigns the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDraft {
    pub intent_id: String,
    pub state_snapshot: Value,
    pub applied_by: String,
    pub change_description: String,
}

/// The append-only version log. Single-writer by ownership: appends take
/// `&mut self`, so callers serialize writes per intent.
#[derive(Debug, Clone, Default)]
pub struct StateHistory {
    versions: Vec<StateVersion>,
}

impl StateHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a version with the next monotonic number and a snapshot
    /// fingerprint. Returns the saved entry.
    pub fn save_state_version(&mut self, draft: StateDraft) -> StateVersion {
        let version = StateVersion {
            version: self.versions.len() as u64 + 1,
            fingerprint: fingerprint(&draft.state_snapshot),
            intent_id: draft.intent_id,
            state_snapshot: draft.state_snapshot,
            applied_at: now_iso8601(),
            applied_by: draft.applied_by,
            change_description: draft.change_description,
        };
        self.versions.push(version.clone());
        version
    }

    /// Look up a historical version for the caller to re-apply. Does not
    /// mutate anything; unknown versions are a `None`, never an error.
    pub fn rollback(&self, target_version: u64) -> Option<&StateVersion> {
        let target = self.versions.iter().find(|v| v.version == target_version);
        if let Some(version) = target {
            tracing::info!(
                version = version.version,
                intent_id = %version.intent_id,
                "rollback target located"
            );
        }
        target
    }

    /// All saved versions, most recent first.
    pub fn state_history(&self) -> Vec<StateVersion> {
        self.versions.iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

/// `blake3:{hex}` over the canonical JSON bytes of the snapshot.
fn fingerprint(snapshot: &Value) -> String {
    let bytes = serde_json::to_vec(snapshot).unwrap_or_default();
    format!("blake3:{}", blake3::hash(&bytes).to_hex())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(n: u64) -> StateDraft {
        StateDraft {
            intent_id: "intent-42".to_string(),
            state_snapshot: json!({ "apply": n }),
            applied_by: "pipeline".to_string(),
            change_description: format!("apply #{n}"),
        }
    }

    #[test]
    fn test_versions_are_monotonic_and_gap_free() {
        let mut history = StateHistory::new();
        for n in 1..=5 {
            let saved = history.save_state_version(draft(n));
            assert_eq!(saved.version, n);
        }
        assert_eq!(history.len(), 5);
    }

    #[test]
    fn test_rollback_returns_entry_unchanged() {
        let mut history = StateHistory::new();
        let saved: Vec<StateVersion> =
            (1..=3).map(|n| history.save_state_version(draft(n))).collect();

        for entry in &saved {
            assert_eq!(history.rollback(entry.version), Some(entry));
        }
    }

    #[test]
    fn test_rollback_unknown_version_is_none() {
        let mut history = StateHistory::new();
        history.save_state_version(draft(1));
        assert!(history.rollback(0).is_none());
        assert!(history.rollback(7).is_none());
    }

    #[test]
    fn test_history_is_most_recent_first() {
        let mut history = StateHistory::new();
        for n in 1..=3 {
            history.save_state_version(draft(n));
        }
        let entries = history.state_history();
        let versions: Vec<u64> = entries.iter().map(|v| v.version).collect();
        assert_eq!(versions, vec![3, 2, 1]);
    }

    #[test]
    fn test_fingerprints_track_snapshot_content() {
        let mut history = StateHistory::new();
        let a = history.save_state_version(draft(1));
        let b = history.save_state_version(draft(2));
        let mut same_as_first = draft(1);
        same_as_first.change_description = "re-apply".to_string();
        let c = history.save_state_version(same_as_first);

        assert!(a.fingerprint.starts_with("blake3:"));
        assert_ne!(a.fingerprint, b.fingerprint);
        assert_eq!(a.fingerprint, c.fingerprint);
    }

    #[test]
    fn test_empty_history() {
        let history = StateHistory::new();
        assert!(history.is_empty());
        assert!(history.state_history().is_empty());
        assert!(history.rollback(1).is_none());
    }
}
