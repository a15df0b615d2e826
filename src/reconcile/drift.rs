//! Drift detection — compare a declared schema against an inventory snapshot.
//!
//! Severity is classified by property name alone, independent of resource
//! type; blast radius then decides what happens to each drift: LOW is
//! auto-remediated, MEDIUM notifies, HIGH blocks on human approval. That
//! mapping is fixed, not policy. Remediation here only records the decision;
//! provisioning belongs to an external system.

use crate::core::clock::now_iso8601;
use crate::core::types::{IntentSchema, ResourceType, Severity};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One resource's observed properties, camelCase-keyed as the provider
/// inventory collectors report them.
pub type ResourceState = IndexMap<String, Value>;

/// The full inventory snapshot, keyed `"{type}.{name}"`.
pub type CurrentState = IndexMap<String, ResourceState>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftType {
    Modified,
    Added,
    Deleted,
}

/// Coarse impact classification, ordered least to most disruptive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum BlastRadius {
    Low,
    Medium,
    High,
}

/// A single observed difference between declared and actual state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drift {
    pub resource: String,
    pub property: String,
    pub expected: Value,
    pub actual: Value,
    pub drift_type: DriftType,
    pub severity: Severity,
    pub blast_radius: BlastRadius,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftDetectionResult {
    pub intent_id: String,
    pub drifts: Vec<Drift>,
    pub blast_radius: BlastRadius,
    pub auto_remediable: bool,
    pub checked_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    AutoRemediate,
    Notify,
    ApprovalGate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationAction {
    pub drift: Drift,
    pub action: ActionKind,
    pub generated_fix: String,
    pub applied: bool,

    #[serde(default)]
    pub applied_at: Option<String>,
}

/// Compare every declared resource against the snapshot, then flag snapshot
/// entries nothing declares. Only properties observed on both sides are
/// compared.
pub fn detect_drift(ir: &IntentSchema, current_state: &CurrentState) -> DriftDetectionResult {
    let mut drifts = Vec::new();

    for resource in &ir.resources {
        let Some(actual_state) = current_state.get(&resource.state_key()) else {
            // A missing resource is worst-case regardless of its type
            drifts.push(Drift {
                resource: resource.name.clone(),
                property: "existence".to_string(),
                expected: json!("present"),
                actual: json!("missing"),
                drift_type: DriftType::Deleted,
                severity: Severity::Critical,
                blast_radius: BlastRadius::High,
            });
            continue;
        };

        for (property, expected) in resource.config.properties() {
            let Some(actual) = actual_state.get(&property) else {
                continue;
            };
            if *actual != expected {
                let severity = classify_severity(&property);
                drifts.push(Drift {
                    resource: resource.name.clone(),
                    property,
                    expected,
                    actual: actual.clone(),
                    drift_type: DriftType::Modified,
                    severity,
                    blast_radius: classify_blast_radius(severity, resource.resource_type()),
                });
            }
        }
    }

    for state_key in current_state.keys() {
        let declared = ir.resources.iter().any(|r| &r.state_key() == state_key);
        if !declared {
            let name = state_key
                .split_once('.')
                .map_or(state_key.as_str(), |(_type, name)| name);
            drifts.push(Drift {
                resource: name.to_string(),
                property: "existence".to_string(),
                expected: json!("absent"),
                actual: json!("present"),
                drift_type: DriftType::Added,
                severity: Severity::Medium,
                blast_radius: BlastRadius::Medium,
            });
        }
    }

    let blast_radius = drifts
        .iter()
        .map(|d| d.blast_radius)
        .max()
        .unwrap_or(BlastRadius::Low);

    DriftDetectionResult {
        intent_id: ir.intent_id.clone(),
        auto_remediable: blast_radius == BlastRadius::Low
            && drifts.iter().all(|d| d.blast_radius == BlastRadius::Low),
        drifts,
        blast_radius,
        checked_at: now_iso8601(),
    }
}

/// Map each drift to its action per the fixed blast-radius table, with a
/// targeted fix command text.
pub fn generate_actions(result: &DriftDetectionResult) -> Vec<ReconciliationAction> {
    result
        .drifts
        .iter()
        .map(|drift| ReconciliationAction {
            action: match drift.blast_radius {
                BlastRadius::Low => ActionKind::AutoRemediate,
                BlastRadius::Medium => ActionKind::Notify,
                BlastRadius::High => ActionKind::ApprovalGate,
            },
            generated_fix: generate_fix(drift),
            drift: drift.clone(),
            applied: false,
            applied_at: None,
        })
        .collect()
}

/// Record the auto-remediation decision for LOW-radius actions. Does not
/// provision anything.
pub fn auto_remediate(actions: Vec<ReconciliationAction>) -> Vec<ReconciliationAction> {
    actions
        .into_iter()
        .map(|action| {
            if action.action == ActionKind::AutoRemediate {
                tracing::info!(
                    resource = %action.drift.resource,
                    property = %action.drift.property,
                    "recorded drift auto-remediation"
                );
                ReconciliationAction {
                    applied: true,
                    applied_at: Some(now_iso8601()),
                    ..action
                }
            } else {
                action
            }
        })
        .collect()
}

/// Property-name classification, independent of resource type.
fn classify_severity(property: &str) -> Severity {
    const CRITICAL: &[&str] =
        &["encrypted", "encryption", "publicaccess", "iampolicy", "securitygroups"];
    const HIGH: &[&str] = &["multiaz", "replicas", "instanceclass", "instancetype", "count"];
    const MEDIUM: &[&str] = &["engine", "version", "runtime", "memory"];

    let lower = property.to_lowercase();
    if CRITICAL.iter().any(|p| lower.contains(p)) {
        Severity::Critical
    } else if HIGH.iter().any(|p| lower.contains(p)) {
        Severity::High
    } else if MEDIUM.iter().any(|p| lower.contains(p)) {
        Severity::Medium
    } else {
        Severity::Low
    }
}

fn classify_blast_radius(severity: Severity, resource_type: ResourceType) -> BlastRadius {
    match severity {
        Severity::Critical => BlastRadius::High,
        Severity::High => BlastRadius::Medium,
        Severity::Medium if resource_type == ResourceType::Database => BlastRadius::Medium,
        _lower => BlastRadius::Low,
    }
}

fn generate_fix(drift: &Drift) -> String {
    match drift.drift_type {
        DriftType::Modified => format!(
            "# Fix drift: {}.{}\n# Expected: {}\n# Actual: {}\nterraform apply -target=\"{}\" -auto-approve",
            drift.resource, drift.property, drift.expected, drift.actual, drift.resource
        ),
        DriftType::Deleted => format!(
            "# Recreate missing resource: {}\nterraform apply -target=\"{}\" -auto-approve",
            drift.resource, drift.resource
        ),
        DriftType::Added => format!(
            "# Remove unexpected resource: {}\nterraform destroy -target=\"{}\" -auto-approve",
            drift.resource, drift.resource
        ),
    }
}
