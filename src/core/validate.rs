//! Policy and compliance validation over an intent schema.
//!
//! Five phases, always run in order with no early exit: structural checks,
//! security policy, per-framework compliance (only for frameworks the schema
//! enables), cost guardrails, best practices. The framework catalogues are
//! data-driven rule tables, so adding a framework means adding a table.
//!
//! Only `critical` violations block (`valid = false`); everything else is
//! advisory and still returned for display and audit.

use crate::core::types::{
    DatabaseConfig, IntentSchema, ResourceConfig, ResourceDeclaration, Severity,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// Result shapes
// ============================================================================

/// Which rule catalogue a violation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Framework {
    Security,
    PciDss,
    Hipaa,
    Gdpr,
    Soc2,
    Cost,
}

/// Structural error codes. `InvalidProvider` and `MissingType` are retained
/// for wire compatibility with persisted results but are unreachable under
/// the typed schema (closed provider enum, tagged resource config).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidProvider,
    EmptyResources,
    MissingType,
    MissingName,
    MissingTenant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub code: ErrorCode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyViolation {
    pub policy: String,
    pub framework: Framework,
    pub severity: Severity,
    pub message: String,

    #[serde(default)]
    pub resource: Option<String>,
}

/// What an auto-fix would change. Each variant is an explicit setter over the
/// typed schema; the two human-judgement targets apply as no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemediationTarget {
    EncryptionAtRest,
    EncryptionInTransit,
    IamLeastPrivilege,
    RestrictIngress,
    EuRegion,
}

impl RemediationTarget {
    /// Apply the fix to the schema. Returns false for targets that require
    /// human judgement (network topology, data residency).
    pub fn apply(&self, ir: &mut IntentSchema) -> bool {
        match self {
            Self::EncryptionAtRest => {
                ir.security.encryption_at_rest = true;
                true
            }
            Self::EncryptionInTransit => {
                ir.security.encryption_in_transit = true;
                true
            }
            Self::IamLeastPrivilege => {
                ir.security.iam_least_privilege = true;
                true
            }
            Self::RestrictIngress | Self::EuRegion => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Remediation {
    pub target: RemediationTarget,
    pub suggestion: String,
    pub auto_fix: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub policy_violations: Vec<PolicyViolation>,
    pub remediations: Vec<Remediation>,
}

// ============================================================================
// Rule tables
// ============================================================================

struct RuleHit {
    message: String,
    resource: Option<String>,
}

impl RuleHit {
    fn global(message: impl Into<String>) -> Vec<Self> {
        vec![Self { message: message.into(), resource: None }]
    }
}

struct RemediationSpec {
    target: RemediationTarget,
    suggestion: &'static str,
    auto_fix: bool,
}

/// One `(predicate, violation-template)` pair. `check` returns one hit per
/// occurrence, with the human-readable reason already formatted.
struct PolicyRule {
    policy: &'static str,
    framework: Framework,
    severity: Severity,
    check: fn(&IntentSchema) -> Vec<RuleHit>,
    remediation: Option<RemediationSpec>,
}

/// EU/EEA regions accepted for GDPR data residency (exact membership).
const EU_REGIONS: &[&str] = &[
    "eu-west-1",
    "eu-west-2",
    "eu-central-1",
    "westeurope",
    "northeurope",
    "europe-west1",
    "europe-west3",
];

fn public_ingress_hits(ir: &IntentSchema, port: u16, label: &str) -> Vec<RuleHit> {
    let mut hits = Vec::new();
    for sg in &ir.networking.security_groups {
        for rule in &sg.ingress_rules {
            if rule.cidr == "0.0.0.0/0" && rule.port == port {
                hits.push(RuleHit {
                    message: format!("{label} must not be open to 0.0.0.0/0"),
                    resource: Some(sg.name.clone()),
                });
            }
        }
    }
    hits
}

fn databases(
    ir: &IntentSchema,
) -> impl Iterator<Item = (&ResourceDeclaration, &DatabaseConfig)> {
    ir.resources.iter().filter_map(|r| match &r.config {
        ResourceConfig::Database(db) => Some((r, db)),
        _other => None,
    })
}

fn check_public_ssh(ir: &IntentSchema) -> Vec<RuleHit> {
    public_ingress_hits(ir, 22, "SSH (port 22)")
}

fn check_public_rdp(ir: &IntentSchema) -> Vec<RuleHit> {
    public_ingress_hits(ir, 3389, "RDP (port 3389)")
}

fn check_encryption_at_rest(ir: &IntentSchema) -> Vec<RuleHit> {
    if ir.security.encryption_at_rest {
        Vec::new()
    } else {
        RuleHit::global("Encryption at rest must be enabled for all resources")
    }
}

fn check_encryption_in_transit(ir: &IntentSchema) -> Vec<RuleHit> {
    if ir.security.encryption_in_transit {
        Vec::new()
    } else {
        RuleHit::global("Encryption in transit (TLS) must be enabled")
    }
}

fn check_iam_least_privilege(ir: &IntentSchema) -> Vec<RuleHit> {
    if ir.security.iam_least_privilege {
        Vec::new()
    } else {
        RuleHit::global("IAM policies should follow the least-privilege principle")
    }
}

const SECURITY_RULES: &[PolicyRule] = &[
    PolicyRule {
        policy: "no-public-ssh",
        framework: Framework::Security,
        severity: Severity::Critical,
        check: check_public_ssh,
        remediation: Some(RemediationSpec {
            target: RemediationTarget::RestrictIngress,
            suggestion: "Restrict SSH to specific IP ranges or use a VPN or bastion host",
            auto_fix: false,
        }),
    },
    PolicyRule {
        policy: "no-public-rdp",
        framework: Framework::Security,
        severity: Severity::Critical,
        check: check_public_rdp,
        remediation: None,
    },
    PolicyRule {
        policy: "encryption-at-rest",
        framework: Framework::Security,
        severity: Severity::High,
        check: check_encryption_at_rest,
        remediation: Some(RemediationSpec {
            target: RemediationTarget::EncryptionAtRest,
            suggestion: "Enable encryption at rest",
            auto_fix: true,
        }),
    },
    PolicyRule {
        policy: "encryption-in-transit",
        framework: Framework::Security,
        severity: Severity::High,
        check: check_encryption_in_transit,
        remediation: Some(RemediationSpec {
            target: RemediationTarget::EncryptionInTransit,
            suggestion: "Enable encryption in transit",
            auto_fix: true,
        }),
    },
    PolicyRule {
        policy: "iam-least-privilege",
        framework: Framework::Security,
        severity: Severity::Medium,
        check: check_iam_least_privilege,
        remediation: Some(RemediationSpec {
            target: RemediationTarget::IamLeastPrivilege,
            suggestion: "Enable least-privilege IAM policy generation",
            auto_fix: true,
        }),
    },
];

fn check_pci_database_encryption(ir: &IntentSchema) -> Vec<RuleHit> {
    databases(ir)
        .filter(|(_r, db)| !db.encrypted)
        .map(|(r, _db)| RuleHit {
            message: format!(
                "PCI-DSS Req 3: database \"{}\" must have encryption enabled",
                r.name
            ),
            resource: Some(r.name.clone()),
        })
        .collect()
}

fn check_pci_transit(ir: &IntentSchema) -> Vec<RuleHit> {
    if ir.security.encryption_in_transit {
        Vec::new()
    } else {
        RuleHit::global("PCI-DSS Req 4: all data in transit must be encrypted")
    }
}

fn check_pci_access(ir: &IntentSchema) -> Vec<RuleHit> {
    if ir.security.iam_least_privilege {
        Vec::new()
    } else {
        RuleHit::global(
            "PCI-DSS Req 8: identify and authenticate access to system components",
        )
    }
}

fn check_pci_logging(ir: &IntentSchema) -> Vec<RuleHit> {
    if ir.monitoring.is_some() {
        Vec::new()
    } else {
        RuleHit::global(
            "PCI-DSS Req 10: all access to cardholder data must be logged and monitored",
        )
    }
}

const PCI_DSS_RULES: &[PolicyRule] = &[
    PolicyRule {
        policy: "pci-dss-req3-encryption",
        framework: Framework::PciDss,
        severity: Severity::Critical,
        check: check_pci_database_encryption,
        remediation: None,
    },
    PolicyRule {
        policy: "pci-dss-req4-transit",
        framework: Framework::PciDss,
        severity: Severity::Critical,
        check: check_pci_transit,
        remediation: None,
    },
    PolicyRule {
        policy: "pci-dss-req8-access",
        framework: Framework::PciDss,
        severity: Severity::High,
        check: check_pci_access,
        remediation: None,
    },
    PolicyRule {
        policy: "pci-dss-req10-logging",
        framework: Framework::PciDss,
        severity: Severity::High,
        check: check_pci_logging,
        remediation: None,
    },
];

fn check_hipaa_encryption(ir: &IntentSchema) -> Vec<RuleHit> {
    if ir.security.encryption_at_rest {
        Vec::new()
    } else {
        RuleHit::global("HIPAA: all PHI must be encrypted at rest (AES-256)")
    }
}

fn check_hipaa_audit(ir: &IntentSchema) -> Vec<RuleHit> {
    if ir.monitoring.is_some() {
        Vec::new()
    } else {
        RuleHit::global("HIPAA: comprehensive audit logging required for PHI access")
    }
}

fn check_hipaa_access(ir: &IntentSchema) -> Vec<RuleHit> {
    if ir.security.iam_least_privilege {
        Vec::new()
    } else {
        RuleHit::global("HIPAA: role-based access control required for PHI")
    }
}

fn check_hipaa_backup(ir: &IntentSchema) -> Vec<RuleHit> {
    databases(ir)
        .filter(|(_r, db)| !db.backup)
        .map(|(r, _db)| RuleHit {
            message: format!(
                "HIPAA: database \"{}\" must have automated backups enabled",
                r.name
            ),
            resource: Some(r.name.clone()),
        })
        .collect()
}

const HIPAA_RULES: &[PolicyRule] = &[
    PolicyRule {
        policy: "hipaa-encryption",
        framework: Framework::Hipaa,
        severity: Severity::Critical,
        check: check_hipaa_encryption,
        remediation: None,
    },
    PolicyRule {
        policy: "hipaa-audit-log",
        framework: Framework::Hipaa,
        severity: Severity::Critical,
        check: check_hipaa_audit,
        remediation: None,
    },
    PolicyRule {
        policy: "hipaa-access-control",
        framework: Framework::Hipaa,
        severity: Severity::High,
        check: check_hipaa_access,
        remediation: None,
    },
    PolicyRule {
        policy: "hipaa-backup",
        framework: Framework::Hipaa,
        severity: Severity::High,
        check: check_hipaa_backup,
        remediation: None,
    },
];

fn check_gdpr_residency(ir: &IntentSchema) -> Vec<RuleHit> {
    match &ir.region {
        Some(region) if !EU_REGIONS.contains(&region.as_str()) => {
            RuleHit::global("GDPR: personal data must be stored within EU/EEA regions")
        }
        _in_eu_or_unset => Vec::new(),
    }
}

fn check_gdpr_deletion(ir: &IntentSchema) -> Vec<RuleHit> {
    databases(ir)
        .map(|(r, _db)| RuleHit {
            message: format!(
                "GDPR: database \"{}\" must support data deletion workflows",
                r.name
            ),
            resource: Some(r.name.clone()),
        })
        .collect()
}

fn check_gdpr_encryption(ir: &IntentSchema) -> Vec<RuleHit> {
    if ir.security.encryption_at_rest && ir.security.encryption_in_transit {
        Vec::new()
    } else {
        RuleHit::global("GDPR: all personal data must be encrypted at rest and in transit")
    }
}

const GDPR_RULES: &[PolicyRule] = &[
    PolicyRule {
        policy: "gdpr-data-residency",
        framework: Framework::Gdpr,
        severity: Severity::Critical,
        check: check_gdpr_residency,
        remediation: Some(RemediationSpec {
            target: RemediationTarget::EuRegion,
            suggestion: "Deploy to an EU region (eu-west-1, eu-central-1, westeurope, europe-west1)",
            auto_fix: false,
        }),
    },
    PolicyRule {
        policy: "gdpr-right-to-delete",
        framework: Framework::Gdpr,
        severity: Severity::Medium,
        check: check_gdpr_deletion,
        remediation: None,
    },
    PolicyRule {
        policy: "gdpr-encryption",
        framework: Framework::Gdpr,
        severity: Severity::High,
        check: check_gdpr_encryption,
        remediation: None,
    },
];

fn check_soc2_availability(ir: &IntentSchema) -> Vec<RuleHit> {
    let has_ha = databases(ir).any(|(_r, db)| db.multi_az || db.replicas > 1);
    if has_ha {
        Vec::new()
    } else {
        RuleHit::global("SOC 2 CC6: high availability recommended for critical services")
    }
}

fn check_soc2_monitoring(ir: &IntentSchema) -> Vec<RuleHit> {
    if ir.monitoring.is_some() {
        Vec::new()
    } else {
        RuleHit::global("SOC 2 CC7: monitoring and alerting must be configured")
    }
}

fn check_soc2_access(ir: &IntentSchema) -> Vec<RuleHit> {
    if ir.security.iam_least_privilege {
        Vec::new()
    } else {
        RuleHit::global("SOC 2 CC6: logical access controls must be implemented")
    }
}

fn check_soc2_change_management(_ir: &IntentSchema) -> Vec<RuleHit> {
    RuleHit::global("SOC 2 CC8: all infrastructure changes should be tracked via IaC")
}

const SOC2_RULES: &[PolicyRule] = &[
    PolicyRule {
        policy: "soc2-availability",
        framework: Framework::Soc2,
        severity: Severity::Medium,
        check: check_soc2_availability,
        remediation: None,
    },
    PolicyRule {
        policy: "soc2-monitoring",
        framework: Framework::Soc2,
        severity: Severity::High,
        check: check_soc2_monitoring,
        remediation: None,
    },
    PolicyRule {
        policy: "soc2-access-control",
        framework: Framework::Soc2,
        severity: Severity::High,
        check: check_soc2_access,
        remediation: None,
    },
    PolicyRule {
        policy: "soc2-change-management",
        framework: Framework::Soc2,
        severity: Severity::Low,
        check: check_soc2_change_management,
        remediation: None,
    },
];

// ============================================================================
// Validation entry points
// ============================================================================

/// Run all five validation phases. Deterministic and side-effect-free.
pub fn validate(ir: &IntentSchema) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut policy_violations = Vec::new();
    let mut remediations = Vec::new();

    validate_structure(ir, &mut errors);

    apply_rules(SECURITY_RULES, ir, &mut policy_violations, &mut remediations);
    if ir.compliance.pci_dss {
        apply_rules(PCI_DSS_RULES, ir, &mut policy_violations, &mut remediations);
    }
    if ir.compliance.hipaa {
        apply_rules(HIPAA_RULES, ir, &mut policy_violations, &mut remediations);
    }
    if ir.compliance.gdpr {
        apply_rules(GDPR_RULES, ir, &mut policy_violations, &mut remediations);
    }
    if ir.compliance.soc2 {
        apply_rules(SOC2_RULES, ir, &mut policy_violations, &mut remediations);
    }

    cost_guardrails(ir, &mut warnings);
    best_practices(ir, &mut warnings);

    let valid = errors.is_empty()
        && !policy_violations
            .iter()
            .any(|v| v.severity == Severity::Critical);

    ValidationResult {
        valid,
        errors,
        warnings,
        policy_violations,
        remediations,
    }
}

/// Apply every auto-fixable remediation to a copy of the schema. Idempotent:
/// a second pass finds nothing left to fix.
pub fn auto_remediate(ir: &IntentSchema, result: &ValidationResult) -> IntentSchema {
    let mut remediated = ir.clone();
    for remediation in &result.remediations {
        if remediation.auto_fix && remediation.target.apply(&mut remediated) {
            tracing::info!(fix = ?remediation.target, "applied auto-remediation");
        }
    }
    remediated
}

fn validate_structure(ir: &IntentSchema, errors: &mut Vec<ValidationError>) {
    if ir.resources.is_empty() {
        errors.push(ValidationError {
            field: "resources".to_string(),
            message: "At least one resource must be defined".to_string(),
            code: ErrorCode::EmptyResources,
        });
    }

    for resource in &ir.resources {
        if resource.name.is_empty() {
            errors.push(ValidationError {
                field: "resources".to_string(),
                message: "Resource name is required".to_string(),
                code: ErrorCode::MissingName,
            });
        }
    }

    if ir.tenant_id.is_empty() {
        errors.push(ValidationError {
            field: "tenantId".to_string(),
            message: "Tenant ID is required".to_string(),
            code: ErrorCode::MissingTenant,
        });
    }
}

fn apply_rules(
    rules: &[PolicyRule],
    ir: &IntentSchema,
    violations: &mut Vec<PolicyViolation>,
    remediations: &mut Vec<Remediation>,
) {
    for rule in rules {
        for hit in (rule.check)(ir) {
            violations.push(PolicyViolation {
                policy: rule.policy.to_string(),
                framework: rule.framework,
                severity: rule.severity,
                message: hit.message,
                resource: hit.resource,
            });
            if let Some(spec) = &rule.remediation {
                remediations.push(Remediation {
                    target: spec.target,
                    suggestion: spec.suggestion.to_string(),
                    auto_fix: spec.auto_fix,
                });
            }
        }
    }
}

/// Warnings only; cost findings can never flip `valid`.
fn cost_guardrails(ir: &IntentSchema, warnings: &mut Vec<ValidationWarning>) {
    for resource in &ir.resources {
        match &resource.config {
            ResourceConfig::Compute(c)
                if c.instance_type.contains("xlarge")
                    || c.instance_type.contains("metal") =>
            {
                warnings.push(ValidationWarning {
                    field: format!("resources.{}.instanceType", resource.name),
                    message: format!(
                        "Large instance type \"{}\": consider if the workload needs it",
                        c.instance_type
                    ),
                    severity: Severity::Medium,
                });
            }
            ResourceConfig::Database(db) if db.multi_az => {
                warnings.push(ValidationWarning {
                    field: format!("resources.{}.multiAZ", resource.name),
                    message: "Multi-AZ doubles database cost; ensure this is required"
                        .to_string(),
                    severity: Severity::Low,
                });
            }
            _other => {}
        }
    }
}

/// Warnings only.
fn best_practices(ir: &IntentSchema, warnings: &mut Vec<ValidationWarning>) {
    warnings.push(ValidationWarning {
        field: "resources".to_string(),
        message: "Consider adding resource tags for cost allocation and governance"
            .to_string(),
        severity: Severity::Low,
    });

    for (resource, db) in databases(ir) {
        if !db.backup {
            warnings.push(ValidationWarning {
                field: format!("resources.{}.backup", resource.name),
                message: format!(
                    "Database \"{}\" should have automated backups configured",
                    resource.name
                ),
                severity: Severity::Medium,
            });
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{
        ComplianceFlags, ComputeConfig, IngressRule, MonitoringIntent,
        NetworkingIntent, Provider, SecurityGroupIntent, SecurityPosture,
    };

    fn base_intent() -> IntentSchema {
        IntentSchema {
            intent_id: "intent-test".to_string(),
            tenant_id: "tenant-001".to_string(),
            provider: Provider::Aws,
            natural_language: "a postgres database".to_string(),
            resources: vec![ResourceDeclaration {
                name: "app-database".to_string(),
                config: ResourceConfig::Database(DatabaseConfig::default()),
            }],
            networking: NetworkingIntent::default(),
            security: SecurityPosture {
                encryption_at_rest: true,
                encryption_in_transit: true,
                iam_least_privilege: true,
                secrets_management: false,
            },
            compliance: ComplianceFlags::default(),
            monitoring: None,
            region: None,
            confidence: 0.9,
            created_at: "2026-08-05T12:00:00Z".to_string(),
        }
    }

    fn with_public_port(mut ir: IntentSchema, port: u16) -> IntentSchema {
        ir.networking.security_groups = vec![SecurityGroupIntent {
            name: "web-sg".to_string(),
            ingress_rules: vec![IngressRule {
                cidr: "0.0.0.0/0".to_string(),
                port,
                protocol: "tcp".to_string(),
            }],
        }];
        ir
    }

    fn policies(result: &ValidationResult) -> Vec<&str> {
        result
            .policy_violations
            .iter()
            .map(|v| v.policy.as_str())
            .collect()
    }

    #[test]
    fn test_clean_intent_is_valid() {
        let result = validate(&base_intent());
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.policy_violations.is_empty());
    }

    #[test]
    fn test_public_ssh_is_critical_and_not_auto_fixable() {
        let result = validate(&with_public_port(base_intent(), 22));
        assert!(!result.valid);
        let v = result
            .policy_violations
            .iter()
            .find(|v| v.policy == "no-public-ssh")
            .unwrap();
        assert_eq!(v.severity, Severity::Critical);
        assert_eq!(v.framework, Framework::Security);
        assert_eq!(v.resource.as_deref(), Some("web-sg"));
        let r = result
            .remediations
            .iter()
            .find(|r| r.target == RemediationTarget::RestrictIngress)
            .unwrap();
        assert!(!r.auto_fix);
    }

    #[test]
    fn test_public_rdp_is_critical() {
        let result = validate(&with_public_port(base_intent(), 3389));
        assert!(!result.valid);
        assert!(policies(&result).contains(&"no-public-rdp"));
    }

    #[test]
    fn test_other_public_ports_pass() {
        let result = validate(&with_public_port(base_intent(), 443));
        assert!(result.valid);
        assert!(result.policy_violations.is_empty());
    }

    #[test]
    fn test_missing_security_flags_are_remediable() {
        let mut ir = base_intent();
        ir.security = SecurityPosture::default();
        let result = validate(&ir);

        // high + high + medium, none critical: still valid
        assert!(result.valid);
        assert_eq!(result.policy_violations.len(), 3);
        assert_eq!(result.remediations.len(), 3);
        assert!(result.remediations.iter().all(|r| r.auto_fix));

        let fixed = auto_remediate(&ir, &result);
        assert!(fixed.security.encryption_at_rest);
        assert!(fixed.security.encryption_in_transit);
        assert!(fixed.security.iam_least_privilege);
        // the input schema is untouched
        assert!(!ir.security.encryption_at_rest);

        let after = validate(&fixed);
        assert!(after.policy_violations.is_empty());
    }

    #[test]
    fn test_auto_remediate_is_idempotent() {
        let mut ir = base_intent();
        ir.security = SecurityPosture::default();
        let once = auto_remediate(&ir, &validate(&ir));
        let twice = auto_remediate(&once, &validate(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_gdpr_residency_round_trip() {
        let mut ir = base_intent();
        ir.compliance.gdpr = true;
        ir.region = Some("us-east-1".to_string());
        let result = validate(&ir);
        assert!(policies(&result).contains(&"gdpr-data-residency"));
        assert!(!result.valid);

        ir.region = Some("eu-west-1".to_string());
        let result = validate(&ir);
        assert!(!policies(&result).contains(&"gdpr-data-residency"));
    }

    #[test]
    fn test_gdpr_deletion_applies_per_database() {
        let mut ir = base_intent();
        ir.compliance.gdpr = true;
        ir.region = Some("eu-west-1".to_string());
        let result = validate(&ir);
        let v = result
            .policy_violations
            .iter()
            .find(|v| v.policy == "gdpr-right-to-delete")
            .unwrap();
        assert_eq!(v.severity, Severity::Medium);
        assert_eq!(v.resource.as_deref(), Some("app-database"));
        assert!(v.message.contains("deletion workflows"));
    }

    #[test]
    fn test_pci_unencrypted_database_is_critical() {
        let mut ir = base_intent();
        ir.compliance.pci_dss = true;
        ir.monitoring = Some(MonitoringIntent::default());
        match &mut ir.resources[0].config {
            ResourceConfig::Database(db) => db.encrypted = false,
            _other => unreachable!(),
        }
        let result = validate(&ir);
        assert!(!result.valid);
        let v = result
            .policy_violations
            .iter()
            .find(|v| v.policy == "pci-dss-req3-encryption")
            .unwrap();
        assert_eq!(v.severity, Severity::Critical);
        assert!(v.message.contains("app-database"));
    }

    #[test]
    fn test_pci_missing_monitoring() {
        let mut ir = base_intent();
        ir.compliance.pci_dss = true;
        let result = validate(&ir);
        assert!(policies(&result).contains(&"pci-dss-req10-logging"));
        // encrypted database + monitoring gap only: high, not blocking
        assert!(result.valid);
    }

    #[test]
    fn test_hipaa_backup_per_database() {
        let mut ir = base_intent();
        ir.compliance.hipaa = true;
        ir.monitoring = Some(MonitoringIntent::default());
        let result = validate(&ir);
        let v = result
            .policy_violations
            .iter()
            .find(|v| v.policy == "hipaa-backup")
            .unwrap();
        assert_eq!(v.severity, Severity::High);
        assert_eq!(v.resource.as_deref(), Some("app-database"));

        match &mut ir.resources[0].config {
            ResourceConfig::Database(db) => db.backup = true,
            _other => unreachable!(),
        }
        let result = validate(&ir);
        assert!(!policies(&result).contains(&"hipaa-backup"));
    }

    #[test]
    fn test_hipaa_missing_monitoring_blocks() {
        let mut ir = base_intent();
        ir.compliance.hipaa = true;
        let result = validate(&ir);
        let v = result
            .policy_violations
            .iter()
            .find(|v| v.policy == "hipaa-audit-log")
            .unwrap();
        assert_eq!(v.severity, Severity::Critical);
        assert!(!result.valid);
    }

    #[test]
    fn test_soc2_advisories() {
        let mut ir = base_intent();
        ir.compliance.soc2 = true;
        ir.monitoring = Some(MonitoringIntent::default());
        let result = validate(&ir);
        // single-AZ database, one replica: availability advisory fires
        assert!(policies(&result).contains(&"soc2-availability"));
        // change-management advisory is always present under SOC 2
        let cm = result
            .policy_violations
            .iter()
            .find(|v| v.policy == "soc2-change-management")
            .unwrap();
        assert_eq!(cm.severity, Severity::Low);
        assert!(result.valid);

        match &mut ir.resources[0].config {
            ResourceConfig::Database(db) => db.multi_az = true,
            _other => unreachable!(),
        }
        let result = validate(&ir);
        assert!(!policies(&result).contains(&"soc2-availability"));
    }

    #[test]
    fn test_cost_warnings_never_block() {
        let mut ir = base_intent();
        ir.resources.push(ResourceDeclaration {
            name: "big-box".to_string(),
            config: ResourceConfig::Compute(ComputeConfig {
                instance_type: "m5.4xlarge".to_string(),
                ..ComputeConfig::default()
            }),
        });
        match &mut ir.resources[0].config {
            ResourceConfig::Database(db) => db.multi_az = true,
            _other => unreachable!(),
        }
        let result = validate(&ir);
        assert!(result.valid);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.field == "resources.big-box.instanceType"
                && w.severity == Severity::Medium));
        assert!(result
            .warnings
            .iter()
            .any(|w| w.field == "resources.app-database.multiAZ"
                && w.severity == Severity::Low));
    }

    #[test]
    fn test_best_practice_warnings() {
        let result = validate(&base_intent());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.message.contains("resource tags")));
        assert!(result
            .warnings
            .iter()
            .any(|w| w.field == "resources.app-database.backup"));
    }

    #[test]
    fn test_structural_errors() {
        let mut ir = base_intent();
        ir.resources.clear();
        ir.tenant_id = String::new();
        let result = validate(&ir);
        assert!(!result.valid);
        let codes: Vec<ErrorCode> = result.errors.iter().map(|e| e.code).collect();
        assert!(codes.contains(&ErrorCode::EmptyResources));
        assert!(codes.contains(&ErrorCode::MissingTenant));
    }

    #[test]
    fn test_empty_resource_name() {
        let mut ir = base_intent();
        ir.resources[0].name = String::new();
        let result = validate(&ir);
        assert!(result.errors.iter().any(|e| e.code == ErrorCode::MissingName));
        assert!(!result.valid);
    }

    #[test]
    fn test_validate_is_deterministic() {
        let mut ir = base_intent();
        ir.compliance = ComplianceFlags {
            pci_dss: true,
            hipaa: true,
            gdpr: true,
            soc2: true,
        };
        ir.region = Some("ap-south-1".to_string());
        ir.security = SecurityPosture::default();
        assert_eq!(validate(&ir), validate(&ir));
    }

    #[test]
    fn test_framework_serde_tags() {
        let json = serde_json::to_string(&Framework::PciDss).unwrap();
        assert_eq!(json, "\"pci-dss\"");
        let json = serde_json::to_string(&ErrorCode::EmptyResources).unwrap();
        assert_eq!(json, "\"EMPTY_RESOURCES\"");
    }
}
