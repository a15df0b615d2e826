//! The intent schema — the typed intermediate representation shared by all
//! pipeline stages.
//!
//! Resource configuration is a closed tagged union per resource type, not an
//! open key/value bag: the compliance and synthesis rules that inspect
//! specific fields become exhaustive matches. Config fields serialize in
//! camelCase because drift comparison keys them against provider inventory
//! snapshots that use those names.

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Provider / resource type
// ============================================================================

/// Target cloud provider.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Aws,
    Azure,
    Gcp,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aws => write!(f, "aws"),
            Self::Azure => write!(f, "azure"),
            Self::Gcp => write!(f, "gcp"),
        }
    }
}

/// Resource category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Compute,
    Database,
    Storage,
    Serverless,
    Container,
    Network,
    Application,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compute => write!(f, "compute"),
            Self::Database => write!(f, "database"),
            Self::Storage => write!(f, "storage"),
            Self::Serverless => write!(f, "serverless"),
            Self::Container => write!(f, "container"),
            Self::Network => write!(f, "network"),
            Self::Application => write!(f, "application"),
        }
    }
}

// ============================================================================
// Resource declarations
// ============================================================================

/// A single declared resource: a name plus its typed configuration.
///
/// Serializes as `{"name": ..., "type": ..., "config": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResourceDeclaration {
    pub name: String,

    #[serde(flatten)]
    pub config: ResourceConfig,
}

impl ResourceDeclaration {
    pub fn resource_type(&self) -> ResourceType {
        self.config.resource_type()
    }

    /// State lookup key, `"{type}.{name}"`.
    pub fn state_key(&self) -> String {
        format!("{}.{}", self.resource_type(), self.name)
    }
}

/// Per-type resource configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "config", rename_all = "snake_case")]
pub enum ResourceConfig {
    Compute(ComputeConfig),
    Database(DatabaseConfig),
    Storage(StorageConfig),
    Serverless(ServerlessConfig),
    Container(ContainerConfig),
    Network(NetworkConfig),
    Application(ApplicationConfig),
}

impl ResourceConfig {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            Self::Compute(_) => ResourceType::Compute,
            Self::Database(_) => ResourceType::Database,
            Self::Storage(_) => ResourceType::Storage,
            Self::Serverless(_) => ResourceType::Serverless,
            Self::Container(_) => ResourceType::Container,
            Self::Network(_) => ResourceType::Network,
            Self::Application(_) => ResourceType::Application,
        }
    }

    /// The configuration as a camelCase property map, the shape drift
    /// detection compares against provider inventory snapshots.
    pub fn properties(&self) -> IndexMap<String, serde_json::Value> {
        let value = match self {
            Self::Compute(c) => serde_json::to_value(c),
            Self::Database(c) => serde_json::to_value(c),
            Self::Storage(c) => serde_json::to_value(c),
            Self::Serverless(c) => serde_json::to_value(c),
            Self::Container(c) => serde_json::to_value(c),
            Self::Network(c) => serde_json::to_value(c),
            Self::Application(c) => serde_json::to_value(c),
        };
        match value {
            Ok(serde_json::Value::Object(map)) => map.into_iter().collect(),
            _ => IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ComputeConfig {
    pub instance_type: String,
    pub count: u32,
    pub os: String,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            instance_type: "medium".to_string(),
            count: 1,
            os: "linux".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseConfig {
    pub engine: String,

    #[serde(rename = "multiAZ")]
    pub multi_az: bool,

    pub size: String,
    pub encrypted: bool,
    pub backup: bool,
    pub replicas: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            engine: "postgresql".to_string(),
            multi_az: false,
            size: "medium".to_string(),
            encrypted: true,
            backup: false,
            replicas: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageConfig {
    pub versioning: bool,
    pub encryption: String,
    pub archive_after_days: Option<u32>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            versioning: true,
            encryption: "AES256".to_string(),
            archive_after_days: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerlessConfig {
    pub runtime: String,
    pub memory_mb: u32,
    pub timeout_secs: u32,
}

impl Default for ServerlessConfig {
    fn default() -> Self {
        Self {
            runtime: "nodejs20.x".to_string(),
            memory_mb: 512,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerConfig {
    pub orchestrator: String,
    pub node_count: u32,
    pub auto_scaling: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            orchestrator: "kubernetes".to_string(),
            node_count: 3,
            auto_scaling: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkConfig {
    pub internal: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationConfig {
    pub fifo: bool,
}

// ============================================================================
// Networking / security / compliance intent
// ============================================================================

/// VPC, subnet, and security-group intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkingIntent {
    pub vpc: bool,
    pub subnets: SubnetLayout,
    pub security_groups: Vec<SecurityGroupIntent>,
}

impl Default for NetworkingIntent {
    fn default() -> Self {
        Self {
            vpc: true,
            subnets: SubnetLayout::default(),
            security_groups: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SubnetLayout {
    pub public: u32,
    pub private: u32,
}

impl Default for SubnetLayout {
    fn default() -> Self {
        Self { public: 2, private: 2 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecurityGroupIntent {
    pub name: String,

    #[serde(default)]
    pub ingress_rules: Vec<IngressRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IngressRule {
    pub cidr: String,
    pub port: u16,

    #[serde(default = "default_protocol")]
    pub protocol: String,
}

fn default_protocol() -> String {
    "tcp".to_string()
}

/// Security posture flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityPosture {
    pub encryption_at_rest: bool,
    pub encryption_in_transit: bool,
    pub iam_least_privilege: bool,
    pub secrets_management: bool,
}

/// Regulatory framework flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ComplianceFlags {
    pub pci_dss: bool,
    pub hipaa: bool,
    pub gdpr: bool,
    pub soc2: bool,
}

/// Alerting and observability intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitoringIntent {
    pub alerting: bool,
    pub log_retention_days: u32,
}

impl Default for MonitoringIntent {
    fn default() -> Self {
        Self { alerting: true, log_retention_days: 90 }
    }
}

// ============================================================================
// Intent schema
// ============================================================================

/// The canonical representation of desired infrastructure.
///
/// Value object: extraction produces it, validation annotates it, synthesis
/// and reconciliation consume it. The original request text is retained for
/// audit and refinement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntentSchema {
    pub intent_id: String,
    pub tenant_id: String,
    pub provider: Provider,
    pub natural_language: String,
    pub resources: Vec<ResourceDeclaration>,
    pub networking: NetworkingIntent,
    pub security: SecurityPosture,
    pub compliance: ComplianceFlags,

    #[serde(default)]
    pub monitoring: Option<MonitoringIntent>,

    #[serde(default)]
    pub region: Option<String>,

    pub confidence: f64,
    pub created_at: String,
}

// ============================================================================
// Severity (shared by validation and drift classification)
// ============================================================================

/// Finding severity, ordered least to most severe.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn make_database() -> ResourceDeclaration {
        ResourceDeclaration {
            name: "app-database".to_string(),
            config: ResourceConfig::Database(DatabaseConfig {
                multi_az: true,
                ..DatabaseConfig::default()
            }),
        }
    }

    #[test]
    fn test_resource_serde_shape() {
        let json = serde_json::to_value(make_database()).unwrap();
        assert_eq!(json["name"], "app-database");
        assert_eq!(json["type"], "database");
        assert_eq!(json["config"]["engine"], "postgresql");
        assert_eq!(json["config"]["multiAZ"], true);
    }

    #[test]
    fn test_resource_roundtrip() {
        let json = r#"{
            "name": "app-server",
            "type": "compute",
            "config": { "instanceType": "large", "count": 2, "os": "linux" }
        }"#;
        let r: ResourceDeclaration = serde_json::from_str(json).unwrap();
        assert_eq!(r.resource_type(), ResourceType::Compute);
        match &r.config {
            ResourceConfig::Compute(c) => {
                assert_eq!(c.instance_type, "large");
                assert_eq!(c.count, 2);
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let json = r#"{ "name": "db", "type": "database", "config": {} }"#;
        let r: ResourceDeclaration = serde_json::from_str(json).unwrap();
        match &r.config {
            ResourceConfig::Database(c) => {
                assert_eq!(c.engine, "postgresql");
                assert!(c.encrypted);
                assert!(!c.multi_az);
                assert_eq!(c.replicas, 1);
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn test_state_key() {
        assert_eq!(make_database().state_key(), "database.app-database");
    }

    #[test]
    fn test_properties_use_inventory_names() {
        let props = make_database().config.properties();
        assert_eq!(props["multiAZ"], serde_json::json!(true));
        assert_eq!(props["engine"], serde_json::json!("postgresql"));
        assert!(props.contains_key("encrypted"));
    }

    #[test]
    fn test_compute_properties_camel_case() {
        let props = ResourceConfig::Compute(ComputeConfig::default()).properties();
        assert!(props.contains_key("instanceType"));
        assert!(props.contains_key("count"));
    }

    #[test]
    fn test_provider_display() {
        assert_eq!(Provider::Aws.to_string(), "aws");
        assert_eq!(Provider::Gcp.to_string(), "gcp");
    }

    #[test]
    fn test_resource_type_display() {
        assert_eq!(ResourceType::Database.to_string(), "database");
        assert_eq!(ResourceType::Serverless.to_string(), "serverless");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn test_networking_defaults() {
        let n = NetworkingIntent::default();
        assert!(n.vpc);
        assert_eq!(n.subnets.public, 2);
        assert_eq!(n.subnets.private, 2);
        assert!(n.security_groups.is_empty());
    }

    #[test]
    fn test_intent_schema_roundtrip() {
        let intent = IntentSchema {
            intent_id: "intent-abc".to_string(),
            tenant_id: "tenant-001".to_string(),
            provider: Provider::Aws,
            natural_language: "a redundant postgres database".to_string(),
            resources: vec![make_database()],
            networking: NetworkingIntent::default(),
            security: SecurityPosture {
                encryption_at_rest: true,
                encryption_in_transit: true,
                iam_least_privilege: true,
                secrets_management: false,
            },
            compliance: ComplianceFlags { gdpr: true, ..ComplianceFlags::default() },
            monitoring: None,
            region: Some("eu-west-1".to_string()),
            confidence: 0.9,
            created_at: "2026-08-05T12:00:00Z".to_string(),
        };
        let json = serde_json::to_string(&intent).unwrap();
        let back: IntentSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(back, intent);
        assert!(json.contains("\"pciDss\":false"));
        assert!(json.contains("\"encryptionAtRest\":true"));
    }
}
