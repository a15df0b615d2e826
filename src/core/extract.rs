//! Intent extraction — natural language in, intent schema out.
//!
//! A pluggable semantic strategy (an external model call) is tried first;
//! any failure or absence falls through to deterministic keyword rules,
//! which are total over any input string. Phrasing ambiguities ("redundant",
//! "secure") are resolved from a fixed table with a confidence score, and
//! low-confidence resolutions flag the result for refinement.

use crate::core::clock::now_iso8601;
use crate::core::types::{
    ComplianceFlags, ComputeConfig, ContainerConfig, DatabaseConfig, IntentSchema,
    MonitoringIntent, NetworkingIntent, Provider, ResourceConfig, ResourceDeclaration,
    SecurityGroupIntent, SecurityPosture, ServerlessConfig, StorageConfig,
};
use async_trait::async_trait;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Ambiguity resolutions below this confidence flag the result for refinement.
const REFINEMENT_THRESHOLD: f64 = 0.7;

// ============================================================================
// Request / result shapes
// ============================================================================

/// An extraction request from the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentRequest {
    pub tenant_id: String,
    pub natural_language: String,

    #[serde(default)]
    pub target_provider: Option<Provider>,

    #[serde(default)]
    pub context: Option<ExtractionContext>,
}

/// Carry-over context for multi-turn refinement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractionContext {
    pub previous_intent_id: Option<String>,
    pub refinements: Vec<String>,
}

/// A possibly partial intent produced by either extraction path. Missing
/// sections are filled with defaults when the full schema is assembled.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct IntentFragment {
    pub provider: Option<Provider>,
    pub resources: Vec<ResourceDeclaration>,
    pub networking: Option<NetworkingIntent>,
    pub security: Option<SecurityPosture>,
    pub compliance: Option<ComplianceFlags>,
    pub monitoring: Option<MonitoringIntent>,
    pub region: Option<String>,
}

/// A phrase with multiple plausible readings and the reading we applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ambiguity {
    pub field: String,
    pub input_phrase: String,
    pub interpretations: Vec<String>,
    pub resolved: String,
    pub confidence: f64,
}

/// Extraction output: the assembled schema plus how sure we are about it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentIngestion {
    pub intent_schema: IntentSchema,
    pub confidence: f64,
    pub ambiguities: Vec<Ambiguity>,
    pub requires_refinement: bool,
}

// ============================================================================
// Semantic strategy seam
// ============================================================================

/// An injected semantic-extraction capability. Implementors own their own
/// timeout policy; any `Err` falls through to deterministic extraction.
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    async fn extract(
        &self,
        prompt: &str,
        target_provider: Provider,
    ) -> Result<IntentFragment, String>;
}

/// Fixed preamble handed to the semantic strategy ahead of the user text.
const EXTRACTION_GUIDE: &str = "Convert the infrastructure request below into \
an intent fragment matching the JSON schema. Interpret \"redundant\" and \
\"high availability\" as multi-AZ, \"secure\" as encryption at rest and in \
transit with least-privilege IAM, and note the target provider. Prefer the \
most common enterprise interpretation when the request is ambiguous.";

// ============================================================================
// Extractor
// ============================================================================

/// The intent extractor. Holds an optional semantic strategy; without one it
/// behaves exactly like a strategy that always fails.
#[derive(Default)]
pub struct IntentExtractor {
    strategy: Option<Arc<dyn ExtractionStrategy>>,
}

impl IntentExtractor {
    pub fn new() -> Self {
        Self { strategy: None }
    }

    pub fn with_strategy(strategy: Arc<dyn ExtractionStrategy>) -> Self {
        Self { strategy: Some(strategy) }
    }

    /// Extract an intent schema from a natural-language request. Total: the
    /// deterministic fallback succeeds for any input string.
    pub async fn extract(&self, request: &IntentRequest) -> IntentIngestion {
        let input = compose_input(request);
        let provider_hint = request.target_provider.unwrap_or(Provider::Aws);

        let fragment = match &self.strategy {
            Some(strategy) => {
                let prompt = strategy_prompt(&input, provider_hint);
                match strategy.extract(&prompt, provider_hint).await {
                    Ok(fragment) => fragment,
                    Err(err) => {
                        tracing::warn!(
                            error = %err,
                            "semantic extraction failed, falling back to keyword rules"
                        );
                        deterministic_extraction(&input, request.target_provider)
                    }
                }
            }
            None => deterministic_extraction(&input, request.target_provider),
        };

        let ambiguities = resolve_ambiguities(&request.natural_language);
        let confidence = calculate_confidence(&fragment, &ambiguities);
        let requires_refinement =
            ambiguities.iter().any(|a| a.confidence < REFINEMENT_THRESHOLD);

        let intent_schema = IntentSchema {
            intent_id: generate_intent_id(),
            tenant_id: request.tenant_id.clone(),
            provider: fragment
                .provider
                .or(request.target_provider)
                .unwrap_or(Provider::Aws),
            natural_language: request.natural_language.clone(),
            resources: fragment.resources,
            networking: fragment.networking.unwrap_or_default(),
            security: fragment.security.unwrap_or(SecurityPosture {
                encryption_at_rest: true,
                encryption_in_transit: true,
                iam_least_privilege: true,
                secrets_management: false,
            }),
            compliance: fragment.compliance.unwrap_or_default(),
            monitoring: fragment.monitoring,
            region: fragment.region,
            confidence,
            created_at: now_iso8601(),
        };

        IntentIngestion {
            intent_schema,
            confidence,
            ambiguities,
            requires_refinement,
        }
    }

    /// Multi-turn refinement: fully re-derives from the stored request text
    /// with the clarification appended. No diffing against the prior schema.
    pub async fn refine(
        &self,
        intent: &IntentSchema,
        refinement: &str,
    ) -> IntentIngestion {
        self.extract(&IntentRequest {
            tenant_id: intent.tenant_id.clone(),
            natural_language: intent.natural_language.clone(),
            target_provider: Some(intent.provider),
            context: Some(ExtractionContext {
                previous_intent_id: Some(intent.intent_id.clone()),
                refinements: vec![refinement.to_string()],
            }),
        })
        .await
    }
}

/// `intent-{:012x}` from the clock, unique enough for one pipeline run.
fn generate_intent_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("intent-{:012x}", nanos & 0xFFFF_FFFF_FFFF)
}

/// The request text plus any refinement lines — the input both extraction
/// paths operate on.
fn compose_input(request: &IntentRequest) -> String {
    let mut input = request.natural_language.clone();
    if let Some(context) = &request.context {
        if !context.refinements.is_empty() {
            input.push_str("\n\nRefinements:\n");
            input.push_str(&context.refinements.join("\n"));
        }
    }
    input
}

/// The full prompt for the semantic strategy: guide, provider, the JSON
/// schema of [`IntentFragment`] so the strategy knows the output contract,
/// and the composed request text.
fn strategy_prompt(input: &str, target_provider: Provider) -> String {
    let schema = schemars::schema_for!(IntentFragment);
    let schema_json = serde_json::to_string(&schema).unwrap_or_default();
    format!(
        "{EXTRACTION_GUIDE}\n\nTarget provider: {target_provider}\n\n\
         Output JSON schema:\n{schema_json}\n\nRequest: {input}"
    )
}

// ============================================================================
// Deterministic extraction
// ============================================================================

/// Keyword-rule extraction, total over any input string.
pub(crate) fn deterministic_extraction(
    input: &str,
    target_provider: Option<Provider>,
) -> IntentFragment {
    let lower = input.to_lowercase();
    let mut resources = Vec::new();

    let wants_large = lower.contains("large");
    let redundant = lower.contains("redundant")
        || has_word(&lower, "ha")
        || lower.contains("high availability");

    if lower.contains("server") || lower.contains("instance") || has_word(&lower, "vm") {
        resources.push(ResourceDeclaration {
            name: "app-server".to_string(),
            config: ResourceConfig::Compute(ComputeConfig {
                instance_type: if wants_large { "large" } else { "medium" }.to_string(),
                count: explicit_count(&lower, r"(\d+)\s+(?:servers|instances)")
                    .unwrap_or(if redundant { 2 } else { 1 }),
                os: if lower.contains("windows") { "windows" } else { "linux" }
                    .to_string(),
            }),
        });
    }

    if lower.contains("database")
        || has_word(&lower, "db")
        || lower.contains("sql")
        || lower.contains("postgres")
    {
        resources.push(ResourceDeclaration {
            name: "app-database".to_string(),
            config: ResourceConfig::Database(DatabaseConfig {
                engine: if lower.contains("mysql") && !lower.contains("postgres") {
                    "mysql"
                } else {
                    "postgresql"
                }
                .to_string(),
                multi_az: redundant,
                size: if wants_large { "large" } else { "medium" }.to_string(),
                ..DatabaseConfig::default()
            }),
        });
    }

    if lower.contains("storage")
        || lower.contains("bucket")
        || lower.contains("files")
        || lower.contains("s3")
    {
        resources.push(ResourceDeclaration {
            name: "app-storage".to_string(),
            config: ResourceConfig::Storage(StorageConfig {
                archive_after_days: lower.contains("archive").then_some(90),
                ..StorageConfig::default()
            }),
        });
    }

    if lower.contains("serverless")
        || lower.contains("lambda")
        || lower.contains("function")
    {
        resources.push(ResourceDeclaration {
            name: "api-functions".to_string(),
            config: ResourceConfig::Serverless(ServerlessConfig::default()),
        });
    }

    if lower.contains("container")
        || lower.contains("docker")
        || lower.contains("kubernetes")
        || lower.contains("k8s")
    {
        resources.push(ResourceDeclaration {
            name: "app-cluster".to_string(),
            config: ResourceConfig::Container(ContainerConfig {
                orchestrator: if lower.contains("kubernetes") || lower.contains("k8s") {
                    "kubernetes"
                } else {
                    "ecs"
                }
                .to_string(),
                node_count: explicit_count(&lower, r"(\d+)\s+nodes")
                    .unwrap_or(if wants_large { 5 } else { 3 }),
                auto_scaling: true,
            }),
        });
    }

    let compliance = ComplianceFlags {
        pci_dss: lower.contains("pci") || lower.contains("payment"),
        hipaa: lower.contains("hipaa") || lower.contains("health"),
        gdpr: lower.contains("gdpr")
            || lower.contains("european")
            || has_word(&lower, "eu"),
        soc2: has_word(&lower, "soc") || lower.contains("audit"),
    };

    let monitoring = (lower.contains("monitor")
        || lower.contains("alert")
        || lower.contains("observab"))
    .then(MonitoringIntent::default);

    let security_groups = if resources.is_empty() {
        Vec::new()
    } else {
        vec![SecurityGroupIntent {
            name: "default-sg".to_string(),
            ingress_rules: Vec::new(),
        }]
    };

    IntentFragment {
        provider: Some(target_provider.unwrap_or(Provider::Aws)),
        resources,
        networking: Some(NetworkingIntent {
            vpc: true,
            security_groups,
            ..NetworkingIntent::default()
        }),
        security: Some(SecurityPosture {
            encryption_at_rest: true,
            encryption_in_transit: true,
            iam_least_privilege: true,
            secrets_management: lower.contains("secret") || lower.contains("credential"),
        }),
        compliance: Some(compliance),
        monitoring,
        region: detect_region(&lower),
    }
}

/// Short trigger tokens match on word boundaries; bare substring matching for
/// "ha" or "eu" would fire on most English sentences.
fn has_word(lower: &str, token: &str) -> bool {
    Regex::new(&format!(r"\b{token}\b"))
        .map(|re| re.is_match(lower))
        .unwrap_or(false)
}

/// `"<N> nodes"`-style explicit counts.
fn explicit_count(lower: &str, pattern: &str) -> Option<u32> {
    let re = Regex::new(pattern).ok()?;
    re.captures(lower)?.get(1)?.as_str().parse().ok()
}

/// First `xx-name-N`-style region token in the text.
fn detect_region(lower: &str) -> Option<String> {
    let re = Regex::new(r"\b[a-z]{2}-[a-z]+-\d\b").ok()?;
    re.find(lower).map(|m| m.as_str().to_string())
}

// ============================================================================
// Ambiguity resolution
// ============================================================================

/// Fixed rule table over phrases in the original request text. Resolutions
/// never mutate the schema here; the extraction rules apply them.
fn resolve_ambiguities(text: &str) -> Vec<Ambiguity> {
    let lower = text.to_lowercase();
    let mut ambiguities = Vec::new();

    if lower.contains("redundant") {
        ambiguities.push(Ambiguity {
            field: "availability".to_string(),
            input_phrase: "redundant".to_string(),
            interpretations: vec![
                "Multi-AZ deployment".to_string(),
                "Read replicas".to_string(),
                "Active-passive failover".to_string(),
            ],
            resolved: "Multi-AZ deployment with automatic failover".to_string(),
            confidence: 0.85,
        });
    }

    if lower.contains("secure") && !lower.contains("security group") {
        ambiguities.push(Ambiguity {
            field: "security".to_string(),
            input_phrase: "secure".to_string(),
            interpretations: vec![
                "Encryption only".to_string(),
                "Encryption + WAF".to_string(),
                "Full security stack".to_string(),
            ],
            resolved: "Encryption at rest + in transit, least-privilege IAM, \
                       secrets management"
                .to_string(),
            confidence: 0.8,
        });
    }

    ambiguities
}

fn calculate_confidence(fragment: &IntentFragment, ambiguities: &[Ambiguity]) -> f64 {
    let mut confidence = 0.95;
    if fragment.resources.is_empty() {
        confidence -= 0.2;
    }
    let unresolved = ambiguities
        .iter()
        .filter(|a| a.confidence < REFINEMENT_THRESHOLD)
        .count();
    confidence -= unresolved as f64 * 0.05;
    confidence.clamp(0.3, 1.0)
}

// ============================================================================
// Tests
// ============================================================================
