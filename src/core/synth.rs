//! Synthesis — validated intent schema plus module registry in, declarative
//! configuration text out.
//!
//! Output order is fixed: provider preamble, network block, resource blocks
//! in declaration order, IAM block when least-privilege is set, variables
//! section, outputs section. Resources whose `(provider, type)` pair has no
//! registered building block are skipped without error; the gap is logged at
//! debug level but the result contract stays the same.

use crate::core::registry::{BuildingBlock, ModuleRegistry};
use crate::core::types::{
    IntentSchema, Provider, ResourceConfig, ResourceDeclaration, ResourceType,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A building block chosen for the plan, with its bound variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedModule {
    pub name: String,
    pub source: String,
    pub version: String,
    pub variables: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisResult {
    pub intent_id: String,
    pub configuration_text: String,
    pub modules_used: Vec<SelectedModule>,
    pub variables: IndexMap<String, Value>,
    pub outputs: IndexMap<String, String>,
    pub estimated_apply_duration_secs: u64,
}

/// The synthesis engine. Holds the module catalogue; synthesizing is a pure
/// function of the schema and that catalogue.
pub struct SynthesisEngine {
    registry: ModuleRegistry,
}

impl Default for SynthesisEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthesisEngine {
    pub fn new() -> Self {
        Self { registry: ModuleRegistry::builtin() }
    }

    pub fn with_registry(registry: ModuleRegistry) -> Self {
        Self { registry }
    }

    /// Synthesize configuration for a schema. Never fails: providers with an
    /// empty catalogue still yield a well-formed (mostly empty) result.
    pub fn synthesize(&self, ir: &IntentSchema) -> SynthesisResult {
        let mut sections = vec![preamble(ir.provider)];
        let mut modules_used: Vec<SelectedModule> = Vec::new();
        let mut variables: IndexMap<String, Value> = IndexMap::new();
        let mut outputs: IndexMap<String, String> = IndexMap::new();

        let network_block = if ir.networking.vpc {
            self.registry.get(ir.provider, ResourceType::Network)
        } else {
            None
        };

        if let Some(block) = network_block {
            let mut vars: IndexMap<String, Value> = IndexMap::new();
            vars.insert("network_name".to_string(), json!(format!("{}-vpc", ir.intent_id)));
            vars.insert("cidr_block".to_string(), json!("10.0.0.0/16"));
            vars.insert("public_subnets".to_string(), json!(ir.networking.subnets.public));
            vars.insert("private_subnets".to_string(), json!(ir.networking.subnets.private));
            emit(block, vars, &mut sections, &mut modules_used, &mut variables, &mut outputs);
        }

        for resource in &ir.resources {
            let Some(block) = self.registry.get(ir.provider, resource.resource_type())
            else {
                tracing::debug!(
                    resource = %resource.name,
                    resource_type = %resource.resource_type(),
                    provider = %ir.provider,
                    "no building block registered, skipping resource"
                );
                continue;
            };
            let vars = bind_variables(ir, resource, network_block);
            emit(block, vars, &mut sections, &mut modules_used, &mut variables, &mut outputs);
        }

        if self.registry.get(ir.provider, ResourceType::Network).is_some()
            && ir.security.iam_least_privilege
        {
            sections.push(iam_block(ir.provider));
        }

        sections.push(variables_section(&variables));
        sections.push(outputs_section(&outputs));

        SynthesisResult {
            intent_id: ir.intent_id.clone(),
            configuration_text: sections.join("\n\n"),
            estimated_apply_duration_secs: (modules_used.len() as u64 * 3 + 2) * 60,
            modules_used,
            variables,
            outputs,
        }
    }
}

fn emit(
    block: &BuildingBlock,
    vars: IndexMap<String, Value>,
    sections: &mut Vec<String>,
    modules_used: &mut Vec<SelectedModule>,
    variables: &mut IndexMap<String, Value>,
    outputs: &mut IndexMap<String, String>,
) {
    sections.push(block.template.clone());
    for (name, value) in &vars {
        variables.insert(name.clone(), value.clone());
    }
    for output in &block.outputs {
        outputs.insert(output.clone(), format!("module.{}.{}", block.name, output));
    }
    modules_used.push(SelectedModule {
        name: block.name.clone(),
        source: block.source.clone(),
        version: "1.0.0".to_string(),
        variables: vars,
    });
}

/// Translate a resource's typed config into the variables its block expects.
fn bind_variables(
    ir: &IntentSchema,
    resource: &ResourceDeclaration,
    network_block: Option<&BuildingBlock>,
) -> IndexMap<String, Value> {
    let provider = ir.provider;
    let mut vars: IndexMap<String, Value> = IndexMap::new();

    match &resource.config {
        ResourceConfig::Compute(c) => {
            vars.insert(
                "instance_type".to_string(),
                json!(compute_tier(provider, &c.instance_type)),
            );
            vars.insert("count".to_string(), json!(c.count));
            if let Some(net) = network_block {
                vars.insert("subnet_id".to_string(), json!(subnet_reference(net)));
            }
        }
        ResourceConfig::Database(db) => {
            vars.insert("engine".to_string(), json!(db.engine));
            vars.insert(
                "instance_class".to_string(),
                json!(database_tier(provider, &db.size)),
            );
            vars.insert("multi_az".to_string(), json!(db.multi_az));
        }
        ResourceConfig::Storage(s) => {
            vars.insert(
                "bucket_name".to_string(),
                json!(format!("{}-{}", ir.intent_id, resource.name)),
            );
            vars.insert("versioning".to_string(), json!(s.versioning));
        }
        ResourceConfig::Serverless(s) => {
            vars.insert("function_name".to_string(), json!(resource.name));
            vars.insert("runtime".to_string(), json!(s.runtime));
            vars.insert("memory_size".to_string(), json!(s.memory_mb));
        }
        ResourceConfig::Container(c) => {
            vars.insert("cluster_name".to_string(), json!(resource.name));
            vars.insert("node_count".to_string(), json!(c.node_count));
        }
        ResourceConfig::Network(_n) => {
            vars.insert("network_name".to_string(), json!(resource.name));
        }
        ResourceConfig::Application(a) => {
            vars.insert("queue_name".to_string(), json!(resource.name));
            vars.insert("fifo".to_string(), json!(a.fifo));
        }
    }

    vars
}

/// Wire compute instances into the emitted network module's private subnets.
fn subnet_reference(network: &BuildingBlock) -> String {
    let output = network
        .outputs
        .iter()
        .find(|o| o.contains("private_subnet"))
        .or_else(|| network.outputs.first());
    match output {
        Some(output) => format!("module.{}.{}[0]", network.name, output),
        None => "var.subnet_id".to_string(),
    }
}

fn compute_tier(provider: Provider, size: &str) -> &'static str {
    match (provider, size == "large") {
        (Provider::Aws, true) => "m5.large",
        (Provider::Aws, false) => "t3.medium",
        (Provider::Azure, true) => "Standard_D4s_v5",
        (Provider::Azure, false) => "Standard_D2s_v5",
        (Provider::Gcp, true) => "n2-standard-4",
        (Provider::Gcp, false) => "e2-medium",
    }
}

fn database_tier(provider: Provider, size: &str) -> &'static str {
    match (provider, size == "large") {
        (Provider::Aws, true) => "db.r5.large",
        (Provider::Aws, false) => "db.t3.medium",
        (Provider::Azure, true) => "GP_Gen5_4",
        (Provider::Azure, false) => "GP_Gen5_2",
        (Provider::Gcp, true) => "db-custom-4-16384",
        (Provider::Gcp, false) => "db-custom-2-8192",
    }
}

fn preamble(provider: Provider) -> String {
    match provider {
        Provider::Aws => r#"terraform {
  required_version = ">= 1.5"
  required_providers {
    aws = { source = "hashicorp/aws", version = "~> 5.0" }
  }
}

provider "aws" {
  region = var.region
}"#,
        Provider::Azure => r#"terraform {
  required_version = ">= 1.5"
  required_providers {
    azurerm = { source = "hashicorp/azurerm", version = "~> 3.0" }
  }
}

provider "azurerm" {
  features {}
}"#,
        Provider::Gcp => r#"terraform {
  required_version = ">= 1.5"
  required_providers {
    google = { source = "hashicorp/google", version = "~> 5.0" }
  }
}

provider "google" {
  project = var.project_id
  region  = var.region
}"#,
    }
    .to_string()
}

fn iam_block(provider: Provider) -> String {
    match provider {
        Provider::Aws => r#"resource "aws_iam_role" "app_role" {
  name = "${var.app_name}-role"
  assume_role_policy = jsonencode({
    Version = "2012-10-17"
    Statement = [{
      Action    = "sts:AssumeRole"
      Effect    = "Allow"
      Principal = { Service = "ec2.amazonaws.com" }
    }]
  })
}"#,
        Provider::Azure => r#"resource "azurerm_role_assignment" "app" {
  scope                = var.resource_group_id
  role_definition_name = "Reader"
  principal_id         = var.app_principal_id
}"#,
        Provider::Gcp => r#"resource "google_project_iam_member" "app" {
  project = var.project_id
  role    = "roles/viewer"
  member  = "serviceAccount:${var.app_service_account}"
}"#,
    }
    .to_string()
}

/// One empty stanza per distinct collected variable name, in collection
/// order; bound values live in `SynthesisResult.variables`.
fn variables_section(variables: &IndexMap<String, Value>) -> String {
    let mut text = String::from("# Variables");
    for name in variables.keys() {
        text.push_str(&format!("\nvariable \"{name}\" {{}}"));
    }
    text
}

fn outputs_section(outputs: &IndexMap<String, String>) -> String {
    let mut text = String::from("# Outputs");
    for (name, reference) in outputs {
        text.push_str(&format!("\noutput \"{name}\" {{\n  value = {reference}\n}}"));
    }
    text
}
