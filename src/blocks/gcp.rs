//! GCP building blocks. Compute and application have no template yet, so
//! those resource types fall through synthesis unmapped.

use crate::core::registry::{BuildingBlock, VariableDefinition};
use crate::core::types::{Provider, ResourceType};
use serde_json::json;

fn block(
    name: &str,
    resource_type: ResourceType,
    template: &str,
    variables: Vec<VariableDefinition>,
    outputs: &[&str],
) -> BuildingBlock {
    BuildingBlock {
        name: name.to_string(),
        provider: Provider::Gcp,
        resource_type,
        source: format!("./modules/{name}"),
        template: template.to_string(),
        variables,
        outputs: outputs.iter().map(|o| o.to_string()).collect(),
    }
}

pub fn catalogue() -> Vec<BuildingBlock> {
    vec![
        block(
            "gcp-vpc",
            ResourceType::Network,
            r#"resource "google_compute_network" "main" {
  name                    = var.network_name
  auto_create_subnetworks = false
  project                 = var.project_id
}"#,
            vec![VariableDefinition::required("network_name", "string", "VPC name")],
            &["network_id"],
        ),
        block(
            "gcp-cloudsql",
            ResourceType::Database,
            r#"resource "google_sql_database_instance" "main" {
  name             = var.instance_name
  database_version = var.database_version
  region           = var.region
  project          = var.project_id

  settings {
    tier              = var.instance_class
    availability_type = var.multi_az ? "REGIONAL" : "ZONAL"
  }
}"#,
            vec![
                VariableDefinition::required("instance_name", "string", "Instance name"),
                VariableDefinition::optional(
                    "database_version",
                    "string",
                    json!("POSTGRES_16"),
                    "Engine version",
                ),
                VariableDefinition::optional(
                    "instance_class",
                    "string",
                    json!("db-custom-2-8192"),
                    "Machine tier",
                ),
                VariableDefinition::optional(
                    "multi_az",
                    "bool",
                    json!(false),
                    "Regional availability",
                ),
            ],
            &["connection_name", "ip_address"],
        ),
        block(
            "gcp-gcs",
            ResourceType::Storage,
            r#"resource "google_storage_bucket" "main" {
  name                        = var.bucket_name
  location                    = var.location
  project                     = var.project_id
  uniform_bucket_level_access = true

  versioning { enabled = var.versioning }
}"#,
            vec![
                VariableDefinition::required("bucket_name", "string", "Bucket name"),
                VariableDefinition::optional(
                    "versioning",
                    "bool",
                    json!(true),
                    "Enable versioning",
                ),
            ],
            &["bucket_url"],
        ),
        block(
            "gcp-functions",
            ResourceType::Serverless,
            r#"resource "google_cloudfunctions2_function" "main" {
  name     = var.function_name
  location = var.region
  project  = var.project_id
}"#,
            vec![VariableDefinition::required(
                "function_name",
                "string",
                "Function name",
            )],
            &["function_uri"],
        ),
        block(
            "gcp-gke",
            ResourceType::Container,
            r#"resource "google_container_cluster" "main" {
  name               = var.cluster_name
  location           = var.region
  project            = var.project_id
  initial_node_count = var.node_count
}"#,
            vec![
                VariableDefinition::required("cluster_name", "string", "GKE cluster name"),
                VariableDefinition::optional("node_count", "number", json!(3), "Node count"),
            ],
            &["cluster_endpoint", "cluster_ca_certificate"],
        ),
    ]
}
