//! Azure building blocks. Compute and application have no template yet, so
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
        provider: Provider::Azure,
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
            "azure-vnet",
            ResourceType::Network,
            r#"resource "azurerm_virtual_network" "main" {
  name                = var.network_name
  location            = var.location
  resource_group_name = var.resource_group_name
  address_space       = [var.cidr_block]
}"#,
            vec![
                VariableDefinition::required("network_name", "string", "VNet name"),
                VariableDefinition::optional(
                    "cidr_block",
                    "string",
                    json!("10.0.0.0/16"),
                    "Address space",
                ),
            ],
            &["vnet_id"],
        ),
        block(
            "azure-sql",
            ResourceType::Database,
            r#"resource "azurerm_mssql_server" "main" {
  name                = var.server_name
  resource_group_name = var.resource_group_name
  location            = var.location
  version             = "12.0"
}

resource "azurerm_mssql_database" "main" {
  name      = "${var.server_name}-db"
  server_id = azurerm_mssql_server.main.id
  sku_name  = var.instance_class
}"#,
            vec![
                VariableDefinition::required("server_name", "string", "SQL server name"),
                VariableDefinition::optional(
                    "instance_class",
                    "string",
                    json!("GP_Gen5_2"),
                    "Database SKU",
                ),
            ],
            &["server_id", "fqdn"],
        ),
        block(
            "azure-blob",
            ResourceType::Storage,
            r#"resource "azurerm_storage_account" "main" {
  name                     = var.account_name
  resource_group_name      = var.resource_group_name
  location                 = var.location
  account_tier             = "Standard"
  account_replication_type = "LRS"
}"#,
            vec![VariableDefinition::required(
                "account_name",
                "string",
                "Storage account",
            )],
            &["primary_blob_endpoint"],
        ),
        block(
            "azure-functions",
            ResourceType::Serverless,
            r#"resource "azurerm_linux_function_app" "main" {
  name                = var.function_name
  resource_group_name = var.resource_group_name
  location            = var.location
}"#,
            vec![VariableDefinition::required(
                "function_name",
                "string",
                "Function app name",
            )],
            &["default_hostname"],
        ),
        block(
            "azure-aks",
            ResourceType::Container,
            r#"resource "azurerm_kubernetes_cluster" "main" {
  name                = var.cluster_name
  location            = var.location
  resource_group_name = var.resource_group_name
  dns_prefix          = var.cluster_name

  default_node_pool {
    name       = "default"
    node_count = var.node_count
  }
}"#,
            vec![
                VariableDefinition::required("cluster_name", "string", "AKS cluster name"),
                VariableDefinition::optional("node_count", "number", json!(3), "Node count"),
            ],
            &["cluster_id", "kube_config"],
        ),
    ]
}
