//! Building-block module registry — provider templates keyed by
//! `(provider, resource type)`.
//!
//! The built-in catalogue is assembled from the per-provider modules in
//! `blocks/`. A registry also round-trips through YAML so a deployment can
//! ship its own catalogue file; lookups are static configuration data, never
//! mutated at runtime.

use crate::core::types::{Provider, ResourceType};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A variable a building block expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDefinition {
    pub name: String,

    #[serde(rename = "type")]
    pub var_type: String,

    #[serde(default)]
    pub default: Option<serde_json::Value>,

    pub description: String,

    #[serde(default)]
    pub required: bool,
}

impl VariableDefinition {
    pub fn required(name: &str, var_type: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            var_type: var_type.to_string(),
            default: None,
            description: description.to_string(),
            required: true,
        }
    }

    pub fn optional(
        name: &str,
        var_type: &str,
        default: serde_json::Value,
        description: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            var_type: var_type.to_string(),
            default: Some(default),
            description: description.to_string(),
            required: false,
        }
    }
}

/// A reusable provider-specific template for one resource type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingBlock {
    pub name: String,
    pub provider: Provider,
    pub resource_type: ResourceType,

    /// Module source reference, e.g. `./modules/aws-vpc`.
    pub source: String,

    /// Declarative configuration emitted verbatim into the synthesized plan.
    pub template: String,

    #[serde(default)]
    pub variables: Vec<VariableDefinition>,

    #[serde(default)]
    pub outputs: Vec<String>,
}

/// The module catalogue. First block wins when a `(provider, type)` pair is
/// listed twice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleRegistry {
    pub blocks: Vec<BuildingBlock>,
}

impl ModuleRegistry {
    /// The built-in per-provider catalogue. AWS covers every resource type
    /// with a template; Azure and GCP cover network, database, storage,
    /// serverless, and container only.
    pub fn builtin() -> Self {
        let mut blocks = crate::blocks::aws::catalogue();
        blocks.extend(crate::blocks::azure::catalogue());
        blocks.extend(crate::blocks::gcp::catalogue());
        Self { blocks }
    }

    pub fn get(
        &self,
        provider: Provider,
        resource_type: ResourceType,
    ) -> Option<&BuildingBlock> {
        self.blocks
            .iter()
            .find(|b| b.provider == provider && b.resource_type == resource_type)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, String> {
        serde_yaml_ng::from_str(yaml).map_err(|e| format!("registry parse error: {}", e))
    }

    pub fn to_yaml(&self) -> Result<String, String> {
        serde_yaml_ng::to_string(self).map_err(|e| format!("serialize error: {}", e))
    }

    /// Load a catalogue file.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read registry {}: {}", path.display(), e))?;
        Self::from_yaml(&content)
    }

    /// Save a catalogue file atomically (write to temp, then rename).
    pub fn save(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("cannot create dir {}: {}", parent.display(), e))?;
        }
        let yaml = self.to_yaml()?;
        let tmp_path = path.with_extension("yaml.tmp");
        std::fs::write(&tmp_path, &yaml)
            .map_err(|e| format!("cannot write {}: {}", tmp_path.display(), e))?;
        std::fs::rename(&tmp_path, path).map_err(|e| {
            format!(
                "cannot rename {} to {}: {}",
                tmp_path.display(),
                path.display(),
                e
            )
        })?;
        Ok(())
    }
}
