//! `project.yaml` — the project manifest at the project root.
//!
//! History:
//! - v0: `{version, env?}` — just the target network.
//! - v1: adds the required `services` map (service name → source reference).
//! - v2: renames `env` to `defaultEnv` and adds the optional
//!   `defaultService` shortcut.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::builder::ConfigType;
use crate::error::ConfigError;
use crate::handle::{ConfigHandle, ReadonlyConfigHandle};

use super::{NETWORKS, project_root};

pub const PROJECT_CONFIG_FILE: &str = "project.yaml";

const DEFAULT_TEMPLATE: &str = "\
version: 0

# Uncomment to pin the network this project targets:
# env: testnet
";

/// Latest shape (version 2).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectConfig {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_env: Option<String>,
    pub services: BTreeMap<String, ServiceRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_service: Option<String>,
}

/// Where a service's module comes from (a path or URL understood by the
/// build pipeline).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ServiceRef {
    pub get: String,
}

fn schema_v0() -> Value {
    json!({
        "type": "object",
        "title": "project.yaml",
        "description": "Nebula project manifest",
        "properties": {
            "version": { "type": "integer", "const": 0 },
            "env": { "type": "string", "enum": NETWORKS }
        },
        "required": ["version"],
        "additionalProperties": false
    })
}

fn schema_v1() -> Value {
    json!({
        "type": "object",
        "title": "project.yaml",
        "description": "Nebula project manifest",
        "properties": {
            "version": { "type": "integer", "const": 1 },
            "env": { "type": "string", "enum": NETWORKS },
            "services": {
                "type": "object",
                "additionalProperties": {
                    "type": "object",
                    "properties": { "get": { "type": "string" } },
                    "required": ["get"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["version", "services"],
        "additionalProperties": false
    })
}

fn schema_v2() -> Value {
    json!({
        "type": "object",
        "title": "project.yaml",
        "description": "Nebula project manifest",
        "properties": {
            "version": { "type": "integer", "const": 2 },
            "defaultEnv": { "type": "string", "enum": NETWORKS },
            "services": {
                "type": "object",
                "additionalProperties": {
                    "type": "object",
                    "properties": { "get": { "type": "string" } },
                    "required": ["get"],
                    "additionalProperties": false
                }
            },
            "defaultService": { "type": "string" }
        },
        "required": ["version", "services"],
        "additionalProperties": false
    })
}

fn migrate_v0_to_v1(mut value: Value) -> Result<Value, String> {
    value["version"] = json!(1);
    value["services"] = json!({});
    Ok(value)
}

fn migrate_v1_to_v2(mut value: Value) -> Result<Value, String> {
    let map = value.as_object_mut().ok_or("project config is not an object")?;
    map.insert("version".into(), json!(2));
    if let Some(env) = map.remove("env") {
        map.insert("defaultEnv".into(), env);
    }
    Ok(value)
}

fn validate(config: &ProjectConfig) -> Result<(), String> {
    if let Some(name) = &config.default_service
        && !config.services.contains_key(name)
    {
        return Err(format!(
            "defaultService '{name}' is not listed in services"
        ));
    }
    Ok(())
}

pub fn project_config() -> Result<ConfigType<ProjectConfig>, ConfigError> {
    ConfigType::builder(PROJECT_CONFIG_FILE)
        .schema(schema_v0())
        .schema(schema_v1())
        .schema(schema_v2())
        .migration(migrate_v0_to_v1)
        .migration(migrate_v1_to_v2)
        .default_template(DEFAULT_TEMPLATE)
        .validate(validate)
        .build()
}

pub fn init_project_config(
    root: &Path,
) -> Result<Option<ConfigHandle<ProjectConfig>>, ConfigError> {
    project_config()?.init(&project_root(root))
}

pub fn init_readonly_project_config(
    root: &Path,
) -> Result<Option<ReadonlyConfigHandle<ProjectConfig>>, ConfigError> {
    project_config()?.init_readonly(&project_root(root))
}

pub fn init_new_project_config(root: &Path) -> Result<ConfigHandle<ProjectConfig>, ConfigError> {
    project_config()?.init_new(&project_root(root))
}
