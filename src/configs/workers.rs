//! `workers.yaml` — deployment records, under the dot directory.
//!
//! History:
//! - v0: one flat `workers` map.
//! - v1: splits into `hosts` (direct deployments to named peers; the old
//!   entries move here) and `deals` (deal-backed deployments, starts empty).

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::builder::ConfigType;
use crate::error::ConfigError;
use crate::handle::{ConfigHandle, ReadonlyConfigHandle};

use super::dot_dir;

pub const WORKERS_CONFIG_FILE: &str = "workers.yaml";

const DEFAULT_TEMPLATE: &str = "\
version: 0
workers: {}
";

/// Latest shape (version 1).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WorkersConfig {
    pub version: u32,
    pub hosts: BTreeMap<String, HostWorker>,
    pub deals: BTreeMap<String, DealWorker>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HostWorker {
    pub worker_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DealWorker {
    pub deal_id: String,
    #[serde(default)]
    pub worker_ids: Vec<String>,
}

fn schema_v0() -> Value {
    json!({
        "type": "object",
        "title": "workers.yaml",
        "description": "Deployment records for this project",
        "properties": {
            "version": { "type": "integer", "const": 0 },
            "workers": {
                "type": "object",
                "additionalProperties": {
                    "type": "object",
                    "properties": { "workerId": { "type": "string" } },
                    "required": ["workerId"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["version", "workers"],
        "additionalProperties": false
    })
}

fn schema_v1() -> Value {
    json!({
        "type": "object",
        "title": "workers.yaml",
        "description": "Deployment records for this project",
        "properties": {
            "version": { "type": "integer", "const": 1 },
            "hosts": {
                "type": "object",
                "additionalProperties": {
                    "type": "object",
                    "properties": { "workerId": { "type": "string" } },
                    "required": ["workerId"],
                    "additionalProperties": false
                }
            },
            "deals": {
                "type": "object",
                "additionalProperties": {
                    "type": "object",
                    "properties": {
                        "dealId": { "type": "string" },
                        "workerIds": {
                            "type": "array",
                            "items": { "type": "string" }
                        }
                    },
                    "required": ["dealId"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["version", "hosts", "deals"],
        "additionalProperties": false
    })
}

fn migrate_v0_to_v1(mut value: Value) -> Result<Value, String> {
    let map = value.as_object_mut().ok_or("workers config is not an object")?;
    map.insert("version".into(), json!(1));
    let workers = map.remove("workers").ok_or("missing workers")?;
    map.insert("hosts".into(), workers);
    map.insert("deals".into(), json!({}));
    Ok(value)
}

pub fn workers_config() -> Result<ConfigType<WorkersConfig>, ConfigError> {
    ConfigType::builder(WORKERS_CONFIG_FILE)
        .schema(schema_v0())
        .schema(schema_v1())
        .migration(migrate_v0_to_v1)
        .default_template(DEFAULT_TEMPLATE)
        .build()
}

pub fn init_workers_config(
    root: &Path,
) -> Result<Option<ConfigHandle<WorkersConfig>>, ConfigError> {
    workers_config()?.init(&dot_dir(root))
}

pub fn init_readonly_workers_config(
    root: &Path,
) -> Result<Option<ReadonlyConfigHandle<WorkersConfig>>, ConfigError> {
    workers_config()?.init_readonly(&dot_dir(root))
}

pub fn init_new_workers_config(root: &Path) -> Result<ConfigHandle<WorkersConfig>, ConfigError> {
    workers_config()?.init_new(&dot_dir(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::DOT_DIR;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_template_creates_dot_dir_and_file() {
        let dir = TempDir::new().unwrap();
        let handle = init_new_workers_config(dir.path()).unwrap();
        assert_eq!(handle.version, 1);
        assert!(handle.hosts.is_empty());
        assert!(handle.deals.is_empty());
        assert!(dir.path().join(DOT_DIR).join(WORKERS_CONFIG_FILE).exists());
    }

    #[test]
    fn v0_workers_move_to_hosts() {
        let dir = TempDir::new().unwrap();
        let dot = dir.path().join(DOT_DIR);
        fs::create_dir_all(&dot).unwrap();
        fs::write(
            dot.join(WORKERS_CONFIG_FILE),
            "version: 0\nworkers:\n  adder:\n    workerId: 12D3KooW\n",
        )
        .unwrap();

        let handle = init_workers_config(dir.path()).unwrap().unwrap();
        assert_eq!(handle.hosts["adder"].worker_id, "12D3KooW");
        assert!(handle.deals.is_empty());

        let on_disk = fs::read_to_string(dot.join(WORKERS_CONFIG_FILE)).unwrap();
        assert!(on_disk.contains("hosts:"));
        assert!(!on_disk.contains("workers:"));
    }

    #[test]
    fn recording_a_deal_deployment() {
        let dir = TempDir::new().unwrap();
        let mut handle = init_new_workers_config(dir.path()).unwrap();
        handle.deals.insert(
            "adder".into(),
            DealWorker {
                deal_id: "0xabc".into(),
                worker_ids: vec!["12D3KooW".into()],
            },
        );
        handle.commit().unwrap();

        let reloaded = init_readonly_workers_config(dir.path()).unwrap().unwrap();
        assert_eq!(reloaded.deals["adder"].deal_id, "0xabc");
        assert_eq!(reloaded.deals["adder"].worker_ids.len(), 1);
    }

    #[test]
    fn missing_file_without_forced_creation_is_none() {
        let dir = TempDir::new().unwrap();
        let handle = init_readonly_workers_config(dir.path()).unwrap();
        assert!(handle.is_none());
    }
}
