//! `env.yaml` — the network this checkout currently targets, under the dot
//! directory.
//!
//! v0 and v1 carry the same fields; v1 only bumps the version constant (the
//! serialization era split when the dot directory layout changed). The
//! migration is a pure version bump.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::builder::ConfigType;
use crate::error::ConfigError;
use crate::handle::{ConfigHandle, ReadonlyConfigHandle};

use super::{NETWORKS, dot_dir};

pub const ENV_CONFIG_FILE: &str = "env.yaml";

const DEFAULT_TEMPLATE: &str = "\
version: 0

# Uncomment to override the network for this checkout:
# env: testnet
";

/// Latest shape (version 1).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EnvConfig {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
}

fn schema(version: u32) -> Value {
    json!({
        "type": "object",
        "title": "env.yaml",
        "description": "Network targeted by this checkout",
        "properties": {
            "version": { "type": "integer", "const": version },
            "env": { "type": "string", "enum": NETWORKS }
        },
        "required": ["version"],
        "additionalProperties": false
    })
}

fn migrate_v0_to_v1(mut value: Value) -> Result<Value, String> {
    value["version"] = json!(1);
    Ok(value)
}

pub fn env_config() -> Result<ConfigType<EnvConfig>, ConfigError> {
    ConfigType::builder(ENV_CONFIG_FILE)
        .schema(schema(0))
        .schema(schema(1))
        .migration(migrate_v0_to_v1)
        .default_template(DEFAULT_TEMPLATE)
        .build()
}

pub fn init_env_config(root: &Path) -> Result<Option<ConfigHandle<EnvConfig>>, ConfigError> {
    env_config()?.init(&dot_dir(root))
}

pub fn init_readonly_env_config(
    root: &Path,
) -> Result<Option<ReadonlyConfigHandle<EnvConfig>>, ConfigError> {
    env_config()?.init_readonly(&dot_dir(root))
}

pub fn init_new_env_config(root: &Path) -> Result<ConfigHandle<EnvConfig>, ConfigError> {
    env_config()?.init_new(&dot_dir(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::DOT_DIR;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn v0_file_loads_as_v1_and_disk_is_rewritten() {
        let dir = TempDir::new().unwrap();
        let dot = dir.path().join(DOT_DIR);
        fs::create_dir_all(&dot).unwrap();
        fs::write(dot.join(ENV_CONFIG_FILE), "version: 0\nenv: testnet\n").unwrap();

        let handle = init_env_config(dir.path()).unwrap().unwrap();
        assert_eq!(handle.version, 1);
        assert_eq!(handle.env.as_deref(), Some("testnet"));

        let on_disk = fs::read_to_string(dot.join(ENV_CONFIG_FILE)).unwrap();
        assert_eq!(on_disk, "version: 1\nenv: testnet\n");
    }

    #[test]
    fn default_template_loads_with_no_env_set() {
        let dir = TempDir::new().unwrap();
        let handle = init_new_env_config(dir.path()).unwrap();
        assert_eq!(handle.version, 1);
        assert_eq!(handle.env, None);
    }

    #[test]
    fn setting_the_env_and_committing() {
        let dir = TempDir::new().unwrap();
        let mut handle = init_new_env_config(dir.path()).unwrap();
        handle.env = Some("mainnet".into());
        handle.commit().unwrap();

        let reloaded = init_readonly_env_config(dir.path()).unwrap().unwrap();
        assert_eq!(reloaded.env.as_deref(), Some("mainnet"));
    }

    #[test]
    fn unknown_network_rejected() {
        let dir = TempDir::new().unwrap();
        let dot = dir.path().join(DOT_DIR);
        fs::create_dir_all(&dot).unwrap();
        fs::write(dot.join(ENV_CONFIG_FILE), "version: 1\nenv: moonnet\n").unwrap();

        let err = init_env_config(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::SchemaMismatch { .. }));
    }
}
