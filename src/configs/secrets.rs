//! `secrets.yaml` — per-project signing keys, under the dot directory.
//!
//! History:
//! - v0: `keyPairs` as an array of `{name, secretKey}` entries.
//! - v1: `keyPairs` becomes a map keyed by name, plus the optional
//!   `defaultKeyName` pointer (migration picks the first array entry).
//!
//! The default is generator-backed: a fresh file embeds a newly derived
//! secret key rather than a placeholder.

use std::collections::BTreeMap;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::builder::ConfigType;
use crate::error::ConfigError;
use crate::handle::{ConfigHandle, ReadonlyConfigHandle};

use super::dot_dir;

pub const SECRETS_CONFIG_FILE: &str = "secrets.yaml";

/// Name given to the key pair a fresh file starts with.
pub const DEFAULT_KEY_NAME: &str = "default";

/// Latest shape (version 1).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SecretsConfig {
    pub version: u32,
    pub key_pairs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_key_name: Option<String>,
}

fn schema_v0() -> Value {
    json!({
        "type": "object",
        "title": "secrets.yaml",
        "description": "Signing keys for this project",
        "properties": {
            "version": { "type": "integer", "const": 0 },
            "keyPairs": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "secretKey": { "type": "string" }
                    },
                    "required": ["name", "secretKey"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["version", "keyPairs"],
        "additionalProperties": false
    })
}

fn schema_v1() -> Value {
    json!({
        "type": "object",
        "title": "secrets.yaml",
        "description": "Signing keys for this project",
        "properties": {
            "version": { "type": "integer", "const": 1 },
            "keyPairs": {
                "type": "object",
                "additionalProperties": { "type": "string" }
            },
            "defaultKeyName": { "type": "string" }
        },
        "required": ["version", "keyPairs"],
        "additionalProperties": false
    })
}

fn migrate_v0_to_v1(value: Value) -> Result<Value, String> {
    let mut map = match value {
        Value::Object(map) => map,
        _ => return Err("secrets config is not an object".into()),
    };
    map.insert("version".into(), json!(1));

    let entries = match map.remove("keyPairs") {
        Some(Value::Array(entries)) => entries,
        _ => return Err("keyPairs is not an array".into()),
    };

    let mut key_pairs = Map::new();
    let mut first_name: Option<String> = None;
    for entry in entries {
        let name = entry["name"]
            .as_str()
            .ok_or("key pair entry has no name")?
            .to_string();
        let secret = entry["secretKey"]
            .as_str()
            .ok_or("key pair entry has no secretKey")?
            .to_string();
        if first_name.is_none() {
            first_name = Some(name.clone());
        }
        key_pairs.insert(name, json!(secret));
    }
    map.insert("keyPairs".into(), Value::Object(key_pairs));
    if let Some(name) = first_name {
        map.insert("defaultKeyName".into(), json!(name));
    }

    Ok(Value::Object(map))
}

fn validate(config: &SecretsConfig) -> Result<(), String> {
    if let Some(name) = &config.default_key_name
        && !config.key_pairs.contains_key(name)
    {
        return Err(format!("defaultKeyName '{name}' is not listed in keyPairs"));
    }
    Ok(())
}

/// Derive a fresh 32-byte secret key, hex-encoded.
pub fn generate_secret_key() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.r#gen();
    hex::encode(bytes)
}

fn generate_default() -> Result<String, String> {
    let secret = generate_secret_key();
    Ok(format!(
        "version: 0\nkeyPairs:\n  - name: {DEFAULT_KEY_NAME}\n    secretKey: {secret}\n"
    ))
}

pub fn secrets_config() -> Result<ConfigType<SecretsConfig>, ConfigError> {
    ConfigType::builder(SECRETS_CONFIG_FILE)
        .schema(schema_v0())
        .schema(schema_v1())
        .migration(migrate_v0_to_v1)
        .default_with(generate_default)
        .validate(validate)
        .build()
}

pub fn init_secrets_config(
    root: &Path,
) -> Result<Option<ConfigHandle<SecretsConfig>>, ConfigError> {
    secrets_config()?.init(&dot_dir(root))
}

pub fn init_readonly_secrets_config(
    root: &Path,
) -> Result<Option<ReadonlyConfigHandle<SecretsConfig>>, ConfigError> {
    secrets_config()?.init_readonly(&dot_dir(root))
}

pub fn init_new_secrets_config(root: &Path) -> Result<ConfigHandle<SecretsConfig>, ConfigError> {
    secrets_config()?.init_new(&dot_dir(root))
}
