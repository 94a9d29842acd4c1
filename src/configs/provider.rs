//! `provider.yaml` — compute peers and the offers built from them, at the
//! project root.
//!
//! History:
//! - v0: `{version, peers{name -> {port}}}`.
//! - v1: each peer gains a required `computeUnits` (migration backfills `1`),
//!   and the required `offers` map arrives (migration starts it empty).
//!
//! Offers reference peers by name; that cross-field invariant is checked by
//! the validate callback, not the schema.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::builder::ConfigType;
use crate::error::ConfigError;
use crate::handle::{ConfigHandle, ReadonlyConfigHandle};

use super::project_root;

pub const PROVIDER_CONFIG_FILE: &str = "provider.yaml";

const DEFAULT_TEMPLATE: &str = "\
version: 0
peers:
  peer-0:
    port: 7001
";

/// Latest shape (version 1).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProviderConfig {
    pub version: u32,
    pub peers: BTreeMap<String, PeerConfig>,
    pub offers: BTreeMap<String, Offer>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PeerConfig {
    pub port: u16,
    pub compute_units: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Offer {
    pub peers: Vec<String>,
}

fn schema_v0() -> Value {
    json!({
        "type": "object",
        "title": "provider.yaml",
        "description": "Compute peers this provider runs",
        "properties": {
            "version": { "type": "integer", "const": 0 },
            "peers": {
                "type": "object",
                "additionalProperties": {
                    "type": "object",
                    "properties": {
                        "port": { "type": "integer", "minimum": 1, "maximum": 65535 }
                    },
                    "required": ["port"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["version", "peers"],
        "additionalProperties": false
    })
}

fn schema_v1() -> Value {
    json!({
        "type": "object",
        "title": "provider.yaml",
        "description": "Compute peers this provider runs and the offers built from them",
        "properties": {
            "version": { "type": "integer", "const": 1 },
            "peers": {
                "type": "object",
                "additionalProperties": {
                    "type": "object",
                    "properties": {
                        "port": { "type": "integer", "minimum": 1, "maximum": 65535 },
                        "computeUnits": { "type": "integer", "minimum": 1 }
                    },
                    "required": ["port", "computeUnits"],
                    "additionalProperties": false
                }
            },
            "offers": {
                "type": "object",
                "additionalProperties": {
                    "type": "object",
                    "properties": {
                        "peers": {
                            "type": "array",
                            "items": { "type": "string" }
                        }
                    },
                    "required": ["peers"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["version", "peers", "offers"],
        "additionalProperties": false
    })
}

fn migrate_v0_to_v1(mut value: Value) -> Result<Value, String> {
    value["version"] = json!(1);
    let peers = value["peers"]
        .as_object_mut()
        .ok_or("peers is not an object")?;
    for peer in peers.values_mut() {
        let peer = peer.as_object_mut().ok_or("peer entry is not an object")?;
        peer.entry("computeUnits").or_insert(json!(1));
    }
    value["offers"] = json!({});
    Ok(value)
}

fn validate(config: &ProviderConfig) -> Result<(), String> {
    for (offer_name, offer) in &config.offers {
        for peer_name in &offer.peers {
            if !config.peers.contains_key(peer_name) {
                return Err(format!(
                    "offer '{offer_name}' references unknown peer '{peer_name}'"
                ));
            }
        }
    }
    Ok(())
}

pub fn provider_config() -> Result<ConfigType<ProviderConfig>, ConfigError> {
    ConfigType::builder(PROVIDER_CONFIG_FILE)
        .schema(schema_v0())
        .schema(schema_v1())
        .migration(migrate_v0_to_v1)
        .default_template(DEFAULT_TEMPLATE)
        .validate(validate)
        .build()
}

pub fn init_provider_config(
    root: &Path,
) -> Result<Option<ConfigHandle<ProviderConfig>>, ConfigError> {
    provider_config()?.init(&project_root(root))
}

pub fn init_readonly_provider_config(
    root: &Path,
) -> Result<Option<ReadonlyConfigHandle<ProviderConfig>>, ConfigError> {
    provider_config()?.init_readonly(&project_root(root))
}

pub fn init_new_provider_config(
    root: &Path,
) -> Result<ConfigHandle<ProviderConfig>, ConfigError> {
    provider_config()?.init_new(&project_root(root))
}
