//! Read, parse, version-check, and migrate one config file.
//!
//! The pipeline for an existing file:
//!
//! 1. Read and parse YAML (JSON parses as a YAML subset).
//! 2. Read the top-level `version` integer — the sole migration discriminant.
//!    A version matching no registered schema is rejected before any
//!    validation or migration runs.
//! 3. Validate against that version's schema. This catches hand-edited
//!    garbage before a migration step ever sees it.
//! 4. If the version is older than latest, run the migration chain and
//!    persist the migrated content back to disk immediately, so subsequent
//!    loads skip the chain entirely.
//!
//! A missing file is not an error here — the caller decides whether absence
//! means "return nothing" or "materialize the default".

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::migrate;
use crate::patch;
use crate::registry::SchemaRegistry;
use crate::types::DefaultContent;
use crate::validate::render_issues;

/// A successfully loaded file: latest-shape data plus the on-disk document
/// used as the ordering reference for later writes.
#[derive(Debug)]
pub struct Loaded {
    pub data: Value,
    pub doc: serde_yaml::Value,
}

/// Load `path`, migrating to the latest schema version if needed.
///
/// Returns `None` when the file does not exist.
pub fn load(registry: &SchemaRegistry, path: &Path) -> Result<Option<Loaded>, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let (doc, data) = parse_document(path, &raw)?;
    let version = declared_version(registry, path, &data)?;

    let schema = registry
        .schema(version)
        .ok_or_else(|| unknown_version(registry, path, &data["version"]))?;
    if let Err(issues) = schema.check(&data) {
        return Err(ConfigError::SchemaMismatch {
            path: path.to_path_buf(),
            version,
            issues: render_issues(&issues),
        });
    }

    let (data, migrated) = migrate::migrate_to_latest(registry, path, version, data)?;
    if !migrated {
        debug!(path = %path.display(), version, "loaded config");
        return Ok(Some(Loaded { data, doc }));
    }

    // Migrations persist, not merely transform in memory: write the new
    // content back so the chain never runs twice for the same file.
    let (text, doc) = patch::to_yaml_string(&data, Some(&doc)).map_err(|reason| {
        ConfigError::Serialize {
            path: path.to_path_buf(),
            reason,
        }
    })?;
    std::fs::write(path, &text).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    info!(
        path = %path.display(),
        from = version,
        to = registry.latest_version(),
        "migrated config"
    );

    Ok(Some(Loaded { data, doc }))
}

/// Materialize the default content for a config file that doesn't exist yet,
/// creating parent directories as needed.
///
/// The content is written verbatim; the subsequent [`load`] treats the fresh
/// file exactly like any pre-existing one (defaults are authored at version 0
/// and migrate forward on load, never at the latest version directly).
pub fn create(path: &Path, default: &DefaultContent) -> Result<(), ConfigError> {
    let content = default
        .materialize()
        .map_err(|reason| ConfigError::Serialize {
            path: path.to_path_buf(),
            reason,
        })?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, &content).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    info!(path = %path.display(), "created config from default");
    Ok(())
}

/// Parse YAML text into both the ordering document and the JSON value the
/// validator and migrations operate on.
fn parse_document(
    path: &Path,
    raw: &str,
) -> Result<(serde_yaml::Value, Value), ConfigError> {
    let parse_error = |reason: String| ConfigError::Parse {
        path: path.to_path_buf(),
        reason,
    };

    let doc: serde_yaml::Value =
        serde_yaml::from_str(raw).map_err(|e| parse_error(e.to_string()))?;
    // Non-string keys and YAML-only constructs fail the conversion; the
    // engine's data model is the JSON tree.
    let data: Value = serde_json::to_value(&doc).map_err(|e| parse_error(e.to_string()))?;
    Ok((doc, data))
}

/// Extract the declared `version` field as a registered schema version.
fn declared_version(
    registry: &SchemaRegistry,
    path: &Path,
    data: &Value,
) -> Result<u32, ConfigError> {
    let field = data.get("version").ok_or_else(|| ConfigError::MissingVersion {
        path: path.to_path_buf(),
    })?;
    field
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| unknown_version(registry, path, field))
}

fn unknown_version(registry: &SchemaRegistry, path: &Path, found: &Value) -> ConfigError {
    ConfigError::UnknownVersion {
        path: path.to_path_buf(),
        found: found.to_string(),
        latest: registry.latest_version(),
    }
}
