//! Step-by-step migration of a parsed value up to the latest schema version.
//!
//! The chain runs one version transition at a time, re-validating the result
//! against the next version's schema after every step. That re-validation is a
//! regression guard for migration authors, not an end-user check: a step that
//! produces anything other than exactly the next shape fails loudly here
//! instead of corrupting the file.

use std::path::Path;

use serde_json::Value;

use crate::error::ConfigError;
use crate::registry::SchemaRegistry;
use crate::validate::render_issues;

/// Apply the migration chain from `from` up to the registry's latest version.
///
/// Returns the migrated value and whether any step actually ran. When `from`
/// already equals the latest version the chain is not invoked at all and the
/// value is returned untouched.
///
/// The caller must have validated `data` against schema `from` beforehand.
pub fn migrate_to_latest(
    registry: &SchemaRegistry,
    path: &Path,
    from: u32,
    data: Value,
) -> Result<(Value, bool), ConfigError> {
    let latest = registry.latest_version();
    if from == latest {
        return Ok((data, false));
    }

    let mut data = data;
    let mut version = from;
    while version < latest {
        let next = version + 1;
        let step = registry
            .migration(version)
            .ok_or_else(|| ConfigError::MigrationFailed {
                path: path.to_path_buf(),
                from: version,
                to: next,
                reason: "no migration registered".into(),
            })?;

        data = step(data).map_err(|reason| ConfigError::MigrationFailed {
            path: path.to_path_buf(),
            from: version,
            to: next,
            reason,
        })?;

        let next_schema =
            registry
                .schema(next)
                .ok_or_else(|| ConfigError::MigrationFailed {
                    path: path.to_path_buf(),
                    from: version,
                    to: next,
                    reason: "no schema registered for target version".into(),
                })?;
        if let Err(issues) = next_schema.check(&data) {
            return Err(ConfigError::MigrationFailed {
                path: path.to_path_buf(),
                from: version,
                to: next,
                reason: format!(
                    "result does not match schema version {next}:\n{}",
                    render_issues(&issues)
                ),
            });
        }

        version = next;
    }

    Ok((data, true))
}
