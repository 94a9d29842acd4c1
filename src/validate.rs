//! Draft-07 JSON-Schema validation over parsed YAML/JSON values.
//!
//! Each historical schema version is compiled exactly once, at registration
//! time, so a malformed schema is an author error that fails fast rather than
//! surfacing on some later load. Validation failures are reported as a list of
//! field-path-annotated issues, rendered into one multi-line message.
//!
//! `additionalProperties: false` is enforced strictly: an unknown field is a
//! hard failure, never silently dropped, so stale fields left behind by an
//! abandoned migration are caught instead of masked.

use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

/// One validation failure, annotated with the JSON-pointer path into the
/// instance (`(root)` for top-level failures).
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

/// Render issues as the multi-line block embedded in error messages.
pub fn render_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| format!(" - {}: {}", i.path, i.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A single historical schema version, compiled and ready to check values.
pub struct CompiledSchema {
    version: u32,
    raw: Value,
    validator: JSONSchema,
}

impl CompiledSchema {
    /// Compile a draft-07 schema for the given version.
    ///
    /// Fails when the schema itself is malformed, or when its
    /// `properties.version.const` does not equal `version` — the version
    /// constant is the sole migration discriminant, so a drifted constant
    /// would misroute every file authored against this schema.
    pub fn compile(version: u32, raw: Value) -> Result<Self, String> {
        let declared = raw.pointer("/properties/version/const").and_then(Value::as_u64);
        if declared != Some(u64::from(version)) {
            return Err(format!(
                "schema at position {version} declares version const {declared:?}"
            ));
        }

        let validator = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&raw)
            .map_err(|e| format!("schema version {version} is malformed: {e}"))?;

        Ok(Self {
            version,
            raw,
            validator,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Check `data` against this schema, collecting every failure.
    pub fn check(&self, data: &Value) -> Result<(), Vec<ValidationIssue>> {
        if let Err(errors) = self.validator.validate(data) {
            let issues: Vec<ValidationIssue> = errors
                .map(|e| {
                    let pointer = e.instance_path.to_string();
                    ValidationIssue {
                        path: if pointer.is_empty() {
                            "(root)".into()
                        } else {
                            pointer
                        },
                        message: e.to_string(),
                    }
                })
                .collect();
            return Err(issues);
        }
        Ok(())
    }
}

impl std::fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}
