use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Missing 'version' field in {path}")]
    MissingVersion { path: PathBuf },

    #[error("Unknown config version {found} in {path} (known versions: 0..={latest})")]
    UnknownVersion {
        path: PathBuf,
        found: String,
        latest: u32,
    },

    #[error("{path} does not match schema version {version}:\n{issues}")]
    SchemaMismatch {
        path: PathBuf,
        version: u32,
        issues: String,
    },

    #[error("Migration {from} -> {to} of {path} failed: {reason}")]
    MigrationFailed {
        path: PathBuf,
        from: u32,
        to: u32,
        reason: String,
    },

    #[error("Invalid schema registration for '{file_name}': {reason}")]
    SchemaRegistration { file_name: String, reason: String },

    #[error("Invalid {path}: {message}")]
    CrossValidation { path: PathBuf, message: String },

    #[error("Refusing to write {path}:\n{issues}")]
    CommitInvalid { path: PathBuf, issues: String },

    #[error("Failed to serialize {path}: {reason}")]
    Serialize { path: PathBuf, reason: String },

    #[error("Failed to deserialize {path}: {reason}")]
    Deserialize { path: PathBuf, reason: String },

    #[error("No default content registered for '{file_name}' — call .default_template() or .default_with() on the builder")]
    NoDefaultContent { file_name: String },

    #[error("Could not resolve config directory: {reason}")]
    DirUnresolved { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_version_formats_correctly() {
        let err = ConfigError::UnknownVersion {
            path: "/project/.nebula/env.yaml".into(),
            found: "99".into(),
            latest: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("99"));
        assert!(msg.contains("env.yaml"));
        assert!(msg.contains("0..=1"));
    }

    #[test]
    fn schema_mismatch_includes_issue_list() {
        let err = ConfigError::SchemaMismatch {
            path: "/project/project.yaml".into(),
            version: 2,
            issues: " - /services: \"x\" is not of type \"object\"".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("project.yaml"));
        assert!(msg.contains("version 2"));
        assert!(msg.contains("/services"));
    }

    #[test]
    fn no_default_content_names_builder_methods() {
        let err = ConfigError::NoDefaultContent {
            file_name: "secrets.yaml".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("secrets.yaml"));
        assert!(msg.contains("default_template"));
    }

    #[test]
    fn migration_failed_names_both_versions() {
        let err = ConfigError::MigrationFailed {
            path: "/p/provider.yaml".into(),
            from: 0,
            to: 1,
            reason: "peers is not an object".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("0 -> 1"));
        assert!(msg.contains("peers"));
    }
}
