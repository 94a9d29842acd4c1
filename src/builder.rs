//! Defining a config type and the three-function init surface.
//!
//! A [`ConfigType`] bundles everything the engine needs to know about one
//! logical config file: its file name, the full schema history, the migration
//! chain, an optional default for first-run creation, and an optional
//! cross-field validation callback. Registration-time checks (schema
//! compilation, version constants, migration count) all run in
//! [`build()`](ConfigTypeBuilder::build), so a broken definition fails the
//! moment it is constructed, not on some later load.
//!
//! Every config type then exposes the same three operations:
//!
//! - [`init`](ConfigType::init) — load if present; materialize the registered
//!   default if absent and one exists; `None` otherwise.
//! - [`init_readonly`](ConfigType::init_readonly) — same pipeline, commit-less
//!   handle.
//! - [`init_new`](ConfigType::init_new) — force creation when absent.

use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ConfigError;
use crate::handle::{ConfigHandle, ReadonlyConfigHandle, ValidateFn};
use crate::loader::{self, Loaded};
use crate::registry::{Migration, SchemaRegistry};
use crate::types::{ConfigDir, DefaultContent};

/// One logical kind of persisted config file, ready to load instances.
pub struct ConfigType<C> {
    registry: Arc<SchemaRegistry>,
    default: Option<DefaultContent>,
    validate: Option<ValidateFn<C>>,
}

impl<C> ConfigType<C> {
    pub fn builder(file_name: &str) -> ConfigTypeBuilder<C> {
        ConfigTypeBuilder::new(file_name)
    }

    pub fn file_name(&self) -> &str {
        self.registry.file_name()
    }

    pub fn latest_version(&self) -> u32 {
        self.registry.latest_version()
    }

    fn resolve_path(&self, dir: &ConfigDir) -> Result<PathBuf, ConfigError> {
        Ok(dir.resolve()?.join(self.registry.file_name()))
    }
}

impl<C: Serialize + DeserializeOwned> ConfigType<C> {
    /// Load the config, creating it from the registered default when missing.
    ///
    /// Returns `None` when the file is missing and no default is registered —
    /// absence is the caller's call, not an error.
    pub fn init(&self, dir: &ConfigDir) -> Result<Option<ConfigHandle<C>>, ConfigError> {
        let path = self.resolve_path(dir)?;
        if let Some(loaded) = loader::load(&self.registry, &path)? {
            return Ok(Some(self.handle(path, loaded)?));
        }
        match &self.default {
            Some(default) => {
                loader::create(&path, default)?;
                let loaded = self.load_created(&path)?;
                Ok(Some(self.handle(path, loaded)?))
            }
            None => Ok(None),
        }
    }

    /// Load for reference only; the returned handle has no commit capability.
    pub fn init_readonly(
        &self,
        dir: &ConfigDir,
    ) -> Result<Option<ReadonlyConfigHandle<C>>, ConfigError> {
        let path = self.resolve_path(dir)?;
        match loader::load(&self.registry, &path)? {
            Some(loaded) => {
                let data = self.deserialize(&path, loaded)?;
                Ok(Some(ReadonlyConfigHandle::new(data, path)))
            }
            None => Ok(None),
        }
    }

    /// Load the config, creating it from the registered default when missing.
    ///
    /// Unlike [`init`](Self::init), a missing file with no registered default
    /// is an error rather than `None`.
    pub fn init_new(&self, dir: &ConfigDir) -> Result<ConfigHandle<C>, ConfigError> {
        let path = self.resolve_path(dir)?;
        if let Some(loaded) = loader::load(&self.registry, &path)? {
            return self.handle(path, loaded);
        }
        let default = self
            .default
            .as_ref()
            .ok_or_else(|| ConfigError::NoDefaultContent {
                file_name: self.registry.file_name().to_string(),
            })?;
        loader::create(&path, default)?;
        let loaded = self.load_created(&path)?;
        self.handle(path, loaded)
    }

    /// Like [`init_new`](Self::init_new), but with caller-supplied initial
    /// content instead of the registered default. For defaults that depend on
    /// invocation-specific data (peer names, prompted values), the caller
    /// builds the version-0 content and passes it here.
    pub fn init_new_with(
        &self,
        dir: &ConfigDir,
        content: DefaultContent,
    ) -> Result<ConfigHandle<C>, ConfigError> {
        let path = self.resolve_path(dir)?;
        if let Some(loaded) = loader::load(&self.registry, &path)? {
            return self.handle(path, loaded);
        }
        loader::create(&path, &content)?;
        let loaded = self.load_created(&path)?;
        self.handle(path, loaded)
    }

    fn load_created(&self, path: &PathBuf) -> Result<Loaded, ConfigError> {
        loader::load(&self.registry, path)?.ok_or_else(|| ConfigError::Io {
            path: path.clone(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "config file missing right after creation",
            ),
        })
    }

    fn deserialize(&self, path: &PathBuf, loaded: Loaded) -> Result<C, ConfigError> {
        let data: C =
            serde_json::from_value(loaded.data).map_err(|e| ConfigError::Deserialize {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        if let Some(validate) = self.validate {
            validate(&data).map_err(|message| ConfigError::CrossValidation {
                path: path.clone(),
                message,
            })?;
        }
        Ok(data)
    }

    fn handle(&self, path: PathBuf, loaded: Loaded) -> Result<ConfigHandle<C>, ConfigError> {
        let doc = loaded.doc.clone();
        let data = self.deserialize(&path, loaded)?;
        Ok(ConfigHandle::new(
            data,
            path,
            Arc::clone(&self.registry),
            self.validate,
            doc,
        ))
    }
}

/// Builder collecting the schema history and migration chain for one config
/// type. Schemas are pushed in ascending version order starting at 0.
pub struct ConfigTypeBuilder<C> {
    file_name: String,
    schemas: Vec<serde_json::Value>,
    migrations: Vec<Migration>,
    default: Option<DefaultContent>,
    validate: Option<ValidateFn<C>>,
    _phantom: PhantomData<C>,
}

impl<C> ConfigTypeBuilder<C> {
    fn new(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            schemas: Vec::new(),
            migrations: Vec::new(),
            default: None,
            validate: None,
            _phantom: PhantomData,
        }
    }

    /// Register the next schema version. The first call registers version 0.
    /// Every version that has ever shipped must stay registered forever.
    pub fn schema(mut self, raw: serde_json::Value) -> Self {
        self.schemas.push(raw);
        self
    }

    /// Register the next migration step. The n-th call registers the step
    /// from version n to n + 1.
    pub fn migration(mut self, step: Migration) -> Self {
        self.migrations.push(step);
        self
    }

    /// Static YAML template used when the file doesn't exist yet. Must
    /// validate at version 0.
    pub fn default_template(mut self, template: &str) -> Self {
        self.default = Some(DefaultContent::Template(template.to_string()));
        self
    }

    /// Generator-backed default for content that embeds derived material
    /// (e.g. a freshly generated secret key). Must produce version-0 content.
    pub fn default_with(mut self, generate: fn() -> Result<String, String>) -> Self {
        self.default = Some(DefaultContent::Generate(generate));
        self
    }

    /// Cross-field validation, run after schema validation passes — both at
    /// load and before every commit. The engine stays config-type-agnostic;
    /// invariants that span fields (or reference other configs) live here.
    pub fn validate(mut self, validate: ValidateFn<C>) -> Self {
        self.validate = Some(validate);
        self
    }

    /// Run all registration-time checks and produce the config type.
    pub fn build(self) -> Result<ConfigType<C>, ConfigError> {
        let registry = SchemaRegistry::new(&self.file_name, self.schemas, self.migrations)?;
        Ok(ConfigType {
            registry: Arc::new(registry),
            default: self.default,
            validate: self.validate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{test_config_type, TestConfig};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn init_missing_without_default_returns_none() {
        let dir = TempDir::new().unwrap();
        let config_type: ConfigType<TestConfig> = ConfigType::builder("app.yaml")
            .schema(crate::fixtures::test::schema_v0())
            .schema(crate::fixtures::test::schema_v1())
            .schema(crate::fixtures::test::schema_v2())
            .migration(crate::fixtures::test::migrate_v0_to_v1)
            .migration(crate::fixtures::test::migrate_v1_to_v2)
            .build()
            .unwrap();

        let handle = config_type
            .init(&ConfigDir::Path(dir.path().to_path_buf()))
            .unwrap();
        assert!(handle.is_none());
    }

    #[test]
    fn init_missing_with_default_creates_and_loads() {
        let dir = TempDir::new().unwrap();
        let config_type = test_config_type();

        let handle = config_type
            .init(&ConfigDir::Path(dir.path().to_path_buf()))
            .unwrap()
            .unwrap();
        // The template is authored at v0 and migrated forward on load.
        assert_eq!(handle.version, 2);
        assert!(dir.path().join("app.yaml").exists());
    }

    #[test]
    fn init_existing_loads_without_default() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("app.yaml"),
            "version: 2\ndefaultEnv: mainnet\nservices: {}\n",
        )
        .unwrap();

        let handle = test_config_type()
            .init(&ConfigDir::Path(dir.path().to_path_buf()))
            .unwrap()
            .unwrap();
        assert_eq!(handle.default_env, "mainnet");
    }

    #[test]
    fn init_new_without_default_errors_when_missing() {
        let dir = TempDir::new().unwrap();
        let config_type: ConfigType<TestConfig> = ConfigType::builder("app.yaml")
            .schema(crate::fixtures::test::schema_v0())
            .schema(crate::fixtures::test::schema_v1())
            .schema(crate::fixtures::test::schema_v2())
            .migration(crate::fixtures::test::migrate_v0_to_v1)
            .migration(crate::fixtures::test::migrate_v1_to_v2)
            .build()
            .unwrap();

        let result = config_type.init_new(&ConfigDir::Path(dir.path().to_path_buf()));
        assert!(matches!(result, Err(ConfigError::NoDefaultContent { .. })));
    }

    #[test]
    fn init_new_with_supplied_template_creates_exact_content() {
        // A caller-supplied template is written verbatim, then loaded through
        // the ordinary pipeline.
        let dir = TempDir::new().unwrap();
        let config_type = test_config_type();

        let handle = config_type
            .init_new_with(
                &ConfigDir::Path(dir.path().to_path_buf()),
                DefaultContent::Template("version: 0\nenv: dev\n".into()),
            )
            .unwrap();
        assert_eq!(handle.default_env, "dev");
        assert_eq!(handle.version, 2);
    }

    #[test]
    fn init_new_loads_existing_file_instead_of_overwriting() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("app.yaml"),
            "version: 2\ndefaultEnv: mainnet\nservices: {}\n",
        )
        .unwrap();

        let handle = test_config_type()
            .init_new(&ConfigDir::Path(dir.path().to_path_buf()))
            .unwrap();
        assert_eq!(handle.default_env, "mainnet");
    }

    #[test]
    fn init_readonly_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        let handle = test_config_type()
            .init_readonly(&ConfigDir::Path(dir.path().to_path_buf()))
            .unwrap();
        assert!(handle.is_none());
    }

    #[test]
    fn cross_validation_failure_surfaces_at_load() {
        fn reject_mainnet(config: &TestConfig) -> Result<(), String> {
            if config.default_env == "mainnet" {
                return Err("mainnet is not allowed here".into());
            }
            Ok(())
        }

        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("app.yaml"),
            "version: 2\ndefaultEnv: mainnet\nservices: {}\n",
        )
        .unwrap();

        let config_type: ConfigType<TestConfig> = ConfigType::builder("app.yaml")
            .schema(crate::fixtures::test::schema_v0())
            .schema(crate::fixtures::test::schema_v1())
            .schema(crate::fixtures::test::schema_v2())
            .migration(crate::fixtures::test::migrate_v0_to_v1)
            .migration(crate::fixtures::test::migrate_v1_to_v2)
            .validate(reject_mainnet)
            .build()
            .unwrap();

        let err = config_type
            .init(&ConfigDir::Path(dir.path().to_path_buf()))
            .unwrap_err();
        match err {
            ConfigError::CrossValidation { message, .. } => {
                assert!(message.contains("mainnet"));
            }
            other => panic!("Expected CrossValidation, got: {other:?}"),
        }
    }

    #[test]
    fn broken_definition_fails_at_build() {
        let result: Result<ConfigType<TestConfig>, _> = ConfigType::builder("app.yaml")
            .schema(json!({ "type": "object" }))
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::SchemaRegistration { .. })
        ));
    }

    #[test]
    fn file_name_and_latest_version_accessors() {
        let config_type = test_config_type();
        assert_eq!(config_type.file_name(), "app.yaml");
        assert_eq!(config_type.latest_version(), 2);
    }
}
