//! Per-config-type schema history and migration chain.
//!
//! A registry holds every JSON-Schema shape a config file has ever shipped
//! with, in ascending version order starting at 0, plus one migration function
//! per version transition. Old schemas stay registered forever: files authored
//! under any historical version must still validate and migrate.
//!
//! All author-error checks happen here, at construction: schemas that don't
//! compile, a version constant that doesn't match its position, or a migration
//! count that doesn't line up with the schema count.

use serde_json::Value;

use crate::error::ConfigError;
use crate::validate::CompiledSchema;

/// A pure transformation from one schema version's shape to the next.
///
/// A step receives a value already validated against its source version and
/// must produce exactly the next version's shape — the engine re-validates the
/// result against the next schema after every step. Steps must not assume
/// anything about versions other than their immediate predecessor.
pub type Migration = fn(Value) -> Result<Value, String>;

pub struct SchemaRegistry {
    file_name: String,
    schemas: Vec<CompiledSchema>,
    migrations: Vec<Migration>,
}

impl SchemaRegistry {
    /// Build a registry from raw schemas (ascending, version 0 first) and the
    /// matching migration chain.
    pub fn new(
        file_name: &str,
        raw_schemas: Vec<Value>,
        migrations: Vec<Migration>,
    ) -> Result<Self, ConfigError> {
        let registration_error = |reason: String| ConfigError::SchemaRegistration {
            file_name: file_name.to_string(),
            reason,
        };

        if raw_schemas.is_empty() {
            return Err(registration_error("no schemas registered".into()));
        }
        if migrations.len() != raw_schemas.len() - 1 {
            return Err(registration_error(format!(
                "{} schemas require {} migrations, got {}",
                raw_schemas.len(),
                raw_schemas.len() - 1,
                migrations.len()
            )));
        }

        let mut schemas = Vec::with_capacity(raw_schemas.len());
        for (position, raw) in raw_schemas.into_iter().enumerate() {
            let version = u32::try_from(position)
                .map_err(|_| registration_error("too many schema versions".into()))?;
            schemas.push(CompiledSchema::compile(version, raw).map_err(registration_error)?);
        }

        Ok(Self {
            file_name: file_name.to_string(),
            schemas,
            migrations,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn latest_version(&self) -> u32 {
        (self.schemas.len() - 1) as u32
    }

    pub fn latest_schema(&self) -> &CompiledSchema {
        // Non-empty by construction.
        &self.schemas[self.schemas.len() - 1]
    }

    /// Look up a historical schema. `None` means the version never shipped.
    pub fn schema(&self, version: u32) -> Option<&CompiledSchema> {
        self.schemas.get(version as usize)
    }

    /// The migration step taking `from` to `from + 1`.
    pub fn migration(&self, from: u32) -> Option<&Migration> {
        self.migrations.get(from as usize)
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("file_name", &self.file_name)
            .field("latest_version", &self.latest_version())
            .finish_non_exhaustive()
    }
}
