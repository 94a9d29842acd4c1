//! The validated, latest-shape config object returned to callers.
//!
//! A [`ConfigHandle`] derefs to the typed config struct, so callers mutate
//! fields directly and make the edits durable with an explicit [`commit()`]
//! (no auto-commit — multi-field edits are atomic per commit call from the
//! file system's point of view). [`ReadonlyConfigHandle`] is the same loaded
//! object with the commit capability omitted at the type level, documenting
//! that the config is being read for reference only.
//!
//! [`commit()`]: ConfigHandle::commit

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::patch;
use crate::registry::SchemaRegistry;
use crate::validate::render_issues;

/// Cross-field validation callback, run after schema validation passes.
/// Returns a caller-defined message on failure.
pub type ValidateFn<C> = fn(&C) -> Result<(), String>;

#[derive(Debug)]
pub struct ConfigHandle<C> {
    data: C,
    path: PathBuf,
    registry: Arc<SchemaRegistry>,
    validate: Option<ValidateFn<C>>,
    doc: serde_yaml::Value,
}

impl<C> ConfigHandle<C> {
    pub(crate) fn new(
        data: C,
        path: PathBuf,
        registry: Arc<SchemaRegistry>,
        validate: Option<ValidateFn<C>>,
        doc: serde_yaml::Value,
    ) -> Self {
        Self {
            data,
            path,
            registry,
            validate,
            doc,
        }
    }

    /// The resolved path this config was loaded from and commits to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<C: Serialize> ConfigHandle<C> {
    /// Persist the current in-memory field values back to disk.
    ///
    /// Re-validates against the latest schema and the cross-field callback
    /// first; on failure nothing is written and the on-disk file keeps its
    /// previous content. The rewrite preserves the existing document's key
    /// order.
    pub fn commit(&mut self) -> Result<(), ConfigError> {
        let json = serde_json::to_value(&self.data).map_err(|e| ConfigError::Serialize {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        if let Err(issues) = self.registry.latest_schema().check(&json) {
            return Err(ConfigError::CommitInvalid {
                path: self.path.clone(),
                issues: render_issues(&issues),
            });
        }
        if let Some(validate) = self.validate {
            validate(&self.data).map_err(|message| ConfigError::CrossValidation {
                path: self.path.clone(),
                message,
            })?;
        }

        let (text, doc) =
            patch::to_yaml_string(&json, Some(&self.doc)).map_err(|reason| {
                ConfigError::Serialize {
                    path: self.path.clone(),
                    reason,
                }
            })?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(&self.path, &text).map_err(|e| ConfigError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        self.doc = doc;
        debug!(path = %self.path.display(), "committed config");
        Ok(())
    }
}

impl<C> Deref for ConfigHandle<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.data
    }
}

impl<C> DerefMut for ConfigHandle<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.data
    }
}

/// Same pipeline, no `commit()`. An API-contract distinction, not a different
/// algorithm: the shape documents that the caller reads this config only to
/// cross-reference it.
pub struct ReadonlyConfigHandle<C> {
    data: C,
    path: PathBuf,
}

impl<C> ReadonlyConfigHandle<C> {
    pub(crate) fn new(data: C, path: PathBuf) -> Self {
        Self { data, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<C> Deref for ReadonlyConfigHandle<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.data
    }
}
