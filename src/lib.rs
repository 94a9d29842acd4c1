//! Versioned, schema-validated YAML configuration for Nebula projects.
//!
//! Every persisted config file a Nebula project carries — the project
//! manifest, provider peers, deployment records, secrets — goes through one
//! engine: load the YAML, validate it against the JSON-Schema version it
//! declares, migrate it step-by-step to the newest shape, and hand the caller
//! a typed, committable handle.
//!
//! ```ignore
//! let mut project = init_new_project_config(&root)?;
//! project.default_env = Some("testnet".into());
//! project.commit()?;
//! ```
//!
//! # Why a schema history
//!
//! Config files outlive the binaries that wrote them. A project scaffolded a
//! year ago still has to open cleanly today, so every shape a file has ever
//! shipped with stays registered forever, alongside one migration function
//! per version transition. The `version` integer at the top of each file is
//! the sole discriminant: the engine validates the file against the schema it
//! claims, walks the migration chain one step at a time, re-validates after
//! every step, and persists the migrated result so the chain never runs twice
//! for the same file.
//!
//! That per-step re-validation is deliberate: a migration must produce
//! exactly the next version's shape, and a bug in one gets caught the moment
//! it runs rather than three versions later in a file nobody can explain.
//!
//! # Design: the schema is the contract
//!
//! Each config type is defined once, through [`ConfigType::builder`]:
//!
//! - **Schemas** (draft-07, `additionalProperties: false`, explicit
//!   `required`) describe every historical shape. Unknown fields are hard
//!   failures — stale keys from an abandoned migration surface instead of
//!   riding along silently.
//! - **Migrations** are pure `Value -> Value` functions, one per transition,
//!   each knowing only about its immediate predecessor.
//! - **Defaults** materialize a missing file, always authored at version 0 —
//!   a fresh file and a year-old file take the identical path through the
//!   loader.
//! - **Cross-field validation** is a plain callback run after schema
//!   validation, at load and before every commit. The engine itself stays
//!   config-type-agnostic; invariants like "`defaultKeyName` must exist in
//!   `keyPairs`" live with the config type that owns them.
//!
//! All registration-time mistakes — a schema that doesn't compile, a version
//! constant that doesn't match its position, a missing migration — fail in
//! `build()`, not on some later load.
//!
//! # The three-function surface
//!
//! Every config type exposes the same operations, and the catalog modules in
//! [`configs`] wrap them per file:
//!
//! - `init` — load if present; create from the registered default if absent
//!   and one exists; `None` otherwise (absence is the caller's decision, not
//!   an error).
//! - `init_readonly` — same pipeline, but the returned handle has no
//!   `commit()`. A type-level statement that this config is read only to
//!   cross-reference it.
//! - `init_new` — forces creation when absent.
//!
//! # Mutation model
//!
//! A [`ConfigHandle`] derefs to the latest-shape struct. Callers assign
//! fields directly and call [`commit()`](ConfigHandle::commit) explicitly —
//! there is no auto-commit, so a multi-field edit hits the disk all at once
//! or not at all. Commit re-validates first and refuses to write when the
//! in-memory state no longer satisfies the latest schema; the on-disk file
//! keeps its previous content. Rewrites preserve the existing document's key
//! order (comments are lost — YAML has no `toml_edit`-grade editing layer).
//!
//! # Error handling
//!
//! All fallible operations return [`ConfigError`]. Every failure names the
//! file path; validation failures carry the field-path-annotated issue list.
//! Nothing is coerced, dropped, or repaired: a file the engine cannot accept
//! verbatim is a file a human has to fix.

pub mod configs;
pub mod error;
pub mod types;

mod builder;
mod handle;
mod loader;
mod migrate;
mod patch;
mod registry;
mod validate;

#[cfg(test)]
mod fixtures;

pub use builder::{ConfigType, ConfigTypeBuilder};
pub use error::ConfigError;
pub use handle::{ConfigHandle, ReadonlyConfigHandle, ValidateFn};
pub use registry::{Migration, SchemaRegistry};
pub use types::{ConfigDir, DefaultContent};
pub use validate::{CompiledSchema, ValidationIssue};
