//! The built-in configuration catalog for Nebula projects.
//!
//! One module per logical config file. Each module owns its full schema
//! history, its migration chain, the typed latest shape, and the uniform
//! three-function surface (`init_x_config`, `init_readonly_x_config`,
//! `init_new_x_config`) that command handlers call.
//!
//! `project.yaml` and `provider.yaml` live at the project root; everything
//! else lives under the project's dot directory. On-disk field names are
//! camelCase; the `version` discriminant is an integer everywhere.

use std::path::Path;

use crate::types::ConfigDir;

pub mod env;
pub mod project;
pub mod provider;
pub mod secrets;
pub mod workers;

/// Name of the per-project dot directory holding the non-root configs.
pub const DOT_DIR: &str = ".nebula";

/// Networks a project can target.
pub(crate) const NETWORKS: [&str; 3] = ["local", "testnet", "mainnet"];

/// Location of the dot directory for a given project root.
pub fn dot_dir(project_root: &Path) -> ConfigDir {
    ConfigDir::Path(project_root.join(DOT_DIR))
}

/// Location of the project root itself.
pub(crate) fn project_root(project_root: &Path) -> ConfigDir {
    ConfigDir::Path(project_root.to_path_buf())
}
