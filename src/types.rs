use std::path::PathBuf;

use crate::error::ConfigError;

/// Where a config file lives. Resolved to a concrete directory at load time.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigDir {
    /// An explicit directory, e.g. the project root or its dot directory.
    Path(PathBuf),
    /// A subdirectory under the user's home directory, e.g. `Home(".nebula")`.
    Home(String),
    /// Platform config directory for the named app (XDG on Linux,
    /// ~/Library/Application Support on macOS).
    Platform(String),
}

impl ConfigDir {
    /// Resolve to a concrete directory path.
    ///
    /// Fails when the environment provides no home directory (for `Home` and
    /// `Platform` variants); `Path` always resolves.
    pub fn resolve(&self) -> Result<PathBuf, ConfigError> {
        match self {
            ConfigDir::Path(p) => Ok(p.clone()),
            ConfigDir::Home(subdir) => {
                let user = directories::UserDirs::new().ok_or_else(|| {
                    ConfigError::DirUnresolved {
                        reason: "no home directory found".into(),
                    }
                })?;
                Ok(user.home_dir().join(subdir))
            }
            ConfigDir::Platform(app_name) => {
                let proj =
                    directories::ProjectDirs::from("", "", app_name).ok_or_else(|| {
                        ConfigError::DirUnresolved {
                            reason: format!("no platform config directory for '{app_name}'"),
                        }
                    })?;
                Ok(proj.config_dir().to_path_buf())
            }
        }
    }
}

/// Initial file content for a config type that doesn't exist on disk yet.
///
/// Either flavor must produce content that validates at schema version 0 —
/// fresh files always start at the oldest version and are migrated forward on
/// the next load, never authored directly at the latest version.
pub enum DefaultContent {
    /// A static YAML template, typically with optional fields commented out.
    Template(String),
    /// A generator that performs real work (e.g. deriving a secret key) and
    /// embeds the result into the template it returns.
    Generate(fn() -> Result<String, String>),
}

impl DefaultContent {
    /// Produce the file content. Generator failures carry the generator's
    /// own message.
    pub fn materialize(&self) -> Result<String, String> {
        match self {
            DefaultContent::Template(t) => Ok(t.clone()),
            DefaultContent::Generate(f) => f(),
        }
    }
}

impl std::fmt::Debug for DefaultContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefaultContent::Template(t) => f.debug_tuple("Template").field(t).finish(),
            DefaultContent::Generate(_) => f.debug_tuple("Generate").field(&"<fn>").finish(),
        }
    }
}
