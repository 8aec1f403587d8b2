// Global configuration: `~/.contribart/config.toml`.
//
// Every field is optional; CLI flags override whatever is set here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use contribart_common::types::{Identity, IdentityError};

/// Name of the default working repository under the home directory.
pub const DEFAULT_REPO_DIR_NAME: &str = "github-contribution-repo";

/// Root directory for contribart state: `~/.contribart/`.
pub fn global_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".contribart"))
}

/// Path to the global config file: `~/.contribart/config.toml`.
pub fn global_config_path() -> Option<PathBuf> {
    global_dir().map(|d| d.join("config.toml"))
}

/// Default working repository: `~/github-contribution-repo`.
pub fn default_repo_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(DEFAULT_REPO_DIR_NAME))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Working repository the commits are created in.
    pub repo_dir: Option<PathBuf>,
    /// Commits per pixel.
    pub intensity: Option<u32>,
    /// Commit message template (`{ch}`, `{week}`, `{day}`, `{date}`).
    pub message: Option<String>,
    /// Identity for generated commits; git's own config is used when unset.
    pub author: Option<AuthorConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AuthorConfig {
    pub name: String,
    pub email: String,
}

impl AuthorConfig {
    pub fn identity(&self) -> Result<Identity, IdentityError> {
        Identity::new(self.name.as_str(), self.email.as_str())
    }
}

impl GlobalConfig {
    /// Load from `~/.contribart/config.toml`. Returns defaults if the file
    /// doesn't exist or can't be parsed.
    pub fn load() -> Self {
        global_config_path().and_then(|p| Self::load_from(&p).ok()).unwrap_or_default()
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&contents).map_err(ConfigError::Parse)
    }

    /// Save to a specific path (creates parent directories).
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        let contents = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }

    /// Configured repository directory, falling back to the home default.
    pub fn resolved_repo_dir(&self) -> Option<PathBuf> {
        self.repo_dir.clone().or_else(default_repo_dir)
    }
}

// ── Errors ─────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "config I/O error: {e}"),
            Self::Parse(e) => write!(f, "config parse error: {e}"),
            Self::Serialize(e) => write!(f, "config serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn global_config_defaults() {
        let cfg = GlobalConfig::default();
        assert!(cfg.repo_dir.is_none());
        assert!(cfg.intensity.is_none());
        assert!(cfg.message.is_none());
        assert!(cfg.author.is_none());
    }

    #[test]
    fn global_config_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let cfg = GlobalConfig {
            repo_dir: Some(PathBuf::from("/srv/art")),
            intensity: Some(4),
            message: Some("paint {ch}".into()),
            author: Some(AuthorConfig { name: "Ada".into(), email: "ada@example.test".into() }),
        };
        cfg.save_to(&path).unwrap();
        let loaded = GlobalConfig::load_from(&path).unwrap();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn global_config_parse_from_toml() {
        let toml_str = r#"
repo_dir = "/home/me/art"
intensity = 3

[author]
name = "Bob"
email = "bob@example.test"
"#;
        let cfg: GlobalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.repo_dir, Some(PathBuf::from("/home/me/art")));
        assert_eq!(cfg.intensity, Some(3));
        let identity = cfg.author.unwrap().identity().unwrap();
        assert_eq!(identity.name, "Bob");
    }

    #[test]
    fn global_config_rejects_unknown_fields() {
        let error = toml::from_str::<GlobalConfig>("token = \"ghp_secret\"\n")
            .expect_err("parse should fail");
        assert!(error.to_string().contains("unknown field `token`"));
    }

    #[test]
    fn global_config_missing_fields_use_defaults() {
        let cfg: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, GlobalConfig::default());
    }

    #[test]
    fn global_config_load_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let result = GlobalConfig::load_from(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn blank_author_fields_are_rejected() {
        let author = AuthorConfig { name: " ".into(), email: "a@b".into() };
        assert_eq!(author.identity(), Err(IdentityError::EmptyName));
    }

    #[test]
    fn resolved_repo_dir_prefers_configured_path() {
        let cfg = GlobalConfig { repo_dir: Some(PathBuf::from("/srv/art")), ..Default::default() };
        assert_eq!(cfg.resolved_repo_dir(), Some(PathBuf::from("/srv/art")));
    }

    #[test]
    fn global_dir_is_under_home() {
        let dir = global_dir().expect("home directory should resolve");
        assert!(dir.ends_with(".contribart"));
        assert!(default_repo_dir().unwrap().ends_with(DEFAULT_REPO_DIR_NAME));
    }
}
