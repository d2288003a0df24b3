//! `roadmap.yaml`: optional tool configuration.
//!
//! # Lookup order
//!
//! 1. `--config <path>` (must exist)
//! 2. `<manifest dir>/roadmap.yaml`
//! 3. `<user config dir>/roadmap/roadmap.yaml`
//! 4. built-in defaults
//!
//! Relative paths resolve against the directory of the config file that was
//! found, or against the manifest's directory for 3 and 4.
//!
//! # API pattern
//!
//! `discover_at` takes the user config directory explicitly (tests pass a
//! `TempDir` or `None`); `discover` derives it from `dirs::config_dir()`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::progress::ProgressPolicy;
use crate::types::ProjectId;

pub const CONFIG_FILE: &str = "roadmap.yaml";

/// Per-project overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// README location; defaults to `<workspace_root>/<id>/README.md`.
    pub readme: Option<PathBuf>,
    /// Set to `false` to leave the hosted repository untouched.
    pub remote: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            readme: None,
            remote: true,
        }
    }
}

/// Remote (GitHub) client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub api_base: String,
    /// Environment variable holding the API token.
    pub token_env: String,
    /// Global request budget shared by all workers.
    pub requests_per_second: u32,
    pub timeout_secs: u64,
    /// Retries after a throttling response, per request.
    pub max_retries: u32,
    /// Number of resources reconciled in parallel.
    pub concurrency: usize,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            api_base: "https://api.github.com".to_string(),
            token_env: "GITHUB_TOKEN".to_string(),
            requests_per_second: 2,
            timeout_secs: 15,
            max_retries: 3,
            concurrency: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding one checkout per project.
    pub workspace_root: PathBuf,
    /// Document that receives the overview section.
    pub overview_readme: PathBuf,
    pub projects: BTreeMap<String, ProjectConfig>,
    pub known_categories: Vec<String>,
    pub progress_policy: ProgressPolicy,
    /// Directory of `.tera` files overriding the embedded templates.
    pub template_dir: Option<PathBuf>,
    pub remote: RemoteConfig,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            workspace_root: PathBuf::from(".."),
            overview_readme: PathBuf::from("README.md"),
            projects: BTreeMap::new(),
            known_categories: Vec::new(),
            progress_policy: ProgressPolicy::default(),
            template_dir: None,
            remote: RemoteConfig::default(),
            base_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Defaults with relative paths anchored at `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Config {
            base_dir: base_dir.into(),
            ..Config::default()
        }
    }

    /// Load a config file; relative paths resolve against its directory.
    pub fn load_at(path: &Path) -> Result<Config, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = if contents.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        };
        config.base_dir = parent_dir(path);
        Ok(config)
    }

    /// Resolve configuration for the manifest at `manifest_path`.
    pub fn discover_at(
        manifest_path: &Path,
        explicit: Option<&Path>,
        user_config_dir: Option<&Path>,
    ) -> Result<Config, ConfigError> {
        if let Some(path) = explicit {
            return Config::load_at(path);
        }

        let manifest_dir = parent_dir(manifest_path);
        let local = manifest_dir.join(CONFIG_FILE);
        if local.exists() {
            return Config::load_at(&local);
        }

        if let Some(dir) = user_config_dir {
            let user = dir.join("roadmap").join(CONFIG_FILE);
            if user.exists() {
                let mut config = Config::load_at(&user)?;
                config.base_dir = manifest_dir;
                return Ok(config);
            }
        }

        Ok(Config::with_base_dir(manifest_dir))
    }

    /// `discover_at` convenience wrapper using the platform config directory.
    pub fn discover(manifest_path: &Path, explicit: Option<&Path>) -> Result<Config, ConfigError> {
        Config::discover_at(manifest_path, explicit, dirs::config_dir().as_deref())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Anchor `path` at the base directory unless it is absolute.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn overview_path(&self) -> PathBuf {
        self.resolve(&self.overview_readme)
    }

    pub fn readme_path(&self, id: &ProjectId) -> PathBuf {
        match self.projects.get(&id.0).and_then(|p| p.readme.as_deref()) {
            Some(readme) => self.resolve(readme),
            None => self
                .resolve(&self.workspace_root)
                .join(&id.0)
                .join("README.md"),
        }
    }

    pub fn remote_enabled(&self, id: &ProjectId) -> bool {
        self.projects.get(&id.0).map_or(true, |p| p.remote)
    }

    pub fn template_dir(&self) -> Option<PathBuf> {
        self.template_dir.as_deref().map(|dir| self.resolve(dir))
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
