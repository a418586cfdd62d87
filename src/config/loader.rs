//! Configuration loader with tier-based merging.
//!
//! Loads configuration from multiple tiers and merges them field-by-field.

use super::merge::deep_merge_all;
use super::types::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Embedded defaults (lowest priority)
    Defaults = 0,
    /// Project-level config ($CWD/task-market/)
    Project = 1,
    /// User-level config (~/.task-market/)
    User = 2,
    /// Environment variables (highest priority)
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Paths for each configuration tier.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Single config file replacing the project and user tiers
    pub explicit: Option<PathBuf>,
    /// Project-level config directory
    pub project_dir: Option<PathBuf>,
    /// User-level config directory
    pub user_dir: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover configuration paths from environment and defaults.
    pub fn discover() -> Self {
        let explicit = std::env::var("TASK_MARKET_CONFIG_PATH")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        Self {
            explicit,
            project_dir: Some(PathBuf::from("task-market")),
            user_dir: dirs::home_dir().map(|h| h.join(".task-market")),
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            explicit: None,
            project_dir,
            user_dir,
        }
    }

    /// Replace the tiered files with one config file.
    pub fn with_explicit(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit = Some(path.into());
        self
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Loaded configuration
    config: Config,
    /// Files that contributed, lowest tier first
    sources: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Load configuration with explicit paths, reading overrides from the
    /// process environment.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        Self::load_with_env(paths, |key| std::env::var(key).ok())
    }

    /// Load configuration, resolving environment overrides through `env`.
    pub fn load_with_env<F>(paths: ConfigPaths, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut configs: Vec<Value> = Vec::new();
        let mut sources = Vec::new();

        // Tier 1: Defaults (embedded)
        configs.push(serde_json::to_value(Config::default())?);

        if let Some(ref explicit) = paths.explicit {
            // A named file must exist; it stands in for the project and user tiers.
            let content = std::fs::read_to_string(explicit)
                .with_context(|| format!("Failed to read config file {}", explicit.display()))?;
            let value: Option<Value> = serde_yaml::from_str(&content)
                .with_context(|| format!("Invalid YAML in {}", explicit.display()))?;
            configs.extend(value);
            sources.push(explicit.clone());
        } else {
            // Tier 2: Project config, then Tier 3: User config
            for (tier, dir) in [
                (ConfigTier::Project, &paths.project_dir),
                (ConfigTier::User, &paths.user_dir),
            ] {
                let Some(dir) = dir else { continue };
                if let Some(value) = read_tier_file(tier, &dir.join("config.yaml")) {
                    configs.push(value);
                    sources.push(dir.join("config.yaml"));
                }
            }
        }

        // Merge all configs
        let merged = deep_merge_all(configs);
        let mut config: Config = serde_json::from_value(merged)?;

        // Tier 4: Environment variable overrides
        Self::apply_env_overrides(&mut config, env);

        Ok(Self { config, sources })
    }

    /// Apply environment variable overrides to config.
    fn apply_env_overrides<F>(config: &mut Config, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db_path) = env("TASK_MARKET_DB_PATH") {
            config.server.db_path = PathBuf::from(db_path);
        }

        if let Some(host) = env("TASK_MARKET_HOST") {
            config.server.host = host;
        }

        if let Some(port) = env("TASK_MARKET_PORT") {
            match port.parse() {
                Ok(port) => config.server.port = port,
                Err(_) => warn!(value = %port, "Ignoring invalid TASK_MARKET_PORT"),
            }
        }

        if let Some(secret) = env("TASK_MARKET_JWT_SECRET") {
            config.auth.jwt_secret = secret;
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Config files that were merged, lowest tier first.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}

/// Read one tier's YAML file. Missing files are skipped silently; unreadable
/// or malformed ones are skipped with a warning.
fn read_tier_file(tier: ConfigTier, path: &Path) -> Option<Value> {
    if !path.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(%tier, path = %path.display(), error = %e, "Skipping unreadable config file");
            return None;
        }
    };
    match serde_yaml::from_str::<Option<Value>>(&content) {
        Ok(value) => {
            debug!(%tier, path = %path.display(), "Loaded config file");
            value
        }
        Err(e) => {
            warn!(%tier, path = %path.display(), error = %e, "Skipping malformed config file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_config_paths_discover() {
        let paths = ConfigPaths::discover();
        assert_eq!(paths.project_dir, Some(PathBuf::from("task-market")));
    }

    #[test]
    fn test_load_defaults_only() {
        // Empty temp dirs so no config files are found
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_dirs(
            Some(temp.path().join("project")),
            Some(temp.path().join("user")),
        );

        let loader = ConfigLoader::load_with_env(paths, no_env).unwrap();
        let config = loader.config();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert!(loader.sources().is_empty());
    }

    #[test]
    fn test_project_config_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("task-market");
        std::fs::create_dir_all(&project_dir).unwrap();

        let config_content = r#"
server:
  port: 8088
"#;
        std::fs::write(project_dir.join("config.yaml"), config_content).unwrap();

        let paths = ConfigPaths::with_dirs(Some(project_dir), Some(temp.path().join("user")));

        let loader = ConfigLoader::load_with_env(paths, no_env).unwrap();
        let config = loader.config();

        assert_eq!(config.server.port, 8088);
        // host should be default
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_user_config_overrides_project() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("task-market");
        let user_dir = temp.path().join("user");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::create_dir_all(&user_dir).unwrap();

        let project_config = r#"
server:
  port: 8088
auth:
  token_ttl_hours: 2
"#;
        std::fs::write(project_dir.join("config.yaml"), project_config).unwrap();

        let user_config = r#"
server:
  port: 9099
"#;
        std::fs::write(user_dir.join("config.yaml"), user_config).unwrap();

        let paths = ConfigPaths::with_dirs(Some(project_dir), Some(user_dir));

        let loader = ConfigLoader::load_with_env(paths, no_env).unwrap();
        let config = loader.config();

        assert_eq!(config.server.port, 9099);
        assert_eq!(config.auth.token_ttl_hours, 2);
        assert_eq!(loader.sources().len(), 2);
    }

    #[test]
    fn test_env_overrides_files() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("task-market");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(
            project_dir.join("config.yaml"),
            "auth:\n  jwt_secret: from-file\n",
        )
        .unwrap();

        let env: HashMap<&str, &str> = HashMap::from([
            ("TASK_MARKET_JWT_SECRET", "from-env"),
            ("TASK_MARKET_PORT", "not-a-port"),
            ("TASK_MARKET_DB_PATH", "/tmp/market.db"),
        ]);
        let paths = ConfigPaths::with_dirs(Some(project_dir), None);
        let loader =
            ConfigLoader::load_with_env(paths, |k| env.get(k).map(|v| v.to_string())).unwrap();
        let config = loader.config();

        assert_eq!(config.auth.jwt_secret, "from-env");
        assert_eq!(config.server.db_path, PathBuf::from("/tmp/market.db"));
        // Invalid port is ignored
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_explicit_file_skips_tiers() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("task-market");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(project_dir.join("config.yaml"), "server:\n  port: 8088\n").unwrap();

        let explicit = temp.path().join("other.yaml");
        std::fs::write(&explicit, "server:\n  host: 0.0.0.0\n").unwrap();

        let paths = ConfigPaths::with_dirs(Some(project_dir), None).with_explicit(&explicit);
        let loader = ConfigLoader::load_with_env(paths, no_env).unwrap();

        assert_eq!(loader.config().server.host, "0.0.0.0");
        assert_eq!(loader.config().server.port, 3000);
        assert_eq!(loader.sources(), &[explicit]);
    }

    #[test]
    fn test_empty_explicit_file_loads_defaults() {
        let temp = TempDir::new().unwrap();
        let explicit = temp.path().join("empty.yaml");
        std::fs::write(&explicit, "# nothing here\n").unwrap();

        let paths = ConfigPaths::default().with_explicit(&explicit);
        let loader = ConfigLoader::load_with_env(paths, no_env).unwrap();
        assert_eq!(loader.config().server.port, 3000);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::default().with_explicit(temp.path().join("absent.yaml"));
        assert!(ConfigLoader::load_with_env(paths, no_env).is_err());
    }
}
