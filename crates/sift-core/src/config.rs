//! Layered configuration for Sift.
//!
//! Configuration is resolved in three layers:
//!
//! 1. Built-in defaults ([`SiftConfig::default`])
//! 2. A TOML file: the explicit path, else `SIFT_CONFIG`, else
//!    `<config dir>/sift/config.toml`
//! 3. Environment overrides (`SIFT_ENGINE`, `SIFT_INDEX_PATH`,
//!    `SIFT_PROVIDER_URI`, `SIFT_BIND`)
//!
//! # Example
//!
//! ```rust,ignore
//! use sift_core::SiftConfig;
//!
//! let config = SiftConfig::load(None)?;
//! println!("engine = {}", config.engine.name);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::paths::{default_index_dir, expand_path};

/// Environment variable naming an explicit config file.
pub const ENV_CONFIG: &str = "SIFT_CONFIG";
/// Environment override for `engine.name`.
pub const ENV_ENGINE: &str = "SIFT_ENGINE";
/// Environment override for `engine.index_path`.
pub const ENV_INDEX_PATH: &str = "SIFT_INDEX_PATH";
/// Environment override replacing the provider list with a single provider.
pub const ENV_PROVIDER_URI: &str = "SIFT_PROVIDER_URI";
/// Environment override for `server.bind`.
pub const ENV_BIND: &str = "SIFT_BIND";

// ============================================================================
// SiftConfig
// ============================================================================

/// Top-level Sift configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiftConfig {
    /// Optional JSON file with extra or overriding type mappings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mappings_path: Option<String>,

    /// Index engine selection and tuning.
    pub engine: EngineConfig,

    /// Search providers the query relay may call, in priority order.
    pub providers: Vec<ProviderConfig>,

    /// Provider endpoint settings.
    pub server: ServerConfig,
}

impl SiftConfig {
    /// Load configuration from defaults, the resolved TOML file, and the
    /// process environment.
    ///
    /// An explicitly named file must exist; the implicit default location is
    /// optional.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = match Self::resolve_config_path(config_path) {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) if config_path.is_some() => {
                return Err(Error::config(format!(
                    "Config file does not exist at {}",
                    path.display()
                )));
            }
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a TOML file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        log::debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Parse configuration from a TOML string. Missing keys take defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(e.to_string()))
    }

    /// Serialize to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Resolve which config file to read: explicit path, then `SIFT_CONFIG`,
    /// then the platform default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(expand_path(path));
        }
        if let Ok(path) = std::env::var(ENV_CONFIG) {
            return Some(expand_path(&path));
        }
        Self::default_config_path()
    }

    /// `<config dir>/sift/config.toml`, if the platform has a config dir.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sift").join("config.toml"))
    }

    /// Apply environment-style overrides from `lookup`.
    ///
    /// `load` passes the process environment; tests pass a map.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup(ENV_ENGINE) {
            self.engine.name = name;
        }
        if let Some(path) = lookup(ENV_INDEX_PATH) {
            self.engine.index_path = Some(path);
        }
        if let Some(uri) = lookup(ENV_PROVIDER_URI) {
            self.providers = vec![ProviderConfig {
                name: "env".to_string(),
                uri,
            }];
        }
        if let Some(bind) = lookup(ENV_BIND) {
            self.server.bind = bind;
        }
    }

    /// Flatten the overridable settings into `(VAR, value)` pairs.
    pub fn to_env_vars(&self) -> Vec<(String, String)> {
        let mut vars = vec![(ENV_ENGINE.to_string(), self.engine.name.clone())];
        if let Some(path) = &self.engine.index_path {
            vars.push((ENV_INDEX_PATH.to_string(), path.clone()));
        }
        if let Some(provider) = self.providers.first() {
            vars.push((ENV_PROVIDER_URI.to_string(), provider.uri.clone()));
        }
        vars.push((ENV_BIND.to_string(), self.server.bind.clone()));
        vars
    }

    /// Expanded mappings file path, if one is configured.
    pub fn mappings_file(&self) -> Option<PathBuf> {
        self.mappings_path.as_deref().map(expand_path)
    }

    /// Engine settings with `remote_uri` filled from the first provider when
    /// it is not set explicitly.
    pub fn effective_engine(&self) -> EngineConfig {
        let mut engine = self.engine.clone();
        if engine.remote_uri.is_none() {
            engine.remote_uri = self.providers.first().map(|p| p.uri.clone());
        }
        engine
    }
}

// ============================================================================
// EngineConfig
// ============================================================================

/// Index engine selection and tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine identifier (`tantivy`, `embedded`, `remote`, `elasticsearch`).
    pub name: String,

    /// Directory holding the embedded index. `None` uses the platform data
    /// directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_path: Option<String>,

    /// Maximum hits returned per query.
    pub default_limit: usize,

    /// Memory budget for the embedded index writer, in bytes.
    pub writer_buffer_bytes: usize,

    /// Per-request indexing timeout. `None` waits indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_timeout_secs: Option<u64>,

    /// Provider URI used by the remote engine. Falls back to the first
    /// configured provider when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_uri: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: "tantivy".to_string(),
            index_path: None,
            default_limit: 25,
            writer_buffer_bytes: 50_000_000,
            index_timeout_secs: None,
            remote_uri: None,
        }
    }
}

impl EngineConfig {
    /// Expanded index directory.
    pub fn resolved_index_path(&self) -> PathBuf {
        match &self.index_path {
            Some(path) => expand_path(path),
            None => default_index_dir(),
        }
    }

    /// Indexing timeout as a [`Duration`].
    pub fn index_timeout(&self) -> Option<Duration> {
        self.index_timeout_secs.map(Duration::from_secs)
    }
}

// ============================================================================
// ProviderConfig / ServerConfig
// ============================================================================

/// A search provider reachable over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Display name.
    pub name: String,
    /// Base URI; the relay appends `query?q=...`.
    pub uri: String,
}

/// Provider endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8042".to_string(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = SiftConfig::default();
        assert_eq!(config.engine.name, "tantivy");
        assert_eq!(config.engine.default_limit, 25);
        assert_eq!(config.engine.writer_buffer_bytes, 50_000_000);
        assert!(config.engine.index_timeout().is_none());
        assert!(config.providers.is_empty());
        assert_eq!(config.server.bind, "127.0.0.1:8042");
    }

    #[test]
    fn test_from_toml_partial() {
        let config = SiftConfig::from_toml_str(
            r#"
            [engine]
            name = "remote"
            index_timeout_secs = 30

            [[providers]]
            name = "local"
            uri = "http://127.0.0.1:8042/"
            "#,
        )
        .unwrap();
        assert_eq!(config.engine.name, "remote");
        assert_eq!(config.engine.default_limit, 25);
        assert_eq!(config.engine.index_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.providers.len(), 1);
        assert_eq!(config.providers[0].uri, "http://127.0.0.1:8042/");
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn test_from_toml_invalid() {
        let err = SiftConfig::from_toml_str("[engine\nname=").unwrap_err();
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = SiftConfig::default();
        config.engine.index_path = Some("/var/lib/sift".to_string());
        config.providers.push(ProviderConfig {
            name: "local".to_string(),
            uri: "http://localhost:8042/".to_string(),
        });
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("[engine]"));
        assert_eq!(SiftConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_apply_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_ENGINE, "embedded"),
            (ENV_INDEX_PATH, "/tmp/sift"),
            (ENV_PROVIDER_URI, "http://search.local/"),
            (ENV_BIND, "0.0.0.0:9000"),
        ]
        .into_iter()
        .collect();

        let mut config = SiftConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.engine.name, "embedded");
        assert_eq!(config.engine.resolved_index_path(), PathBuf::from("/tmp/sift"));
        assert_eq!(config.providers[0].uri, "http://search.local/");
        assert_eq!(config.server.bind, "0.0.0.0:9000");
    }

    #[test]
    fn test_apply_overrides_empty_env_keeps_values() {
        let mut config = SiftConfig::default();
        config.apply_overrides(|_| None);
        assert_eq!(config, SiftConfig::default());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[engine]\ndefault_limit = 5\n").unwrap();

        let config = SiftConfig::from_file(&path).unwrap();
        assert_eq!(config.engine.default_limit, 5);
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let err = SiftConfig::load(Some("/nonexistent/sift/config.toml")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_to_env_vars() {
        let config = SiftConfig::default();
        let vars = config.to_env_vars();
        assert!(vars.contains(&(ENV_ENGINE.to_string(), "tantivy".to_string())));
        assert!(vars.contains(&(ENV_BIND.to_string(), "127.0.0.1:8042".to_string())));
    }

    #[test]
    fn test_effective_engine_uses_first_provider() {
        let mut config = SiftConfig::default();
        config.providers = vec![
            ProviderConfig {
                name: "a".to_string(),
                uri: "http://a/".to_string(),
            },
            ProviderConfig {
                name: "b".to_string(),
                uri: "http://b/".to_string(),
            },
        ];
        assert_eq!(
            config.effective_engine().remote_uri.as_deref(),
            Some("http://a/")
        );

        config.engine.remote_uri = Some("http://explicit/".to_string());
        assert_eq!(
            config.effective_engine().remote_uri.as_deref(),
            Some("http://explicit/")
        );
    }

    #[test]
    fn test_resolve_config_path_explicit() {
        let path = SiftConfig::resolve_config_path(Some("/etc/sift.toml"));
        assert_eq!(path, Some(PathBuf::from("/etc/sift.toml")));
    }
}
