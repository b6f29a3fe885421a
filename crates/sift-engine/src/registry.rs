//! Engine selection and the active-engine registry.
//!
//! [`EngineRegistry`] owns the single active engine. It starts with the
//! [`NullEngine`] and swaps in a new engine only after its constructor has
//! finished; a constructor that fails or panics leaves the null engine
//! installed and logs a warning.

use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use sift_core::{EngineConfig, Error, Result};
use sift_mapping::MappingTable;

use crate::backend::{IndexEngine, NullEngine};

// ============================================================================
// EngineKind
// ============================================================================

/// Engines Sift can build by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// Embedded Tantivy index (`tantivy`, `embedded`).
    Tantivy,
    /// HTTP provider (`remote`, `elasticsearch`).
    Remote,
}

impl EngineKind {
    /// Canonical identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Tantivy => "tantivy",
            EngineKind::Remote => "remote",
        }
    }
}

impl FromStr for EngineKind {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "tantivy" | "embedded" => Ok(EngineKind::Tantivy),
            "remote" | "elasticsearch" => Ok(EngineKind::Remote),
            _ => Err(Error::config(format!("Unknown search engine '{name}'"))),
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build an engine of the given kind.
///
/// # Errors
///
/// Returns an error if the engine cannot be initialized, including when the
/// crate was built without the engine's feature.
pub fn create_engine(
    kind: EngineKind,
    config: &EngineConfig,
    mappings: Arc<MappingTable>,
) -> Result<Arc<dyn IndexEngine>> {
    match kind {
        #[cfg(feature = "engine-tantivy")]
        EngineKind::Tantivy => {
            let path = config.resolved_index_path();
            let engine = crate::tantivy_engine::TantivyEngine::open(&path, mappings, config)?;
            Ok(Arc::new(engine))
        }
        #[cfg(feature = "engine-remote")]
        EngineKind::Remote => {
            let uri = config
                .remote_uri
                .as_deref()
                .ok_or_else(|| Error::config("No provider URI configured for the remote engine"))?;
            let engine = crate::remote::RemoteEngine::new(uri, mappings)?;
            Ok(Arc::new(engine))
        }
        #[allow(unreachable_patterns)]
        other => {
            let _ = (config, mappings);
            Err(Error::engine_unavailable(format!(
                "engine '{other}' is not compiled into this build"
            )))
        }
    }
}

// ============================================================================
// EngineRegistry
// ============================================================================

/// Holder of the active engine.
///
/// Readers clone the current `Arc` and keep using it even if the engine is
/// replaced mid-request.
pub struct EngineRegistry {
    active: RwLock<Arc<dyn IndexEngine>>,
}

impl EngineRegistry {
    /// A registry with the null engine active.
    pub fn new() -> Self {
        Self::with_engine(Arc::new(NullEngine::new()))
    }

    /// A registry with `engine` active.
    pub fn with_engine(engine: Arc<dyn IndexEngine>) -> Self {
        Self {
            active: RwLock::new(engine),
        }
    }

    /// The active engine.
    pub fn current(&self) -> Arc<dyn IndexEngine> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run `constructor` and make its engine active.
    ///
    /// On error or panic the null engine becomes active instead. Returns the
    /// engine that was installed.
    pub fn set_engine<F>(&self, constructor: F) -> Arc<dyn IndexEngine>
    where
        F: FnOnce() -> Result<Arc<dyn IndexEngine>>,
    {
        let built = match panic::catch_unwind(AssertUnwindSafe(constructor)) {
            Ok(result) => result,
            Err(payload) => Err(Error::backend(format!(
                "engine constructor panicked: {}",
                panic_message(payload.as_ref())
            ))),
        };

        let engine = match built {
            Ok(engine) => {
                log::info!("Using search engine {}", engine.name());
                engine
            }
            Err(e) => {
                log::warn!(
                    "Falling back to search null engine, indexing and queries will not work: {e}"
                );
                Arc::new(NullEngine::with_reason(e.to_string())) as Arc<dyn IndexEngine>
            }
        };

        self.install(engine.clone());
        engine
    }

    /// Build and install the engine called `name`.
    ///
    /// Unknown names install the null engine.
    pub fn set_engine_by_name(
        &self,
        name: &str,
        config: &EngineConfig,
        mappings: Arc<MappingTable>,
    ) -> Arc<dyn IndexEngine> {
        self.set_engine(|| {
            let kind = EngineKind::from_str(name)?;
            create_engine(kind, config, mappings)
        })
    }

    fn install(&self, engine: Arc<dyn IndexEngine>) {
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        *active = engine;
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("active", &self.current().name())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_kind_parse() {
        assert_eq!("tantivy".parse::<EngineKind>().unwrap(), EngineKind::Tantivy);
        assert_eq!("Embedded".parse::<EngineKind>().unwrap(), EngineKind::Tantivy);
        assert_eq!("remote".parse::<EngineKind>().unwrap(), EngineKind::Remote);
        assert_eq!(
            "ElasticSearch".parse::<EngineKind>().unwrap(),
            EngineKind::Remote
        );
        assert!("CLucene".parse::<EngineKind>().is_err());
    }

    #[test]
    fn test_registry_starts_null() {
        let registry = EngineRegistry::new();
        assert_eq!(registry.current().name(), "null");
        assert!(!registry.current().is_available());
    }

    #[test]
    fn test_set_engine_error_falls_back() {
        let registry = EngineRegistry::new();
        let engine = registry.set_engine(|| Err(Error::backend("disk on fire")));
        assert_eq!(engine.name(), "null");
        assert_eq!(registry.current().name(), "null");
    }

    #[test]
    fn test_set_engine_panic_falls_back() {
        let registry = EngineRegistry::new();
        let engine = registry.set_engine(|| panic!("constructor exploded"));
        assert_eq!(engine.name(), "null");
    }

    #[test]
    fn test_unknown_name_falls_back() {
        let registry = EngineRegistry::new();
        let engine = registry.set_engine_by_name(
            "nonsense",
            &EngineConfig::default(),
            Arc::new(MappingTable::builtin()),
        );
        assert_eq!(engine.name(), "null");
    }

    #[cfg(feature = "engine-remote")]
    #[test]
    fn test_remote_without_uri_falls_back() {
        let registry = EngineRegistry::new();
        let engine = registry.set_engine_by_name(
            "elasticsearch",
            &EngineConfig::default(),
            Arc::new(MappingTable::builtin()),
        );
        assert_eq!(engine.name(), "null");
    }

    #[cfg(feature = "engine-tantivy")]
    #[test]
    fn test_set_engine_by_name_tantivy() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = EngineConfig {
            index_path: Some(dir.path().join("index").to_string_lossy().into_owned()),
            ..Default::default()
        };
        let registry = EngineRegistry::new();
        let engine =
            registry.set_engine_by_name("tantivy", &config, Arc::new(MappingTable::builtin()));
        assert_eq!(engine.name(), "tantivy");
        assert!(registry.current().is_available());
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
    }
}
