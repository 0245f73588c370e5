//! Document store configuration, loaded by the orchestrator crate via
//! `dotenvy` the same way `pipeline_core::runtimes::runtime_config` loads
//! its `RuntimeConfig`.

#[derive(Debug, Clone)]
pub struct DocumentStoreConfig {
    /// Path to the SQLite database file (or `:memory:`).
    pub sqlite_path: String,
    /// Whether the in-memory backend may be substituted when the
    /// configured sqlite path is unreachable. Defaults to `false`: a
    /// document store that silently degraded to in-memory on a connection
    /// failure would quietly lose every entity written during the outage,
    /// so the switch must be explicit.
    pub fallback_to_memory: bool,
    pub max_connections: u32,
}

impl Default for DocumentStoreConfig {
    fn default() -> Self {
        Self {
            sqlite_path: "pipeline.sqlite3".to_string(),
            fallback_to_memory: false,
            max_connections: 5,
        }
    }
}

impl DocumentStoreConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(path) = std::env::var("PIPELINE_SQLITE_PATH") {
            cfg.sqlite_path = path;
        }
        if let Ok(flag) = std::env::var("PIPELINE_FALLBACK_TO_MEMORY") {
            cfg.fallback_to_memory = matches!(flag.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Ok(max) = std::env::var("PIPELINE_SQLITE_MAX_CONNECTIONS") {
            if let Ok(parsed) = max.parse() {
                cfg.max_connections = parsed;
            }
        }
        cfg
    }
}
