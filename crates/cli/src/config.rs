//! `feedback.toml` configuration.
//!
//! # Example
//!
//! ```toml
//! [store]
//! dir = "/var/lib/feedback"
//! key = "feedback_responses"
//!
//! [server]
//! port = 8080
//!
//! [[admins]]
//! username = "admin"
//! password = "change-me"
//! ```
//!
//! Precedence, lowest first: built-in defaults, the config file,
//! `FEEDBACK_STORE_DIR` / `FEEDBACK_PORT`, then command-line flags.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use feedback_core::{Credentials, StaticAllowList};
use feedback_storage::{FileKv, KvRecordStore, MemoryKv, DEFAULT_KEY};
use serde::Deserialize;

/// Looked up in the working directory when no path is given.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "feedback.toml";
pub(crate) const DEFAULT_STORE_DIR: &str = "feedback-data";
pub(crate) const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("could not read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{var}={value:?} is not a valid value")]
    InvalidEnv { var: &'static str, value: String },
}

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FeedbackConfig {
    pub(crate) store: StoreSettings,
    pub(crate) server: ServerSettings,
    /// Dashboard accounts. With none configured every admin login fails.
    pub(crate) admins: Vec<Credentials>,
}

/// `[store]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct StoreSettings {
    /// Directory holding one JSON file per key.
    pub(crate) dir: PathBuf,
    /// Key under which the record collection is stored.
    pub(crate) key: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_STORE_DIR),
            key: DEFAULT_KEY.to_string(),
        }
    }
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ServerSettings {
    pub(crate) port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

// ── Functions ─────────────────────────────────────────────────────────────────

pub(crate) fn read_config(path: &Path) -> Result<FeedbackConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content, path)
}

fn parse_config(content: &str, path: &Path) -> Result<FeedbackConfig, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve and load configuration.
///
/// An explicit path (flag or `FEEDBACK_CONFIG`) must exist. Otherwise
/// `feedback.toml` in the working directory is used when present, and
/// defaults apply when it is not.
pub(crate) fn load(explicit: Option<&Path>) -> Result<FeedbackConfig, ConfigError> {
    let from_env = std::env::var_os("FEEDBACK_CONFIG").map(PathBuf::from);
    let mut config = match explicit.map(Path::to_path_buf).or(from_env) {
        Some(path) => read_config(&path)?,
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            if fallback.is_file() {
                read_config(fallback)?
            } else {
                FeedbackConfig::default()
            }
        }
    };
    apply_env(&mut config, |var| std::env::var(var).ok())?;
    Ok(config)
}

fn apply_env(
    config: &mut FeedbackConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(dir) = lookup("FEEDBACK_STORE_DIR").filter(|d| !d.is_empty()) {
        config.store.dir = PathBuf::from(dir);
    }
    if let Some(port) = lookup("FEEDBACK_PORT").filter(|p| !p.is_empty()) {
        config.server.port = port.parse().map_err(|_| ConfigError::InvalidEnv {
            var: "FEEDBACK_PORT",
            value: port,
        })?;
    }
    Ok(())
}

impl FeedbackConfig {
    /// Open the record store this configuration points at.
    ///
    /// `ephemeral` keeps records in process memory only.
    pub(crate) fn open_store(&self, ephemeral: bool) -> KvRecordStore {
        let backend: Arc<dyn feedback_storage::KvBackend> = if ephemeral {
            Arc::new(MemoryKv::new())
        } else {
            Arc::new(FileKv::new(&self.store.dir))
        };
        tracing::debug!(
            dir = %self.store.dir.display(),
            key = %self.store.key,
            ephemeral,
            "opening record store"
        );
        KvRecordStore::new(backend).with_key(self.store.key.clone())
    }

    pub(crate) fn authenticator(&self) -> StaticAllowList {
        StaticAllowList::new(self.admins.clone())
    }
}
