//! Project configuration stored in `.trellis/config.json`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use trellis_core::{CredentialKind, CredentialStore, SchemaRegistry};
use trellis_graph::{JsonFileStore, ScoreWeights, SledCredentialStore};

pub const CONFIG_DIR: &str = ".trellis";
const CONFIG_FILE: &str = "config.json";
const CONFIG_VERSION: &str = "1.0";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Trellis is not initialized in {0} (run `trellis init`)")]
    NotInitialized(PathBuf),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to open credential store: {0}")]
    Store(#[from] trellis_core::StoreError),
}

/// Where credentials come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// A JSON array of credential records.
    Json,
    /// An embedded sled database filled by `trellis import`.
    Sled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialSource {
    pub kind: SourceKind,
    /// Relative paths resolve against the project directory.
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub version: String,

    /// The organization's identifier.
    pub root: String,

    pub credentials: CredentialSource,

    #[serde(default)]
    pub weights: ScoreWeights,

    /// Extra schema ids and the kind each one stands for.
    #[serde(default)]
    pub schemas: BTreeMap<String, CredentialKind>,
}

impl Config {
    /// A fresh config for `root` using a sled store inside the config dir.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            root: root.into(),
            credentials: CredentialSource {
                kind: SourceKind::Sled,
                path: PathBuf::from(CONFIG_DIR).join("credentials"),
            },
            weights: ScoreWeights::default(),
            schemas: BTreeMap::new(),
        }
    }

    pub fn path(project: &Path) -> PathBuf {
        project.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    pub fn load(project: &Path) -> Result<Self, ConfigError> {
        let path = Self::path(project);
        if !path.exists() {
            return Err(ConfigError::NotInitialized(project.to_path_buf()));
        }
        let text = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, project: &Path) -> Result<(), ConfigError> {
        let path = Self::path(project);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Applies command-line overrides.
    pub fn with_overrides(mut self, root: Option<String>, credentials: Option<PathBuf>) -> Self {
        if let Some(root) = root {
            self.root = root;
        }
        if let Some(path) = credentials {
            self.credentials = CredentialSource {
                kind: SourceKind::Json,
                path,
            };
        }
        self
    }

    pub fn registry(&self) -> SchemaRegistry {
        self.schemas
            .iter()
            .map(|(schema, kind)| (schema.clone(), *kind))
            .collect()
    }

    pub fn credentials_path(&self, project: &Path) -> PathBuf {
        if self.credentials.path.is_absolute() {
            self.credentials.path.clone()
        } else {
            project.join(&self.credentials.path)
        }
    }

    /// Opens the configured credential store.
    pub fn open_store(&self, project: &Path) -> Result<Arc<dyn CredentialStore>, ConfigError> {
        let path = self.credentials_path(project);
        let store: Arc<dyn CredentialStore> = match self.credentials.kind {
            SourceKind::Json => Arc::new(JsonFileStore::new(path)),
            SourceKind::Sled => Arc::new(SledCredentialStore::open(path)?),
        };
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let mut config = Config::new("EOrg123");
        config
            .schemas
            .insert("EMembershipSaid".to_string(), CredentialKind::Membership);
        config.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(
            loaded.registry().resolve("EMembershipSaid"),
            CredentialKind::Membership
        );
    }

    #[test]
    fn test_load_uninitialized() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(ConfigError::NotInitialized(_))
        ));
    }

    #[test]
    fn test_minimal_config_uses_default_weights() {
        let config: Config = serde_json::from_str(
            r#"{
                "version": "1.0",
                "root": "org",
                "credentials": { "kind": "json", "path": "creds.json" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.weights, ScoreWeights::default());
        assert!(config.schemas.is_empty());
    }

    #[test]
    fn test_overrides() {
        let config = Config::new("org")
            .with_overrides(Some("other".to_string()), Some(PathBuf::from("/tmp/c.json")));
        assert_eq!(config.root, "other");
        assert_eq!(config.credentials.kind, SourceKind::Json);
        assert_eq!(
            config.credentials_path(Path::new("/project")),
            PathBuf::from("/tmp/c.json")
        );
    }
}
