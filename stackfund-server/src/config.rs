//! Server configuration from command-line flags and `STACKFUND_*` variables.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use stackfund_lib::{FileLinkStore, InMemoryLinkStore, ServiceConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::SharedStore;

/// Where payment links are persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StorageBackend {
    /// One JSON document per link under the data directory
    File,
    /// Process memory; everything is lost on exit
    Memory,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "stackfund")]
#[command(about = "StackFund payment link API server", long_about = None)]
#[command(version)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "STACKFUND_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Storage backend for payment links
    #[arg(long, env = "STACKFUND_STORAGE", value_enum, default_value_t = StorageBackend::File)]
    pub storage: StorageBackend,

    /// Data directory for the file backend (defaults to the platform data dir)
    #[arg(long, env = "STACKFUND_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// JSON file with service tunables (retry bound, store timeout, default duration)
    #[arg(long, env = "STACKFUND_SERVICE_CONFIG")]
    pub service_config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServerConfig {
    /// Resolved data directory.
    pub fn data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("stackfund"),
        }
    }

    /// Load and validate the service tunables, or the defaults.
    pub fn load_service_config(&self) -> Result<ServiceConfig> {
        let config = match &self.service_config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                ServiceConfig::from_json(&json)
                    .with_context(|| format!("invalid service config in {}", path.display()))?
            }
            None => ServiceConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Open the configured store.
    pub fn open_store(&self) -> Result<SharedStore> {
        let store: SharedStore = match self.storage {
            StorageBackend::Memory => Arc::new(InMemoryLinkStore::new()),
            StorageBackend::File => {
                let dir = self.data_dir();
                let store = FileLinkStore::new(&dir)
                    .with_context(|| format!("failed to open store at {}", dir.display()))?;
                Arc::new(store)
            }
        };
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::try_parse_from(["stackfund"]).unwrap();
        assert_eq!(config.bind, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.storage, StorageBackend::File);
        assert!(!config.verbose);
        assert_eq!(config.load_service_config().unwrap(), ServiceConfig::default());
    }

    #[test]
    fn test_flags() {
        let config = ServerConfig::try_parse_from([
            "stackfund",
            "--bind",
            "0.0.0.0:8080",
            "--storage",
            "memory",
            "--data-dir",
            "/tmp/stackfund",
            "-v",
        ])
        .unwrap();
        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/stackfund"));
        assert!(config.verbose);
        assert!(config.open_store().is_ok());
    }

    #[test]
    fn test_service_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("service.json");
        std::fs::write(&path, r#"{"max_id_attempts": 4, "store_timeout_ms": 250}"#).unwrap();

        let config = ServerConfig::try_parse_from([
            "stackfund",
            "--service-config",
            path.to_str().unwrap(),
        ])
        .unwrap();
        let service = config.load_service_config().unwrap();
        assert_eq!(service.max_id_attempts, 4);
        assert_eq!(service.store_timeout_ms, 250);

        std::fs::write(&path, r#"{"max_id_attempts": 0}"#).unwrap();
        assert!(config.load_service_config().is_err());
    }

    #[test]
    fn test_file_store_created_in_data_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ServerConfig::try_parse_from([
            "stackfund",
            "--data-dir",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();
        config.open_store().unwrap();
        assert!(dir.path().join("links").is_dir());
    }
}
