//! Runtime context for CLI commands

use anyhow::{Context, Result};
use sl_core::{Config, Credentials, MetadataMapping};
use sl_db::{Database, DuckDbBackend};
use sl_remote::{HttpSource, MetadataTranslator, RemoteSource};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// Loaded configuration plus the directory its paths are relative to
pub struct RuntimeContext {
    pub root: PathBuf,
    pub config: Config,
}

impl RuntimeContext {
    /// Load `sluice.yml` (or `--config`) and apply `--user`/`--password`
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        let root = PathBuf::from(&args.project_dir);
        let config = if let Some(config_path) = &args.config {
            Config::load(Path::new(config_path)).context("Failed to load configuration file")?
        } else {
            Config::load_from_dir(&root).context("Failed to load project configuration")?
        };

        let config = match (&args.user, &args.password) {
            (Some(username), Some(password)) => config.with_credentials(Credentials {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => config,
        };

        Ok(Self { root, config })
    }

    /// Resolve a configured path against the project directory
    pub fn path(&self, configured: &str) -> PathBuf {
        Config::resolve_path(&self.root, configured)
    }

    pub fn raw_store_path(&self) -> PathBuf {
        self.path(&self.config.stores.raw)
    }

    pub fn derived_store_path(&self) -> PathBuf {
        self.path(&self.config.stores.derived)
    }

    pub fn open_store(path: &Path) -> Result<Arc<dyn Database>> {
        let db = DuckDbBackend::from_path(path)
            .with_context(|| format!("Failed to open store {}", path.display()))?;
        Ok(Arc::new(db))
    }

    /// Authenticated client for the configured remote
    pub fn remote_source(&self) -> Result<Arc<dyn RemoteSource>> {
        let credentials = self.config.credentials()?.clone();
        let source = HttpSource::new(&self.config.remote, credentials)
            .context("Failed to build remote client")?;
        Ok(Arc::new(source))
    }
}

/// Fetch the metadata document once; failure aborts the command
pub async fn fetch_mappings(
    source: Arc<dyn RemoteSource>,
    config: &Config,
) -> Result<MetadataMapping> {
    MetadataTranslator::new(source, &config.remote.description_term)
        .fetch_metadata()
        .await
        .context("Failed to fetch remote metadata")
}
