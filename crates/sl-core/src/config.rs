//! Configuration types and parsing for sluice.yml
//!
//! Everything an engine needs is carried in one [`Config`] value built at
//! startup and passed in at construction; nothing is read from process-wide
//! state afterwards.

use crate::entity::{EntityDescriptor, SyncMode};
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file name looked up in the project directory
pub const CONFIG_FILE_NAME: &str = "sluice.yml";

/// Main project configuration from sluice.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Remote data API settings
    pub remote: RemoteConfig,

    /// Analytical store locations
    #[serde(default)]
    pub stores: StoresConfig,

    /// Synchronized collections
    #[serde(default)]
    pub entities: Vec<EntityDescriptor>,

    /// Derived layer settings
    #[serde(default)]
    pub materialize: MaterializeConfig,
}

/// Remote data API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteConfig {
    /// Service root, e.g. `https://erp.example.com/odata/Priority/tabula.ini/demo`
    pub url: String,

    /// Offset appended to date-time literals in `$filter`
    #[serde(default = "default_timezone_offset")]
    pub timezone_offset: String,

    /// `$top` ceiling applied to every data request
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Uniform request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts for a request answered with a server-side error
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Fixed delay between attempts
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Annotation term carrying the human-readable field description
    #[serde(default = "default_description_term")]
    pub description_term: String,

    /// Inline credentials; normally injected from flags or environment
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

/// Basic-auth credentials
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Store file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoresConfig {
    /// Store receiving synchronized entities
    #[serde(default = "default_raw_store")]
    pub raw: String,

    /// Store holding views and derived models
    #[serde(default = "default_derived_store")]
    pub derived: String,
}

impl Default for StoresConfig {
    fn default() -> Self {
        Self {
            raw: default_raw_store(),
            derived: default_derived_store(),
        }
    }
}

/// Derived layer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaterializeConfig {
    /// Directory holding generated model definitions
    #[serde(default = "default_models_dir")]
    pub models_dir: String,

    /// Plain-text join hint output
    #[serde(default = "default_hint_file")]
    pub hint_file: String,

    /// Raw tables the staging proposer turns into models
    #[serde(default = "default_staging_prefix")]
    pub staging_prefix: String,

    /// Prefix the staging proposer gives its models
    #[serde(default = "default_model_prefix")]
    pub model_prefix: String,

    /// Derived tables treated as dimensions for join hints
    #[serde(default = "default_model_prefix")]
    pub dimension_prefix: String,

    /// Derived table treated as the fact table for join hints
    #[serde(default)]
    pub fact_table: Option<String>,

    /// External generator command: raw schema JSON on stdin, files JSON on stdout
    #[serde(default)]
    pub generator: Option<String>,

    /// Description prefixes written into the alias table
    #[serde(default)]
    pub alias_labels: AliasLabels,
}

impl Default for MaterializeConfig {
    fn default() -> Self {
        Self {
            models_dir: default_models_dir(),
            hint_file: default_hint_file(),
            staging_prefix: default_staging_prefix(),
            model_prefix: default_model_prefix(),
            dimension_prefix: default_model_prefix(),
            fact_table: None,
            generator: None,
            alias_labels: AliasLabels::default(),
        }
    }
}

/// Prefixes for alias descriptions: `<prefix> <model>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AliasLabels {
    /// For `...des` columns
    #[serde(default = "default_description_label")]
    pub description: String,

    /// For `...name` columns
    #[serde(default = "default_code_label")]
    pub code: String,
}

impl Default for AliasLabels {
    fn default() -> Self {
        Self {
            description: default_description_label(),
            code: default_code_label(),
        }
    }
}

fn default_timezone_offset() -> String {
    "+02:00".to_string()
}

fn default_page_size() -> usize {
    100_000
}

fn default_timeout_secs() -> u64 {
    180
}

fn default_retries() -> u32 {
    4
}

fn default_retry_delay_secs() -> u64 {
    5
}

fn default_description_term() -> String {
    "Priority.OData.Description".to_string()
}

fn default_raw_store() -> String {
    "raw.duckdb".to_string()
}

fn default_derived_store() -> String {
    "derived.duckdb".to_string()
}

fn default_models_dir() -> String {
    "models".to_string()
}

fn default_hint_file() -> String {
    "star_hint.txt".to_string()
}

fn default_staging_prefix() -> String {
    "stg_".to_string()
}

fn default_model_prefix() -> String {
    "dim_".to_string()
}

fn default_description_label() -> String {
    "תיאור".to_string()
}

fn default_code_label() -> String {
    "קוד".to_string()
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration text
    pub fn from_yaml(content: &str) -> CoreResult<Self> {
        let config: Config =
            serde_yaml::from_str(content).map_err(|e| CoreError::ConfigParseError {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `sluice.yml` (or `sluice.yaml`) from a project directory
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join(CONFIG_FILE_NAME);
        let yaml_path = dir.join("sluice.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.name.is_empty() {
            return Err(invalid("Project name cannot be empty"));
        }

        let url = self.remote.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(invalid(format!(
                "remote.url must be an http(s) URL, got '{}'",
                self.remote.url
            )));
        }
        if self.remote.page_size == 0 {
            return Err(invalid("remote.page_size must be positive"));
        }
        if self.remote.retries == 0 {
            return Err(invalid("remote.retries must be at least 1"));
        }

        let mut tables = HashSet::new();
        for entity in &self.entities {
            if !tables.insert(entity.table.as_str()) {
                return Err(invalid(format!(
                    "table '{}' is the target of more than one entity",
                    entity.table
                )));
            }
            if entity.time_field.is_some() && entity.split.is_some() {
                return Err(invalid(format!(
                    "entity '{}' cannot combine time_field with split",
                    entity.entity
                )));
            }
            if matches!(entity.time_field.as_deref(), Some("")) {
                return Err(invalid(format!(
                    "entity '{}' has an empty time_field",
                    entity.entity
                )));
            }
        }

        Ok(())
    }

    /// Replace the inline credentials
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.remote.credentials = Some(credentials);
        self
    }

    /// Credentials, or an error naming how to supply them
    pub fn credentials(&self) -> CoreResult<&Credentials> {
        self.remote
            .credentials
            .as_ref()
            .ok_or_else(|| CoreError::MissingCredentials {
                message: "pass --user/--password or set PRIORITY_USER/PRIORITY_PASS".to_string(),
            })
    }

    /// Descriptors with a time field, in config order
    pub fn partitioned_entities(&self) -> impl Iterator<Item = &EntityDescriptor> {
        self.entities
            .iter()
            .filter(|e| e.mode() == SyncMode::Partitioned)
    }

    /// Descriptors without a time field, in config order
    pub fn snapshot_entities(&self) -> impl Iterator<Item = &EntityDescriptor> {
        self.entities
            .iter()
            .filter(|e| e.mode() != SyncMode::Partitioned)
    }

    /// Restrict descriptors to the named entities (case-insensitive).
    ///
    /// An empty filter keeps everything; an unknown name is an error.
    pub fn select_entities<'a>(
        &'a self,
        names: &[String],
    ) -> CoreResult<Vec<&'a EntityDescriptor>> {
        if names.is_empty() {
            return Ok(self.entities.iter().collect());
        }
        for name in names {
            if !self.entities.iter().any(|e| e.entity.matches(name)) {
                return Err(CoreError::UnknownEntity { name: name.clone() });
            }
        }
        Ok(self
            .entities
            .iter()
            .filter(|e| names.iter().any(|n| e.entity.matches(n)))
            .collect())
    }

    /// Resolve a configured path against the project root
    pub fn resolve_path(root: &Path, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() || path == ":memory:" {
            p.to_path_buf()
        } else {
            root.join(p)
        }
    }
}

fn invalid(message: impl Into<String>) -> CoreError {
    CoreError::ConfigInvalid {
        message: message.into(),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
