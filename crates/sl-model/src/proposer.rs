//! Model proposers: where model definitions come from
//!
//! A proposer turns the raw schema into a list of named files. The
//! materializer only cares about the `.sql` ones; `.yml` files are
//! documentation written next to them.

use crate::error::{ModelError, ModelResult};
use async_trait::async_trait;
use log::{debug, info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sl_core::sql_utils::{is_plain_ident, quote_ident};
use sl_core::{MaterializeConfig, RawSchema, TableSchema};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::OnceLock;
use tokio::io::AsyncWriteExt;

/// A generated artifact: relative file name and its text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelFile {
    pub name: String,
    pub content: String,
}

impl ModelFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Path below the models directory, without a leading `/` or `models/`
    pub fn relative_path(&self) -> &str {
        let name = self.name.trim_start_matches('/');
        name.strip_prefix("models/").unwrap_or(name)
    }

    /// File stem, which is the model name for `.sql` files
    pub fn stem(&self) -> Option<&str> {
        Path::new(self.relative_path())
            .file_stem()
            .and_then(|s| s.to_str())
    }

    pub fn is_sql(&self) -> bool {
        has_extension(Path::new(&self.name), &["sql"])
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

/// Source of model definitions for a raw schema
#[async_trait]
pub trait ModelProposer: Send + Sync {
    async fn propose_models(&self, schema: &RawSchema) -> ModelResult<Vec<ModelFile>>;
}

/// Deterministic proposer: one passthrough model per staging table
#[derive(Debug, Clone)]
pub struct StagingProposer {
    staging_prefix: String,
    model_prefix: String,
}

#[derive(Serialize)]
struct DocStub {
    version: u32,
    models: Vec<DocModel>,
}

#[derive(Serialize)]
struct DocModel {
    name: String,
    description: String,
    columns: Vec<DocColumn>,
}

#[derive(Serialize)]
struct DocColumn {
    name: String,
    description: String,
}

impl StagingProposer {
    pub fn new(staging_prefix: impl Into<String>, model_prefix: impl Into<String>) -> Self {
        Self {
            staging_prefix: staging_prefix.into(),
            model_prefix: model_prefix.into(),
        }
    }

    pub fn from_config(config: &MaterializeConfig) -> Self {
        Self::new(&config.staging_prefix, &config.model_prefix)
    }

    fn model_name(&self, table: &str) -> Option<String> {
        let rest = table.strip_prefix(&self.staging_prefix)?;
        (!rest.is_empty()).then(|| format!("{}{}", self.model_prefix, rest))
    }

    fn model_sql(table: &TableSchema) -> String {
        let columns = if table.columns.is_empty() {
            "    *".to_string()
        } else {
            table
                .columns
                .iter()
                .map(|c| {
                    if is_plain_ident(&c.name) {
                        format!("    {}", c.name)
                    } else {
                        format!("    {}", quote_ident(&c.name))
                    }
                })
                .collect::<Vec<_>>()
                .join(",\n")
        };
        format!(
            "{{{{ config(materialized='table') }}}}\n\nselect\n{}\nfrom {{{{ ref('{}') }}}}\n",
            columns, table.name
        )
    }

    fn doc_stub(model: &str, table: &TableSchema) -> ModelResult<String> {
        let stub = DocStub {
            version: 2,
            models: vec![DocModel {
                name: model.to_string(),
                description: String::new(),
                columns: table
                    .columns
                    .iter()
                    .map(|c| DocColumn {
                        name: c.name.clone(),
                        description: String::new(),
                    })
                    .collect(),
            }],
        };
        Ok(serde_yaml::to_string(&stub)?)
    }
}

#[async_trait]
impl ModelProposer for StagingProposer {
    async fn propose_models(&self, schema: &RawSchema) -> ModelResult<Vec<ModelFile>> {
        let mut files = Vec::new();
        for table in schema.tables() {
            let Some(model) = self.model_name(&table.name) else {
                debug!("{}: no staging prefix, not proposed", table.name);
                continue;
            };
            files.push(ModelFile::new(format!("{model}.sql"), Self::model_sql(table)));
            files.push(ModelFile::new(
                format!("{model}.yml"),
                Self::doc_stub(&model, table)?,
            ));
        }
        info!("Staging proposer: {} files", files.len());
        Ok(files)
    }
}

/// Reads hand-written or previously generated definitions from a directory
#[derive(Debug, Clone)]
pub struct DirectoryProposer {
    dir: PathBuf,
}

impl DirectoryProposer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ModelProposer for DirectoryProposer {
    async fn propose_models(&self, _schema: &RawSchema) -> ModelResult<Vec<ModelFile>> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| ModelError::io(&self.dir, e))?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && has_extension(p, &["sql", "yml", "yaml"]))
            .collect();
        paths.sort();

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let content = std::fs::read_to_string(&path).map_err(|e| ModelError::io(&path, e))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            files.push(ModelFile::new(name, content));
        }
        Ok(files)
    }
}

/// Runs an external generator: raw schema JSON on stdin, file list on stdout
#[derive(Debug, Clone)]
pub struct CommandProposer {
    program: String,
    args: Vec<String>,
}

#[derive(Deserialize)]
struct GeneratorOutput {
    files: Vec<ModelFile>,
}

const METRICS_FILE: &str = "models/metrics.yml";

impl CommandProposer {
    /// Parse a command line; arguments are split on whitespace
    pub fn new(command: &str) -> ModelResult<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| ModelError::Generator("empty generator command".into()))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    async fn run(&self, input: &str) -> ModelResult<String> {
        let mut child = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ModelError::Generator(format!("failed to start {}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .await
                .map_err(|e| ModelError::Generator(format!("failed to write schema: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ModelError::Generator(format!("{} did not finish: {}", self.program, e)))?;
        if !output.status.success() {
            return Err(ModelError::Generator(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl ModelProposer for CommandProposer {
    async fn propose_models(&self, schema: &RawSchema) -> ModelResult<Vec<ModelFile>> {
        let input = serde_json::to_string(schema)?;
        let stdout = self.run(&input).await?;
        let files = parse_generator_output(&stdout)?;
        info!("Generator {}: {} files", self.program, files.len());
        Ok(files)
    }
}

fn fenced_json_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").expect("valid regex"))
}

/// Decode generator stdout, accepting a bare object or one inside a
/// fenced json block, and append an empty metrics file when missing
pub fn parse_generator_output(stdout: &str) -> ModelResult<Vec<ModelFile>> {
    let body = match fenced_json_re().captures(stdout) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()),
        None => stdout.trim(),
    };
    let output: GeneratorOutput = serde_json::from_str(body)
        .map_err(|e| ModelError::Generator(format!("unreadable generator output: {e}")))?;

    let mut files = output.files;
    if !files
        .iter()
        .any(|f| f.relative_path().eq_ignore_ascii_case("metrics.yml"))
    {
        warn!("Generator returned no metrics.yml; adding an empty one");
        files.push(ModelFile::new(METRICS_FILE, "metrics: []\n"));
    }
    Ok(files)
}

#[cfg(test)]
#[path = "proposer_test.rs"]
mod tests;
