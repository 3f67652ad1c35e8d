//! Derived-layer build: views, models, coercion, aliases, hints

use crate::aliases::{derive_aliases, write_alias_table, AliasEntry};
use crate::artifacts::extract_schema;
use crate::coercion::coerce_date_columns;
use crate::error::{ModelError, ModelResult};
use crate::hints::{derive_join_hints, write_hints, JoinHint};
use crate::order::ModelGraph;
use crate::proposer::ModelFile;
use crate::template::to_statement;
use log::{debug, info, warn};
use sl_core::sql_utils::quote_ident;
use sl_core::{MaterializeConfig, ModelName, RawSchema};
use sl_db::Database;
use sl_sql::{referenced_tables, SqlParser};
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

/// Alias the raw store is attached under
pub const RAW_ALIAS: &str = "raw";

/// What one materialization run produced
#[derive(Debug, Clone, Default)]
pub struct MaterializeReport {
    /// Models in execution order
    pub models: Vec<ModelName>,
    /// `(table, column)` pairs converted to DATE
    pub coerced_columns: Vec<(String, String)>,
    pub aliases: Vec<AliasEntry>,
    pub hints: Vec<JoinHint>,
    /// Derived store contents after the run
    pub derived_schema: RawSchema,
}

struct PlannedModel {
    name: ModelName,
    statement: String,
    /// `None` when the statement could not be parsed
    references: Option<BTreeSet<String>>,
}

/// Builds the derived store from model definitions
pub struct Materializer {
    db: Arc<dyn Database>,
    raw_store: PathBuf,
    config: MaterializeConfig,
    hint_file: Option<PathBuf>,
    parser: SqlParser,
}

impl Materializer {
    /// `db` is the derived store; `raw_store` is attached read-only
    pub fn new(db: Arc<dyn Database>, raw_store: impl Into<PathBuf>, config: MaterializeConfig) -> Self {
        Self {
            db,
            raw_store: raw_store.into(),
            config,
            hint_file: None,
            parser: SqlParser::duckdb(),
        }
    }

    /// Write join hints to this file at the end of each run
    pub fn with_hint_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.hint_file = Some(path.into());
        self
    }

    /// Run the full build. Any model failure aborts the run.
    pub async fn materialize(
        &self,
        raw_schema: &RawSchema,
        files: &[ModelFile],
    ) -> ModelResult<MaterializeReport> {
        self.create_raw_views(raw_schema).await?;

        let planned = self.plan(files);
        let graph_input: Vec<(String, BTreeSet<String>)> = planned
            .iter()
            .map(|m| {
                (
                    m.name.to_string(),
                    m.references.clone().unwrap_or_default(),
                )
            })
            .collect();
        let order = ModelGraph::build(&graph_input).execution_order()?;

        let mut report = MaterializeReport::default();
        for index in order {
            let model = &planned[index];
            self.precheck(model).await?;
            self.db
                .execute_batch(&model.statement)
                .await
                .map_err(|source| ModelError::Execution {
                    model: model.name.to_string(),
                    source,
                })?;
            info!("{}: built", model.name);
            self.post_process(model, &mut report).await?;
            report.models.push(model.name.clone());
        }

        write_alias_table(self.db.as_ref(), &report.aliases).await?;

        report.derived_schema = extract_schema(self.db.as_ref()).await?;
        report.hints = self.join_hints(&report.derived_schema)?;
        Ok(report)
    }

    async fn create_raw_views(&self, raw_schema: &RawSchema) -> ModelResult<()> {
        self.db
            .attach_read_only(&self.raw_store.to_string_lossy(), RAW_ALIAS)
            .await?;
        for table in raw_schema.table_names() {
            let select = format!(
                "SELECT * FROM {}.main.{}",
                quote_ident(RAW_ALIAS),
                quote_ident(table)
            );
            self.db.create_view_as(table, &select, true).await?;
        }
        info!("Created {} raw views", raw_schema.len());
        Ok(())
    }

    fn plan(&self, files: &[ModelFile]) -> Vec<PlannedModel> {
        let mut planned = Vec::new();
        for file in files.iter().filter(|f| f.is_sql()) {
            let Some(name) = file.stem().and_then(ModelName::try_new) else {
                warn!("{}: no model name, skipped", file.name);
                continue;
            };
            let statement = to_statement(name.as_str(), &file.content);
            let references = match self.parser.parse(&statement) {
                Ok(statements) => Some(referenced_tables(&statements)),
                Err(e) => {
                    debug!("{}: not parsed ({}), reference check skipped", name, e);
                    None
                }
            };
            planned.push(PlannedModel {
                name,
                statement,
                references,
            });
        }
        planned
    }

    /// Every referenced relation must already exist in the derived store
    async fn precheck(&self, model: &PlannedModel) -> ModelResult<()> {
        let Some(references) = &model.references else {
            return Ok(());
        };
        let existing: HashSet<String> = self
            .db
            .list_tables()
            .await?
            .into_iter()
            .map(|t| t.to_lowercase())
            .collect();
        let missing: Vec<String> = references
            .iter()
            .filter(|r| !existing.contains(&r.to_lowercase()))
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ModelError::SchemaMismatch {
                model: model.name.to_string(),
                missing,
            })
        }
    }

    async fn post_process(&self, model: &PlannedModel, report: &mut MaterializeReport) -> ModelResult<()> {
        let table = model.name.as_str();
        if !self.db.relation_exists(table).await? {
            warn!("{}: statement created no relation named after the model", table);
            return Ok(());
        }

        for column in coerce_date_columns(self.db.as_ref(), table).await? {
            report.coerced_columns.push((table.to_string(), column));
        }

        let columns = self.db.table_columns(table).await?;
        report
            .aliases
            .extend(derive_aliases(table, &columns, &self.config.alias_labels));
        Ok(())
    }

    fn join_hints(&self, derived: &RawSchema) -> ModelResult<Vec<JoinHint>> {
        let Some(fact) = &self.config.fact_table else {
            debug!("No fact table configured; join hints skipped");
            return Ok(Vec::new());
        };
        let hints = derive_join_hints(derived, fact, &self.config.dimension_prefix)?;
        if let Some(path) = &self.hint_file {
            write_hints(path, &hints)?;
        }
        Ok(hints)
    }
}
