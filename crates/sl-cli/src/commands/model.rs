//! Model command implementation - propose, write and materialize

use anyhow::{Context, Result};
use log::info;
use sl_core::RawSchema;
use sl_model::{
    extract_schema, reset_workspace, write_model_files, CommandProposer, DirectoryProposer,
    MaterializeReport, Materializer, ModelFile, ModelProposer, StagingProposer,
};
use std::path::Path;

use crate::cli::{GlobalArgs, ModelArgs};
use crate::context::RuntimeContext;

/// Execute the model command
pub(crate) async fn execute(args: &ModelArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::load(global)?;
    let settings = &ctx.config.materialize;
    let models_dir = ctx.path(args.models_dir.as_deref().unwrap_or(&settings.models_dir));
    let raw_path = ctx.raw_store_path();
    let derived_path = ctx.derived_store_path();
    let hint_path = ctx.path(&settings.hint_file);

    if !raw_path.exists() {
        anyhow::bail!(
            "Raw store {} does not exist; run backfill or snapshot first",
            raw_path.display()
        );
    }
    let raw_schema = read_raw_schema(&raw_path).await?;
    println!("[INFO] Raw store: {} tables", raw_schema.len());

    let files = if args.keep {
        let files = DirectoryProposer::new(&models_dir)
            .propose_models(&raw_schema)
            .await
            .context("Failed to read existing models")?;
        reset_workspace(&models_dir, &derived_path, &hint_path)?;
        write_model_files(&models_dir, &files)?;
        files
    } else {
        reset_workspace(&models_dir, &derived_path, &hint_path)?;
        let generator = args.generator.as_ref().or(settings.generator.as_ref());
        let proposer: Box<dyn ModelProposer> = match generator {
            Some(command) => Box::new(CommandProposer::new(command)?),
            None => Box::new(StagingProposer::from_config(settings)),
        };
        let files = proposer
            .propose_models(&raw_schema)
            .await
            .context("Failed to propose models")?;
        write_model_files(&models_dir, &files)?;
        files
    };
    println!(
        "[INFO] {} model files in {}",
        files.len(),
        models_dir.display()
    );

    let db = RuntimeContext::open_store(&derived_path)?;
    let report = Materializer::new(db, raw_path, settings.clone())
        .with_hint_file(&hint_path)
        .materialize(&raw_schema, &files)
        .await
        .context("Materialization failed")?;

    print_report(&report, &files);
    println!("DONE");
    Ok(())
}

/// Snapshot the raw store, closing it before it is attached elsewhere
async fn read_raw_schema(path: &Path) -> Result<RawSchema> {
    let raw = RuntimeContext::open_store(path)?;
    let schema = extract_schema(raw.as_ref())
        .await
        .context("Failed to read raw schema")?;
    info!("Raw schema: {} tables", schema.len());
    Ok(schema)
}

fn print_report(report: &MaterializeReport, files: &[ModelFile]) {
    for model in &report.models {
        println!("[OK] {}", model);
    }
    let docs = files.iter().filter(|f| !f.is_sql()).count();
    if docs > 0 {
        println!("[INFO] {} documentation files kept on disk", docs);
    }
    for (table, column) in &report.coerced_columns {
        println!("[INFO] {}.{} -> DATE", table, column);
    }
    println!("[INFO] {} column aliases", report.aliases.len());
    for hint in &report.hints {
        println!("[INFO] {}", hint);
    }
}
