use super::*;
use sl_core::ColumnInfo;

fn raw_schema() -> RawSchema {
    RawSchema::new(vec![
        TableSchema::new(
            "stg_agents",
            vec![
                ColumnInfo::new("AGENTNAME", "VARCHAR"),
                ColumnInfo::new("AGENTDES", "VARCHAR"),
                ColumnInfo::new("שם סוכן", "VARCHAR"),
            ],
        ),
        TableSchema::new("תנועות_יומן", vec![ColumnInfo::new("FNCTRANS", "BIGINT")]),
        TableSchema::new("stg_", vec![ColumnInfo::new("X", "VARCHAR")]),
    ])
}

#[test]
fn test_model_file_paths() {
    let file = ModelFile::new("models/dim_agents.sql", "select 1");
    assert_eq!(file.relative_path(), "dim_agents.sql");
    assert_eq!(file.stem(), Some("dim_agents"));
    assert!(file.is_sql());

    let file = ModelFile::new("/models/sub/metrics.yml", "");
    assert_eq!(file.relative_path(), "sub/metrics.yml");
    assert_eq!(file.stem(), Some("metrics"));
    assert!(!file.is_sql());
}

#[tokio::test]
async fn test_staging_proposer_builds_model_and_doc() {
    let proposer = StagingProposer::new("stg_", "dim_");
    let files = proposer.propose_models(&raw_schema()).await.unwrap();

    let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["dim_agents.sql", "dim_agents.yml"]);

    assert_eq!(
        files[0].content,
        "{{ config(materialized='table') }}\n\nselect\n    AGENTNAME,\n    AGENTDES,\n    \"שם סוכן\"\nfrom {{ ref('stg_agents') }}\n"
    );

    let doc: serde_yaml::Value = serde_yaml::from_str(&files[1].content).unwrap();
    assert_eq!(doc["version"], serde_yaml::Value::from(2));
    assert_eq!(doc["models"][0]["name"].as_str(), Some("dim_agents"));
    assert_eq!(doc["models"][0]["columns"][1]["name"].as_str(), Some("AGENTDES"));
    assert_eq!(doc["models"][0]["columns"][1]["description"].as_str(), Some(""));
}

#[tokio::test]
async fn test_staging_model_strips_to_runnable_select() {
    let files = StagingProposer::new("stg_", "dim_")
        .propose_models(&raw_schema())
        .await
        .unwrap();
    assert_eq!(
        crate::template::to_statement("dim_agents", &files[0].content),
        "CREATE OR REPLACE TABLE \"dim_agents\" AS\nselect\n    AGENTNAME,\n    AGENTDES,\n    \"שם סוכן\"\nfrom stg_agents"
    );
}

#[tokio::test]
async fn test_directory_proposer_reads_sorted_model_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("b_model.sql"), "select 2").unwrap();
    std::fs::write(dir.path().join("a_model.sql"), "select 1").unwrap();
    std::fs::write(dir.path().join("a_model.yml"), "version: 2\n").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
    std::fs::create_dir(dir.path().join("nested.sql")).unwrap();

    let files = DirectoryProposer::new(dir.path())
        .propose_models(&RawSchema::default())
        .await
        .unwrap();
    let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a_model.sql", "a_model.yml", "b_model.sql"]);
    assert_eq!(files[0].content, "select 1");
}

#[tokio::test]
async fn test_directory_proposer_missing_dir() {
    let dir = tempfile::tempdir().unwrap();
    let err = DirectoryProposer::new(dir.path().join("absent"))
        .propose_models(&RawSchema::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::Io { .. }));
}

#[test]
fn test_parse_generator_output_bare_json() {
    let files = parse_generator_output(
        r#"{"files":[{"name":"models/dim_x.sql","content":"select 1"},{"name":"models/metrics.yml","content":"metrics: [a]"}]}"#,
    )
    .unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[1].content, "metrics: [a]");
}

#[test]
fn test_parse_generator_output_fenced_adds_metrics() {
    let stdout = "Here you go:\n```json\n{\"files\": [{\"name\": \"dim_x.sql\", \"content\": \"select 1\"}]}\n```\nDone.";
    let files = parse_generator_output(stdout).unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[1], ModelFile::new("models/metrics.yml", "metrics: []\n"));
}

#[test]
fn test_parse_generator_output_garbage() {
    assert!(matches!(
        parse_generator_output("no json here"),
        Err(ModelError::Generator(_))
    ));
}

#[test]
fn test_command_proposer_rejects_empty_command() {
    assert!(matches!(
        CommandProposer::new("   "),
        Err(ModelError::Generator(_))
    ));
}

#[cfg(unix)]
#[tokio::test]
async fn test_command_proposer_round_trip_through_script() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("gen.sh");
    let seen = dir.path().join("seen.json");
    std::fs::write(
        &script,
        format!(
            "cat > '{}'\nprintf '%s' '{{\"files\":[{{\"name\":\"models/dim_agents.sql\",\"content\":\"select 1\"}}]}}'\n",
            seen.display()
        ),
    )
    .unwrap();

    let proposer = CommandProposer::new(&format!("sh {}", script.display())).unwrap();
    let files = proposer.propose_models(&raw_schema()).await.unwrap();
    assert_eq!(files[0].name, "models/dim_agents.sql");
    assert_eq!(files.len(), 2);

    let input: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&seen).unwrap()).unwrap();
    assert_eq!(input["stg_agents"][0]["name"], "AGENTNAME");
}

#[cfg(unix)]
#[tokio::test]
async fn test_command_proposer_failing_command() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("fail.sh");
    std::fs::write(&script, "cat > /dev/null\necho boom >&2\nexit 3\n").unwrap();

    let err = CommandProposer::new(&format!("sh {}", script.display()))
        .unwrap()
        .propose_models(&raw_schema())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("boom"), "{err}");
}

#[tokio::test]
async fn test_command_proposer_missing_program() {
    let err = CommandProposer::new("sluice-no-such-generator --flag")
        .unwrap()
        .propose_models(&RawSchema::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::Generator(_)));
}
