use super::*;
use std::io::Write;
use tempfile::TempDir;

const SAMPLE: &str = r#"
name: best_dwh
remote:
  url: https://erp.example.com/odata/Priority/tabula.ini/demo
  retry_delay_secs: 1
stores:
  raw: data/raw.duckdb
  derived: data/derived.duckdb
entities:
  - entity: FNCLOG
    table: תנועות_יומן
    time_field: BALDATE
  - entity: CUSTOMERS
    table: stg_customers
    translate: false
    select: [CUSTNAME, CUSTDES, AGENTNAME]
  - entity: LOGPART
    table: stg_parts
    translate: false
    split:
      field: FAMILYNAME
      boundary: "05"
materialize:
  fact_table: dim_salesinvoiceitems
"#;

#[test]
fn test_parse_sample() {
    let config = Config::from_yaml(SAMPLE).unwrap();
    assert_eq!(config.name, "best_dwh");
    assert_eq!(config.remote.timezone_offset, "+02:00");
    assert_eq!(config.remote.page_size, 100_000);
    assert_eq!(config.remote.retries, 4);
    assert_eq!(config.remote.retry_delay(), Duration::from_secs(1));
    assert_eq!(config.remote.timeout(), Duration::from_secs(180));
    assert_eq!(config.entities.len(), 3);
    assert_eq!(config.stores.raw, "data/raw.duckdb");
    assert_eq!(config.materialize.dimension_prefix, "dim_");
    assert_eq!(config.materialize.hint_file, "star_hint.txt");
    assert_eq!(
        config.materialize.fact_table.as_deref(),
        Some("dim_salesinvoiceitems")
    );
}

#[test]
fn test_partitioned_and_snapshot_split() {
    let config = Config::from_yaml(SAMPLE).unwrap();
    let partitioned: Vec<_> = config.partitioned_entities().map(|e| e.entity.as_str()).collect();
    let snapshots: Vec<_> = config.snapshot_entities().map(|e| e.entity.as_str()).collect();
    assert_eq!(partitioned, vec!["FNCLOG"]);
    assert_eq!(snapshots, vec!["CUSTOMERS", "LOGPART"]);
}

#[test]
fn test_select_entities() {
    let config = Config::from_yaml(SAMPLE).unwrap();
    assert_eq!(config.select_entities(&[]).unwrap().len(), 3);

    let picked = config.select_entities(&["logpart".to_string()]).unwrap();
    assert_eq!(picked.len(), 1);
    assert_eq!(picked[0].table, "stg_parts");

    let err = config.select_entities(&["NOPE".to_string()]).unwrap_err();
    assert!(matches!(err, CoreError::UnknownEntity { .. }));
}

#[test]
fn test_rejects_unknown_fields() {
    let yaml = "name: x\nremote:\n  url: https://a\nbogus: 1\n";
    assert!(matches!(
        Config::from_yaml(yaml),
        Err(CoreError::ConfigParseError { .. })
    ));
}

#[test]
fn test_rejects_non_http_url() {
    let yaml = "name: x\nremote:\n  url: ftp://a\n";
    assert!(matches!(
        Config::from_yaml(yaml),
        Err(CoreError::ConfigInvalid { .. })
    ));
}

#[test]
fn test_rejects_duplicate_tables() {
    let yaml = r#"
name: x
remote:
  url: https://a
entities:
  - { entity: A, table: t }
  - { entity: B, table: t }
"#;
    assert!(matches!(
        Config::from_yaml(yaml),
        Err(CoreError::ConfigInvalid { .. })
    ));
}

#[test]
fn test_rejects_split_with_time_field() {
    let yaml = r#"
name: x
remote:
  url: https://a
entities:
  - entity: A
    table: t
    time_field: CURDATE
    split: { field: F, boundary: "1" }
"#;
    assert!(Config::from_yaml(yaml).is_err());
}

#[test]
fn test_credentials() {
    let config = Config::from_yaml(SAMPLE).unwrap();
    assert!(matches!(
        config.credentials(),
        Err(CoreError::MissingCredentials { .. })
    ));

    let config = config.with_credentials(Credentials {
        username: "api".into(),
        password: "secret".into(),
    });
    assert_eq!(config.credentials().unwrap().username, "api");
    assert!(!format!("{:?}", config.credentials().unwrap()).contains("secret"));
}

#[test]
fn test_load_from_dir() {
    let dir = TempDir::new().unwrap();
    let mut file = std::fs::File::create(dir.path().join("sluice.yml")).unwrap();
    file.write_all(SAMPLE.as_bytes()).unwrap();

    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.name, "best_dwh");
}

#[test]
fn test_load_missing() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        Config::load_from_dir(dir.path()),
        Err(CoreError::ConfigNotFound { .. })
    ));
}

#[test]
fn test_resolve_path() {
    let root = Path::new("/srv/project");
    assert_eq!(
        Config::resolve_path(root, "raw.duckdb"),
        PathBuf::from("/srv/project/raw.duckdb")
    );
    assert_eq!(
        Config::resolve_path(root, "/abs/raw.duckdb"),
        PathBuf::from("/abs/raw.duckdb")
    );
    assert_eq!(Config::resolve_path(root, ":memory:"), PathBuf::from(":memory:"));
}

#[test]
fn test_demo_project_config_loads() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/sluice.yml");
    let config = Config::load(&path).unwrap();
    assert_eq!(config.partitioned_entities().count(), 2);
    assert_eq!(config.snapshot_entities().count(), 3);
    assert_eq!(
        config.materialize.fact_table.as_deref(),
        Some("dim_salesinvoiceitems")
    );
}
