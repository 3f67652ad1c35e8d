use super::*;
use crate::parser::SqlParser;

fn refs(sql: &str) -> Vec<String> {
    let stmts = SqlParser::duckdb().parse(sql).unwrap();
    referenced_tables(&stmts).into_iter().collect()
}

#[test]
fn test_simple_select() {
    assert_eq!(refs("SELECT * FROM users"), vec!["users"]);
}

#[test]
fn test_join_and_subquery() {
    assert_eq!(
        refs(
            "SELECT * FROM (SELECT * FROM raw_data) AS sub \
             JOIN other_table ON sub.id = other_table.id"
        ),
        vec!["other_table", "raw_data"]
    );
}

#[test]
fn test_qualified_names_reduce_to_table() {
    assert_eq!(refs(r#"SELECT * FROM raw.main."orders""#), vec!["orders"]);
}

#[test]
fn test_quoted_non_ascii_table() {
    assert_eq!(
        refs(r#"SELECT "מספר" FROM "תנועות_יומן""#),
        vec!["תנועות_יומן"]
    );
}

#[test]
fn test_ctes_are_not_references() {
    let sql = r#"
        WITH staged AS (
            SELECT * FROM stg_orders
        )
        SELECT * FROM staged
        JOIN stg_customers ON staged.customer_id = stg_customers.id
    "#;
    assert_eq!(refs(sql), vec!["stg_customers", "stg_orders"]);

    let stmts = SqlParser::duckdb().parse(sql).unwrap();
    assert!(defined_ctes(&stmts).contains("staged"));
}

#[test]
fn test_create_target_is_not_a_reference() {
    assert_eq!(
        refs("CREATE OR REPLACE TABLE dim_agents AS SELECT AGENTNAME FROM stg_agents"),
        vec!["stg_agents"]
    );
}

#[test]
fn test_table_functions_are_skipped() {
    assert!(refs("SELECT * FROM range(10) t(n)").is_empty());
}

#[test]
fn test_union() {
    assert_eq!(
        refs("SELECT * FROM table1 UNION ALL SELECT * FROM table2"),
        vec!["table1", "table2"]
    );
}
