use super::*;

#[test]
fn test_strips_config_and_resolves_ref() {
    let sql = "{{ config(materialized='table') }}\n\nselect\n    CUSTNAME,\n    CUSTDES\nfrom {% raw %}{{ ref('stg_customers') }}{% endraw %}\n";
    assert_eq!(
        strip_templating(sql),
        "select\n    CUSTNAME,\n    CUSTDES\nfrom stg_customers"
    );
}

#[test]
fn test_config_is_case_insensitive() {
    assert_eq!(
        strip_templating("{{ CONFIG(materialized='view') }} select 1"),
        "select 1"
    );
}

#[test]
fn test_ref_with_double_quotes_and_non_ascii_target() {
    assert_eq!(
        strip_templating(r#"select * from {{ ref("תנועות_יומן") }}"#),
        r#"select * from "תנועות_יומן""#
    );
}

#[test]
fn test_unknown_blocks_are_removed() {
    let sql = "{% set x = 1 %}select {{ var('y') }} 1 as a {# note #}\n{%- if true -%}{%- endif -%}";
    assert_eq!(strip_templating(sql), "select  1 as a");
}

#[test]
fn test_multiline_block_removed() {
    let sql = "select 1\n{{\n  some_macro(\n 'a'\n )\n}}";
    assert_eq!(strip_templating(sql), "select 1");
}

#[test]
fn test_date_call_becomes_try_cast() {
    assert_eq!(
        strip_templating("select date(IVDATE) as d, CURRENT_DATE as today from t"),
        "select TRY_CAST(IVDATE AS DATE) as d, CURRENT_DATE as today from t"
    );
    assert_eq!(
        strip_templating("select DATE ( CURDATE ) from t"),
        "select TRY_CAST(CURDATE AS DATE) from t"
    );
}

#[test]
fn test_to_statement_wraps_select() {
    assert_eq!(
        to_statement("dim_agents", "{{ config(materialized='table') }}\nselect * from {{ ref('stg_agents') }}"),
        "CREATE OR REPLACE TABLE \"dim_agents\" AS\nselect * from stg_agents"
    );
}

#[test]
fn test_to_statement_keeps_create() {
    let sql = "  create or replace table fact_sales as select 1";
    assert_eq!(
        to_statement("fact_sales", sql),
        "create or replace table fact_sales as select 1"
    );
}

#[test]
fn test_is_create_statement() {
    assert!(is_create_statement("CREATE VIEW v AS SELECT 1"));
    assert!(!is_create_statement("SELECT 'CREATE ' AS x"));
    assert!(!is_create_statement("createx"));
}
