//! Template stripping for generated model definitions
//!
//! Model files use dbt-style templating. Only three constructs carry
//! meaning here: `{{ config(...) }}` is dropped, `{{ ref('t') }}` becomes
//! the table name, and `DATE(col)` becomes a tolerant cast. Every other
//! `{{ ... }}`, `{% ... %}` and `{# ... #}` block is removed.

use regex::Regex;
use sl_core::sql_utils::{is_plain_ident, quote_ident};
use std::sync::OnceLock;

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("valid regex"))
}

fn config_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)\{\{\s*config\([^}]+\)\s*\}\}")
}

fn ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r#"\{\{\s*ref\(\s*['"]([^'"]+)['"]\s*\)\s*\}\}"#)
}

fn block_res() -> [&'static Regex; 3] {
    static EXPR: OnceLock<Regex> = OnceLock::new();
    static STMT: OnceLock<Regex> = OnceLock::new();
    static COMMENT: OnceLock<Regex> = OnceLock::new();
    [
        regex(&EXPR, r"(?s)\{\{.*?\}\}"),
        regex(&STMT, r"(?s)\{%.*?%\}"),
        regex(&COMMENT, r"(?s)\{#.*?#\}"),
    ]
}

fn date_call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)\bDATE\s*\(\s*([A-Za-z0-9_]+)\s*\)")
}

fn create_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)^\s*CREATE\s")
}

/// Reduce templated model SQL to plain SQL
pub fn strip_templating(sql: &str) -> String {
    let sql = config_re().replace_all(sql, "");
    let sql = ref_re().replace_all(&sql, |caps: &regex::Captures| {
        let name = &caps[1];
        if is_plain_ident(name) {
            name.to_string()
        } else {
            quote_ident(name)
        }
    });
    let mut sql = sql.into_owned();
    for re in block_res() {
        sql = re.replace_all(&sql, "").into_owned();
    }
    let sql = date_call_re().replace_all(&sql, "TRY_CAST(${1} AS DATE)");
    sql.trim().to_string()
}

/// Whether stripped SQL already creates its own relation
pub fn is_create_statement(sql: &str) -> bool {
    create_re().is_match(sql)
}

/// Executable statement for a model: stripped, and wrapped in
/// `CREATE OR REPLACE TABLE "<model>" AS` unless it already creates something
pub fn to_statement(model: &str, sql: &str) -> String {
    let plain = strip_templating(sql);
    if is_create_statement(&plain) {
        plain
    } else {
        format!("CREATE OR REPLACE TABLE {} AS\n{}", quote_ident(model), plain)
    }
}

#[cfg(test)]
#[path = "template_test.rs"]
mod tests;
