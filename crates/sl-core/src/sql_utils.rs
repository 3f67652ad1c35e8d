//! SQL identifier and literal helpers
//!
//! Store tables are routinely named with non-ASCII labels, so every
//! identifier that reaches generated SQL goes through [`quote_ident`].

/// Quote a SQL identifier, doubling embedded double quotes.
///
/// # Examples
/// ```
/// use sl_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("orders"), r#""orders""#);
/// assert_eq!(quote_ident(r#"my"table"#), r#""my""table""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote a dotted name component-wise (`raw.main.t` -> `"raw"."main"."t"`).
pub fn quote_qualified(name: &str) -> String {
    name.split('.')
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(".")
}

/// Escape a value for use inside a single-quoted SQL string literal.
pub fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}

/// Single-quoted SQL string literal
pub fn string_literal(value: &str) -> String {
    format!("'{}'", escape_sql_string(value))
}

/// Tolerant date expression over any column type.
///
/// The leading `YYYY-MM-DD` of the column's text form is cast with
/// `TRY_CAST`, so timestamps with offsets keep their local calendar date
/// and unparseable values become NULL instead of raising.
///
/// # Examples
/// ```
/// use sl_core::sql_utils::tolerant_date;
/// assert_eq!(
///     tolerant_date("IVDATE"),
///     r#"TRY_CAST(LEFT(CAST("IVDATE" AS VARCHAR), 10) AS DATE)"#
/// );
/// ```
pub fn tolerant_date(column: &str) -> String {
    format!(
        "TRY_CAST(LEFT(CAST({} AS VARCHAR), 10) AS DATE)",
        quote_ident(column)
    )
}

/// Whether an identifier is a plain ASCII word that needs no quoting
pub fn is_plain_ident(ident: &str) -> bool {
    let mut chars = ident.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident_hebrew() {
        assert_eq!(quote_ident("תנועות_יומן"), "\"תנועות_יומן\"");
    }

    #[test]
    fn test_quote_qualified() {
        assert_eq!(quote_qualified("raw.main.stg_parts"), r#""raw"."main"."stg_parts""#);
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(string_literal("O'Brien"), "'O''Brien'");
        assert_eq!(escape_sql_string("a''b"), "a''''b");
    }

    #[test]
    fn test_tolerant_date_quotes_column() {
        assert_eq!(
            tolerant_date("תאריך"),
            "TRY_CAST(LEFT(CAST(\"תאריך\" AS VARCHAR), 10) AS DATE)"
        );
    }

    #[test]
    fn test_is_plain_ident() {
        assert!(is_plain_ident("stg_parts"));
        assert!(is_plain_ident("_x1"));
        assert!(!is_plain_ident("1abc"));
        assert!(!is_plain_ident("חשבונות"));
        assert!(!is_plain_ident("a b"));
        assert!(!is_plain_ident(""));
    }
}
