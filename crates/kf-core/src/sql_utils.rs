//! SQL identifier utilities
//!
//! Provides safe quoting for identifiers in generated DDL and the
//! bare-identifier check used to reject column expressions during test
//! normalization.

use crate::column_name::ColumnName;

/// Quote a SQL identifier to prevent injection.
///
/// Wraps the identifier in double quotes and escapes any embedded double
/// quotes by doubling them, following the SQL standard.
///
/// # Examples
/// ```
/// use kf_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("orders"), r#""orders""#);
/// assert_eq!(quote_ident(r#"my"table"#), r#""my""table""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Render an identifier, quoting it only when the run-level flag asks for it.
pub fn render_ident(ident: &str, quote: bool) -> String {
    if quote {
        quote_ident(ident)
    } else {
        ident.to_string()
    }
}

/// Render a comma-separated column list for use inside `(...)` in DDL.
pub fn render_column_list(columns: &[ColumnName], quote: bool) -> String {
    columns
        .iter()
        .map(|c| render_ident(c.as_str(), quote))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Escape a SQL string literal value by doubling single quotes.
///
/// This is for use inside single-quoted SQL string literals, not identifiers.
pub fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}

/// Check whether a column entry is a bare identifier.
///
/// Constraint synthesis only accepts plain column names; anything else
/// (function calls, casts, arithmetic) is an expression and the declaring
/// test is dropped during normalization.
pub fn is_bare_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
