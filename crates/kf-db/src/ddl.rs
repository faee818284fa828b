//! Dialect DDL rendering
//!
//! Pure string builders for the three constraint statements. Most target
//! warehouses do not enforce these constraints; dialects that support it
//! attach a non-enforcing property so the optimizer can still use the
//! constraint (join elimination).

use kf_core::sql_utils::render_column_list;
use kf_core::{ColumnName, TableRef};

fn add_primary_key_sql(table: &TableRef, columns: &[ColumnName], quote: bool) -> String {
    format!(
        "ALTER TABLE {} ADD PRIMARY KEY ({})",
        table.render(quote),
        render_column_list(columns, quote)
    )
}

fn add_unique_key_sql(table: &TableRef, columns: &[ColumnName], quote: bool) -> String {
    format!(
        "ALTER TABLE {} ADD UNIQUE ({})",
        table.render(quote),
        render_column_list(columns, quote)
    )
}

fn add_foreign_key_sql(
    table: &TableRef,
    columns: &[ColumnName],
    referenced: &TableRef,
    referenced_columns: &[ColumnName],
    quote: bool,
) -> String {
    format!(
        "ALTER TABLE {} ADD FOREIGN KEY ({}) REFERENCES {} ({})",
        table.render(quote),
        render_column_list(columns, quote),
        referenced.render(quote),
        render_column_list(referenced_columns, quote)
    )
}

/// Renders constraint DDL for one dialect.
pub trait ConstraintDdl: Send + Sync {
    /// `ALTER TABLE ... ADD PRIMARY KEY (...)`
    fn add_primary_key(&self, table: &TableRef, columns: &[ColumnName], quote: bool) -> String {
        add_primary_key_sql(table, columns, quote)
    }

    /// `ALTER TABLE ... ADD UNIQUE (...)`
    fn add_unique_key(&self, table: &TableRef, columns: &[ColumnName], quote: bool) -> String {
        add_unique_key_sql(table, columns, quote)
    }

    /// `ALTER TABLE ... ADD FOREIGN KEY (...) REFERENCES ... (...)`
    fn add_foreign_key(
        &self,
        table: &TableRef,
        columns: &[ColumnName],
        referenced: &TableRef,
        referenced_columns: &[ColumnName],
        quote: bool,
    ) -> String {
        add_foreign_key_sql(table, columns, referenced, referenced_columns, quote)
    }

    /// Dialect identifier for logging
    fn dialect(&self) -> &'static str;
}

/// ANSI-flavored DDL, shared by dialects without constraint properties.
pub struct AnsiDdl;

impl ConstraintDdl for AnsiDdl {
    fn dialect(&self) -> &'static str {
        "ansi"
    }
}

/// Snowflake DDL.
///
/// Snowflake treats key constraints as informational; the RELY property
/// asserts data compliance so the optimizer may use the constraint anyway.
pub struct SnowflakeDdl;

impl ConstraintDdl for SnowflakeDdl {
    fn add_primary_key(&self, table: &TableRef, columns: &[ColumnName], quote: bool) -> String {
        format!("{} RELY", add_primary_key_sql(table, columns, quote))
    }

    fn add_unique_key(&self, table: &TableRef, columns: &[ColumnName], quote: bool) -> String {
        format!("{} RELY", add_unique_key_sql(table, columns, quote))
    }

    fn add_foreign_key(
        &self,
        table: &TableRef,
        columns: &[ColumnName],
        referenced: &TableRef,
        referenced_columns: &[ColumnName],
        quote: bool,
    ) -> String {
        format!(
            "{} RELY",
            add_foreign_key_sql(table, columns, referenced, referenced_columns, quote)
        )
    }

    fn dialect(&self) -> &'static str {
        "snowflake"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kf_core::Materialization;

    fn orders() -> TableRef {
        TableRef::new("orders", Materialization::Table).with_schema("analytics")
    }

    fn customers() -> TableRef {
        TableRef::new("customers", Materialization::Table).with_schema("analytics")
    }

    fn cols(names: &[&str]) -> Vec<ColumnName> {
        names.iter().map(|n| ColumnName::new(*n)).collect()
    }

    #[test]
    fn test_ansi_primary_key() {
        let sql = AnsiDdl.add_primary_key(&orders(), &cols(&["order_id"]), false);
        assert_eq!(sql, "ALTER TABLE analytics.orders ADD PRIMARY KEY (order_id)");
    }

    #[test]
    fn test_ansi_unique_key_composite() {
        let sql = AnsiDdl.add_unique_key(&orders(), &cols(&["order_id", "line_no"]), false);
        assert_eq!(
            sql,
            "ALTER TABLE analytics.orders ADD UNIQUE (order_id, line_no)"
        );
    }

    #[test]
    fn test_ansi_foreign_key() {
        let sql = AnsiDdl.add_foreign_key(
            &orders(),
            &cols(&["custkey"]),
            &customers(),
            &cols(&["custkey"]),
            false,
        );
        assert_eq!(
            sql,
            "ALTER TABLE analytics.orders ADD FOREIGN KEY (custkey) REFERENCES analytics.customers (custkey)"
        );
    }

    #[test]
    fn test_quoting() {
        let sql = AnsiDdl.add_primary_key(&orders(), &cols(&["order_id"]), true);
        assert_eq!(
            sql,
            r#"ALTER TABLE "analytics"."orders" ADD PRIMARY KEY ("order_id")"#
        );
    }

    #[test]
    fn test_snowflake_attaches_rely() {
        let ddl = SnowflakeDdl;
        assert!(ddl
            .add_primary_key(&orders(), &cols(&["order_id"]), false)
            .ends_with("ADD PRIMARY KEY (order_id) RELY"));
        assert!(ddl
            .add_unique_key(&orders(), &cols(&["order_id"]), false)
            .ends_with("ADD UNIQUE (order_id) RELY"));
        assert!(ddl
            .add_foreign_key(
                &orders(),
                &cols(&["custkey"]),
                &customers(),
                &cols(&["custkey"]),
                false
            )
            .ends_with("REFERENCES analytics.customers (custkey) RELY"));
    }

    #[test]
    fn test_dialect_names() {
        assert_eq!(AnsiDdl.dialect(), "ansi");
        assert_eq!(SnowflakeDdl.dialect(), "snowflake");
    }
}
