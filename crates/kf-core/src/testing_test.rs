use super::*;
use crate::registry::StaticRegistry;
use crate::relation::Materialization;

fn registry() -> StaticRegistry {
    let mut registry = StaticRegistry::new();
    registry.insert(
        "orders",
        TableRef::new("orders", Materialization::Table).with_schema("analytics"),
    );
    registry.insert(
        "customers",
        TableRef::new("customers", Materialization::Table).with_schema("analytics"),
    );
    registry.insert_with_columns(
        "payments",
        TableRef::new("payments", Materialization::Table).with_schema("analytics"),
        vec![ColumnName::new("payment_id"), ColumnName::new("order_id")],
    );
    registry
}

fn declaration(kind: TestKind, relation: &str, columns: ColumnSpec) -> TestDeclaration {
    TestDeclaration {
        kind,
        relation: relation.to_string(),
        columns,
        references: None,
        referenced_columns: None,
        status: TestStatus::Pass,
        site: DeclarationSite::Inline,
    }
}

#[test]
fn test_parse_declarations_shorthand_and_list() {
    let yaml = r#"
- kind: primary_key
  relation: orders
  columns: order_id
- kind: unique_key
  relation: orders
  columns: [order_id, line_no]
"#;
    let decls = parse_declarations(yaml).unwrap();
    assert_eq!(decls.len(), 2);
    assert_eq!(decls[0].columns, ColumnSpec::Single(ColumnName::new("order_id")));
    assert_eq!(
        decls[1].columns,
        ColumnSpec::List(vec![ColumnName::new("order_id"), ColumnName::new("line_no")])
    );
}

#[test]
fn test_parse_declarations_legacy_aliases() {
    let yaml = r#"
- kind: unique_combination_of_columns
  relation: orders
  combination_of_columns: [order_id, line_no]
- kind: relationships
  model: orders
  column: custkey
  to: customers
  field: custkey
"#;
    let decls = parse_declarations(yaml).unwrap();
    assert_eq!(decls[0].kind, TestKind::UniqueCombination);
    assert_eq!(decls[1].kind, TestKind::Relationship);
    assert_eq!(decls[1].references.as_deref(), Some("customers"));
}

#[test]
fn test_parse_declarations_bad_yaml() {
    let result = parse_declarations("- kind: [nonsense");
    assert!(matches!(result, Err(CoreError::YamlParse(_))));
}

#[test]
fn test_normalize_rewrites_shorthand_to_list() {
    let decls = vec![declaration(
        TestKind::PrimaryKey,
        "orders",
        ColumnSpec::Single(ColumnName::new("order_id")),
    )];
    let records = normalize(&decls, &registry());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].columns, vec![ColumnName::new("order_id")]);
    assert_eq!(records[0].table.qualified_name(), "analytics.orders");
}

#[test]
fn test_normalize_drops_unknown_relation() {
    let decls = vec![declaration(
        TestKind::Unique,
        "missing_model",
        ColumnSpec::Single(ColumnName::new("id")),
    )];
    assert!(normalize(&decls, &registry()).is_empty());
}

#[test]
fn test_normalize_drops_expression_columns() {
    let decls = vec![declaration(
        TestKind::UniqueKey,
        "orders",
        ColumnSpec::Single(ColumnName::new("lower(order_id)")),
    )];
    assert!(normalize(&decls, &registry()).is_empty());
}

#[test]
fn test_normalize_drops_empty_column_list() {
    let decls = vec![declaration(TestKind::UniqueKey, "orders", ColumnSpec::List(vec![]))];
    assert!(normalize(&decls, &registry()).is_empty());
}

#[test]
fn test_normalize_validates_declared_columns() {
    // payments declares its column list; a test on an undeclared column drops
    let decls = vec![
        declaration(
            TestKind::UniqueKey,
            "payments",
            ColumnSpec::Single(ColumnName::new("payment_id")),
        ),
        declaration(
            TestKind::UniqueKey,
            "payments",
            ColumnSpec::Single(ColumnName::new("no_such_column")),
        ),
    ];
    let records = normalize(&decls, &registry());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].columns, vec![ColumnName::new("payment_id")]);
}

#[test]
fn test_normalize_foreign_key() {
    let mut decl = declaration(
        TestKind::ForeignKey,
        "orders",
        ColumnSpec::List(vec![ColumnName::new("custkey")]),
    );
    decl.references = Some("customers".to_string());
    decl.referenced_columns = Some(ColumnSpec::Single(ColumnName::new("custkey")));

    let records = normalize(&[decl], &registry());
    assert_eq!(records.len(), 1);
    let referenced = records[0].references.as_ref().unwrap();
    assert_eq!(referenced.table.qualified_name(), "analytics.customers");
    assert_eq!(referenced.columns, vec![ColumnName::new("custkey")]);
}

#[test]
fn test_normalize_relationship_defaults_referenced_columns() {
    let mut decl = declaration(
        TestKind::Relationship,
        "orders",
        ColumnSpec::Single(ColumnName::new("custkey")),
    );
    decl.references = Some("customers".to_string());

    let records = normalize(&[decl], &registry());
    assert_eq!(records.len(), 1);
    let referenced = records[0].references.as_ref().unwrap();
    assert_eq!(referenced.columns, vec![ColumnName::new("custkey")]);
}

#[test]
fn test_normalize_drops_mismatched_fk_lengths() {
    let mut decl = declaration(
        TestKind::ForeignKey,
        "orders",
        ColumnSpec::List(vec![ColumnName::new("custkey"), ColumnName::new("region")]),
    );
    decl.references = Some("customers".to_string());
    decl.referenced_columns = Some(ColumnSpec::Single(ColumnName::new("custkey")));

    assert!(normalize(&[decl], &registry()).is_empty());
}

#[test]
fn test_normalize_drops_fk_without_target() {
    let decl = declaration(
        TestKind::ForeignKey,
        "orders",
        ColumnSpec::Single(ColumnName::new("custkey")),
    );
    assert!(normalize(&[decl], &registry()).is_empty());
}

#[test]
fn test_kind_mapping() {
    assert_eq!(TestKind::PrimaryKey.constraint_kind(), ConstraintKind::PrimaryKey);
    assert_eq!(TestKind::Unique.constraint_kind(), ConstraintKind::Unique);
    assert_eq!(TestKind::UniqueCombination.constraint_kind(), ConstraintKind::Unique);
    assert_eq!(TestKind::UniqueKey.constraint_kind(), ConstraintKind::Unique);
    assert_eq!(TestKind::Relationship.constraint_kind(), ConstraintKind::ForeignKey);
    assert!(TestKind::Relationship.is_legacy());
    assert!(!TestKind::ForeignKey.is_legacy());
}

#[test]
fn test_status_default_is_pass() {
    let yaml = "- kind: unique\n  relation: orders\n  column: order_id\n";
    let decls = parse_declarations(yaml).unwrap();
    assert_eq!(decls[0].status, TestStatus::Pass);
    assert!(decls[0].status.passed());
}
