use super::*;

#[test]
fn test_column_name_creation() {
    let name = ColumnName::new("order_id");
    assert_eq!(name.as_str(), "order_id");
}

#[test]
fn test_column_name_try_new_empty() {
    assert!(ColumnName::try_new("").is_none());
    assert!(ColumnName::try_new("id").is_some());
}

#[test]
fn test_column_name_display() {
    let name = ColumnName::new("order_id");
    assert_eq!(format!("{}", name), "order_id");
}

#[test]
fn test_column_name_deref() {
    let name = ColumnName::new("order_id");
    assert!(name.ends_with("_id"));
}

#[test]
fn test_column_name_equality() {
    let name = ColumnName::new("order_id");
    assert_eq!(name, "order_id");
    assert_eq!(name, "order_id".to_string());
}

#[test]
fn test_column_name_ord() {
    let a = ColumnName::new("a");
    let b = ColumnName::new("b");
    assert!(a < b);
}

#[test]
fn test_column_name_serde_roundtrip() {
    let name = ColumnName::new("order_id");
    let json = serde_json::to_string(&name).unwrap();
    assert_eq!(json, r#""order_id""#);
    let deserialized: ColumnName = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized, name);
}

#[test]
fn test_column_name_serde_rejects_empty() {
    let result: Result<ColumnName, _> = serde_json::from_str(r#""""#);
    assert!(result.is_err());
}
