//! Strongly-typed column name wrapper.

use crate::newtype_string::define_newtype_string;

define_newtype_string! {
    /// Strongly-typed wrapper for column names.
    ///
    /// Prevents accidental mixing of column names with relation names or
    /// other string types. Holds the name exactly as declared; whether it is
    /// a bare identifier (as opposed to an expression) is checked during
    /// test normalization.
    pub struct ColumnName;
}

#[cfg(test)]
#[path = "column_name_test.rs"]
mod tests;
