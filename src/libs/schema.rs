use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Introspected metadata for a single table.
///
/// Columns keep the order the database engine reported them in, lower-cased.
/// `primary_key` names exactly one column when present; composite primary
/// keys are rejected during introspection and never reach this type.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: None,
        }
    }
}

/// An in-memory schema: tables keyed by name, in driver-reported order.
///
/// The loader mutates this in place; callers own it for as long as they
/// need it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    pub tables: IndexMap<String, TableSchema>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch or create the entry for `table`.
    pub fn table_mut(&mut self, table: &str) -> &mut TableSchema {
        self.tables
            .entry(table.to_string())
            .or_insert_with(|| TableSchema::new(table))
    }

    pub fn get_table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }

    pub fn iter_tables(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.values()
    }
}
