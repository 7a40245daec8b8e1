use compact_str::{format_compact, CompactString};
use indexmap::IndexSet;
use serde::Serialize;

/// Tables and `table.column` pairs found in one statement, in discovery
/// order and without duplicates.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct References {
    tables: IndexSet<CompactString>,
    table_columns: IndexSet<CompactString>,
}

impl References {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&mut self, table: &str) {
        if !self.tables.contains(table) {
            self.tables.insert(CompactString::from(table));
        }
    }

    /// Record `table.column`, and `table` itself.
    pub fn add_table_column(&mut self, table: &str, column: &str) {
        self.add_table(table);
        self.table_columns.insert(format_compact!("{table}.{column}"));
    }

    /// Record a column whose table could not be determined.
    pub fn add_bare_column(&mut self, column: &str) {
        if !self.table_columns.contains(column) {
            self.table_columns.insert(CompactString::from(column));
        }
    }

    pub fn tables(&self) -> impl Iterator<Item = &str> + '_ {
        self.tables.iter().map(CompactString::as_str)
    }

    pub fn table_columns(&self) -> impl Iterator<Item = &str> + '_ {
        self.table_columns.iter().map(CompactString::as_str)
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn table_column_count(&self) -> usize {
        self.table_columns.len()
    }

    pub fn contains_table(&self, table: &str) -> bool {
        self.tables.contains(table)
    }

    pub fn contains_table_column(&self, table_column: &str) -> bool {
        self.table_columns.contains(table_column)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.table_columns.is_empty()
    }
}
