use compact_str::CompactString;

/// A table named in FROM and the alias it was given, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasBinding {
    pub table_name: CompactString,
    /// Empty when the table was listed without an alias.
    pub alias_name: CompactString,
}

/// Table/alias bindings for one statement.
///
/// Bindings are not scoped to subqueries: an alias declared inside a
/// parenthesized SELECT stays resolvable until the statement ends.
#[derive(Debug, Default, Clone)]
pub struct AliasTable {
    bindings: Vec<AliasBinding>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a binding. Duplicates are kept; lookups see the first one.
    pub fn register(&mut self, table_name: &str, alias_name: &str) {
        self.bindings.push(AliasBinding {
            table_name: CompactString::from(table_name),
            alias_name: CompactString::from(alias_name),
        });
    }

    /// Table name behind `alias_name`.
    ///
    /// An empty alias means the most recently registered table. A name that
    /// matches no alias is assumed to be a table name already.
    pub fn resolve<'s>(&'s self, alias_name: &'s str) -> &'s str {
        if alias_name.is_empty() {
            return self
                .bindings
                .last()
                .map_or(alias_name, |b| b.table_name.as_str());
        }
        self.bindings
            .iter()
            .find(|b| b.alias_name == alias_name)
            .map_or(alias_name, |b| b.table_name.as_str())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
