//! Caller-supplied expression table.

use std::collections::HashMap;

/// Named values referenced from patterns via `@name`, `@+name` and `@-name`.
///
/// A value is a literal-or-list string (`|`-separated alternatives) for plain
/// references, or a character set for the `@+`/`@-` forms. The engine reads
/// the table during compilation and never mutates it.
#[derive(Debug, Clone, Default)]
pub struct ExpressionTable {
    exprs: HashMap<String, String>,
}

impl ExpressionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an expression by name.
    pub fn insert(&mut self, name: &str, value: &str) {
        self.exprs.insert(name.to_string(), value.to_string());
    }

    /// Look up an expression's value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.exprs.get(name).map(|s| s.as_str())
    }

    /// Test whether an expression exists.
    pub fn contains(&self, name: &str) -> bool {
        self.exprs.contains_key(name)
    }

    /// Return all expression names in alphabetical order.
    pub fn sorted_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.exprs.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }
}
