use std::collections::HashSet;

use crate::error::TableError;
use crate::models::Table;

/// Symbols whose rows are dropped from the positions table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet(HashSet<String>);

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.0.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

pub struct ExclusionFilter<'a> {
    key_column: &'a str,
    exclusions: &'a ExclusionSet,
}

impl<'a> ExclusionFilter<'a> {
    pub fn new(key_column: &'a str, exclusions: &'a ExclusionSet) -> Self {
        Self {
            key_column,
            exclusions,
        }
    }

    /// Removes every row whose key cell is in the exclusion set and returns how many went.
    ///
    /// Fails with [`TableError::ColumnNotFound`] before touching the table when the key
    /// column is missing.
    pub fn apply(&self, table: &mut Table) -> Result<usize, TableError> {
        let key = table
            .header()
            .resolve(self.key_column)
            .ok_or_else(|| TableError::ColumnNotFound(self.key_column.to_string()))?;

        let before = table.row_count();
        let exclusions = self.exclusions;

        table
            .rows_mut()
            .retain(|row| !row.get(key).is_some_and(|cell| exclusions.contains(&cell.as_key())));

        let removed = before - table.row_count();
        tracing::debug!(
            "excluded {} of {} rows on column '{}'",
            removed,
            before,
            self.key_column
        );

        Ok(removed)
    }
}
