//! Canonical column-name sets observed on a row shape.

use std::collections::{BTreeMap, BTreeSet};

use crate::row::{Row, names_of};

const SEPARATORS: &[char] = &['_', ' ', '-'];

/// Folds a column or field name into the comparison domain.
pub fn canonical_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Removes word separators from an already canonical name (`USER_ID` -> `USERID`).
pub fn strip_separators(canonical: &str) -> String {
    canonical.chars().filter(|ch| !SEPARATORS.contains(ch)).collect()
}

/// Upper-cased column names of `row`.
pub fn column_names(row: &dyn Row) -> BTreeSet<String> {
    column_names_with(row, canonical_name)
}

/// Column names of `row`, each passed through `fold`.
pub fn column_names_with<F>(row: &dyn Row, fold: F) -> BTreeSet<String>
where
    F: Fn(&str) -> String,
{
    names_of(row).map(fold).collect()
}

/// The column names of one row shape, keyed by canonical name.
///
/// Each canonical name remembers the spelling observed on the row so that the
/// resolved mapping reads columns by their real names. When two columns fold to
/// the same canonical name the later one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet {
    columns: BTreeMap<String, String>,
}

impl ColumnSet {
    pub fn from_row(row: &dyn Row) -> Self {
        ColumnSet::from_names(names_of(row))
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let columns = names
            .into_iter()
            .map(|name| {
                let name = name.as_ref();
                (canonical_name(name), name.to_string())
            })
            .collect();
        ColumnSet { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(&canonical_name(name))
    }

    /// Original spelling for a canonical name.
    pub fn original(&self, canonical: &str) -> Option<&str> {
        self.columns.get(canonical).map(String::as_str)
    }

    /// Canonical names paired with their original spelling, in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(|(canonical, original)| (canonical.as_str(), original.as_str()))
    }

    pub fn canonical_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Whether both sets hold the same canonical names, ignoring spelling.
    pub fn same_columns(&self, other: &ColumnSet) -> bool {
        self.columns.len() == other.columns.len() && self.columns.keys().eq(other.columns.keys())
    }
}
