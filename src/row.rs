//! Row abstraction consumed by the mapper, plus an owned row type and CSV adapter.
//!
//! The mapper only needs two capabilities from a row: enumerate its column names
//! by position and fetch a raw [`Value`] by column name. Rows whose source has
//! no column names (a headerless CSV file, a positional cursor) report
//! [`Row::has_named_columns`] as `false` and cannot be materialized.

use std::{collections::HashMap, sync::Arc};

use csv::StringRecord;
use log::debug;

use crate::{
    columns::canonical_name,
    data::{Value, text_cell},
};

pub trait Row {
    fn column_count(&self) -> usize;

    fn column_name(&self, index: usize) -> Option<&str>;

    fn value_at(&self, index: usize) -> Option<&Value>;

    /// Whether values can be looked up by column name.
    fn has_named_columns(&self) -> bool {
        true
    }

    /// Position of `column`, matched exactly first and then case-insensitively.
    fn column_index(&self, column: &str) -> Option<usize> {
        let count = self.column_count();
        (0..count)
            .find(|&idx| self.column_name(idx) == Some(column))
            .or_else(|| {
                let wanted = canonical_name(column);
                (0..count).find(|&idx| {
                    self.column_name(idx)
                        .is_some_and(|name| canonical_name(name) == wanted)
                })
            })
    }

    fn get(&self, column: &str) -> Option<&Value> {
        if !self.has_named_columns() {
            return None;
        }
        self.column_index(column).and_then(|idx| self.value_at(idx))
    }

    fn column_names(&self) -> ColumnNames<'_, Self>
    where
        Self: Sized,
    {
        ColumnNames { row: self, next: 0 }
    }
}

/// Iterator over a row's column names in positional order.
pub struct ColumnNames<'a, R: ?Sized> {
    row: &'a R,
    next: usize,
}

impl<'a, R: Row + ?Sized> Iterator for ColumnNames<'a, R> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.row.column_count() {
            let idx = self.next;
            self.next += 1;
            if let Some(name) = self.row.column_name(idx) {
                return Some(name);
            }
        }
        None
    }
}

/// Iterates the names of any row, including trait objects.
pub fn names_of(row: &dyn Row) -> ColumnNames<'_, dyn Row + '_> {
    ColumnNames { row, next: 0 }
}

/// Column names shared by every row of one result set.
#[derive(Debug, Clone)]
pub struct Header {
    names: Vec<String>,
    positions: HashMap<String, usize>,
    folded: HashMap<String, usize>,
    named: bool,
}

impl Header {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut positions = HashMap::with_capacity(names.len());
        let mut folded = HashMap::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            positions.entry(name.clone()).or_insert(idx);
            folded.insert(canonical_name(name), idx);
        }
        Header {
            names,
            positions,
            folded,
            named: true,
        }
    }

    pub fn from_record(record: &StringRecord) -> Self {
        Header::new(record.iter())
    }

    /// Header for a source without column names, such as a headerless CSV file.
    pub fn positional(count: usize) -> Self {
        let mut header = Header::new((1..=count).map(|idx| format!("field_{idx}")));
        header.named = false;
        header
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_named(&self) -> bool {
        self.named
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions
            .get(column)
            .or_else(|| self.folded.get(&canonical_name(column)))
            .copied()
    }
}

/// Owned row backed by a shared [`Header`].
#[derive(Debug, Clone)]
pub struct ValueRow {
    header: Arc<Header>,
    values: Vec<Value>,
}

impl ValueRow {
    /// Builds a row sized to `header`: missing trailing values read as null and
    /// cells beyond the last named column are dropped.
    pub fn new(header: Arc<Header>, mut values: Vec<Value>) -> Self {
        if values.len() > header.len() {
            debug!(
                "Dropping {} cell(s) beyond the {} named column(s)",
                values.len() - header.len(),
                header.len()
            );
        }
        values.resize(header.len(), Value::Null);
        ValueRow { header, values }
    }

    pub fn from_pairs<I, S, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, V)>,
        S: Into<String>,
        V: Into<Value>,
    {
        let (names, values): (Vec<String>, Vec<Value>) = pairs
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .unzip();
        ValueRow::new(Arc::new(Header::new(names)), values)
    }

    /// Adapts a CSV record; empty cells become [`Value::Null`].
    pub fn from_record(header: Arc<Header>, record: &StringRecord) -> Self {
        let values = record.iter().map(text_cell).collect();
        ValueRow::new(header, values)
    }

    pub fn header(&self) -> &Arc<Header> {
        &self.header
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl Row for ValueRow {
    fn column_count(&self) -> usize {
        self.header.len()
    }

    fn column_name(&self, index: usize) -> Option<&str> {
        self.header.names.get(index).map(String::as_str)
    }

    fn value_at(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    fn has_named_columns(&self) -> bool {
        self.header.named
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.header.position(column)
    }
}
