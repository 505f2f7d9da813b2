//! Field-to-column resolution.
//!
//! Resolution runs once per cache miss. Its output, a [`FieldMapping`], names
//! for every assignable field the column it is read from. Fields that no column
//! satisfies are left out and keep their default value.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

use itertools::Itertools;
use log::debug;
use serde::{Serialize, Serializer};

use crate::{
    binding::BindingConfiguration,
    columns::{ColumnSet, canonical_name, strip_separators},
    record::FieldInfo,
};

/// Read-only field name -> column name mapping, cheap to clone and share.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping(Arc<BTreeMap<String, String>>);

impl Serialize for FieldMapping {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.as_ref().serialize(serializer)
    }
}

impl FieldMapping {
    pub fn column_for(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(field, column)| (field.as_str(), column.as_str()))
    }
}

impl<F, C> FromIterator<(F, C)> for FieldMapping
where
    F: Into<String>,
    C: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (F, C)>>(iter: I) -> Self {
        FieldMapping(Arc::new(
            iter.into_iter()
                .map(|(field, column)| (field.into(), column.into()))
                .collect(),
        ))
    }
}

/// Lookup table from folded names to the original column spelling.
fn build_lookup<'a>(columns: &'a ColumnSet, strip: bool) -> HashMap<String, &'a str> {
    let mut lookup = HashMap::with_capacity(columns.len() * 2);
    if strip {
        for (canonical, original) in columns.iter() {
            lookup.insert(strip_separators(canonical), original);
        }
    }
    // Exact canonical names always resolve, and win over stripped aliases.
    for (canonical, original) in columns.iter() {
        lookup.insert(canonical.to_string(), original);
    }
    lookup
}

pub fn resolve<'f, I>(
    columns: &ColumnSet,
    fields: I,
    config: &BindingConfiguration,
) -> FieldMapping
where
    I: IntoIterator<Item = FieldInfo<'f>>,
{
    let strip = config.uses_stripping_convention();
    let lookup = build_lookup(columns, strip);

    let mut mapping = BTreeMap::new();
    let mut eligible = HashSet::new();
    for field in fields {
        if !field.kind.is_eligible() || config.is_ignored(field.name) {
            continue;
        }
        eligible.insert(field.name);

        let folded = canonical_name(field.name);
        let hit = lookup.get(&folded).or_else(|| {
            if strip {
                lookup.get(&strip_separators(&folded))
            } else {
                None
            }
        });
        if let Some(column) = hit {
            mapping.insert(field.name.to_string(), (*column).to_string());
        }
    }

    for (field, column) in config.explicit_bindings() {
        if eligible.contains(field.as_str()) {
            mapping.insert(field.clone(), column.clone());
        } else {
            debug!(
                "Dropping explicit binding {field} -> {column}: field is ignored or not assignable"
            );
        }
    }

    debug!(
        "Resolved {} field(s) against {} column(s): {}",
        mapping.len(),
        columns.len(),
        mapping
            .iter()
            .map(|(field, column)| format!("{field}={column}"))
            .join(", ")
    );
    FieldMapping(Arc::new(mapping))
}
