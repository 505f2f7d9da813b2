//! Compiles a resolved [`FieldMapping`] into a reusable [`Materializer`].
//!
//! Compilation walks the record description once and keeps only the steps that
//! have a column: field name, column name, and the typed setter. Invoking the
//! materializer replays those steps against a row with no further name
//! resolution or type inspection.

use std::{collections::HashMap, fmt, sync::Arc};

use log::debug;

use crate::{
    error::MapError,
    record::{Assign, Record},
    resolver::FieldMapping,
    row::Row,
};

struct Step<T> {
    field: String,
    column: String,
    assign: Assign<T>,
}

/// Compiled `row -> T` function; cheap to clone and safe to share across threads.
pub struct Materializer<T> {
    steps: Arc<[Step<T>]>,
}

impl<T> Clone for Materializer<T> {
    fn clone(&self) -> Self {
        Materializer {
            steps: Arc::clone(&self.steps),
        }
    }
}

impl<T> fmt::Debug for Materializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.steps
                    .iter()
                    .map(|step| format!("{} <- {}", step.field, step.column)),
            )
            .finish()
    }
}

impl<T: Record> Materializer<T> {
    pub fn materialize(&self, row: &dyn Row) -> Result<T, MapError> {
        let mut record = T::default();
        for step in self.steps.iter() {
            let raw = row.get(&step.column).ok_or_else(|| MapError::MissingColumn {
                record: T::record_name(),
                field: step.field.clone(),
                column: step.column.clone(),
            })?;
            (step.assign)(&mut record, raw).map_err(|source| MapError::Coercion {
                record: T::record_name(),
                field: step.field.clone(),
                column: step.column.clone(),
                source,
            })?;
        }
        Ok(record)
    }

    /// Number of fields this materializer assigns.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// `(field, column)` pairs in assignment order.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.steps
            .iter()
            .map(|step| (step.field.as_str(), step.column.as_str()))
    }
}

pub fn compile<T: Record>(mapping: &FieldMapping) -> Result<Materializer<T>, MapError> {
    let fields = T::fields();

    let mut declared: HashMap<&str, usize> = HashMap::with_capacity(fields.len());
    for field in &fields {
        *declared.entry(field.name()).or_insert(0) += 1;
    }
    if let Some(field) = fields.iter().find(|field| declared[field.name()] > 1) {
        return Err(MapError::AmbiguousConversionRoutine {
            record: T::record_name(),
            field: field.name().to_string(),
            candidates: declared[field.name()],
        });
    }

    let steps: Vec<Step<T>> = fields
        .iter()
        .filter(|field| field.kind().is_eligible())
        .filter_map(|field| {
            let column = mapping.column_for(field.name())?;
            let assign = field.assign()?;
            Some(Step {
                field: field.name().to_string(),
                column: column.to_string(),
                assign: Arc::clone(assign),
            })
        })
        .collect();

    debug!(
        "Compiled materializer for {} assigning {} of {} declared field(s)",
        T::record_name(),
        steps.len(),
        fields.len()
    );
    Ok(Materializer {
        steps: steps.into(),
    })
}
