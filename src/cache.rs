//! Compiled-materializer cache keyed by target type and binding configuration.
//!
//! The cache is an ordinary value owned by whoever needs it; nothing here is
//! global. It is `Send + Sync`: lookups share a read lock and inserts publish a
//! fully built entry under the write lock, so readers see either no entry or a
//! complete one. Two callers missing on the same key at once may both compile;
//! the later insert wins and both results are valid.
//!
//! Under one key the cache keeps a materializer per row shape. A row whose
//! column names differ as a set from every stored shape is resolved once and
//! added alongside the others; a mere reordering of known columns reuses the
//! matching entry. Entries are never evicted.

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicUsize, Ordering},
    },
};

use log::{debug, trace};

use crate::{
    binding::BindingConfiguration,
    columns::ColumnSet,
    compiler::{Materializer, compile},
    error::MapError,
    record::{Field, Record},
    resolver::resolve,
    row::{Row, names_of},
};

struct RowShape {
    names: Vec<String>,
    columns: ColumnSet,
}

impl RowShape {
    fn capture(row: &dyn Row) -> Self {
        RowShape {
            names: names_of(row).map(str::to_string).collect(),
            columns: ColumnSet::from_row(row),
        }
    }

    fn same_order(&self, row: &dyn Row) -> bool {
        row.column_count() == self.names.len()
            && names_of(row).eq(self.names.iter().map(String::as_str))
    }
}

struct CacheEntry {
    shape: RowShape,
    materializer: Arc<dyn Any + Send + Sync>,
}

impl CacheEntry {
    fn materializer<T: Record>(&self) -> Option<Materializer<T>> {
        self.materializer.downcast_ref::<Materializer<T>>().cloned()
    }
}

type Entries = HashMap<TypeId, HashMap<BindingConfiguration, Vec<CacheEntry>>>;

#[derive(Default)]
pub struct MapperCache {
    entries: RwLock<Entries>,
    resolutions: AtomicUsize,
    compilations: AtomicUsize,
}

impl MapperCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the materializer for `T` under `config`, resolving and compiling
    /// it against `row`'s columns on first use.
    pub fn get_or_compile<T: Record>(
        &self,
        row: &dyn Row,
        config: &BindingConfiguration,
    ) -> Result<Materializer<T>, MapError> {
        if !row.has_named_columns() {
            return Err(MapError::UnsupportedRowShape {
                record: T::record_name(),
            });
        }
        if let Some(found) = self.lookup::<T>(row, config) {
            trace!("Materializer cache hit for {}", T::record_name());
            return Ok(found);
        }

        let shape = RowShape::capture(row);
        self.resolutions.fetch_add(1, Ordering::Relaxed);
        let fields = T::fields();
        let mapping = resolve(&shape.columns, fields.iter().map(Field::info), config);
        let materializer = compile::<T>(&mapping)?;
        self.compilations.fetch_add(1, Ordering::Relaxed);

        let entry = CacheEntry {
            shape,
            materializer: Arc::new(materializer.clone()),
        };
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let shapes = entries
            .entry(TypeId::of::<T>())
            .or_default()
            .entry(config.clone())
            .or_default();
        let known = shapes
            .iter()
            .position(|known| known.shape.columns.same_columns(&entry.shape.columns));
        match known {
            Some(idx) => shapes[idx] = entry,
            None => {
                if !shapes.is_empty() {
                    debug!(
                        "Cached materializer for {} under new column shape ({} known)",
                        T::record_name(),
                        shapes.len()
                    );
                }
                shapes.push(entry);
            }
        }
        Ok(materializer)
    }

    fn lookup<T: Record>(
        &self,
        row: &dyn Row,
        config: &BindingConfiguration,
    ) -> Option<Materializer<T>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let shapes = entries.get(&TypeId::of::<T>())?.get(config)?;
        if let Some(entry) = shapes.iter().find(|entry| entry.shape.same_order(row)) {
            return entry.materializer();
        }
        let columns = ColumnSet::from_row(row);
        match shapes
            .iter()
            .find(|entry| entry.shape.columns.same_columns(&columns))
        {
            Some(entry) => entry.materializer(),
            None => {
                debug!(
                    "Column shape not seen before for {}; resolving",
                    T::record_name()
                );
                None
            }
        }
    }

    /// Number of compiled materializers held, across every key and row shape.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .flat_map(HashMap::values)
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many times the column resolver has run.
    pub fn resolutions(&self) -> usize {
        self.resolutions.load(Ordering::Relaxed)
    }

    pub fn compilations(&self) -> usize {
        self.compilations.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for MapperCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperCache")
            .field("entries", &self.len())
            .field("resolutions", &self.resolutions())
            .field("compilations", &self.compilations())
            .finish()
    }
}
