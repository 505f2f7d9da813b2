//! Entry point tying resolution, compilation, and caching together.

use std::sync::Arc;

use crate::{
    binding::BindingConfiguration,
    cache::MapperCache,
    compiler::Materializer,
    error::MapError,
    record::Record,
    row::Row,
};

/// Materializes rows into records through a shared [`MapperCache`].
///
/// Clones share the same cache. Build one per application context (or inject a
/// cache with [`Mapper::with_cache`]) and hand it to every worker.
#[derive(Debug, Clone, Default)]
pub struct Mapper {
    cache: Arc<MapperCache>,
}

impl Mapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(cache: Arc<MapperCache>) -> Self {
        Mapper { cache }
    }

    pub fn cache(&self) -> &Arc<MapperCache> {
        &self.cache
    }

    /// Produces one `T` from `row`.
    pub fn materialize<T: Record>(
        &self,
        row: &dyn Row,
        config: &BindingConfiguration,
    ) -> Result<T, MapError> {
        self.materializer::<T>(row, config)?.materialize(row)
    }

    /// Fetches the compiled function for rows shaped like `row`, so a caller
    /// iterating a result set can skip the per-row cache lookup.
    pub fn materializer<T: Record>(
        &self,
        row: &dyn Row,
        config: &BindingConfiguration,
    ) -> Result<Materializer<T>, MapError> {
        self.cache.get_or_compile::<T>(row, config)
    }
}
