use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use super::loader::LoadOptions;
use super::model::AccidentDataset;

/// Identity of a loaded dataset.  Two loads with equal keys are
/// interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub path: PathBuf,
    pub options: LoadOptions,
    /// Bumped by [`DatasetCache::invalidate`] to force a reload.
    pub version: u64,
}

/// Load-once / read-many holder for the current dataset.
#[derive(Debug, Default)]
pub struct DatasetCache {
    version: u64,
    entry: Option<(CacheKey, Arc<AccidentDataset>)>,
}

impl DatasetCache {
    pub fn key_for(&self, path: &Path, options: LoadOptions) -> CacheKey {
        CacheKey {
            path: path.to_path_buf(),
            options,
            version: self.version,
        }
    }

    /// Return the cached dataset for `path`/`options`, calling `load` only
    /// when nothing matching the current version is cached.  A failed load
    /// leaves the previous entry in place.
    pub fn get_or_load<F>(&mut self, path: &Path, options: LoadOptions, load: F) -> Result<Arc<AccidentDataset>>
    where
        F: FnOnce(&Path, &LoadOptions) -> Result<AccidentDataset>,
    {
        let key = self.key_for(path, options);
        if let Some((cached_key, dataset)) = &self.entry {
            if *cached_key == key {
                log::debug!("Dataset cache hit for {}", path.display());
                return Ok(Arc::clone(dataset));
            }
        }

        let dataset = Arc::new(load(path, &options)?);
        self.entry = Some((key, Arc::clone(&dataset)));
        Ok(dataset)
    }

    /// Drop the cached dataset so the next `get_or_load` reads the file again.
    pub fn invalidate(&mut self) {
        self.version += 1;
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::data::loader::{Encoding, NullDatePolicy};

    fn counting_loader(calls: &Cell<usize>) -> impl Fn(&Path, &LoadOptions) -> Result<AccidentDataset> + '_ {
        move |_, _| {
            calls.set(calls.get() + 1);
            Ok(AccidentDataset::default())
        }
    }

    #[test]
    fn loads_once_per_key() {
        let calls = Cell::new(0);
        let mut cache = DatasetCache::default();
        let path = Path::new("Aviation_Data.csv");

        let a = cache
            .get_or_load(path, LoadOptions::default(), counting_loader(&calls))
            .unwrap();
        let b = cache
            .get_or_load(path, LoadOptions::default(), counting_loader(&calls))
            .unwrap();

        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn changed_options_reload() {
        let calls = Cell::new(0);
        let mut cache = DatasetCache::default();
        let path = Path::new("Aviation_Data.csv");
        let latin = LoadOptions {
            encoding: Encoding::Latin1,
            null_dates: NullDatePolicy::Keep,
        };

        cache
            .get_or_load(path, LoadOptions::default(), counting_loader(&calls))
            .unwrap();
        cache.get_or_load(path, latin, counting_loader(&calls)).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn invalidate_forces_one_reload() {
        let calls = Cell::new(0);
        let mut cache = DatasetCache::default();
        let path = Path::new("Aviation_Data.csv");

        cache
            .get_or_load(path, LoadOptions::default(), counting_loader(&calls))
            .unwrap();
        cache.invalidate();
        cache
            .get_or_load(path, LoadOptions::default(), counting_loader(&calls))
            .unwrap();
        cache
            .get_or_load(path, LoadOptions::default(), counting_loader(&calls))
            .unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let calls = Cell::new(0);
        let mut cache = DatasetCache::default();
        let path = Path::new("missing.csv");

        let err = cache.get_or_load(path, LoadOptions::default(), |_, _| anyhow::bail!("no such file"));
        assert!(err.is_err());

        cache
            .get_or_load(path, LoadOptions::default(), counting_loader(&calls))
            .unwrap();
        assert_eq!(calls.get(), 1);
    }
}
