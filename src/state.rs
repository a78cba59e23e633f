use std::path::PathBuf;
use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::data::cache::DatasetCache;
use crate::data::filter::{FilterCriteria, YearSelection};
use crate::data::loader::load_file;
use crate::data::model::AccidentDataset;
use crate::report::layout::{category_selection, Layout};
use crate::report::{self, Dashboard};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Debug)]
pub struct AppState {
    pub config: DashboardConfig,
    pub layout: Layout,

    /// File currently shown (None until something is opened).
    pub data_path: Option<PathBuf>,
    cache: DatasetCache,

    /// Loaded dataset, shared with the cache.
    pub dataset: Option<Arc<AccidentDataset>>,

    /// Current side panel selections.
    pub criteria: FilterCriteria,

    /// Result of the last re-run.
    pub dashboard: Option<Dashboard>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            layout: config.layout(),
            config,
            data_path: None,
            cache: DatasetCache::default(),
            dataset: None,
            criteria: FilterCriteria::default(),
            dashboard: None,
            status_message: None,
        }
    }

    /// Load (or fetch from the cache) the file at `path` and show it.
    pub fn open(&mut self, path: PathBuf) {
        let options = self.config.load_options();
        match self.cache.get_or_load(&path, options, load_file) {
            Ok(dataset) => {
                self.data_path = Some(path);
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Forget the cached dataset and read the current file again.
    pub fn reload(&mut self) {
        self.cache.invalidate();
        if let Some(path) = self.data_path.clone() {
            self.open(path);
        }
    }

    /// Ingest a newly loaded dataset, reset filters and re-run.
    pub fn set_dataset(&mut self, dataset: Arc<AccidentDataset>) {
        if dataset.is_empty() {
            log::warn!("Dataset contains no accidents");
        }
        self.criteria = self.layout.initial_criteria(&dataset);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.rerun();
    }

    /// Recompute the dashboard from the current dataset and filters.
    pub fn rerun(&mut self) {
        let Some(ds) = &self.dataset else {
            self.dashboard = None;
            return;
        };
        match report::build(ds, &self.criteria, &self.layout) {
            Ok(dashboard) => {
                self.dashboard = Some(dashboard);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Cannot apply filters: {e}");
                self.dashboard = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    pub fn set_years(&mut self, years: YearSelection) {
        if self.criteria.years != years {
            self.criteria.years = years;
            self.rerun();
        }
    }

    /// Select a category value, or clear the constraint with `None`.
    pub fn set_category(&mut self, value: Option<&str>) {
        let Some(column) = self.layout.category_filter else {
            return;
        };
        let category = category_selection(column, value);
        if self.criteria.category != category {
            self.criteria.category = category;
            self.rerun();
        }
    }

    /// Currently selected category value, if any.
    pub fn selected_category(&self) -> Option<&str> {
        self.criteria.category.as_ref().map(|c| c.value.as_str())
    }
}
