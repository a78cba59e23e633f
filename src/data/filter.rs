use std::collections::BTreeSet;

use super::model::{AccidentDataset, AccidentRecord, Column};
use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Filter criteria: what the side panel controls select
// ---------------------------------------------------------------------------

/// Year constraint chosen in the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YearSelection {
    /// No year constraint; rows with a null year pass too.
    #[default]
    All,
    /// Inclusive range.
    Range { low: i32, high: i32 },
    Single(i32),
}

/// Exact, case-sensitive equality on one categorical column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySelection {
    pub column: Column,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    pub years: YearSelection,
    pub category: Option<CategorySelection>,
}

impl YearSelection {
    fn validate(self) -> Result<Self> {
        match self {
            YearSelection::Range { low, high } if low > high => {
                Err(DashboardError::InvalidYearRange { low, high })
            }
            other => Ok(other),
        }
    }

    fn matches(self, year: Option<i32>) -> bool {
        match (self, year) {
            (YearSelection::All, _) => true,
            (YearSelection::Range { low, high }, Some(y)) => (low..=high).contains(&y),
            (YearSelection::Single(s), Some(y)) => s == y,
            (_, None) => false,
        }
    }
}

impl CategorySelection {
    fn matches(&self, record: &AccidentRecord) -> bool {
        record.categorical(self.column) == Some(self.value.as_str())
    }
}

/// Return indices of accidents that pass all active filters, in dataset
/// order.
///
/// Selecting a category on a column with no non-null values (or a column the
/// file does not have) is a configuration error.  A value that simply does
/// not occur in the column matches nothing.
pub fn filtered_indices(dataset: &AccidentDataset, criteria: &FilterCriteria) -> Result<Vec<usize>> {
    let years = criteria.years.validate()?;

    if let Some(sel) = &criteria.category {
        if category_options(dataset, sel.column).is_none() {
            return Err(DashboardError::EmptyCategoryColumn { column: sel.column });
        }
    }

    Ok(dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| years.matches(r.year))
        .filter(|(_, r)| criteria.category.as_ref().map_or(true, |sel| sel.matches(r)))
        .map(|(i, _)| i)
        .collect())
}

/// Sorted distinct non-null values of a categorical column, or `None` when
/// the column is absent or entirely null.
pub fn category_options(dataset: &AccidentDataset, column: Column) -> Option<&BTreeSet<String>> {
    dataset
        .unique_values
        .get(&column)
        .filter(|values| !values.is_empty())
}

/// Bounds for a data-derived year slider.
pub fn year_bounds(dataset: &AccidentDataset) -> Option<(i32, i32)> {
    dataset.year_range()
}
