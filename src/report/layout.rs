use serde::{Deserialize, Serialize};

use crate::data::filter::{year_bounds, CategorySelection, FilterCriteria, YearSelection};
use crate::data::loader::Encoding;
use crate::data::model::{AccidentDataset, Column};

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

/// The two dashboard flavours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Year range over fixed bounds, top models, weather × damage.
    #[default]
    Trends,
    /// Single year, category selector, all categories, weather pie.
    Explorer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearControl {
    Range,
    Single,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderBounds {
    Fixed { min: i32, max: i32 },
    /// Min/max year found in the loaded data.
    FromData,
}

/// One block of the central panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// Line chart, year → count.
    YearTrend,
    /// Bar chart of the most frequent aircraft models.
    TopModels,
    /// Bar chart of counts per value of the category column.
    CategoryCounts,
    /// Stacked bars, weather condition × aircraft damage.
    WeatherDamage,
    /// Pie chart of weather conditions.
    WeatherShare,
}

/// Everything that differs between presets.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub title: String,
    pub subtitle: String,
    pub year_control: YearControl,
    pub slider_bounds: SliderBounds,
    /// Initial range for `YearControl::Range`; the slider bounds otherwise.
    pub default_years: Option<(i32, i32)>,
    /// Column offered in the category selector.
    pub category_filter: Option<Column>,
    pub sections: Vec<SectionKind>,
    /// Truncation of ranked bar charts; `None` keeps every value.
    pub top_n: Option<usize>,
    /// Rows shown in the preview table; `None` shows the whole subset.
    pub preview_rows: Option<usize>,
    pub encoding: Encoding,
}

impl Layout {
    pub fn for_preset(preset: Preset) -> Self {
        match preset {
            Preset::Trends => Layout {
                title: "Aviation Accident Analysis Dashboard".into(),
                subtitle: "Analyze aviation accident trends, aircraft risks, and safety improvements."
                    .into(),
                year_control: YearControl::Range,
                slider_bounds: SliderBounds::Fixed {
                    min: 1950,
                    max: 2023,
                },
                default_years: Some((1980, 2023)),
                category_filter: None,
                sections: vec![
                    SectionKind::YearTrend,
                    SectionKind::TopModels,
                    SectionKind::WeatherDamage,
                ],
                top_n: Some(10),
                preview_rows: Some(50),
                encoding: Encoding::Utf8,
            },
            Preset::Explorer => Layout {
                title: "Aviation Accident Explorer".into(),
                subtitle: "Pick a year and an aircraft category to explore individual accidents."
                    .into(),
                year_control: YearControl::Single,
                slider_bounds: SliderBounds::FromData,
                default_years: None,
                category_filter: Some(Column::AircraftCategory),
                sections: vec![
                    SectionKind::YearTrend,
                    SectionKind::CategoryCounts,
                    SectionKind::WeatherShare,
                ],
                top_n: None,
                preview_rows: None,
                encoding: Encoding::Latin1,
            },
        }
    }

    /// Slider bounds for this dataset, `None` when data-derived bounds are
    /// requested and no row has a year.
    pub fn slider_range(&self, dataset: &AccidentDataset) -> Option<(i32, i32)> {
        match self.slider_bounds {
            SliderBounds::Fixed { min, max } => Some((min, max)),
            SliderBounds::FromData => year_bounds(dataset),
        }
    }

    /// Filter state shown when a dataset is first loaded.
    pub fn initial_criteria(&self, dataset: &AccidentDataset) -> FilterCriteria {
        let years = match (self.year_control, self.slider_range(dataset)) {
            (_, None) => YearSelection::All,
            (YearControl::Range, Some((min, max))) => {
                let (low, high) = self.default_years.unwrap_or((min, max));
                YearSelection::Range { low, high }
            }
            (YearControl::Single, Some((_, max))) => YearSelection::Single(max),
        };
        FilterCriteria {
            years,
            category: None,
        }
    }
}

/// Build the category constraint for a selector value; `None` means "all".
pub fn category_selection(column: Column, value: Option<&str>) -> Option<CategorySelection> {
    value.map(|v| CategorySelection {
        column,
        value: v.to_string(),
    })
}
