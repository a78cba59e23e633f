//! Report layer: turns a dataset plus the current filters into everything
//! the central panel draws.
//!
//! ```text
//!   AccidentDataset + FilterCriteria + Layout
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  build    │  filter → aggregate → charts / warnings / preview
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ Dashboard │  plain data, rendered by `ui`
//!   └──────────┘
//! ```
//!
//! `build` is pure and synchronous; the UI calls it again after every
//! control change.

pub mod layout;
pub mod narrative;

use crate::data::aggregate::{
    counts_by_year, cross_counts, ranked_counts, total_fatal_injuries, CrossTab,
};
use crate::data::filter::{filtered_indices, FilterCriteria, YearSelection};
use crate::data::model::{AccidentDataset, Column};
use crate::error::Result;

use layout::{Layout, SectionKind, YearControl};
use narrative::{Recommendation, RECOMMENDATIONS};

// ---------------------------------------------------------------------------
// Chart descriptions
// ---------------------------------------------------------------------------

/// Label/value tables, one variant per chart kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Line { points: Vec<(i32, usize)> },
    Bar { bars: Vec<(String, usize)> },
    StackedBar { table: CrossTab },
    Pie { slices: Vec<(String, usize)> },
}

impl ChartData {
    /// No points, bars or slices to draw.
    pub fn is_empty(&self) -> bool {
        match self {
            ChartData::Line { points } => points.is_empty(),
            ChartData::Bar { bars } => bars.is_empty(),
            ChartData::StackedBar { table } => table.is_empty(),
            ChartData::Pie { slices } => slices.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub data: ChartData,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
    Chart(Chart),
    /// Shown instead of a chart when the file lacks a needed column.
    Warning(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub heading: String,
    pub body: SectionBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Metrics {
    pub total_accidents: usize,
    pub total_fatal_injuries: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreviewTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Size of the subset the rows were taken from.
    pub total_rows: usize,
}

/// One fully computed render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub metrics: Metrics,
    pub sections: Vec<Section>,
    pub recommendations: &'static [Recommendation],
    pub preview: PreviewTable,
}

const ACCIDENTS_AXIS: &str = "Number of Accidents";

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Compute the dashboard for the current filters.
///
/// Fails only on invalid criteria (reversed range, category on an empty
/// column).  Missing optional columns turn into warning sections and an
/// empty subset into empty charts.
pub fn build(dataset: &AccidentDataset, criteria: &FilterCriteria, layout: &Layout) -> Result<Dashboard> {
    let indices = filtered_indices(dataset, criteria)?;
    log::debug!(
        "Rebuilding dashboard: {} of {} accidents match {:?}",
        indices.len(),
        dataset.len(),
        criteria
    );

    // With a single-year control the trend line would be one point, so it
    // ignores the year and keeps the category constraint.
    let trend_indices = match layout.year_control {
        YearControl::Single => filtered_indices(
            dataset,
            &FilterCriteria {
                years: YearSelection::All,
                category: criteria.category.clone(),
            },
        )?,
        YearControl::Range => indices.clone(),
    };

    let sections = layout
        .sections
        .iter()
        .map(|kind| match kind {
            SectionKind::YearTrend => year_trend(dataset, &trend_indices),
            other => build_section(*other, dataset, &indices, layout),
        })
        .collect();

    Ok(Dashboard {
        metrics: Metrics {
            total_accidents: indices.len(),
            total_fatal_injuries: total_fatal_injuries(dataset, &indices),
        },
        sections,
        recommendations: RECOMMENDATIONS,
        preview: preview(dataset, &indices, layout.preview_rows),
    })
}

fn build_section(kind: SectionKind, dataset: &AccidentDataset, indices: &[usize], layout: &Layout) -> Section {
    match kind {
        SectionKind::YearTrend => year_trend(dataset, indices),
        SectionKind::TopModels => {
            let heading = match layout.top_n {
                Some(n) => format!("Top {n} Aircraft Models with Most Accidents"),
                None => "Aircraft Models with Most Accidents".to_string(),
            };
            ranked_bar(dataset, indices, Column::AircraftModel, layout.top_n, heading)
        }
        SectionKind::CategoryCounts => {
            let column = layout.category_filter.unwrap_or(Column::AircraftCategory);
            let heading = format!("Accidents by {}", column.label());
            ranked_bar(dataset, indices, column, layout.top_n, heading)
        }
        SectionKind::WeatherDamage => weather_damage(dataset, indices),
        SectionKind::WeatherShare => weather_share(dataset, indices),
    }
}

fn year_trend(dataset: &AccidentDataset, indices: &[usize]) -> Section {
    let heading = "Aviation Accident Trends Over Time".to_string();
    Section {
        body: SectionBody::Chart(Chart {
            title: heading.clone(),
            x_label: "Year".into(),
            y_label: ACCIDENTS_AXIS.into(),
            data: ChartData::Line {
                points: counts_by_year(dataset, indices),
            },
        }),
        heading,
    }
}

fn ranked_bar(
    dataset: &AccidentDataset,
    indices: &[usize],
    column: Column,
    top_n: Option<usize>,
    heading: String,
) -> Section {
    if !dataset.has_column(column) {
        return warning(heading, format!("{} data is missing.", column.label()));
    }
    Section {
        body: SectionBody::Chart(Chart {
            title: heading.clone(),
            x_label: column.label().into(),
            y_label: ACCIDENTS_AXIS.into(),
            data: ChartData::Bar {
                bars: ranked_counts(dataset, indices, column, top_n),
            },
        }),
        heading,
    }
}

fn weather_damage(dataset: &AccidentDataset, indices: &[usize]) -> Section {
    let heading = "Impact of Weather Conditions on Aircraft Damage".to_string();
    if !dataset.has_column(Column::WeatherCondition) || !dataset.has_column(Column::AircraftDamage) {
        return warning(
            heading,
            "Weather Condition or Aircraft Damage data is missing.".into(),
        );
    }
    Section {
        body: SectionBody::Chart(Chart {
            title: heading.clone(),
            x_label: Column::WeatherCondition.label().into(),
            y_label: ACCIDENTS_AXIS.into(),
            data: ChartData::StackedBar {
                table: cross_counts(
                    dataset,
                    indices,
                    Column::WeatherCondition,
                    Column::AircraftDamage,
                ),
            },
        }),
        heading,
    }
}

fn weather_share(dataset: &AccidentDataset, indices: &[usize]) -> Section {
    let heading = "Accidents by Weather Condition".to_string();
    if !dataset.has_column(Column::WeatherCondition) {
        return warning(heading, "Weather Condition data is missing.".into());
    }
    Section {
        body: SectionBody::Chart(Chart {
            title: heading.clone(),
            x_label: Column::WeatherCondition.label().into(),
            y_label: ACCIDENTS_AXIS.into(),
            data: ChartData::Pie {
                slices: ranked_counts(dataset, indices, Column::WeatherCondition, None),
            },
        }),
        heading,
    }
}

fn warning(heading: String, message: String) -> Section {
    log::debug!("{heading}: {message}");
    Section {
        heading,
        body: SectionBody::Warning(message),
    }
}

/// Source cells of the selected rows plus a derived `Year` column.
fn preview(dataset: &AccidentDataset, indices: &[usize], limit: Option<usize>) -> PreviewTable {
    let mut headers = dataset.headers.clone();
    headers.push("Year".to_string());

    let take = limit.unwrap_or(indices.len());
    let rows = indices
        .iter()
        .take(take)
        .map(|&i| {
            let record = &dataset.records[i];
            let mut row = record.cells.clone();
            row.push(record.year.map(|y| y.to_string()).unwrap_or_default());
            row
        })
        .collect();

    PreviewTable {
        headers,
        rows,
        total_rows: indices.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::layout::Preset;
    use super::*;
    use crate::data::filter::CategorySelection;
    use crate::data::loader::{read_csv, LoadOptions};
    use crate::error::DashboardError;

    const CSV: &str = "\
Event_Date,Aircraft_Model,Aircraft_Category,Weather_Condition,Aircraft_Damage,Total_Fatal_Injuries
1990-01-10,152,Airplane,VMC,Substantial,0
1990-04-02,172,Airplane,IMC,Destroyed,2
1990-07-19,152,Airplane,VMC,Substantial,1
2000-02-11,R44,Helicopter,VMC,Destroyed,1
2010-05-05,172,Airplane,IMC,Substantial,0
2010-09-30,152,Airplane,VMC,Minor,3
";

    fn dataset(text: &str) -> AccidentDataset {
        read_csv(text.as_bytes(), &LoadOptions::default()).unwrap()
    }

    fn chart<'a>(dashboard: &'a Dashboard, index: usize) -> &'a ChartData {
        match &dashboard.sections[index].body {
            SectionBody::Chart(chart) => &chart.data,
            SectionBody::Warning(w) => panic!("expected chart, got warning {w}"),
        }
    }

    fn range(low: i32, high: i32) -> FilterCriteria {
        FilterCriteria {
            years: YearSelection::Range { low, high },
            category: None,
        }
    }

    #[test]
    fn trends_preset_scenario() {
        let ds = dataset(CSV);
        let layout = Layout::for_preset(Preset::Trends);
        let dash = build(&ds, &range(1995, 2010), &layout).unwrap();

        assert_eq!(dash.metrics.total_accidents, 3);
        assert_eq!(dash.metrics.total_fatal_injuries, 4);
        assert_eq!(dash.sections.len(), 3);

        assert_eq!(
            chart(&dash, 0),
            &ChartData::Line {
                points: vec![(2000, 1), (2010, 2)]
            }
        );
        assert!(matches!(chart(&dash, 1), ChartData::Bar { .. }));
        assert!(matches!(chart(&dash, 2), ChartData::StackedBar { .. }));
        assert_eq!(dash.sections[1].heading, "Top 10 Aircraft Models with Most Accidents");
        assert_eq!(dash.recommendations.len(), 3);
    }

    #[test]
    fn full_dataset_year_counts_round_trip() {
        let text = format!("{CSV}bad-date,172,Airplane,VMC,Minor,0\n");
        let ds = dataset(&text);
        assert_eq!(ds.dropped_rows, 1);

        let layout = Layout::for_preset(Preset::Trends);
        let dash = build(&ds, &FilterCriteria::default(), &layout).unwrap();
        let ChartData::Line { points } = chart(&dash, 0) else {
            panic!("trend should be a line chart");
        };
        let total: usize = points.iter().map(|(_, c)| c).sum();
        assert_eq!(total, ds.len());
    }

    #[test]
    fn absent_category_renders_empty_charts() {
        let ds = dataset(CSV);
        let layout = Layout::for_preset(Preset::Explorer);
        let criteria = FilterCriteria {
            years: YearSelection::Single(1990),
            category: Some(CategorySelection {
                column: Column::AircraftCategory,
                value: "Balloon".into(),
            }),
        };
        let dash = build(&ds, &criteria, &layout).unwrap();

        assert_eq!(dash.metrics, Metrics::default());
        assert!(dash.preview.rows.is_empty());
        for i in 0..dash.sections.len() {
            assert!(chart(&dash, i).is_empty(), "section {i} should be empty");
        }
    }

    #[test]
    fn explorer_trend_ignores_selected_year() {
        let ds = dataset(CSV);
        let layout = Layout::for_preset(Preset::Explorer);
        let criteria = FilterCriteria {
            years: YearSelection::Single(2000),
            category: Some(CategorySelection {
                column: Column::AircraftCategory,
                value: "Airplane".into(),
            }),
        };
        let dash = build(&ds, &criteria, &layout).unwrap();

        assert_eq!(dash.metrics.total_accidents, 0);
        assert_eq!(
            chart(&dash, 0),
            &ChartData::Line {
                points: vec![(1990, 3), (2010, 2)]
            }
        );
        assert!(matches!(chart(&dash, 2), ChartData::Pie { .. }));
    }

    #[test]
    fn explorer_bar_is_not_truncated() {
        let ds = dataset(CSV);
        let layout = Layout::for_preset(Preset::Explorer);
        let criteria = FilterCriteria::default();
        let dash = build(&ds, &criteria, &layout).unwrap();
        assert_eq!(
            chart(&dash, 1),
            &ChartData::Bar {
                bars: vec![("Airplane".into(), 5), ("Helicopter".into(), 1)]
            }
        );
        assert_eq!(dash.preview.rows.len(), 6);
    }

    #[test]
    fn missing_columns_become_warnings() {
        let ds = dataset("Event_Date,Aircraft_Damage\n2001-01-01,Minor\n");
        let layout = Layout::for_preset(Preset::Trends);
        let dash = build(&ds, &FilterCriteria::default(), &layout).unwrap();

        assert!(matches!(chart(&dash, 0), ChartData::Line { .. }));
        assert_eq!(
            dash.sections[1].body,
            SectionBody::Warning("Aircraft Model data is missing.".into())
        );
        assert_eq!(
            dash.sections[2].body,
            SectionBody::Warning("Weather Condition or Aircraft Damage data is missing.".into())
        );
    }

    #[test]
    fn explorer_missing_weather_warns_on_pie() {
        let ds = dataset("Event_Date,Aircraft_Category\n2001-01-01,Airplane\n");
        let layout = Layout::for_preset(Preset::Explorer);
        let dash = build(&ds, &FilterCriteria::default(), &layout).unwrap();
        assert_eq!(
            dash.sections[2].body,
            SectionBody::Warning("Weather Condition data is missing.".into())
        );
    }

    #[test]
    fn preview_is_limited_and_has_year_column() {
        let mut text = String::from("Event_Date,Aircraft_Model\n");
        for i in 0..80 {
            text.push_str(&format!("{}-06-01,172\n", 1940 + i));
        }
        let ds = dataset(&text);
        let layout = Layout::for_preset(Preset::Trends);
        let dash = build(&ds, &FilterCriteria::default(), &layout).unwrap();

        assert_eq!(dash.preview.rows.len(), 50);
        assert_eq!(dash.preview.total_rows, 80);
        assert_eq!(dash.preview.headers.last().map(String::as_str), Some("Year"));
        assert_eq!(dash.preview.rows[0], vec!["1940-06-01", "172", "1940"]);
    }

    #[test]
    fn category_on_empty_column_is_an_error() {
        let ds = dataset("Event_Date,Aircraft_Category\n2001-01-01,\n");
        let layout = Layout::for_preset(Preset::Explorer);
        let criteria = FilterCriteria {
            years: YearSelection::All,
            category: Some(CategorySelection {
                column: Column::AircraftCategory,
                value: "Airplane".into(),
            }),
        };
        assert_eq!(
            build(&ds, &criteria, &layout),
            Err(DashboardError::EmptyCategoryColumn {
                column: Column::AircraftCategory
            })
        );
    }
}
