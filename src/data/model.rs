use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{Datelike, NaiveDate};

// ---------------------------------------------------------------------------
// Column – the recognised part of the accident schema
// ---------------------------------------------------------------------------

/// A column of the accident table the dashboard knows how to use.
///
/// Files may carry any number of other columns; those only show up in the
/// preview table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    EventDate,
    AircraftModel,
    AircraftCategory,
    WeatherCondition,
    AircraftDamage,
    TotalFatalInjuries,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::EventDate,
        Column::AircraftModel,
        Column::AircraftCategory,
        Column::WeatherCondition,
        Column::AircraftDamage,
        Column::TotalFatalInjuries,
    ];

    /// Columns holding free-form categorical text.
    pub const CATEGORICAL: [Column; 4] = [
        Column::AircraftModel,
        Column::AircraftCategory,
        Column::WeatherCondition,
        Column::AircraftDamage,
    ];

    /// Match a raw header cell against the known columns.
    ///
    /// Headers are compared after trimming, lower-casing and mapping `.`
    /// and spaces to `_`, so `Event.Date`, `event date` and `Event_Date`
    /// are the same column.
    pub fn from_header(header: &str) -> Option<Column> {
        let normalized: String = header
            .trim()
            .chars()
            .map(|c| match c {
                '.' | ' ' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect();

        match normalized.as_str() {
            "event_date" => Some(Column::EventDate),
            "aircraft_model" | "model" => Some(Column::AircraftModel),
            "aircraft_category" => Some(Column::AircraftCategory),
            "weather_condition" => Some(Column::WeatherCondition),
            "aircraft_damage" => Some(Column::AircraftDamage),
            "total_fatal_injuries" => Some(Column::TotalFatalInjuries),
            _ => None,
        }
    }

    /// Canonical header name.
    pub fn name(self) -> &'static str {
        match self {
            Column::EventDate => "Event_Date",
            Column::AircraftModel => "Aircraft_Model",
            Column::AircraftCategory => "Aircraft_Category",
            Column::WeatherCondition => "Weather_Condition",
            Column::AircraftDamage => "Aircraft_Damage",
            Column::TotalFatalInjuries => "Total_Fatal_Injuries",
        }
    }

    /// Human readable label for axis titles and selectors.
    pub fn label(self) -> &'static str {
        match self {
            Column::EventDate => "Event Date",
            Column::AircraftModel => "Aircraft Model",
            Column::AircraftCategory => "Aircraft Category",
            Column::WeatherCondition => "Weather Condition",
            Column::AircraftDamage => "Aircraft Damage",
            Column::TotalFatalInjuries => "Total Fatal Injuries",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// AccidentRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single accident (one row of the source table).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccidentRecord {
    /// Parsed event date; `None` when the cell could not be parsed.
    pub event_date: Option<NaiveDate>,
    /// Year component of `event_date`.
    pub year: Option<i32>,
    pub aircraft_model: Option<String>,
    pub aircraft_category: Option<String>,
    pub weather_condition: Option<String>,
    pub aircraft_damage: Option<String>,
    /// Missing or unparseable counts are stored as zero.
    pub total_fatal_injuries: u32,
    /// Decoded cells in header order, used by the preview table.
    pub cells: Vec<String>,
}

impl AccidentRecord {
    /// Build a record from its date; keeps `year` in sync with the date.
    pub fn with_date(event_date: Option<NaiveDate>) -> Self {
        AccidentRecord {
            event_date,
            year: event_date.map(|d| d.year()),
            ..Default::default()
        }
    }

    /// Value of a categorical column, `None` for null cells and for
    /// non-categorical columns.
    pub fn categorical(&self, column: Column) -> Option<&str> {
        match column {
            Column::AircraftModel => self.aircraft_model.as_deref(),
            Column::AircraftCategory => self.aircraft_category.as_deref(),
            Column::WeatherCondition => self.weather_condition.as_deref(),
            Column::AircraftDamage => self.aircraft_damage.as_deref(),
            Column::EventDate | Column::TotalFatalInjuries => None,
        }
    }

    pub(crate) fn set_categorical(&mut self, column: Column, value: Option<String>) {
        match column {
            Column::AircraftModel => self.aircraft_model = value,
            Column::AircraftCategory => self.aircraft_category = value,
            Column::WeatherCondition => self.weather_condition = value,
            Column::AircraftDamage => self.aircraft_damage = value,
            Column::EventDate | Column::TotalFatalInjuries => {}
        }
    }
}

// ---------------------------------------------------------------------------
// AccidentDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed column indices.
///
/// Immutable once built; the cache hands it out behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct AccidentDataset {
    /// All accidents (rows), in file order.
    pub records: Vec<AccidentRecord>,
    /// Raw header row of the source file.
    pub headers: Vec<String>,
    /// Recognised columns present in the header.
    pub columns: BTreeSet<Column>,
    /// For each categorical column the sorted set of non-null values.
    pub unique_values: BTreeMap<Column, BTreeSet<String>>,
    /// Rows removed because their event date could not be parsed.
    pub dropped_rows: usize,
}

impl AccidentDataset {
    /// Build column indices from the loaded records.
    pub fn from_records(
        headers: Vec<String>,
        columns: BTreeSet<Column>,
        records: Vec<AccidentRecord>,
        dropped_rows: usize,
    ) -> Self {
        let mut unique_values: BTreeMap<Column, BTreeSet<String>> = BTreeMap::new();

        for column in Column::CATEGORICAL {
            if !columns.contains(&column) {
                continue;
            }
            let values = unique_values.entry(column).or_default();
            for record in &records {
                if let Some(v) = record.categorical(column) {
                    values.insert(v.to_string());
                }
            }
        }

        AccidentDataset {
            records,
            headers,
            columns,
            unique_values,
            dropped_rows,
        }
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Smallest and largest year present, ignoring null years.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let mut years = self.records.iter().filter_map(|r| r.year);
        let first = years.next()?;
        Some(years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y))))
    }

    /// Number of accidents.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: i32, category: Option<&str>) -> AccidentRecord {
        let mut r = AccidentRecord::with_date(NaiveDate::from_ymd_opt(year, 6, 1));
        r.aircraft_category = category.map(str::to_string);
        r
    }

    #[test]
    fn header_matching_ignores_case_and_separators() {
        assert_eq!(Column::from_header("Event.Date"), Some(Column::EventDate));
        assert_eq!(Column::from_header(" event date "), Some(Column::EventDate));
        assert_eq!(
            Column::from_header("Aircraft.damage"),
            Some(Column::AircraftDamage)
        );
        assert_eq!(Column::from_header("Model"), Some(Column::AircraftModel));
        assert_eq!(Column::from_header("Location"), None);
    }

    #[test]
    fn unique_values_skip_nulls_and_absent_columns() {
        let columns: BTreeSet<Column> =
            [Column::EventDate, Column::AircraftCategory].into_iter().collect();
        let ds = AccidentDataset::from_records(
            vec![],
            columns,
            vec![
                record(2001, Some("Airplane")),
                record(2002, None),
                record(2003, Some("Helicopter")),
                record(2004, Some("Airplane")),
            ],
            0,
        );

        let cats: Vec<&str> = ds.unique_values[&Column::AircraftCategory]
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(cats, vec!["Airplane", "Helicopter"]);
        assert!(!ds.unique_values.contains_key(&Column::WeatherCondition));
    }

    #[test]
    fn year_range_ignores_null_years() {
        let mut undated = AccidentRecord::with_date(None);
        undated.aircraft_category = Some("Glider".into());
        let ds = AccidentDataset::from_records(
            vec![],
            BTreeSet::new(),
            vec![record(1999, None), undated, record(1962, None)],
            0,
        );
        assert_eq!(ds.year_range(), Some((1962, 1999)));
        assert_eq!(AccidentDataset::default().year_range(), None);
    }
}
