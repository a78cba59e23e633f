use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use chrono::{NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Serialize};

use super::model::{AccidentDataset, AccidentRecord, Column};
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Load options
// ---------------------------------------------------------------------------

/// Text encoding of the source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Encoding {
    /// Strict UTF-8; invalid bytes abort the load.
    #[default]
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    /// ISO-8859-1: every byte is the code point of the same value.
    #[serde(rename = "latin-1", alias = "latin1", alias = "iso-8859-1")]
    Latin1,
}

/// What to do with rows whose event date cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullDatePolicy {
    /// Remove the row and count it in `AccidentDataset::dropped_rows`.
    #[default]
    Drop,
    /// Keep the row with a null date and year.
    Keep,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadOptions {
    pub encoding: Encoding,
    pub null_dates: NullDatePolicy,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an accident dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one accident per line
/// * `.parquet` – same columns, any Arrow type that formats to text
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<AccidentDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path, options)?,
        "parquet" | "pq" => load_parquet(path, options)?,
        other => return Err(DashboardError::UnsupportedFormat(other.to_string()).into()),
    };

    log::info!(
        "Loaded {} accidents from {} ({} rows dropped for unparseable dates)",
        dataset.len(),
        path.display(),
        dataset.dropped_rows
    );
    for column in Column::ALL {
        if !dataset.has_column(column) {
            log::warn!("Column {column} not present in {}", path.display());
        }
    }

    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Column layout shared by all formats
// ---------------------------------------------------------------------------

/// Position of each recognised column in a header row.
#[derive(Debug)]
struct ColumnLayout {
    indices: BTreeMap<Column, usize>,
}

impl ColumnLayout {
    fn from_headers(headers: &[String]) -> std::result::Result<Self, DashboardError> {
        let mut indices = BTreeMap::new();
        for (i, header) in headers.iter().enumerate() {
            if let Some(column) = Column::from_header(header) {
                // First matching header wins.
                indices.entry(column).or_insert(i);
            }
        }
        if !indices.contains_key(&Column::EventDate) {
            return Err(DashboardError::MissingColumn(Column::EventDate));
        }
        Ok(ColumnLayout { indices })
    }

    fn columns(&self) -> BTreeSet<Column> {
        self.indices.keys().copied().collect()
    }

    /// Trimmed cell of `column`, `None` when the column is absent or the
    /// cell is blank.
    fn cell<'a>(&self, cells: &'a [String], column: Column) -> Option<&'a str> {
        let idx = *self.indices.get(&column)?;
        let value = cells.get(idx)?.trim();
        (!value.is_empty()).then_some(value)
    }

    fn build_record(&self, cells: Vec<String>, policy: NullDatePolicy) -> Option<AccidentRecord> {
        let event_date = self
            .cell(&cells, Column::EventDate)
            .and_then(parse_event_date);
        if event_date.is_none() && policy == NullDatePolicy::Drop {
            return None;
        }

        let mut record = AccidentRecord::with_date(event_date);
        for column in Column::CATEGORICAL {
            let value = self.cell(&cells, column).map(str::to_string);
            record.set_categorical(column, value);
        }
        record.total_fatal_injuries = self
            .cell(&cells, Column::TotalFatalInjuries)
            .map(parse_fatal_injuries)
            .unwrap_or(0);
        record.cells = cells;
        Some(record)
    }
}

/// Accumulates records for one load, keeping the drop count.
struct DatasetBuilder {
    layout: ColumnLayout,
    headers: Vec<String>,
    policy: NullDatePolicy,
    records: Vec<AccidentRecord>,
    dropped: usize,
}

impl DatasetBuilder {
    fn new(headers: Vec<String>, policy: NullDatePolicy) -> std::result::Result<Self, DashboardError> {
        let layout = ColumnLayout::from_headers(&headers)?;
        Ok(DatasetBuilder {
            layout,
            headers,
            policy,
            records: Vec::new(),
            dropped: 0,
        })
    }

    fn push(&mut self, cells: Vec<String>) {
        match self.layout.build_record(cells, self.policy) {
            Some(record) => self.records.push(record),
            None => self.dropped += 1,
        }
    }

    fn finish(self) -> AccidentDataset {
        AccidentDataset::from_records(
            self.headers,
            self.layout.columns(),
            self.records,
            self.dropped,
        )
    }
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%b-%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parse an event date leniently.  Unrecognised text yields `None`.
pub fn parse_event_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if s.contains('/') {
        return parse_slash_date(s);
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// `YYYY/MM/DD`, `MM/DD/YYYY` or `MM/DD/YY`, told apart by segment width.
fn parse_slash_date(s: &str) -> Option<NaiveDate> {
    let first = s.split('/').next()?;
    let last = s.rsplit('/').next()?;
    let fmt = match (first.len(), last.len()) {
        (4, _) => "%Y/%m/%d",
        (_, 4) => "%m/%d/%Y",
        (_, 2) => "%m/%d/%y",
        _ => return None,
    };
    NaiveDate::parse_from_str(s, fmt).ok()
}

/// Fatality counts are often exported as floats (`"2.0"`).  Anything that
/// is not a finite non-negative number counts as zero.
fn parse_fatal_injuries(s: &str) -> u32 {
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.trunc().min(u32::MAX as f64) as u32)
        .unwrap_or(0)
}

fn decode(bytes: &[u8], encoding: Encoding, row: usize) -> std::result::Result<String, DashboardError> {
    match encoding {
        Encoding::Utf8 => std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|e| DashboardError::Encoding {
                row,
                message: format!("invalid UTF-8: {e}"),
            }),
        Encoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path, options: &LoadOptions) -> Result<AccidentDataset> {
    let file = File::open(path).with_context(|| format!("opening CSV {}", path.display()))?;
    read_csv(file, options)
}

/// Parse CSV from any reader.  Short rows are padded with empty cells; a
/// row with more fields than the header is a fatal error.
pub fn read_csv<R: Read>(input: R, options: &LoadOptions) -> Result<AccidentDataset> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);

    let mut headers = reader
        .byte_headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| decode(h, options.encoding, 0))
        .collect::<std::result::Result<Vec<String>, _>>()?;
    if let Some(first) = headers.first_mut() {
        *first = first.trim_start_matches('\u{feff}').to_string();
    }

    let width = headers.len();
    let mut builder = DatasetBuilder::new(headers, options.null_dates)?;

    for (row_no, result) in reader.byte_records().enumerate() {
        let record = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        if record.len() > width {
            bail!(
                "CSV row {}: expected at most {width} fields, found {}",
                row_no + 1,
                record.len()
            );
        }
        let mut cells = record
            .iter()
            .map(|field| decode(field, options.encoding, row_no + 1))
            .collect::<std::result::Result<Vec<String>, _>>()?;
        cells.resize(width, String::new());
        builder.push(cells);
    }

    Ok(builder.finish())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with the same columns as the CSV export.
///
/// Every column is rendered to text with Arrow's display formatter and then
/// goes through the same parsing as CSV cells, so dates may be stored as
/// strings, `Date32` or timestamps.  The encoding option does not apply.
fn load_parquet(path: &Path, options: &LoadOptions) -> Result<AccidentDataset> {
    let file = File::open(path).with_context(|| format!("opening parquet file {}", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut dataset = DatasetBuilder::new(headers, options.null_dates)?;
    let format = FormatOptions::default();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let formatters = batch
            .columns()
            .iter()
            .map(|col| ArrayFormatter::try_new(col.as_ref(), &format))
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("formatting parquet columns")?;

        for row in 0..batch.num_rows() {
            let cells = formatters
                .iter()
                .map(|f| f.value(row).to_string())
                .collect();
            dataset.push(cells);
        }
    }

    Ok(dataset.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "Event_Date,Aircraft_Model,Aircraft_Category,Weather_Condition,Aircraft_Damage,Total_Fatal_Injuries\n";

    fn load(body: &str, options: LoadOptions) -> AccidentDataset {
        let text = format!("{HEADER}{body}");
        read_csv(text.as_bytes(), &options).expect("csv should load")
    }

    #[test]
    fn loads_rows_and_derives_year() {
        let ds = load(
            "1990-05-01,152,Airplane,VMC,Substantial,0\n\
             2000-01-31,172,Airplane,IMC,Destroyed,2.0\n",
            LoadOptions::default(),
        );
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].year, Some(1990));
        assert_eq!(ds.records[1].year, Some(2000));
        assert_eq!(ds.records[1].total_fatal_injuries, 2);
        assert_eq!(ds.records[1].weather_condition.as_deref(), Some("IMC"));
        assert_eq!(ds.records[0].cells.len(), 6);
        assert_eq!(ds.columns.len(), 6);
    }

    #[test]
    fn unparseable_dates_are_dropped_by_default() {
        let ds = load(
            "not a date,152,Airplane,VMC,Minor,0\n\
             ,172,Airplane,VMC,Minor,0\n\
             2010-03-04,172,Airplane,VMC,Minor,0\n",
            LoadOptions::default(),
        );
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.dropped_rows, 2);
        assert!(ds.records.iter().all(|r| r.event_date.is_some()));
    }

    #[test]
    fn keep_policy_retains_rows_with_null_year() {
        let options = LoadOptions {
            null_dates: NullDatePolicy::Keep,
            ..Default::default()
        };
        let ds = load(
            "garbage,152,Airplane,VMC,Minor,0\n2010-03-04,172,Airplane,VMC,Minor,0\n",
            options,
        );
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.dropped_rows, 0);
        assert_eq!(ds.records[0].year, None);
        assert_eq!(ds.records[1].year, Some(2010));
    }

    #[test]
    fn blank_cells_are_null() {
        let ds = load("2001-01-01, ,,VMC,,\n", LoadOptions::default());
        let r = &ds.records[0];
        assert_eq!(r.aircraft_model, None);
        assert_eq!(r.aircraft_category, None);
        assert_eq!(r.aircraft_damage, None);
        assert_eq!(r.total_fatal_injuries, 0);
    }

    #[test]
    fn latin1_bytes_decode_to_matching_code_points() {
        let mut bytes = b"Event_Date,Aircraft_Model\n2001-01-01,Fouga Magister ".to_vec();
        bytes.push(0xC9); // 'É'
        bytes.push(b'\n');

        let options = LoadOptions {
            encoding: Encoding::Latin1,
            ..Default::default()
        };
        let ds = read_csv(bytes.as_slice(), &options).expect("latin-1 should load");
        assert_eq!(
            ds.records[0].aircraft_model.as_deref(),
            Some("Fouga Magister É")
        );
    }

    #[test]
    fn invalid_utf8_is_fatal() {
        let mut bytes = b"Event_Date,Aircraft_Model\n2001-01-01,".to_vec();
        bytes.push(0xC9);
        bytes.push(b'\n');
        let err = read_csv(bytes.as_slice(), &LoadOptions::default()).unwrap_err();
        let domain = err.downcast_ref::<DashboardError>();
        assert!(matches!(domain, Some(DashboardError::Encoding { row: 1, .. })));
    }

    #[test]
    fn missing_event_date_column_is_fatal() {
        let err = read_csv(
            "Aircraft_Model,Weather_Condition\n172,VMC\n".as_bytes(),
            &LoadOptions::default(),
        )
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<DashboardError>(),
            Some(&DashboardError::MissingColumn(Column::EventDate))
        );
    }

    #[test]
    fn long_rows_are_fatal() {
        let err = read_csv(
            "Event_Date,Aircraft_Model\n2001-01-01,172,extra\n".as_bytes(),
            &LoadOptions::default(),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("CSV row 1"));
    }

    #[test]
    fn short_rows_get_empty_cells() {
        let ds = read_csv(
            "Event_Date,Aircraft_Model,Weather_Condition\n2001-01-01,172\n2002-01-01,PA-18,VMC\n"
                .as_bytes(),
            &LoadOptions::default(),
        )
        .unwrap();
        assert_eq!(ds.len(), 2);
        let short = &ds.records[0];
        assert_eq!(short.aircraft_model.as_deref(), Some("172"));
        assert_eq!(short.weather_condition, None);
        assert_eq!(short.cells, vec!["2001-01-01", "172", ""]);
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let ds = read_csv(
            "Event.Date,Location\n2001-01-01,Anchorage\n".as_bytes(),
            &LoadOptions::default(),
        )
        .expect("csv should load");
        assert!(ds.has_column(Column::EventDate));
        assert!(!ds.has_column(Column::WeatherCondition));
        assert_eq!(ds.records[0].cells, vec!["2001-01-01", "Anchorage"]);
    }

    #[test]
    fn date_formats() {
        let ymd = |y, m, d| NaiveDate::from_ymd_opt(y, m, d);
        assert_eq!(parse_event_date("1948-10-24"), ymd(1948, 10, 24));
        assert_eq!(parse_event_date("1948-10-24 13:05:00"), ymd(1948, 10, 24));
        assert_eq!(parse_event_date("1948-10-24T13:05:00.250"), ymd(1948, 10, 24));
        assert_eq!(parse_event_date("1948/10/24"), ymd(1948, 10, 24));
        assert_eq!(parse_event_date("10/24/1948"), ymd(1948, 10, 24));
        assert_eq!(parse_event_date("10/24/98"), ymd(1998, 10, 24));
        assert_eq!(parse_event_date("24-Oct-1948"), ymd(1948, 10, 24));
        assert_eq!(parse_event_date("2001-02-30"), None);
        assert_eq!(parse_event_date("yesterday"), None);
        assert_eq!(parse_event_date(""), None);
    }

    #[test]
    fn fatal_injury_parsing() {
        assert_eq!(parse_fatal_injuries("3"), 3);
        assert_eq!(parse_fatal_injuries("4.0"), 4);
        assert_eq!(parse_fatal_injuries("-1"), 0);
        assert_eq!(parse_fatal_injuries("NaN"), 0);
        assert_eq!(parse_fatal_injuries("unknown"), 0);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_file(Path::new("accidents.xlsx"), &LoadOptions::default()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<DashboardError>(),
            Some(&DashboardError::UnsupportedFormat("xlsx".into()))
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = Path::new("/nonexistent/rusty-wings/Aviation_Data.csv");
        let err = load_file(path, &LoadOptions::default()).unwrap_err();
        assert!(format!("{err:#}").contains("opening CSV"));
    }
}
