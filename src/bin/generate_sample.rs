use std::sync::Arc;

use arrow::array::{Date32Array, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::ArrowWriter;

const ROWS: usize = 3000;

const MODELS: &[(&str, u32)] = &[
    ("152", 14),
    ("172", 12),
    ("172N", 8),
    ("PA-28-140", 7),
    ("150", 6),
    ("172M", 6),
    ("PA-18", 4),
    ("182", 4),
    ("180", 3),
    ("R44", 3),
    ("737", 2),
    ("A320", 1),
    ("Bell 206", 2),
    ("G-164A", 1),
];

const CATEGORIES: &[(&str, u32)] = &[
    ("Airplane", 80),
    ("Helicopter", 9),
    ("Glider", 3),
    ("Balloon", 1),
    ("Gyrocraft", 1),
    ("", 6),
];

const WEATHER: &[(&str, u32)] = &[("VMC", 82), ("IMC", 10), ("UNK", 4), ("", 4)];

const DAMAGE: &[(&str, u32)] = &[
    ("Substantial", 70),
    ("Destroyed", 20),
    ("Minor", 5),
    ("Unknown", 1),
    ("", 4),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: u32) -> u32 {
        (self.next_f64() * n as f64) as u32
    }

    /// Pick from `(value, weight)` pairs.
    fn weighted<'a>(&mut self, choices: &[(&'a str, u32)]) -> &'a str {
        let total: u32 = choices.iter().map(|(_, w)| w).sum();
        let mut roll = self.below(total);
        for &(value, weight) in choices {
            if roll < weight {
                return value;
            }
            roll -= weight;
        }
        choices[choices.len() - 1].0
    }
}

/// Accident dates skew towards the early 1980s, like the real NTSB export.
fn random_date(rng: &mut SimpleRng) -> NaiveDate {
    let year = if rng.below(4) == 0 {
        1948 + rng.below(75) as i32
    } else {
        1982 + (rng.next_f64() * rng.next_f64() * 41.0) as i32
    };
    let day_of_year = 1 + rng.below(365);
    NaiveDate::from_yo_opt(year, day_of_year)
        .or_else(|| NaiveDate::from_ymd_opt(year, 12, 31))
        .expect("valid date")
}

struct Row {
    date: Option<NaiveDate>,
    date_text: String,
    model: &'static str,
    category: &'static str,
    weather: &'static str,
    damage: &'static str,
    fatal: Option<f64>,
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

fn main() {
    let mut rng = SimpleRng::new(42);

    let rows: Vec<Row> = (0..ROWS)
        .map(|_| {
            let date = random_date(&mut rng);
            // About 1% of the export has unusable dates.
            let (date, date_text) = if rng.below(100) == 0 {
                (None, "unknown".to_string())
            } else {
                (Some(date), date.format("%Y-%m-%d").to_string())
            };
            let damage = rng.weighted(DAMAGE);
            let fatal = match rng.below(20) {
                0 => None,
                1..=3 => Some(f64::from(1 + rng.below(if damage == "Destroyed" { 6 } else { 2 }))),
                _ => Some(0.0),
            };
            Row {
                date,
                date_text,
                model: rng.weighted(MODELS),
                category: rng.weighted(CATEGORIES),
                weather: rng.weighted(WEATHER),
                damage,
                fatal,
            }
        })
        .collect();

    // ---- CSV ----
    let csv_path = "Aviation_Data.csv";
    let mut writer = csv::Writer::from_path(csv_path).expect("Failed to create CSV file");
    writer
        .write_record([
            "Event_Date",
            "Aircraft_Model",
            "Aircraft_Category",
            "Weather_Condition",
            "Aircraft_Damage",
            "Total_Fatal_Injuries",
        ])
        .expect("Failed to write CSV header");
    for row in &rows {
        let fatal = row.fatal.map(|f| format!("{f:.1}")).unwrap_or_default();
        writer
            .write_record([
                row.date_text.as_str(),
                row.model,
                row.category,
                row.weather,
                row.damage,
                fatal.as_str(),
            ])
            .expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV file");

    // ---- Parquet ----
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch");
    let dates = Date32Array::from(
        rows.iter()
            .map(|r| r.date.map(|d| (d - epoch).num_days() as i32))
            .collect::<Vec<_>>(),
    );
    let text_column = |f: fn(&Row) -> &str| -> StringArray {
        StringArray::from(rows.iter().map(|r| non_empty(f(r))).collect::<Vec<_>>())
    };
    let models = text_column(|r| r.model);
    let categories = text_column(|r| r.category);
    let weather = text_column(|r| r.weather);
    let damage = text_column(|r| r.damage);
    let fatal = Float64Array::from(rows.iter().map(|r| r.fatal).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("Event_Date", DataType::Date32, true),
        Field::new("Aircraft_Model", DataType::Utf8, true),
        Field::new("Aircraft_Category", DataType::Utf8, true),
        Field::new("Weather_Condition", DataType::Utf8, true),
        Field::new("Aircraft_Damage", DataType::Utf8, true),
        Field::new("Total_Fatal_Injuries", DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(dates),
            Arc::new(models),
            Arc::new(categories),
            Arc::new(weather),
            Arc::new(damage),
            Arc::new(fatal),
        ],
    )
    .expect("Failed to create RecordBatch");

    let parquet_path = "Aviation_Data.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    let years: Vec<i32> = rows.iter().filter_map(|r| r.date.map(|d| d.year())).collect();
    println!(
        "Wrote {} accidents ({}–{}) to {csv_path} and {parquet_path}",
        rows.len(),
        years.iter().min().copied().unwrap_or_default(),
        years.iter().max().copied().unwrap_or_default(),
    );
}
