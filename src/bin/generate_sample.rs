use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate, Weekday};
use clap::Parser;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// Write a synthetic hourly bike-sharing dataset.
#[derive(Parser)]
#[command(name = "generate_sample")]
struct Args {
    /// Output path; `.parquet` writes Parquet, anything else CSV
    #[arg(default_value = "sample_train.csv")]
    output: PathBuf,

    /// PRNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

#[derive(Debug, Serialize)]
struct Row {
    datetime: String,
    season: i64,
    holiday: i64,
    workingday: i64,
    weather: i64,
    temp: f64,
    atemp: f64,
    humidity: f64,
    windspeed: f64,
    casual: i64,
    registered: i64,
    count: i64,
}

/// A handful of fixed-date US federal holidays.
fn is_holiday(date: NaiveDate) -> bool {
    matches!((date.month(), date.day()), (1, 1) | (7, 4) | (11, 11) | (12, 25))
}

/// Season code by month as the source data assigns it (Jan–Mar = 1, spring).
fn season_code(month: u32) -> i64 {
    ((month - 1) / 3 + 1) as i64
}

/// Relative demand for an hour; commuter peaks on working days, a midday
/// hump otherwise.
fn hour_shape(hour: u32, working: bool) -> f64 {
    let h = hour as f64;
    let bump = |center: f64, width: f64| (-(h - center).powi(2) / (2.0 * width * width)).exp();
    if working {
        0.05 + 1.0 * bump(8.0, 1.0) + 0.45 * bump(13.0, 2.5) + 1.1 * bump(17.5, 1.3)
    } else {
        0.05 + 0.9 * bump(14.0, 3.5)
    }
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    let mut rows = Vec::new();

    // Days 1..=19 of each month, like the public training split.
    for year in [2011, 2012] {
        for month in 1..=12u32 {
            for day in 1..=19u32 {
                let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
                    continue;
                };
                let holiday = is_holiday(date);
                let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
                let working = !holiday && !weekend;

                let season = season_code(month);
                let seasonal_temp = 15.0 - 11.0 * (2.0 * std::f64::consts::PI * (month as f64 - 1.0) / 12.0).cos();
                let growth = if year == 2012 { 1.6 } else { 1.0 };
                // Weather persists across the day with small hourly changes.
                let mut weather: i64 = if rng.next_f64() < 0.65 { 1 } else { 2 };

                for hour in 0..24u32 {
                    let roll = rng.next_f64();
                    if roll < 0.05 {
                        weather = 3;
                    } else if roll < 0.0505 {
                        weather = 4;
                    } else if roll > 0.9 && weather > 1 {
                        weather -= 1;
                    }

                    let daily = 4.0 * (2.0 * std::f64::consts::PI * (hour as f64 - 9.0) / 24.0).sin();
                    let temp = (seasonal_temp + daily + rng.gauss(0.0, 1.5)).max(-5.0);
                    let humidity = (rng.gauss(62.0, 15.0) + if weather >= 3 { 20.0 } else { 0.0 }).clamp(10.0, 100.0);
                    let windspeed = rng.gauss(12.0, 6.0).max(0.0);

                    let weather_factor = match weather {
                        1 => 1.0,
                        2 => 0.85,
                        3 => 0.45,
                        _ => 0.1,
                    };
                    let temp_factor = (0.35 + temp / 30.0).clamp(0.2, 1.2);
                    let base = 420.0 * growth * hour_shape(hour, working) * weather_factor * temp_factor;

                    let registered_share = if working { 0.85 } else { 0.6 };
                    let registered = (base * registered_share + rng.gauss(0.0, 8.0)).round().max(0.0) as i64;
                    let casual = (base * (1.0 - registered_share) + rng.gauss(0.0, 4.0)).round().max(0.0) as i64;

                    rows.push(Row {
                        datetime: format!("{} {hour:02}:00:00", date.format("%Y-%m-%d")),
                        season,
                        holiday: holiday as i64,
                        workingday: working as i64,
                        weather,
                        temp: (temp * 100.0).round() / 100.0,
                        atemp: ((temp + rng.gauss(2.0, 1.0)) * 100.0).round() / 100.0,
                        humidity: humidity.round(),
                        windspeed: (windspeed * 1000.0).round() / 1000.0,
                        casual,
                        registered,
                        count: casual + registered,
                    });
                }
            }
        }
    }
    rows
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV output")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let ints = |f: fn(&Row) -> i64| -> ArrayRef { Arc::new(Int64Array::from(rows.iter().map(f).collect::<Vec<_>>())) };
    let floats = |f: fn(&Row) -> f64| -> ArrayRef { Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>())) };

    let schema = Arc::new(Schema::new(vec![
        Field::new("datetime", DataType::Utf8, false),
        Field::new("season", DataType::Int64, false),
        Field::new("holiday", DataType::Int64, false),
        Field::new("workingday", DataType::Int64, false),
        Field::new("weather", DataType::Int64, false),
        Field::new("temp", DataType::Float64, false),
        Field::new("atemp", DataType::Float64, false),
        Field::new("humidity", DataType::Float64, false),
        Field::new("windspeed", DataType::Float64, false),
        Field::new("casual", DataType::Int64, false),
        Field::new("registered", DataType::Int64, false),
        Field::new("count", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.datetime.as_str()).collect::<Vec<_>>(),
            )) as ArrayRef,
            ints(|r| r.season),
            ints(|r| r.holiday),
            ints(|r| r.workingday),
            ints(|r| r.weather),
            floats(|r| r.temp),
            floats(|r| r.atemp),
            floats(|r| r.humidity),
            floats(|r| r.windspeed),
            ints(|r| r.casual),
            ints(|r| r.registered),
            ints(|r| r.count),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);
    let rows = generate(&mut rng);

    let is_parquet = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet") || e.eq_ignore_ascii_case("pq"));
    if is_parquet {
        write_parquet(&args.output, &rows)?;
    } else {
        write_csv(&args.output, &rows)?;
    }

    println!("Wrote {} hourly rows to {}", rows.len(), args.output.display());
    Ok(())
}
