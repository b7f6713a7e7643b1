use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use chrono::NaiveDateTime;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::ChunkReader;
use serde::Deserialize;

use super::error::SchemaError;
use super::model::{RentalDataset, RentalRecord, Season, Weather};

/// Columns every input file must carry.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "datetime",
    "season",
    "workingday",
    "weather",
    "casual",
    "registered",
    "count",
];

/// Timestamp layouts accepted in the `datetime` column.
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a rental dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the bike-sharing columns (the usual `train.csv`)
/// * `.parquet` – same column names; `datetime` may be text or a timestamp
pub fn load_file(path: &Path) -> Result<RentalDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening CSV {}", path.display()))?;
            load_csv(file)
        }
        "parquet" | "pq" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening parquet file {}", path.display()))?;
            load_parquet(file)
        }
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    match dataset.span {
        Some((first, last)) => log::info!(
            "Loaded {} rental records from {} covering {first} to {last} ({} numeric columns)",
            dataset.len(),
            path.display(),
            dataset.numeric_columns.len()
        ),
        None => log::warn!("{} contains no rental records", path.display()),
    }
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Row decoding shared by both formats
// ---------------------------------------------------------------------------

/// One source row before derivation, exactly as the file spells it.
#[derive(Debug, Deserialize)]
struct RawRow {
    datetime: String,
    season: u8,
    #[serde(default)]
    holiday: Option<u8>,
    workingday: u8,
    weather: u8,
    #[serde(default)]
    temp: Option<f64>,
    #[serde(default)]
    atemp: Option<f64>,
    #[serde(default)]
    humidity: Option<f64>,
    #[serde(default)]
    windspeed: Option<f64>,
    casual: u32,
    registered: u32,
    count: u32,
}

fn parse_timestamp(s: &str) -> Result<NaiveDateTime, SchemaError> {
    let s = s.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| SchemaError::BadTimestamp(s.to_string()))
}

fn parse_flag(column: &'static str, v: u8) -> Result<bool, SchemaError> {
    match v {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(SchemaError::InvalidValue {
            column,
            value: other.to_string(),
        }),
    }
}

fn into_record(raw: RawRow) -> Result<RentalRecord, SchemaError> {
    let timestamp = parse_timestamp(&raw.datetime)?;
    let season = Season::from_code(raw.season)?;
    let weather = Weather::from_code(raw.weather)?;
    let working_day = parse_flag("workingday", raw.workingday)?;
    let holiday = raw.holiday.map(|h| parse_flag("holiday", h)).transpose()?;

    Ok(RentalRecord::new(timestamp, season, weather, working_day)
        .with_holiday(holiday)
        .with_conditions(raw.temp, raw.atemp, raw.humidity, raw.windspeed)
        .with_counts(raw.casual, raw.registered, raw.count))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Read CSV text with a header row. Optional columns may be absent or empty.
pub fn load_csv<R: Read>(input: R) -> Result<RentalDataset> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input);

    let headers = reader.headers().context("reading CSV headers")?.clone();
    for col in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == col) {
            return Err(SchemaError::MissingColumn(col).into());
        }
    }

    let mut records = Vec::new();
    for (row_no, result) in reader.deserialize::<RawRow>().enumerate() {
        // Row numbers are 1-based and skip the header, matching a spreadsheet.
        let line = row_no + 2;
        let raw = result.with_context(|| format!("CSV row {line}"))?;
        let rec = into_record(raw).with_context(|| format!("CSV row {line}"))?;
        records.push(rec);
    }

    Ok(RentalDataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with the bike-sharing columns.
///
/// Integer and float columns of any width are accepted (they are cast to
/// Float64 and checked on the way back to integers). `datetime` may be Utf8
/// or an Arrow timestamp; Pandas and Polars both write one of these.
pub fn load_parquet<T: ChunkReader + 'static>(input: T) -> Result<RentalDataset> {
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(input).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    let mut row_offset = 0usize;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let columns = BatchColumns::from_batch(&batch)?;

        for row in 0..batch.num_rows() {
            let line = row_offset + row;
            let rec = columns
                .raw_row(row)
                .and_then(into_record)
                .with_context(|| format!("parquet row {line}"))?;
            records.push(rec);
        }
        row_offset += batch.num_rows();
    }

    Ok(RentalDataset::from_records(records))
}

/// The bike-sharing columns of one record batch, cast to uniform types.
struct BatchColumns {
    datetime: StringArray,
    season: Float64Array,
    workingday: Float64Array,
    weather: Float64Array,
    casual: Float64Array,
    registered: Float64Array,
    count: Float64Array,
    holiday: Option<Float64Array>,
    temp: Option<Float64Array>,
    atemp: Option<Float64Array>,
    humidity: Option<Float64Array>,
    windspeed: Option<Float64Array>,
}

impl BatchColumns {
    fn from_batch(batch: &RecordBatch) -> Result<Self> {
        let schema = batch.schema();
        let column = |name: &str| schema.index_of(name).ok().map(|idx| batch.column(idx).clone());
        let required = |name: &'static str| -> Result<ArrayRef> {
            column(name).ok_or_else(|| SchemaError::MissingColumn(name).into())
        };
        let optional = |name: &'static str| -> Result<Option<Float64Array>> {
            column(name).map(|c| as_floats(&c)).transpose()
        };

        Ok(BatchColumns {
            datetime: as_strings(&required("datetime")?)?,
            season: as_floats(&required("season")?)?,
            workingday: as_floats(&required("workingday")?)?,
            weather: as_floats(&required("weather")?)?,
            casual: as_floats(&required("casual")?)?,
            registered: as_floats(&required("registered")?)?,
            count: as_floats(&required("count")?)?,
            holiday: optional("holiday")?,
            temp: optional("temp")?,
            atemp: optional("atemp")?,
            humidity: optional("humidity")?,
            windspeed: optional("windspeed")?,
        })
    }

    fn raw_row(&self, row: usize) -> Result<RawRow, SchemaError> {
        if self.datetime.is_null(row) {
            return Err(SchemaError::BadTimestamp("<null>".to_string()));
        }
        Ok(RawRow {
            datetime: self.datetime.value(row).to_string(),
            season: int_cell(&self.season, row, "season")?,
            holiday: optional_int(self.holiday.as_ref(), row, "holiday")?,
            workingday: int_cell(&self.workingday, row, "workingday")?,
            weather: int_cell(&self.weather, row, "weather")?,
            temp: float_cell(self.temp.as_ref(), row),
            atemp: float_cell(self.atemp.as_ref(), row),
            humidity: float_cell(self.humidity.as_ref(), row),
            windspeed: float_cell(self.windspeed.as_ref(), row),
            casual: int_cell(&self.casual, row, "casual")?,
            registered: int_cell(&self.registered, row, "registered")?,
            count: int_cell(&self.count, row, "count")?,
        })
    }
}

// -- Parquet / Arrow helpers --

fn as_floats(col: &ArrayRef) -> Result<Float64Array> {
    let cast = arrow::compute::cast(col.as_ref(), &DataType::Float64)
        .with_context(|| format!("cannot read {:?} column as numbers", col.data_type()))?;
    cast.as_any()
        .downcast_ref::<Float64Array>()
        .cloned()
        .context("expected Float64Array after cast")
}

fn as_strings(col: &ArrayRef) -> Result<StringArray> {
    let cast = arrow::compute::cast(col.as_ref(), &DataType::Utf8)
        .with_context(|| format!("cannot read {:?} column as text", col.data_type()))?;
    cast.as_any()
        .downcast_ref::<StringArray>()
        .cloned()
        .context("expected StringArray after cast")
}

fn float_cell(col: Option<&Float64Array>, row: usize) -> Option<f64> {
    let col = col?;
    if col.is_null(row) {
        None
    } else {
        Some(col.value(row))
    }
}

/// Convert a Float64 cell back into an integer type, rejecting fractions,
/// negatives, nulls and overflow.
fn int_cell<I: TryFrom<u64>>(col: &Float64Array, row: usize, column: &'static str) -> Result<I, SchemaError> {
    let invalid = |value: String| SchemaError::InvalidValue { column, value };
    if col.is_null(row) {
        return Err(invalid("<null>".to_string()));
    }
    let v = col.value(row);
    if !v.is_finite() || v < 0.0 || v.fract() != 0.0 || v > u64::MAX as f64 {
        return Err(invalid(v.to_string()));
    }
    I::try_from(v as u64).map_err(|_| invalid(v.to_string()))
}

fn optional_int(col: Option<&Float64Array>, row: usize, column: &'static str) -> Result<Option<u8>, SchemaError> {
    match col {
        Some(c) if !c.is_null(row) => int_cell(c, row, column).map(Some),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Int64Array, TimestampSecondArray};
    use arrow::datatypes::{Field, Schema, TimeUnit};
    use chrono::Weekday;
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::data::model::{DayPeriod, NumericColumn};

    const SAMPLE: &str = "\
datetime,season,holiday,workingday,weather,temp,atemp,humidity,windspeed,casual,registered,count
2011-01-01 00:00:00,1,0,0,1,9.84,14.395,81,0,3,13,16
2011-01-01 01:00:00,1,0,0,1,9.02,13.635,80,0,8,32,40
2012-07-04 17:00:00,3,1,0,2,33.62,40.15,59,,120,200,320
";

    #[test]
    fn test_load_csv_derives_fields() {
        let ds = load_csv(SAMPLE.as_bytes()).unwrap();

        assert_eq!(ds.len(), 3);
        let first = &ds.records[0];
        assert_eq!(first.year, 2011);
        assert_eq!(first.day_of_week, Weekday::Sat);
        assert_eq!(first.day_period, DayPeriod::Night);
        assert_eq!(first.season, Season::Spring);
        assert!(!first.working_day);
        assert_eq!(first.holiday, Some(false));
        assert_eq!(first.count, 16);

        let last = &ds.records[2];
        assert_eq!(last.season.name(), "fall");
        assert_eq!(last.weather, Weather::Mist);
        assert_eq!(last.day_period, DayPeriod::Afternoon);
        assert_eq!(last.windspeed, None);
        assert_eq!(last.holiday, Some(true));

        assert_eq!(ds.years.iter().copied().collect::<Vec<_>>(), vec![2011, 2012]);
        assert_eq!(ds.numeric_columns.len(), NumericColumn::ALL.len());
    }

    #[test]
    fn test_load_csv_without_optional_columns() {
        let text = "datetime,season,workingday,weather,casual,registered,count\n\
                    2011-03-01 08:00:00,1,1,1,2,50,52\n";
        let ds = load_csv(text.as_bytes()).unwrap();

        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].temp, None);
        assert!(!ds.numeric_columns.contains(&NumericColumn::Temp));
        assert!(!ds.numeric_columns.contains(&NumericColumn::Holiday));
    }

    #[test]
    fn test_load_csv_missing_column() {
        let text = "datetime,season,workingday,casual,registered,count\n";
        let err = load_csv(text.as_bytes()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SchemaError>(),
            Some(&SchemaError::MissingColumn("weather"))
        );
    }

    #[test]
    fn test_load_csv_bad_rows_report_line() {
        let text = "datetime,season,workingday,weather,casual,registered,count\n\
                    2011-03-01 08:00:00,1,1,1,2,50,52\n\
                    yesterday,1,1,1,2,50,52\n";
        let err = load_csv(text.as_bytes()).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("CSV row 3"), "{msg}");
        assert!(msg.contains("yesterday"), "{msg}");

        let text = "datetime,season,workingday,weather,casual,registered,count\n\
                    2011-03-01 08:00:00,7,1,1,2,50,52\n";
        let err = load_csv(text.as_bytes()).unwrap_err();
        assert_eq!(err.downcast_ref::<SchemaError>(), Some(&SchemaError::UnknownSeason(7)));
    }

    #[test]
    fn test_parse_timestamp_variants() {
        assert!(parse_timestamp("2011-01-01 05:00:00").is_ok());
        assert!(parse_timestamp("2011-01-01T05:00:00").is_ok());
        assert!(parse_timestamp("2011-01-01 05:00").is_ok());
        assert!(parse_timestamp("01/01/2011").is_err());
    }

    #[test]
    fn test_load_file_rejects_unknown_extension() {
        let err = load_file(Path::new("rentals.xlsx")).unwrap_err();
        assert!(format!("{err:#}").contains("Unsupported file extension: .xlsx"));
    }

    /// Write `batch` to a temporary Parquet file and load it back.
    fn parquet_roundtrip(tag: &str, batch: &RecordBatch) -> Result<RentalDataset> {
        let path = std::env::temp_dir().join(format!("bike-dash-{tag}-{}.parquet", std::process::id()));
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(batch).unwrap();
        writer.close().unwrap();

        let result = load_parquet(std::fs::File::open(&path).unwrap());
        std::fs::remove_file(&path).ok();
        result
    }

    /// One row with a text `datetime` and Float64 numeric columns.
    fn text_row(datetime: Option<&str>, weather: f64, casual: Option<f64>, count: f64) -> RecordBatch {
        let floats = |v: f64| -> ArrayRef { Arc::new(Float64Array::from(vec![v])) };
        RecordBatch::try_from_iter(vec![
            ("datetime", Arc::new(StringArray::from(vec![datetime])) as ArrayRef),
            ("season", floats(2.0)),
            ("workingday", floats(1.0)),
            ("weather", floats(weather)),
            ("casual", Arc::new(Float64Array::from(vec![casual])) as ArrayRef),
            ("registered", floats(10.0)),
            ("count", floats(count)),
        ])
        .unwrap()
    }

    #[test]
    fn test_load_parquet_with_text_datetime() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("datetime", DataType::Utf8, false),
            Field::new("season", DataType::Int64, false),
            Field::new("holiday", DataType::Int64, false),
            Field::new("workingday", DataType::Int64, false),
            Field::new("weather", DataType::Int64, false),
            Field::new("humidity", DataType::Float64, false),
            Field::new("casual", DataType::Int64, false),
            Field::new("registered", DataType::Int64, false),
            Field::new("count", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["2012-07-04 17:00:00", "2012-07-05 06:00:00"])),
                Arc::new(Int64Array::from(vec![3, 3])),
                Arc::new(Int64Array::from(vec![1, 0])),
                Arc::new(Int64Array::from(vec![0, 1])),
                Arc::new(Int64Array::from(vec![2, 1])),
                Arc::new(Float64Array::from(vec![59.0, 71.0])),
                Arc::new(Int64Array::from(vec![120, 5])),
                Arc::new(Int64Array::from(vec![200, 95])),
                Arc::new(Int64Array::from(vec![320, 100])),
            ],
        )
        .unwrap();

        let ds = parquet_roundtrip("text", &batch).unwrap();

        assert_eq!(ds.len(), 2);
        let first = &ds.records[0];
        assert_eq!(first.year, 2012);
        assert_eq!(first.day_of_week, Weekday::Wed);
        assert_eq!(first.day_period, DayPeriod::Afternoon);
        assert_eq!(first.season, Season::Fall);
        assert_eq!(first.weather, Weather::Mist);
        assert_eq!(first.holiday, Some(true));
        assert_eq!(first.humidity, Some(59.0));
        assert_eq!(ds.records[1].day_period, DayPeriod::Morning);
        assert!(ds.records[1].working_day);
        assert!(ds.numeric_columns.contains(&NumericColumn::Humidity));
        assert!(!ds.numeric_columns.contains(&NumericColumn::Temp));
    }

    #[test]
    fn test_load_parquet_rejects_invalid_cells() {
        let schema_error = |tag: &str, batch: RecordBatch| -> SchemaError {
            let err = parquet_roundtrip(tag, &batch).unwrap_err();
            assert!(format!("{err:#}").contains("parquet row 0"), "{err:#}");
            err.downcast_ref::<SchemaError>().cloned().unwrap()
        };

        assert_eq!(
            schema_error("fraction", text_row(Some("2011-05-02 08:00:00"), 1.0, Some(3.0), 1.5)),
            SchemaError::InvalidValue { column: "count", value: "1.5".to_string() }
        );
        assert_eq!(
            schema_error("negative", text_row(Some("2011-05-02 08:00:00"), 1.0, Some(-2.0), 8.0)),
            SchemaError::InvalidValue { column: "casual", value: "-2".to_string() }
        );
        assert_eq!(
            schema_error("null-cell", text_row(Some("2011-05-02 08:00:00"), 1.0, None, 8.0)),
            SchemaError::InvalidValue { column: "casual", value: "<null>".to_string() }
        );
        assert_eq!(
            schema_error("weather", text_row(Some("2011-05-02 08:00:00"), 9.0, Some(3.0), 13.0)),
            SchemaError::UnknownWeather(9)
        );
        assert_eq!(
            schema_error("null-time", text_row(None, 1.0, Some(3.0), 13.0)),
            SchemaError::BadTimestamp("<null>".to_string())
        );
        assert!(matches!(
            schema_error("bad-time", text_row(Some("noon"), 1.0, Some(3.0), 13.0)),
            SchemaError::BadTimestamp(_)
        ));
    }

    #[test]
    fn test_load_parquet_with_timestamp_column() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("datetime", DataType::Timestamp(TimeUnit::Second, None), false),
            Field::new("season", DataType::Int64, false),
            Field::new("workingday", DataType::Int64, false),
            Field::new("weather", DataType::Int64, false),
            Field::new("temp", DataType::Float64, true),
            Field::new("casual", DataType::Int64, false),
            Field::new("registered", DataType::Int64, false),
            Field::new("count", DataType::Int64, false),
        ]));
        // 2011-01-03 08:00:00 and 2011-01-03 09:00:00 UTC
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(TimestampSecondArray::from(vec![1_294_041_600, 1_294_045_200])),
                Arc::new(Int64Array::from(vec![1, 1])),
                Arc::new(Int64Array::from(vec![1, 1])),
                Arc::new(Int64Array::from(vec![1, 3])),
                Arc::new(Float64Array::from(vec![Some(6.5), None])),
                Arc::new(Int64Array::from(vec![4, 2])),
                Arc::new(Int64Array::from(vec![90, 40])),
                Arc::new(Int64Array::from(vec![94, 42])),
            ],
        )
        .unwrap();

        let ds = parquet_roundtrip("timestamp", &batch).unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].hour, 8);
        assert_eq!(ds.records[0].day_of_week, Weekday::Mon);
        assert_eq!(ds.records[0].temp, Some(6.5));
        assert_eq!(ds.records[1].weather, Weather::LightPrecipitation);
        assert_eq!(ds.records[1].count, 42);
        assert!(ds.numeric_columns.contains(&NumericColumn::Temp));
    }
}
