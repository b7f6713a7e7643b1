use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::Serialize;

use super::error::SchemaError;

// ---------------------------------------------------------------------------
// Season – coded 1..=4 in the source data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub fn from_code(code: u8) -> Result<Self, SchemaError> {
        match code {
            1 => Ok(Season::Spring),
            2 => Ok(Season::Summer),
            3 => Ok(Season::Fall),
            4 => Ok(Season::Winter),
            other => Err(SchemaError::UnknownSeason(other)),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Season::Spring => 1,
            Season::Summer => 2,
            Season::Fall => 3,
            Season::Winter => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
            Season::Winter => "winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Weather – coded 1..=4, from clear (1) to heavy precipitation (4)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Clear,
    Mist,
    LightPrecipitation,
    HeavyPrecipitation,
}

impl Weather {
    pub fn from_code(code: u8) -> Result<Self, SchemaError> {
        match code {
            1 => Ok(Weather::Clear),
            2 => Ok(Weather::Mist),
            3 => Ok(Weather::LightPrecipitation),
            4 => Ok(Weather::HeavyPrecipitation),
            other => Err(SchemaError::UnknownWeather(other)),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Weather::Clear => 1,
            Weather::Mist => 2,
            Weather::LightPrecipitation => 3,
            Weather::HeavyPrecipitation => 4,
        }
    }

    /// Short human label, prefixed with the source code.
    pub fn label(self) -> &'static str {
        match self {
            Weather::Clear => "1 · clear",
            Weather::Mist => "2 · mist / cloudy",
            Weather::LightPrecipitation => "3 · light rain / snow",
            Weather::HeavyPrecipitation => "4 · heavy rain / ice",
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// DayPeriod – coarse bucket of the hour of day
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPeriod {
    Night,
    Morning,
    Afternoon,
    Evening,
}

impl DayPeriod {
    /// Display order used by every chart.
    pub const ALL: [DayPeriod; 4] = [
        DayPeriod::Night,
        DayPeriod::Morning,
        DayPeriod::Afternoon,
        DayPeriod::Evening,
    ];

    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=5 => DayPeriod::Night,
            6..=11 => DayPeriod::Morning,
            12..=17 => DayPeriod::Afternoon,
            _ => DayPeriod::Evening,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DayPeriod::Night => "night",
            DayPeriod::Morning => "morning",
            DayPeriod::Afternoon => "afternoon",
            DayPeriod::Evening => "evening",
        }
    }
}

impl fmt::Display for DayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Full English weekday name, as shown in chart legends.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

// ---------------------------------------------------------------------------
// RentalRecord – one hourly row
// ---------------------------------------------------------------------------

/// One hour of rentals plus the calendar features derived from its timestamp.
///
/// The derived fields are filled in by [`RentalRecord::new`] and never
/// change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RentalRecord {
    pub timestamp: NaiveDateTime,
    pub season: Season,
    pub weather: Weather,
    pub working_day: bool,
    pub holiday: Option<bool>,
    pub temp: Option<f64>,
    pub atemp: Option<f64>,
    pub humidity: Option<f64>,
    pub windspeed: Option<f64>,
    pub casual: u32,
    pub registered: u32,
    pub count: u32,

    // Derived
    pub year: i32,
    pub month: u32,
    pub hour: u32,
    pub day_of_week: Weekday,
    pub day_period: DayPeriod,
}

impl RentalRecord {
    /// Build a record with zero counts and no weather measurements.
    pub fn new(timestamp: NaiveDateTime, season: Season, weather: Weather, working_day: bool) -> Self {
        let hour = timestamp.hour();
        RentalRecord {
            timestamp,
            season,
            weather,
            working_day,
            holiday: None,
            temp: None,
            atemp: None,
            humidity: None,
            windspeed: None,
            casual: 0,
            registered: 0,
            count: 0,
            year: timestamp.year(),
            month: timestamp.month(),
            hour,
            day_of_week: timestamp.weekday(),
            day_period: DayPeriod::from_hour(hour),
        }
    }

    pub fn with_counts(mut self, casual: u32, registered: u32, count: u32) -> Self {
        self.casual = casual;
        self.registered = registered;
        self.count = count;
        self
    }

    pub fn with_holiday(mut self, holiday: Option<bool>) -> Self {
        self.holiday = holiday;
        self
    }

    pub fn with_conditions(
        mut self,
        temp: Option<f64>,
        atemp: Option<f64>,
        humidity: Option<f64>,
        windspeed: Option<f64>,
    ) -> Self {
        self.temp = temp;
        self.atemp = atemp;
        self.humidity = humidity;
        self.windspeed = windspeed;
        self
    }
}

// ---------------------------------------------------------------------------
// NumericColumn – columns usable for correlation / describe
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericColumn {
    Season,
    Holiday,
    WorkingDay,
    Weather,
    Temp,
    ATemp,
    Humidity,
    WindSpeed,
    Casual,
    Registered,
    Count,
    Year,
    Month,
    Hour,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 14] = [
        NumericColumn::Season,
        NumericColumn::Holiday,
        NumericColumn::WorkingDay,
        NumericColumn::Weather,
        NumericColumn::Temp,
        NumericColumn::ATemp,
        NumericColumn::Humidity,
        NumericColumn::WindSpeed,
        NumericColumn::Casual,
        NumericColumn::Registered,
        NumericColumn::Count,
        NumericColumn::Year,
        NumericColumn::Month,
        NumericColumn::Hour,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NumericColumn::Season => "season",
            NumericColumn::Holiday => "holiday",
            NumericColumn::WorkingDay => "workingday",
            NumericColumn::Weather => "weather",
            NumericColumn::Temp => "temp",
            NumericColumn::ATemp => "atemp",
            NumericColumn::Humidity => "humidity",
            NumericColumn::WindSpeed => "windspeed",
            NumericColumn::Casual => "casual",
            NumericColumn::Registered => "registered",
            NumericColumn::Count => "count",
            NumericColumn::Year => "year",
            NumericColumn::Month => "month",
            NumericColumn::Hour => "hour",
        }
    }

    /// Columns the input file may leave out entirely.
    pub fn is_optional(self) -> bool {
        matches!(
            self,
            NumericColumn::Holiday
                | NumericColumn::Temp
                | NumericColumn::ATemp
                | NumericColumn::Humidity
                | NumericColumn::WindSpeed
        )
    }

    /// The value of this column for a record, `None` when missing.
    pub fn value(self, rec: &RentalRecord) -> Option<f64> {
        match self {
            NumericColumn::Season => Some(rec.season.code() as f64),
            NumericColumn::Holiday => rec.holiday.map(|h| if h { 1.0 } else { 0.0 }),
            NumericColumn::WorkingDay => Some(if rec.working_day { 1.0 } else { 0.0 }),
            NumericColumn::Weather => Some(rec.weather.code() as f64),
            NumericColumn::Temp => rec.temp,
            NumericColumn::ATemp => rec.atemp,
            NumericColumn::Humidity => rec.humidity,
            NumericColumn::WindSpeed => rec.windspeed,
            NumericColumn::Casual => Some(rec.casual as f64),
            NumericColumn::Registered => Some(rec.registered as f64),
            NumericColumn::Count => Some(rec.count as f64),
            NumericColumn::Year => Some(rec.year as f64),
            NumericColumn::Month => Some(rec.month as f64),
            NumericColumn::Hour => Some(rec.hour as f64),
        }
    }
}

impl fmt::Display for NumericColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// RentalDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed value indices for the filters.
#[derive(Debug, Clone)]
pub struct RentalDataset {
    /// All records (rows), in file order.
    pub records: Vec<RentalRecord>,
    /// Numeric columns present in the data, in display order.
    pub numeric_columns: Vec<NumericColumn>,
    pub years: BTreeSet<i32>,
    pub seasons: BTreeSet<Season>,
    pub weathers: BTreeSet<Weather>,
    /// Earliest and latest timestamp, `None` for an empty dataset.
    pub span: Option<(NaiveDateTime, NaiveDateTime)>,
}

impl RentalDataset {
    /// Build the value indices from loaded records.
    ///
    /// An optional column counts as present when at least one record has a
    /// value for it.
    pub fn from_records(records: Vec<RentalRecord>) -> Self {
        let mut years = BTreeSet::new();
        let mut seasons = BTreeSet::new();
        let mut weathers = BTreeSet::new();
        let mut present: BTreeSet<NumericColumn> = BTreeSet::new();
        let mut span: Option<(NaiveDateTime, NaiveDateTime)> = None;

        for rec in &records {
            span = Some(match span {
                None => (rec.timestamp, rec.timestamp),
                Some((first, last)) => (first.min(rec.timestamp), last.max(rec.timestamp)),
            });
            years.insert(rec.year);
            seasons.insert(rec.season);
            weathers.insert(rec.weather);
            for col in NumericColumn::ALL.iter().filter(|c| c.is_optional()) {
                if col.value(rec).is_some() {
                    present.insert(*col);
                }
            }
        }

        let numeric_columns = NumericColumn::ALL
            .iter()
            .copied()
            .filter(|c| !c.is_optional() || present.contains(c))
            .collect();

        RentalDataset {
            records,
            numeric_columns,
            years,
            seasons,
            weathers,
            span,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_derived_fields() {
        let rec = RentalRecord::new(ts("2011-01-03 08:00:00"), Season::Spring, Weather::Clear, true);

        assert_eq!(rec.year, 2011);
        assert_eq!(rec.month, 1);
        assert_eq!(rec.hour, 8);
        assert_eq!(rec.day_of_week, Weekday::Mon);
        assert_eq!(weekday_name(rec.day_of_week), "Monday");
        assert_eq!(rec.day_period, DayPeriod::Morning);
        assert_eq!(rec.season.name(), "spring");
    }

    #[test]
    fn test_day_period_boundaries() {
        assert_eq!(DayPeriod::from_hour(0), DayPeriod::Night);
        assert_eq!(DayPeriod::from_hour(5), DayPeriod::Night);
        assert_eq!(DayPeriod::from_hour(6), DayPeriod::Morning);
        assert_eq!(DayPeriod::from_hour(11), DayPeriod::Morning);
        assert_eq!(DayPeriod::from_hour(12), DayPeriod::Afternoon);
        assert_eq!(DayPeriod::from_hour(17), DayPeriod::Afternoon);
        assert_eq!(DayPeriod::from_hour(18), DayPeriod::Evening);
        assert_eq!(DayPeriod::from_hour(23), DayPeriod::Evening);
    }

    #[test]
    fn test_season_codes() {
        for season in [Season::Spring, Season::Summer, Season::Fall, Season::Winter] {
            assert_eq!(Season::from_code(season.code()), Ok(season));
        }
        assert_eq!(Season::from_code(4).map(Season::name), Ok("winter"));
        assert_eq!(Season::from_code(0), Err(SchemaError::UnknownSeason(0)));
        assert_eq!(Weather::from_code(5), Err(SchemaError::UnknownWeather(5)));
    }

    #[test]
    fn test_optional_columns_detected_from_values() {
        let bare = RentalRecord::new(ts("2011-01-01 00:00:00"), Season::Spring, Weather::Clear, false);
        let measured = bare.clone().with_conditions(Some(9.84), None, Some(81.0), None);

        let ds = RentalDataset::from_records(vec![bare.clone()]);
        assert!(!ds.numeric_columns.contains(&NumericColumn::Temp));
        assert!(ds.numeric_columns.contains(&NumericColumn::Count));
        assert_eq!(ds.numeric_columns.len(), 9);

        let ds = RentalDataset::from_records(vec![bare, measured]);
        assert!(ds.numeric_columns.contains(&NumericColumn::Temp));
        assert!(ds.numeric_columns.contains(&NumericColumn::Humidity));
        assert!(!ds.numeric_columns.contains(&NumericColumn::ATemp));
        assert_eq!(ds.years.iter().copied().collect::<Vec<_>>(), vec![2011]);
        assert_eq!(ds.span, Some((ts("2011-01-01 00:00:00"), ts("2011-01-01 00:00:00"))));
        assert_eq!(RentalDataset::from_records(Vec::new()).span, None);
    }
}
