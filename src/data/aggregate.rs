use std::collections::BTreeMap;

use chrono::Weekday;
use serde::Serialize;

use super::filter::TargetMetric;
use super::model::{DayPeriod, NumericColumn, RentalDataset, RentalRecord, Season, Weather, weekday_name};

// ---------------------------------------------------------------------------
// Running accumulator
// ---------------------------------------------------------------------------

/// Count, sum, extrema and a Welford running variance.
///
/// The mean is always `sum / n`, so it does not depend on row order when the
/// values are integers (exact in f64 below 2^53). The running mean is only
/// used for the variance update.
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    n: usize,
    sum: f64,
    running_mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl Accumulator {
    fn push(&mut self, x: f64) {
        if self.n == 0 {
            self.min = x;
            self.max = x;
        } else {
            self.min = self.min.min(x);
            self.max = self.max.max(x);
        }
        self.n += 1;
        self.sum += x;
        let delta = x - self.running_mean;
        self.running_mean += delta / self.n as f64;
        self.m2 += delta * (x - self.running_mean);
    }

    /// `sum / n` for a group known to be non-empty.
    fn average(&self) -> f64 {
        self.sum / self.n as f64
    }

    fn mean(&self) -> Option<f64> {
        (self.n > 0).then(|| self.average())
    }

    /// Sample standard deviation (n - 1 denominator).
    fn std(&self) -> Option<f64> {
        (self.n > 1).then(|| (self.m2 / (self.n - 1) as f64).sqrt())
    }
}

fn grouped<K: Ord>(
    dataset: &RentalDataset,
    indices: &[usize],
    target: TargetMetric,
    key: impl Fn(&RentalRecord) -> K,
) -> BTreeMap<K, Accumulator> {
    let mut groups: BTreeMap<K, Accumulator> = BTreeMap::new();
    for &i in indices {
        let rec = &dataset.records[i];
        groups.entry(key(rec)).or_default().push(target.value(rec) as f64);
    }
    groups
}

// ---------------------------------------------------------------------------
// Scalar KPIs
// ---------------------------------------------------------------------------

/// Sum of the target metric over the filtered rows. Zero when empty.
pub fn total(dataset: &RentalDataset, indices: &[usize], target: TargetMetric) -> u64 {
    indices
        .iter()
        .map(|&i| target.value(&dataset.records[i]) as u64)
        .sum()
}

/// Mean of the target metric per row, `None` when there are no rows.
pub fn mean(dataset: &RentalDataset, indices: &[usize], target: TargetMetric) -> Option<f64> {
    if indices.is_empty() {
        return None;
    }
    Some(total(dataset, indices, target) as f64 / indices.len() as f64)
}

// ---------------------------------------------------------------------------
// Group-by means
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourStat {
    pub hour: u32,
    pub mean: f64,
    pub std: Option<f64>,
    pub rows: usize,
}

/// Mean, sample std and row count per hour present in the filtered rows,
/// ascending by hour.
pub fn hourly_stats(dataset: &RentalDataset, indices: &[usize], target: TargetMetric) -> Vec<HourStat> {
    grouped(dataset, indices, target, |r| r.hour)
        .into_iter()
        .map(|(hour, acc)| HourStat {
            hour,
            mean: acc.average(),
            std: acc.std(),
            rows: acc.n,
        })
        .collect()
}

/// Hour with the highest mean. Ties go to the earliest hour.
pub fn peak_hour(hourly: &[HourStat]) -> Option<u32> {
    let mut best: Option<&HourStat> = None;
    for stat in hourly {
        match best {
            Some(b) if stat.mean <= b.mean => {}
            _ => best = Some(stat),
        }
    }
    best.map(|s| s.hour)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean<K> {
    pub key: K,
    pub mean: Option<f64>,
    pub rows: usize,
}

/// Mean per day period, always four entries in night → evening order.
pub fn period_means(dataset: &RentalDataset, indices: &[usize], target: TargetMetric) -> Vec<GroupMean<DayPeriod>> {
    let groups = grouped(dataset, indices, target, |r| r.day_period);
    DayPeriod::ALL
        .iter()
        .map(|p| {
            let acc = groups.get(p).copied().unwrap_or_default();
            GroupMean {
                key: *p,
                mean: acc.mean(),
                rows: acc.n,
            }
        })
        .collect()
}

/// Groups present in the rows, sorted by mean descending. Equal means keep
/// ascending key order.
fn ranked<K: Ord + Copy>(groups: BTreeMap<K, Accumulator>) -> Vec<GroupMean<K>> {
    let mut out: Vec<GroupMean<K>> = groups
        .into_iter()
        .map(|(key, acc)| GroupMean {
            key,
            mean: acc.mean(),
            rows: acc.n,
        })
        .collect();
    // Stable sort keeps the BTreeMap key order among ties.
    out.sort_by(|a, b| b.mean.unwrap_or(f64::NEG_INFINITY).total_cmp(&a.mean.unwrap_or(f64::NEG_INFINITY)));
    out
}

pub fn season_means(dataset: &RentalDataset, indices: &[usize], target: TargetMetric) -> Vec<GroupMean<Season>> {
    ranked(grouped(dataset, indices, target, |r| r.season))
}

pub fn weather_means(dataset: &RentalDataset, indices: &[usize], target: TargetMetric) -> Vec<GroupMean<Weather>> {
    ranked(grouped(dataset, indices, target, |r| r.weather))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdaySeries {
    pub day: Weekday,
    pub name: &'static str,
    /// `(hour, mean)` ascending by hour.
    pub points: Vec<(u32, f64)>,
}

/// One hourly-mean series per weekday present, Monday first.
pub fn weekday_hour_means(dataset: &RentalDataset, indices: &[usize], target: TargetMetric) -> Vec<WeekdaySeries> {
    let groups = grouped(dataset, indices, target, |r| {
        (r.day_of_week.num_days_from_monday(), r.hour)
    });

    let mut series: Vec<WeekdaySeries> = Vec::new();
    for ((day_no, hour), acc) in groups {
        let day = weekday_from_monday(day_no);
        match series.last_mut() {
            Some(s) if s.day == day => s.points.push((hour, acc.average())),
            _ => series.push(WeekdaySeries {
                day,
                name: weekday_name(day),
                points: vec![(hour, acc.average())],
            }),
        }
    }
    series
}

fn weekday_from_monday(n: u32) -> Weekday {
    match n {
        0 => Weekday::Mon,
        1 => Weekday::Tue,
        2 => Weekday::Wed,
        3 => Weekday::Thu,
        4 => Weekday::Fri,
        5 => Weekday::Sat,
        _ => Weekday::Sun,
    }
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson correlation over numeric columns. `values[i][j]` pairs
/// `columns[i]` with `columns[j]`; `None` where a column has no variance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<NumericColumn>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i).and_then(|row| row.get(j)).copied().flatten()
    }
}

/// Pairwise-complete Pearson coefficient, `None` if either side is constant
/// (which covers fewer than two pairs).
fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    let (x0, y0) = *pairs.first()?;
    if pairs.iter().all(|(x, _)| *x == x0) || pairs.iter().all(|(_, y)| *y == y0) {
        return None;
    }
    let n = pairs.len() as f64;
    let (sx, sy) = pairs.iter().fold((0.0, 0.0), |(a, b), (x, y)| (a + x, b + y));
    let (mx, my) = (sx / n, sy / n);

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in pairs {
        let (dx, dy) = (x - mx, y - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

/// Correlation matrix over `columns`, skipped with fewer than two columns or
/// no rows.
pub fn correlation_matrix(
    dataset: &RentalDataset,
    indices: &[usize],
    columns: &[NumericColumn],
) -> Option<CorrelationMatrix> {
    if columns.len() < 2 || indices.is_empty() {
        return None;
    }

    let data: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|c| indices.iter().map(|&i| c.value(&dataset.records[i])).collect())
        .collect();

    let k = columns.len();
    let mut values = vec![vec![None; k]; k];
    for i in 0..k {
        for j in i..k {
            let pairs: Vec<(f64, f64)> = data[i]
                .iter()
                .zip(&data[j])
                .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
                .collect();
            let r = pearson(&pairs);
            // Exact unit diagonal for any column that varies.
            let r = if i == j { r.map(|_| 1.0) } else { r };
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Some(CorrelationMatrix {
        columns: columns.to_vec(),
        values,
    })
}

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub column: NumericColumn,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Count / mean / std / min / max for each column over the filtered rows.
pub fn describe(dataset: &RentalDataset, indices: &[usize], columns: &[NumericColumn]) -> Vec<ColumnStats> {
    columns
        .iter()
        .map(|&column| {
            let mut acc = Accumulator::default();
            for &i in indices {
                if let Some(v) = column.value(&dataset.records[i]) {
                    acc.push(v);
                }
            }
            ColumnStats {
                column,
                count: acc.n,
                mean: acc.mean(),
                std: acc.std(),
                min: (acc.n > 0).then_some(acc.min),
                max: (acc.n > 0).then_some(acc.max),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// DashboardSummary – everything the panels draw for one filter state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub target: TargetMetric,
    pub rows: usize,
    pub total: u64,
    pub mean: Option<f64>,
    pub peak_hour: Option<u32>,
    pub hourly: Vec<HourStat>,
    pub by_period: Vec<GroupMean<DayPeriod>>,
    pub by_weekday_hour: Vec<WeekdaySeries>,
    pub by_season: Vec<GroupMean<Season>>,
    pub by_weather: Vec<GroupMean<Weather>>,
    pub correlation: Option<CorrelationMatrix>,
    pub describe: Vec<ColumnStats>,
}

impl DashboardSummary {
    pub fn compute(dataset: &RentalDataset, indices: &[usize], target: TargetMetric) -> Self {
        let hourly = hourly_stats(dataset, indices, target);
        let peak_hour = peak_hour(&hourly);
        DashboardSummary {
            target,
            rows: indices.len(),
            total: total(dataset, indices, target),
            mean: mean(dataset, indices, target),
            peak_hour,
            hourly,
            by_period: period_means(dataset, indices, target),
            by_weekday_hour: weekday_hour_means(dataset, indices, target),
            by_season: season_means(dataset, indices, target),
            by_weather: weather_means(dataset, indices, target),
            correlation: correlation_matrix(dataset, indices, &dataset.numeric_columns),
            describe: describe(dataset, indices, &dataset.numeric_columns),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
}
