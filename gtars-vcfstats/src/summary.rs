//! Turns the accumulated tables into flat summary rows.

use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::accumulate::StatsAccumulator;
use crate::models::{Attribute, StatValue, SummaryRow};

pub const COUNT_LABEL: &str = "count";
pub const MEAN_LABEL: &str = "mean";

/// Reported percentiles and their statistic labels, in ascending order.
pub const PERCENTILES: [(&str, f64); 7] = [
    ("pct_01", 1.0),
    ("pct_05", 5.0),
    ("Q1_pct_25", 25.0),
    ("median_pct_50", 50.0),
    ("Q3_pct_75", 75.0),
    ("pct_95", 95.0),
    ("pct_99", 99.0),
];

/// How a percentile is scored from a finite sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PercentileMethod {
    /// The smallest observation with at least `p` percent of the sample at or below it.
    #[default]
    NearestRank,
    /// Linear interpolation between the two observations bracketing the
    /// fractional index `p / 100 * (n - 1)`.
    Fraction,
}

impl FromStr for PercentileMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nearest-rank" | "nearest_rank" => Ok(PercentileMethod::NearestRank),
            "fraction" => Ok(PercentileMethod::Fraction),
            _ => Err(format!(
                "Unknown percentile method '{}', expected 'nearest-rank' or 'fraction'",
                s
            )),
        }
    }
}

impl fmt::Display for PercentileMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PercentileMethod::NearestRank => write!(f, "nearest-rank"),
            PercentileMethod::Fraction => write!(f, "fraction"),
        }
    }
}

/// Score of `sorted` at percentile `pct` (0-100). `sorted` must be non-empty and ascending.
pub fn score_at_percentile(sorted: &[f64], pct: f64, method: PercentileMethod) -> f64 {
    let n = sorted.len();
    match method {
        PercentileMethod::NearestRank => {
            let rank = (pct / 100.0 * n as f64).ceil() as usize;
            sorted[rank.clamp(1, n) - 1]
        }
        PercentileMethod::Fraction => {
            let idx = pct / 100.0 * (n - 1) as f64;
            let lower = idx.floor() as usize;
            let frac = idx - lower as f64;
            match sorted.get(lower + 1) {
                Some(upper) if frac > 0.0 => sorted[lower] + (upper - sorted[lower]) * frac,
                _ => sorted[lower],
            }
        }
    }
}

/// Round a statistic the way its attribute is reported: whole numbers for
/// length and support, four decimals for everything else. Ties go to even.
pub fn normalize_value(attribute: &Attribute, value: f64) -> StatValue {
    if attribute.is_integral() {
        StatValue::Integer(value.round_ties_even() as i64)
    } else {
        StatValue::Float((value * 10_000.0).round_ties_even() / 10_000.0)
    }
}

/// Mean followed by the [`PERCENTILES`], each paired with its label.
/// Returns `None` for an empty sample.
pub fn describe(values: &[f64], method: PercentileMethod) -> Option<Vec<(&'static str, f64)>> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;
    let mut described = Vec::with_capacity(PERCENTILES.len() + 1);
    described.push((MEAN_LABEL, mean));
    for (label, pct) in PERCENTILES {
        described.push((label, score_at_percentile(&sorted, pct, method)));
    }
    Some(described)
}

/// Flatten counts and distributions into summary rows.
///
/// Count rows come first, then eight rows (mean and percentiles) per distribution.
pub fn build_summary(stats: &StatsAccumulator, method: PercentileMethod) -> Vec<SummaryRow> {
    let mut summary: Vec<SummaryRow> = stats
        .counts
        .iter()
        .map(|(key, count)| SummaryRow::from_key(key, COUNT_LABEL, StatValue::Integer(*count as i64)))
        .collect();

    for (key, values) in &stats.aggregates {
        debug!(
            "{} {} {} {} {}: {} observations",
            key.location,
            key.filter_status,
            key.call_type,
            key.variant_type,
            key.attribute.label(),
            values.len()
        );
        let Some(described) = describe(values, method) else {
            continue;
        };
        summary.extend(described.into_iter().map(|(label, value)| {
            SummaryRow::from_key(key, label, normalize_value(&key.attribute, value))
        }));
    }

    summary
}
