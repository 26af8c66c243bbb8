// =============================================================================
// Returns, Correlation & Significant Moves
// =============================================================================
//
//   daily_return_i      = close_i / close_{i-1} - 1        (undefined at 0)
//   cumulative_return_i = prod_{j <= i} (1 + r_j) - 1       (undefined r => 1 + 0)
//
// Correlation is the Pearson coefficient of two daily-return series joined
// on date. Significant moves are days whose absolute percentage change
// exceeds a threshold.
// =============================================================================

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::series::DerivedSeries;

/// Simple daily returns, one per close. Undefined at index 0 and wherever the
/// previous close is zero.
pub fn daily_returns(closes: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(closes.len());
    for (i, &close) in closes.iter().enumerate() {
        if i == 0 {
            out.push(None);
            continue;
        }
        let prev = closes[i - 1];
        let r = close / prev - 1.0;
        out.push((prev != 0.0 && r.is_finite()).then_some(r));
    }
    out
}

/// Compounded return since the first bar. Always defined; 0 at index 0.
pub fn cumulative_returns(returns: &[Option<f64>]) -> Vec<f64> {
    let mut growth = 1.0;
    returns
        .iter()
        .map(|r| {
            growth *= 1.0 + r.unwrap_or(0.0);
            growth - 1.0
        })
        .collect()
}

/// Pearson correlation of two equally long samples.
///
/// Returns `None` with fewer than two pairs or when either side has zero
/// variance. Variance that is only rounding noise relative to the size of
/// the values counts as zero.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);

    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if is_flat(sxx, xs) || is_flat(syy, ys) {
        return None;
    }
    let r = sxy / (sxx.sqrt() * syy.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Whether a sum of squared deviations is indistinguishable from zero at
/// f64 precision for a sample of this magnitude.
fn is_flat(sum_sq_dev: f64, values: &[f64]) -> bool {
    let sum_sq: f64 = values.iter().map(|v| v * v).sum();
    sum_sq_dev <= f64::EPSILON * values.len() as f64 * sum_sq
}

/// Date-joined pairs where both series are defined, in `a`'s date order.
pub fn joined_pairs(a: &DerivedSeries, b: &DerivedSeries) -> (Vec<f64>, Vec<f64>) {
    let lookup: HashMap<NaiveDate, f64> = b
        .points
        .iter()
        .filter_map(|p| p.value.map(|v| (p.date, v)))
        .collect();

    a.points
        .iter()
        .filter_map(|p| {
            let x = p.value?;
            let y = lookup.get(&p.date)?;
            Some((x, *y))
        })
        .unzip()
}

/// Correlation of two daily-return series over their common defined dates.
pub fn correlation(a: &DerivedSeries, b: &DerivedSeries) -> Option<f64> {
    let (xs, ys) = joined_pairs(a, b);
    pearson(&xs, &ys)
}

/// A day whose close moved more than the significance threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignificantChange {
    pub date: NaiveDate,
    pub close: f64,
    /// Percentage change from the previous close (e.g. `-4.2` for -4.2 %).
    pub change_pct: f64,
}

/// Whether a fractional return exceeds `threshold_pct` percent in magnitude.
pub fn is_significant(ret: f64, threshold_pct: f64) -> bool {
    (ret * 100.0).abs() > threshold_pct
}

/// Filter the return series down to significant moves.
///
/// `dates`, `closes` and `returns` must be aligned; extra elements on any side
/// are ignored.
pub fn significant_changes(
    dates: &[NaiveDate],
    closes: &[f64],
    returns: &[Option<f64>],
    threshold_pct: f64,
) -> Vec<SignificantChange> {
    dates
        .iter()
        .zip(closes)
        .zip(returns)
        .filter_map(|((&date, &close), r)| {
            let r = (*r)?;
            is_significant(r, threshold_pct).then_some(SignificantChange {
                date,
                close,
                change_pct: r * 100.0,
            })
        })
        .collect()
}
