// =============================================================================
// Derived Series - date-aligned indicator output
// =============================================================================
//
// Every indicator produces one value per input bar. Indices where a window
// has insufficient history carry `None`; the series is never shorter than
// the date axis it was computed from and never reorders it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single point on a derived series. `value == None` marks a warm-up gap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// A named series aligned 1:1 with a price history's date axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSeries {
    pub name: String,
    pub points: Vec<SeriesPoint>,
}

impl DerivedSeries {
    /// Zip `values` onto `dates`.
    ///
    /// The engine always produces exactly one value per date; a length
    /// mismatch is a programming error and trips a debug assertion. In
    /// release builds the shorter side wins.
    pub fn aligned(name: impl Into<String>, dates: &[NaiveDate], values: Vec<Option<f64>>) -> Self {
        debug_assert_eq!(dates.len(), values.len(), "derived series must align with dates");
        let points = dates
            .iter()
            .zip(values)
            .map(|(&date, value)| SeriesPoint { date, value })
            .collect();
        Self {
            name: name.into(),
            points,
        }
    }

    /// Convenience for series that are defined at every index (EMA, MACD).
    pub fn dense(name: impl Into<String>, dates: &[NaiveDate], values: Vec<f64>) -> Self {
        Self::aligned(name, dates, values.into_iter().map(Some).collect())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of defined (non-warm-up) points.
    pub fn defined_count(&self) -> usize {
        self.points.iter().filter(|p| p.value.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(n: u32) -> Vec<NaiveDate> {
        (1..=n)
            .map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
            .collect()
    }

    #[test]
    fn aligned_keeps_order_and_length() {
        let axis = dates(3);
        let s = DerivedSeries::aligned("x", &axis, vec![None, Some(1.0), Some(2.0)]);
        assert_eq!(s.len(), 3);
        assert_eq!(s.points[0].date, axis[0]);
        assert_eq!(s.points[2].value, Some(2.0));
        assert_eq!(s.defined_count(), 2);
    }

    #[test]
    fn dense_defines_every_point() {
        let axis = dates(4);
        let s = DerivedSeries::dense("x", &axis, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(s.defined_count(), 4);
        assert_eq!(s.points[3].date, axis[3]);
    }

    #[test]
    fn empty_series() {
        let s = DerivedSeries::aligned("x", &[], Vec::new());
        assert!(s.is_empty());
        assert_eq!(s.defined_count(), 0);
    }
}
