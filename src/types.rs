// =============================================================================
// Shared types used across the stock tracker
// =============================================================================

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Lookback offered by the Search section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HistoryPeriod {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[default]
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
}

impl HistoryPeriod {
    pub const ALL: [HistoryPeriod; 6] = [
        Self::OneDay,
        Self::FiveDays,
        Self::OneMonth,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::OneYear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneDay => "1d",
            Self::FiveDays => "5d",
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
        }
    }

    /// Calendar days fetched for this period. The short periods are padded
    /// so weekends and holidays still leave enough sessions.
    fn lookback_days(&self) -> u64 {
        match self {
            Self::OneDay => 7,
            Self::FiveDays => 10,
            Self::OneMonth => 30,
            Self::ThreeMonths => 91,
            Self::SixMonths => 182,
            Self::OneYear => 365,
        }
    }

    /// Sessions to keep from the end of the fetched range, for periods that
    /// are counted in trading days rather than calendar time.
    pub fn trading_sessions(&self) -> Option<usize> {
        match self {
            Self::OneDay => Some(1),
            Self::FiveDays => Some(5),
            _ => None,
        }
    }

    /// `[start, end)` range ending with (and including) `today`.
    pub fn range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let end = today.checked_add_days(Days::new(1)).unwrap_or(today);
        let start = today
            .checked_sub_days(Days::new(self.lookback_days()))
            .unwrap_or(NaiveDate::MIN);
        (start, end)
    }
}

impl fmt::Display for HistoryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|p| p.as_str()).collect();
                format!("unknown period `{s}`, expected one of {}", allowed.join(", "))
            })
    }
}

/// Direction of a price move, used to colour trending cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    pub fn from_change(change: f64) -> Self {
        if change > 0.0 {
            Self::Up
        } else if change < 0.0 {
            Self::Down
        } else {
            Self::Flat
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
            Self::Flat => write!(f, "flat"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn period_parses_and_displays() {
        assert_eq!("1mo".parse::<HistoryPeriod>().unwrap(), HistoryPeriod::OneMonth);
        assert_eq!(" 6MO ".parse::<HistoryPeriod>().unwrap(), HistoryPeriod::SixMonths);
        assert_eq!(HistoryPeriod::OneYear.to_string(), "1y");
        assert!("2w".parse::<HistoryPeriod>().is_err());
        assert_eq!(HistoryPeriod::default(), HistoryPeriod::OneMonth);
    }

    #[test]
    fn period_serde_uses_short_codes() {
        let json = serde_json::to_string(&HistoryPeriod::FiveDays).unwrap();
        assert_eq!(json, "\"5d\"");
        let p: HistoryPeriod = serde_json::from_str("\"3mo\"").unwrap();
        assert_eq!(p, HistoryPeriod::ThreeMonths);
    }

    #[test]
    fn range_is_half_open_and_includes_today() {
        let (start, end) = HistoryPeriod::OneMonth.range(d(2024, 3, 31));
        assert_eq!(start, d(2024, 3, 1));
        assert_eq!(end, d(2024, 4, 1));

        let (start, _) = HistoryPeriod::OneYear.range(d(2024, 3, 31));
        assert_eq!(start, d(2023, 4, 1));
    }

    #[test]
    fn only_short_periods_count_sessions() {
        assert_eq!(HistoryPeriod::OneDay.trading_sessions(), Some(1));
        assert_eq!(HistoryPeriod::FiveDays.trading_sessions(), Some(5));
        assert_eq!(HistoryPeriod::OneYear.trading_sessions(), None);
    }

    #[test]
    fn direction_from_change() {
        assert_eq!(Direction::from_change(1.5), Direction::Up);
        assert_eq!(Direction::from_change(-0.1), Direction::Down);
        assert_eq!(Direction::from_change(0.0), Direction::Flat);
        assert_eq!(Direction::Down.to_string(), "down");
    }
}
