//! Inclusive date ranges and the backwards window walk used by booking scans.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Inclusive calendar range sent as `from`/`to` to list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Build a range, swapping the bounds if they arrive reversed.
    #[must_use]
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        if from <= to { Self { from, to } } else { Self { from: to, to: from } }
    }

    /// Upstream date format: `YYYYMMDD`.
    #[must_use]
    pub fn from_param(&self) -> String {
        self.from.format("%Y%m%d").to_string()
    }

    #[must_use]
    pub fn to_param(&self) -> String {
        self.to.format("%Y%m%d").to_string()
    }

    #[must_use]
    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// Windows of `window_days` walking back from `today`, newest first,
/// covering `lookback_days` days in total.
#[must_use]
pub fn backward_windows(today: NaiveDate, window_days: u32, lookback_days: u32) -> Vec<DateRange> {
    if window_days == 0 || lookback_days == 0 {
        return Vec::new();
    }
    let oldest = today
        .checked_sub_signed(Duration::days(i64::from(lookback_days) - 1))
        .unwrap_or(NaiveDate::MIN);
    let span = Duration::days(i64::from(window_days) - 1);
    let mut windows = Vec::new();
    let mut to = today;
    while to >= oldest {
        let from = to.checked_sub_signed(span).unwrap_or(NaiveDate::MIN).max(oldest);
        windows.push(DateRange { from, to });
        match from.pred_opt() {
            Some(previous) => to = previous,
            None => break,
        }
    }
    windows
}
