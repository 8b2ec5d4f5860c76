//! Scan time window.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Inclusive time range `[from, to]` used to select changed records upstream.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> DomainResult<Self> {
        if from > to {
            return Err(DomainError::validation(format!(
                "time window start {from} is after end {to}"
            )));
        }
        Ok(Self { from, to })
    }

    /// The `days` whole UTC days preceding the day `now` falls in.
    ///
    /// `previous_days(now, 1)` is "yesterday": from 00:00:00 yesterday up to the last
    /// nanosecond before today's midnight.
    pub fn previous_days(now: DateTime<Utc>, days: u32) -> DomainResult<Self> {
        if days == 0 {
            return Err(DomainError::validation("lookback must be at least one day"));
        }
        let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let from = midnight - Duration::days(i64::from(days));
        let to = midnight - Duration::nanoseconds(1);
        Self::new(from, to)
    }

    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rejects_inverted_range() {
        let a = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        assert!(matches!(TimeWindow::new(a, b), Err(DomainError::Validation(_))));
        assert!(TimeWindow::new(b, b).is_ok());
    }

    #[test]
    fn previous_day_covers_yesterday_exactly() {
        let now = Utc.with_ymd_and_hms(2024, 5, 2, 13, 45, 10).unwrap();
        let w = TimeWindow::previous_days(now, 1).unwrap();

        assert_eq!(w.from(), Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
        assert_eq!(w.to().date_naive(), w.from().date_naive());
        assert_eq!(
            w.to() + Duration::nanoseconds(1),
            Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn zero_day_lookback_is_invalid() {
        let now = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        assert!(TimeWindow::previous_days(now, 0).is_err());
    }
}
