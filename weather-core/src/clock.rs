use chrono::{Local, NaiveDateTime, Timelike};
use std::fmt::Debug;

/// Source of local wall-clock time.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> NaiveDateTime;

    fn hour(&self) -> u32 {
        self.now().hour()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    /// Today-agnostic clock pinned to `hour:minute` on 2024-05-01.
    pub fn at(hour: u32, minute: u32) -> Self {
        let at = chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .unwrap_or_default();
        Self(at)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_reports_its_hour() {
        assert_eq!(FixedClock::at(13, 45).hour(), 13);
    }
}
