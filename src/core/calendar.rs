use std::fmt::{Debug, Display, Formatter};

use chrono::{DateTime, Datelike, Local, NaiveDate, Timelike, Weekday};

/// Join key of the time-of-use rate tables.
#[derive(Copy, Clone, Eq, Ord, PartialEq, PartialOrd)]
pub struct CalendarKey {
    /// Monday through Friday.
    pub is_weekday: bool,

    /// 1-based.
    pub month: u32,

    pub hour: u32,
}

impl From<DateTime<Local>> for CalendarKey {
    fn from(timestamp: DateTime<Local>) -> Self {
        Self {
            is_weekday: !matches!(timestamp.weekday(), Weekday::Sat | Weekday::Sun),
            month: timestamp.month(),
            hour: timestamp.hour(),
        }
    }
}

impl Debug for CalendarKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let day_kind = if self.is_weekday { "wd" } else { "we" };
        write!(f, "{day_kind}-{:02}-{:02}h", self.month, self.hour)
    }
}

/// Billing period.
#[derive(Copy, Clone, Eq, Ord, PartialEq, PartialOrd)]
pub struct Month {
    pub year: i32,

    /// 1-based.
    pub month: u32,
}

impl From<DateTime<Local>> for Month {
    fn from(timestamp: DateTime<Local>) -> Self {
        Self { year: timestamp.year(), month: timestamp.month() }
    }
}

impl From<NaiveDate> for Month {
    fn from(date: NaiveDate) -> Self {
        Self { year: date.year(), month: date.month() }
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Debug for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
