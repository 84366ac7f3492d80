use std::{
    collections::BTreeMap,
    ops::{Add, Div},
};

use chrono::{DateTime, DurationRound, Local, TimeDelta};

use crate::core::{calendar::Month, series::Series};

impl<T> Resample for T where T: ?Sized {}

pub trait Resample {
    /// Mean over aligned 15-minute bins, forward-filling empty bins
    /// between the first and the last sample.
    ///
    /// Utility tariffs define demand as the highest 15-minute average
    /// within a billing interval.
    #[must_use]
    fn quarter_hourly_mean<V>(self) -> Series<DateTime<Local>, V>
    where
        Self: Iterator<Item = (DateTime<Local>, V)> + Sized,
        V: Copy + Add<Output = V> + Div<f64, Output = V>,
    {
        let quarter_hour = TimeDelta::minutes(15);
        let mut bins: BTreeMap<DateTime<Local>, (V, f64)> = BTreeMap::new();
        for (timestamp, value) in self {
            let bin = timestamp.duration_trunc(quarter_hour).unwrap();
            bins.entry(bin)
                .and_modify(|(sum, count)| {
                    *sum = *sum + value;
                    *count += 1.0;
                })
                .or_insert((value, 1.0));
        }

        let mut series = Series::with_capacity(bins.len());
        let mut previous: Option<(DateTime<Local>, V)> = None;
        for (bin, (sum, count)) in bins {
            if let Some((mut cursor, fill)) = previous {
                cursor += quarter_hour;
                while cursor < bin {
                    series.push((cursor, fill));
                    cursor += quarter_hour;
                }
            }
            let mean = sum / count;
            series.push((bin, mean));
            previous = Some((bin, mean));
        }
        series
    }

    /// Maximum within each hour.
    #[must_use]
    fn hourly_max<V>(self) -> Series<DateTime<Local>, V>
    where
        Self: Iterator<Item = (DateTime<Local>, V)> + Sized,
        V: Copy + Ord,
    {
        let mut bins: BTreeMap<DateTime<Local>, V> = BTreeMap::new();
        for (timestamp, value) in self {
            let bin = timestamp.duration_trunc(TimeDelta::hours(1)).unwrap();
            bins.entry(bin).and_modify(|max| *max = (*max).max(value)).or_insert(value);
        }
        bins.into_iter().collect()
    }

    /// Maximum within each calendar month.
    #[must_use]
    fn monthly_max<V>(self) -> Series<Month, V>
    where
        Self: Iterator<Item = (DateTime<Local>, V)> + Sized,
        V: Copy + Ord,
    {
        let mut bins: BTreeMap<Month, V> = BTreeMap::new();
        for (timestamp, value) in self {
            bins.entry(Month::from(timestamp))
                .and_modify(|max| *max = (*max).max(value))
                .or_insert(value);
        }
        bins.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use ordered_float::OrderedFloat;

    use super::*;

    fn at(hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 1, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_quarter_hourly_mean_within_bin() {
        let series =
            [(at(0, 0), 10.0), (at(0, 5), 20.0)].into_iter().quarter_hourly_mean();
        assert_eq!(series, [(at(0, 0), 15.0)]);
    }

    #[test]
    fn test_quarter_hourly_mean_pads_gaps() {
        let series =
            [(at(0, 0), 10.0), (at(1, 0), 30.0)].into_iter().quarter_hourly_mean();
        assert_eq!(
            series,
            [
                (at(0, 0), 10.0),
                (at(0, 15), 10.0),
                (at(0, 30), 10.0),
                (at(0, 45), 10.0),
                (at(1, 0), 30.0),
            ],
        );
    }

    #[test]
    fn test_hourly_max() {
        let series = [
            (at(0, 0), OrderedFloat(10.0)),
            (at(0, 30), OrderedFloat(25.0)),
            (at(1, 15), OrderedFloat(5.0)),
        ]
        .into_iter()
        .hourly_max();
        assert_eq!(series, [(at(0, 0), OrderedFloat(25.0)), (at(1, 0), OrderedFloat(5.0))]);
    }

    #[test]
    fn test_monthly_max() {
        let january = Local.with_ymd_and_hms(2024, 1, 31, 23, 45, 0).unwrap();
        let february = Local.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let series = [
            (at(0, 0), OrderedFloat(10.0)),
            (january, OrderedFloat(40.0)),
            (february, OrderedFloat(20.0)),
        ]
        .into_iter()
        .monthly_max();
        assert_eq!(
            series,
            [
                (Month { year: 2024, month: 1 }, OrderedFloat(40.0)),
                (Month { year: 2024, month: 2 }, OrderedFloat(20.0)),
            ],
        );
    }
}
