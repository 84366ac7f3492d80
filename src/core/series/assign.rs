use chrono::{DateTime, Local};

use crate::core::calendar::CalendarKey;

impl<T> AssignRates for T where T: ?Sized {}

pub trait AssignRates {
    /// Look up the tariff rate for every sample by its calendar key.
    ///
    /// Load-preserving: every input sample appears in the output exactly
    /// once. A sample whose key matches no schedule row carries [`None`] —
    /// a valid state, not an error, since some schedules have no structure
    /// for a given charge type at all.
    #[must_use]
    fn assign_rates<V, R>(
        self,
        lookup: impl Fn(CalendarKey) -> Option<R>,
    ) -> impl Iterator<Item = (DateTime<Local>, V, Option<R>)>
    where
        Self: Iterator<Item = (DateTime<Local>, V)> + Sized,
    {
        self.map(move |(timestamp, quantity)| {
            let rate = lookup(CalendarKey::from(timestamp));
            (timestamp, quantity, rate)
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};
    use itertools::Itertools;

    use super::*;

    fn hourly_samples(n_hours: i64) -> Vec<(DateTime<Local>, f64)> {
        let start = Local.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..n_hours).map(|hour| (start + TimeDelta::hours(hour), 1.0)).collect()
    }

    #[test]
    fn test_right_join_preserves_length() {
        let samples = hourly_samples(48);
        let assigned = samples.clone().into_iter().assign_rates(|_| None::<f64>).collect_vec();
        assert_eq!(assigned.len(), samples.len());
        assert!(assigned.iter().all(|(_, _, rate)| rate.is_none()));
    }

    #[test]
    fn test_rate_matches_key() {
        let samples = hourly_samples(24);
        let assigned = samples
            .into_iter()
            .assign_rates(|key| (key.hour < 12).then_some(0.1))
            .collect_vec();
        for (timestamp, _, rate) in assigned {
            let expected = (CalendarKey::from(timestamp).hour < 12).then_some(0.1);
            assert_eq!(rate, expected);
        }
    }
}
