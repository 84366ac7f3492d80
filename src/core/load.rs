use chrono::{DateTime, Local, TimeDelta};
use itertools::Itertools;

use crate::{
    core::series::{Point, Series},
    prelude::*,
    quantity::power::Kilowatts,
};

/// Metered load profile: power samples on a fixed time step.
///
/// Energy per sample is `power × step`, so the step must accompany the
/// series. Calculators borrow the series and never mutate it.
pub struct LoadSeries {
    samples: Series<DateTime<Local>, Kilowatts>,
    step: TimeDelta,
}

impl LoadSeries {
    pub fn new(samples: Series<DateTime<Local>, Kilowatts>, step: TimeDelta) -> Result<Self> {
        ensure!(step > TimeDelta::zero(), "load step must be positive, got {step}");
        ensure!(
            samples.iter().tuple_windows().all(|((lhs, _), (rhs, _))| lhs < rhs),
            "load timestamps must be strictly increasing",
        );
        Ok(Self { samples, step })
    }

    pub fn samples(&self) -> &[Point<DateTime<Local>, Kilowatts>] {
        &self.samples
    }

    pub const fn step(&self) -> TimeDelta {
        self.step
    }

    pub fn iter(&self) -> impl Iterator<Item = Point<DateTime<Local>, Kilowatts>> + '_ {
        self.samples.iter().copied()
    }

    pub const fn len(&self) -> usize {
        self.samples.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_rejects_non_increasing_timestamps() {
        let timestamp = Local.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let samples = vec![(timestamp, Kilowatts::from(1.0)), (timestamp, Kilowatts::from(2.0))];
        assert!(LoadSeries::new(samples, TimeDelta::hours(1)).is_err());
    }

    #[test]
    fn test_rejects_non_positive_step() {
        assert!(LoadSeries::new(Vec::new(), TimeDelta::zero()).is_err());
    }

    #[test]
    fn test_empty_series_is_valid() {
        let load = LoadSeries::new(Vec::new(), TimeDelta::minutes(15)).unwrap();
        assert!(load.is_empty());
    }
}
