use std::{collections::BTreeMap, str::FromStr};

use bon::Builder;

use crate::{
    core::calendar::CalendarKey,
    quantity::{
        cost::Cost,
        rate::{KilowattHourRate, KilowattRate},
    },
};

/// Energy time-of-use rate: at most one per calendar key.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TouRate {
    pub period: usize,
    pub rate: KilowattHourRate,
}

/// Demand time-of-use rate. Unlike energy, multiple periods may be active
/// at the same calendar key, each billing its own monthly maximum.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DemandTouRate {
    pub period: usize,
    pub rate: KilowattRate,
}

/// Flat demand rate: a single rate per calendar month, applied to the
/// monthly maximum 15-minute average demand.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FlatDemandRate {
    pub period: usize,
    pub rate: KilowattRate,
}

/// Fixed periodic charge, independent of load.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct MeterCharge {
    pub unit: MeterChargeUnit,
    pub rate: Cost,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MeterChargeUnit {
    PerDay,
    PerMonth,
}

impl FromStr for MeterChargeUnit {
    type Err = UnknownRateStructure;

    fn from_str(unit: &str) -> Result<Self, Self::Err> {
        match unit {
            "$/day" => Ok(Self::PerDay),
            "$/month" => Ok(Self::PerMonth),
            _ => Err(UnknownRateStructure { unit: unit.to_string() }),
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("unknown meter charge unit: `{unit}`")]
pub struct UnknownRateStructure {
    pub unit: String,
}

/// Parsed rate schedule: the four charge tables plus display labels.
///
/// Immutable once built. All tables are derived in a single construction
/// step (see [`crate::api::openei::UtilityRate::into_schedule`]), so
/// "computed once" holds by value semantics.
#[derive(Debug, Builder)]
pub struct RateSchedule {
    #[builder(into)]
    pub name: String,

    #[builder(into)]
    pub description: Option<String>,

    /// Fully expanded energy table: 2 × 12 × 24 keys for a complete tariff.
    #[builder(default)]
    energy: BTreeMap<CalendarKey, TouRate>,

    #[builder(default)]
    demand: BTreeMap<CalendarKey, Vec<DemandTouRate>>,

    /// Keyed by 1-based month.
    #[builder(default)]
    flat_demand: BTreeMap<u32, FlatDemandRate>,

    meter: Option<MeterCharge>,

    /// Energy period labels, keyed by period.
    #[builder(default)]
    seasons: BTreeMap<usize, String>,

    /// Demand period labels, keyed by period.
    #[builder(default)]
    demand_periods: BTreeMap<usize, String>,
}

impl RateSchedule {
    pub const fn energy(&self) -> &BTreeMap<CalendarKey, TouRate> {
        &self.energy
    }

    pub const fn demand(&self) -> &BTreeMap<CalendarKey, Vec<DemandTouRate>> {
        &self.demand
    }

    pub const fn flat_demand(&self) -> &BTreeMap<u32, FlatDemandRate> {
        &self.flat_demand
    }

    pub const fn meter(&self) -> Option<MeterCharge> {
        self.meter
    }

    pub fn energy_rate(&self, key: CalendarKey) -> Option<TouRate> {
        self.energy.get(&key).copied()
    }

    /// All demand tiers active at the key, empty when the tariff has no
    /// demand structure there.
    pub fn demand_rates(&self, key: CalendarKey) -> &[DemandTouRate] {
        self.demand.get(&key).map_or(&[], Vec::as_slice)
    }

    pub fn flat_demand_rate(&self, month: u32) -> Option<FlatDemandRate> {
        self.flat_demand.get(&month).copied()
    }

    pub fn season_label(&self, period: usize) -> String {
        self.seasons.get(&period).cloned().unwrap_or_else(|| format!("Period-{period}"))
    }

    pub fn demand_period_label(&self, period: usize) -> String {
        self.demand_periods.get(&period).cloned().unwrap_or_else(|| format!("Period-{period}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_hours_key(hour: u32) -> CalendarKey {
        CalendarKey { is_weekday: true, month: 1, hour }
    }

    #[test]
    fn test_energy_lookup() {
        let rate = TouRate { period: 0, rate: KilowattHourRate::from(0.1) };
        let schedule = RateSchedule::builder()
            .name("Test")
            .energy(BTreeMap::from([(all_hours_key(0), rate)]))
            .build();
        assert_eq!(schedule.energy_rate(all_hours_key(0)), Some(rate));
        assert_eq!(schedule.energy_rate(all_hours_key(1)), None);
    }

    #[test]
    fn test_missing_demand_structure_yields_empty_slice() {
        let schedule = RateSchedule::builder().name("Test").build();
        assert!(schedule.demand_rates(all_hours_key(0)).is_empty());
    }

    #[test]
    fn test_label_fallback() {
        let schedule = RateSchedule::builder()
            .name("Test")
            .demand_periods(BTreeMap::from([(0, "Part-Peak".to_string())]))
            .build();
        assert_eq!(schedule.demand_period_label(0), "Part-Peak");
        assert_eq!(schedule.demand_period_label(1), "Period-1");
        assert_eq!(schedule.season_label(2), "Period-2");
    }

    #[test]
    fn test_unknown_meter_charge_unit() {
        let error = "$/year".parse::<MeterChargeUnit>().unwrap_err();
        assert_eq!(error.to_string(), "unknown meter charge unit: `$/year`");
    }

    #[test]
    fn test_meter_charge_unit_parsing() {
        assert_eq!("$/day".parse::<MeterChargeUnit>().unwrap(), MeterChargeUnit::PerDay);
        assert_eq!("$/month".parse::<MeterChargeUnit>().unwrap(), MeterChargeUnit::PerMonth);
    }
}
