use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Local, NaiveDate};

use crate::{
    core::{
        calendar::{CalendarKey, Month},
        load::LoadSeries,
        schedule::{MeterChargeUnit, RateSchedule},
        series::{AssignRates, Resample, Series},
    },
    quantity::{
        cost::Cost,
        energy::KilowattHours,
        power::Kilowatts,
        rate::{KilowattHourRate, KilowattRate},
    },
};

/// Single-site bill calculator.
///
/// Pure computation over the in-memory load series and the schedule
/// tables, no network access.
pub struct SingleSite {
    pub schedule: RateSchedule,
}

/// Audit row of the energy charge calculation.
#[derive(Copy, Clone, Debug)]
pub struct EnergyCharge {
    pub energy: KilowattHours,
    pub rate: Option<KilowattHourRate>,
    pub cost: Option<Cost>,
}

/// Audit row of one demand tier within a billing month.
#[derive(Copy, Clone, Debug)]
pub struct DemandTierCharge {
    pub period: usize,
    pub demand: Kilowatts,
    pub rate: Option<KilowattRate>,
    pub cost: Option<Cost>,
}

/// Audit row of the flat demand charge within a billing month.
#[derive(Copy, Clone, Debug)]
pub struct FlatDemandCharge {
    pub demand: Kilowatts,
    pub rate: Option<KilowattRate>,
    pub cost: Option<Cost>,
}

/// Fixed meter cost within a billing month.
#[derive(Copy, Clone, Debug)]
pub struct MeterChargeTotal {
    /// Billed days for `$/day` tariffs, `1` for `$/month` ones.
    pub n_periods: u32,
    pub cost: Cost,
}

impl SingleSite {
    pub const fn new(schedule: RateSchedule) -> Self {
        Self { schedule }
    }

    /// Energy cost per sample: kilowatt-hours × the matching TOU rate.
    ///
    /// Samples without a matching schedule row keep an undefined rate and
    /// contribute nothing to the monthly sum.
    pub fn energy_charges(&self, load: &LoadSeries) -> Series<DateTime<Local>, EnergyCharge> {
        let step = load.step();
        load.iter()
            .map(|(timestamp, power)| (timestamp, power * step))
            .assign_rates(|key| self.schedule.energy_rate(key))
            .map(|(timestamp, energy, tou)| {
                let rate = tou.map(|tou| tou.rate);
                let cost = rate.map(|rate| energy * rate);
                (timestamp, EnergyCharge { energy, rate, cost })
            })
            .collect()
    }

    /// Peak demand cost per billing month.
    ///
    /// The load is normalized to hourly maxima of 15-minute averages,
    /// rates fan out to one row per active tier, and each tier
    /// independently bills its maximum-cost hour of the month.
    pub fn demand_charges(&self, load: &LoadSeries) -> BTreeMap<Month, Vec<DemandTierCharge>> {
        let no_demand_structure = self.schedule.demand().is_empty();
        let mut tiers: BTreeMap<(Month, usize), DemandTierCharge> = BTreeMap::new();

        let hourly = load.iter().quarter_hourly_mean().into_iter().hourly_max();
        for (timestamp, demand) in hourly {
            let month = Month::from(timestamp);
            if no_demand_structure {
                // No demand structure at all: a single tier 0 with an
                // undefined rate carries the metered peak.
                tiers
                    .entry((month, 0))
                    .and_modify(|tier| tier.demand = tier.demand.max(demand))
                    .or_insert(DemandTierCharge { period: 0, demand, rate: None, cost: None });
                continue;
            }
            for rate in self.schedule.demand_rates(CalendarKey::from(timestamp)) {
                let charge = DemandTierCharge {
                    period: rate.period,
                    demand,
                    rate: Some(rate.rate),
                    cost: Some(demand * rate.rate),
                };
                tiers
                    .entry((month, rate.period))
                    .and_modify(|tier| {
                        if charge.cost > tier.cost {
                            *tier = charge;
                        }
                    })
                    .or_insert(charge);
            }
        }

        let mut monthly: BTreeMap<Month, Vec<DemandTierCharge>> = BTreeMap::new();
        for ((month, _), tier) in tiers {
            monthly.entry(month).or_default().push(tier);
        }
        monthly
    }

    /// Flat demand cost per billing month: monthly maximum 15-minute
    /// average demand × the month's rate, no intraday variation.
    pub fn flat_demand_charges(&self, load: &LoadSeries) -> Series<Month, FlatDemandCharge> {
        load.iter()
            .quarter_hourly_mean()
            .into_iter()
            .monthly_max()
            .into_iter()
            .map(|(month, demand)| {
                let rate = self.schedule.flat_demand_rate(month.month).map(|row| row.rate);
                let cost = rate.map(|rate| demand * rate);
                (month, FlatDemandCharge { demand, rate, cost })
            })
            .collect()
    }

    /// Fixed meter cost per billing month.
    ///
    /// Empty when the tariff defines no meter charge: the stream then
    /// contributes zero to the total rather than failing.
    pub fn meter_charges(&self, load: &LoadSeries) -> Series<Month, MeterChargeTotal> {
        let Some(meter) = self.schedule.meter() else {
            return Series::new();
        };
        let mut counts: BTreeMap<Month, u32> = BTreeMap::new();
        match meter.unit {
            MeterChargeUnit::PerDay => {
                let days: BTreeSet<NaiveDate> =
                    load.iter().map(|(timestamp, _)| timestamp.date_naive()).collect();
                for day in days {
                    *counts.entry(Month::from(day)).or_default() += 1;
                }
            }
            MeterChargeUnit::PerMonth => {
                for (timestamp, _) in load.iter() {
                    counts.entry(Month::from(timestamp)).or_insert(1);
                }
            }
        }
        counts
            .into_iter()
            .map(|(month, n_periods)| {
                (month, MeterChargeTotal { n_periods, cost: meter.rate * f64::from(n_periods) })
            })
            .collect()
    }

    /// Total monthly bill: all four charge streams summed by calendar
    /// month. A stream missing a month contributes zero, it never poisons
    /// the total.
    pub fn total(&self, load: &LoadSeries) -> Series<Month, Cost> {
        let mut totals: BTreeMap<Month, Cost> = BTreeMap::new();
        for (timestamp, _) in load.iter() {
            totals.entry(Month::from(timestamp)).or_insert(Cost::ZERO);
        }
        for (timestamp, charge) in self.energy_charges(load) {
            if let Some(cost) = charge.cost {
                *totals.entry(Month::from(timestamp)).or_insert(Cost::ZERO) += cost;
            }
        }
        for (month, tiers) in self.demand_charges(load) {
            for tier in tiers {
                if let Some(cost) = tier.cost {
                    *totals.entry(month).or_insert(Cost::ZERO) += cost;
                }
            }
        }
        for (month, charge) in self.flat_demand_charges(load) {
            if let Some(cost) = charge.cost {
                *totals.entry(month).or_insert(Cost::ZERO) += cost;
            }
        }
        for (month, charge) in self.meter_charges(load) {
            *totals.entry(month).or_insert(Cost::ZERO) += charge.cost;
        }
        totals.into_iter().collect()
    }
}
