use std::collections::{BTreeMap, BTreeSet};

use crate::{
    core::{bill::SingleSite, calendar::Month, load::LoadSeries},
    quantity::{cost::Cost, energy::KilowattHours, power::Kilowatts},
};

/// Monthly bill with all charge streams joined by billing month.
pub struct MonthlyBillReport {
    /// Demand tier labels, one table column pair each. Tiers sharing a
    /// label are summed into a single column.
    pub demand_labels: Vec<String>,
    pub rows: Vec<MonthlyBill>,
}

pub struct MonthlyBill {
    pub month: Month,
    pub columns: BillColumns,
}

#[derive(Clone)]
pub struct BillColumns {
    pub energy: KilowattHours,
    pub energy_cost: Cost,
    /// Aligned with [`MonthlyBillReport::demand_labels`].
    pub demand: Vec<DemandColumn>,
    pub flat_demand: Kilowatts,
    pub flat_demand_cost: Cost,
    pub meter_cost: Cost,
    pub total: Cost,
}

#[derive(Copy, Clone)]
pub struct DemandColumn {
    pub demand: Kilowatts,
    pub cost: Cost,
}

impl Default for DemandColumn {
    fn default() -> Self {
        Self { demand: Kilowatts::ZERO, cost: Cost::ZERO }
    }
}

impl Default for BillColumns {
    fn default() -> Self {
        Self {
            energy: KilowattHours::ZERO,
            energy_cost: Cost::ZERO,
            demand: Vec::new(),
            flat_demand: Kilowatts::ZERO,
            flat_demand_cost: Cost::ZERO,
            meter_cost: Cost::ZERO,
            total: Cost::ZERO,
        }
    }
}

impl MonthlyBillReport {
    pub fn build(calculator: &SingleSite, load: &LoadSeries) -> Self {
        let demand_charges = calculator.demand_charges(load);

        // Tier labels in period order; duplicates collapse to one column.
        let periods: BTreeSet<usize> =
            demand_charges.values().flatten().map(|tier| tier.period).collect();
        let mut demand_labels = Vec::new();
        for period in periods {
            let label = calculator.schedule.demand_period_label(period);
            if !demand_labels.contains(&label) {
                demand_labels.push(label);
            }
        }

        let mut energy_by_month: BTreeMap<Month, (KilowattHours, Cost)> = BTreeMap::new();
        for (timestamp, charge) in calculator.energy_charges(load) {
            let entry = energy_by_month
                .entry(Month::from(timestamp))
                .or_insert((KilowattHours::ZERO, Cost::ZERO));
            entry.0 += charge.energy;
            if let Some(cost) = charge.cost {
                entry.1 += cost;
            }
        }
        let flat_by_month: BTreeMap<Month, _> =
            calculator.flat_demand_charges(load).into_iter().collect();
        let meter_by_month: BTreeMap<Month, _> =
            calculator.meter_charges(load).into_iter().collect();

        let rows = calculator
            .total(load)
            .into_iter()
            .map(|(month, total)| {
                let mut columns = BillColumns {
                    demand: vec![DemandColumn::default(); demand_labels.len()],
                    total,
                    ..BillColumns::default()
                };
                if let Some((energy, cost)) = energy_by_month.get(&month) {
                    columns.energy = *energy;
                    columns.energy_cost = *cost;
                }
                for tier in demand_charges.get(&month).map_or(&[][..], Vec::as_slice) {
                    let label = calculator.schedule.demand_period_label(tier.period);
                    let index = demand_labels.iter().position(|known| *known == label);
                    if let Some(index) = index {
                        columns.demand[index].demand += tier.demand;
                        columns.demand[index].cost += tier.cost.unwrap_or(Cost::ZERO);
                    }
                }
                if let Some(charge) = flat_by_month.get(&month) {
                    columns.flat_demand = charge.demand;
                    columns.flat_demand_cost = charge.cost.unwrap_or(Cost::ZERO);
                }
                if let Some(charge) = meter_by_month.get(&month) {
                    columns.meter_cost = charge.cost;
                }
                MonthlyBill { month, columns }
            })
            .collect();

        Self { demand_labels, rows }
    }

    /// Sum of every column over the billing year, the report footer.
    pub fn annual(&self) -> BillColumns {
        let mut annual = BillColumns {
            demand: vec![DemandColumn::default(); self.demand_labels.len()],
            ..BillColumns::default()
        };
        for row in &self.rows {
            annual.energy += row.columns.energy;
            annual.energy_cost += row.columns.energy_cost;
            for (sum, column) in annual.demand.iter_mut().zip(&row.columns.demand) {
                sum.demand += column.demand;
                sum.cost += column.cost;
            }
            annual.flat_demand += row.columns.flat_demand;
            annual.flat_demand_cost += row.columns.flat_demand_cost;
            annual.meter_cost += row.columns.meter_cost;
            annual.total += row.columns.total;
        }
        annual
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use approx::assert_abs_diff_eq;
    use chrono::{Local, TimeDelta, TimeZone};

    use super::*;
    use crate::{
        core::{
            calendar::CalendarKey,
            schedule::{DemandTouRate, RateSchedule, TouRate},
        },
        quantity::rate::{KilowattHourRate, KilowattRate},
    };

    fn hourly_load(power: f64, n_hours: i32) -> LoadSeries {
        let start = Local.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let samples = (0..n_hours)
            .map(|hour| (start + TimeDelta::hours(i64::from(hour)), Kilowatts::from(power)))
            .collect();
        LoadSeries::new(samples, TimeDelta::hours(1)).unwrap()
    }

    fn all_keys() -> impl Iterator<Item = CalendarKey> {
        [false, true].into_iter().flat_map(|is_weekday| {
            (1..=12).flat_map(move |month| {
                (0..24).map(move |hour| CalendarKey { is_weekday, month, hour })
            })
        })
    }

    #[test]
    fn test_duplicate_tier_labels_are_summed() {
        // Two periods mapped to the same label end up in one column.
        let demand: BTreeMap<_, _> = all_keys()
            .map(|key| {
                let rates = vec![
                    DemandTouRate { period: 0, rate: KilowattRate::from(2.0) },
                    DemandTouRate { period: 1, rate: KilowattRate::from(3.0) },
                ];
                (key, rates)
            })
            .collect();
        let schedule = RateSchedule::builder()
            .name("Collision")
            .demand(demand)
            .demand_periods(BTreeMap::from([
                (0, "Peak".to_string()),
                (1, "Peak".to_string()),
            ]))
            .build();
        let calculator = SingleSite::new(schedule);
        let load = hourly_load(10.0, 24);

        let report = MonthlyBillReport::build(&calculator, &load);
        assert_eq!(report.demand_labels, ["Peak"]);
        assert_eq!(report.rows.len(), 1);
        let column = report.rows[0].columns.demand[0];
        assert_abs_diff_eq!(column.demand.0.0, 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(column.cost.0.0, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_report_total_matches_calculator() {
        let energy: BTreeMap<_, _> = all_keys()
            .map(|key| (key, TouRate { period: 0, rate: KilowattHourRate::from(0.1) }))
            .collect();
        let calculator =
            SingleSite::new(RateSchedule::builder().name("Energy").energy(energy).build());
        let load = hourly_load(10.0, 24 * 31);

        let report = MonthlyBillReport::build(&calculator, &load);
        let totals = calculator.total(&load);
        assert_eq!(report.rows.len(), totals.len());
        for (row, (month, total)) in report.rows.iter().zip(totals) {
            assert_eq!(row.month, month);
            assert_eq!(row.columns.total, total);
        }
        assert_abs_diff_eq!(report.annual().total.0.0, 744.0, epsilon = 1e-9);
    }

    #[test]
    fn test_synthetic_labels_without_period_names() {
        let demand: BTreeMap<_, _> = all_keys()
            .map(|key| (key, vec![DemandTouRate { period: 0, rate: KilowattRate::from(1.0) }]))
            .collect();
        let calculator =
            SingleSite::new(RateSchedule::builder().name("Unnamed").demand(demand).build());
        let load = hourly_load(5.0, 24);

        let report = MonthlyBillReport::build(&calculator, &load);
        assert_eq!(report.demand_labels, ["Period-0"]);
    }
}
