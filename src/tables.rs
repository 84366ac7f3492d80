use std::collections::BTreeMap;

use comfy_table::{Attribute, Cell, CellAlignment, Table, modifiers, presets};

use crate::{
    core::schedule::RateSchedule,
    report::{BillColumns, MonthlyBillReport},
};

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

fn numeric(value: impl ToString) -> Cell {
    Cell::new(value).set_alignment(CellAlignment::Right)
}

#[must_use]
pub fn build_monthly_bill_table(report: &MonthlyBillReport) -> Table {
    let mut table = new_table();
    let mut header =
        vec!["Month".to_string(), "Energy (kWh)".to_string(), "Energy ($)".to_string()];
    for label in &report.demand_labels {
        header.push(format!("{label} (kW)"));
        header.push(format!("{label} ($)"));
    }
    header.extend([
        "Flat Demand (kW)".to_string(),
        "Flat Demand ($)".to_string(),
        "Meter ($)".to_string(),
        "Total ($)".to_string(),
    ]);
    table.set_header(header);

    for row in &report.rows {
        table.add_row(bill_row(Cell::new(row.month), &row.columns));
    }
    table.add_row(bill_row(Cell::new("Annual").add_attribute(Attribute::Bold), &report.annual()));
    table
}

fn bill_row(first: Cell, columns: &BillColumns) -> Vec<Cell> {
    let mut cells = vec![
        first,
        numeric(format!("{:.1}", columns.energy.0)),
        numeric(format!("{:.2}", columns.energy_cost.0)),
    ];
    for column in &columns.demand {
        cells.push(numeric(format!("{:.2}", column.demand.0)));
        cells.push(numeric(format!("{:.2}", column.cost.0)));
    }
    cells.push(numeric(format!("{:.2}", columns.flat_demand.0)));
    cells.push(numeric(format!("{:.2}", columns.flat_demand_cost.0)));
    cells.push(numeric(format!("{:.2}", columns.meter_cost.0)));
    cells.push(numeric(format!("{:.2}", columns.total.0)));
    cells
}

#[must_use]
pub fn build_energy_schedule_table(schedule: &RateSchedule) -> Table {
    let mut periods: BTreeMap<usize, (String, usize)> = BTreeMap::new();
    for rate in schedule.energy().values() {
        let entry = periods
            .entry(rate.period)
            .or_insert_with(|| (rate.rate.to_string(), 0));
        entry.1 += 1;
    }

    let mut table = new_table();
    table.set_header(vec!["Period", "Season", "Rate", "Key slots"]);
    for (period, (rate, n_slots)) in periods {
        table.add_row(vec![
            numeric(period),
            Cell::new(schedule.season_label(period)),
            numeric(rate),
            numeric(n_slots),
        ]);
    }
    table
}

#[must_use]
pub fn build_demand_schedule_table(schedule: &RateSchedule) -> Table {
    let mut periods: BTreeMap<usize, (String, usize)> = BTreeMap::new();
    for rate in schedule.demand().values().flatten() {
        let entry = periods
            .entry(rate.period)
            .or_insert_with(|| (rate.rate.to_string(), 0));
        entry.1 += 1;
    }

    let mut table = new_table();
    table.set_header(vec!["Period", "Label", "Rate", "Key slots"]);
    for (period, (rate, n_slots)) in periods {
        table.add_row(vec![
            numeric(period),
            Cell::new(schedule.demand_period_label(period)),
            numeric(rate),
            numeric(n_slots),
        ]);
    }
    table
}

#[must_use]
pub fn build_flat_demand_table(schedule: &RateSchedule) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Month", "Period", "Rate"]);
    for (month, rate) in schedule.flat_demand() {
        table.add_row(vec![numeric(month), numeric(rate.period), numeric(rate.rate)]);
    }
    table
}
