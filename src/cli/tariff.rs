use crate::{
    cli::TariffArgs,
    prelude::*,
    tables::{build_demand_schedule_table, build_energy_schedule_table, build_flat_demand_table},
};

#[instrument(skip_all)]
pub fn tariff(args: &TariffArgs) -> Result {
    let schedule = args.tariff.fetch()?.into_schedule()?;
    info!(name = %schedule.name, "parsed the rate schedule");
    if let Some(description) = &schedule.description {
        info!(description = %description, "tariff description");
    }

    println!("{}", build_energy_schedule_table(&schedule));
    println!("{}", build_demand_schedule_table(&schedule));
    println!("{}", build_flat_demand_table(&schedule));
    if let Some(meter) = schedule.meter() {
        info!(rate = %meter.rate, unit = ?meter.unit, "meter charge");
    }
    Ok(())
}
