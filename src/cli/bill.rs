use std::{fs::File, io::Read, path::Path};

use chrono::{Local, MappedLocalTime, NaiveDateTime, TimeDelta};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;

use crate::{
    cli::BillArgs,
    core::{bill::SingleSite, load::LoadSeries},
    prelude::*,
    quantity::power::Kilowatts,
    report::MonthlyBillReport,
    tables::build_monthly_bill_table,
};

#[instrument(skip_all)]
pub fn bill(args: &BillArgs) -> Result {
    let schedule = args.tariff.fetch()?.into_schedule()?;
    info!(name = %schedule.name, "parsed the rate schedule");

    let step = TimeDelta::from_std(args.step.into())?;
    let load = read_load_csv(&args.load_path, step)?;
    info!(n_samples = load.len(), "read the load profile");

    let calculator = SingleSite::new(schedule);
    let report = MonthlyBillReport::build(&calculator, &load);
    println!("{}", build_monthly_bill_table(&report));
    Ok(())
}

fn read_load_csv(path: &Path, step: TimeDelta) -> Result<LoadSeries> {
    let file =
        File::open(path).with_context(|| format!("failed to open `{}`", path.display()))?;
    parse_load_csv(file, step)
}

#[derive(Deserialize)]
struct LoadRecord {
    timestamp: String,
    kw: f64,
}

fn parse_load_csv(reader: impl Read, step: TimeDelta) -> Result<LoadSeries> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut samples = Vec::new();
    for record in reader.deserialize() {
        let record: LoadRecord = record?;
        let timestamp = NaiveDateTime::parse_from_str(&record.timestamp, "%Y-%m-%d %H:%M")
            .with_context(|| format!("failed to parse timestamp `{}`", record.timestamp))?;
        match timestamp.and_local_timezone(Local) {
            MappedLocalTime::Single(timestamp) | MappedLocalTime::Ambiguous(timestamp, _) => {
                samples.push((timestamp, Kilowatts::from(record.kw)));
            }
            MappedLocalTime::None => {
                warn!(timestamp = %record.timestamp, "skipped: no local time mapping");
            }
        }
    }
    LoadSeries::new(samples, step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_load_csv_ok() -> Result {
        let csv = "timestamp,kw\n2024-01-01 00:00,10.5\n2024-01-01 00:15,11.0\n";
        let load = parse_load_csv(csv.as_bytes(), TimeDelta::minutes(15))?;
        assert_eq!(load.len(), 2);
        assert_eq!(load.samples()[0].1, Kilowatts::from(10.5));
        Ok(())
    }

    #[test]
    fn test_parse_load_csv_rejects_bad_timestamp() {
        let csv = "timestamp,kw\n01/01/2024,10.5\n";
        assert!(parse_load_csv(csv.as_bytes(), TimeDelta::minutes(15)).is_err());
    }

    #[test]
    fn test_parse_load_csv_rejects_unsorted_rows() {
        let csv = "timestamp,kw\n2024-01-01 01:00,10.5\n2024-01-01 00:00,11.0\n";
        assert!(parse_load_csv(csv.as_bytes(), TimeDelta::hours(1)).is_err());
    }
}
