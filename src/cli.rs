mod bill;
mod tariff;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use self::{bill::bill, tariff::tariff};
use crate::{
    api::{OpenEi, UtilityRate},
    prelude::*,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute the monthly bill for a load profile against a tariff.
    Bill(Box<BillArgs>),

    /// Fetch a tariff and print its parsed schedule tables.
    Tariff(Box<TariffArgs>),
}

#[derive(Parser)]
pub struct BillArgs {
    /// Load profile CSV with `timestamp,kw` columns.
    #[clap(long = "load-csv")]
    pub load_path: PathBuf,

    /// Sampling interval of the load profile.
    #[clap(long = "step", default_value = "15m")]
    pub step: humantime::Duration,

    #[clap(flatten)]
    pub tariff: TariffSourceArgs,
}

#[derive(Parser)]
pub struct TariffArgs {
    #[clap(flatten)]
    pub tariff: TariffSourceArgs,
}

#[derive(Parser)]
pub struct TariffSourceArgs {
    /// Local URDB rate item JSON file, skips the OpenEI call.
    #[clap(long = "tariff-file")]
    pub tariff_file: Option<PathBuf>,

    /// OpenEI API key.
    #[clap(long = "openei-api-key", env = "OPENEI_API_KEY")]
    pub api_key: Option<String>,

    /// URDB rate page identifier.
    #[clap(long = "openei-rate-id", env = "OPENEI_RATE_ID")]
    pub rate_id: Option<String>,
}

impl TariffSourceArgs {
    pub fn fetch(&self) -> Result<UtilityRate> {
        if let Some(path) = &self.tariff_file {
            return UtilityRate::read_from(path);
        }
        let api_key = self
            .api_key
            .clone()
            .context("either `--tariff-file` or `--openei-api-key` is required")?;
        let rate_id = self.rate_id.as_deref().context("`--openei-rate-id` is required")?;
        OpenEi::new(api_key).get_utility_rate(rate_id)
    }
}
