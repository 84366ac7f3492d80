//! [OpenEI URDB](https://openei.org/services/doc/rest/util_rates/) client.

use std::{collections::BTreeMap, path::Path, time::Duration};

use serde::Deserialize;
use ureq::Agent;

use crate::{
    core::{
        calendar::CalendarKey,
        schedule::{DemandTouRate, FlatDemandRate, MeterCharge, MeterChargeUnit, RateSchedule, TouRate},
    },
    prelude::*,
    quantity::{
        cost::Cost,
        rate::{KilowattHourRate, KilowattRate},
    },
};

pub struct Api {
    client: Agent,
    api_key: String,
}

impl Api {
    const URL: &'static str = "https://api.openei.org/utility_rates";

    pub fn new(api_key: String) -> Self {
        let client =
            Agent::config_builder().timeout_global(Some(Duration::from_secs(10))).build().into();
        Self { client, api_key }
    }

    /// Fetch a single URDB rate page.
    #[instrument(fields(page = page), skip_all)]
    pub fn get_utility_rate(&self, page: &str) -> Result<UtilityRate> {
        info!("fetching…");
        let response = self
            .client
            .get(Self::URL)
            .query("api_key", &self.api_key)
            .query("getpage", page)
            .query("format", "json")
            .query("version", "latest")
            .query("detail", "full")
            .call()?
            .body_mut()
            .read_json::<Response>()?;
        let mut items = response.items;
        ensure!(items.len() == 1, "expected exactly 1 rate, found {}", items.len());
        Ok(items.remove(0))
    }
}

#[derive(Deserialize)]
struct Response {
    items: Vec<UtilityRate>,
}

/// URDB rate item, as returned by the API with `detail=full`.
///
/// The schedule matrices are 12 × 24 tables of period identifiers, months
/// 0-indexed; each rate structure is a list of periods, each holding one
/// or more tiers.
#[derive(Deserialize)]
pub struct UtilityRate {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(rename = "energyratestructure", default)]
    energy_rates: Vec<Vec<TierRate>>,

    #[serde(rename = "energyweekdayschedule", default)]
    energy_weekday_schedule: Vec<Vec<usize>>,

    #[serde(rename = "energyweekendschedule", default)]
    energy_weekend_schedule: Vec<Vec<usize>>,

    #[serde(rename = "demandratestructure", default)]
    demand_rates: Vec<Vec<TierRate>>,

    #[serde(rename = "demandweekdayschedule", default)]
    demand_weekday_schedule: Vec<Vec<usize>>,

    #[serde(rename = "demandweekendschedule", default)]
    demand_weekend_schedule: Vec<Vec<usize>>,

    #[serde(rename = "flatdemandstructure", default)]
    flat_demand_rates: Vec<Vec<TierRate>>,

    #[serde(rename = "flatdemandmonths", default)]
    flat_demand_months: Vec<usize>,

    #[serde(rename = "fixedchargefirstmeter", default)]
    fixed_charge_first_meter: Option<f64>,

    #[serde(rename = "fixedchargeunits", default)]
    fixed_charge_units: Option<String>,
}

#[derive(Copy, Clone, Deserialize)]
struct TierRate {
    rate: f64,
}

impl UtilityRate {
    /// Read a URDB rate item from a local JSON file.
    pub fn read_from(path: &Path) -> Result<Self> {
        serde_json::from_slice(&std::fs::read(path)?)
            .with_context(|| format!("failed to parse the rate item at `{}`", path.display()))
    }

    /// Expand the URDB structures into the four schedule tables.
    pub fn into_schedule(self) -> Result<RateSchedule> {
        let flat_demand = self.expand_flat_demand()?;
        let meter = self.meter_charge()?;
        let energy = expand_tou(
            &self.energy_rates,
            &self.energy_weekday_schedule,
            &self.energy_weekend_schedule,
        )
        .context("invalid energy rate structure")?
        .into_iter()
        .map(|(key, (period, rate))| {
            (key, TouRate { period, rate: KilowattHourRate::from(rate) })
        })
        .collect();
        let demand = expand_tou(
            &self.demand_rates,
            &self.demand_weekday_schedule,
            &self.demand_weekend_schedule,
        )
        .context("invalid demand rate structure")?
        .into_iter()
        .map(|(key, (period, rate))| {
            (key, vec![DemandTouRate { period, rate: KilowattRate::from(rate) }])
        })
        .collect();

        Ok(RateSchedule::builder()
            .name(self.name)
            .maybe_description(self.description)
            .energy(energy)
            .demand(demand)
            .flat_demand(flat_demand)
            .maybe_meter(meter)
            .build())
    }

    fn expand_flat_demand(&self) -> Result<BTreeMap<u32, FlatDemandRate>> {
        if self.flat_demand_rates.is_empty() && self.flat_demand_months.is_empty() {
            return Ok(BTreeMap::new());
        }
        ensure!(
            self.flat_demand_months.len() == 12,
            "expected 12 flat demand months, found {}",
            self.flat_demand_months.len(),
        );
        let mut table = BTreeMap::new();
        for (month_index, period) in self.flat_demand_months.iter().enumerate() {
            let rate = first_tier_rate(&self.flat_demand_rates, *period)
                .context("invalid flat demand rate structure")?;
            #[allow(clippy::cast_possible_truncation)]
            let month = month_index as u32 + 1;
            table.insert(month, FlatDemandRate { period: *period, rate: KilowattRate::from(rate) });
        }
        Ok(table)
    }

    fn meter_charge(&self) -> Result<Option<MeterCharge>> {
        let Some(rate) = self.fixed_charge_first_meter else {
            return Ok(None);
        };
        let unit = self.fixed_charge_units.as_deref().unwrap_or_default();
        let unit = unit.parse::<MeterChargeUnit>()?;
        Ok(Some(MeterCharge { unit, rate: Cost::from(rate) }))
    }
}

/// Expand weekday and weekend 12 × 24 period matrices into a fully keyed
/// rate table. URDB months are 0-indexed, the calendar keys 1-indexed.
fn expand_tou(
    rates: &[Vec<TierRate>],
    weekday_schedule: &[Vec<usize>],
    weekend_schedule: &[Vec<usize>],
) -> Result<BTreeMap<CalendarKey, (usize, f64)>> {
    if rates.is_empty() {
        return Ok(BTreeMap::new());
    }
    let mut table = BTreeMap::new();
    for (is_weekday, schedule) in [(false, weekend_schedule), (true, weekday_schedule)] {
        ensure!(schedule.len() == 12, "expected 12 months, found {}", schedule.len());
        for (month_index, hours) in schedule.iter().enumerate() {
            ensure!(hours.len() == 24, "expected 24 hours, found {}", hours.len());
            for (hour, period) in hours.iter().enumerate() {
                let rate = first_tier_rate(rates, *period)?;
                #[allow(clippy::cast_possible_truncation)]
                let key = CalendarKey {
                    is_weekday,
                    month: month_index as u32 + 1,
                    hour: hour as u32,
                };
                table.insert(key, (*period, rate));
            }
        }
    }
    Ok(table)
}

fn first_tier_rate(rates: &[Vec<TierRate>], period: usize) -> Result<f64> {
    let tiers =
        rates.get(period).with_context(|| format!("period {period} is out of range"))?;
    let tier = tiers.first().with_context(|| format!("period {period} has no tiers"))?;
    Ok(tier.rate)
}
