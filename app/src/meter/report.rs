use serde::Serialize;

use crate::core::{
    time::DateTime,
    unit::{KiloWattHours, MilliAmpere, Volt, Watt},
};
use crate::meter::{EnergyAccumulator, GroupConfig};
use crate::profile::BillingProfile;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyReport {
    pub timestamp: DateTime,
    pub voltage: Option<Volt>,
    pub electricity_rate: f64,
    pub channels: Vec<ConsumptionReport>,
    pub groups: Vec<ConsumptionReport>,
    pub total: ConsumptionReport,
    pub monthly_bill_limit: Option<f64>,
    pub bill_limit_exceeded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionReport {
    pub name: String,
    pub current: Option<MilliAmpere>,
    pub power: Option<Watt>,
    pub energy: KiloWattHours,
    pub cost: f64,
}

impl EnergyReport {
    pub fn new(acc: &EnergyAccumulator, groups: &[GroupConfig], billing: &BillingProfile, now: DateTime) -> Self {
        let voltage = acc.voltage();
        let rate = billing.electricity_rate;

        let channels: Vec<ConsumptionReport> = acc
            .channels()
            .map(|(id, state)| consumption(id, voltage, state.current, state.energy, rate))
            .collect();

        let groups = groups
            .iter()
            .map(|group| {
                let members = channels.iter().filter(|c| group.channels.contains(&c.name));
                combined(&group.name, members, voltage, rate)
            })
            .collect();

        let total = combined("Total", channels.iter(), voltage, rate);

        //a limit of zero means no limit was set
        let bill_limit_exceeded = billing
            .monthly_bill_limit
            .is_some_and(|limit| limit > 0.0 && total.cost >= limit);

        Self {
            timestamp: now,
            voltage,
            electricity_rate: rate,
            channels,
            groups,
            total,
            monthly_bill_limit: billing.monthly_bill_limit,
            bill_limit_exceeded,
        }
    }
}

fn consumption(
    name: &str,
    voltage: Option<Volt>,
    current: Option<MilliAmpere>,
    energy: KiloWattHours,
    rate: f64,
) -> ConsumptionReport {
    let power = match (voltage, current) {
        (Some(v), Some(i)) => Some(Watt::of(v, i)),
        _ => None,
    };

    ConsumptionReport {
        name: name.to_owned(),
        current,
        power,
        energy,
        cost: energy.0 * rate,
    }
}

fn combined<'a>(
    name: &str,
    members: impl Iterator<Item = &'a ConsumptionReport>,
    voltage: Option<Volt>,
    rate: f64,
) -> ConsumptionReport {
    let mut current: Option<MilliAmpere> = None;
    let mut energy = KiloWattHours::default();

    for member in members {
        if let Some(i) = member.current {
            current = Some(MilliAmpere(current.unwrap_or_default().0 + i.0));
        }
        energy += member.energy;
    }

    consumption(name, voltage, current, energy, rate)
}
