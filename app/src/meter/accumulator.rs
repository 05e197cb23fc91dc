use std::collections::BTreeMap;

use crate::core::{
    time::{DateTime, Duration},
    unit::{KiloWattHours, MilliAmpere, Volt, Watt},
};
use crate::meter::Reading;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelState {
    pub current: Option<MilliAmpere>,
    pub energy: KiloWattHours,
}

/// Energy per channel since start. Totals only ever grow and live in memory only.
#[derive(Debug, Clone)]
pub struct EnergyAccumulator {
    voltage: Option<Volt>,
    channels: BTreeMap<String, ChannelState>,
    previous: DateTime,
}

impl EnergyAccumulator {
    pub fn new<'a>(channel_ids: impl IntoIterator<Item = &'a str>, started_at: DateTime) -> Self {
        Self {
            voltage: None,
            channels: channel_ids
                .into_iter()
                .map(|id| (id.to_owned(), ChannelState::default()))
                .collect(),
            previous: started_at,
        }
    }

    /// Adds the energy drawn since the previous sample, assuming the values of
    /// this reading held over the whole interval. Missing values fall back to the
    /// last accepted ones, or zero if none was ever received.
    pub fn apply(&mut self, reading: &Reading, now: DateTime) {
        let mut elapsed = now.elapsed_since(self.previous);
        if elapsed.is_negative() {
            tracing::warn!("Reading at {} is older than previous sample at {}", now, self.previous);
            elapsed = Duration::zero();
        }

        if reading.voltage.is_some() {
            self.voltage = reading.voltage;
        }
        let voltage = self.voltage.unwrap_or_default();

        for (id, state) in self.channels.iter_mut() {
            if let Some(current) = reading.current(id) {
                state.current = Some(current);
            }

            let power = Watt::of(voltage, state.current.unwrap_or_default());
            state.energy += KiloWattHours::of(power, elapsed);
        }

        self.previous = now;
    }

    pub fn voltage(&self) -> Option<Volt> {
        self.voltage
    }

    pub fn channel(&self, id: &str) -> Option<&ChannelState> {
        self.channels.get(id)
    }

    pub fn channels(&self) -> impl Iterator<Item = (&String, &ChannelState)> {
        self.channels.iter()
    }
}
