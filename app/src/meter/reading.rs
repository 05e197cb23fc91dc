use std::collections::BTreeMap;

use serde_json::Value;

use crate::core::unit::{MilliAmpere, Volt};
use crate::meter::{MeterConfig, PollFailure};

/// One sample of the meter. Fields that were missing or failed validation are `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reading {
    pub voltage: Option<Volt>,
    pub currents: BTreeMap<String, Option<MilliAmpere>>,
}

impl Reading {
    pub fn parse(body: &Value, config: &MeterConfig) -> Result<Self, PollFailure> {
        let fields = body
            .as_object()
            .ok_or_else(|| PollFailure::Payload(format!("expected JSON object, got {}", body)))?;

        let voltage = fields
            .get(&config.voltage_field)
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite() && *v > 0.0)
            .map(Volt);

        let currents = config
            .channels
            .iter()
            .map(|channel| {
                let current = fields
                    .get(&channel.field)
                    .and_then(Value::as_f64)
                    .filter(|v| v.is_finite() && *v >= 0.0)
                    .map(MilliAmpere);

                (channel.id.clone(), current)
            })
            .collect();

        Ok(Self { voltage, currents })
    }

    pub fn current(&self, channel: &str) -> Option<MilliAmpere> {
        self.currents.get(channel).copied().flatten()
    }
}
