use std::fmt::Display;

use super::{MilliAmpere, Volt};

#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Watt(pub f64);

impl Watt {
    pub fn of(voltage: Volt, current: MilliAmpere) -> Self {
        Watt(voltage.0 * current.0 / 1000.0)
    }
}

impl Display for Watt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} W", self.0)
    }
}

