use std::{
    fmt::Display,
    ops::{Add, AddAssign},
};

use super::Watt;
use crate::core::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct KiloWattHours(pub f64);

impl KiloWattHours {
    /// Energy of a constant `power` drawn over `duration`.
    pub fn of(power: Watt, duration: Duration) -> Self {
        KiloWattHours(power.0 * duration.as_hours_f64() / 1000.0)
    }
}

impl Display for KiloWattHours {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4} kWh", self.0)
    }
}

impl Add for KiloWattHours {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        KiloWattHours(self.0 + rhs.0)
    }
}

impl AddAssign for KiloWattHours {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::iter::Sum for KiloWattHours {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(KiloWattHours::default(), |acc, v| acc + v)
    }
}
