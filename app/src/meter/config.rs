use serde::Deserialize;

use crate::core::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct MeterConfig {
    pub url: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    #[serde(default = "default_voltage_field")]
    pub voltage_field: String,
    pub channels: Vec<ChannelConfig>,
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
}

/// A measured circuit and the payload field its current (mA) is read from.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    pub id: String,
    pub field: String,
    /// Typical current in mA while the load is on, used by the demo source.
    #[serde(default = "default_demo_current")]
    pub demo_current: f64,
}

/// Channels reported together, e.g. all circuits of one room.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupConfig {
    pub name: String,
    pub channels: Vec<String>,
}

fn default_voltage_field() -> String {
    "voltage".to_owned()
}

fn default_demo_current() -> f64 {
    300.0
}

#[cfg(test)]
impl MeterConfig {
    pub fn for_test(url: &str) -> Self {
        let channel = |id: &str, field: &str, demo_current: f64| ChannelConfig {
            id: id.to_owned(),
            field: field.to_owned(),
            demo_current,
        };

        Self {
            url: url.to_owned(),
            poll_interval: Duration::seconds(5),
            request_timeout: Duration::seconds(4),
            voltage_field: default_voltage_field(),
            channels: vec![
                channel("incandescent", "currentIncandescent", 634.0),
                channel("led", "currentLed", 256.0),
                channel("socket", "currentSocket", 294.0),
            ],
            groups: vec![GroupConfig {
                name: "Bedroom 2".to_owned(),
                channels: vec!["led".to_owned(), "socket".to_owned()],
            }],
        }
    }
}
