use config::{Config, ConfigError, Environment, File};
use infrastructure::{DatabaseConfig, HttpServerConfig, MonitoringConfig};
use serde::Deserialize;

use crate::core::time::Duration;
use crate::meter::MeterConfig;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub http_server: HttpServerConfig,
    pub monitoring: MonitoringConfig,
    pub meter: MeterConfig,
    pub schedule: JobSettings,
    pub usage: JobSettings,
}

/// A periodic background job that can be switched off.
#[derive(Debug, Deserialize, Clone)]
pub struct JobSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub interval: Duration,
}

fn default_enabled() -> bool {
    true
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(Config::builder().add_source(File::with_name("config.toml")))
    }

    fn load(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self, ConfigError> {
        let settings: Self = builder
            .add_source(Environment::default().separator("_").list_separator(","))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    //timers need a period of at least one millisecond
    fn validate(&self) -> Result<(), ConfigError> {
        for (key, interval) in [
            ("meter.poll_interval", self.meter.poll_interval),
            ("schedule.interval", self.schedule.interval),
            ("usage.interval", self.usage.interval),
        ] {
            if interval.as_millis() <= 0 {
                return Err(ConfigError::Message(format!(
                    "{key} must be a positive duration, got {interval}"
                )));
            }
        }

        Ok(())
    }

    #[cfg(test)]
    fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        Self::load(Config::builder().add_source(File::from_str(toml, config::FileFormat::Toml)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bundled_config() {
        let settings = Settings::from_toml(include_str!("../../config.toml")).unwrap();

        assert_eq!(settings.meter.url, "http://192.168.0.114/data");
        assert_eq!(settings.meter.poll_interval.as_secs(), 5);
        assert_eq!(settings.meter.request_timeout.as_secs(), 4);
        assert_eq!(settings.meter.voltage_field, "voltage");

        let channels: Vec<(&str, &str)> = settings
            .meter
            .channels
            .iter()
            .map(|c| (c.id.as_str(), c.field.as_str()))
            .collect();
        assert_eq!(
            channels,
            vec![
                ("incandescent", "currentIncandescent"),
                ("led", "currentLed"),
                ("socket", "currentSocket"),
            ]
        );

        assert_eq!(settings.meter.groups[0].name, "Bedroom 2");
        assert!(settings.schedule.enabled);
        assert_eq!(settings.schedule.interval.as_secs(), 30);
        assert_eq!(settings.usage.interval.as_minutes(), 5);
    }

    #[test]
    fn rejects_zero_intervals() {
        let bundled = include_str!("../../config.toml");

        for (from, to) in [
            ("poll_interval = \"PT5S\"", "poll_interval = \"PT0S\""),
            ("interval = \"PT30S\"", "interval = \"PT0S\""),
            ("interval = \"PT5M\"", "interval = \"PT0S\""),
        ] {
            let toml = bundled.replacen(from, to, 1);
            assert_ne!(toml, bundled);

            let err = Settings::from_toml(&toml).unwrap_err();
            assert!(err.to_string().contains("must be a positive duration"), "{err}");
        }
    }
}
