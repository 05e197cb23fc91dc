use std::collections::BTreeMap;

use rand::Rng as _;
use reqwest_middleware::ClientWithMiddleware;
use tokio::sync::watch;

use crate::core::unit::{MilliAmpere, Volt};
use crate::meter::{ChannelConfig, MeterConfig, Reading};

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum PollFailure {
    #[display("Error reaching meter: {_0}")]
    Transport(#[error(not(source))] String),
    #[display("Meter responded with status {_0}")]
    Status(#[error(not(source))] u16),
    #[display("Invalid meter payload: {_0}")]
    Payload(#[error(not(source))] String),
}

impl PollFailure {
    pub fn label(&self) -> &'static str {
        match self {
            PollFailure::Transport(_) => "transport",
            PollFailure::Status(_) => "status",
            PollFailure::Payload(_) => "payload",
        }
    }
}

pub trait ReadingSource: Send + Sync {
    fn fetch(&self) -> impl Future<Output = Result<Reading, PollFailure>> + Send;
}

pub struct HttpReadingSource {
    client: ClientWithMiddleware,
    config: MeterConfig,
}

impl HttpReadingSource {
    pub fn new(config: MeterConfig) -> anyhow::Result<Self> {
        let client = infrastructure::HttpClientConfig::new(Some(config.request_timeout.into()))
            .new_tracing_client()?;

        Ok(Self { client, config })
    }
}

impl ReadingSource for HttpReadingSource {
    #[tracing::instrument(skip(self), fields(url = %self.config.url))]
    async fn fetch(&self) -> Result<Reading, PollFailure> {
        let response = self
            .client
            .get(&self.config.url)
            .send()
            .await
            .map_err(|e| PollFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollFailure::Status(status.as_u16()));
        }

        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| PollFailure::Payload(e.to_string()))?;

        tracing::trace!("Meter responded with {}", body);

        Reading::parse(&body, &self.config)
    }
}

/// Synthetic readings. Most of the time the loads draw their typical current at
/// mains voltage, otherwise voltage and currents are low.
pub struct DemoReadingSource {
    channels: Vec<ChannelConfig>,
}

impl DemoReadingSource {
    pub fn new(channels: Vec<ChannelConfig>) -> Self {
        Self { channels }
    }

    fn generate(&self) -> Reading {
        let mut rng = rand::thread_rng();
        let is_on = rng.gen_bool(0.9);

        let voltage = if is_on {
            rng.gen_range(225.0..235.0)
        } else {
            rng.gen_range(6.0..25.0)
        };

        let currents: BTreeMap<String, Option<MilliAmpere>> = self
            .channels
            .iter()
            .map(|channel| {
                let factor = if is_on {
                    rng.gen_range(0.9..1.1)
                } else {
                    rng.gen_range(0.02..0.1)
                };

                (channel.id.clone(), Some(MilliAmpere(channel.demo_current * factor)))
            })
            .collect();

        Reading {
            voltage: Some(Volt(voltage)),
            currents,
        }
    }
}

impl ReadingSource for DemoReadingSource {
    async fn fetch(&self) -> Result<Reading, PollFailure> {
        Ok(self.generate())
    }
}

/// Reads from the demo source while demo mode is on, from the meter otherwise.
pub struct SwitchingSource<L, D> {
    live: L,
    demo: D,
    demo_mode: watch::Receiver<bool>,
}

impl<L: ReadingSource, D: ReadingSource> SwitchingSource<L, D> {
    pub fn new(live: L, demo: D, demo_mode: watch::Receiver<bool>) -> Self {
        Self { live, demo, demo_mode }
    }
}

impl<L: ReadingSource, D: ReadingSource> ReadingSource for SwitchingSource<L, D> {
    async fn fetch(&self) -> Result<Reading, PollFailure> {
        let demo_mode = *self.demo_mode.borrow();

        if demo_mode {
            self.demo.fetch().await
        } else {
            self.live.fetch().await
        }
    }
}
