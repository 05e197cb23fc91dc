mod accumulator;
mod config;
mod metrics;
mod poller;
mod reading;
mod report;
mod source;

pub use accumulator::EnergyAccumulator;
pub use config::{ChannelConfig, GroupConfig, MeterConfig};
pub use poller::{PollOutcome, Poller};
pub use reading::Reading;
pub use report::EnergyReport;
pub use source::{DemoReadingSource, HttpReadingSource, PollFailure, ReadingSource, SwitchingSource};

use std::sync::Arc;

use infrastructure::{EventBus, EventListener};
use serde::Serialize;
use tokio::sync::{RwLock, mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::core::{DataPoint, time::DateTime};
use crate::profile::ProfileClient;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ConnectionStatus {
    Unknown,
    Connected { last_reading: DateTime },
    Disconnected { since: DateTime, reason: String },
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected { .. })
    }
}

#[derive(Debug, Clone)]
pub enum MeterEvent {
    ReadingAccepted(DataPoint<Reading>),
    PollFailed(DataPoint<PollFailure>),
    ConnectionChanged(ConnectionStatus),
}

struct MeterState {
    accumulator: RwLock<EnergyAccumulator>,
    status: watch::Sender<ConnectionStatus>,
    events: EventBus<MeterEvent>,
}

impl MeterState {
    fn new(config: &MeterConfig, started_at: DateTime) -> Self {
        let channel_ids = config.channels.iter().map(|c| c.id.as_str());

        Self {
            accumulator: RwLock::new(EnergyAccumulator::new(channel_ids, started_at)),
            status: watch::Sender::new(ConnectionStatus::Unknown),
            events: EventBus::new(64),
        }
    }

    async fn handle(&self, outcome: PollOutcome) {
        let emitter = self.events.emitter();

        match outcome {
            PollOutcome::Reading(reading) => {
                self.accumulator.write().await.apply(&reading.value, reading.timestamp);

                let previous = self.status.send_replace(ConnectionStatus::Connected {
                    last_reading: reading.timestamp,
                });

                if !previous.is_connected() {
                    match previous {
                        ConnectionStatus::Disconnected { since, .. } => {
                            tracing::info!("Meter connected again, unreachable since {}", since.to_human_readable())
                        }
                        _ => tracing::info!("Meter connected"),
                    }
                    emitter.send(MeterEvent::ConnectionChanged(self.status.borrow().clone()));
                }

                emitter.send(MeterEvent::ReadingAccepted(reading));
            }

            PollOutcome::Failure(failure) => {
                let already_disconnected = matches!(*self.status.borrow(), ConnectionStatus::Disconnected { .. });

                if !already_disconnected {
                    tracing::warn!("Meter disconnected: {}", failure.value);

                    let status = ConnectionStatus::Disconnected {
                        since: failure.timestamp,
                        reason: failure.value.to_string(),
                    };
                    self.status.send_replace(status.clone());
                    emitter.send(MeterEvent::ConnectionChanged(status));
                }

                emitter.send(MeterEvent::PollFailed(failure));
            }
        }
    }
}

pub struct MeterModule {
    config: MeterConfig,
    state: Arc<MeterState>,
    profile: ProfileClient,
    stop: CancellationToken,
}

#[derive(Clone)]
pub struct MeterClient {
    state: Arc<MeterState>,
    groups: Arc<[GroupConfig]>,
    profile: ProfileClient,
}

impl MeterModule {
    pub fn new(config: MeterConfig, profile: ProfileClient) -> Self {
        let state = MeterState::new(&config, DateTime::now());

        Self {
            config,
            state: Arc::new(state),
            profile,
            stop: CancellationToken::new(),
        }
    }

    pub fn client(&self) -> MeterClient {
        MeterClient {
            state: self.state.clone(),
            groups: self.config.groups.clone().into(),
            profile: self.profile.clone(),
        }
    }

    /// Stops polling. Outcomes already received are still processed before `run` returns.
    pub fn stop_handle(&self) -> CancellationToken {
        self.stop.clone()
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let source = SwitchingSource::new(
            HttpReadingSource::new(self.config.clone())?,
            DemoReadingSource::new(self.config.channels.clone()),
            self.profile.watch_demo_mode(),
        );

        let (tx, mut rx) = mpsc::channel(16);
        let poller = Poller::new(source, self.config.poll_interval, tx).stopped_by(self.stop.clone());

        let metrics = metrics::record(self.state.events.subscribe());

        let process = async {
            while let Some(outcome) = rx.recv().await {
                self.state.handle(outcome).await;
            }
        };

        tokio::select! {
            _ = async { tokio::join!(poller.run(), process) } => {},
            _ = metrics => {},
        }

        Ok(())
    }
}

impl MeterClient {
    pub async fn energy_report(&self) -> EnergyReport {
        let acc = self.state.accumulator.read().await;
        EnergyReport::new(&acc, &self.groups, &self.profile.billing(), DateTime::now())
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.state.status.borrow().clone()
    }

    pub fn subscribe(&self) -> EventListener<MeterEvent> {
        self.state.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::unit::{MilliAmpere, Volt};
    use crate::t;

    async fn module(pool: sqlx::SqlitePool) -> MeterModule {
        let profile = ProfileClient::load(pool).await.unwrap();
        MeterModule::new(MeterConfig::for_test("http://127.0.0.1:9/data"), profile)
    }

    fn reading_at(timestamp: DateTime) -> PollOutcome {
        PollOutcome::Reading(DataPoint::new(
            Reading {
                voltage: Some(Volt(230.0)),
                currents: [("incandescent".to_owned(), Some(MilliAmpere(634.0)))].into(),
            },
            timestamp,
        ))
    }

    fn failure_at(timestamp: DateTime) -> PollOutcome {
        PollOutcome::Failure(DataPoint::new(PollFailure::Status(502), timestamp))
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn failure_marks_disconnected_and_keeps_energy(pool: sqlx::SqlitePool) {
        let module = module(pool).await;
        let client = module.client();
        let now = t!(now);

        module.state.handle(reading_at(now + t!(5 seconds))).await;
        let energy_before = client.energy_report().await.total.energy;

        module.state.handle(failure_at(now + t!(10 seconds))).await;
        module.state.handle(failure_at(now + t!(15 seconds))).await;

        assert_eq!(
            client.connection_status(),
            ConnectionStatus::Disconnected {
                since: now + t!(10 seconds),
                reason: "Meter responded with status 502".to_owned()
            }
        );
        assert_eq!(client.energy_report().await.total.energy, energy_before);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn reading_after_failure_reconnects(pool: sqlx::SqlitePool) {
        let module = module(pool).await;
        let client = module.client();
        let mut events = client.subscribe();
        let now = t!(now);

        module.state.handle(failure_at(now)).await;
        module.state.handle(reading_at(now + t!(5 seconds))).await;

        assert!(matches!(
            events.recv().await,
            Some(MeterEvent::ConnectionChanged(ConnectionStatus::Disconnected { .. }))
        ));
        assert!(matches!(events.recv().await, Some(MeterEvent::PollFailed(_))));
        assert!(matches!(
            events.recv().await,
            Some(MeterEvent::ConnectionChanged(ConnectionStatus::Connected { .. }))
        ));
        assert!(matches!(events.recv().await, Some(MeterEvent::ReadingAccepted(_))));
        assert!(client.connection_status().is_connected());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn status_is_unknown_before_first_poll(pool: sqlx::SqlitePool) {
        let client = module(pool).await.client();

        assert_eq!(client.connection_status(), ConnectionStatus::Unknown);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn run_returns_after_stop(pool: sqlx::SqlitePool) {
        let module = module(pool).await;
        let client = module.client();
        let stop = module.stop_handle();
        let task = tokio::spawn(module.run());

        stop.cancel();
        task.await.unwrap().unwrap();

        assert!(!client.connection_status().is_connected());
    }
}
