use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::{DataPoint, time::DateTime, time::Duration};
use crate::meter::{PollFailure, Reading, ReadingSource};

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Reading(DataPoint<Reading>),
    Failure(DataPoint<PollFailure>),
}

/// Fetches from the source once right away and then once per interval. Fetches
/// never overlap, ticks missed by a slow fetch are skipped.
pub struct Poller<S> {
    source: S,
    interval: Duration,
    outcomes: mpsc::Sender<PollOutcome>,
    stop: CancellationToken,
}

impl<S: ReadingSource> Poller<S> {
    pub fn new(source: S, interval: Duration, outcomes: mpsc::Sender<PollOutcome>) -> Self {
        Self {
            source,
            interval,
            outcomes,
            stop: CancellationToken::new(),
        }
    }

    pub fn stopped_by(mut self, stop: CancellationToken) -> Self {
        self.stop = stop;
        self
    }

    /// Cancelling the token stops scheduling further fetches. A fetch already in
    /// flight still completes and its outcome is delivered.
    pub fn stop_handle(&self) -> CancellationToken {
        self.stop.clone()
    }

    pub async fn run(self) {
        let mut timer = tokio::time::interval(self.interval.into());
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        tracing::info!("Start polling meter every {}", self.interval);

        loop {
            tokio::select! {
                biased;
                _ = self.stop.cancelled() => break,
                _ = timer.tick() => {},
            }

            let outcome = match self.source.fetch().await {
                Ok(reading) => PollOutcome::Reading(DataPoint::new(reading, DateTime::now())),
                Err(failure) => {
                    tracing::debug!("Polling meter failed: {}", failure);
                    PollOutcome::Failure(DataPoint::new(failure, DateTime::now()))
                }
            };

            if self.outcomes.send(outcome).await.is_err() {
                tracing::warn!("Receiver of meter readings is gone");
                break;
            }
        }

        tracing::info!("Stopped polling meter");
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        sync::{Arc, Mutex},
    };

    use tokio::sync::Notify;

    use super::*;
    use crate::core::unit::Volt;
    use crate::t;

    struct ScriptedSource {
        results: Mutex<VecDeque<Result<Reading, PollFailure>>>,
    }

    impl ScriptedSource {
        fn new(results: Vec<Result<Reading, PollFailure>>) -> Self {
            Self {
                results: Mutex::new(results.into()),
            }
        }
    }

    impl ReadingSource for ScriptedSource {
        async fn fetch(&self) -> Result<Reading, PollFailure> {
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(PollFailure::Transport("exhausted".to_owned())))
        }
    }

    //blocks every fetch until the gate is opened
    struct GatedSource {
        started: Arc<Notify>,
        gate: Arc<Notify>,
    }

    impl ReadingSource for GatedSource {
        async fn fetch(&self) -> Result<Reading, PollFailure> {
            self.started.notify_one();
            self.gate.notified().await;
            Ok(reading(229.0))
        }
    }

    fn reading(voltage: f64) -> Reading {
        Reading {
            voltage: Some(Volt(voltage)),
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_publishes_no_reading_and_polling_continues() {
        let source = ScriptedSource::new(vec![Err(PollFailure::Status(503)), Ok(reading(230.0))]);
        let (tx, mut rx) = mpsc::channel(8);
        let poller = Poller::new(source, t!(5 seconds), tx);
        let stop = poller.stop_handle();
        let task = tokio::spawn(poller.run());

        match rx.recv().await {
            Some(PollOutcome::Failure(failure)) => assert_eq!(failure.value, PollFailure::Status(503)),
            other => panic!("Expected failure, got {:?}", other),
        }

        match rx.recv().await {
            Some(PollOutcome::Reading(reading)) => assert_eq!(reading.value.voltage, Some(Volt(230.0))),
            other => panic!("Expected reading, got {:?}", other),
        }

        stop.cancel();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn first_fetch_happens_immediately() {
        let source = ScriptedSource::new(vec![Ok(reading(231.0))]);
        let (tx, mut rx) = mpsc::channel(8);
        let poller = Poller::new(source, t!(1 hours), tx);
        let stop = poller.stop_handle();
        let started = tokio::time::Instant::now();
        let task = tokio::spawn(poller.run());

        assert!(matches!(rx.recv().await, Some(PollOutcome::Reading(_))));
        assert_eq!(started.elapsed(), std::time::Duration::ZERO);

        stop.cancel();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_poller_closes_channel() {
        let source = ScriptedSource::new(vec![]);
        let (tx, mut rx) = mpsc::channel(8);
        let poller = Poller::new(source, t!(5 seconds), tx);
        poller.stop_handle().cancel();

        poller.run().await;

        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_in_flight_completes_after_stop() {
        let started = Arc::new(Notify::new());
        let gate = Arc::new(Notify::new());
        let source = GatedSource {
            started: started.clone(),
            gate: gate.clone(),
        };
        let (tx, mut rx) = mpsc::channel(8);
        let poller = Poller::new(source, t!(5 seconds), tx);
        let stop = poller.stop_handle();
        let task = tokio::spawn(poller.run());

        started.notified().await;
        stop.cancel();
        gate.notify_one();

        match rx.recv().await {
            Some(PollOutcome::Reading(reading)) => assert_eq!(reading.value.voltage, Some(Volt(229.0))),
            other => panic!("Expected reading, got {:?}", other),
        }
        assert_eq!(rx.recv().await, None);
        task.await.unwrap();
    }
}
