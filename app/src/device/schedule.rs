use crate::core::time::{DateTime, Duration};
use crate::device::{Device, DeviceClient};

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub device_id: String,
    pub turn_on: bool,
}

/// Devices that have to be switched now. Only the first schedule matching the
/// current minute and weekday counts, and only if it differs from the device's
/// current state. A minute that is never evaluated is not caught up.
pub fn due_transitions(devices: &[Device], now: &DateTime) -> Vec<Transition> {
    devices
        .iter()
        .filter_map(|device| {
            let schedule = device.schedules.iter().find(|schedule| schedule.matches(now))?;

            (schedule.turn_on != device.is_on).then(|| Transition {
                device_id: device.id.clone(),
                turn_on: schedule.turn_on,
            })
        })
        .collect()
}

pub struct ScheduleRunner {
    devices: DeviceClient,
    interval: Duration,
}

impl ScheduleRunner {
    pub fn new(devices: DeviceClient, interval: Duration) -> Self {
        Self { devices, interval }
    }

    pub async fn run(self) {
        let mut timer = tokio::time::interval(self.interval.into());
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            timer.tick().await;
            self.evaluate(DateTime::now()).await;
        }
    }

    #[tracing::instrument(skip(self))]
    async fn evaluate(&self, now: DateTime) {
        let transitions = due_transitions(&self.devices.list(), &now);
        self.apply(transitions).await;
    }

    async fn apply(&self, transitions: Vec<Transition>) {
        for transition in transitions {
            //state might have changed since the snapshot, toggle only if still different
            let still_due = self
                .devices
                .get(&transition.device_id)
                .is_some_and(|device| device.is_on != transition.turn_on);

            if !still_due {
                tracing::debug!("Device {} already switched, skipping schedule", transition.device_id);
                continue;
            }

            tracing::info!(
                "Schedule switches device {} {}",
                transition.device_id,
                super::service::on_off(transition.turn_on)
            );

            if let Err(e) = self.devices.toggle(&transition.device_id).await {
                tracing::error!("Error switching device {} by schedule: {:?}", transition.device_id, e);
            }
        }
    }
}
