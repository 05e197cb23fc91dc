use crate::core::time::{DateTime, Duration};
use crate::device::DeviceClient;

/// Periodically books the energy of all devices that are switched on, assuming
/// they ran at their rated power for the whole interval.
pub struct UsageTracker {
    devices: DeviceClient,
    interval: Duration,
}

impl UsageTracker {
    pub fn new(devices: DeviceClient, interval: Duration) -> Self {
        Self { devices, interval }
    }

    pub async fn run(self) {
        let mut timer = tokio::time::interval(self.interval.into());
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        //first tick completes immediately, nothing to book yet
        timer.tick().await;

        loop {
            timer.tick().await;
            self.track(DateTime::now()).await;
        }
    }

    async fn track(&self, now: DateTime) {
        let active = self.devices.list().into_iter().filter(|device| device.is_on);

        for device in active {
            if let Err(e) = self.devices.record_usage(&device.id, self.interval, now).await {
                tracing::error!("Error recording usage of device {}: {:?}", device.id, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::unit::Watt;
    use crate::device::{DeviceModule, NewDevice};
    use crate::t;

    #[sqlx::test(migrations = "./migrations")]
    async fn books_usage_only_for_active_devices(pool: sqlx::SqlitePool) {
        let module = DeviceModule::new(pool).await.unwrap();
        let devices = module.client();

        let on = devices
            .add(NewDevice {
                name: "Kettle".to_owned(),
                room_id: "2".to_owned(),
                power_rating: Watt(1200.0),
                is_on: true,
                schedules: vec![],
                category: None,
            })
            .await
            .unwrap();
        let off = devices
            .add(NewDevice {
                name: "Oven".to_owned(),
                room_id: "2".to_owned(),
                power_rating: Watt(3000.0),
                is_on: false,
                schedules: vec![],
                category: None,
            })
            .await
            .unwrap();

        let tracker = UsageTracker::new(devices.clone(), t!(5 minutes));
        tracker.track(t!(now)).await;

        let on = devices.get(&on.id).unwrap();
        assert_eq!(on.usage_history.len(), 1);
        assert!((on.usage_history[0].power_used.0 - 0.1).abs() < 1e-9);
        assert!(devices.get(&off.id).unwrap().usage_history.is_empty());
    }
}
