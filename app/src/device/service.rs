use std::collections::BTreeMap;

use crate::core::{
    Registry, RegistryError, Subscription,
    time::{DateTime, Duration},
    unit::KiloWattHours,
};
use crate::device::{Device, DeviceCategory, DeviceUpdate, DeviceUsage, NewDevice, Schedule, UsageRecord};

pub struct DeviceService {
    registry: Registry<Device>,
}

impl DeviceService {
    pub fn new(registry: Registry<Device>) -> Self {
        Self { registry }
    }

    pub fn list(&self) -> Vec<Device> {
        self.registry.list()
    }

    pub fn get(&self, id: &str) -> Option<Device> {
        self.registry.get(id)
    }

    pub fn subscribe(&self) -> Subscription<Device> {
        self.registry.subscribe()
    }

    pub async fn add(&self, new_device: NewDevice) -> anyhow::Result<Device> {
        self.registry.insert_with(|id, _| new_device.into_device(id)).await
    }

    pub async fn update(&self, id: &str, update: DeviceUpdate) -> anyhow::Result<Device> {
        self.registry
            .modify(id, |device| {
                update.apply_to(device);
                Ok(())
            })
            .await
    }

    pub async fn delete(&self, id: &str) -> anyhow::Result<()> {
        self.registry.remove(id).await
    }

    pub async fn toggle(&self, id: &str) -> anyhow::Result<Device> {
        let device = self
            .registry
            .modify(id, |device| {
                device.is_on = !device.is_on;
                Ok(())
            })
            .await?;

        tracing::info!("Device {} ({}) switched {}", device.name, device.id, on_off(device.is_on));
        Ok(device)
    }

    pub async fn add_schedule(&self, id: &str, schedule: Schedule) -> anyhow::Result<Device> {
        self.registry
            .modify(id, |device| {
                device.schedules.push(schedule);
                Ok(())
            })
            .await
    }

    pub async fn remove_schedule(&self, id: &str, index: usize) -> anyhow::Result<Device> {
        self.registry
            .modify(id, |device| {
                if index >= device.schedules.len() {
                    return Err(RegistryError::ScheduleNotFound {
                        kind: "device",
                        id: device.id.clone(),
                        index,
                    });
                }

                device.schedules.remove(index);
                Ok(())
            })
            .await
    }

    pub async fn update_category(&self, id: &str, category: DeviceCategory) -> anyhow::Result<Device> {
        self.registry
            .modify(id, |device| {
                device.category = Some(category);
                Ok(())
            })
            .await
    }

    /// Appends the energy drawn by the device at its rated power over `duration`.
    /// Records no usage aggregate covers anymore are dropped on the way.
    pub async fn record_usage(&self, id: &str, duration: Duration, now: DateTime) -> anyhow::Result<Device> {
        let keep_since = retention_start(now);

        self.registry
            .modify(id, |device| {
                device.usage_history.retain(|record| record.timestamp >= keep_since);
                device.usage_history.push(UsageRecord {
                    timestamp: now,
                    power_used: KiloWattHours::of(device.power_rating, duration),
                });
                Ok(())
            })
            .await
    }

    pub fn usage(&self, id: &str, now: DateTime) -> Result<DeviceUsage, RegistryError> {
        let device = self.registry.get(id).ok_or_else(|| RegistryError::NotFound {
            kind: "device",
            id: id.to_owned(),
        })?;

        Ok(DeviceUsage {
            daily: usage_since(&device, now.start_of_day()),
            weekly: usage_since(&device, now.start_of_week()),
            monthly: usage_since(&device, now.start_of_month()),
        })
    }

    /// Today's usage summed per category. Devices without category count as other.
    pub fn usage_by_category(&self, now: DateTime) -> BTreeMap<DeviceCategory, KiloWattHours> {
        let start_of_day = now.start_of_day();
        let mut result = BTreeMap::new();

        for device in self.registry.list() {
            let category = device.category.unwrap_or_default();
            *result.entry(category).or_default() += usage_since(&device, start_of_day);
        }

        result
    }
}

//a week starting sunday can reach into the previous month
fn retention_start(now: DateTime) -> DateTime {
    now.start_of_week().min(now.start_of_month())
}

fn usage_since(device: &Device, since: DateTime) -> KiloWattHours {
    device
        .usage_history
        .iter()
        .filter(|record| record.timestamp >= since)
        .map(|record| record.power_used)
        .sum()
}

pub(super) fn on_off(is_on: bool) -> &'static str {
    if is_on { "on" } else { "off" }
}
