mod domain;
mod schedule;
mod service;
mod usage;

pub use domain::*;
pub use schedule::ScheduleRunner;
pub use usage::UsageTracker;

use std::{collections::BTreeMap, sync::Arc};

use serde::Serialize;

use crate::core::{
    Registry, RegistryError, Subscription,
    persistence::EntityRepository,
    time::{DateTime, Duration},
    unit::KiloWattHours,
};
use service::DeviceService;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceUsage {
    pub daily: KiloWattHours,
    pub weekly: KiloWattHours,
    pub monthly: KiloWattHours,
}

pub struct DeviceModule {
    service: Arc<DeviceService>,
}

#[derive(Clone)]
pub struct DeviceClient {
    service: Arc<DeviceService>,
}

impl DeviceModule {
    pub async fn new(pool: sqlx::SqlitePool) -> anyhow::Result<Self> {
        let registry = Registry::load(EntityRepository::new(pool)).await?;

        Ok(Self {
            service: Arc::new(DeviceService::new(registry)),
        })
    }

    pub fn client(&self) -> DeviceClient {
        DeviceClient {
            service: self.service.clone(),
        }
    }

    pub fn schedule_runner(&self, interval: Duration) -> ScheduleRunner {
        ScheduleRunner::new(self.client(), interval)
    }

    pub fn usage_tracker(&self, interval: Duration) -> UsageTracker {
        UsageTracker::new(self.client(), interval)
    }
}

impl DeviceClient {
    pub fn list(&self) -> Vec<Device> {
        self.service.list()
    }

    pub fn get(&self, id: &str) -> Option<Device> {
        self.service.get(id)
    }

    pub fn subscribe(&self) -> Subscription<Device> {
        self.service.subscribe()
    }

    pub async fn add(&self, new_device: NewDevice) -> anyhow::Result<Device> {
        self.service.add(new_device).await
    }

    pub async fn update(&self, id: &str, update: DeviceUpdate) -> anyhow::Result<Device> {
        self.service.update(id, update).await
    }

    pub async fn delete(&self, id: &str) -> anyhow::Result<()> {
        self.service.delete(id).await
    }

    pub async fn toggle(&self, id: &str) -> anyhow::Result<Device> {
        self.service.toggle(id).await
    }

    pub async fn add_schedule(&self, id: &str, schedule: Schedule) -> anyhow::Result<Device> {
        self.service.add_schedule(id, schedule).await
    }

    pub async fn remove_schedule(&self, id: &str, index: usize) -> anyhow::Result<Device> {
        self.service.remove_schedule(id, index).await
    }

    pub async fn update_category(&self, id: &str, category: DeviceCategory) -> anyhow::Result<Device> {
        self.service.update_category(id, category).await
    }

    pub async fn record_usage(&self, id: &str, duration: Duration, now: DateTime) -> anyhow::Result<Device> {
        self.service.record_usage(id, duration, now).await
    }

    pub fn usage(&self, id: &str, now: DateTime) -> Result<DeviceUsage, RegistryError> {
        self.service.usage(id, now)
    }

    pub fn usage_by_category(&self, now: DateTime) -> BTreeMap<DeviceCategory, KiloWattHours> {
        self.service.usage_by_category(now)
    }
}
