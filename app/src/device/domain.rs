use serde::{Deserialize, Serialize};

use crate::core::persistence::Entity;
use crate::core::time::{DateTime, Time, Weekday};
use crate::core::unit::{KiloWattHours, Watt};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub name: String,
    pub room_id: String,
    pub power_rating: Watt,
    pub is_on: bool,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
    #[serde(default)]
    pub usage_history: Vec<UsageRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<DeviceCategory>,
}

impl Entity for Device {
    const KIND: &'static str = "device";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub time: Time,
    #[serde(rename = "action")]
    pub turn_on: bool,
    pub days: Vec<Weekday>,
}

impl Schedule {
    pub fn matches(&self, now: &DateTime) -> bool {
        self.time.same_minute(&now.time()) && self.days.contains(&now.weekday())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub timestamp: DateTime,
    pub power_used: KiloWattHours,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum DeviceCategory {
    #[display("lighting")]
    Lighting,
    #[display("hvac")]
    Hvac,
    #[display("appliance")]
    Appliance,
    #[display("entertainment")]
    Entertainment,
    #[default]
    #[display("other")]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDevice {
    pub name: String,
    pub room_id: String,
    pub power_rating: Watt,
    #[serde(default)]
    pub is_on: bool,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
    #[serde(default)]
    pub category: Option<DeviceCategory>,
}

impl NewDevice {
    pub(super) fn into_device(self, id: String) -> Device {
        Device {
            id,
            name: self.name,
            room_id: self.room_id,
            power_rating: self.power_rating,
            is_on: self.is_on,
            schedules: self.schedules,
            usage_history: vec![],
            category: self.category,
        }
    }
}

/// Partial update, only given fields are changed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceUpdate {
    pub name: Option<String>,
    pub room_id: Option<String>,
    pub power_rating: Option<Watt>,
    pub is_on: Option<bool>,
    pub schedules: Option<Vec<Schedule>>,
    pub category: Option<DeviceCategory>,
}

impl DeviceUpdate {
    pub(super) fn apply_to(self, device: &mut Device) {
        if let Some(name) = self.name {
            device.name = name;
        }
        if let Some(room_id) = self.room_id {
            device.room_id = room_id;
        }
        if let Some(power_rating) = self.power_rating {
            device.power_rating = power_rating;
        }
        if let Some(is_on) = self.is_on {
            device.is_on = is_on;
        }
        if let Some(schedules) = self.schedules {
            device.schedules = schedules;
        }
        if let Some(category) = self.category {
            device.category = Some(category);
        }
    }
}
