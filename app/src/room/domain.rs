use serde::{Deserialize, Serialize};

use crate::core::persistence::Entity;

pub const ROOM_COLORS: [&str; 6] = ["#10B981", "#3B82F6", "#8B5CF6", "#EC4899", "#F59E0B", "#EF4444"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub name: String,
    #[serde(rename = "devices")]
    pub device_count: u32,
    /// kW
    pub power_usage: f64,
    pub color: String,
}

impl Entity for Room {
    const KIND: &'static str = "room";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoom {
    pub name: String,
    #[serde(default, rename = "devices")]
    pub device_count: u32,
    #[serde(default)]
    pub power_usage: f64,
    #[serde(default)]
    pub color: Option<String>,
}

impl NewRoom {
    /// Without explicit color, the next palette color by number of existing rooms is used.
    pub(super) fn into_room(self, id: String, existing_rooms: usize) -> Room {
        let color = self
            .color
            .unwrap_or_else(|| ROOM_COLORS[existing_rooms % ROOM_COLORS.len()].to_owned());

        Room {
            id,
            name: self.name,
            device_count: self.device_count,
            power_usage: self.power_usage,
            color,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomUpdate {
    pub name: Option<String>,
    #[serde(rename = "devices")]
    pub device_count: Option<u32>,
    pub power_usage: Option<f64>,
    pub color: Option<String>,
}

impl RoomUpdate {
    pub(super) fn apply_to(self, room: &mut Room) {
        if let Some(name) = self.name {
            room.name = name;
        }
        if let Some(device_count) = self.device_count {
            room.device_count = device_count;
        }
        if let Some(power_usage) = self.power_usage {
            room.power_usage = power_usage;
        }
        if let Some(color) = self.color {
            room.color = color;
        }
    }
}

pub fn default_rooms() -> Vec<Room> {
    [
        ("1", "Living Room", 5, 0.67),
        ("2", "Kitchen", 4, 0.42),
        ("3", "Master Bedroom", 3, 0.12),
        ("4", "Study Room", 2, 0.25),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (id, name, device_count, power_usage))| Room {
        id: id.to_owned(),
        name: name.to_owned(),
        device_count,
        power_usage,
        color: ROOM_COLORS[i].to_owned(),
    })
    .collect()
}
