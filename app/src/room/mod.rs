mod domain;

pub use domain::*;

use std::sync::Arc;

use crate::core::{
    Registry, Subscription,
    persistence::{EntityRepository, SettingRepository},
};

const ROOMS_SEEDED_KEY: &str = "rooms_seeded";

pub struct RoomModule {
    registry: Arc<Registry<Room>>,
}

#[derive(Clone)]
pub struct RoomClient {
    registry: Arc<Registry<Room>>,
}

impl RoomModule {
    /// Loads all rooms. The default rooms are stored on first start only, an emptied list stays empty.
    pub async fn new(pool: sqlx::SqlitePool) -> anyhow::Result<Self> {
        let settings = SettingRepository::new(pool.clone());
        let registry = Registry::load(EntityRepository::new(pool)).await?;

        let seeded = settings.get::<bool>(ROOMS_SEEDED_KEY).await?.unwrap_or(false);
        if !seeded {
            if registry.is_empty() {
                tracing::info!("No rooms stored yet, seeding default rooms");
                registry.seed(default_rooms()).await?;
            }
            settings.set(ROOMS_SEEDED_KEY, &true).await?;
        }

        Ok(Self {
            registry: Arc::new(registry),
        })
    }

    pub fn client(&self) -> RoomClient {
        RoomClient {
            registry: self.registry.clone(),
        }
    }
}

impl RoomClient {
    pub fn list(&self) -> Vec<Room> {
        self.registry.list()
    }

    pub fn get(&self, id: &str) -> Option<Room> {
        self.registry.get(id)
    }

    pub fn subscribe(&self) -> Subscription<Room> {
        self.registry.subscribe()
    }

    pub async fn add(&self, new_room: NewRoom) -> anyhow::Result<Room> {
        self.registry
            .insert_with(|id, existing| new_room.into_room(id, existing.len()))
            .await
    }

    pub async fn update(&self, id: &str, update: RoomUpdate) -> anyhow::Result<Room> {
        self.registry
            .modify(id, |room| {
                update.apply_to(room);
                Ok(())
            })
            .await
    }

    pub async fn delete(&self, id: &str) -> anyhow::Result<()> {
        self.registry.remove(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RegistryError;

    #[sqlx::test(migrations = "./migrations")]
    async fn seeds_default_rooms_once(pool: sqlx::SqlitePool) {
        let rooms = RoomModule::new(pool.clone()).await.unwrap().client();
        assert_eq!(rooms.list(), default_rooms());

        rooms.delete("3").await.unwrap();

        let reloaded = RoomModule::new(pool).await.unwrap().client();
        let names: Vec<String> = reloaded.list().into_iter().map(|room| room.name).collect();
        assert_eq!(names, vec!["Living Room", "Kitchen", "Study Room"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn deleted_rooms_stay_deleted_after_reload(pool: sqlx::SqlitePool) {
        let rooms = RoomModule::new(pool.clone()).await.unwrap().client();
        for room in rooms.list() {
            rooms.delete(&room.id).await.unwrap();
        }

        let reloaded = RoomModule::new(pool).await.unwrap().client();

        assert!(reloaded.list().is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn add_picks_palette_color_by_room_count(pool: sqlx::SqlitePool) {
        let rooms = RoomModule::new(pool).await.unwrap().client();

        let room = rooms
            .add(NewRoom {
                name: "Garage".to_owned(),
                device_count: 1,
                power_usage: 0.05,
                color: None,
            })
            .await
            .unwrap();

        assert_eq!(room.color, ROOM_COLORS[4]);
        assert_eq!(rooms.list().last(), Some(&room));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn update_unknown_room_is_not_found(pool: sqlx::SqlitePool) {
        let rooms = RoomModule::new(pool).await.unwrap().client();

        let err = rooms.update("42", RoomUpdate::default()).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RegistryError>(),
            Some(RegistryError::NotFound { kind: "room", .. })
        ));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn subscriber_sees_partial_update(pool: sqlx::SqlitePool) {
        let rooms = RoomModule::new(pool).await.unwrap().client();
        let mut subscription = rooms.subscribe();
        subscription.next().await.unwrap();

        rooms
            .update(
                "1",
                RoomUpdate {
                    power_usage: Some(1.5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let living_room = subscription.next().await.unwrap().remove(0);
        assert_eq!(living_room.name, "Living Room");
        assert_eq!(living_room.power_usage, 1.5);
    }
}
