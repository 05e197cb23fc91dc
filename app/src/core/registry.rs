use tokio::sync::{Mutex, watch};

use crate::core::id::new_unique_id;
use crate::core::persistence::{Entity, EntityRepository};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum RegistryError {
    #[display("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
    #[display("{kind} {id} has no schedule at index {index}")]
    ScheduleNotFound { kind: &'static str, id: String, index: usize },
}

/// In-memory list of entities, persisted entity by entity and published to
/// subscribers after every successful mutation.
pub struct Registry<T: Entity> {
    repo: EntityRepository<T>,
    state: watch::Sender<Vec<T>>,
    write_lock: Mutex<()>,
}

/// Yields the current list right away, then the latest list after each change.
/// Delivery is latest-value only: every list is a complete snapshot, so changes
/// published while the subscriber was busy are folded into the next one it sees.
/// Dropping the subscription unsubscribes.
pub struct Subscription<T> {
    rx: watch::Receiver<Vec<T>>,
    replayed: bool,
}

impl<T: Clone> Subscription<T> {
    pub async fn next(&mut self) -> Option<Vec<T>> {
        if !self.replayed {
            self.replayed = true;
            return Some(self.rx.borrow_and_update().clone());
        }

        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

impl<T: Entity> Registry<T> {
    pub async fn load(repo: EntityRepository<T>) -> anyhow::Result<Self> {
        let items = repo.load_all().await?;
        tracing::info!("Loaded {} {} entries", items.len(), T::KIND);

        Ok(Self {
            repo,
            state: watch::Sender::new(items),
            write_lock: Mutex::new(()),
        })
    }

    pub fn list(&self) -> Vec<T> {
        self.state.borrow().clone()
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.state.borrow().iter().find(|item| item.id() == id).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().is_empty()
    }

    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            rx: self.state.subscribe(),
            replayed: false,
        }
    }

    /// Stores all given entities at once and publishes the result a single time.
    pub async fn seed(&self, items: Vec<T>) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock().await;

        self.repo.upsert_all(&items).await?;

        let mut next = self.list();
        for item in items {
            match next.iter_mut().find(|existing| existing.id() == item.id()) {
                Some(existing) => *existing = item,
                None => next.push(item),
            }
        }

        self.publish(next);
        Ok(())
    }

    /// Adds a new entity built from a fresh id that is unique in the current list.
    pub async fn insert_with(&self, build: impl FnOnce(String, &[T]) -> T) -> anyhow::Result<T> {
        let _guard = self.write_lock.lock().await;

        let mut next = self.list();
        let id = new_unique_id(|candidate| next.iter().any(|item| item.id() == candidate));
        let item = build(id, &next);

        self.repo.upsert(&item).await?;
        tracing::info!("Added {} {}", T::KIND, item.id());

        next.push(item.clone());
        self.publish(next);

        Ok(item)
    }

    /// Applies `change` to the entity with the given id. Nothing is persisted or
    /// published if the entity is unknown or `change` fails.
    pub async fn modify(
        &self,
        id: &str,
        change: impl FnOnce(&mut T) -> Result<(), RegistryError>,
    ) -> anyhow::Result<T> {
        let _guard = self.write_lock.lock().await;

        let mut next = self.list();
        let item = next
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or_else(|| RegistryError::NotFound {
                kind: T::KIND,
                id: id.to_owned(),
            })?;

        change(item)?;
        let item = item.clone();

        self.repo.upsert(&item).await?;
        tracing::debug!("Updated {} {}", T::KIND, id);

        self.publish(next);

        Ok(item)
    }

    /// Removing an unknown id is not an error.
    pub async fn remove(&self, id: &str) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock().await;

        let removed = self.repo.delete(id).await?;

        let mut next = self.list();
        next.retain(|item| item.id() != id);

        if removed {
            tracing::info!("Deleted {} {}", T::KIND, id);
        } else {
            tracing::debug!("Nothing to delete for {} {}", T::KIND, id);
        }

        self.publish(next);
        Ok(())
    }

    fn publish(&self, items: Vec<T>) {
        self.state.send_replace(items);
    }
}
