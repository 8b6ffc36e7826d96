use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;

use crate::domain::realtime::change::{Collection, Room};

/// Dashboard namespaces and the collections each one follows.
#[derive(Default)]
pub struct WatchRegistry {
    watches: RwLock<HashMap<Room, HashSet<Collection>>>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `collections` to the namespace's watch set. Registering the same
    /// namespace again only extends it.
    pub async fn register(&self, namespace: Room, collections: &[Collection]) {
        let mut guard = self.watches.write().await;
        guard
            .entry(namespace)
            .or_default()
            .extend(collections.iter().copied());
    }

    pub async fn unregister(&self, namespace: &Room) -> bool {
        self.watches.write().await.remove(namespace).is_some()
    }

    pub async fn watchers(&self, collection: Collection) -> Vec<Room> {
        let guard = self.watches.read().await;
        let mut rooms: Vec<Room> = guard
            .iter()
            .filter(|(_, set)| set.contains(&collection))
            .map(|(room, _)| room.clone())
            .collect();
        rooms.sort_by_key(|r| r.to_string());
        rooms
    }

    pub async fn len(&self) -> usize {
        self.watches.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::users::user::Role;
    use uuid::Uuid;

    #[tokio::test]
    async fn register_is_idempotent_and_unregister_forgets() {
        let reg = WatchRegistry::new();
        let ns = Room::namespace(Role::Teacher, Uuid::new_v4());
        reg.register(ns.clone(), &[Collection::Quizzes, Collection::Diary])
            .await;
        reg.register(ns.clone(), &[Collection::Quizzes]).await;
        assert_eq!(reg.len().await, 1);
        assert_eq!(reg.watchers(Collection::Diary).await, vec![ns.clone()]);
        assert!(reg.watchers(Collection::Contact).await.is_empty());

        assert!(reg.unregister(&ns).await);
        assert!(!reg.unregister(&ns).await);
        assert!(reg.watchers(Collection::Quizzes).await.is_empty());
    }
}
