//! Room registry: finds or lazily creates rooms by id.

use std::collections::HashMap;

use tabletop_protocol::RoomId;
use tokio::sync::Mutex;

use crate::{Room, RoomConfig};

/// Every room the process has seen.
///
/// Rooms are created the first time any connection names them and are never
/// removed; their documents live as long as the process.
pub struct RoomRegistry {
    rooms: Mutex<HashMap<RoomId, Room>>,
    config: RoomConfig,
}

impl RoomRegistry {
    /// An empty registry whose rooms will all use `config`.
    pub fn new(config: RoomConfig) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Returns the room named `id`, creating it if this is the first time.
    ///
    /// Lookup and insertion happen under one lock, so two connections
    /// racing to create the same room get the same room.
    pub async fn lobby(&self, id: &RoomId) -> Room {
        let mut rooms = self.rooms.lock().await;
        if let Some(room) = rooms.get(id) {
            return room.clone();
        }
        let room = Room::new(id.clone(), self.config.clone());
        rooms.insert(id.clone(), room.clone());
        room
    }

    /// Returns the room named `id` without creating it.
    pub async fn room(&self, id: &RoomId) -> Option<Room> {
        self.rooms.lock().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.rooms.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.lock().await.is_empty()
    }

    pub async fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.lock().await.keys().cloned().collect()
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn test_lobby_creates_once_and_reuses() {
        let registry = RoomRegistry::default();
        assert!(registry.is_empty().await);

        let a = registry.lobby(&RoomId::from("L")).await;
        let b = registry.lobby(&RoomId::from("L")).await;
        assert_eq!(a.id(), b.id());
        assert_eq!(registry.len().await, 1);

        registry.lobby(&RoomId::from("M")).await;
        let mut ids = registry.room_ids().await;
        ids.sort();
        assert_eq!(ids, vec![RoomId::from("L"), RoomId::from("M")]);
    }

    #[tokio::test]
    async fn test_lobby_same_room_shares_document() {
        let registry = RoomRegistry::default();
        let a = registry.lobby(&RoomId::from("L")).await;
        a.connect_player(&"P1".into()).await;

        let b = registry.lobby(&RoomId::from("L")).await;
        assert!(b.snapshot().await.players.contains_key("P1"));
    }

    #[tokio::test]
    async fn test_room_lookup_does_not_create() {
        let registry = RoomRegistry::default();
        assert!(registry.room(&RoomId::from("nope")).await.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_lobby_concurrent_creation_yields_one_room() {
        let registry = Arc::new(RoomRegistry::default());
        let mut handles = Vec::new();
        for i in 0..16 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                let room = registry.lobby(&RoomId::from("race")).await;
                room.connect_player(&format!("P{i}").into()).await;
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(registry.len().await, 1);
        let room = registry.room(&RoomId::from("race")).await.unwrap();
        assert_eq!(room.snapshot().await.players.len(), 16);
    }
}
