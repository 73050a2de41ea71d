//! Room registry: creates, tracks, and routes intents to rooms.

use std::collections::HashMap;

use minehub_protocol::{Coord, PlayerId, RoomId};
use tokio::sync::RwLock;

use crate::room::spawn_room;
use crate::{
    ChatMessage, Player, PlayerSender, RevealReport, Room, RoomConfig, RoomError, RoomHandle,
    RoomSnapshot, RoomSummary,
};

/// Default command channel size for room actors.
pub const DEFAULT_CHANNEL_SIZE: usize = 64;

/// A join that keeps landing on rooms that are closing gives up after
/// this many fresh attempts.
const MAX_JOIN_ATTEMPTS: usize = 3;

/// Concurrent map from room id to running room.
///
/// The map lock is only held to look up, insert or remove a handle, never
/// while a room works on a command, so unrelated rooms proceed in
/// parallel. Share it behind an `Arc`.
pub struct RoomRegistry {
    rooms: RwLock<HashMap<RoomId, RoomHandle>>,
    defaults: RoomConfig,
    channel_size: usize,
}

impl RoomRegistry {
    /// Creates an empty registry. Rooms created on demand use `defaults`.
    pub fn new(defaults: RoomConfig) -> Self {
        Self::with_channel_size(defaults, DEFAULT_CHANNEL_SIZE)
    }

    pub fn with_channel_size(defaults: RoomConfig, channel_size: usize) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            defaults,
            channel_size: channel_size.max(1),
        }
    }

    /// Board settings used by `get_or_create`, and for any field a
    /// client leaves out when creating a room.
    pub fn defaults(&self) -> &RoomConfig {
        &self.defaults
    }

    /// Creates a room with an explicit config.
    ///
    /// With `room_id == None` a fresh id is generated. An id that's
    /// already live is an error.
    pub async fn create_room(
        &self,
        room_id: Option<RoomId>,
        config: RoomConfig,
    ) -> Result<RoomId, RoomError> {
        config.validate().map_err(RoomError::InvalidConfig)?;

        let mut rooms = self.rooms.write().await;
        let room_id = match room_id {
            Some(id) => {
                if rooms.get(&id).is_some_and(|h| !h.is_closed()) {
                    return Err(RoomError::AlreadyExists(id));
                }
                id
            }
            None => loop {
                let id = RoomId::generate();
                if !rooms.contains_key(&id) {
                    break id;
                }
            },
        };

        let handle = spawn_room(Room::new(room_id.clone(), config)?, self.channel_size);
        rooms.insert(room_id.clone(), handle);
        tracing::info!(%room_id, "room created");
        Ok(room_id)
    }

    /// Looks up a live room.
    pub async fn get(&self, room_id: &RoomId) -> Result<RoomHandle, RoomError> {
        self.rooms
            .read()
            .await
            .get(room_id)
            .filter(|h| !h.is_closed())
            .cloned()
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))
    }

    /// Returns the room, creating it with the default config if it
    /// doesn't exist (or only a closed handle is left).
    pub async fn get_or_create(&self, room_id: &RoomId) -> Result<RoomHandle, RoomError> {
        if let Ok(handle) = self.get(room_id).await {
            return Ok(handle);
        }

        let mut rooms = self.rooms.write().await;
        if let Some(handle) = rooms.get(room_id).filter(|h| !h.is_closed()) {
            return Ok(handle.clone());
        }
        let room = Room::new(room_id.clone(), self.defaults.clone())?;
        let handle = spawn_room(room, self.channel_size);
        rooms.insert(room_id.clone(), handle.clone());
        tracing::info!(%room_id, "room created on demand");
        Ok(handle)
    }

    /// Joins a player to a room, creating the room if needed.
    ///
    /// If the room closes between lookup and join (its last player just
    /// left), the stale handle is dropped and the join retried on a
    /// fresh room.
    pub async fn join(
        &self,
        room_id: &RoomId,
        player_id: PlayerId,
        name: &str,
        sender: PlayerSender,
    ) -> Result<Player, RoomError> {
        for _ in 0..MAX_JOIN_ATTEMPTS {
            let handle = self.get_or_create(room_id).await?;
            match handle.join(player_id, name, sender.clone()).await {
                Err(RoomError::Unavailable(_)) => {
                    tracing::warn!(%room_id, %player_id, "room closed during join, retrying");
                    self.evict(&handle).await;
                }
                result => return result,
            }
        }
        Err(RoomError::Unavailable(room_id.clone()))
    }

    /// Removes a player. When the room empties it is evicted.
    pub async fn leave(&self, room_id: &RoomId, player_id: PlayerId) -> Result<Player, RoomError> {
        let handle = self.get(room_id).await?;
        let departure = handle.leave(player_id).await?;
        if departure.remaining == 0 {
            self.evict(&handle).await;
        }
        Ok(departure.player)
    }

    pub async fn reveal(
        &self,
        room_id: &RoomId,
        player_id: PlayerId,
        at: Coord,
    ) -> Result<RevealReport, RoomError> {
        self.get(room_id).await?.reveal(player_id, at).await
    }

    pub async fn toggle_flag(
        &self,
        room_id: &RoomId,
        player_id: PlayerId,
        at: Coord,
    ) -> Result<bool, RoomError> {
        self.get(room_id).await?.toggle_flag(player_id, at).await
    }

    pub async fn reset(&self, room_id: &RoomId) -> Result<(), RoomError> {
        self.get(room_id).await?.reset().await
    }

    pub async fn send_message(
        &self,
        room_id: &RoomId,
        player_id: PlayerId,
        text: &str,
    ) -> Result<ChatMessage, RoomError> {
        self.get(room_id).await?.send_message(player_id, text).await
    }

    pub async fn snapshot(&self, room_id: &RoomId) -> Result<RoomSnapshot, RoomError> {
        self.get(room_id).await?.snapshot().await
    }

    /// One room's list entry.
    pub async fn summary(&self, room_id: &RoomId) -> Result<RoomSummary, RoomError> {
        self.get(room_id).await?.summary().await
    }

    /// Summaries of every live room, ordered by id.
    ///
    /// Handles are cloned out first so no room is queried under the map
    /// lock. Rooms that close mid-listing are skipped.
    pub async fn list_rooms(&self) -> Vec<RoomSummary> {
        let handles: Vec<RoomHandle> = self.rooms.read().await.values().cloned().collect();

        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            if let Ok(summary) = handle.summary().await {
                summaries.push(summary);
            }
        }
        summaries.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        summaries
    }

    /// Shuts a room down and forgets it.
    pub async fn remove(&self, room_id: &RoomId) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .write()
            .await
            .remove(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        let _ = handle.shutdown().await;
        tracing::info!(%room_id, "room removed");
        Ok(())
    }

    /// Number of rooms in the map, including any closed ones not yet
    /// evicted.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Drops `handle` from the map, but only if the entry still points at
    /// that actor. A fresh room under the same id is left alone.
    async fn evict(&self, handle: &RoomHandle) {
        let mut rooms = self.rooms.write().await;
        if rooms
            .get(handle.room_id())
            .is_some_and(|current| current.same_room(handle))
        {
            rooms.remove(handle.room_id());
            tracing::info!(room_id = %handle.room_id(), "room destroyed");
        }
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RoomStatus;
    use tokio::sync::mpsc;

    fn registry() -> RoomRegistry {
        RoomRegistry::new(RoomConfig::new(5, 5, 3).with_seed(1))
    }

    #[tokio::test]
    async fn test_create_room_duplicate_is_rejected() {
        let registry = registry();
        let id = RoomId::from("r1");
        registry
            .create_room(Some(id.clone()), RoomConfig::default())
            .await
            .unwrap();

        let err = registry
            .create_room(Some(id), RoomConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RoomError::AlreadyExists(_)));
        assert_eq!(registry.room_count().await, 1);
    }

    #[tokio::test]
    async fn test_create_room_generates_id() {
        let registry = registry();
        let id = registry.create_room(None, RoomConfig::default()).await.unwrap();
        assert_eq!(id.as_str().len(), RoomId::GENERATED_LEN);
        assert!(registry.get(&id).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_room_invalid_config_allocates_nothing() {
        let registry = registry();
        let err = registry
            .create_room(Some(RoomId::from("x")), RoomConfig::new(3, 3, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, RoomError::InvalidConfig(_)));
        assert_eq!(registry.room_count().await, 0);
    }

    #[tokio::test]
    async fn test_summary_reports_room_config() {
        let registry = registry();
        let id = registry
            .create_room(Some(RoomId::from("big")), RoomConfig::new(12, 20, 30))
            .await
            .unwrap();

        let summary = registry.summary(&id).await.unwrap();
        assert_eq!(summary.room_id, id);
        assert_eq!((summary.rows, summary.cols, summary.mine_count), (12, 20, 30));
        assert_eq!(summary.player_count, 0);
        assert_eq!(summary.status, RoomStatus::Waiting);

        assert!(matches!(
            registry.summary(&RoomId::from("nope")).await,
            Err(RoomError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_get_missing_room_is_not_found() {
        let registry = registry();
        assert!(matches!(
            registry.get(&RoomId::from("nope")).await,
            Err(RoomError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_join_creates_room_with_defaults() {
        let registry = registry();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = RoomId::from("lobby");

        registry.join(&id, PlayerId(1), "ada", tx).await.unwrap();

        let snapshot = registry.snapshot(&id).await.unwrap();
        assert_eq!((snapshot.board.rows, snapshot.board.cols), (5, 5));
        assert_eq!(snapshot.board.mine_count, 3);
    }

    #[tokio::test]
    async fn test_leave_last_player_evicts_room() {
        let registry = registry();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = RoomId::from("lobby");
        registry.join(&id, PlayerId(1), "ada", tx).await.unwrap();

        registry.leave(&id, PlayerId(1)).await.unwrap();

        assert_eq!(registry.room_count().await, 0);
        assert!(matches!(
            registry.reveal(&id, PlayerId(1), Coord::new(0, 0)).await,
            Err(RoomError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rejoin_after_eviction_gets_fresh_room() {
        let registry = registry();
        let id = RoomId::from("lobby");
        let (tx, _rx) = mpsc::unbounded_channel();
        registry.join(&id, PlayerId(1), "ada", tx.clone()).await.unwrap();
        registry.send_message(&id, PlayerId(1), "first").await.unwrap();
        registry.leave(&id, PlayerId(1)).await.unwrap();

        registry.join(&id, PlayerId(1), "ada", tx).await.unwrap();

        let snapshot = registry.snapshot(&id).await.unwrap();
        assert!(snapshot.messages.is_empty());
    }

    #[tokio::test]
    async fn test_list_rooms_is_sorted() {
        let registry = registry();
        for id in ["b", "a", "c"] {
            registry
                .create_room(Some(RoomId::from(id)), RoomConfig::default())
                .await
                .unwrap();
        }

        let ids: Vec<_> = registry
            .list_rooms()
            .await
            .into_iter()
            .map(|s| s.room_id.to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_remove_shuts_room_down() {
        let registry = registry();
        let id = RoomId::from("gone");
        registry
            .create_room(Some(id.clone()), RoomConfig::default())
            .await
            .unwrap();

        registry.remove(&id).await.unwrap();

        assert_eq!(registry.room_count().await, 0);
        assert!(matches!(registry.remove(&id).await, Err(RoomError::NotFound(_))));
    }
}
