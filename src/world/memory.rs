//! In-memory world
//!
//! A minimal room graph that satisfies the world contracts. Used by the demo
//! binary and the tests; a real server plugs in its own store.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use super::{Room, World};
use crate::combat::{MobileRef, PlayerRef};

/// A room holding shared combatant handles
#[derive(Debug)]
pub struct MemoryRoom {
    key: String,
    players: RwLock<Vec<PlayerRef>>,
    mobiles: RwLock<Vec<MobileRef>>,
}

impl MemoryRoom {
    /// Create an empty room
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            players: RwLock::new(Vec::new()),
            mobiles: RwLock::new(Vec::new()),
        }
    }

    /// Place a player in the room (no-op if already present)
    pub fn add_player(&self, player: PlayerRef) {
        let mut players = self.players.write();
        if !players.iter().any(|p| Arc::ptr_eq(p, &player)) {
            players.push(player);
        }
    }

    /// Remove a player by key
    pub fn remove_player(&self, key: &str) -> Option<PlayerRef> {
        let mut players = self.players.write();
        let idx = players.iter().position(|p| p.lock().key == key)?;
        Some(players.remove(idx))
    }

    /// Place a mobile in the room (no-op if already present)
    pub fn add_mobile(&self, mobile: MobileRef) {
        let mut mobiles = self.mobiles.write();
        if !mobiles.iter().any(|m| Arc::ptr_eq(m, &mobile)) {
            mobiles.push(mobile);
        }
    }

    /// Remove a mobile by key
    pub fn remove_mobile(&self, key: &str) -> Option<MobileRef> {
        let mut mobiles = self.mobiles.write();
        let idx = mobiles.iter().position(|m| m.lock().key == key)?;
        Some(mobiles.remove(idx))
    }
}

impl Room for MemoryRoom {
    fn key(&self) -> &str {
        &self.key
    }

    fn send_to_players(&self, text: &str, excluding: &HashSet<String>) {
        if text.is_empty() {
            return;
        }
        for player in self.players.read().iter() {
            let player = player.lock();
            if !excluding.contains(&player.key) {
                player.deliver(text);
            }
        }
    }

    fn players(&self) -> Vec<PlayerRef> {
        self.players.read().clone()
    }

    fn mobiles(&self) -> Vec<MobileRef> {
        self.mobiles.read().clone()
    }
}

/// Rooms by key
#[derive(Debug, Default)]
pub struct MemoryWorld {
    rooms: RwLock<HashMap<String, Arc<MemoryRoom>>>,
}

impl MemoryWorld {
    /// Create an empty world
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap in Arc for sharing
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Get a room, creating it if missing
    pub fn room(&self, key: &str) -> Arc<MemoryRoom> {
        self.rooms
            .write()
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(MemoryRoom::new(key)))
            .clone()
    }

    /// Number of rooms
    pub fn room_count(&self) -> usize {
        self.rooms.read().len()
    }
}

impl World for MemoryWorld {
    fn resolve_room(&self, location: &str) -> Option<Arc<dyn Room>> {
        let room: Arc<dyn Room> = self.rooms.read().get(location).cloned()?;
        Some(room)
    }
}
