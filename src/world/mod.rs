//! World collaborators
//!
//! The encounter engine does not own rooms, connections or corpses. It talks
//! to them through these traits:
//! - [`World`] resolves a location key to a [`Room`]
//! - [`Room`] enumerates occupants and broadcasts to bystanders
//! - [`OutputSink`] delivers text to one player without blocking
//! - [`CombatHooks`] applies experience and final death

mod memory;

pub use memory::{MemoryRoom, MemoryWorld};

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::combat::{Combatant, MobileRef, PlayerCombatant, PlayerRef};

/// Delivers text to a player's connection.
///
/// Must return promptly and never fail the caller; a dead connection is the
/// sink's problem.
pub trait OutputSink: Send + Sync {
    fn deliver(&self, text: &str);
}

/// A room as seen by the encounter engine
pub trait Room: Send + Sync {
    fn key(&self) -> &str;

    /// Send `text` to every player present except those keyed in `excluding`
    fn send_to_players(&self, text: &str, excluding: &HashSet<String>);

    fn players(&self) -> Vec<PlayerRef>;

    fn mobiles(&self) -> Vec<MobileRef>;
}

/// Room lookup
pub trait World: Send + Sync {
    fn resolve_room(&self, location: &str) -> Option<Arc<dyn Room>>;
}

/// Side effects owned by other subsystems
pub trait CombatHooks: Send + Sync {
    /// Called once per successful player swing
    fn apply_experience(&self, player: &mut PlayerCombatant, damage_dealt: i32);

    /// Called once a combatant is removed from a fight as destroyed
    fn on_final_death(&self, combatant: &mut dyn Combatant);
}

/// Sink backed by an unbounded channel, drained by the connection task
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelSink {
    /// Create a sink and the receiver the connection reads from
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl OutputSink for ChannelSink {
    fn deliver(&self, text: &str) {
        if self.tx.send(text.to_string()).is_err() {
            debug!("Dropping output for closed connection");
        }
    }
}

/// Sink that writes narration to the log under a player's name
#[derive(Debug, Clone)]
pub struct LogSink {
    name: String,
}

impl LogSink {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl OutputSink for LogSink {
    fn deliver(&self, text: &str) {
        for line in text.lines().filter(|l| !l.is_empty()) {
            info!(target: "skirmish::narration", player = %self.name, "{}", line);
        }
    }
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn deliver(&self, _text: &str) {}
}
