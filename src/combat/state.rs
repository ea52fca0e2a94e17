//! Combatant state
//!
//! Players and mobiles share one combat capability ([`Combatant`]) so damage
//! resolution is written once against it. Both shapes are owned by the world;
//! encounters hold shared references to them.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::world::OutputSink;

/// Posture / condition of a combatant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    #[default]
    Standing,
    Sitting,
    Sleeping,
    Fighting,
    /// Down but stable
    Incapacitated,
    /// Will die if unaided
    MortallyWounded,
    Dead,
    Trade,
}

impl Status {
    /// Human-readable status text
    pub fn text(&self) -> &'static str {
        match self {
            Status::Standing => "Standing",
            Status::Sitting => "Sitting",
            Status::Sleeping => "Sleeping",
            Status::Fighting => "Fighting",
            Status::Incapacitated => "Incapacitated",
            Status::MortallyWounded => "Mortally wounded",
            Status::Dead => "Dead",
            Status::Trade => "Trading",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Hit point thresholds for the death-state rule.
///
/// `dead` must not be above `incapacitated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathThresholds {
    /// Below this a combatant is dead
    pub dead: i32,
    /// Below this (but not dead) a combatant is mortally wounded
    pub incapacitated: i32,
}

impl DeathThresholds {
    /// Player defaults: dying between -3 and -10
    pub const PLAYER: DeathThresholds = DeathThresholds {
        dead: -10,
        incapacitated: -3,
    };

    /// Mobile defaults: anything at 0 or below is destroyed
    pub const MOBILE: DeathThresholds = DeathThresholds {
        dead: 1,
        incapacitated: 1,
    };

    /// Status of a combatant that has fallen to `hit_points`
    pub fn status_for(&self, hit_points: i32) -> Status {
        if hit_points < self.dead {
            Status::Dead
        } else if hit_points < self.incapacitated {
            Status::MortallyWounded
        } else {
            Status::Incapacitated
        }
    }

    /// Whether `hit_points` calls for full death handling
    pub fn is_destroyed(&self, hit_points: i32) -> bool {
        hit_points < self.dead
    }
}

/// The numbers damage resolution works with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatStats {
    pub hit_points: i32,
    pub max_hit_points: i32,
    pub armor: i32,
    /// To-hit roll is `uniform(0..=hit_roll) + 1`
    pub hit_roll: u32,
    /// Damage is `uniform(0..=damage_roll) + 1`
    pub damage_roll: u32,
}

impl CombatStats {
    /// Stats at full health
    pub fn new(max_hit_points: i32, armor: i32, hit_roll: u32, damage_roll: u32) -> Self {
        Self {
            hit_points: max_hit_points,
            max_hit_points,
            armor,
            hit_roll,
            damage_roll,
        }
    }

    /// Override current hit points
    pub fn with_hit_points(mut self, hit_points: i32) -> Self {
        self.hit_points = hit_points;
        self
    }

    /// Fraction of maximum health remaining
    pub fn health_fraction(&self) -> f64 {
        if self.max_hit_points <= 0 {
            return 0.0;
        }
        f64::from(self.hit_points) / f64::from(self.max_hit_points)
    }
}

/// Which side of a fight a combatant is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombatantKind {
    Player,
    Mobile,
}

/// Combat capability shared by players and mobiles
pub trait Combatant: Send {
    /// Unique key
    fn key(&self) -> &str;
    /// Display name used in narration
    fn name(&self) -> &str;
    fn kind(&self) -> CombatantKind;
    fn stats(&self) -> &CombatStats;
    fn stats_mut(&mut self) -> &mut CombatStats;
    fn status(&self) -> Status;
    fn set_status(&mut self, status: Status);
    /// Key of the room the combatant occupies
    fn location(&self) -> &str;

    fn hit_points(&self) -> i32 {
        self.stats().hit_points
    }

    fn is_alive(&self) -> bool {
        self.stats().hit_points > 0
    }
}

/// A connected player
pub struct PlayerCombatant {
    pub key: String,
    pub forename: String,
    pub stats: CombatStats,
    pub status: Status,
    pub location: String,
    pub level: u32,
    pub experience: u32,
    output: Arc<dyn OutputSink>,
}

impl PlayerCombatant {
    /// Create a level 1 player standing in `location`
    pub fn new(
        forename: &str,
        location: &str,
        stats: CombatStats,
        output: Arc<dyn OutputSink>,
    ) -> Self {
        Self {
            key: forename.to_lowercase(),
            forename: forename.to_string(),
            stats,
            status: Status::Standing,
            location: location.to_string(),
            level: 1,
            experience: 0,
            output,
        }
    }

    /// Wrap in the shared handle the world and encounters hold
    pub fn shared(self) -> PlayerRef {
        Arc::new(Mutex::new(self))
    }

    /// Send text to the player's connection. Never blocks.
    pub fn deliver(&self, text: &str) {
        self.output.deliver(text);
    }
}

impl fmt::Debug for PlayerCombatant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerCombatant")
            .field("key", &self.key)
            .field("stats", &self.stats)
            .field("status", &self.status)
            .field("location", &self.location)
            .field("level", &self.level)
            .field("experience", &self.experience)
            .finish()
    }
}

impl Combatant for PlayerCombatant {
    fn key(&self) -> &str {
        &self.key
    }

    fn name(&self) -> &str {
        &self.forename
    }

    fn kind(&self) -> CombatantKind {
        CombatantKind::Player
    }

    fn stats(&self) -> &CombatStats {
        &self.stats
    }

    fn stats_mut(&mut self) -> &mut CombatStats {
        &mut self.stats
    }

    fn status(&self) -> Status {
        self.status
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    fn location(&self) -> &str {
        &self.location
    }
}

/// A non-player creature
#[derive(Debug, Clone)]
pub struct MobileCombatant {
    pub key: String,
    pub name: String,
    pub stats: CombatStats,
    pub status: Status,
    pub location: String,
    /// Hostile by default: attacks on sight and swings first
    pub aggro: bool,
}

impl MobileCombatant {
    /// Create a passive mobile standing in `location`
    pub fn new(key: &str, name: &str, location: &str, stats: CombatStats) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            stats,
            status: Status::Standing,
            location: location.to_string(),
            aggro: false,
        }
    }

    /// Mark as hostile by default
    pub fn aggressive(mut self) -> Self {
        self.aggro = true;
        self
    }

    /// Wrap in the shared handle the world and encounters hold
    pub fn shared(self) -> MobileRef {
        Arc::new(Mutex::new(self))
    }
}

impl Combatant for MobileCombatant {
    fn key(&self) -> &str {
        &self.key
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> CombatantKind {
        CombatantKind::Mobile
    }

    fn stats(&self) -> &CombatStats {
        &self.stats
    }

    fn stats_mut(&mut self) -> &mut CombatStats {
        &mut self.stats
    }

    fn status(&self) -> Status {
        self.status
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    fn location(&self) -> &str {
        &self.location
    }
}

/// Shared handle to a player
pub type PlayerRef = Arc<Mutex<PlayerCombatant>>;

/// Shared handle to a mobile
pub type MobileRef = Arc<Mutex<MobileCombatant>>;
