//! Encounter scheduler
//!
//! Owns the active encounters and advances them on a fixed tick. Every
//! mutation of an encounter (rounds, skill attacks, membership changes) goes
//! through that encounter's mutex, held for the whole operation and never
//! across an `.await`. The active set has its own lock so encounters can be
//! registered or retired while others are mid-round.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::damage::Swing;
use super::dice::CombatRng;
use super::encounter::{Encounter, EncounterPhase, Thresholds};
use super::skill::SkillAttack;
use super::state::{Combatant, PlayerRef};
use crate::error::CombatError;
use crate::world::{CombatHooks, Room, World};

/// An encounter shared between the scheduler and its callers
pub type SharedEncounter = Arc<Mutex<Encounter>>;

/// Default combat tick
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// What one tick did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Rounds resolved
    pub rounds: usize,
    /// Rounds that were rejected
    pub failed: usize,
    /// Mobiles finally destroyed this tick
    pub destroyed_mobiles: Vec<String>,
    /// Encounters ended and dropped this tick
    pub ended: Vec<Uuid>,
}

/// Drives all active encounters
pub struct EncounterScheduler {
    encounters: RwLock<Vec<SharedEncounter>>,
    world: Arc<dyn World>,
    hooks: Arc<dyn CombatHooks>,
    rng: Mutex<Box<dyn CombatRng>>,
    thresholds: Thresholds,
    tick_interval: Duration,
}

impl std::fmt::Debug for EncounterScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncounterScheduler")
            .field("thresholds", &self.thresholds)
            .field("tick_interval", &self.tick_interval)
            .finish()
    }
}

impl EncounterScheduler {
    /// Create a scheduler with the default tick and thresholds
    pub fn new(world: Arc<dyn World>, hooks: Arc<dyn CombatHooks>, rng: Box<dyn CombatRng>) -> Self {
        Self {
            encounters: RwLock::new(Vec::new()),
            world,
            hooks,
            rng: Mutex::new(rng),
            thresholds: Thresholds::default(),
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }

    /// Set the tick interval
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    /// Set the death thresholds used for new encounters
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// A fresh encounter using this scheduler's thresholds
    pub fn new_encounter(&self) -> Encounter {
        Encounter::with_thresholds(self.thresholds)
    }

    /// Start `encounter` and register it for ticking
    pub async fn start_encounter(&self, mut encounter: Encounter) -> Result<SharedEncounter, CombatError> {
        encounter.start(self.world.as_ref())?;
        let shared = Arc::new(Mutex::new(encounter));
        self.encounters.write().await.push(Arc::clone(&shared));
        Ok(shared)
    }

    /// Add `player` to the active fight holding the live mobile `mobile_key`.
    ///
    /// A player already fighting elsewhere is rejected. The caller must not
    /// hold the player's lock.
    pub async fn add_to_encounter(&self, player: PlayerRef, mobile_key: &str) -> Result<Uuid, CombatError> {
        let player_key = player.lock().key.clone();
        let encounters = self.encounters.read().await;

        let elsewhere = encounters.iter().any(|shared| {
            let encounter = shared.lock();
            encounter.phase() == EncounterPhase::Active
                && encounter.contains_player(&player_key)
                && !encounter.has_live_mobile(mobile_key)
        });
        if elsewhere {
            debug!(player = %player_key, mobile = mobile_key, "Player is already in another fight");
            return Err(CombatError::AlreadyFighting(player_key));
        }

        for shared in encounters.iter() {
            let mut encounter = shared.lock();
            if encounter.phase() == EncounterPhase::Active && encounter.has_live_mobile(mobile_key) {
                encounter.add_player(player);
                return Ok(encounter.id());
            }
        }

        debug!(mobile = mobile_key, "No encounter to join");
        Err(CombatError::MobileNotFound(mobile_key.to_string()))
    }

    /// The active encounter a combatant (player or mobile) belongs to
    pub async fn find_encounter(&self, key: &str) -> Option<SharedEncounter> {
        let encounters = self.encounters.read().await;
        encounters
            .iter()
            .find(|shared| {
                let encounter = shared.lock();
                encounter.phase() == EncounterPhase::Active
                    && (encounter.contains_player(key) || encounter.contains_mobile(key))
            })
            .cloned()
    }

    /// Called after `player` has entered `room`.
    ///
    /// If they are the only player there and hostile mobiles are present
    /// that are not already fighting, a new encounter pairs them with all of
    /// those mobiles.
    pub async fn on_room_entry(
        &self,
        player: PlayerRef,
        room: &dyn Room,
    ) -> Result<Option<SharedEncounter>, CombatError> {
        let players = room.players();
        if players.len() != 1 || !Arc::ptr_eq(&players[0], &player) {
            return Ok(None);
        }

        let player_key = player.lock().key.clone();
        if self.find_encounter(&player_key).await.is_some() {
            return Ok(None);
        }

        let mut hostile = Vec::new();
        for mobile in room.mobiles() {
            let key = {
                let m = mobile.lock();
                if !m.aggro || !m.is_alive() {
                    continue;
                }
                m.key.clone()
            };
            if self.find_encounter(&key).await.is_none() {
                hostile.push(mobile);
            }
        }

        if hostile.is_empty() {
            return Ok(None);
        }

        debug!(player = %player_key, room = room.key(), mobiles = hostile.len(), "Hostiles attack on entry");
        let mut encounter = self.new_encounter();
        encounter.add_player(player);
        for mobile in hostile {
            encounter.add_mobile(mobile);
        }
        self.start_encounter(encounter).await.map(Some)
    }

    /// Advance every active encounter by one step.
    ///
    /// Fighting encounters resolve a round; the rest are ended and dropped.
    pub async fn tick(&self) -> TickReport {
        let snapshot: Vec<SharedEncounter> = self.encounters.read().await.clone();
        let mut report = TickReport::default();
        let mut finished = Vec::new();

        {
            let mut rng = self.rng.lock();
            for shared in &snapshot {
                let mut encounter = shared.lock();
                if encounter.phase() == EncounterPhase::Ended {
                    finished.push(Arc::clone(shared));
                    continue;
                }

                if encounter.is_fighting() {
                    match encounter.round(&mut **rng, self.hooks.as_ref()) {
                        Ok(outcome) => {
                            report.rounds += 1;
                            report.destroyed_mobiles.extend(outcome.destroyed_mobiles);
                        }
                        Err(e) => {
                            warn!(encounter = %encounter.id(), "Round failed: {}", e);
                            report.failed += 1;
                        }
                    }
                } else {
                    encounter.end();
                    report.ended.push(encounter.id());
                    finished.push(Arc::clone(shared));
                }
            }
        }

        if !finished.is_empty() {
            self.encounters
                .write()
                .await
                .retain(|e| !finished.iter().any(|f| Arc::ptr_eq(e, f)));
        }

        report
    }

    /// Fire a mobile's skill attack inside its current fight.
    ///
    /// Returns `Ok(None)` when the mobile is not fighting.
    pub async fn use_skill(&self, mobile_key: &str, skill: &SkillAttack) -> Result<Option<Swing>, CombatError> {
        let Some(shared) = self.find_encounter(mobile_key).await else {
            debug!(mobile = mobile_key, skill = %skill.name, "Skill ignored outside combat");
            return Ok(None);
        };

        let mut rng = self.rng.lock();
        let mut encounter = shared.lock();
        encounter
            .use_skill(mobile_key, skill, &mut **rng, self.hooks.as_ref())
            .map(Some)
    }

    /// Take a combatant out of whatever fight it is in (e.g. on disconnect)
    pub async fn remove_combatant(&self, key: &str) -> bool {
        let Some(shared) = self.find_encounter(key).await else {
            return false;
        };

        let mut encounter = shared.lock();
        encounter.remove_player(key).is_some() || encounter.remove_mobile(key).is_some()
    }

    /// End every active encounter; used on shutdown
    pub async fn end_all(&self) -> usize {
        let drained = std::mem::take(&mut *self.encounters.write().await);
        for shared in &drained {
            let mut encounter = shared.lock();
            if encounter.phase() != EncounterPhase::Ended {
                encounter.end();
            }
        }

        if !drained.is_empty() {
            info!(count = drained.len(), "Ended all encounters");
        }
        drained.len()
    }

    /// Number of registered encounters
    pub async fn active_count(&self) -> usize {
        self.encounters.read().await.len()
    }
}
