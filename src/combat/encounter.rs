//! Encounters
//!
//! One fight between a set of players and a set of mobiles in a room.
//!
//! Lifecycle: `Forming` while participants are added, `Active` after
//! [`Encounter::start`], `Ended` after [`Encounter::end`]. While active the
//! scheduler calls [`Encounter::round`] once per tick until one side has no
//! live members left.
//!
//! Within a round a combatant that falls stays in its set (so it can still be
//! named in the round's narration) and is removed once the round has been
//! delivered.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use super::damage::{apply_damage, resolve, Swing};
use super::dice::{pick_uniform, CombatRng};
use super::ledger::{Channel, InitiativeSlot, RoundLedger, DEAD_SUFFIX};
use super::skill::SkillAttack;
use super::state::{
    Combatant, DeathThresholds, MobileCombatant, MobileRef, PlayerCombatant, PlayerRef, Status,
};
use crate::error::CombatError;
use crate::world::{CombatHooks, Room, World};

/// Appended to a destroyed player's own death line
pub const RESPAWN_NOTICE: &str = " You have respawned, but you're in a different location.\n\
Your corpse will remain for a short while, but you'll want to retrieve your\n\
items in short order.";

/// Lifecycle of an encounter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterPhase {
    Forming,
    Active,
    Ended,
}

/// Death thresholds for each side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub player: DeathThresholds,
    pub mobile: DeathThresholds,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            player: DeathThresholds::PLAYER,
            mobile: DeathThresholds::MOBILE,
        }
    }
}

/// Summary of one resolved round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    /// 1-based round number
    pub round: u32,
    /// Keys of combatants removed at the end of the round
    pub fallen: Vec<String>,
    /// Keys of fallen mobiles that were finally destroyed
    pub destroyed_mobiles: Vec<String>,
    /// Whether the fight goes on
    pub fighting: bool,
}

/// One fight
pub struct Encounter {
    id: Uuid,
    phase: EncounterPhase,
    aggro: bool,
    room: Option<Arc<dyn Room>>,
    /// Initiative order: players in the order they joined
    players: Vec<PlayerRef>,
    mobiles: Vec<MobileRef>,
    fallen_players: Vec<PlayerRef>,
    fallen_mobiles: Vec<MobileRef>,
    thresholds: Thresholds,
    rounds: u32,
}

impl fmt::Debug for Encounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encounter")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("aggro", &self.aggro)
            .field("room", &self.room_key())
            .field("players", &self.players.len())
            .field("mobiles", &self.mobiles.len())
            .field("rounds", &self.rounds)
            .finish()
    }
}

impl Default for Encounter {
    fn default() -> Self {
        Self::new()
    }
}

impl Encounter {
    /// Create an empty encounter with default thresholds
    pub fn new() -> Self {
        Self::with_thresholds(Thresholds::default())
    }

    /// Create an empty encounter
    pub fn with_thresholds(thresholds: Thresholds) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: EncounterPhase::Forming,
            aggro: false,
            room: None,
            players: Vec::new(),
            mobiles: Vec::new(),
            fallen_players: Vec::new(),
            fallen_mobiles: Vec::new(),
            thresholds,
            rounds: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> EncounterPhase {
        self.phase
    }

    /// Whether mobiles swing first each round
    pub fn is_aggro(&self) -> bool {
        self.aggro
    }

    pub fn rounds_fought(&self) -> u32 {
        self.rounds
    }

    pub fn room_key(&self) -> Option<&str> {
        self.room.as_ref().map(|r| r.key())
    }

    /// Players in initiative order
    pub fn players(&self) -> Vec<PlayerRef> {
        self.players.clone()
    }

    pub fn mobiles(&self) -> Vec<MobileRef> {
        self.mobiles.clone()
    }

    /// Player keys in initiative order
    pub fn initiative_order(&self) -> Vec<String> {
        self.players.iter().map(|p| p.lock().key.clone()).collect()
    }

    pub fn contains_player(&self, key: &str) -> bool {
        self.players.iter().any(|p| p.lock().key == key)
    }

    pub fn contains_mobile(&self, key: &str) -> bool {
        self.mobiles.iter().any(|m| m.lock().key == key)
    }

    /// Whether `key` names a mobile in this fight that can still be fought
    pub fn has_live_mobile(&self, key: &str) -> bool {
        self.mobiles.iter().any(|m| {
            let m = m.lock();
            m.key == key && m.is_alive()
        })
    }

    /// True while active and both sides have a live member
    pub fn is_fighting(&self) -> bool {
        self.phase == EncounterPhase::Active
            && self.players.iter().any(|p| p.lock().is_alive())
            && self.mobiles.iter().any(|m| m.lock().is_alive())
    }

    /// Add a player to the end of the initiative order.
    ///
    /// Returns false if the player is already fighting here.
    pub fn add_player(&mut self, player: PlayerRef) -> bool {
        let key = player.lock().key.clone();
        if self.contains_player(&key) {
            return false;
        }
        if self.phase == EncounterPhase::Active {
            player.lock().status = Status::Fighting;
        }
        debug!(encounter = %self.id, player = %key, "Player joins encounter");
        self.players.push(player);
        true
    }

    /// Add a mobile. Returns false if it is already fighting here.
    pub fn add_mobile(&mut self, mobile: MobileRef) -> bool {
        let (key, aggro) = {
            let m = mobile.lock();
            (m.key.clone(), m.aggro)
        };
        if self.contains_mobile(&key) {
            return false;
        }
        if self.phase == EncounterPhase::Active {
            mobile.lock().status = Status::Fighting;
            self.aggro |= aggro;
        }
        self.mobiles.push(mobile);
        true
    }

    /// Begin the fight.
    ///
    /// Requires at least one player and one mobile. Resolves the room from the
    /// first player's location, puts everyone into `Fighting` and decides
    /// initiative: any hostile mobile gives the mobiles the first swing.
    pub fn start(&mut self, world: &dyn World) -> Result<(), CombatError> {
        if self.phase != EncounterPhase::Forming {
            return Err(CombatError::AlreadyStarted);
        }
        if self.players.is_empty() || self.mobiles.is_empty() {
            return Err(CombatError::NotEnoughParticipants {
                players: self.players.len(),
                mobiles: self.mobiles.len(),
            });
        }

        let location = self.players[0].lock().location.clone();
        let room = world
            .resolve_room(&location)
            .ok_or(CombatError::RoomNotFound(location))?;

        for player in &self.players {
            player.lock().status = Status::Fighting;
        }
        for mobile in &self.mobiles {
            let mut mobile = mobile.lock();
            self.aggro |= mobile.aggro;
            mobile.status = Status::Fighting;
        }

        info!(
            encounter = %self.id,
            room = room.key(),
            players = self.players.len(),
            mobiles = self.mobiles.len(),
            aggro = self.aggro,
            "Encounter started"
        );

        self.room = Some(room);
        self.phase = EncounterPhase::Active;
        Ok(())
    }

    /// Resolve one round and deliver its narration.
    ///
    /// The side with initiative swings first; each attacker picks one live
    /// opponent uniformly at random.
    pub fn round(
        &mut self,
        rng: &mut dyn CombatRng,
        hooks: &dyn CombatHooks,
    ) -> Result<RoundOutcome, CombatError> {
        if self.phase != EncounterPhase::Active {
            return Err(CombatError::NotActive);
        }
        self.rounds += 1;

        let ledger = if self.aggro {
            let mobs = self.mobile_phase(rng);
            mobs.merge(self.player_phase(rng, hooks))
        } else {
            let players = self.player_phase(rng, hooks);
            players.merge(self.mobile_phase(rng))
        };

        self.deliver(&ledger);
        let (fallen, destroyed_mobiles) = self.retire_fallen(hooks);
        let fighting = self.is_fighting();

        debug!(
            encounter = %self.id,
            round = self.rounds,
            fallen = fallen.len(),
            fighting,
            "Round resolved"
        );

        Ok(RoundOutcome {
            round: self.rounds,
            fallen,
            destroyed_mobiles,
            fighting,
        })
    }

    /// Finish the fight: every remaining participant goes back to `Standing`
    pub fn end(&mut self) {
        for player in &self.players {
            player.lock().status = Status::Standing;
        }
        for mobile in &self.mobiles {
            mobile.lock().status = Status::Standing;
        }
        self.phase = EncounterPhase::Ended;
        info!(encounter = %self.id, rounds = self.rounds, "Encounter ended");
    }

    /// Take a player out of the fight between rounds (e.g. on disconnect)
    pub fn remove_player(&mut self, key: &str) -> Option<PlayerRef> {
        let idx = self.players.iter().position(|p| p.lock().key == key)?;
        let player = self.players.remove(idx);
        self.fallen_players.retain(|p| !Arc::ptr_eq(p, &player));
        {
            let mut p = player.lock();
            if p.status == Status::Fighting {
                p.status = Status::Standing;
            }
        }
        debug!(encounter = %self.id, player = key, "Player removed from encounter");
        Some(player)
    }

    /// Take a mobile out of the fight between rounds
    pub fn remove_mobile(&mut self, key: &str) -> Option<MobileRef> {
        let idx = self.mobiles.iter().position(|m| m.lock().key == key)?;
        let mobile = self.mobiles.remove(idx);
        self.fallen_mobiles.retain(|m| !Arc::ptr_eq(m, &mobile));
        {
            let mut m = mobile.lock();
            if m.status == Status::Fighting {
                m.status = Status::Standing;
            }
        }
        debug!(encounter = %self.id, mobile = key, "Mobile removed from encounter");
        Some(mobile)
    }

    /// Fire a mobile's skill attack at a random live player.
    ///
    /// Runs between rounds, so a player it fells is removed straight away.
    pub fn use_skill(
        &mut self,
        mobile_key: &str,
        skill: &SkillAttack,
        rng: &mut dyn CombatRng,
        hooks: &dyn CombatHooks,
    ) -> Result<Swing, CombatError> {
        if self.phase != EncounterPhase::Active {
            return Err(CombatError::NotActive);
        }
        let mobile = self
            .mobiles
            .iter()
            .find(|m| {
                let m = m.lock();
                m.key == mobile_key && m.is_alive()
            })
            .cloned()
            .ok_or_else(|| CombatError::CombatantNotFound(mobile_key.to_string()))?;

        let mut ledger = RoundLedger::new();
        let swing = {
            let mob = mobile.lock();
            let targets: Vec<&PlayerRef> =
                self.players.iter().filter(|p| p.lock().is_alive()).collect();
            let target = match pick_uniform(&targets, rng) {
                Some(t) => Arc::clone(*t),
                None => return Err(CombatError::NoLiveTarget),
            };

            let mut player = target.lock();
            let swing = match skill.roll(rng) {
                Some(damage) => apply_damage(&mut player.stats, damage, rng),
                None => Swing::miss(),
            };
            narrate_skill(&mut ledger, &mob, skill, &player, &swing);

            if swing.hit && !player.is_alive() {
                fell_player(&mut player, self.thresholds.player, &mut ledger);
                self.fallen_players.push(Arc::clone(&target));
            }
            swing
        };

        self.deliver(&ledger);
        self.retire_fallen(hooks);
        Ok(swing)
    }

    fn mobile_phase(&mut self, rng: &mut dyn CombatRng) -> RoundLedger {
        let mut ledger = RoundLedger::new();
        let mut fallen = Vec::new();

        for mobile in &self.mobiles {
            let mob = mobile.lock();
            if !mob.is_alive() {
                continue;
            }

            let targets: Vec<&PlayerRef> =
                self.players.iter().filter(|p| p.lock().is_alive()).collect();
            let target = match pick_uniform(&targets, rng) {
                Some(t) => *t,
                None => break,
            };

            let mut player = target.lock();
            let swing = resolve(&*mob, &mut *player, rng);
            narrate_mobile_swing(&mut ledger, &mob, &player, &swing);

            if swing.hit && !player.is_alive() {
                fell_player(&mut player, self.thresholds.player, &mut ledger);
                fallen.push(Arc::clone(target));
            }
        }

        self.fallen_players.extend(fallen);
        ledger
    }

    fn player_phase(&mut self, rng: &mut dyn CombatRng, hooks: &dyn CombatHooks) -> RoundLedger {
        let mut ledger = RoundLedger::new();
        let mut fallen = Vec::new();

        for player in &self.players {
            let mut player = player.lock();
            if !player.is_alive() {
                continue;
            }

            let targets: Vec<&MobileRef> =
                self.mobiles.iter().filter(|m| m.lock().is_alive()).collect();
            let target = match pick_uniform(&targets, rng) {
                Some(t) => *t,
                None => break,
            };

            let mut mob = target.lock();
            let swing = resolve(&*player, &mut *mob, rng);
            if swing.hit {
                hooks.apply_experience(&mut player, swing.damage);
            }
            narrate_player_swing(&mut ledger, &player, &mob, &swing);

            if swing.hit && !mob.is_alive() {
                mob.status = self.thresholds.mobile.status_for(mob.stats.hit_points);
                let death = format!("{} {}\n", mob.name, DEAD_SUFFIX);
                ledger.add_text(Some(&player.key), &death, Channel::KillingBlow);
                ledger.add_text(None, &death, Channel::Room);
                fallen.push(Arc::clone(target));
            }
        }

        self.fallen_mobiles.extend(fallen);
        ledger
    }

    /// Render the ledger and hand it to fighters and bystanders
    fn deliver(&self, ledger: &RoundLedger) {
        let order: Vec<InitiativeSlot> = self
            .players
            .iter()
            .map(|p| {
                let p = p.lock();
                InitiativeSlot::new(&p.key, p.is_alive())
            })
            .collect();

        let rendered = ledger.render(&order);
        for player in &self.players {
            let player = player.lock();
            match rendered.get(&player.key) {
                Some(text) if !text.is_empty() => player.deliver(text),
                _ => {}
            }
        }

        if let Some(room) = &self.room {
            let excluding: HashSet<String> = order.into_iter().map(|slot| slot.key).collect();
            room.send_to_players(ledger.room_text(), &excluding);
        }
    }

    /// Drop everyone who fell since the last call.
    ///
    /// Returns the keys of all fallen and of the mobiles destroyed among them.
    fn retire_fallen(&mut self, hooks: &dyn CombatHooks) -> (Vec<String>, Vec<String>) {
        let mut keys = Vec::new();
        let mut destroyed = Vec::new();

        for fallen in std::mem::take(&mut self.fallen_players) {
            self.players.retain(|p| !Arc::ptr_eq(p, &fallen));
            let mut player = fallen.lock();
            if self.thresholds.player.is_destroyed(player.stats.hit_points) {
                hooks.on_final_death(&mut *player);
            }
            keys.push(player.key.clone());
        }

        for fallen in std::mem::take(&mut self.fallen_mobiles) {
            self.mobiles.retain(|m| !Arc::ptr_eq(m, &fallen));
            let mut mobile = fallen.lock();
            if self.thresholds.mobile.is_destroyed(mobile.stats.hit_points) {
                hooks.on_final_death(&mut *mobile);
                destroyed.push(mobile.key.clone());
            }
            keys.push(mobile.key.clone());
        }

        (keys, destroyed)
    }
}

/// Apply the death-state rule to a player and narrate it
fn fell_player(player: &mut PlayerCombatant, thresholds: DeathThresholds, ledger: &mut RoundLedger) {
    let hit_points = player.stats.hit_points;
    player.status = thresholds.status_for(hit_points);
    let shout = player.status.text().to_uppercase();

    let mut own = format!("You are {}!!!", shout);
    if thresholds.is_destroyed(hit_points) {
        own.push_str(RESPAWN_NOTICE);
    }
    own.push('\n');
    let public = format!("{} is {}!!!\n", player.forename, shout);

    ledger.add_text(Some(&player.key), &own, Channel::Own);
    ledger.add_text(Some(&player.key), &public, Channel::Group);
    ledger.add_text(None, &public, Channel::Room);
}

fn narrate_player_swing(
    ledger: &mut RoundLedger,
    player: &PlayerCombatant,
    mob: &MobileCombatant,
    swing: &Swing,
) {
    let (own, group) = if swing.hit {
        (
            format!("You {} {} for {} damage!\n", swing.verbs.singular, mob.name, swing.damage),
            format!("{} {} {}.\n", player.forename, swing.verbs.plural, mob.name),
        )
    } else {
        (
            format!("You miss {}!\n", mob.name),
            format!("{} misses {}.\n", player.forename, mob.name),
        )
    };
    ledger.add_text(Some(&player.key), &own, Channel::Own);
    ledger.add_text(Some(&player.key), &group, Channel::Group);
    ledger.add_text(None, &format!("{} is fighting {}!\n", player.forename, mob.name), Channel::Room);
}

fn narrate_mobile_swing(
    ledger: &mut RoundLedger,
    mob: &MobileCombatant,
    player: &PlayerCombatant,
    swing: &Swing,
) {
    let (own, group) = if swing.hit {
        (
            format!("{} {} you for {} damage!\n", mob.name, swing.verbs.plural, swing.damage),
            format!("{} {} {}.\n", mob.name, swing.verbs.plural, player.forename),
        )
    } else {
        (
            format!("{} misses you!\n", mob.name),
            format!("{} misses {}.\n", mob.name, player.forename),
        )
    };
    ledger.add_text(Some(&player.key), &own, Channel::Own);
    ledger.add_text(Some(&player.key), &group, Channel::Group);
    ledger.add_text(None, &format!("{} is fighting {}!\n", mob.name, player.forename), Channel::Room);
}

fn narrate_skill(
    ledger: &mut RoundLedger,
    mob: &MobileCombatant,
    skill: &SkillAttack,
    player: &PlayerCombatant,
    swing: &Swing,
) {
    let (own, group) = if swing.hit {
        (
            format!(
                "{}'s {} {} you for {} damage!\n",
                mob.name, skill.name, swing.verbs.plural, swing.damage
            ),
            format!("{}'s {} {} {}.\n", mob.name, skill.name, swing.verbs.plural, player.forename),
        )
    } else {
        (
            format!("{}'s {} misses you!\n", mob.name, skill.name),
            format!("{}'s {} misses {}.\n", mob.name, skill.name, player.forename),
        )
    };
    ledger.add_text(Some(&player.key), &own, Channel::Own);
    ledger.add_text(Some(&player.key), &group, Channel::Group);
    ledger.add_text(
        None,
        &format!("{} uses {} on {}!\n", mob.name, skill.name, player.forename),
        Channel::Room,
    );
}
