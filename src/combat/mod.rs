//! Combat system module
//!
//! Round-based melee between players and mobiles:
//! - Random source and uniform target picking
//! - Swing resolution with to-hit, damage and flavor verbs
//! - Per-round narration ledger rendered in initiative order
//! - Encounters and the scheduler that ticks them
//! - Mobile skill attacks

mod damage;
mod dice;
mod encounter;
mod ledger;
mod scheduler;
mod skill;
mod state;

pub use damage::{apply_damage, damage_verb, remaining_fraction, resolve, singular_form, DamageTier, Swing, VerbPair, DAMAGE_TIERS};
pub use dice::{pick_uniform, CombatRng, SeededRng};
pub use encounter::{Encounter, EncounterPhase, RoundOutcome, Thresholds, RESPAWN_NOTICE};
pub use ledger::{first_person_kills, Channel, InitiativeSlot, RoundLedger, DEAD_SUFFIX};
pub use scheduler::{EncounterScheduler, SharedEncounter, TickReport, DEFAULT_TICK_INTERVAL};
pub use skill::SkillAttack;
pub use state::{
    CombatStats, Combatant, CombatantKind, DeathThresholds, MobileCombatant, MobileRef,
    PlayerCombatant, PlayerRef, Status,
};
