//! Player progression
//!
//! Experience earned by landing blows, and the level curve it climbs:
//! - Level 2 at 1 000 XP, level 50 at 1 000 000 XP, geometric in between
//! - Experience stops accruing at the cap
//!
//! [`LevelingHooks`] is the default [`CombatHooks`] implementation wiring this
//! into encounters.

use tracing::info;

use crate::combat::{Combatant, CombatantKind, PlayerCombatant, Status};
use crate::world::CombatHooks;

/// Highest attainable level
pub const LEVEL_MAX: u32 = 50;

/// Experience needed for level 2
pub const FIRST_LEVEL_XP: u32 = 1_000;

/// Experience needed for the last level
pub const MAX_LEVEL_XP: u32 = 1_000_000;

pub const LEVEL_UP_MESSAGE: &str = "You feel like you've gained a new understanding of the world.\n";

/// Total experience required to reach `level`
pub fn experience_for_level(level: u32) -> u32 {
    match level {
        0 | 1 => 0,
        l if l >= LEVEL_MAX => MAX_LEVEL_XP,
        l => {
            let ratio = f64::from(MAX_LEVEL_XP) / f64::from(FIRST_LEVEL_XP);
            let exponent = f64::from(l - 2) / f64::from(LEVEL_MAX - 2);
            (f64::from(FIRST_LEVEL_XP) * ratio.powf(exponent)).round() as u32
        }
    }
}

/// Credit `amount` experience to `player`, levelling up as far as it goes.
///
/// Returns true if the player gained at least one level.
pub fn apply_experience(player: &mut PlayerCombatant, amount: i32) -> bool {
    if amount <= 0 || player.level >= LEVEL_MAX {
        return false;
    }

    let gained = u32::try_from(amount).unwrap_or(0);
    player.experience = player.experience.saturating_add(gained).min(MAX_LEVEL_XP);

    let start = player.level;
    while player.level < LEVEL_MAX && player.experience >= experience_for_level(player.level + 1) {
        player.level += 1;
    }

    if player.level == start {
        return false;
    }

    info!(player = %player.key, level = player.level, experience = player.experience, "Player levelled up");
    player.deliver(LEVEL_UP_MESSAGE);
    true
}

/// Default combat side effects: experience on every hit, respawn on death
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelingHooks;

impl CombatHooks for LevelingHooks {
    fn apply_experience(&self, player: &mut PlayerCombatant, damage_dealt: i32) {
        apply_experience(player, damage_dealt);
    }

    fn on_final_death(&self, combatant: &mut dyn Combatant) {
        info!(combatant = combatant.key(), location = combatant.location(), "Final death");

        // corpses are left to the world; players come back at full health
        if combatant.kind() == CombatantKind::Player {
            let stats = combatant.stats_mut();
            stats.hit_points = stats.max_hit_points;
            combatant.set_status(Status::Standing);
        }
    }
}
