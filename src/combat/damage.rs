//! Damage resolution
//!
//! One attacker swings at one defender:
//! - to-hit: `uniform(0..=hit_roll) + 1 >= armor`
//! - damage: `uniform(0..=damage_roll) + 1`, applied to the defender at once
//! - flavor verb chosen from `(hit_points - damage) / max_hit_points`, read
//!   after the damage has landed

use super::dice::CombatRng;
use super::state::{CombatStats, Combatant};

/// One row of the damage-tier table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageTier {
    /// Applies when the remaining health fraction is below this value
    pub below: f64,
    /// Two synonyms (third person), one picked at random
    pub verbs: [&'static str; 2],
}

/// Tiers from most to least severe. The last row catches everything else.
pub const DAMAGE_TIERS: [DamageTier; 10] = [
    DamageTier { below: 0.1, verbs: ["annihilates", "eviscerates"] },
    DamageTier { below: 0.2, verbs: ["devastates", "destroys"] },
    DamageTier { below: 0.3, verbs: ["bludgeons", "lacerates"] },
    DamageTier { below: 0.4, verbs: ["mauls", "bashes"] },
    DamageTier { below: 0.5, verbs: ["pounds", "clobbers"] },
    DamageTier { below: 0.6, verbs: ["hits", "wallops"] },
    DamageTier { below: 0.7, verbs: ["whacks", "smacks"] },
    DamageTier { below: 0.8, verbs: ["scratches", "grazes"] },
    DamageTier { below: 0.9, verbs: ["dents", "nicks"] },
    DamageTier { below: f64::INFINITY, verbs: ["nicks", "barely hits"] },
];

/// A verb in both persons: "You bash" / "Alice bashes"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerbPair {
    pub plural: String,
    pub singular: String,
}

impl VerbPair {
    /// Build from the third-person form
    pub fn from_plural(plural: &str) -> Self {
        Self {
            plural: plural.to_string(),
            singular: singular_form(plural),
        }
    }

    /// The fixed pair used on a miss
    pub fn miss() -> Self {
        Self::from_plural("misses")
    }
}

/// Derive the second-person verb from the third-person one.
///
/// `-shes`, `-ches` and `-sses` drop "es", everything else drops the final "s".
pub fn singular_form(plural: &str) -> String {
    if ["shes", "ches", "sses"].iter().any(|end| plural.ends_with(end)) {
        return plural[..plural.len() - 2].to_string();
    }
    if let Some(stem) = plural.strip_suffix('s') {
        return stem.to_string();
    }
    plural.to_string()
}

/// Tier for a remaining health fraction
pub fn tier_for(remaining_fraction: f64) -> &'static DamageTier {
    DAMAGE_TIERS
        .iter()
        .find(|tier| remaining_fraction < tier.below)
        .unwrap_or(&DAMAGE_TIERS[DAMAGE_TIERS.len() - 1])
}

/// Pick a flavor verb for a defender left with `remaining_fraction` health
pub fn damage_verb(remaining_fraction: f64, rng: &mut dyn CombatRng) -> VerbPair {
    let tier = tier_for(remaining_fraction);
    let choice = rng.uniform_int(1).min(1) as usize;
    VerbPair::from_plural(tier.verbs[choice])
}

/// Outcome of a single swing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Swing {
    pub hit: bool,
    /// Damage dealt, 0 on a miss
    pub damage: i32,
    pub verbs: VerbPair,
}

impl Swing {
    pub fn miss() -> Self {
        Self {
            hit: false,
            damage: 0,
            verbs: VerbPair::miss(),
        }
    }
}

/// Health fraction the verb tier is picked from.
///
/// Read after `damage` has been applied, so the blow counts twice: a 9 point
/// hit on a 10/10 defender gives (1 - 9) / 10.
pub fn remaining_fraction(defender: &CombatStats, damage: i32) -> f64 {
    if defender.max_hit_points <= 0 {
        return 0.0;
    }
    f64::from(defender.hit_points.saturating_sub(damage)) / f64::from(defender.max_hit_points)
}

/// Deal `damage` to `defender` and choose the verb for the blow
pub fn apply_damage(defender: &mut CombatStats, damage: i32, rng: &mut dyn CombatRng) -> Swing {
    defender.hit_points -= damage;
    Swing {
        hit: true,
        damage,
        verbs: damage_verb(remaining_fraction(defender, damage), rng),
    }
}

/// Resolve one swing of `attacker` at `defender`.
///
/// Damage lands on the defender before this returns, so later swings in the
/// same round see the reduced health.
pub fn resolve<A, D>(attacker: &A, defender: &mut D, rng: &mut dyn CombatRng) -> Swing
where
    A: Combatant + ?Sized,
    D: Combatant + ?Sized,
{
    let attack = attacker.stats();
    let roll = rng.uniform_int(attack.hit_roll) as i64 + 1;
    if roll < i64::from(defender.stats().armor) {
        return Swing::miss();
    }

    let damage = rng.uniform_int(attack.damage_roll) as i64 + 1;
    let damage = i32::try_from(damage).unwrap_or(i32::MAX);
    apply_damage(defender.stats_mut(), damage, rng)
}
