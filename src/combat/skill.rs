//! Mobile skill attacks
//!
//! A bonus attack a mobile fires on its own timer, outside the regular round.

use serde::{Deserialize, Serialize};

use super::dice::CombatRng;

/// A named bonus attack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillAttack {
    pub name: String,
    /// Chance in `[0, 1]` that the attack lands
    pub effectiveness: f64,
    pub min_damage: i32,
    pub max_damage: i32,
}

impl SkillAttack {
    /// Create a skill attack
    pub fn new(name: &str, effectiveness: f64, min_damage: i32, max_damage: i32) -> Self {
        Self {
            name: name.to_string(),
            effectiveness,
            min_damage,
            max_damage: max_damage.max(min_damage),
        }
    }

    /// Roll the attack: `Some(damage)` when it lands
    pub fn roll(&self, rng: &mut dyn CombatRng) -> Option<i32> {
        if rng.uniform_double() >= self.effectiveness {
            return None;
        }
        let span = u32::try_from(self.max_damage - self.min_damage).unwrap_or(0);
        let extra = i32::try_from(rng.uniform_int(span)).unwrap_or(0);
        Some((self.min_damage + extra).max(1))
    }
}
