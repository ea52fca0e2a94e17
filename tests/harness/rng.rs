//! Deterministic random sources

use std::collections::VecDeque;

use skirmish::combat::CombatRng;

/// Always draws the maximum integer and passes every chance check
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxRng;

impl CombatRng for MaxRng {
    fn uniform_int(&mut self, max: u32) -> u32 {
        max
    }

    fn uniform_double(&mut self) -> f64 {
        0.0
    }
}

/// Replays scripted integer draws, clamped to the requested range.
///
/// Once the script runs out every draw is 0.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRng {
    ints: VecDeque<u32>,
    double: f64,
}

impl ScriptedRng {
    pub fn new(ints: &[u32]) -> Self {
        Self {
            ints: ints.iter().copied().collect(),
            double: 0.0,
        }
    }

    /// Value returned by every `uniform_double` draw
    pub fn with_double(mut self, double: f64) -> Self {
        self.double = double;
        self
    }
}

impl CombatRng for ScriptedRng {
    fn uniform_int(&mut self, max: u32) -> u32 {
        self.ints.pop_front().unwrap_or(0).min(max)
    }

    fn uniform_double(&mut self) -> f64 {
        self.double
    }
}
