//! Skill timers
//!
//! Per-mobile heartbeats for bonus skill attacks. A firing is only reported
//! here; the caller hands it to the encounter scheduler, which resolves it
//! under the same lock as the combat rounds.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

use crate::combat::SkillAttack;

/// A recurring skill attack owned by one mobile
#[derive(Debug, Clone)]
pub struct SkillBeat {
    /// Mobile that owns this skill
    pub mobile_key: String,
    pub skill: SkillAttack,
    /// Interval between attempts in milliseconds
    pub interval_ms: u64,
    /// Last time the skill fired
    pub last_fired: Instant,
}

impl SkillBeat {
    /// Create a new skill heartbeat, first due one interval from now
    pub fn new(mobile_key: &str, skill: SkillAttack, interval_ms: u64) -> Self {
        Self {
            mobile_key: mobile_key.to_string(),
            skill,
            interval_ms,
            last_fired: Instant::now(),
        }
    }

    /// Check if the skill is due at `now`
    pub fn is_due_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_fired) >= Duration::from_millis(self.interval_ms)
    }

    /// Check if the skill is due
    pub fn is_due(&self) -> bool {
        self.is_due_at(Instant::now())
    }

    /// Reset after firing
    pub fn reset_at(&mut self, now: Instant) {
        self.last_fired = now;
    }
}

/// A skill that came due
#[derive(Debug, Clone, PartialEq)]
pub struct SkillFired {
    pub mobile_key: String,
    pub skill: SkillAttack,
}

/// Skill heartbeats for every mobile that has one
#[derive(Debug, Default)]
pub struct SkillTimers {
    beats: RwLock<HashMap<String, Vec<SkillBeat>>>,
}

impl SkillTimers {
    /// Create an empty timer set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a shared instance
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a skill heartbeat for a mobile
    pub async fn add(&self, beat: SkillBeat) {
        debug!(mobile = %beat.mobile_key, skill = %beat.skill.name, interval_ms = beat.interval_ms, "Skill timer added");
        self.beats
            .write()
            .await
            .entry(beat.mobile_key.clone())
            .or_default()
            .push(beat);
    }

    /// Remove every skill heartbeat of a mobile (e.g. once it is destroyed)
    pub async fn remove_for(&self, mobile_key: &str) -> bool {
        self.beats.write().await.remove(mobile_key).is_some()
    }

    /// Collect due skills and reset them
    pub async fn tick(&self) -> Vec<SkillFired> {
        self.tick_at(Instant::now()).await
    }

    /// Collect skills due at `now` and reset them
    pub async fn tick_at(&self, now: Instant) -> Vec<SkillFired> {
        let mut fired = Vec::new();
        let mut beats = self.beats.write().await;
        for beat in beats.values_mut().flatten() {
            if beat.is_due_at(now) {
                fired.push(SkillFired {
                    mobile_key: beat.mobile_key.clone(),
                    skill: beat.skill.clone(),
                });
                beat.reset_at(now);
            }
        }
        fired
    }

    /// Number of registered skill heartbeats
    pub async fn count(&self) -> usize {
        self.beats.read().await.values().map(Vec::len).sum()
    }
}
