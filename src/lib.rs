//! skirmish - encounter engine for text MUD servers
//!
//! Round-based fights between players and mobiles, advanced on a fixed tick,
//! with per-player narration rendered in initiative order.

pub mod combat;
pub mod config;
pub mod error;
pub mod player;
pub mod timers;
pub mod world;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use combat::{EncounterScheduler, SeededRng};
use timers::SkillTimers;
use world::{CombatHooks, World};

pub use config::Config;

/// The combat driver: ticks encounters and routes skill attacks
pub struct Server {
    config: Config,
    scheduler: Arc<EncounterScheduler>,
    skill_timers: Arc<SkillTimers>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Server {
    /// Create a new server over `world`
    pub fn new(config: Config, world: Arc<dyn World>, hooks: Arc<dyn CombatHooks>) -> Result<Self> {
        config.validate()?;

        let rng = SeededRng::new(config.rng_seed);
        let scheduler = EncounterScheduler::new(world, hooks, Box::new(rng))
            .with_tick_interval(config.tick_interval())
            .with_thresholds(config.thresholds());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            config,
            scheduler: Arc::new(scheduler),
            skill_timers: SkillTimers::shared(),
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Get the scheduler handle
    pub fn scheduler(&self) -> Arc<EncounterScheduler> {
        self.scheduler.clone()
    }

    /// Get the skill timer handle
    pub fn skill_timers(&self) -> Arc<SkillTimers> {
        self.skill_timers.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run until shutdown, then end every encounter
    pub async fn run(&self) -> Result<()> {
        let mut combat_tick = time::interval(self.config.tick_interval());
        combat_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut skill_pulse = time::interval(self.config.skill_pulse());
        skill_pulse.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut shutdown_rx = self.shutdown_rx.clone();

        info!(
            tick_ms = self.config.tick_interval_ms,
            seeded = self.config.rng_seed.is_some(),
            "skirmish running"
        );

        loop {
            tokio::select! {
                _ = combat_tick.tick() => {
                    let report = self.scheduler.tick().await;
                    if report.rounds > 0 || !report.ended.is_empty() {
                        debug!(rounds = report.rounds, ended = report.ended.len(), "Combat tick");
                    }
                    for mobile in &report.destroyed_mobiles {
                        if self.skill_timers.remove_for(mobile).await {
                            debug!(mobile = %mobile, "Skill timers dropped for destroyed mobile");
                        }
                    }
                }
                _ = skill_pulse.tick() => self.pulse_skills().await,
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        let ended = self.scheduler.end_all().await;
        info!(ended, "skirmish shutdown complete");
        Ok(())
    }

    /// Fire due skill attacks inside their fights
    async fn pulse_skills(&self) {
        for fired in self.skill_timers.tick().await {
            if let Err(e) = self.scheduler.use_skill(&fired.mobile_key, &fired.skill).await {
                debug!(mobile = %fired.mobile_key, skill = %fired.skill.name, "Skill rejected: {}", e);
            }
        }
    }

    /// Signal the server to shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}
