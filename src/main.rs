//! skirmish - demo arena driver

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use skirmish::combat::{CombatStats, EncounterPhase, MobileCombatant, PlayerCombatant, SkillAttack};
use skirmish::player::LevelingHooks;
use skirmish::timers::SkillBeat;
use skirmish::world::{LogSink, MemoryWorld};
use skirmish::{Config, Server};
use tokio::time;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Run a single fight in a demo arena
#[derive(Debug, Parser)]
#[command(name = "skirmish", version, about)]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed the combat RNG for a replayable fight
    #[arg(long)]
    seed: Option<u64>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Stop after this many rounds
    #[arg(long)]
    rounds: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skirmish=info".into()),
        )
        .with(args.json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!args.json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    let mut config = Config::load(args.config.as_deref())?;
    if args.seed.is_some() {
        config.rng_seed = args.seed;
    }

    let world = MemoryWorld::shared();
    let server = Arc::new(Server::new(config, world.clone(), Arc::new(LevelingHooks))?);

    // Build the arena: one hostile troll with a bonus attack
    let arena = world.room("arena");
    let troll = MobileCombatant::new("troll", "Troll", "arena", CombatStats::new(30, 8, 14, 4))
        .aggressive()
        .shared();
    arena.add_mobile(troll);
    server
        .skill_timers()
        .add(SkillBeat::new("troll", SkillAttack::new("club smash", 0.4, 2, 6), 2500))
        .await;

    let hero = PlayerCombatant::new(
        "Hero",
        "arena",
        CombatStats::new(40, 10, 20, 6),
        Arc::new(LogSink::new("Hero")),
    )
    .shared();
    arena.add_player(hero.clone());

    let Some(encounter) = server.scheduler().on_room_entry(hero.clone(), &*arena).await? else {
        bail!("nothing in the arena wants to fight");
    };

    let runner = server.clone();
    let handle = tokio::spawn(async move { runner.run().await });

    let mut watch = time::interval(server.config().tick_interval());
    loop {
        tokio::select! {
            _ = watch.tick() => {
                let (phase, rounds) = {
                    let encounter = encounter.lock();
                    (encounter.phase(), encounter.rounds_fought())
                };
                if phase == EncounterPhase::Ended {
                    info!(rounds, "The fight is over");
                    break;
                }
                if args.rounds.is_some_and(|limit| rounds >= limit) {
                    info!(rounds, "Round limit reached");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    server.shutdown();
    handle.await??;

    let hero = hero.lock();
    info!(
        hit_points = hero.stats.hit_points,
        level = hero.level,
        experience = hero.experience,
        status = %hero.status,
        "Hero after the fight"
    );

    Ok(())
}
