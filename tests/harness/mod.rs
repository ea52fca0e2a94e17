//! Integration Test Harness
//!
//! In-process fixtures for driving encounters end to end:
//! - `TestArena` - A `MemoryWorld` with one room and helpers to populate it
//! - `RecordingSink` - Output sink that keeps everything a player was sent
//! - `RecordingHooks` - Combat hooks that log experience and final deaths
//! - `MaxRng` / `ScriptedRng` - Deterministic random sources
//!
//! # Example
//!
//! ```rust,ignore
//! let arena = TestArena::new();
//! let (alice, alice_out) = arena.player("Alice", CombatStats::new(30, 10, 20, 8));
//! let goblin = arena.mobile("goblin", "Goblin", CombatStats::new(10, 5, 15, 5), false);
//! let scheduler = arena.scheduler(MaxRng);
//! ```

#![allow(dead_code)]

mod rng;
mod sink;

pub use arena::{RecordingHooks, TestArena};
pub use rng::{MaxRng, ScriptedRng};
pub use sink::RecordingSink;
