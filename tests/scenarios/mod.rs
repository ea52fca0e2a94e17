//! Scenario Tests for skirmish
//!
//! Modular combat scenarios covering:
//! - Encounter: lifecycle from start to end through the scheduler
//! - Narration: what each fighter and bystander reads after a round
//! - Scheduler: joining fights, room entry, lookups and skill attacks

pub mod encounter;
pub mod narration;
