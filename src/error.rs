//! Error types for the encounter engine

use thiserror::Error;

/// Errors reported by encounters and the scheduler.
///
/// These are precondition violations: the offending request is rejected and
/// the scheduler keeps running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    #[error("cannot start encounter: need 1 player and 1 mobile (have {players} and {mobiles})")]
    NotEnoughParticipants { players: usize, mobiles: usize },

    #[error("encounter has already been started")]
    AlreadyStarted,

    #[error("encounter is not active")]
    NotActive,

    #[error("no room found for location '{0}'")]
    RoomNotFound(String),

    #[error("no active encounter holds mobile '{0}'")]
    MobileNotFound(String),

    #[error("player '{0}' is already fighting another encounter")]
    AlreadyFighting(String),

    #[error("combatant '{0}' is not part of this encounter")]
    CombatantNotFound(String),

    #[error("no live target available")]
    NoLiveTarget,
}

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),

    #[error("{which} thresholds are inconsistent: dead ({dead}) must not exceed incapacitated ({incapacitated})")]
    InvalidThresholds {
        which: &'static str,
        dead: i32,
        incapacitated: i32,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Figment(Box::new(err))
    }
}
