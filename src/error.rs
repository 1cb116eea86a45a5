use crate::event::PokemonId;
use thiserror::Error;

/// Problems detected while building a [`crate::world::World`] from its config.
///
/// All of these are raised before any simulated time elapses.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown species: {0}")]
    UnknownSpecies(String),

    #[error("unknown fast move: {0}")]
    UnknownFastMove(String),

    #[error("unknown charged move: {0}")]
    UnknownChargedMove(String),

    #[error("unknown level: {0}")]
    UnknownLevel(f64),

    #[error("unknown raid tier: {0}")]
    UnknownRaidTier(u32),

    #[error("no combination of level and IVs yields CP {cp} for {name}")]
    NoLevelForCp { name: String, cp: u32 },

    #[error("{name} is missing {field}")]
    MissingStats { name: String, field: &'static str },

    #[error("{name} has no charged move")]
    NoChargedMove { name: String },

    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("unknown friendship level: {0}")]
    UnknownFriendship(String),

    #[error("battle has no players")]
    NoPlayers,

    #[error("player {player} has no parties")]
    NoParties { player: usize },

    #[error("party {party} of player {player} has no pokemon")]
    EmptyParty { player: usize, party: usize },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Conditions that can only arise from a bug in event generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantKind {
    InsufficientEnergy { energy: i32, cost: i32 },
    NoShieldLeft,
    UnknownPokemon(PokemonId),
    InvalidSwitch(PokemonId),
}

impl std::fmt::Display for InvariantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvariantKind::InsufficientEnergy { energy, cost } => {
                write!(f, "insufficient energy ({energy}) for charged move costing {cost}")
            }
            InvariantKind::NoShieldLeft => write!(f, "no protect shield left"),
            InvariantKind::UnknownPokemon(id) => write!(f, "no pokemon with id {id}"),
            InvariantKind::InvalidSwitch(id) => write!(f, "cannot switch to pokemon {id}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invariant violated at t={t}ms during {event} of {subject}: {kind}")]
    Invariant {
        t: i64,
        event: String,
        subject: String,
        kind: InvariantKind,
    },

    #[error("battle did not terminate within {limit} events (t={t}ms)")]
    EventCapExceeded { limit: usize, t: i64 },
}

pub type Result<T> = std::result::Result<T, SimError>;
