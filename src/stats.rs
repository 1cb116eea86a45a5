use crate::battle_log::LogEntry;
use crate::pokemon::Pokemon;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralStatistics {
    /// Seconds.
    pub duration: f64,
    /// 1 when team "1" was defeated.
    pub battle_result: u8,
    pub tdo: i64,
    pub tdo_percent: f64,
    pub dps: f64,
    pub num_of_deaths: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatistics {
    pub name: String,
    pub tdo: i64,
    pub dps: f64,
    pub num_of_deaths: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyStatistics {
    pub tdo: i64,
    pub num_of_deaths: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PokemonStatistics {
    pub name: String,
    pub nickname: String,
    pub hp: i32,
    pub energy: i32,
    pub tdo: i64,
    pub tdo_fast: i64,
    pub duration: f64,
    pub dps: f64,
    pub num_fast_attacks: u32,
    pub num_charged_attacks: u32,
    pub num_of_deaths: u32,
}

impl From<&Pokemon> for PokemonStatistics {
    fn from(pokemon: &Pokemon) -> Self {
        let duration = pokemon.active_duration_ms as f64 / 1000.0;
        PokemonStatistics {
            name: pokemon.name.clone(),
            nickname: pokemon.nickname.clone(),
            hp: pokemon.hp,
            energy: pokemon.energy,
            tdo: pokemon.tdo,
            tdo_fast: pokemon.tdo_fast,
            duration,
            dps: per_second(pokemon.tdo as f64, duration),
            num_fast_attacks: pokemon.num_fast_attacks,
            num_charged_attacks: pokemon.num_charged_attacks,
            num_of_deaths: pokemon.deaths,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleStatistics {
    pub general_stat: GeneralStatistics,
    pub player_stats: Vec<PlayerStatistics>,
    /// Per player, per party.
    pub party_stats: Vec<Vec<PartyStatistics>>,
    /// Per player, per party, per member.
    pub pokemon_stats: Vec<Vec<Vec<PokemonStatistics>>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub battle_log: Vec<LogEntry>,
}

/// `amount / seconds`, or 0 for an empty interval.
pub fn per_second(amount: f64, seconds: f64) -> f64 {
    if seconds > 0.0 {
        amount / seconds
    } else {
        0.0
    }
}
