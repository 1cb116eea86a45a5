use crate::error::ConfigError;
use crate::model::{Move, MoveKind};
use crate::types::TypeChart;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Canonical CP multipliers for whole levels 1 through 40.
const WHOLE_LEVEL_CPM: [f64; 40] = [
    0.094, 0.16639787, 0.21573247, 0.25572005, 0.29024988, 0.3210876, 0.34921268, 0.3752356,
    0.39956728, 0.4225, 0.44310755, 0.4627984, 0.48168495, 0.49985844, 0.51739395, 0.53435433,
    0.55079269, 0.56675452, 0.58227891, 0.5974, 0.61215729, 0.62656713, 0.64065295, 0.65443563,
    0.667934, 0.68116492, 0.69414365, 0.70688421, 0.71939909, 0.7317, 0.73776948, 0.74378943,
    0.74976104, 0.75568551, 0.76156384, 0.76739717, 0.7731865, 0.77893275, 0.78463697, 0.7903,
];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Species {
    pub name: String,
    #[serde(default)]
    pub types: Vec<String>,
    pub base_atk: f64,
    pub base_def: f64,
    pub base_stm: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpeciesRecord {
    name: String,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    poke_type1: Option<String>,
    #[serde(default)]
    poke_type2: Option<String>,
    base_atk: f64,
    base_def: f64,
    base_stm: f64,
}

impl From<SpeciesRecord> for Species {
    fn from(record: SpeciesRecord) -> Self {
        let mut types = record.types;
        if types.is_empty() {
            types.extend(
                [record.poke_type1, record.poke_type2]
                    .into_iter()
                    .flatten()
                    .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("none")),
            );
        }
        Species {
            name: record.name,
            types,
            base_atk: record.base_atk,
            base_def: record.base_def,
            base_stm: record.base_stm,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LevelEntry {
    pub value: f64,
    pub cpm: f64,
}

/// Levels in ascending order. CP is assumed monotonic in level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelTable {
    levels: Vec<LevelEntry>,
}

impl LevelTable {
    pub fn new(mut levels: Vec<LevelEntry>) -> Self {
        levels.sort_by(|a, b| a.value.total_cmp(&b.value));
        LevelTable { levels }
    }

    /// Levels 1 to 40 in half-level steps.
    pub fn standard() -> Self {
        let mut levels = Vec::with_capacity(WHOLE_LEVEL_CPM.len() * 2 - 1);
        for (i, &cpm) in WHOLE_LEVEL_CPM.iter().enumerate() {
            levels.push(LevelEntry {
                value: (i + 1) as f64,
                cpm,
            });
            if let Some(&next) = WHOLE_LEVEL_CPM.get(i + 1) {
                levels.push(LevelEntry {
                    value: i as f64 + 1.5,
                    cpm: ((cpm * cpm + next * next) / 2.0).sqrt(),
                });
            }
        }
        LevelTable { levels }
    }

    pub fn cpm(&self, level: f64) -> Option<f64> {
        self.levels
            .iter()
            .find(|entry| (entry.value - level).abs() < 1e-9)
            .map(|entry| entry.cpm)
    }

    pub fn entries(&self) -> &[LevelEntry] {
        &self.levels
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaidTier {
    pub tier: u32,
    pub cpm: f64,
    #[serde(alias = "maxHP")]
    pub max_hp: i32,
}

pub fn standard_raid_tiers() -> Vec<RaidTier> {
    [(1, 0.6, 600), (2, 0.67, 1800), (3, 0.73, 3600), (4, 0.79, 9000), (5, 0.79, 15000)]
        .into_iter()
        .map(|(tier, cpm, max_hp)| RaidTier { tier, cpm, max_hp })
        .collect()
}

/// Battle constants. Every field can be overridden from the data file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BattleSettings {
    pub maximum_energy: i32,
    pub energy_delta_per_health_lost: f64,
    pub same_type_attack_bonus_multiplier: f64,
    pub weather_attack_bonus_multiplier: f64,
    pub fast_attack_bonus_multiplier: f64,
    pub charged_attack_bonus_multiplier: f64,
    pub dodge_duration_ms: i64,
    pub dodge_window_ms: i64,
    pub dodge_damage_reduction_percent: f64,
    pub protect_shield_damage_reduction_percent: f64,
    pub protect_shields: u32,
    pub swap_duration_ms: i64,
    pub switching_cooldown_duration_ms: i64,
    pub rejoin_duration_ms: i64,
    pub item_menu_animation_time_ms: i64,
    pub max_revive_time_per_pokemon_ms: i64,
    pub arena_entry_lag_ms: i64,
    pub arena_early_termination_ms: i64,
    pub fast_move_lag_ms: i64,
    pub charged_move_lag_ms: i64,
    pub minigame_duration_ms: i64,
    pub defender_delay_min_ms: i64,
    pub defender_delay_jitter_ms: i64,
    pub iv_min: u32,
    pub iv_max: u32,
}

impl Default for BattleSettings {
    fn default() -> Self {
        BattleSettings {
            maximum_energy: 100,
            energy_delta_per_health_lost: 0.5,
            same_type_attack_bonus_multiplier: 1.2,
            weather_attack_bonus_multiplier: 1.2,
            fast_attack_bonus_multiplier: 1.3,
            charged_attack_bonus_multiplier: 1.3,
            dodge_duration_ms: 500,
            dodge_window_ms: 700,
            dodge_damage_reduction_percent: 0.75,
            protect_shield_damage_reduction_percent: 1.0,
            protect_shields: 2,
            swap_duration_ms: 1000,
            switching_cooldown_duration_ms: 60_000,
            rejoin_duration_ms: 10_000,
            item_menu_animation_time_ms: 5800,
            max_revive_time_per_pokemon_ms: 800,
            arena_entry_lag_ms: 3000,
            arena_early_termination_ms: 3000,
            fast_move_lag_ms: 25,
            charged_move_lag_ms: 100,
            minigame_duration_ms: 10_000,
            defender_delay_min_ms: 1500,
            defender_delay_jitter_ms: 1000,
            iv_min: 0,
            iv_max: 15,
        }
    }
}

/// Immutable reference data shared by every world built from it.
///
/// Names are matched case-insensitively.
#[derive(Debug, Clone)]
pub struct GameData {
    species: HashMap<String, Species>,
    fast_moves: HashMap<String, Arc<Move>>,
    charged_moves: HashMap<String, Arc<Move>>,
    pub type_chart: TypeChart,
    pub levels: LevelTable,
    raid_tiers: HashMap<u32, RaidTier>,
    pub settings: BattleSettings,
}

impl Default for GameData {
    fn default() -> Self {
        GameData {
            species: HashMap::new(),
            fast_moves: HashMap::new(),
            charged_moves: HashMap::new(),
            type_chart: TypeChart::standard(),
            levels: LevelTable::standard(),
            raid_tiers: standard_raid_tiers()
                .into_iter()
                .map(|tier| (tier.tier, tier))
                .collect(),
            settings: BattleSettings::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameDataFile {
    #[serde(default)]
    pokemon: Vec<SpeciesRecord>,
    #[serde(default)]
    fast_moves: Vec<Move>,
    #[serde(default)]
    charged_moves: Vec<Move>,
    #[serde(default)]
    type_chart: Option<TypeChart>,
    #[serde(default)]
    levels: Option<Vec<LevelEntry>>,
    #[serde(default)]
    raid_tiers: Option<Vec<RaidTier>>,
    #[serde(default)]
    settings: Option<BattleSettings>,
}

fn key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

impl GameData {
    /// Standard tables with no species or moves registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the reference data from a JSON document. Sections that are
    /// absent fall back to the standard tables.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let file: GameDataFile = serde_json::from_str(raw)?;
        let mut data = GameData::new();
        for record in file.pokemon {
            data.add_species(record.into());
        }
        for mv in file.fast_moves {
            data.add_fast_move(mv);
        }
        for mv in file.charged_moves {
            data.add_charged_move(mv);
        }
        if let Some(chart) = file.type_chart {
            data.type_chart = chart.normalized();
        }
        if let Some(levels) = file.levels {
            data.levels = LevelTable::new(levels);
        }
        if let Some(tiers) = file.raid_tiers {
            data.raid_tiers = tiers.into_iter().map(|tier| (tier.tier, tier)).collect();
        }
        if let Some(settings) = file.settings {
            data.settings = settings;
        }
        Ok(data)
    }

    pub fn add_species(&mut self, species: Species) -> &mut Self {
        self.species.insert(key(&species.name), species);
        self
    }

    pub fn add_fast_move(&mut self, mut mv: Move) -> &mut Self {
        mv.kind = MoveKind::Fast;
        self.fast_moves.insert(key(&mv.name), Arc::new(mv));
        self
    }

    pub fn add_charged_move(&mut self, mut mv: Move) -> &mut Self {
        mv.kind = MoveKind::Charged;
        self.charged_moves.insert(key(&mv.name), Arc::new(mv));
        self
    }

    pub fn species(&self, name: &str) -> Result<&Species, ConfigError> {
        self.species
            .get(&key(name))
            .ok_or_else(|| ConfigError::UnknownSpecies(name.to_string()))
    }

    pub fn fast_move(&self, name: &str) -> Result<Arc<Move>, ConfigError> {
        self.fast_moves
            .get(&key(name))
            .cloned()
            .ok_or_else(|| ConfigError::UnknownFastMove(name.to_string()))
    }

    pub fn charged_move(&self, name: &str) -> Result<Arc<Move>, ConfigError> {
        self.charged_moves
            .get(&key(name))
            .cloned()
            .ok_or_else(|| ConfigError::UnknownChargedMove(name.to_string()))
    }

    pub fn cpm(&self, level: f64) -> Result<f64, ConfigError> {
        self.levels
            .cpm(level)
            .ok_or(ConfigError::UnknownLevel(level))
    }

    pub fn raid_tier(&self, tier: u32) -> Result<RaidTier, ConfigError> {
        self.raid_tiers
            .get(&tier)
            .copied()
            .ok_or(ConfigError::UnknownRaidTier(tier))
    }
}
