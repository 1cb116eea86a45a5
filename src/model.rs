use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveKind {
    #[default]
    Fast,
    Charged,
}

/// A move as it comes out of the reference tables. Never mutated once loaded.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    pub name: String,
    #[serde(rename = "type", alias = "pokeType")]
    pub move_type: String,
    pub power: f64,
    /// Positive for fast moves, negative (the cost) for charged moves.
    pub energy_delta: i32,
    #[serde(alias = "dws")]
    pub damage_window_ms: i64,
    #[serde(alias = "duration")]
    pub duration_ms: i64,
    #[serde(default, alias = "moveType")]
    pub kind: MoveKind,
    /// Scripted effect hook. Carried through but not interpreted by the engine.
    #[serde(default)]
    pub effect: Option<String>,
}

impl Move {
    pub fn energy_cost(&self) -> i32 {
        -self.energy_delta
    }

    pub fn is_fast(&self) -> bool {
        self.kind == MoveKind::Fast
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleMode {
    Raid,
    Gym,
    Pvp,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum Role {
    #[default]
    #[serde(rename = "attacker", alias = "a")]
    Attacker,
    #[serde(rename = "gymDefender", alias = "gd")]
    GymDefender,
    #[serde(rename = "raidBoss", alias = "rb")]
    RaidBoss,
}

impl Role {
    /// Gym defenders and raid bosses have to reveal their next action to rivals.
    pub fn broadcasts_actions(self) -> bool {
        matches!(self, Role::GymDefender | Role::RaidBoss)
    }
}

/// A role as written in a creature config. Original-format codes carry extra
/// meaning: anything after `_` is a construction hint (`a_basic`), and an
/// all-uppercase code (`RB`, `GD`) marks the creature immortal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleCode {
    pub role: Role,
    pub immortal: bool,
}

impl From<Role> for RoleCode {
    fn from(role: Role) -> Self {
        RoleCode {
            role,
            immortal: false,
        }
    }
}

impl FromStr for RoleCode {
    type Err = String;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let prefix = code.trim().split('_').next().unwrap_or_default();
        let immortal =
            prefix.chars().any(|c| c.is_ascii_alphabetic()) && prefix == prefix.to_ascii_uppercase();
        let role = match prefix.to_ascii_lowercase().as_str() {
            "" | "a" | "attacker" => Role::Attacker,
            "gd" | "gymdefender" => Role::GymDefender,
            "rb" | "raidboss" => Role::RaidBoss,
            _ => return Err(format!("unknown role: {code}")),
        };
        Ok(RoleCode { role, immortal })
    }
}

impl<'de> Deserialize<'de> for RoleCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(code) => code.parse().map_err(D::Error::custom),
            None => Ok(RoleCode::default()),
        }
    }
}

fn default_weather() -> String {
    crate::types::WEATHER_EXTREME.to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleConfig {
    pub battle_mode: BattleMode,
    #[serde(default, alias = "timelimit", deserialize_with = "lenient")]
    pub time_limit_ms: Option<i64>,
    #[serde(default = "default_weather")]
    pub weather: String,
    #[serde(default)]
    pub has_log: bool,
    #[serde(default)]
    pub aggregation: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub dodge_bug_active: bool,
    pub players: Vec<PlayerConfig>,
    #[serde(flatten, default)]
    pub extras: HashMap<String, Value>,
}

impl BattleConfig {
    pub fn wants_log(&self) -> bool {
        self.has_log || self.aggregation.as_deref() == Some("enum")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerConfig {
    #[serde(deserialize_with = "lenient_string")]
    pub team: String,
    #[serde(default)]
    pub friend: Option<String>,
    /// Explicit friendship multiplier. Takes precedence over `friend`.
    #[serde(default, deserialize_with = "lenient")]
    pub fab: Option<f64>,
    pub parties: Vec<PartyConfig>,
    #[serde(flatten, default)]
    pub extras: HashMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyConfig {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub revive: bool,
    pub pokemon: Vec<PokemonConfig>,
    #[serde(flatten, default)]
    pub extras: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PokemonConfig {
    pub name: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub role: RoleCode,
    #[serde(default)]
    pub immortal: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub copies: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub level: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub atkiv: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub defiv: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub stmiv: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub cp: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub raid_tier: Option<u32>,
    pub fmove: String,
    #[serde(default)]
    pub cmove: Option<String>,
    #[serde(default)]
    pub cmove2: Option<String>,
    #[serde(default)]
    pub cmoves: Vec<String>,
    /// Action policy code.
    #[serde(default)]
    pub strategy: Option<String>,
    /// Shield policy code, e.g. `"1,0"` or `"*"`.
    #[serde(default)]
    pub strategy2: Option<String>,
}

impl PokemonConfig {
    /// Charged move names in priority order, without duplicates.
    pub fn charged_move_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        if !self.cmoves.is_empty() {
            names.extend(self.cmoves.iter().map(String::as_str));
        } else if let Some(cmove) = self.cmove.as_deref() {
            names.push(cmove);
            if let Some(cmove2) = self.cmove2.as_deref() {
                names.push(cmove2);
            }
        }
        let mut unique: Vec<&str> = Vec::with_capacity(names.len());
        for name in names {
            if !name.trim().is_empty() && !unique.iter().any(|n| n.eq_ignore_ascii_case(name)) {
                unique.push(name);
            }
        }
        unique
    }
}

// The original input format ships numbers as strings ("40", "15") and uses "" for absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid number: {trimmed}")))
        }
        Some(other) => serde_json::from_value(other).map(Some).map_err(D::Error::custom),
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Some(Value::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1"),
        _ => false,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("expected string or number, got {other}"))),
    }
}
