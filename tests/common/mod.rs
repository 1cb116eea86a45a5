#![allow(dead_code)]

use pogo_battle_sim::data::{GameData, Species};
use pogo_battle_sim::model::{BattleConfig, Move, MoveKind};
use pogo_battle_sim::types::TypeChart;
use serde_json::{json, Value};

pub fn fast_move(name: &str, power: f64, energy: i32, dws: i64, duration: i64) -> Move {
    Move {
        name: name.to_string(),
        move_type: "normal".to_string(),
        power,
        energy_delta: energy,
        damage_window_ms: dws,
        duration_ms: duration,
        kind: MoveKind::Fast,
        effect: None,
    }
}

pub fn charged_move(name: &str, power: f64, cost: i32, dws: i64, duration: i64) -> Move {
    Move {
        name: name.to_string(),
        move_type: "normal".to_string(),
        power,
        energy_delta: -cost,
        damage_window_ms: dws,
        duration_ms: duration,
        kind: MoveKind::Charged,
        effect: None,
    }
}

pub fn species(name: &str, atk: f64, def: f64, stm: f64) -> Species {
    Species {
        name: name.to_string(),
        types: vec!["fire".to_string()],
        base_atk: atk,
        base_def: def,
        base_stm: stm,
    }
}

/// Flat reference data: no type matchups, no weather boosts, and no energy
/// from damage taken, so move timings are easy to follow by hand.
pub fn flat_data() -> GameData {
    let mut data = GameData::new();
    data.type_chart = TypeChart::new();
    data.settings.energy_delta_per_health_lost = 0.0;
    data.add_species(species("Striker", 100.0, 100.0, 300.0))
        .add_species(species("Tank", 100.0, 100.0, 5000.0))
        .add_species(species("Paper", 100.0, 100.0, 10.0))
        .add_species(species("Brute", 300.0, 200.0, 300.0))
        .add_fast_move(fast_move("Jab", 5.0, 10, 500, 1000))
        .add_fast_move(fast_move("Poke", 1.0, 0, 500, 1000))
        .add_fast_move(fast_move("Slam", 26.0, 10, 300, 1000))
        .add_fast_move(fast_move("Crush", 300.0, 10, 500, 1000))
        .add_charged_move(charged_move("Blast", 20.0, 50, 1500, 2000))
        .add_charged_move(charged_move("Nudge", 1.0, 100, 1500, 2000));
    data
}

/// A level 40 creature with zero IVs.
pub fn mon(name: &str, fmove: &str, cmove: &str) -> Value {
    json!({
        "name": name,
        "level": 40,
        "atkiv": 0,
        "defiv": 0,
        "stmiv": 0,
        "fmove": fmove,
        "cmove": cmove,
    })
}

pub fn with(mut base: Value, key: &str, value: Value) -> Value {
    base[key] = value;
    base
}

pub fn raid_boss(name: &str, fmove: &str, cmove: &str) -> Value {
    json!({
        "name": name,
        "role": "rb",
        "raidTier": 5,
        "fmove": fmove,
        "cmove": cmove,
    })
}

pub fn party(revive: bool, pokemon: Vec<Value>) -> Value {
    json!({ "revive": revive, "pokemon": pokemon })
}

pub fn player(team: &str, parties: Vec<Value>) -> Value {
    json!({ "team": team, "parties": parties })
}

pub fn config(mode: &str, time_limit_ms: i64, players: Vec<Value>) -> BattleConfig {
    serde_json::from_value(json!({
        "battleMode": mode,
        "timelimit": time_limit_ms,
        "weather": "EXTREME",
        "hasLog": true,
        "players": players,
    }))
    .expect("battle config should parse")
}
