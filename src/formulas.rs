//! Stat and damage formulas. Everything here is a pure function.

use crate::data::{BattleSettings, LevelTable};
use crate::model::{Move, MoveKind};
use crate::types::TypeChart;

/// Anything that can deal or receive damage.
pub trait Combatant {
    fn attack(&self) -> f64;
    fn defense(&self) -> f64;
    fn types(&self) -> &[String];

    fn friend_bonus(&self) -> f64 {
        1.0
    }

    fn move_bonus(&self, _kind: MoveKind) -> f64 {
        1.0
    }
}

/// Battle-wide inputs to the damage formula.
#[derive(Clone, Copy)]
pub struct DamageEnv<'a> {
    pub chart: &'a TypeChart,
    pub settings: &'a BattleSettings,
    pub weather: &'a str,
}

/// `floor(0.5 * Atk/Def * power * multipliers) + 1`, never below 1.
pub fn damage<A, D>(attacker: &A, defender: &D, mv: &Move, env: &DamageEnv<'_>) -> i32
where
    A: Combatant + ?Sized,
    D: Combatant + ?Sized,
{
    let mut effectiveness = 1.0;
    for defending in defender.types() {
        effectiveness *= env.chart.effectiveness(&mv.move_type, defending);
    }
    let stab = if attacker
        .types()
        .iter()
        .any(|t| t.eq_ignore_ascii_case(&mv.move_type))
    {
        env.settings.same_type_attack_bonus_multiplier
    } else {
        1.0
    };
    let wab = if env.chart.is_boosted(&mv.move_type, env.weather) {
        env.settings.weather_attack_bonus_multiplier
    } else {
        1.0
    };
    let raw = 0.5 * attacker.attack() / defender.defense()
        * mv.power
        * effectiveness
        * stab
        * wab
        * attacker.friend_bonus()
        * attacker.move_bonus(mv.kind);
    // NaN and negative inputs fall through to the floor of 1.
    (raw.floor() + 1.0).max(1.0) as i32
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseStats {
    pub atk: f64,
    pub def: f64,
    pub stm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ivs {
    pub atk: u32,
    pub def: u32,
    pub stm: u32,
}

impl Ivs {
    pub fn uniform(value: u32) -> Self {
        Ivs {
            atk: value,
            def: value,
            stm: value,
        }
    }
}

/// Resolved stats: `(base + iv) * cpm`.
pub fn resolve_stats(base: &BaseStats, ivs: Ivs, cpm: f64) -> BaseStats {
    BaseStats {
        atk: (base.atk + ivs.atk as f64) * cpm,
        def: (base.def + ivs.def as f64) * cpm,
        stm: (base.stm + ivs.stm as f64) * cpm,
    }
}

pub fn calculate_cp(atk: f64, def: f64, stm: f64) -> u32 {
    (atk * (def * stm).sqrt() / 10.0).floor().max(10.0) as u32
}

pub fn cp_from_base(base: &BaseStats, ivs: Ivs, cpm: f64) -> u32 {
    let stats = resolve_stats(base, ivs, cpm);
    calculate_cp(stats.atk, stats.def, stats.stm)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inferred {
    pub level: f64,
    pub cpm: f64,
    pub ivs: Ivs,
}

/// Finds a level and IV combination producing exactly `target_cp`.
///
/// The search starts at the highest level whose max-IV CP does not exceed
/// the target and walks upward. Within a level IVs are scanned atk, then
/// def, then stm, each ascending. The first exact match wins, so ties go to
/// the lowest level, then the lowest attack IV, defense IV, stamina IV.
pub fn infer_level_and_ivs(
    base: &BaseStats,
    target_cp: u32,
    levels: &LevelTable,
    iv_min: u32,
    iv_max: u32,
) -> Option<Inferred> {
    let entries = levels.entries();
    let max_ivs = Ivs::uniform(iv_max);
    let start = entries
        .iter()
        .take_while(|entry| cp_from_base(base, max_ivs, entry.cpm) <= target_cp)
        .count()
        .checked_sub(1)?;

    for entry in &entries[start..] {
        for atk in iv_min..=iv_max {
            for def in iv_min..=iv_max {
                for stm in iv_min..=iv_max {
                    let ivs = Ivs { atk, def, stm };
                    if cp_from_base(base, ivs, entry.cpm) == target_cp {
                        return Some(Inferred {
                            level: entry.value,
                            cpm: entry.cpm,
                            ivs,
                        });
                    }
                }
            }
        }
    }
    None
}
