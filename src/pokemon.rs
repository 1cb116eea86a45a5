use crate::data::GameData;
use crate::error::ConfigError;
use crate::event::{Action, BroadcastAction, PokemonId};
use crate::formulas::{
    damage, infer_level_and_ivs, resolve_stats, BaseStats, Combatant, DamageEnv, Ivs,
};
use crate::model::{Move, MoveKind, PokemonConfig, Role};
use crate::strategy::{DecisionContext, Strategy, Subject};
use crate::timeline::Timeline;
use rand::Rng;
use std::sync::Arc;

/// The part of a creature the damage formula reads.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatStats {
    pub atk: f64,
    pub def: f64,
    pub types: Vec<String>,
    pub friend_bonus: f64,
    pub fast_bonus: f64,
    pub charged_bonus: f64,
}

impl Combatant for CombatStats {
    fn attack(&self) -> f64 {
        self.atk
    }

    fn defense(&self) -> f64 {
        self.def
    }

    fn types(&self) -> &[String] {
        &self.types
    }

    fn friend_bonus(&self) -> f64 {
        self.friend_bonus
    }

    fn move_bonus(&self, kind: MoveKind) -> f64 {
        match kind {
            MoveKind::Fast => self.fast_bonus,
            MoveKind::Charged => self.charged_bonus,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pokemon {
    pub id: PokemonId,
    pub player: usize,
    pub party: usize,
    pub name: String,
    pub nickname: String,
    pub role: Role,
    pub immortal: bool,
    pub base: BaseStats,
    pub ivs: Ivs,
    pub level: Option<f64>,
    pub cpm: f64,
    raid_hp: Option<i32>,

    pub stats: CombatStats,
    pub stm: f64,
    pub max_hp: i32,

    pub hp: i32,
    pub energy: i32,
    pub total_energy_overcharged: i32,
    pub active: bool,
    pub damage_reduction_expiration: i64,
    pub damage_reduction_percent: f64,
    pub queued_action: Option<Action>,
    /// Rival actions announced to this creature, read by its own strategy.
    pub projected_rival_actions: Timeline<BroadcastAction>,

    pub fmove: Arc<Move>,
    pub cmove: Arc<Move>,
    pub cmoves: Vec<Arc<Move>>,
    pub strategy: Strategy,

    pub fast_move_lag_ms: i64,
    pub charged_move_lag_ms: i64,
    pub energy_delta_per_health_lost: f64,

    pub time_enter_ms: i64,
    pub active_duration_ms: i64,
    pub deaths: u32,
    pub tdo: i64,
    pub tdo_fast: i64,
    pub num_fast_attacks: u32,
    pub num_charged_attacks: u32,
}

impl Pokemon {
    /// Resolves species, moves, level and strategy. `id`, `player` and `party`
    /// are assigned by the world afterwards.
    pub fn from_config(cfg: &PokemonConfig, data: &GameData) -> Result<Self, ConfigError> {
        let species = data.species(&cfg.name)?;
        let settings = &data.settings;
        let base = BaseStats {
            atk: species.base_atk,
            def: species.base_def,
            stm: species.base_stm,
        };

        let role = cfg.role.role;
        let (level, cpm, ivs, raid_hp) = match role {
            Role::RaidBoss => {
                let tier = cfg.raid_tier.ok_or_else(|| ConfigError::MissingStats {
                    name: cfg.name.clone(),
                    field: "raidTier",
                })?;
                let tier = data.raid_tier(tier)?;
                (None, tier.cpm, Ivs::uniform(15), Some(tier.max_hp))
            }
            Role::Attacker | Role::GymDefender => match (cfg.level, cfg.cp) {
                (None, Some(cp)) => {
                    let found = infer_level_and_ivs(
                        &base,
                        cp,
                        &data.levels,
                        settings.iv_min,
                        settings.iv_max,
                    )
                    .ok_or_else(|| ConfigError::NoLevelForCp {
                        name: cfg.name.clone(),
                        cp,
                    })?;
                    (Some(found.level), found.cpm, found.ivs, None)
                }
                (Some(level), _) => {
                    let missing = |field| ConfigError::MissingStats {
                        name: cfg.name.clone(),
                        field,
                    };
                    let ivs = Ivs {
                        atk: cfg.atkiv.ok_or_else(|| missing("atkiv"))?,
                        def: cfg.defiv.ok_or_else(|| missing("defiv"))?,
                        stm: cfg.stmiv.ok_or_else(|| missing("stmiv"))?,
                    };
                    (Some(level), data.cpm(level)?, ivs, None)
                }
                (None, None) => {
                    return Err(ConfigError::MissingStats {
                        name: cfg.name.clone(),
                        field: "level",
                    })
                }
            },
        };

        let fmove = data.fast_move(&cfg.fmove)?;
        let cmoves = cfg
            .charged_move_names()
            .into_iter()
            .map(|name| data.charged_move(name))
            .collect::<Result<Vec<_>, _>>()?;
        let cmove = cmoves
            .first()
            .cloned()
            .ok_or_else(|| ConfigError::NoChargedMove {
                name: cfg.name.clone(),
            })?;
        let strategy = Strategy::new(cfg.strategy.as_deref(), cfg.strategy2.as_deref(), role)?;
        let (fast_move_lag_ms, charged_move_lag_ms) = match role {
            Role::Attacker => (settings.fast_move_lag_ms, settings.charged_move_lag_ms),
            Role::GymDefender | Role::RaidBoss => (0, 0),
        };

        let mut pokemon = Pokemon {
            id: 0,
            player: 0,
            party: 0,
            name: species.name.clone(),
            nickname: cfg.nickname.clone().unwrap_or_default(),
            role,
            immortal: cfg.immortal || cfg.role.immortal,
            base,
            ivs,
            level,
            cpm,
            raid_hp,
            stats: CombatStats {
                atk: 0.0,
                def: 0.0,
                types: species.types.clone(),
                friend_bonus: 1.0,
                fast_bonus: 1.0,
                charged_bonus: 1.0,
            },
            stm: 0.0,
            max_hp: 0,
            hp: 0,
            energy: 0,
            total_energy_overcharged: 0,
            active: false,
            damage_reduction_expiration: -1,
            damage_reduction_percent: 0.0,
            queued_action: None,
            projected_rival_actions: Timeline::new(),
            fmove,
            cmove,
            cmoves,
            strategy,
            fast_move_lag_ms,
            charged_move_lag_ms,
            energy_delta_per_health_lost: settings.energy_delta_per_health_lost,
            time_enter_ms: 0,
            active_duration_ms: 0,
            deaths: 0,
            tdo: 0,
            tdo_fast: 0,
            num_fast_attacks: 0,
            num_charged_attacks: 0,
        };
        pokemon.calculate_stats();
        pokemon.heal();
        Ok(pokemon)
    }

    /// Recomputes `Atk`, `Def`, `Stm` and max HP for the creature's role.
    pub fn calculate_stats(&mut self) {
        let resolved = resolve_stats(&self.base, self.ivs, self.cpm);
        self.stats.atk = resolved.atk;
        self.stats.def = resolved.def;
        self.stm = resolved.stm;
        self.max_hp = match (self.role, self.raid_hp) {
            (Role::RaidBoss, Some(hp)) => hp,
            (Role::GymDefender, _) => 2 * resolved.stm.floor() as i32,
            _ => resolved.stm.floor() as i32,
        };
    }

    /// Resets battle state and metrics before a new battle.
    pub fn init(&mut self) {
        self.calculate_stats();
        self.active = false;
        self.damage_reduction_expiration = -1;
        self.damage_reduction_percent = 0.0;
        self.projected_rival_actions.clear();
        self.strategy.init();
        self.cmove = self.cmoves[0].clone();

        self.time_enter_ms = 0;
        self.active_duration_ms = 0;
        self.deaths = 0;
        self.tdo = 0;
        self.tdo_fast = 0;
        self.num_fast_attacks = 0;
        self.num_charged_attacks = 0;
        self.total_energy_overcharged = 0;
        self.heal();
    }

    pub fn heal(&mut self) {
        self.hp = self.max_hp;
        self.energy = 0;
        self.queued_action = None;
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0 || self.immortal
    }

    /// Adds (or spends) energy. Anything above `max_energy` is recorded as overcharge.
    pub fn gain_energy(&mut self, delta: i32, max_energy: i32) {
        self.energy += delta;
        if self.energy > max_energy {
            self.total_energy_overcharged += self.energy - max_energy;
            self.energy = max_energy;
        }
        self.energy = self.energy.max(0);
    }

    pub fn take_damage(&mut self, dmg: i32, max_energy: i32) {
        self.hp -= dmg;
        let gained = (dmg as f64 * self.energy_delta_per_health_lost).ceil() as i32;
        self.gain_energy(gained, max_energy);
        if !self.is_alive() {
            self.deaths += 1;
        }
    }

    pub fn attribute_damage(&mut self, dmg: i32, kind: MoveKind) {
        self.tdo += i64::from(dmg);
        if kind == MoveKind::Fast {
            self.tdo_fast += i64::from(dmg);
        }
    }

    /// Picks the charged move with the best `damage / cost²` against `enemy`.
    pub fn best_charged_move(&self, enemy: &CombatStats, env: &DamageEnv<'_>) -> Arc<Move> {
        let mut best = self.cmoves[0].clone();
        let mut best_dpe = 0.0;
        for cmove in &self.cmoves {
            let cost = f64::from(cmove.energy_cost());
            let dpe = f64::from(damage(&self.stats, enemy, cmove.as_ref(), env)) / (cost * cost);
            if dpe > best_dpe {
                best = cmove.clone();
                best_dpe = dpe;
            }
        }
        best
    }

    pub fn decide_action<R: Rng>(&mut self, ctx: &DecisionContext<'_>, rng: &mut R) -> Option<Action> {
        let Pokemon {
            strategy,
            projected_rival_actions,
            stats,
            hp,
            energy,
            fmove,
            cmove,
            fast_move_lag_ms,
            charged_move_lag_ms,
            damage_reduction_expiration,
            ..
        } = self;
        let subject = Subject {
            stats: &*stats,
            hp: *hp,
            energy: *energy,
            fmove: &**fmove,
            cmove: &**cmove,
            fast_lag_ms: *fast_move_lag_ms,
            charged_lag_ms: *charged_move_lag_ms,
            damage_reduction_expiration: *damage_reduction_expiration,
        };
        strategy.decide(&subject, projected_rival_actions, ctx, rng)
    }

    /// Display label: the nickname when one is set.
    pub fn label(&self) -> &str {
        if self.nickname.is_empty() {
            &self.name
        } else {
            &self.nickname
        }
    }
}
