//! Action and shield policies bound to a single creature.

use crate::error::ConfigError;
use crate::event::{Action, ActionKind, BroadcastAction};
use crate::formulas::{damage, DamageEnv};
use crate::model::{Move, Role};
use crate::pokemon::CombatStats;
use crate::timeline::Timeline;
use phf::phf_map;
use rand::Rng;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StrategyCode {
    Defender,
    NoDodge,
    DodgeCharged,
    DodgeAll,
    Combo,
}

static ACTION_CODES: phf::Map<&'static str, StrategyCode> = phf_map! {
    "strat0" => StrategyCode::Defender,
    "DEFENDER" => StrategyCode::Defender,
    "strat1" => StrategyCode::NoDodge,
    "ATTACKER_NO_DODGE" => StrategyCode::NoDodge,
    "strat2" => StrategyCode::DodgeCharged,
    "ATTACKER_DODGE_CHARGED" => StrategyCode::DodgeCharged,
    "strat3" => StrategyCode::DodgeAll,
    "ATTACKER_DODGE_ALL" => StrategyCode::DodgeAll,
    "strat4" => StrategyCode::Combo,
    "ATTACKER_COMBO" => StrategyCode::Combo,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPolicy {
    /// Scripted NPC cadence with jittered delays.
    Defender,
    /// Fire a charged move as soon as energy allows.
    NoDodge,
    /// Dodge predicted incoming attacks of the listed kinds.
    Dodge { dodge_fast: bool },
}

/// Charged-move burst state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Burst {
    Never,
    /// Holding energy until a burst is worthwhile.
    Charging,
    /// Releasing charged moves back to back.
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tank {
    Count(u32),
    Never,
}

/// Parses a shield code such as `"1,0"` or `"*"` into at most two entries.
pub fn parse_shield_code(code: &str) -> VecDeque<Tank> {
    let mut parts: Vec<&str> = code.split(',').take(2).collect();
    if parts.len() < 2 {
        parts.push("0");
    }
    parts
        .into_iter()
        .map(|part| {
            let part = part.trim();
            let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
            match digits.parse::<u32>() {
                Ok(n) => Tank::Count(n),
                Err(_) if part == "*" => Tank::Never,
                Err(_) => Tank::Count(0),
            }
        })
        .collect()
}

/// What the bound creature currently looks like to its policy.
pub struct Subject<'a> {
    pub stats: &'a CombatStats,
    pub hp: i32,
    pub energy: i32,
    pub fmove: &'a Move,
    pub cmove: &'a Move,
    pub fast_lag_ms: i64,
    pub charged_lag_ms: i64,
    pub damage_reduction_expiration: i64,
}

pub struct DecisionContext<'a> {
    pub t: i64,
    /// When the subject finishes the action it just registered.
    pub t_free: i64,
    pub current_action: Option<ActionKind>,
    pub dodge_bug_active: bool,
    /// Energy of the first rival's head, if any.
    pub rival_energy: Option<i32>,
    pub env: DamageEnv<'a>,
}

#[derive(Debug, Clone)]
pub struct Strategy {
    policy: ActionPolicy,
    initial_burst: Burst,
    burst: Burst,
    shield_code: String,
    attacks_to_tank: VecDeque<Tank>,
    attack_count: u32,
}

impl Strategy {
    /// Resolves the configured codes. An absent or empty action code picks the
    /// role's default: the scripted defender for gym defenders and raid bosses,
    /// no-dodge for attackers.
    pub fn new(
        action_code: Option<&str>,
        shield_code: Option<&str>,
        role: Role,
    ) -> Result<Self, ConfigError> {
        let code = match action_code.map(str::trim).filter(|c| !c.is_empty()) {
            Some(raw) => *ACTION_CODES
                .get(raw)
                .or_else(|| ACTION_CODES.get(raw.to_ascii_uppercase().as_str()))
                .or_else(|| ACTION_CODES.get(raw.to_ascii_lowercase().as_str()))
                .ok_or_else(|| ConfigError::UnknownStrategy(raw.to_string()))?,
            None if role.broadcasts_actions() => StrategyCode::Defender,
            None => StrategyCode::NoDodge,
        };
        let (policy, initial_burst) = match code {
            StrategyCode::Defender => (ActionPolicy::Defender, Burst::Never),
            StrategyCode::NoDodge => (ActionPolicy::NoDodge, Burst::Never),
            StrategyCode::DodgeCharged => (ActionPolicy::Dodge { dodge_fast: false }, Burst::Never),
            StrategyCode::DodgeAll => (ActionPolicy::Dodge { dodge_fast: true }, Burst::Never),
            StrategyCode::Combo => (ActionPolicy::NoDodge, Burst::Charging),
        };
        let shield_code = shield_code.unwrap_or_default().to_string();
        Ok(Strategy {
            policy,
            initial_burst,
            burst: initial_burst,
            attacks_to_tank: parse_shield_code(&shield_code),
            shield_code,
            attack_count: 0,
        })
    }

    pub fn policy(&self) -> ActionPolicy {
        self.policy
    }

    pub fn burst(&self) -> Burst {
        self.burst
    }

    /// Re-arms per-battle state.
    pub fn init(&mut self) {
        self.attack_count = 0;
        self.burst = self.initial_burst;
        self.attacks_to_tank = parse_shield_code(&self.shield_code);
    }

    pub fn record_attack(&mut self) {
        self.attack_count += 1;
    }

    pub fn decide<R: Rng>(
        &mut self,
        me: &Subject<'_>,
        rival_actions: &mut Timeline<BroadcastAction>,
        ctx: &DecisionContext<'_>,
        rng: &mut R,
    ) -> Option<Action> {
        match self.policy {
            ActionPolicy::Defender => Some(self.defender(me, ctx, rng)),
            ActionPolicy::NoDodge => Some(self.no_dodge(me, ctx)),
            ActionPolicy::Dodge { dodge_fast } => self.dodge(me, rival_actions, ctx, dodge_fast),
        }
    }

    /// Consumes one pending tank count. Returns true when the shield should go up.
    pub fn shield_decision(&mut self) -> bool {
        match self.attacks_to_tank.front_mut() {
            None | Some(Tank::Never) => false,
            Some(Tank::Count(0)) => {
                self.attacks_to_tank.pop_front();
                true
            }
            Some(Tank::Count(n)) => {
                *n -= 1;
                false
            }
        }
    }

    fn projected_energy(me: &Subject<'_>, current: Option<ActionKind>) -> i32 {
        me.energy
            + match current {
                Some(ActionKind::Fast) => me.fmove.energy_delta,
                Some(ActionKind::Charged) => me.cmove.energy_delta,
                Some(ActionKind::Dodge) | None => 0,
            }
    }

    fn defender<R: Rng>(
        &mut self,
        me: &Subject<'_>,
        ctx: &DecisionContext<'_>,
        rng: &mut R,
    ) -> Action {
        let settings = ctx.env.settings;
        let actual_count = self.attack_count + u32::from(ctx.current_action.is_some());
        if actual_count >= 2 {
            let projected = Self::projected_energy(me, ctx.current_action);
            let kind = if projected + me.cmove.energy_delta >= 0 && rng.gen_bool(0.5) {
                ActionKind::Charged
            } else {
                ActionKind::Fast
            };
            let jitter = rng.gen_range(0..=settings.defender_delay_jitter_ms.max(0));
            Action::new(kind, settings.defender_delay_min_ms + jitter)
        } else if actual_count == 1 {
            Action::new(ActionKind::Fast, (1000 - me.fmove.duration_ms).max(0))
        } else {
            Action::new(ActionKind::Fast, 500)
        }
    }

    fn no_dodge(&mut self, me: &Subject<'_>, ctx: &DecisionContext<'_>) -> Action {
        let projected = Self::projected_energy(me, ctx.current_action);
        let max_energy = ctx.env.settings.maximum_energy;
        if projected + me.cmove.energy_delta >= 0
            && self.burst_allows(projected, me.cmove.energy_delta, ctx.rival_energy, max_energy)
        {
            Action::new(ActionKind::Charged, 0)
        } else {
            Action::new(ActionKind::Fast, 0)
        }
    }

    fn burst_allows(
        &mut self,
        projected: i32,
        cmove_delta: i32,
        rival_energy: Option<i32>,
        max_energy: i32,
    ) -> bool {
        match self.burst {
            Burst::Never => true,
            Burst::Active => {
                if projected + 2 * cmove_delta < 0 {
                    self.burst = Burst::Charging;
                }
                true
            }
            Burst::Charging => {
                if projected >= max_energy || rival_energy.is_some_and(|e| e >= max_energy) {
                    self.burst = Burst::Active;
                    true
                } else {
                    false
                }
            }
        }
    }

    fn dodge(
        &mut self,
        me: &Subject<'_>,
        rival_actions: &mut Timeline<BroadcastAction>,
        ctx: &DecisionContext<'_>,
        dodge_fast: bool,
    ) -> Option<Action> {
        if ctx.t < ctx.t_free {
            return None;
        }
        let dodgeable = |kind: ActionKind| match kind {
            ActionKind::Charged => true,
            ActionKind::Fast => dodge_fast,
            ActionKind::Dodge => false,
        };
        let incoming = std::iter::from_fn(|| rival_actions.dequeue())
            .find(|predicted| dodgeable(predicted.action.kind));
        let Some(incoming) = incoming else {
            return Some(self.no_dodge(me, ctx));
        };
        let Some(threat) = incoming.announced_move().cloned() else {
            return Some(self.no_dodge(me, ctx));
        };

        let hurt_at = incoming.t + threat.damage_window_ms;
        if me.damage_reduction_expiration >= hurt_at {
            return Some(self.no_dodge(me, ctx));
        }
        let settings = ctx.env.settings;
        let full = damage(&incoming.attacker, me.stats, &threat, &ctx.env);
        let dodged = if ctx.dodge_bug_active {
            full
        } else {
            ((full as f64 * (1.0 - settings.dodge_damage_reduction_percent)).floor() as i32).max(1)
        };
        if dodged >= me.hp {
            return Some(self.no_dodge(me, ctx));
        }

        let until_hurt = hurt_at - ctx.t_free;
        if me.energy + me.cmove.energy_delta >= 0
            && until_hurt > me.cmove.duration_ms + me.charged_lag_ms
        {
            rival_actions.enqueue(incoming);
            Some(Action::new(ActionKind::Charged, 0))
        } else if until_hurt > me.fmove.duration_ms + me.fast_lag_ms {
            rival_actions.enqueue(incoming);
            Some(Action::new(ActionKind::Fast, 0))
        } else if until_hurt >= 0 {
            Some(Action::new(
                ActionKind::Dodge,
                (until_hurt - settings.dodge_window_ms + 1).max(0),
            ))
        } else {
            Some(self.no_dodge(me, ctx))
        }
    }
}
