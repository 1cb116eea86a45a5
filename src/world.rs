//! The battle orchestrator: owns every player and creature, the clock and
//! the global event queue, and dispatches events until the battle ends.

use crate::battle_log::LogEntry;
use crate::data::{BattleSettings, GameData};
use crate::error::{ConfigError, InvariantKind, Result, SimError};
use crate::event::{Action, ActionKind, BroadcastAction, Event, EventKind, PokemonId};
use crate::formulas::{damage, DamageEnv};
use crate::model::{BattleConfig, BattleMode, Move, MoveKind, Role};
use crate::party::Party;
use crate::player::{friend_multiplier, Player};
use crate::pokemon::Pokemon;
use crate::stats::{
    per_second, BattleStatistics, GeneralStatistics, PartyStatistics, PlayerStatistics,
    PokemonStatistics,
};
use crate::strategy::DecisionContext;
use crate::timeline::Timeline;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace, warn};

pub const DEFAULT_MAX_EVENTS: usize = 2_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleOptions {
    pub seed: u64,
    /// Hard cap on processed events per battle.
    pub max_events: usize,
}

impl Default for BattleOptions {
    fn default() -> Self {
        BattleOptions {
            seed: 0,
            max_events: DEFAULT_MAX_EVENTS,
        }
    }
}

fn damage_env<'a>(data: &'a GameData, weather: &'a str) -> DamageEnv<'a> {
    DamageEnv {
        chart: &data.type_chart,
        settings: &data.settings,
        weather,
    }
}

pub struct World<'d> {
    data: &'d GameData,
    mode: BattleMode,
    time_limit_ms: Option<i64>,
    weather: String,
    has_log: bool,
    dodge_bug_active: bool,
    options: BattleOptions,

    players: Vec<Player>,
    pokemon: Vec<Pokemon>,

    t: i64,
    battle_start_ms: i64,
    battle_duration_ms: i64,
    minigame_end_ms: i64,
    timeline: Timeline<Event>,
    fainted: Vec<PokemonId>,
    defeated_team: Option<String>,
    /// Last tick at which each player was asked for a shield decision.
    shield_decisions: HashMap<usize, i64>,
    log: Vec<LogEntry>,
    events_processed: usize,
    rng: SmallRng,
}

impl<'d> World<'d> {
    pub fn new(config: &BattleConfig, data: &'d GameData, options: BattleOptions) -> Result<Self> {
        if config.players.is_empty() {
            return Err(ConfigError::NoPlayers.into());
        }
        let settings = &data.settings;
        let time_limit_ms = config.time_limit_ms.filter(|&limit| limit > 0);

        let mut pokemon: Vec<Pokemon> = Vec::new();
        let mut players = Vec::with_capacity(config.players.len());
        for (player_idx, player_cfg) in config.players.iter().enumerate() {
            if player_cfg.parties.is_empty() {
                return Err(ConfigError::NoParties { player: player_idx }.into());
            }
            let friend_bonus = match player_cfg.fab {
                Some(fab) if fab > 0.0 => fab,
                _ => friend_multiplier(player_cfg.friend.as_deref())?,
            };
            let mut parties = Vec::with_capacity(player_cfg.parties.len());
            for (party_idx, party_cfg) in player_cfg.parties.iter().enumerate() {
                let mut members = Vec::new();
                for mon_cfg in &party_cfg.pokemon {
                    let template = Pokemon::from_config(mon_cfg, data)?;
                    for _ in 0..mon_cfg.copies.unwrap_or(1).max(1) {
                        let mut mon = template.clone();
                        mon.id = pokemon.len();
                        mon.player = player_idx;
                        mon.party = party_idx;
                        mon.stats.friend_bonus = friend_bonus;
                        if config.battle_mode == BattleMode::Pvp {
                            mon.stats.fast_bonus = settings.fast_attack_bonus_multiplier;
                            mon.stats.charged_bonus = settings.charged_attack_bonus_multiplier;
                            mon.energy_delta_per_health_lost = 0.0;
                            mon.fast_move_lag_ms = 0;
                            mon.charged_move_lag_ms = 0;
                        }
                        members.push(mon.id);
                        pokemon.push(mon);
                    }
                }
                if members.is_empty() {
                    return Err(ConfigError::EmptyParty {
                        player: player_idx,
                        party: party_idx,
                    }
                    .into());
                }
                // Without a time limit, reviving attackers would never stop.
                let revive = party_cfg.revive && (time_limit_ms.is_some() || player_cfg.team != "0");
                parties.push(Party::new(members, revive));
            }
            players.push(Player::new(player_idx, player_cfg.team.clone(), parties));
        }
        let teams: Vec<String> = players.iter().map(|p| p.team.clone()).collect();
        for player in &mut players {
            player.rivals = teams
                .iter()
                .enumerate()
                .filter(|(_, team)| **team != player.team)
                .map(|(idx, _)| idx)
                .collect();
        }

        let mut world = World {
            data,
            mode: config.battle_mode,
            time_limit_ms,
            weather: config.weather.clone(),
            has_log: config.wants_log(),
            dodge_bug_active: config.dodge_bug_active,
            options,
            players,
            pokemon,
            t: 0,
            battle_start_ms: 0,
            battle_duration_ms: 0,
            minigame_end_ms: 0,
            timeline: Timeline::new(),
            fainted: Vec::new(),
            defeated_team: None,
            shield_decisions: HashMap::new(),
            log: Vec::new(),
            events_processed: 0,
            rng: SmallRng::seed_from_u64(options.seed),
        };
        world.init();
        Ok(world)
    }

    fn settings(&self) -> &'d BattleSettings {
        let data: &'d GameData = self.data;
        &data.settings
    }

    /// Re-arms every entity and the clock for a fresh battle.
    pub fn init(&mut self) {
        let shields = self.settings().protect_shields;
        for player in &mut self.players {
            player.init(shields);
        }
        for mon in &mut self.pokemon {
            mon.init();
        }
        self.t = self.settings().arena_entry_lag_ms;
        self.battle_start_ms = self.t;
        self.battle_duration_ms = 0;
        self.minigame_end_ms = 0;
        self.defeated_team = None;
        self.fainted.clear();
        self.shield_decisions.clear();
        self.log.clear();
        self.events_processed = 0;
        self.rng = SmallRng::seed_from_u64(self.options.seed);
        self.timeline.clear();
        for player in &self.players {
            self.timeline
                .enqueue(Event::new(self.t, player.head(), EventKind::Enter));
        }
    }

    pub fn t(&self) -> i64 {
        self.t
    }

    pub fn mode(&self) -> BattleMode {
        self.mode
    }

    pub fn battle_duration_ms(&self) -> i64 {
        self.battle_duration_ms
    }

    pub fn minigame_end_ms(&self) -> i64 {
        self.minigame_end_ms
    }

    pub fn defeated_team(&self) -> Option<&str> {
        self.defeated_team.as_deref()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn pokemon(&self, id: PokemonId) -> Option<&Pokemon> {
        self.pokemon.get(id)
    }

    pub fn all_pokemon(&self) -> &[Pokemon] {
        &self.pokemon
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn pending_events(&self) -> impl Iterator<Item = &Event> {
        self.timeline.iter()
    }

    pub fn is_team_defeated(&self, team: &str) -> bool {
        self.players
            .iter()
            .filter(|p| p.team == team)
            .all(|p| !self.pokemon[p.head()].is_alive())
    }

    pub fn has_battle_ended(&self) -> bool {
        if self.defeated_team.is_some() {
            return true;
        }
        match self.time_limit_ms {
            Some(limit) => self.t + self.settings().arena_early_termination_ms > limit,
            None => false,
        }
    }

    /// Schedules a switch of `player`'s head to `to` at time `t`.
    pub fn schedule_switch(&mut self, player: usize, to: PokemonId, t: i64) -> Result<()> {
        let invalid = |world: &Self, subject: String| SimError::Invariant {
            t: world.t,
            event: "Switch".to_string(),
            subject,
            kind: InvariantKind::InvalidSwitch(to),
        };
        let Some(owner) = self.players.get(player) else {
            return Err(invalid(self, format!("player {player}")));
        };
        let head = owner.head();
        let target_ok = owner.head_party().contains(to)
            && to != head
            && self.pokemon[to].is_alive()
            && t >= self.t
            && t >= owner.switching_cooldown_expiration;
        if !target_ok {
            return Err(invalid(self, self.pokemon[head].name.clone()));
        }
        self.timeline
            .enqueue(Event::new(t, head, EventKind::Switch { to }));
        Ok(())
    }

    /// Runs the battle to completion.
    pub fn battle(&mut self) -> Result<()> {
        while self.step()? {}
        self.finish();
        debug!(
            t = self.t,
            duration_ms = self.battle_duration_ms,
            events = self.events_processed,
            defeated = ?self.defeated_team,
            "battle finished"
        );
        Ok(())
    }

    /// Processes one event. Returns false once the battle is over.
    pub fn step(&mut self) -> Result<bool> {
        if self.has_battle_ended() {
            return Ok(false);
        }
        if self.events_processed >= self.options.max_events {
            return Err(SimError::EventCapExceeded {
                limit: self.options.max_events,
                t: self.t,
            });
        }
        let Some(event) = self.timeline.dequeue() else {
            warn!(t = self.t, "event queue exhausted before the battle was decided");
            return Ok(false);
        };
        self.events_processed += 1;
        self.t = event.t;
        trace!(t = self.t, event = %event.kind.name(), subject = event.subject, "dispatch");

        let applied = self.dispatch(&event)?;
        if applied && self.has_log {
            self.write_log(&event);
        }
        self.process_fainted();
        Ok(true)
    }

    fn finish(&mut self) {
        self.battle_duration_ms += self.t - self.battle_start_ms;
        for player in &self.players {
            let mon = &mut self.pokemon[player.head()];
            if mon.active {
                mon.active_duration_ms += self.t - mon.time_enter_ms;
            }
        }
    }

    fn invariant(&self, event: &Event, kind: InvariantKind) -> SimError {
        SimError::Invariant {
            t: self.t,
            event: event.kind.name().to_string(),
            subject: self
                .pokemon
                .get(event.subject)
                .map(|p| format!("{} (#{})", p.name, p.id))
                .unwrap_or_else(|| format!("#{}", event.subject)),
            kind,
        }
    }

    /// Returns whether the event took effect.
    fn dispatch(&mut self, event: &Event) -> Result<bool> {
        if event.subject >= self.pokemon.len() {
            return Err(self.invariant(event, InvariantKind::UnknownPokemon(event.subject)));
        }
        match &event.kind {
            EventKind::Free => self.handle_free(event).map(|_| true),
            EventKind::Damage(mv) => Ok(self.handle_damage(event.subject, mv)),
            EventKind::Dodge => {
                self.handle_dodge(event.subject);
                Ok(true)
            }
            EventKind::Protect => self.handle_protect(event).map(|_| true),
            EventKind::Enter => self.handle_enter(event).map(|_| true),
            EventKind::Switch { to } => self.handle_switch(event, *to),
            EventKind::Minigame(_) => Ok(self.handle_minigame(event)),
            EventKind::MoveEffect | EventKind::Nothing => Ok(true),
        }
    }

    fn register_fast(&mut self, id: PokemonId, action: Action) -> i64 {
        let mon = &self.pokemon[id];
        let t_action = self.t + action.delay + mon.fast_move_lag_ms;
        let fmove = mon.fmove.clone();
        let t_free = t_action + fmove.duration_ms;
        self.timeline.enqueue(Event::new(
            t_action + fmove.damage_window_ms,
            id,
            EventKind::Damage(fmove),
        ));
        t_free
    }

    fn register_charged(&mut self, event: &Event, id: PokemonId, action: Action) -> Result<i64> {
        let mon = &self.pokemon[id];
        let t_action = self.t + action.delay + mon.charged_move_lag_ms;
        let cmove = mon.cmove.clone();
        if mon.energy + cmove.energy_delta < 0 {
            return Err(self.invariant(
                event,
                InvariantKind::InsufficientEnergy {
                    energy: mon.energy,
                    cost: cmove.energy_cost(),
                },
            ));
        }
        if self.mode == BattleMode::Pvp {
            self.timeline
                .enqueue(Event::new(t_action, id, EventKind::Minigame(cmove)));
            Ok(t_action + self.settings().minigame_duration_ms)
        } else {
            let t_free = t_action + cmove.duration_ms;
            self.timeline.enqueue(Event::new(
                t_action + cmove.damage_window_ms,
                id,
                EventKind::Damage(cmove),
            ));
            Ok(t_free)
        }
    }

    fn register_dodge(&mut self, id: PokemonId, action: Action) -> i64 {
        let t_action = self.t + action.delay;
        self.timeline
            .enqueue(Event::new(t_action, id, EventKind::Dodge));
        t_action + self.settings().dodge_duration_ms
    }

    fn handle_free(&mut self, event: &Event) -> Result<()> {
        let id = event.subject;
        if !self.pokemon[id].active {
            return Ok(());
        }
        let current = self.pokemon[id].queued_action.take();
        let mut t_free = self.t;
        if let Some(action) = current {
            t_free = match action.kind {
                ActionKind::Fast => self.register_fast(id, action),
                ActionKind::Charged => self.register_charged(event, id, action)?,
                ActionKind::Dodge => self.register_dodge(id, action),
            };
            if self.pokemon[id].role.broadcasts_actions() {
                self.broadcast(id, action);
            }
        }

        let player = self.pokemon[id].player;
        let rival_energy = self.players[player]
            .rivals
            .first()
            .map(|&rival| self.pokemon[self.players[rival].head()].energy);
        let ctx = DecisionContext {
            t: self.t,
            t_free,
            current_action: current.map(|a| a.kind),
            dodge_bug_active: self.dodge_bug_active,
            rival_energy,
            env: damage_env(self.data, &self.weather),
        };
        let decision = self.pokemon[id].decide_action(&ctx, &mut self.rng);
        self.pokemon[id].queued_action = decision;
        self.timeline.enqueue(Event::new(t_free, id, EventKind::Free));
        Ok(())
    }

    /// Announces `action` to every active rival head so dodgers can react.
    fn broadcast(&mut self, id: PokemonId, action: Action) {
        let mon = &self.pokemon[id];
        let announced = BroadcastAction {
            t: self.t + action.delay,
            action,
            attacker: mon.stats.clone(),
            fmove: mon.fmove.clone(),
            cmove: mon.cmove.clone(),
        };
        let targets: Vec<PokemonId> = self.players[mon.player]
            .rivals
            .iter()
            .map(|&rival| self.players[rival].head())
            .filter(|&target| self.pokemon[target].active)
            .collect();
        for target in targets {
            self.pokemon[target]
                .projected_rival_actions
                .enqueue(announced.clone());
        }
    }

    fn handle_damage(&mut self, id: PokemonId, mv: &Arc<Move>) -> bool {
        if !self.pokemon[id].active {
            return false;
        }
        let settings = self.settings();
        let max_energy = settings.maximum_energy;
        {
            let attacker = &mut self.pokemon[id];
            attacker.gain_energy(mv.energy_delta, max_energy);
            attacker.strategy.record_attack();
            match mv.kind {
                MoveKind::Fast => attacker.num_fast_attacks += 1,
                MoveKind::Charged => attacker.num_charged_attacks += 1,
            }
        }
        let player = self.pokemon[id].player;
        let env = damage_env(self.data, &self.weather);
        for rival in self.players[player].rivals.clone() {
            let target = self.players[rival].head();
            if !self.pokemon[target].active {
                continue;
            }
            let mut dmg = damage(&self.pokemon[id].stats, &self.pokemon[target].stats, mv.as_ref(), &env);
            let defender = &self.pokemon[target];
            if self.t < defender.damage_reduction_expiration {
                let reduced = (dmg as f64 * (1.0 - defender.damage_reduction_percent)).floor();
                dmg = (reduced as i32).max(1);
            }
            self.pokemon[id].attribute_damage(dmg, mv.kind);
            let defender = &mut self.pokemon[target];
            defender.take_damage(dmg, max_energy);
            if !defender.is_alive() {
                defender.active = false;
                self.fainted.push(target);
                debug!(t = self.t, target = %defender.name, by = %mv.name, "fainted");
            }
        }
        true
    }

    fn handle_dodge(&mut self, id: PokemonId) {
        let settings = self.settings();
        let mon = &mut self.pokemon[id];
        mon.damage_reduction_expiration = self.t + settings.dodge_window_ms;
        mon.damage_reduction_percent = settings.dodge_damage_reduction_percent;
    }

    fn handle_protect(&mut self, event: &Event) -> Result<()> {
        let player = self.pokemon[event.subject].player;
        if self.players[player].protect_shields_left == 0 {
            return Err(self.invariant(event, InvariantKind::NoShieldLeft));
        }
        let settings = self.settings();
        let mon = &mut self.pokemon[event.subject];
        mon.damage_reduction_expiration = self.t + settings.minigame_duration_ms;
        mon.damage_reduction_percent = settings.protect_shield_damage_reduction_percent;
        self.players[player].protect_shields_left -= 1;
        Ok(())
    }

    /// Resolves a PvP charged move. Simultaneous minigames are serialized,
    /// pending Free events wait for the last of them, and each rival decides
    /// on a shield once per tick.
    fn handle_minigame(&mut self, event: &Event) -> bool {
        let id = event.subject;
        if !self.pokemon[id].active {
            return false;
        }
        let duration = self.settings().minigame_duration_ms;
        let pending = self.timeline.len();
        let mut shift = vec![0i64; pending];
        let mut deferred = vec![false; pending];
        let mut concurrent = 1i64;
        let mut interrupt_at = None;
        for (idx, other) in self.timeline.iter().enumerate() {
            match &other.kind {
                EventKind::Minigame(_) if other.t == self.t => {
                    shift[idx] = concurrent * duration;
                    concurrent += 1;
                }
                EventKind::Free => deferred[idx] = true,
                // Wait until the rival side has someone on the field.
                EventKind::Enter | EventKind::Switch { .. } => {
                    interrupt_at = Some(other.t);
                    break;
                }
                // A same-tick fast hit might knock the subject out first.
                EventKind::Damage(mv) if other.t == self.t && mv.is_fast() => {
                    interrupt_at = Some(self.t);
                    break;
                }
                _ => {}
            }
        }

        if let Some(at) = interrupt_at {
            self.timeline.retime(|idx, e| e.t += shift[idx]);
            let mut again = event.clone();
            again.t = at;
            self.timeline.enqueue(again);
            return false;
        }

        self.minigame_end_ms = self.t + concurrent * duration;
        let end = self.minigame_end_ms;
        self.timeline.retime(|idx, e| {
            e.t += shift[idx];
            if deferred[idx] {
                e.t = e.t.max(end);
            }
        });

        let player = self.pokemon[id].player;
        for rival in self.players[player].rivals.clone() {
            if self.shield_decisions.get(&rival) == Some(&self.t) {
                continue;
            }
            self.shield_decisions.insert(rival, self.t);
            let enemy = self.players[rival].head();
            let shield = self.players[rival].protect_shields_left > 0
                && self.pokemon[enemy].strategy.shield_decision();
            let kind = if shield {
                EventKind::Protect
            } else {
                EventKind::Nothing
            };
            self.timeline.enqueue(Event::new(self.t, enemy, kind));
        }

        let cmove = self.pokemon[id].cmove.clone();
        let lands_at = self.t + (duration as f64 / 2.0).round() as i64;
        self.timeline
            .enqueue(Event::new(lands_at, id, EventKind::Damage(cmove)));
        true
    }

    fn choose_default_charged_move(&mut self, id: PokemonId, enemy: PokemonId) {
        let env = damage_env(self.data, &self.weather);
        let best = self.pokemon[id].best_charged_move(&self.pokemon[enemy].stats, &env);
        self.pokemon[id].cmove = best;
    }

    fn handle_enter(&mut self, event: &Event) -> Result<()> {
        let id = event.subject;
        let player = self.pokemon[id].player;
        let previous = self.players[player].head();
        self.pokemon[previous].active = false;
        if !self.players[player].set_head(id) {
            return Err(self.invariant(event, InvariantKind::UnknownPokemon(id)));
        }
        let mon = &mut self.pokemon[id];
        mon.time_enter_ms = self.t;
        mon.active = true;
        mon.queued_action = None;
        self.timeline.enqueue(Event::new(self.t, id, EventKind::Free));
        for rival in self.players[player].rivals.clone() {
            let enemy = self.players[rival].head();
            self.choose_default_charged_move(id, enemy);
            self.choose_default_charged_move(enemy, id);
        }
        Ok(())
    }

    /// A switch validated when scheduled can go stale: the leaving creature
    /// may have fainted and been replaced. Stale switches are dropped.
    fn handle_switch(&mut self, event: &Event, to: PokemonId) -> Result<bool> {
        let id = event.subject;
        if to >= self.pokemon.len() {
            return Err(self.invariant(event, InvariantKind::InvalidSwitch(to)));
        }
        let player = self.pokemon[id].player;
        let head = self.players[player].head();
        if id != head || !self.pokemon[id].active || to == head || !self.pokemon[to].is_alive() {
            debug!(t = self.t, from = id, to, head, "stale switch dropped");
            return Ok(false);
        }
        if !self.players[player].set_head(to) {
            return Err(self.invariant(event, InvariantKind::InvalidSwitch(to)));
        }
        let leaving = &mut self.pokemon[id];
        if leaving.active {
            leaving.active_duration_ms += self.t - leaving.time_enter_ms;
        }
        leaving.active = false;
        let entering = &mut self.pokemon[to];
        entering.time_enter_ms = self.t;
        entering.active = true;
        entering.queued_action = None;
        self.timeline.enqueue(Event::new(self.t, to, EventKind::Free));
        for rival in self.players[player].rivals.clone() {
            let enemy = self.players[rival].head();
            self.choose_default_charged_move(enemy, to);
        }
        self.players[player].switching_cooldown_expiration =
            self.t + self.settings().switching_cooldown_duration_ms;
        Ok(true)
    }

    /// Restarts the clock at 0 after a gym defender faints, keeping every
    /// clock-anchored value consistent with the shifted timeline.
    fn relobby_clock(&mut self) {
        let shift = self.t;
        let elapsed = self.t - self.battle_start_ms;
        self.timeline.retime(|_, e| e.t -= shift);
        for mon in &mut self.pokemon {
            mon.time_enter_ms -= shift;
            if mon.damage_reduction_expiration >= 0 {
                mon.damage_reduction_expiration -= shift;
            }
            mon.projected_rival_actions.retime(|_, a| a.t -= shift);
        }
        for player in &mut self.players {
            if player.switching_cooldown_expiration >= 0 {
                player.switching_cooldown_expiration -= shift;
            }
        }
        for tick in self.shield_decisions.values_mut() {
            *tick -= shift;
        }
        self.minigame_end_ms = (self.minigame_end_ms - shift).max(0);
        self.battle_duration_ms += elapsed;
        self.t = 0;
        self.battle_start_ms = 0;
        debug!(elapsed_ms = elapsed, "gym defender fainted, clock reset");
    }

    fn process_fainted(&mut self) {
        let settings = self.settings();
        for id in std::mem::take(&mut self.fainted) {
            let player = self.pokemon[id].player;
            let mon = &mut self.pokemon[id];
            mon.active_duration_ms += self.t - mon.time_enter_ms;
            if mon.role == Role::GymDefender {
                self.relobby_clock();
            }

            let owner = &mut self.players[player];
            if owner.head_party_mut().set_head_to_next(&self.pokemon) {
                let at = (self.t + settings.swap_duration_ms).max(self.minigame_end_ms);
                self.timeline
                    .enqueue(Event::new(at, owner.head(), EventKind::Enter));
            } else if owner.head_party().revive {
                let party = owner.head_party_mut();
                party.heal(&mut self.pokemon);
                let at = self.t
                    + settings.rejoin_duration_ms
                    + settings.item_menu_animation_time_ms
                    + party.members.len() as i64 * settings.max_revive_time_per_pokemon_ms;
                self.timeline
                    .enqueue(Event::new(at, party.head(), EventKind::Enter));
            } else if owner.set_head_party_to_next() {
                let at = self.t + settings.rejoin_duration_ms;
                self.timeline
                    .enqueue(Event::new(at, owner.head(), EventKind::Enter));
            } else {
                let team = owner.team.clone();
                if self.is_team_defeated(&team) {
                    debug!(t = self.t, team = %team, "team defeated");
                    self.defeated_team = Some(team);
                }
            }
        }
    }

    fn write_log(&mut self, event: &Event) {
        let subject = &self.pokemon[event.subject];
        let Some(mut entry) = LogEntry::skeleton(event, subject.player) else {
            return;
        };
        match &event.kind {
            EventKind::Enter => entry.text = subject.label().to_string(),
            EventKind::Switch { to } => {
                entry.text = self
                    .pokemon
                    .get(*to)
                    .map(|p| p.label().to_string())
                    .unwrap_or_default();
            }
            EventKind::Damage(_) => {
                let mut rival_hp = vec![None; self.players.len()];
                for &rival in &self.players[subject.player].rivals {
                    rival_hp[rival] = Some(self.pokemon[self.players[rival].head()].hp);
                }
                entry.rival_hp = rival_hp;
            }
            _ => {}
        }
        self.log.push(entry);
    }

    pub fn statistics(&self) -> BattleStatistics {
        let duration = self.battle_duration_ms as f64 / 1000.0;
        let mut sum_tdo = 0i64;
        let mut sum_max_hp = 0i64;
        let mut deaths = 0u32;
        let mut player_stats = Vec::with_capacity(self.players.len());
        let mut party_stats = Vec::with_capacity(self.players.len());
        let mut pokemon_stats = Vec::with_capacity(self.players.len());
        for player in &self.players {
            let tdo = player.tdo(&self.pokemon);
            let player_deaths = player.deaths(&self.pokemon);
            if player.team == "0" {
                sum_tdo += tdo;
                deaths += player_deaths;
            } else {
                sum_max_hp += player
                    .members()
                    .map(|id| i64::from(self.pokemon[id].max_hp))
                    .sum::<i64>();
            }
            player_stats.push(PlayerStatistics {
                name: format!("Player {}", player.index + 1),
                tdo,
                dps: per_second(tdo as f64, duration),
                num_of_deaths: player_deaths,
            });
            party_stats.push(
                player
                    .parties
                    .iter()
                    .map(|party| PartyStatistics {
                        tdo: party.tdo(&self.pokemon),
                        num_of_deaths: party.deaths(&self.pokemon),
                    })
                    .collect(),
            );
            pokemon_stats.push(
                player
                    .parties
                    .iter()
                    .map(|party| {
                        party
                            .members
                            .iter()
                            .map(|&id| PokemonStatistics::from(&self.pokemon[id]))
                            .collect()
                    })
                    .collect(),
            );
        }
        let tdo_percent = if sum_max_hp > 0 {
            sum_tdo as f64 / sum_max_hp as f64 * 100.0
        } else {
            0.0
        };
        BattleStatistics {
            general_stat: GeneralStatistics {
                duration,
                battle_result: u8::from(self.is_team_defeated("1")),
                tdo: sum_tdo,
                tdo_percent,
                dps: per_second(sum_tdo as f64, duration),
                num_of_deaths: deaths,
            },
            player_stats,
            party_stats,
            pokemon_stats,
            battle_log: self.log.clone(),
        }
    }
}
