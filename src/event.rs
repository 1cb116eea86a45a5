use crate::model::Move;
use crate::pokemon::CombatStats;
use crate::timeline::Timed;
use serde::Serialize;
use std::sync::Arc;

/// Index of a creature in the world's arena. Stable for the world's lifetime.
pub type PokemonId = usize;

#[derive(Debug, Clone)]
pub enum EventKind {
    Free,
    Damage(Arc<Move>),
    MoveEffect,
    Dodge,
    Protect,
    Enter,
    Switch { to: PokemonId },
    Nothing,
    Minigame(Arc<Move>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventName {
    Free,
    Damage,
    MoveEffect,
    Dodge,
    Protect,
    Enter,
    Switch,
    Nothing,
    Minigame,
}

impl EventKind {
    pub fn name(&self) -> EventName {
        match self {
            EventKind::Free => EventName::Free,
            EventKind::Damage(_) => EventName::Damage,
            EventKind::MoveEffect => EventName::MoveEffect,
            EventKind::Dodge => EventName::Dodge,
            EventKind::Protect => EventName::Protect,
            EventKind::Enter => EventName::Enter,
            EventKind::Switch { .. } => EventName::Switch,
            EventKind::Nothing => EventName::Nothing,
            EventKind::Minigame(_) => EventName::Minigame,
        }
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone)]
pub struct Event {
    pub t: i64,
    pub subject: PokemonId,
    pub kind: EventKind,
}

impl Event {
    pub fn new(t: i64, subject: PokemonId, kind: EventKind) -> Self {
        Event { t, subject, kind }
    }
}

impl Timed for Event {
    fn time(&self) -> i64 {
        self.t
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Fast,
    Charged,
    Dodge,
}

/// What a creature will do the next time it is free, and how long it waits first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    pub kind: ActionKind,
    pub delay: i64,
}

impl Action {
    pub fn new(kind: ActionKind, delay: i64) -> Self {
        Action { kind, delay }
    }
}

/// An action a rival was forced to reveal ahead of time.
#[derive(Debug, Clone)]
pub struct BroadcastAction {
    pub t: i64,
    pub action: Action,
    pub attacker: CombatStats,
    pub fmove: Arc<Move>,
    pub cmove: Arc<Move>,
}

impl BroadcastAction {
    pub fn announced_move(&self) -> Option<&Arc<Move>> {
        match self.action.kind {
            ActionKind::Fast => Some(&self.fmove),
            ActionKind::Charged => Some(&self.cmove),
            ActionKind::Dodge => None,
        }
    }
}

impl Timed for BroadcastAction {
    fn time(&self) -> i64 {
        self.t
    }
}
