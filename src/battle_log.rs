use crate::event::{Event, EventKind, EventName};
use serde::Serialize;

/// One replayable line of the battle log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub t: i64,
    pub name: EventName,
    /// Index of the acting player.
    pub player: usize,
    pub value: String,
    pub text: String,
    /// HP of each rival head after a Damage event, indexed by player.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rival_hp: Vec<Option<i32>>,
}

impl LogEntry {
    /// Entry skeleton for a loggable event, or `None` for bookkeeping events
    /// (Free, Minigame, MoveEffect) that never appear in the log.
    pub fn skeleton(event: &Event, player: usize) -> Option<Self> {
        let (value, text) = match &event.kind {
            EventKind::Enter => (event.subject.to_string(), String::new()),
            EventKind::Switch { to } => (to.to_string(), String::new()),
            EventKind::Damage(mv) => (mv.name.clone(), mv.name.clone()),
            EventKind::Dodge => (String::new(), "Dodge".to_string()),
            EventKind::Protect => (String::new(), "Protect Shield".to_string()),
            EventKind::Nothing => (String::new(), "No Shield".to_string()),
            EventKind::Free | EventKind::Minigame(_) | EventKind::MoveEffect => return None,
        };
        Some(LogEntry {
            t: event.t,
            name: event.kind.name(),
            player,
            value,
            text,
            rival_hp: Vec::new(),
        })
    }
}
