use crate::Skill;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChatKind {
    Game,
    Spam,
    Public,
    Other,
}

/// Host notifications folded into the session after each tick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum GameEvent {
    Chat { kind: ChatKind, text: String },
    StatChanged { skill: Skill, real_level: u32 },
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<GameEvent>,
}

impl EventBus {
    pub fn push(&mut self, event: GameEvent) {
        self.queue.push(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = GameEvent>) {
        self.queue.extend(events);
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.queue.drain(..)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Resource {
    Ore,
    Fish,
    Logs,
}

impl Resource {
    pub fn name(self) -> &'static str {
        match self {
            Self::Ore => "Ore",
            Self::Fish => "Fish",
            Self::Logs => "Logs",
        }
    }

    pub fn activity(self) -> &'static str {
        match self {
            Self::Ore => "Mining",
            Self::Fish => "Fishing",
            Self::Logs => "Woodcutting",
        }
    }
}

/// Recognises the game's "you gathered something" messages.
pub fn classify_gather(kind: ChatKind, text: &str) -> Option<Resource> {
    if !matches!(kind, ChatKind::Game | ChatKind::Spam) {
        return None;
    }
    let text = text.to_lowercase();
    if text.contains("manage to mine") || text.contains("get some ore") {
        Some(Resource::Ore)
    } else if text.contains("you catch") {
        Some(Resource::Fish)
    } else if text.contains("get some") && text.contains("log") {
        Some(Resource::Logs)
    } else {
        None
    }
}
