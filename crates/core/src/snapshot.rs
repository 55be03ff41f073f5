use crate::{Canvas, Rect, Skill, WorldPoint};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const NO_ANIMATION: i32 = -1;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Gauge {
    pub current: i32,
    pub max: i32,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkillLevel {
    pub real: u32,
    pub boosted: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerState {
    pub position: WorldPoint,
    #[serde(default)]
    pub health: Gauge,
    #[serde(default)]
    pub prayer: Gauge,
    #[serde(default = "default_animation")]
    pub animation_id: i32,
    #[serde(default)]
    pub interacting: bool,
}

fn default_animation() -> i32 {
    NO_ANIMATION
}

impl PlayerState {
    pub fn is_animating(&self) -> bool {
        self.animation_id != NO_ANIMATION
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EntityKind {
    Object,
    Npc,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    pub name: String,
    pub position: WorldPoint,
    /// Projected convex-hull bounds; absent when the entity is off-screen.
    #[serde(default)]
    pub bounds: Option<Rect>,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub combat_level: Option<i32>,
    #[serde(default)]
    pub dead: bool,
}

impl Entity {
    pub fn name_matches_any(&self, keywords: &[String]) -> bool {
        let name = self.name.to_lowercase();
        keywords
            .iter()
            .any(|keyword| !keyword.is_empty() && name.contains(&keyword.to_lowercase()))
    }

    pub fn has_action_containing(&self, verb: &str) -> bool {
        let verb = verb.to_lowercase();
        self.actions
            .iter()
            .any(|action| action.to_lowercase().contains(&verb))
    }

    pub fn has_action_exact(&self, verb: &str) -> bool {
        self.actions
            .iter()
            .any(|action| action.eq_ignore_ascii_case(verb))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryItem {
    pub item_id: i32,
    pub name: String,
    pub bounds: Rect,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct WidgetId {
    pub group: u32,
    pub child: u32,
}

impl WidgetId {
    pub const fn new(group: u32, child: u32) -> Self {
        Self { group, child }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DialogWidget {
    pub id: WidgetId,
    #[serde(default)]
    pub bounds: Option<Rect>,
    #[serde(default)]
    pub hidden: bool,
}

/// One tick's read-only view of the host client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub player: PlayerState,
    #[serde(default)]
    pub skills: BTreeMap<Skill, SkillLevel>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub inventory: Vec<InventoryItem>,
    #[serde(default)]
    pub dialogs: Vec<DialogWidget>,
    #[serde(default)]
    pub canvas: Canvas,
}

impl Snapshot {
    pub fn new(player: PlayerState) -> Self {
        Self {
            player,
            skills: BTreeMap::new(),
            entities: Vec::new(),
            inventory: Vec::new(),
            dialogs: Vec::new(),
            canvas: Canvas::default(),
        }
    }

    pub fn real_level(&self, skill: Skill) -> Option<u32> {
        self.skills.get(&skill).map(|level| level.real)
    }

    pub fn dialog(&self, id: WidgetId) -> Option<&DialogWidget> {
        self.dialogs.iter().find(|widget| widget.id == id)
    }
}
