use crate::{default_areas, AreaRule, Snapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusBlock {
    pub current_hp: i32,
    pub max_hp: i32,
    pub is_animating: bool,
    pub in_combat: bool,
}

/// Observation schema understood by the policy service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub skills: BTreeMap<String, u32>,
    pub status: StatusBlock,
    pub x: i32,
    pub y: i32,
    pub area: String,
    pub activity: String,
    pub resources: u32,
}

#[derive(Debug, Clone)]
pub struct AreaMap {
    rules: Vec<AreaRule>,
}

impl Default for AreaMap {
    fn default() -> Self {
        Self::new(default_areas())
    }
}

impl AreaMap {
    pub fn new(rules: Vec<AreaRule>) -> Self {
        Self { rules }
    }

    /// First matching rule wins; unknown places fall back to the raw tile.
    pub fn label(&self, x: i32, y: i32) -> String {
        self.rules
            .iter()
            .find(|rule| rule.contains(x, y))
            .map(|rule| rule.name.clone())
            .unwrap_or_else(|| format!("({x},{y})"))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ObservationEncoder {
    areas: AreaMap,
}

impl ObservationEncoder {
    pub fn new(areas: AreaMap) -> Self {
        Self { areas }
    }

    pub fn areas(&self) -> &AreaMap {
        &self.areas
    }

    pub fn encode(&self, snapshot: &Snapshot, activity: &str, resources: u32) -> Observation {
        let skills = snapshot
            .skills
            .iter()
            .filter(|(skill, _)| !skill.is_aggregate())
            .map(|(skill, level)| (skill.name().to_lowercase(), level.real))
            .collect();
        let player = &snapshot.player;
        Observation {
            skills,
            status: StatusBlock {
                current_hp: player.health.current,
                max_hp: player.health.max,
                is_animating: player.is_animating(),
                in_combat: player.interacting,
            },
            x: player.position.x,
            y: player.position.y,
            area: self.areas.label(player.position.x, player.position.y),
            activity: activity.to_string(),
            resources,
        }
    }
}
