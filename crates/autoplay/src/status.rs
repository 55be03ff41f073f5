use crate::AgentError;
use osrsml_core::{Resource, WalkTarget};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Everything an overlay needs to render one frame of session state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusReport {
    pub mode: String,
    pub auto_execute: bool,
    pub on_break: bool,
    pub break_remaining_ms: u64,
    pub next_break_in_ms: u64,
    pub area: String,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub walk_target: Option<WalkTarget>,
    #[serde(default)]
    pub goal: Option<String>,
    pub activity: String,
    #[serde(default)]
    pub last_resource: Option<Resource>,
    pub resources_gathered: u32,
    pub last_action_label: String,
    pub last_action: [i32; 4],
    pub step_count: u64,
    pub cumulative_reward: f64,
}

impl StatusReport {
    pub fn to_text_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "Mode: {}  Auto: {}",
            self.mode,
            if self.auto_execute { "ON" } else { "OFF" }
        )];
        if self.on_break {
            lines.push(format!("On break: {}s left", self.break_remaining_ms / 1000));
        } else {
            lines.push(format!("Next break in {}s", self.next_break_in_ms / 1000));
        }
        lines.push(format!("Area: {} ({}, {})", self.area, self.x, self.y));
        if let Some(target) = &self.walk_target {
            lines.push(format!("Walk to: {} ({}, {})", target.label, target.x, target.y));
        }
        if let Some(goal) = &self.goal {
            lines.push(format!("Goal: {goal}"));
        }
        let resource = self.last_resource.map(Resource::name).unwrap_or("-");
        lines.push(format!(
            "Activity: {}  Last: {}  Gathered: {}",
            self.activity, resource, self.resources_gathered
        ));
        lines.push(format!("Action: {}", self.last_action_label));
        let [a, b, c, d] = self.last_action;
        lines.push(format!("Raw: [{a}, {b}, {c}, {d}]"));
        lines.push(format!(
            "Steps: {}  Reward: {:.1}",
            self.step_count, self.cumulative_reward
        ));
        lines
    }
}

pub fn write_status(path: &Path, report: &StatusReport) -> Result<(), AgentError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_string_pretty(report)?;
    fs::write(path, body)?;
    Ok(())
}
