//! Line-delimited JSON exchanged with the policy service.
//!
//! Each connection carries one request line and one response line:
//!
//! ```text
//! -> {"type":"step","observation":{...},"reward":1.0,"done":false}
//! <- {"goal":"...","stay_here":false,"walk_to":{"x":1,"y":2,"name":"..."},"action":[1,0,0,0]}
//! ```

use crate::AgentError;
use osrsml_core::{ActionCommand, Observation, PolicyResponse, WalkTarget};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct StepRequest<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub observation: &'a Observation,
    pub reward: f64,
    pub done: bool,
}

impl<'a> StepRequest<'a> {
    pub fn step(observation: &'a Observation, reward: f64) -> Self {
        Self {
            kind: "step",
            observation,
            reward,
            done: false,
        }
    }

    pub fn to_line(&self) -> Result<String, AgentError> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

#[derive(Debug, Deserialize)]
struct WireWalkTarget {
    x: i64,
    y: i64,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    goal: Option<String>,
    #[serde(default)]
    stay_here: Option<bool>,
    #[serde(default)]
    walk_to: Option<WireWalkTarget>,
    #[serde(default)]
    action: Option<Vec<f64>>,
}

pub fn decode_response(line: &str) -> Result<PolicyResponse, AgentError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(AgentError::Protocol("empty response line".to_string()));
    }
    let wire: WireResponse = serde_json::from_str(line)?;
    let walk_target = match wire.walk_to {
        Some(walk) => Some(WalkTarget {
            x: to_coordinate(walk.x)?,
            y: to_coordinate(walk.y)?,
            label: walk.name.unwrap_or_default(),
        }),
        None => None,
    };
    let action = wire.action.map(|slots| {
        let slots: Vec<i32> = slots.iter().map(|value| value.trunc() as i32).collect();
        ActionCommand::from_slots(&slots)
    });
    Ok(PolicyResponse {
        goal: wire.goal,
        walk_target,
        stay_here: wire.stay_here.unwrap_or(false),
        action,
    })
}

fn to_coordinate(value: i64) -> Result<i32, AgentError> {
    i32::try_from(value)
        .map_err(|_| AgentError::Protocol(format!("walk coordinate out of range: {value}")))
}
