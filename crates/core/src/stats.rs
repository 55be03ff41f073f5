use crate::Resource;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpisodeStats {
    pub step_count: u64,
    pub cumulative_reward: f64,
    pub resources_gathered: u32,
    pub last_action_label: String,
    pub last_action_at: u64,
}

impl Default for EpisodeStats {
    fn default() -> Self {
        Self {
            step_count: 0,
            cumulative_reward: 0.0,
            resources_gathered: 0,
            last_action_label: "None".to_string(),
            last_action_at: 0,
        }
    }
}

impl EpisodeStats {
    pub fn add_reward(&mut self, reward: f64) {
        self.cumulative_reward += reward;
    }

    /// Zeroes the counters; `last_action_at` is left alone so the cooldown
    /// still applies across a reset.
    pub fn reset(&mut self) {
        self.step_count = 0;
        self.cumulative_reward = 0.0;
        self.resources_gathered = 0;
        self.last_action_label = "Reset".to_string();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityProgress {
    pub current_activity: String,
    pub last_resource: Option<Resource>,
    pub last_activity_at: u64,
}

impl Default for ActivityProgress {
    fn default() -> Self {
        Self {
            current_activity: "Idle".to_string(),
            last_resource: None,
            last_activity_at: 0,
        }
    }
}

impl ActivityProgress {
    pub fn record(&mut self, resource: Resource, now_ms: u64) {
        self.current_activity = resource.activity().to_string();
        self.last_resource = Some(resource);
        self.last_activity_at = now_ms;
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Mode {
    GptAdvisor,
    RlTraining,
    RlInference,
    Manual,
}

impl Mode {
    pub fn next(self) -> Self {
        match self {
            Self::GptAdvisor => Self::RlTraining,
            Self::RlTraining => Self::RlInference,
            Self::RlInference => Self::Manual,
            Self::Manual => Self::GptAdvisor,
        }
    }

    pub fn drives_actions(self) -> bool {
        matches!(self, Self::RlTraining | Self::RlInference)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::GptAdvisor => "GPT_ADVISOR",
            Self::RlTraining => "RL_TRAINING",
            Self::RlInference => "RL_INFERENCE",
            Self::Manual => "MANUAL",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "GPT_ADVISOR" => Some(Self::GptAdvisor),
            "RL_TRAINING" => Some(Self::RlTraining),
            "RL_INFERENCE" => Some(Self::RlInference),
            "MANUAL" => Some(Self::Manual),
            _ => None,
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self::GptAdvisor
    }
}
