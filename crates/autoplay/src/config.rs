use crate::AgentError;
use osrsml_core::{
    default_areas, AreaRule, BreakConfig, ConfigError, LocatorConfig, MinimapConfig,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub host: String,
    pub port: u16,
    pub timeout_ms: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8889,
            timeout_ms: 5_000,
        }
    }
}

impl PolicyConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub cooldown_ms: u64,
    pub request_interval_ticks: u64,
    pub walk_threshold_tiles: i32,
    pub idle_animations: Vec<i32>,
    pub gather_reward: f64,
    pub level_up_reward: f64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 2_000,
            request_interval_ticks: 5,
            walk_threshold_tiles: 15,
            idle_animations: vec![808, 813],
            gather_reward: 1.0,
            level_up_reward: 50.0,
        }
    }
}

/// Randomisation windows for simulated pointer input, in pixels and ms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub jitter_px: i32,
    pub min_steps: usize,
    pub max_steps: usize,
    pub min_step_delay_ms: u64,
    pub max_step_delay_ms: u64,
    pub min_settle_ms: u64,
    pub max_settle_ms: u64,
    pub min_hold_ms: u64,
    pub max_hold_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            jitter_px: 3,
            min_steps: 5,
            max_steps: 9,
            min_step_delay_ms: 5,
            max_step_delay_ms: 10,
            min_settle_ms: 30,
            max_settle_ms: 100,
            min_hold_ms: 30,
            max_hold_ms: 70,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub seed: Option<u64>,
    pub policy: PolicyConfig,
    pub control: ControlConfig,
    pub input: InputConfig,
    pub locator: LocatorConfig,
    pub breaks: BreakConfig,
    pub minimap: MinimapConfig,
    pub areas: Vec<AreaRule>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            seed: None,
            policy: PolicyConfig::default(),
            control: ControlConfig::default(),
            input: InputConfig::default(),
            locator: LocatorConfig::default(),
            breaks: BreakConfig::default(),
            minimap: MinimapConfig::default(),
            areas: default_areas(),
        }
    }
}

impl AgentConfig {
    pub fn from_json(body: &str) -> Result<Self, AgentError> {
        let config: Self = serde_json::from_str(body)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AgentError> {
        self.locator.validate()?;
        self.breaks.validate()?;
        self.minimap.validate()?;
        if self.control.request_interval_ticks == 0 {
            return Err(ConfigError::NotPositive("request_interval_ticks").into());
        }
        if self.policy.timeout_ms == 0 {
            return Err(ConfigError::NotPositive("timeout_ms").into());
        }
        let input = &self.input;
        for (field, min, max) in [
            ("input_steps", input.min_steps as i64, input.max_steps as i64),
            (
                "input_step_delay_ms",
                input.min_step_delay_ms as i64,
                input.max_step_delay_ms as i64,
            ),
            (
                "input_settle_ms",
                input.min_settle_ms as i64,
                input.max_settle_ms as i64,
            ),
            (
                "input_hold_ms",
                input.min_hold_ms as i64,
                input.max_hold_ms as i64,
            ),
        ] {
            if min > max {
                return Err(ConfigError::InvalidRange { field, min, max }.into());
            }
        }
        if input.min_steps == 0 {
            return Err(ConfigError::NotPositive("min_steps").into());
        }
        Ok(())
    }
}
