use crate::{EntityKind, WidgetId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid range for {field}: {min} > {max}")]
    InvalidRange {
        field: &'static str,
        min: i64,
        max: i64,
    },
    #[error("{0} must be positive")]
    NotPositive(&'static str),
    #[error("search rule for {0} has no keywords")]
    EmptyKeywords(&'static str),
}

fn check_range(field: &'static str, min: i64, max: i64) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::InvalidRange { field, min, max });
    }
    Ok(())
}

/// Name-and-verb filter used by the nearest-entity search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchRule {
    pub kind: EntityKind,
    pub verb: String,
    pub keywords: Vec<String>,
}

impl SearchRule {
    pub fn new(kind: EntityKind, verb: &str, keywords: &[&str]) -> Self {
        Self {
            kind,
            verb: verb.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn primary_keyword(&self) -> &str {
        self.keywords.first().map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    pub visibility_radius: i32,
    pub hostile_radius: i32,
    pub edge_margin: i32,
    pub min_combat_level: i32,
    pub max_combat_level: i32,
    pub preferred_bonus: i32,
    pub preferred_targets: Vec<String>,
    pub food_keywords: Vec<String>,
    pub dialog_widgets: Vec<WidgetId>,
    pub mining: SearchRule,
    pub fishing: SearchRule,
    pub woodcutting: SearchRule,
    pub any_rock: SearchRule,
    pub bank_object: SearchRule,
    pub bank_npc: SearchRule,
    pub barrier: SearchRule,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            visibility_radius: 15,
            hostile_radius: 10,
            edge_margin: 5,
            min_combat_level: 1,
            max_combat_level: 30,
            preferred_bonus: 50,
            preferred_targets: ["Chicken", "Cow", "Goblin", "Rat", "Spider", "Imp"]
                .iter()
                .map(|name| name.to_string())
                .collect(),
            food_keywords: [
                "shrimp", "chicken", "meat", "bread", "trout", "salmon", "tuna", "lobster",
            ]
            .iter()
            .map(|name| name.to_string())
            .collect(),
            dialog_widgets: vec![
                WidgetId::new(229, 2),
                WidgetId::new(217, 2),
                WidgetId::new(231, 2),
                WidgetId::new(219, 1),
                WidgetId::new(193, 2),
            ],
            mining: SearchRule::new(
                EntityKind::Object,
                "Mine",
                &["Rocks", "Copper", "Tin", "Iron"],
            ),
            fishing: SearchRule::new(EntityKind::Npc, "Net", &["Lure", "Bait", "Fishing spot"]),
            woodcutting: SearchRule::new(EntityKind::Object, "Chop", &["Tree", "Oak", "Willow"]),
            any_rock: SearchRule::new(EntityKind::Object, "Mine", &["Rocks"]),
            bank_object: SearchRule::new(EntityKind::Object, "Bank", &["Bank booth", "Bank chest"]),
            bank_npc: SearchRule::new(EntityKind::Npc, "Bank", &["Banker"]),
            barrier: SearchRule::new(EntityKind::Object, "Open", &["Gate", "Door"]),
        }
    }
}

impl LocatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.visibility_radius <= 0 {
            return Err(ConfigError::NotPositive("visibility_radius"));
        }
        if self.hostile_radius <= 0 {
            return Err(ConfigError::NotPositive("hostile_radius"));
        }
        check_range(
            "combat_level",
            self.min_combat_level as i64,
            self.max_combat_level as i64,
        )?;
        for (field, rule) in [
            ("mining", &self.mining),
            ("fishing", &self.fishing),
            ("woodcutting", &self.woodcutting),
            ("any_rock", &self.any_rock),
            ("bank_object", &self.bank_object),
            ("bank_npc", &self.bank_npc),
            ("barrier", &self.barrier),
        ] {
            if rule.keywords.is_empty() {
                return Err(ConfigError::EmptyKeywords(field));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakConfig {
    pub min_interval_ms: u64,
    pub max_interval_ms: u64,
    pub min_duration_ms: u64,
    pub max_duration_ms: u64,
}

impl Default for BreakConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 5 * 60 * 1000,
            max_interval_ms: 8 * 60 * 1000,
            min_duration_ms: 15 * 1000,
            max_duration_ms: 45 * 1000,
        }
    }
}

impl BreakConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range(
            "break_interval_ms",
            self.min_interval_ms as i64,
            self.max_interval_ms as i64,
        )?;
        check_range(
            "break_duration_ms",
            self.min_duration_ms as i64,
            self.max_duration_ms as i64,
        )?;
        if self.min_interval_ms == 0 {
            return Err(ConfigError::NotPositive("min_interval_ms"));
        }
        Ok(())
    }
}

/// Fixed-mode minimap geometry, in canvas pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MinimapConfig {
    pub center_x: i32,
    pub center_y: i32,
    pub pixels_per_tile: i32,
    pub max_tiles: i32,
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
    pub screen_margin: i32,
}

impl Default for MinimapConfig {
    fn default() -> Self {
        Self {
            center_x: 643,
            center_y: 83,
            pixels_per_tile: 4,
            max_tiles: 10,
            min_x: 580,
            max_x: 705,
            min_y: 15,
            max_y: 155,
            screen_margin: 5,
        }
    }
}

impl MinimapConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("minimap_x", self.min_x as i64, self.max_x as i64)?;
        check_range("minimap_y", self.min_y as i64, self.max_y as i64)?;
        if self.pixels_per_tile <= 0 {
            return Err(ConfigError::NotPositive("pixels_per_tile"));
        }
        if self.max_tiles <= 0 {
            return Err(ConfigError::NotPositive("max_tiles"));
        }
        Ok(())
    }
}

/// Named rectangle of world tiles. Missing bounds are open-ended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AreaRule {
    pub name: String,
    #[serde(default)]
    pub min_x: Option<i32>,
    #[serde(default)]
    pub max_x: Option<i32>,
    #[serde(default)]
    pub min_y: Option<i32>,
    #[serde(default)]
    pub max_y: Option<i32>,
}

impl AreaRule {
    pub fn rect(name: &str, min_x: i32, max_x: i32, min_y: i32, max_y: i32) -> Self {
        Self {
            name: name.to_string(),
            min_x: Some(min_x),
            max_x: Some(max_x),
            min_y: Some(min_y),
            max_y: Some(max_y),
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.min_x.map_or(true, |v| x >= v)
            && self.max_x.map_or(true, |v| x <= v)
            && self.min_y.map_or(true, |v| y >= v)
            && self.max_y.map_or(true, |v| y <= v)
    }
}

pub fn default_areas() -> Vec<AreaRule> {
    vec![
        AreaRule {
            name: "Underground".to_string(),
            min_x: None,
            max_x: None,
            min_y: Some(9001),
            max_y: None,
        },
        AreaRule::rect("Lumbridge", 3190, 3260, 3180, 3250),
        AreaRule::rect("Lumbridge Farm", 3220, 3260, 3280, 3320),
        AreaRule::rect("Varrock", 3170, 3300, 3380, 3510),
    ]
}
