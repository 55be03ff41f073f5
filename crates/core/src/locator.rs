use crate::{
    ActionCategory, ActionCommand, Entity, EntityKind, GatherKind, LocatorConfig, Rect,
    SearchRule, Snapshot,
};
use serde::{Deserialize, Serialize};

/// A clickable target picked for one action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetCandidate {
    pub bounds: Rect,
    pub world_distance: i32,
    pub label: String,
    pub rank_score: i32,
}

/// Result of one resolution attempt. `label` is always set so the decision
/// trace stays readable even when nothing matched.
#[derive(Debug, Clone, PartialEq)]
pub struct LocateOutcome {
    pub candidate: Option<TargetCandidate>,
    pub label: String,
}

impl LocateOutcome {
    fn found(candidate: TargetCandidate, label: String) -> Self {
        Self {
            candidate: Some(candidate),
            label,
        }
    }

    fn missing(label: impl Into<String>) -> Self {
        Self {
            candidate: None,
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CandidateLocator {
    config: LocatorConfig,
}

impl CandidateLocator {
    pub fn new(config: LocatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    pub fn locate(&self, snapshot: &Snapshot, command: &ActionCommand) -> LocateOutcome {
        match command.kind() {
            ActionCategory::Wait => LocateOutcome::missing("Waiting"),
            ActionCategory::Gather(kind) => {
                let rule = match kind {
                    GatherKind::Mining => &self.config.mining,
                    GatherKind::Fishing => &self.config.fishing,
                    GatherKind::Woodcutting => &self.config.woodcutting,
                    GatherKind::AnyRock => &self.config.any_rock,
                };
                self.nearest_matching(snapshot, rule)
            }
            ActionCategory::Engage => self.nearest_hostile(snapshot),
            ActionCategory::Dialog => self.visible_dialog(snapshot),
            ActionCategory::Bank => {
                let outcome = self.nearest_matching(snapshot, &self.config.bank_object);
                if outcome.candidate.is_some() {
                    outcome
                } else {
                    self.nearest_matching(snapshot, &self.config.bank_npc)
                }
            }
            ActionCategory::Walk => LocateOutcome::missing("Walking..."),
            ActionCategory::OpenBarrier => self.nearest_matching(snapshot, &self.config.barrier),
            ActionCategory::EatFood => self.first_food(snapshot),
            ActionCategory::Idle => LocateOutcome::missing("Idle"),
        }
    }

    /// Bounds the input layer can click reliably: non-empty and clear of the
    /// canvas edge. Anything else is an off-screen or clipped projection.
    pub fn usable_bounds(&self, snapshot: &Snapshot, bounds: Option<Rect>) -> Option<Rect> {
        let bounds = bounds?;
        if snapshot.canvas.contains_rect(&bounds, self.config.edge_margin) {
            Some(bounds)
        } else {
            None
        }
    }

    fn nearest_matching(&self, snapshot: &Snapshot, rule: &SearchRule) -> LocateOutcome {
        let player = snapshot.player.position;
        let mut best: Option<(&Entity, Rect, i32)> = None;
        for entity in snapshot.entities.iter().filter(|e| e.kind == rule.kind) {
            if !entity.name_matches_any(&rule.keywords) || !entity.has_action_containing(&rule.verb)
            {
                continue;
            }
            let Some(bounds) = self.usable_bounds(snapshot, entity.bounds) else {
                continue;
            };
            let Some(distance) = entity.position.manhattan_to(&player) else {
                continue;
            };
            if distance > self.config.visibility_radius {
                continue;
            }
            // strict comparison keeps the first entity seen on ties
            if best.map_or(true, |(_, _, best_distance)| distance < best_distance) {
                best = Some((entity, bounds, distance));
            }
        }
        match best {
            Some((entity, bounds, distance)) => LocateOutcome::found(
                TargetCandidate {
                    bounds,
                    world_distance: distance,
                    label: entity.name.clone(),
                    rank_score: distance,
                },
                format!("{} {}", rule.verb, entity.name),
            ),
            None => LocateOutcome::missing(format!("No {}", rule.primary_keyword())),
        }
    }

    fn nearest_hostile(&self, snapshot: &Snapshot) -> LocateOutcome {
        if snapshot.player.interacting {
            return LocateOutcome::missing("In combat");
        }
        let player = snapshot.player.position;
        let mut best: Option<(&Entity, Rect, i32, i32)> = None;
        for npc in snapshot.entities.iter().filter(|e| e.kind == EntityKind::Npc) {
            if npc.dead {
                continue;
            }
            let Some(level) = npc.combat_level else {
                continue;
            };
            if level < self.config.min_combat_level || level > self.config.max_combat_level {
                continue;
            }
            if !npc.has_action_exact("Attack") {
                continue;
            }
            let Some(bounds) = self.usable_bounds(snapshot, npc.bounds) else {
                continue;
            };
            let Some(distance) = npc.position.manhattan_to(&player) else {
                continue;
            };
            if distance > self.config.hostile_radius {
                continue;
            }
            let score = self.hostile_score(npc, distance, level);
            if best.map_or(true, |(_, _, _, best_score)| score < best_score) {
                best = Some((npc, bounds, distance, score));
            }
        }
        match best {
            Some((npc, bounds, distance, score)) => LocateOutcome::found(
                TargetCandidate {
                    bounds,
                    world_distance: distance,
                    label: npc.name.clone(),
                    rank_score: score,
                },
                format!("Attack {}", npc.name),
            ),
            None => LocateOutcome::missing("No target"),
        }
    }

    fn hostile_score(&self, npc: &Entity, distance: i32, level: i32) -> i32 {
        let mut score = distance * 10 + level;
        if self
            .config
            .preferred_targets
            .iter()
            .any(|name| name.eq_ignore_ascii_case(&npc.name))
        {
            score -= self.config.preferred_bonus;
        }
        score
    }

    fn visible_dialog(&self, snapshot: &Snapshot) -> LocateOutcome {
        for id in &self.config.dialog_widgets {
            let Some(widget) = snapshot.dialog(*id) else {
                continue;
            };
            if widget.hidden {
                continue;
            }
            if let Some(bounds) = self.usable_bounds(snapshot, widget.bounds) {
                return LocateOutcome::found(
                    TargetCandidate {
                        bounds,
                        world_distance: 0,
                        label: "Continue".to_string(),
                        rank_score: 0,
                    },
                    "Continue dialog".to_string(),
                );
            }
        }
        LocateOutcome::missing("No dialog")
    }

    fn first_food(&self, snapshot: &Snapshot) -> LocateOutcome {
        for item in snapshot.inventory.iter().filter(|item| item.item_id >= 0) {
            let name = item.name.to_lowercase();
            if !self
                .config
                .food_keywords
                .iter()
                .any(|food| name.contains(&food.to_lowercase()))
            {
                continue;
            }
            if let Some(bounds) = self.usable_bounds(snapshot, Some(item.bounds)) {
                return LocateOutcome::found(
                    TargetCandidate {
                        bounds,
                        world_distance: 0,
                        label: item.name.clone(),
                        rank_score: 0,
                    },
                    format!("Eat {}", item.name),
                );
            }
        }
        LocateOutcome::missing("No food")
    }
}
