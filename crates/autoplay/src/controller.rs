use crate::{
    AgentConfig, AgentError, ClickPlan, ControlCommand, GameHost, InputBackend, InputExecutor,
    PolicyChannel, StatusReport,
};
use osrsml_core::{
    classify_gather, walk_click_point, ActionCommand, ActivityProgress, AreaMap, BreakScheduler,
    BreakTransition, CandidateLocator, EpisodeStats, EventBus, GameEvent, Mode, ObservationEncoder,
    RngState, Skill, Snapshot, TargetCandidate, WalkTarget, WalkVia, WorldPoint, NO_ANIMATION,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread::JoinHandle;

/// What a single tick ended up doing. Every variant before `NoDecision` is a
/// gate that stopped the tick early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    NotReady,
    Observing,
    CoolingDown,
    OnBreak,
    Busy,
    Waiting,
    NoDecision,
    Walk {
        label: String,
        via: WalkVia,
        plan: ClickPlan,
        executed: bool,
    },
    Click {
        label: String,
        plan: ClickPlan,
        executed: bool,
    },
    NoTarget {
        label: String,
    },
}

/// Episode state plus the components that act on it. Owned by the control
/// loop; the only work that leaves this thread is a dispatched click plan.
pub struct Session {
    config: AgentConfig,
    locator: CandidateLocator,
    encoder: ObservationEncoder,
    executor: InputExecutor,
    rng: RngState,
    breaks: BreakScheduler,
    events: EventBus,
    stats: EpisodeStats,
    progress: ActivityProgress,
    mode: Mode,
    auto_execute: bool,
    tick_counter: u64,
    pending_reward: f64,
    last_action: ActionCommand,
    cached_target: Option<TargetCandidate>,
    walk_target: Option<WalkTarget>,
    stay_here: bool,
    goal: Option<String>,
    position: WorldPoint,
    area: String,
    level_baseline: BTreeMap<Skill, u32>,
    initialized: bool,
    in_flight: Option<JoinHandle<()>>,
}

impl Session {
    pub fn new(
        config: AgentConfig,
        backend: Option<Arc<dyn InputBackend>>,
        now_ms: u64,
    ) -> Result<Self, AgentError> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => RngState::from_seed(seed),
            None => RngState::from_entropy(),
        };
        let breaks = BreakScheduler::new(config.breaks, now_ms, &mut rng);
        Ok(Self {
            locator: CandidateLocator::new(config.locator.clone()),
            encoder: ObservationEncoder::new(AreaMap::new(config.areas.clone())),
            executor: InputExecutor::new(backend, config.input),
            rng,
            breaks,
            events: EventBus::default(),
            stats: EpisodeStats::default(),
            progress: ActivityProgress::default(),
            mode: Mode::default(),
            auto_execute: false,
            tick_counter: 0,
            pending_reward: 0.0,
            last_action: ActionCommand::default(),
            cached_target: None,
            walk_target: None,
            stay_here: false,
            goal: None,
            position: WorldPoint::default(),
            area: String::new(),
            level_baseline: BTreeMap::new(),
            initialized: false,
            in_flight: None,
            config,
        })
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn auto_execute(&self) -> bool {
        self.auto_execute
    }

    pub fn set_auto_execute(&mut self, enabled: bool) {
        self.auto_execute = enabled;
    }

    pub fn stats(&self) -> &EpisodeStats {
        &self.stats
    }

    pub fn progress(&self) -> &ActivityProgress {
        &self.progress
    }

    pub fn breaks(&self) -> &BreakScheduler {
        &self.breaks
    }

    pub fn tick_counter(&self) -> u64 {
        self.tick_counter
    }

    pub fn pending_reward(&self) -> f64 {
        self.pending_reward
    }

    pub fn last_action(&self) -> ActionCommand {
        self.last_action
    }

    pub fn cached_target(&self) -> Option<&TargetCandidate> {
        self.cached_target.as_ref()
    }

    pub fn walk_target(&self) -> Option<&WalkTarget> {
        self.walk_target.as_ref()
    }

    pub fn stay_here(&self) -> bool {
        self.stay_here
    }

    pub fn goal(&self) -> Option<&str> {
        self.goal.as_deref()
    }

    pub fn area(&self) -> &str {
        &self.area
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn input_available(&self) -> bool {
        self.executor.is_available()
    }

    /// Blocks until the most recently dispatched plan has finished. The
    /// control loop never calls this.
    pub fn wait_for_input(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            if handle.join().is_err() {
                tracing::warn!("input worker panicked");
            }
        }
    }

    pub fn apply_command(&mut self, command: ControlCommand, host: &mut dyn GameHost, now_ms: u64) {
        let message = match command {
            ControlCommand::CycleMode => {
                self.mode = self.mode.next();
                tracing::info!(mode = self.mode.name(), "mode changed");
                Some(format!("Mode: {}", self.mode.name()))
            }
            ControlCommand::ToggleAutoExecute => {
                self.auto_execute = !self.auto_execute;
                tracing::info!(auto = self.auto_execute, "auto-execute toggled");
                Some(format!(
                    "Auto: {}",
                    if self.auto_execute { "ON" } else { "OFF" }
                ))
            }
            ControlCommand::ResetEpisode => {
                self.stats.reset();
                self.pending_reward = 0.0;
                self.breaks.reset(now_ms, &mut self.rng);
                tracing::info!("episode reset");
                None
            }
        };
        if let Some(message) = message {
            if host.session_ready() {
                host.notify(&message);
            }
        }
    }

    /// Runs the gate sequence for one game tick, then folds in any events the
    /// host observed during it.
    pub fn on_tick(
        &mut self,
        host: &mut dyn GameHost,
        policy: &mut dyn PolicyChannel,
        now_ms: u64,
    ) -> TickOutcome {
        let outcome = self.run_tick(host, policy, now_ms);
        self.events.extend(host.drain_events());
        if !self.initialized {
            self.events.clear();
        } else if outcome != TickOutcome::NotReady {
            let events: Vec<GameEvent> = self.events.drain().collect();
            for event in events {
                self.apply_event(event, now_ms);
            }
        }
        outcome
    }

    fn run_tick(
        &mut self,
        host: &mut dyn GameHost,
        policy: &mut dyn PolicyChannel,
        now_ms: u64,
    ) -> TickOutcome {
        if !host.session_ready() {
            return TickOutcome::NotReady;
        }
        let Some(snapshot) = host.snapshot() else {
            return TickOutcome::NotReady;
        };

        self.tick_counter += 1;
        self.stats.step_count += 1;
        if !self.initialized {
            self.level_baseline = snapshot
                .skills
                .iter()
                .map(|(skill, level)| (*skill, level.real))
                .collect();
            self.initialized = true;
        }
        self.update_breaks(now_ms);
        self.position = snapshot.player.position;
        self.area = self
            .encoder
            .areas()
            .label(self.position.x, self.position.y);

        if !(self.mode.drives_actions() && self.auto_execute) {
            return TickOutcome::Observing;
        }
        if now_ms.saturating_sub(self.stats.last_action_at) < self.config.control.cooldown_ms {
            return TickOutcome::CoolingDown;
        }
        if self.breaks.is_on_break() {
            return TickOutcome::OnBreak;
        }
        let animation = snapshot.player.animation_id;
        if animation != NO_ANIMATION && !self.config.control.idle_animations.contains(&animation) {
            self.stats.last_action_label = "Busy...".to_string();
            return TickOutcome::Busy;
        }
        if self.tick_counter % self.config.control.request_interval_ticks != 0 {
            return TickOutcome::Waiting;
        }

        let reward = std::mem::take(&mut self.pending_reward);
        let observation = self.encoder.encode(
            &snapshot,
            &self.progress.current_activity,
            self.stats.resources_gathered,
        );
        let Some(response) = policy.request_action(&observation, reward) else {
            // undelivered reward rides along with the next request
            self.pending_reward += reward;
            tracing::debug!(tick = self.tick_counter, "no response from policy");
            return TickOutcome::NoDecision;
        };

        if response.goal.is_some() {
            self.goal = response.goal;
        }
        self.stay_here = response.stay_here;
        self.walk_target = response.walk_target;
        let Some(action) = response.action else {
            return TickOutcome::NoDecision;
        };
        self.last_action = action;
        self.stats.last_action_at = now_ms;

        if let Some((tile, distance)) = self.pending_walk() {
            return self.walk(host, &snapshot, tile, distance);
        }
        self.click(&snapshot, &action)
    }

    fn update_breaks(&mut self, now_ms: u64) {
        match self.breaks.update(now_ms, &mut self.rng) {
            Some(BreakTransition::Started { duration_ms }) => {
                self.stats.last_action_label = format!("Break {}s", duration_ms / 1000);
                tracing::info!(duration_ms, "taking a break");
            }
            Some(BreakTransition::Ended { next_break_at }) => {
                tracing::info!(next_break_at, "break over");
            }
            None => {}
        }
    }

    /// Walk target far enough away to override the action.
    fn pending_walk(&self) -> Option<(WorldPoint, i32)> {
        if self.stay_here {
            return None;
        }
        let target = self.walk_target.as_ref()?;
        let tile = WorldPoint::new(target.x, target.y, self.position.plane);
        let distance = self.position.manhattan_to(&tile)?;
        (distance > self.config.control.walk_threshold_tiles).then_some((tile, distance))
    }

    fn walk(
        &mut self,
        host: &mut dyn GameHost,
        snapshot: &Snapshot,
        tile: WorldPoint,
        distance: i32,
    ) -> TickOutcome {
        let name = self
            .walk_target
            .as_ref()
            .map(|target| target.label.as_str())
            .unwrap_or_default();
        let label = format!("Walking to {name} ({distance} tiles)");
        let click = walk_click_point(
            host.project_tile(tile),
            &snapshot.canvas,
            self.position,
            tile,
            &self.config.minimap,
        );
        let plan = self
            .executor
            .plan_at(&label, click.point, snapshot.canvas.offset, &mut self.rng);
        tracing::info!(%label, via = ?click.via, "walking");
        self.stats.last_action_label = label.clone();
        let executed = self.launch(plan.clone());
        TickOutcome::Walk {
            label,
            via: click.via,
            plan,
            executed,
        }
    }

    fn click(&mut self, snapshot: &Snapshot, action: &ActionCommand) -> TickOutcome {
        let outcome = self.locator.locate(snapshot, action);
        self.stats.last_action_label = outcome.label.clone();
        self.cached_target = outcome.candidate;
        let Some(target) = self.cached_target.take() else {
            return TickOutcome::NoTarget {
                label: outcome.label,
            };
        };
        let plan = self.executor.plan_click(
            &outcome.label,
            target.bounds,
            snapshot.canvas.offset,
            &mut self.rng,
        );
        let executed = self.launch(plan.clone());
        TickOutcome::Click {
            label: outcome.label,
            plan,
            executed,
        }
    }

    fn launch(&mut self, plan: ClickPlan) -> bool {
        match self.executor.dispatch(plan) {
            Some(handle) => {
                self.in_flight = Some(handle);
                true
            }
            None => false,
        }
    }

    fn apply_event(&mut self, event: GameEvent, now_ms: u64) {
        match event {
            GameEvent::Chat { kind, text } => {
                if let Some(resource) = classify_gather(kind, &text) {
                    self.stats.resources_gathered += 1;
                    self.progress.record(resource, now_ms);
                    self.add_reward(self.config.control.gather_reward);
                }
            }
            GameEvent::StatChanged { skill, real_level } => {
                let baseline = self.level_baseline.entry(skill).or_insert(1);
                if real_level > *baseline {
                    *baseline = real_level;
                    tracing::info!(skill = skill.name(), level = real_level, "level up");
                    self.add_reward(self.config.control.level_up_reward);
                }
            }
        }
    }

    fn add_reward(&mut self, reward: f64) {
        self.stats.add_reward(reward);
        self.pending_reward += reward;
    }

    pub fn status(&self, now_ms: u64) -> StatusReport {
        StatusReport {
            mode: self.mode.name().to_string(),
            auto_execute: self.auto_execute,
            on_break: self.breaks.is_on_break(),
            break_remaining_ms: self.breaks.break_remaining_ms(now_ms),
            next_break_in_ms: self.breaks.next_break_in_ms(now_ms),
            area: self.area.clone(),
            x: self.position.x,
            y: self.position.y,
            walk_target: self.walk_target.clone(),
            goal: self.goal.clone(),
            activity: self.progress.current_activity.clone(),
            last_resource: self.progress.last_resource,
            resources_gathered: self.stats.resources_gathered,
            last_action_label: self.stats.last_action_label.clone(),
            last_action: self.last_action.0,
            step_count: self.stats.step_count,
            cumulative_reward: self.stats.cumulative_reward,
        }
    }
}
