use osrsml_autoplay::{
    decode_response, AgentConfig, ControlCommand, GameHost, InputBackend, PolicyChannel, Session,
    TickOutcome,
};
use osrsml_core::{
    ActionCommand, ChatKind, Entity, EntityKind, GameEvent, Mode, Observation, PlayerState,
    PolicyResponse, Rect, Resource, ScreenPoint, Skill, SkillLevel, Snapshot, WalkTarget, WalkVia,
    WorldPoint,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

const T0: u64 = 1_000_000;

struct FakeHost {
    ready: bool,
    snapshot: Option<Snapshot>,
    projection: Option<ScreenPoint>,
    events: Vec<GameEvent>,
    notes: Vec<String>,
}

impl FakeHost {
    fn at(x: i32, y: i32) -> Self {
        Self {
            ready: true,
            snapshot: Some(scene(x, y)),
            projection: None,
            events: Vec::new(),
            notes: Vec::new(),
        }
    }

    fn set_animation(&mut self, animation_id: i32) {
        if let Some(snapshot) = self.snapshot.as_mut() {
            snapshot.player.animation_id = animation_id;
        }
    }

    fn chat(&mut self, text: &str) {
        self.events.push(GameEvent::Chat {
            kind: ChatKind::Spam,
            text: text.to_string(),
        });
    }
}

impl GameHost for FakeHost {
    fn session_ready(&self) -> bool {
        self.ready
    }

    fn snapshot(&self) -> Option<Snapshot> {
        self.snapshot.clone()
    }

    fn project_tile(&self, _tile: WorldPoint) -> Option<ScreenPoint> {
        self.projection
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn notify(&mut self, message: &str) {
        self.notes.push(message.to_string());
    }
}

#[derive(Default)]
struct ScriptedPolicy {
    replies: VecDeque<Option<PolicyResponse>>,
    requests: Vec<(Observation, f64)>,
}

impl ScriptedPolicy {
    fn replying(replies: Vec<Option<PolicyResponse>>) -> Self {
        Self {
            replies: replies.into(),
            requests: Vec::new(),
        }
    }
}

impl PolicyChannel for ScriptedPolicy {
    fn request_action(
        &mut self,
        observation: &Observation,
        reward: f64,
    ) -> Option<PolicyResponse> {
        self.requests.push((observation.clone(), reward));
        self.replies.pop_front().flatten()
    }
}

#[derive(Default)]
struct Recorder {
    log: Mutex<Vec<String>>,
}

impl InputBackend for Recorder {
    fn pointer_position(&self) -> Option<ScreenPoint> {
        Some(ScreenPoint::new(0, 0))
    }

    fn move_pointer(&self, point: ScreenPoint) {
        self.log
            .lock()
            .expect("log")
            .push(format!("move {} {}", point.x, point.y));
    }

    fn press(&self) {
        self.log.lock().expect("log").push("press".to_string());
    }

    fn release(&self) {
        self.log.lock().expect("log").push("release".to_string());
    }
}

fn scene(x: i32, y: i32) -> Snapshot {
    let mut snapshot = Snapshot::new(PlayerState {
        position: WorldPoint::new(x, y, 0),
        health: Default::default(),
        prayer: Default::default(),
        animation_id: -1,
        interacting: false,
    });
    snapshot.skills.insert(Skill::Mining, SkillLevel { real: 5, boosted: 5 });
    snapshot
        .skills
        .insert(Skill::Hitpoints, SkillLevel { real: 10, boosted: 10 });
    snapshot.entities = vec![Entity {
        id: 1,
        kind: EntityKind::Object,
        name: "Copper rocks".to_string(),
        position: WorldPoint::new(x + 2, y, 0),
        bounds: Some(Rect::new(300, 200, 30, 30)),
        actions: vec!["Mine".to_string(), "Prospect".to_string()],
        combat_level: None,
        dead: false,
    }];
    snapshot
}

fn act(category: i32, sub_action: i32) -> Option<PolicyResponse> {
    Some(PolicyResponse {
        action: Some(ActionCommand::new(category, sub_action, 0, 0)),
        ..PolicyResponse::default()
    })
}

fn config(request_interval_ticks: u64) -> AgentConfig {
    let mut config = AgentConfig::default();
    config.seed = Some(7);
    config.control.request_interval_ticks = request_interval_ticks;
    config
}

fn driving(config: AgentConfig, backend: Option<Arc<dyn InputBackend>>) -> Session {
    let mut session = Session::new(config, backend, T0).expect("session");
    session.set_mode(Mode::RlTraining);
    session.set_auto_execute(true);
    session
}

fn recorded_session(request_interval_ticks: u64) -> (Session, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let backend: Arc<dyn InputBackend> = recorder.clone();
    (driving(config(request_interval_ticks), Some(backend)), recorder)
}

#[test]
fn not_ready_tick_mutates_nothing() {
    let mut session = driving(config(1), None);
    let mut host = FakeHost::at(3222, 3218);
    host.ready = false;
    host.chat("You manage to mine some copper.");
    let mut policy = ScriptedPolicy::replying(vec![act(1, 0)]);

    assert_eq!(session.on_tick(&mut host, &mut policy, T0), TickOutcome::NotReady);
    assert_eq!(session.tick_counter(), 0);
    assert_eq!(session.stats().step_count, 0);
    assert!(!session.is_initialized());
    assert!(policy.requests.is_empty());

    host.ready = true;
    host.snapshot = None;
    assert_eq!(session.on_tick(&mut host, &mut policy, T0), TickOutcome::NotReady);
    assert_eq!(session.stats().cumulative_reward, 0.0);
    assert_eq!(session.stats().resources_gathered, 0);
}

#[test]
fn events_before_first_ready_tick_are_ignored() {
    let mut session = driving(config(1), None);
    let mut host = FakeHost::at(3222, 3218);
    host.ready = false;
    host.chat("You manage to mine some copper.");
    let mut policy = ScriptedPolicy::default();
    session.on_tick(&mut host, &mut policy, T0);

    host.ready = true;
    session.on_tick(&mut host, &mut policy, T0 + 600);
    assert!(session.is_initialized());
    assert_eq!(session.stats().resources_gathered, 0);
    assert_eq!(session.pending_reward(), 0.0);
}

#[test]
fn observe_mode_counts_steps_without_requests() {
    let mut session = Session::new(config(1), None, T0).expect("session");
    let mut host = FakeHost::at(3222, 3218);
    let mut policy = ScriptedPolicy::default();

    assert_eq!(session.mode(), Mode::GptAdvisor);
    assert_eq!(session.on_tick(&mut host, &mut policy, T0), TickOutcome::Observing);
    assert_eq!(session.stats().step_count, 1);
    assert_eq!(session.area(), "Lumbridge");
    assert!(policy.requests.is_empty());

    session.set_mode(Mode::RlInference);
    assert_eq!(session.on_tick(&mut host, &mut policy, T0), TickOutcome::Observing);
    assert_eq!(session.stats().step_count, 2);
}

#[test]
fn requests_only_on_interval_ticks() {
    let mut session = driving(config(5), None);
    let mut host = FakeHost::at(3222, 3218);
    let mut policy = ScriptedPolicy::default();
    for _ in 0..4 {
        assert_eq!(session.on_tick(&mut host, &mut policy, T0), TickOutcome::Waiting);
    }
    assert_eq!(session.on_tick(&mut host, &mut policy, T0), TickOutcome::NoDecision);
    assert_eq!(policy.requests.len(), 1);
    let (observation, reward) = &policy.requests[0];
    assert_eq!(observation.skills.get("mining"), Some(&5));
    assert_eq!(observation.area, "Lumbridge");
    assert_eq!(*reward, 0.0);
}

#[test]
fn mining_action_clicks_and_consumes_cached_target() {
    let (mut session, recorder) = recorded_session(1);
    let mut host = FakeHost::at(3222, 3218);
    let mut policy = ScriptedPolicy::replying(vec![act(1, 0)]);

    let (label, plan, executed) = match session.on_tick(&mut host, &mut policy, T0) {
        TickOutcome::Click {
            label,
            plan,
            executed,
        } => (label, plan, executed),
        other => panic!("expected click, got {other:?}"),
    };
    assert_eq!(label, "Mine Copper rocks");
    assert!(executed);
    assert!((312..=318).contains(&plan.target.x));
    assert!((212..=218).contains(&plan.target.y));
    assert!(session.cached_target().is_none());
    assert_eq!(session.stats().last_action_at, T0);
    assert_eq!(session.last_action(), ActionCommand::new(1, 0, 0, 0));
    assert_eq!(session.stats().last_action_label, "Mine Copper rocks");

    session.wait_for_input();
    let log = recorder.log.lock().expect("log").clone();
    assert_eq!(
        log[log.len() - 3],
        format!("move {} {}", plan.target.x, plan.target.y)
    );
    assert_eq!(&log[log.len() - 2..], ["press", "release"]);
}

#[test]
fn far_walk_target_overrides_action() {
    let (mut session, _recorder) = recorded_session(1);
    let mut host = FakeHost::at(100, 100);
    let mut policy = ScriptedPolicy::replying(vec![Some(PolicyResponse {
        goal: Some("Go mining".to_string()),
        walk_target: Some(WalkTarget {
            x: 100,
            y: 80,
            label: "Mine".to_string(),
        }),
        stay_here: false,
        action: Some(ActionCommand::new(1, 0, 0, 0)),
    })]);

    let (label, via, plan) = match session.on_tick(&mut host, &mut policy, T0) {
        TickOutcome::Walk {
            label, via, plan, ..
        } => (label, via, plan),
        other => panic!("expected walk, got {other:?}"),
    };
    assert_eq!(label, "Walking to Mine (20 tiles)");
    assert_eq!(via, WalkVia::Minimap);
    assert!((640..=646).contains(&plan.target.x));
    assert!((120..=126).contains(&plan.target.y));
    assert_eq!(session.area(), "(100,100)");
    assert_eq!(session.goal(), Some("Go mining"));
    assert_eq!(session.stats().last_action_at, T0);
    session.wait_for_input();
}

#[test]
fn visible_walk_tile_is_clicked_on_screen() {
    let mut session = driving(config(1), None);
    let mut host = FakeHost::at(100, 100);
    host.projection = Some(ScreenPoint::new(380, 90));
    let mut policy = ScriptedPolicy::replying(vec![Some(PolicyResponse {
        walk_target: Some(WalkTarget {
            x: 100,
            y: 120,
            label: "Gate".to_string(),
        }),
        action: Some(ActionCommand::new(0, 0, 0, 0)),
        ..PolicyResponse::default()
    })]);

    match session.on_tick(&mut host, &mut policy, T0) {
        TickOutcome::Walk { via, plan, executed, .. } => {
            assert_eq!(via, WalkVia::Screen);
            assert!((377..=383).contains(&plan.target.x));
            assert!(!executed);
        }
        other => panic!("expected walk, got {other:?}"),
    }
}

#[test]
fn stay_here_or_near_target_skips_walking() {
    let mut session = driving(config(1), None);
    let mut host = FakeHost::at(3222, 3218);
    let far = WalkTarget {
        x: 3222,
        y: 3250,
        label: "Farm".to_string(),
    };
    let near = WalkTarget {
        x: 3222,
        y: 3230,
        label: "Rocks".to_string(),
    };
    let mut policy = ScriptedPolicy::replying(vec![
        Some(PolicyResponse {
            walk_target: Some(far),
            stay_here: true,
            action: Some(ActionCommand::new(1, 0, 0, 0)),
            ..PolicyResponse::default()
        }),
        Some(PolicyResponse {
            walk_target: Some(near),
            action: Some(ActionCommand::new(1, 0, 0, 0)),
            ..PolicyResponse::default()
        }),
    ]);

    assert!(matches!(
        session.on_tick(&mut host, &mut policy, T0),
        TickOutcome::Click { .. }
    ));
    assert!(session.stay_here());
    assert!(matches!(
        session.on_tick(&mut host, &mut policy, T0 + 2_000),
        TickOutcome::Click { .. }
    ));
    assert_eq!(session.walk_target().map(|t| t.y), Some(3230));
}

#[test]
fn cooldown_separates_executed_actions() {
    let mut session = driving(config(1), None);
    let mut host = FakeHost::at(3222, 3218);
    let mut policy = ScriptedPolicy::replying(vec![act(1, 0), act(1, 0)]);

    assert!(matches!(
        session.on_tick(&mut host, &mut policy, T0),
        TickOutcome::Click { .. }
    ));
    assert_eq!(
        session.on_tick(&mut host, &mut policy, T0 + 500),
        TickOutcome::CoolingDown
    );
    assert_eq!(
        session.on_tick(&mut host, &mut policy, T0 + 1_999),
        TickOutcome::CoolingDown
    );
    assert_eq!(policy.requests.len(), 1);
    assert!(matches!(
        session.on_tick(&mut host, &mut policy, T0 + 2_000),
        TickOutcome::Click { .. }
    ));
    assert_eq!(session.stats().last_action_at, T0 + 2_000);
}

#[test]
fn response_without_action_keeps_timers() {
    let mut session = driving(config(1), None);
    let mut host = FakeHost::at(3222, 3218);
    let mut policy = ScriptedPolicy::replying(vec![
        act(1, 0),
        Some(PolicyResponse {
            goal: Some("Thinking".to_string()),
            walk_target: Some(WalkTarget {
                x: 3208,
                y: 3220,
                label: "Bank".to_string(),
            }),
            ..PolicyResponse::default()
        }),
        None,
    ]);

    session.on_tick(&mut host, &mut policy, T0);
    let stamp = session.stats().last_action_at;

    assert_eq!(
        session.on_tick(&mut host, &mut policy, T0 + 3_000),
        TickOutcome::NoDecision
    );
    assert_eq!(session.stats().last_action_at, stamp);
    assert_eq!(session.last_action(), ActionCommand::new(1, 0, 0, 0));
    assert_eq!(session.goal(), Some("Thinking"));
    assert_eq!(session.walk_target().map(|t| t.label.as_str()), Some("Bank"));

    assert_eq!(
        session.on_tick(&mut host, &mut policy, T0 + 6_000),
        TickOutcome::NoDecision
    );
    assert_eq!(session.stats().last_action_at, stamp);
    assert!(session.cached_target().is_none());
    assert_eq!(session.goal(), Some("Thinking"));
}

#[test]
fn busy_animation_blocks_but_idle_poses_do_not() {
    let mut session = driving(config(1), None);
    let mut host = FakeHost::at(3222, 3218);
    let mut policy = ScriptedPolicy::replying(vec![act(1, 0)]);

    host.set_animation(625);
    assert_eq!(session.on_tick(&mut host, &mut policy, T0), TickOutcome::Busy);
    assert_eq!(session.stats().last_action_label, "Busy...");
    assert!(policy.requests.is_empty());

    host.set_animation(808);
    assert!(matches!(
        session.on_tick(&mut host, &mut policy, T0),
        TickOutcome::Click { .. }
    ));
}

#[test]
fn no_actions_while_on_break() {
    let mut session = driving(config(1), None);
    let mut host = FakeHost::at(3222, 3218);
    let mut policy = ScriptedPolicy::replying(vec![act(1, 0)]);

    let break_at = session.breaks().state().next_break_at;
    assert!(break_at > T0);
    assert_eq!(
        session.on_tick(&mut host, &mut policy, break_at),
        TickOutcome::OnBreak
    );
    assert!(session.stats().last_action_label.starts_with("Break "));
    let state = session.breaks().state();
    let resume_at = state.break_started_at + state.break_duration_ms;
    assert_eq!(
        session.on_tick(&mut host, &mut policy, resume_at - 1),
        TickOutcome::OnBreak
    );
    assert!(policy.requests.is_empty());
    assert!(session.status(resume_at - 1).on_break);

    assert!(matches!(
        session.on_tick(&mut host, &mut policy, resume_at),
        TickOutcome::Click { .. }
    ));
    assert!(session.breaks().state().next_break_at > resume_at);
    assert!(!session.status(resume_at).on_break);
}

#[test]
fn gathers_and_level_up_accumulate_reward() {
    let mut session = driving(config(5), None);
    let mut host = FakeHost::at(3222, 3218);
    let mut policy = ScriptedPolicy::replying(vec![act(0, 0)]);

    session.on_tick(&mut host, &mut policy, T0);
    for _ in 0..3 {
        host.chat("You manage to mine some tin.");
    }
    host.chat("Welcome to RuneScape.");
    host.events.push(GameEvent::StatChanged {
        skill: Skill::Mining,
        real_level: 6,
    });
    host.events.push(GameEvent::StatChanged {
        skill: Skill::Mining,
        real_level: 6,
    });
    session.on_tick(&mut host, &mut policy, T0 + 600);

    assert_eq!(session.stats().resources_gathered, 3);
    assert_eq!(session.stats().cumulative_reward, 53.0);
    assert_eq!(session.pending_reward(), 53.0);
    assert_eq!(session.progress().current_activity, "Mining");
    assert_eq!(session.progress().last_resource, Some(Resource::Ore));

    for tick in 0..3 {
        session.on_tick(&mut host, &mut policy, T0 + 1_200 + tick * 600);
    }
    assert_eq!(policy.requests.len(), 1);
    let (observation, reward) = &policy.requests[0];
    assert_eq!(*reward, 53.0);
    assert_eq!(observation.resources, 3);
    assert_eq!(observation.activity, "Mining");
    assert_eq!(session.pending_reward(), 0.0);
    assert_eq!(session.stats().cumulative_reward, 53.0);
}

#[test]
fn failed_request_keeps_reward_for_next_request() {
    let mut session = driving(config(1), None);
    let mut host = FakeHost::at(3222, 3218);
    let mut policy = ScriptedPolicy::replying(vec![None, None, None, act(0, 0)]);

    session.on_tick(&mut host, &mut policy, T0);
    host.chat("You get some logs.");
    session.on_tick(&mut host, &mut policy, T0 + 600);
    assert_eq!(session.pending_reward(), 1.0);

    assert_eq!(
        session.on_tick(&mut host, &mut policy, T0 + 1_200),
        TickOutcome::NoDecision
    );
    assert_eq!(session.pending_reward(), 1.0);

    session.on_tick(&mut host, &mut policy, T0 + 1_800);
    let rewards: Vec<f64> = policy.requests.iter().map(|(_, reward)| *reward).collect();
    assert_eq!(rewards, vec![0.0, 0.0, 1.0, 1.0]);
    assert_eq!(session.pending_reward(), 0.0);
    assert_eq!(session.stats().cumulative_reward, 1.0);
}

#[test]
fn far_walk_coordinates_never_overflow() {
    for (x, distance) in [(60_000, 59_900), (i32::MIN, i32::MAX)] {
        let mut session = driving(config(1), None);
        let mut host = FakeHost::at(100, 80);
        let reply = format!(
            r#"{{"walk_to":{{"x":{x},"y":80,"name":"Far"}},"action":[0,0,0,0]}}"#
        );
        let response = decode_response(&reply).expect("decode");
        let mut policy = ScriptedPolicy::replying(vec![Some(response)]);

        match session.on_tick(&mut host, &mut policy, T0) {
            TickOutcome::Walk {
                label, via, plan, ..
            } => {
                assert_eq!(label, format!("Walking to Far ({distance} tiles)"));
                assert_eq!(via, WalkVia::Minimap);
                let expected_x = if x > 0 { 643 + 40 } else { 643 - 40 };
                assert!((expected_x - 3..=expected_x + 3).contains(&plan.target.x));
                assert!((80..=86).contains(&plan.target.y));
            }
            other => panic!("expected walk, got {other:?}"),
        }
    }
}

#[test]
fn reset_zeroes_episode_counters() {
    let mut session = driving(config(1), None);
    let mut host = FakeHost::at(3222, 3218);
    let mut policy = ScriptedPolicy::replying(vec![act(1, 0)]);

    session.on_tick(&mut host, &mut policy, T0);
    host.chat("You catch some shrimps.");
    session.on_tick(&mut host, &mut policy, T0 + 600);
    assert_eq!(session.stats().resources_gathered, 1);

    session.apply_command(ControlCommand::ResetEpisode, &mut host, T0 + 700);
    let stats = session.stats();
    assert_eq!(stats.step_count, 0);
    assert_eq!(stats.cumulative_reward, 0.0);
    assert_eq!(stats.resources_gathered, 0);
    assert_eq!(stats.last_action_label, "Reset");
    assert_eq!(session.pending_reward(), 0.0);
    assert!(!session.breaks().is_on_break());
    assert!(session.breaks().state().next_break_at > T0 + 700);
    assert!(host.notes.is_empty());
}

#[test]
fn commands_notify_only_when_ready() {
    let mut session = Session::new(config(1), None, T0).expect("session");
    let mut host = FakeHost::at(3222, 3218);

    session.apply_command(ControlCommand::CycleMode, &mut host, T0);
    session.apply_command(ControlCommand::ToggleAutoExecute, &mut host, T0);
    assert_eq!(host.notes, vec!["Mode: RL_TRAINING", "Auto: ON"]);
    assert_eq!(session.mode(), Mode::RlTraining);
    assert!(session.auto_execute());

    host.ready = false;
    session.apply_command(ControlCommand::CycleMode, &mut host, T0);
    session.apply_command(ControlCommand::ToggleAutoExecute, &mut host, T0);
    assert_eq!(host.notes.len(), 2);
    assert_eq!(session.mode(), Mode::RlInference);
    assert!(!session.auto_execute());
}

#[test]
fn missing_backend_runs_observe_only() {
    let mut session = driving(config(1), None);
    assert!(!session.input_available());
    let mut host = FakeHost::at(3222, 3218);
    let mut policy = ScriptedPolicy::replying(vec![act(1, 0)]);

    match session.on_tick(&mut host, &mut policy, T0) {
        TickOutcome::Click { label, executed, .. } => {
            assert_eq!(label, "Mine Copper rocks");
            assert!(!executed);
        }
        other => panic!("expected click, got {other:?}"),
    }
    assert_eq!(session.stats().last_action_at, T0);
}

#[test]
fn unmatched_action_reports_label() {
    let mut session = driving(config(1), None);
    let mut host = FakeHost::at(3222, 3218);
    let mut policy = ScriptedPolicy::replying(vec![act(8, 0), act(3, 0)]);

    assert_eq!(
        session.on_tick(&mut host, &mut policy, T0),
        TickOutcome::NoTarget {
            label: "No food".to_string()
        }
    );
    assert_eq!(
        session.on_tick(&mut host, &mut policy, T0 + 2_000),
        TickOutcome::NoTarget {
            label: "No dialog".to_string()
        }
    );
    assert_eq!(session.stats().last_action_label, "No dialog");
    assert!(session.cached_target().is_none());
}

#[test]
fn status_reflects_session_state() {
    let mut session = driving(config(1), None);
    let mut host = FakeHost::at(3222, 3218);
    let mut policy = ScriptedPolicy::replying(vec![Some(PolicyResponse {
        goal: Some("Train mining".to_string()),
        action: Some(ActionCommand::new(1, 0, 0, 0)),
        ..PolicyResponse::default()
    })]);
    session.on_tick(&mut host, &mut policy, T0);

    let report = session.status(T0);
    assert_eq!(report.mode, "RL_TRAINING");
    assert!(report.auto_execute);
    assert_eq!(report.area, "Lumbridge");
    assert_eq!((report.x, report.y), (3222, 3218));
    assert_eq!(report.goal.as_deref(), Some("Train mining"));
    assert_eq!(report.last_action, [1, 0, 0, 0]);
    assert_eq!(report.last_action_label, "Mine Copper rocks");
    assert_eq!(report.step_count, 1);
    assert!(report.next_break_in_ms > 0);
    assert!(report
        .to_text_lines()
        .contains(&"Action: Mine Copper rocks".to_string()));
}
