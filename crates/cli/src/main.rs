mod script;

use anyhow::Context;
use osrsml_autoplay::{
    write_status, AgentConfig, ControlCommand, InputBackend, Session, TcpPolicyClient,
    TickOutcome,
};
use osrsml_core::{Mode, ScreenPoint};
use script::ScriptedHost;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

const DEFAULT_TICK_MS: u64 = 600;

#[derive(Debug, Default, PartialEq)]
struct CliOptions {
    script: Option<PathBuf>,
    config: Option<PathBuf>,
    policy: Option<String>,
    tick_ms: Option<u64>,
    max_ticks: Option<u64>,
    mode: Option<Mode>,
    auto: bool,
    no_input: bool,
    status_file: Option<PathBuf>,
    seed: Option<u64>,
}

fn parse_cli_options(args: &[String]) -> CliOptions {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        let value = args.get(idx + 1);
        let mut consumed = value.is_some();
        match (args[idx].as_str(), value) {
            ("--auto", _) => {
                options.auto = true;
                consumed = false;
            }
            ("--no-input", _) => {
                options.no_input = true;
                consumed = false;
            }
            ("--script", Some(value)) => options.script = Some(PathBuf::from(value)),
            ("--config", Some(value)) => options.config = Some(PathBuf::from(value)),
            ("--policy", Some(value)) => options.policy = Some(value.clone()),
            ("--tick-ms", Some(value)) => options.tick_ms = value.parse().ok(),
            ("--ticks", Some(value)) => options.max_ticks = value.parse().ok(),
            ("--mode", Some(value)) => options.mode = Mode::from_name(value),
            ("--status-file", Some(value)) => options.status_file = Some(PathBuf::from(value)),
            ("--seed", Some(value)) => options.seed = value.parse().ok(),
            _ => consumed = false,
        }
        idx += if consumed { 2 } else { 1 };
    }
    options
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConsoleInput {
    Command(ControlCommand),
    Status,
    Quit,
}

fn parse_console_line(line: &str) -> Option<ConsoleInput> {
    match line.trim().to_ascii_lowercase().as_str() {
        "status" | "s" => Some(ConsoleInput::Status),
        "quit" | "q" | "exit" => Some(ConsoleInput::Quit),
        other => ControlCommand::parse(other).map(ConsoleInput::Command),
    }
}

/// Reads commands on a separate thread so the tick loop never blocks on stdin.
fn spawn_console_reader() -> Receiver<ConsoleInput> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match parse_console_line(&line) {
                Some(input) => {
                    if tx.send(input).is_err() {
                        break;
                    }
                }
                None if line.trim().is_empty() => {}
                None => tracing::warn!(input = %line.trim(), "unknown command"),
            }
        }
    });
    rx
}

/// Stands in for a real pointer driver: tracks a virtual cursor and logs
/// presses.
#[derive(Debug, Default)]
struct LogBackend {
    pointer: Mutex<ScreenPoint>,
}

impl InputBackend for LogBackend {
    fn pointer_position(&self) -> Option<ScreenPoint> {
        self.pointer.lock().ok().map(|pointer| *pointer)
    }

    fn move_pointer(&self, point: ScreenPoint) {
        if let Ok(mut pointer) = self.pointer.lock() {
            *pointer = point;
        }
        tracing::trace!(x = point.x, y = point.y, "pointer moved");
    }

    fn press(&self) {
        let point = self.pointer_position().unwrap_or_default();
        tracing::debug!(x = point.x, y = point.y, "press");
    }

    fn release(&self) {
        tracing::debug!("release");
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as u64)
}

fn load_config(options: &CliOptions) -> anyhow::Result<AgentConfig> {
    let mut config = match &options.config {
        Some(path) => {
            let body = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            AgentConfig::from_json(&body)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => AgentConfig::default(),
    };
    if let Some(address) = &options.policy {
        let (host, port) = address
            .rsplit_once(':')
            .with_context(|| format!("policy address must be HOST:PORT, got {address}"))?;
        config.policy.host = host.to_string();
        config.policy.port = port
            .parse()
            .with_context(|| format!("invalid policy port {port}"))?;
    }
    if options.seed.is_some() {
        config.seed = options.seed;
    }
    config.validate()?;
    Ok(config)
}

fn print_status(session: &Session, now: u64) {
    for line in session.status(now).to_text_lines() {
        println!("{line}");
    }
}

fn write_status_file(path: &Path, session: &Session, now: u64) {
    if let Err(err) = write_status(path, &session.status(now)) {
        tracing::warn!(path = %path.display(), error = %err, "status write failed");
    }
}

fn run(options: CliOptions) -> anyhow::Result<()> {
    let script = options
        .script
        .as_deref()
        .context("--script PATH is required")?;
    let mut host = ScriptedHost::load(script)?;
    let config = load_config(&options)?;
    let mut policy = TcpPolicyClient::from_config(&config.policy);
    let backend: Option<Arc<dyn InputBackend>> = if options.no_input {
        None
    } else {
        Some(Arc::new(LogBackend::default()))
    };
    let mut session = Session::new(config, backend, now_ms())?;
    if let Some(mode) = options.mode {
        session.set_mode(mode);
    }
    session.set_auto_execute(options.auto);
    tracing::info!(
        policy = policy.address(),
        mode = session.mode().name(),
        auto = session.auto_execute(),
        "session started"
    );

    let console = spawn_console_reader();
    let mut console_open = true;
    let tick = Duration::from_millis(options.tick_ms.unwrap_or(DEFAULT_TICK_MS).max(1));
    let mut ticks = 0u64;
    loop {
        while console_open {
            match console.try_recv() {
                Ok(ConsoleInput::Command(command)) => {
                    session.apply_command(command, &mut host, now_ms())
                }
                Ok(ConsoleInput::Status) => print_status(&session, now_ms()),
                Ok(ConsoleInput::Quit) => {
                    print_status(&session, now_ms());
                    return Ok(());
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => console_open = false,
            }
        }

        host.advance();
        let now = now_ms();
        match session.on_tick(&mut host, &mut policy, now) {
            outcome @ (TickOutcome::Walk { .. }
            | TickOutcome::Click { .. }
            | TickOutcome::NoTarget { .. }) => {
                tracing::debug!(?outcome, "tick acted");
            }
            outcome => tracing::trace!(?outcome, "tick"),
        }
        if let Some(path) = &options.status_file {
            write_status_file(path, &session, now);
        }

        ticks += 1;
        if options.max_ticks.is_some_and(|max| ticks >= max) {
            session.wait_for_input();
            print_status(&session, now_ms());
            return Ok(());
        }
        thread::sleep(tick);
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    run(parse_cli_options(&args))
}
