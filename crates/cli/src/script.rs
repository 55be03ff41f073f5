use anyhow::Context;
use osrsml_autoplay::GameHost;
use osrsml_core::{GameEvent, ScreenPoint, Snapshot, WorldPoint};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct TileProjection {
    pub tile: WorldPoint,
    pub point: ScreenPoint,
}

/// One recorded game tick. A frame without a snapshot plays back as a
/// loading screen.
#[derive(Debug, Clone, Deserialize)]
pub struct Frame {
    #[serde(default = "default_ready")]
    pub ready: bool,
    #[serde(default)]
    pub snapshot: Option<Snapshot>,
    #[serde(default)]
    pub events: Vec<GameEvent>,
    #[serde(default)]
    pub projections: Vec<TileProjection>,
}

fn default_ready() -> bool {
    true
}

/// Replays a recorded list of frames, wrapping around at the end.
#[derive(Debug)]
pub struct ScriptedHost {
    frames: Vec<Frame>,
    cursor: Option<usize>,
    pending: Vec<GameEvent>,
}

impl ScriptedHost {
    pub fn new(frames: Vec<Frame>) -> anyhow::Result<Self> {
        if frames.is_empty() {
            anyhow::bail!("script has no frames");
        }
        Ok(Self {
            frames,
            cursor: None,
            pending: Vec::new(),
        })
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let body = fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        let frames: Vec<Frame> = serde_json::from_str(&body)
            .with_context(|| format!("failed to parse script {}", path.display()))?;
        Self::new(frames)
    }

    /// Moves to the next frame and queues its events.
    pub fn advance(&mut self) {
        let next = match self.cursor {
            Some(idx) => (idx + 1) % self.frames.len(),
            None => 0,
        };
        self.cursor = Some(next);
        self.pending.extend(self.frames[next].events.iter().cloned());
    }

    fn current(&self) -> Option<&Frame> {
        self.cursor.map(|idx| &self.frames[idx])
    }
}

impl GameHost for ScriptedHost {
    fn session_ready(&self) -> bool {
        self.current().is_some_and(|frame| frame.ready)
    }

    fn snapshot(&self) -> Option<Snapshot> {
        self.current()?.snapshot.clone()
    }

    fn project_tile(&self, tile: WorldPoint) -> Option<ScreenPoint> {
        self.current()?
            .projections
            .iter()
            .find(|projection| projection.tile == tile)
            .map(|projection| projection.point)
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending)
    }

    fn notify(&mut self, message: &str) {
        tracing::info!(target: "osrsml::notify", "[ML] {message}");
    }
}
