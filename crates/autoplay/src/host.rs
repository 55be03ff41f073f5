use osrsml_core::{GameEvent, ScreenPoint, Snapshot, WorldPoint};

/// The game client, queried once per tick and never owned by the loop.
pub trait GameHost {
    /// True while a logged-in session is available.
    fn session_ready(&self) -> bool;

    /// `None` while the scene is between states.
    fn snapshot(&self) -> Option<Snapshot>;

    /// Canvas-relative projection of a world tile, if it is loaded.
    fn project_tile(&self, tile: WorldPoint) -> Option<ScreenPoint>;

    /// Chat and stat notifications observed since the last call, oldest first.
    fn drain_events(&mut self) -> Vec<GameEvent>;

    fn notify(&mut self, message: &str);
}

/// Edge-triggered user commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    CycleMode,
    ResetEpisode,
    ToggleAutoExecute,
}

impl ControlCommand {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "mode" | "m" | "f5" => Some(Self::CycleMode),
            "reset" | "r" | "f6" => Some(Self::ResetEpisode),
            "auto" | "a" | "f8" => Some(Self::ToggleAutoExecute),
            _ => None,
        }
    }
}
