use serde::{Deserialize, Serialize};

/// Raw four-slot action vector returned by the policy service.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionCommand(pub [i32; 4]);

impl ActionCommand {
    pub fn new(category: i32, sub_action: i32, param2: i32, param3: i32) -> Self {
        Self([category, sub_action, param2, param3])
    }

    /// Missing slots read as zero; slots past the fourth are ignored.
    pub fn from_slots(slots: &[i32]) -> Self {
        let mut raw = [0; 4];
        for (dst, src) in raw.iter_mut().zip(slots) {
            *dst = *src;
        }
        Self(raw)
    }

    pub fn category(&self) -> i32 {
        self.0[0]
    }

    pub fn sub_action(&self) -> i32 {
        self.0[1]
    }

    pub fn kind(&self) -> ActionCategory {
        ActionCategory::from_command(self)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GatherKind {
    Mining,
    Fishing,
    Woodcutting,
    AnyRock,
}

impl GatherKind {
    pub fn from_sub_action(sub: i32) -> Self {
        match sub {
            0 => Self::Mining,
            1 => Self::Fishing,
            2 => Self::Woodcutting,
            _ => Self::AnyRock,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActionCategory {
    Wait,
    Gather(GatherKind),
    Engage,
    Dialog,
    Bank,
    Walk,
    OpenBarrier,
    EatFood,
    Idle,
}

impl ActionCategory {
    pub fn from_command(command: &ActionCommand) -> Self {
        match command.category() {
            0 => Self::Wait,
            1 => Self::Gather(GatherKind::from_sub_action(command.sub_action())),
            2 => Self::Engage,
            3 => Self::Dialog,
            4 => Self::Bank,
            5 => Self::Walk,
            6 => Self::OpenBarrier,
            8 => Self::EatFood,
            _ => Self::Idle,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalkTarget {
    pub x: i32,
    pub y: i32,
    pub label: String,
}

/// Decoded reply from the policy service.
///
/// `walk_target` is only meaningful when `stay_here` is false; nothing on the
/// wire enforces that, so callers check `stay_here` first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PolicyResponse {
    pub goal: Option<String>,
    pub walk_target: Option<WalkTarget>,
    pub stay_here: bool,
    pub action: Option<ActionCommand>,
}
