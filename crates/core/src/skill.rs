use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Skill {
    Attack,
    Defence,
    Strength,
    Hitpoints,
    Ranged,
    Prayer,
    Magic,
    Cooking,
    Woodcutting,
    Fletching,
    Fishing,
    Firemaking,
    Crafting,
    Smithing,
    Mining,
    Herblore,
    Agility,
    Thieving,
    Slayer,
    Farming,
    Runecraft,
    Hunter,
    Construction,
    Overall,
}

impl Skill {
    pub const ALL: [Skill; 24] = [
        Skill::Attack,
        Skill::Defence,
        Skill::Strength,
        Skill::Hitpoints,
        Skill::Ranged,
        Skill::Prayer,
        Skill::Magic,
        Skill::Cooking,
        Skill::Woodcutting,
        Skill::Fletching,
        Skill::Fishing,
        Skill::Firemaking,
        Skill::Crafting,
        Skill::Smithing,
        Skill::Mining,
        Skill::Herblore,
        Skill::Agility,
        Skill::Thieving,
        Skill::Slayer,
        Skill::Farming,
        Skill::Runecraft,
        Skill::Hunter,
        Skill::Construction,
        Skill::Overall,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Attack => "Attack",
            Self::Defence => "Defence",
            Self::Strength => "Strength",
            Self::Hitpoints => "Hitpoints",
            Self::Ranged => "Ranged",
            Self::Prayer => "Prayer",
            Self::Magic => "Magic",
            Self::Cooking => "Cooking",
            Self::Woodcutting => "Woodcutting",
            Self::Fletching => "Fletching",
            Self::Fishing => "Fishing",
            Self::Firemaking => "Firemaking",
            Self::Crafting => "Crafting",
            Self::Smithing => "Smithing",
            Self::Mining => "Mining",
            Self::Herblore => "Herblore",
            Self::Agility => "Agility",
            Self::Thieving => "Thieving",
            Self::Slayer => "Slayer",
            Self::Farming => "Farming",
            Self::Runecraft => "Runecraft",
            Self::Hunter => "Hunter",
            Self::Construction => "Construction",
            Self::Overall => "Overall",
        }
    }

    /// Aggregate skills summarise the others and are never reported on their own.
    pub fn is_aggregate(self) -> bool {
        matches!(self, Self::Overall)
    }
}
