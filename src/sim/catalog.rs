//! Static game catalogs
//!
//! Block types, pickaxe tiers and resource kinds are fixed tables referenced
//! by enum value. Nothing here is mutated at runtime.

use serde::{Deserialize, Serialize};

use crate::consts::HP_PER_HARDNESS;

/// Properties of a block type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockTypeDef {
    pub name: &'static str,
    pub color: [u8; 3],
    pub hardness: i32,
    /// Relative spawn probability
    pub spawn_weight: f64,
}

/// Block types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BlockType {
    Iron,
    Copper,
    Gold,
    Coal,
    Redstone,
    Lapis,
    Diamond,
    Emerald,
    Obsidian,
    Cobble,
    Stone,
    Stone2,
    Stone3,
}

const BLOCK_TYPE_DEFS: [BlockTypeDef; 13] = [
    BlockTypeDef {
        name: "iron",
        color: [210, 210, 210],
        hardness: 3,
        spawn_weight: 0.08,
    },
    BlockTypeDef {
        name: "copper",
        color: [184, 115, 51],
        hardness: 2,
        spawn_weight: 0.07,
    },
    BlockTypeDef {
        name: "gold",
        color: [255, 215, 0],
        hardness: 2,
        spawn_weight: 0.03,
    },
    BlockTypeDef {
        name: "coal",
        color: [45, 45, 45],
        hardness: 1,
        spawn_weight: 0.1,
    },
    BlockTypeDef {
        name: "redstone",
        color: [255, 0, 0],
        hardness: 2,
        spawn_weight: 0.05,
    },
    BlockTypeDef {
        name: "lapis",
        color: [0, 0, 255],
        hardness: 3,
        spawn_weight: 0.02,
    },
    BlockTypeDef {
        name: "diamond",
        color: [0, 255, 255],
        hardness: 4,
        spawn_weight: 0.008,
    },
    BlockTypeDef {
        name: "emerald",
        color: [0, 255, 0],
        hardness: 4,
        spawn_weight: 0.003,
    },
    BlockTypeDef {
        name: "obsidian",
        color: [25, 0, 45],
        hardness: 18,
        spawn_weight: 0.03,
    },
    BlockTypeDef {
        name: "cobble",
        color: [130, 130, 130],
        hardness: 2,
        spawn_weight: 0.1,
    },
    BlockTypeDef {
        name: "stone",
        color: [100, 100, 100],
        hardness: 2,
        spawn_weight: 0.45,
    },
    BlockTypeDef {
        name: "stone2",
        color: [110, 110, 110],
        hardness: 2,
        spawn_weight: 0.15,
    },
    BlockTypeDef {
        name: "stone3",
        color: [90, 90, 90],
        hardness: 2,
        spawn_weight: 0.15,
    },
];

impl BlockType {
    /// Every block type, in catalog order
    pub const ALL: [BlockType; 13] = [
        BlockType::Iron,
        BlockType::Copper,
        BlockType::Gold,
        BlockType::Coal,
        BlockType::Redstone,
        BlockType::Lapis,
        BlockType::Diamond,
        BlockType::Emerald,
        BlockType::Obsidian,
        BlockType::Cobble,
        BlockType::Stone,
        BlockType::Stone2,
        BlockType::Stone3,
    ];

    pub fn def(self) -> &'static BlockTypeDef {
        &BLOCK_TYPE_DEFS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.def().name
    }

    pub fn color(self) -> [u8; 3] {
        self.def().color
    }

    pub fn hardness(self) -> i32 {
        self.def().hardness
    }

    pub fn spawn_weight(self) -> f64 {
        self.def().spawn_weight
    }

    /// Starting health of a block of this type
    pub fn max_health(self) -> i32 {
        (self.hardness() * HP_PER_HARDNESS).max(1)
    }

    /// What breaking this block yields
    pub fn yield_kind(self) -> Yield {
        match self {
            BlockType::Coal => Yield::Fixed(ResourceKind::Coal, 1),
            BlockType::Iron => Yield::Fixed(ResourceKind::Iron, 1),
            BlockType::Copper => Yield::Fixed(ResourceKind::Copper, 1),
            BlockType::Gold => Yield::Fixed(ResourceKind::Gold, 1),
            BlockType::Diamond => Yield::Fixed(ResourceKind::Diamond, 1),
            BlockType::Emerald => Yield::Fixed(ResourceKind::Emerald, 1),
            BlockType::Lapis => Yield::Random(ResourceKind::Lapis),
            BlockType::Redstone => Yield::Random(ResourceKind::Redstone),
            BlockType::Obsidian
            | BlockType::Cobble
            | BlockType::Stone
            | BlockType::Stone2
            | BlockType::Stone3 => Yield::Nothing,
        }
    }
}

/// Resource credited when a block breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Yield {
    Nothing,
    Fixed(ResourceKind, u32),
    /// Amount rolled from the tuned rare-ore range
    Random(ResourceKind),
}

/// Resource kinds tracked by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Coal,
    Iron,
    Copper,
    Gold,
    Diamond,
    Emerald,
    Lapis,
    Redstone,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 8] = [
        ResourceKind::Coal,
        ResourceKind::Iron,
        ResourceKind::Copper,
        ResourceKind::Gold,
        ResourceKind::Diamond,
        ResourceKind::Emerald,
        ResourceKind::Lapis,
        ResourceKind::Redstone,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Coal => "coal",
            ResourceKind::Iron => "iron",
            ResourceKind::Copper => "copper",
            ResourceKind::Gold => "gold",
            ResourceKind::Diamond => "diamond",
            ResourceKind::Emerald => "emerald",
            ResourceKind::Lapis => "lapis",
            ResourceKind::Redstone => "redstone",
        }
    }
}

/// Pickaxe upgrade tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToolTier {
    #[default]
    Wood,
    Stone,
    Iron,
    Gold,
    Diamond,
    Netherite,
}

impl ToolTier {
    pub const ALL: [ToolTier; 6] = [
        ToolTier::Wood,
        ToolTier::Stone,
        ToolTier::Iron,
        ToolTier::Gold,
        ToolTier::Diamond,
        ToolTier::Netherite,
    ];

    /// Tier for a 0-based selector index, `None` when out of range
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Damage dealt per strike
    pub fn strike_power(&self) -> i32 {
        match self {
            ToolTier::Wood => 1,
            ToolTier::Stone => 2,
            ToolTier::Iron => 3,
            ToolTier::Gold => 6,
            ToolTier::Diamond => 5,
            ToolTier::Netherite => 9,
        }
    }

    pub fn color(&self) -> [u8; 3] {
        match self {
            ToolTier::Wood => [139, 69, 19],
            ToolTier::Stone => [100, 100, 100],
            ToolTier::Iron => [210, 210, 210],
            ToolTier::Gold => [255, 215, 0],
            ToolTier::Diamond => [0, 255, 255],
            ToolTier::Netherite => [70, 0, 50],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolTier::Wood => "wood",
            ToolTier::Stone => "stone",
            ToolTier::Iron => "iron",
            ToolTier::Gold => "gold",
            ToolTier::Diamond => "diamond",
            ToolTier::Netherite => "netherite",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(s))
    }
}

/// Pickaxe size classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToolSize {
    #[default]
    Compact,
    Large,
}

impl ToolSize {
    /// Edge length multiplier relative to one block
    pub fn scale(&self, large_scale: f32) -> f32 {
        match self {
            ToolSize::Compact => 1.0,
            ToolSize::Large => large_scale,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "small" | "compact" => Some(ToolSize::Compact),
            "large" | "big" => Some(ToolSize::Large),
            _ => None,
        }
    }
}
