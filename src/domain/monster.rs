use super::ids::MonsterId;
use serde::{Deserialize, Serialize};

/// Elemental attribute. Only used by callers that filter by element; the
/// core never branches on it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attribute {
    Water,
    Fire,
    Wind,
    Light,
    Dark,
}

/// Role tag used to switch between offensive and defensive scoring weights.
/// `Unknown` falls back to the offensive weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Archetype {
    Attack,
    Defense,
    Hp,
    Support,
    #[default]
    Unknown,
}

impl Archetype {
    /// Archetypes that switch scoring to the defensive proxy.
    pub fn is_defensive(self) -> bool {
        matches!(self, Archetype::Support | Archetype::Hp | Archetype::Defense)
    }
}

/// Base (unrune) combat stats, before any rune, artifact, totem, or leader
/// contribution. `con` is the raw constitution stat the in-game HP formula
/// scales by 15 to produce base HP; that formula lives here because it is
/// a fixed constant of the data model, not one of the out-of-scope combat
/// simulation formulas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    pub con: i32,
    pub atk: i32,
    pub def: i32,
    pub spd: i32,
    pub cr: i32,
    pub cd: i32,
    pub res: i32,
    pub acc: i32,
}

const HP_PER_CON: i32 = 15;

impl BaseStats {
    pub fn hp(&self) -> i32 {
        self.con * HP_PER_CON
    }
}

/// Immutable monster record. Created once by the importer (out of scope
/// here) and referenced by id everywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub id: MonsterId,
    pub master_id: u32,
    pub attribute: Attribute,
    pub class: u8,
    pub stars: u8,
    pub base: BaseStats,
    pub archetype: Archetype,
}
