use super::effect::{Effect, EffectId};
use super::ids::{ArtifactId, ArtifactKind};
use super::rune::Occupant;
use serde::{Deserialize, Serialize};

/// HP/ATK/DEF focus an attribute artifact's main stat can take, and the
/// focus a build can request of either artifact type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusKey {
    Hp,
    Atk,
    Def,
}

impl FocusKey {
    pub fn from_effect_id(id: EffectId) -> Option<FocusKey> {
        Some(match id.0 {
            1 | 2 | 100 => FocusKey::Hp,
            3 | 4 | 101 => FocusKey::Atk,
            5 | 6 | 102 => FocusKey::Def,
            _ => return None,
        })
    }
}

/// `(effect_id, value, rolls)` — one artifact secondary effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSubEffect {
    pub effect_id: EffectId,
    pub value: i32,
    pub rolls: u8,
}

/// Artifact sub-effect id carrying "SPD Increasing Effect +X%", consumed by
/// the Arena Rush opening-speed amplification model.
pub const SPD_BUFF_INCREASE_EFFECT_ID: EffectId = EffectId(206);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub artifact_id: ArtifactId,
    pub kind: ArtifactKind,
    pub attribute: Option<u8>,
    pub rank: i32,
    pub level: i32,
    pub original_rank: i32,
    pub pri_effect: Effect,
    pub sec_effects: Vec<ArtifactSubEffect>,
    pub occupant: Occupant,
}

impl Artifact {
    pub fn focus(&self) -> Option<FocusKey> {
        FocusKey::from_effect_id(self.pri_effect.effect_id)
    }

    pub fn sub_effect_ids(&self) -> impl Iterator<Item = EffectId> + '_ {
        self.sec_effects.iter().map(|s| s.effect_id)
    }

    /// Sum of all secondary-effect rolls matching `effect_id`, e.g. the
    /// total SPD-buff-increase percentage an artifact grants.
    pub fn total_sub_effect_value(&self, effect_id: EffectId) -> f64 {
        self.sec_effects
            .iter()
            .filter(|s| s.effect_id == effect_id)
            .map(|s| s.value as f64)
            .sum()
    }
}
