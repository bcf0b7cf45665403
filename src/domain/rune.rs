use super::effect::{Effect, EffectId, MainStatKey};
use super::ids::{MonsterId, RuneId, Slot};
use serde::{Deserialize, Serialize};

/// Rune set. `Other` covers any set id the scoring/piece tables don't name
/// explicitly; such sets still participate in set-option matching via their
/// raw id, just without a quality bonus or a non-default piece count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SetId {
    Swift,
    Violent,
    Will,
    Despair,
    Revenge,
    Vampire,
    Rage,
    Fatal,
    Energy,
    Guard,
    Endure,
    Focus,
    Shield,
    Intangible,
    Other(u16),
}

impl SetId {
    /// `SET_SCORE_BONUS`, pinned to the reference weights.
    pub fn quality_bonus(self) -> i64 {
        match self {
            SetId::Swift => 160,
            SetId::Violent => 140,
            SetId::Will => 90,
            SetId::Despair => 80,
            SetId::Revenge => 70,
            SetId::Vampire => 70,
            SetId::Rage => 60,
            SetId::Fatal => 60,
            _ => 0,
        }
    }

    /// Number of runes of this set required to activate its bonus.
    pub fn required_pieces(self) -> u8 {
        match self {
            SetId::Will | SetId::Energy | SetId::Guard | SetId::Endure | SetId::Focus | SetId::Shield => 2,
            SetId::Intangible => 1,
            _ => 4,
        }
    }

    pub fn is_intangible(self) -> bool {
        matches!(self, SetId::Intangible)
    }
}

/// Normal / Magic / Rare / Hero / Legend, with an optional ancient modifier
/// that does not change the base class ranking used in scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualityClass {
    Normal,
    Magic,
    Rare,
    Hero,
    Legend,
}

impl QualityClass {
    pub fn rank(self) -> i64 {
        match self {
            QualityClass::Normal => 1,
            QualityClass::Magic => 2,
            QualityClass::Rare => 3,
            QualityClass::Hero => 4,
            QualityClass::Legend => 5,
        }
    }
}

/// One of up to four substat rolls. `grind` is the accumulated grindstone
/// bonus applied on top of the base roll value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubEffect {
    pub effect_id: EffectId,
    pub base_value: i32,
    pub gemmed: bool,
    pub grind_value: i32,
}

impl SubEffect {
    pub fn total_value(&self) -> i32 {
        self.base_value + self.grind_value
    }
}

/// Current owner of a rune/artifact in the source snapshot. `Nobody` means
/// unequipped inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occupant {
    Nobody,
    Unit(MonsterId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rune {
    pub rune_id: RuneId,
    pub slot_no: Slot,
    pub set_id: SetId,
    pub quality_class: QualityClass,
    pub rank: i32,
    pub upgrade_level: u8,
    pub main_effect: Effect,
    pub prefix_effect: Option<Effect>,
    pub sub_effects: Vec<SubEffect>,
    pub occupant: Occupant,
}

const MAINSTAT_PROJECTION_UPGRADE_THRESHOLD: u8 = 12;
const MAINSTAT_PROJECTION_LEVEL: u8 = 15;

impl Rune {
    pub fn main_stat_key(&self) -> Option<MainStatKey> {
        MainStatKey::from_effect_id(self.main_effect.effect_id)
    }

    /// Flat SPD contribution from main, prefix, substats and grind, with
    /// main-stat projection to +15 when the rune is upgraded past +12.
    pub fn flat_spd_contribution(&self) -> i32 {
        let mut total = 0;
        if self.main_effect.effect_id == EffectId(8) {
            total += self.projected_main_value();
        }
        if let Some(prefix) = self.prefix_effect {
            if prefix.effect_id == EffectId(8) {
                total += prefix.value;
            }
        }
        for sub in &self.sub_effects {
            if sub.effect_id == EffectId(8) {
                total += sub.total_value();
            }
        }
        total
    }

    fn projected_main_value(&self) -> i32 {
        if self.upgrade_level >= MAINSTAT_PROJECTION_UPGRADE_THRESHOLD {
            self.main_value_at_level(MAINSTAT_PROJECTION_LEVEL)
        } else {
            self.main_effect.value
        }
    }

    /// Linear projection of the main stat value to a target upgrade level,
    /// assuming even per-level growth from +0. Runes below +12 report their
    /// actual current roll rather than a projected one.
    fn main_value_at_level(&self, level: u8) -> i32 {
        if self.upgrade_level == 0 {
            return self.main_effect.value;
        }
        (self.main_effect.value as i64 * level as i64 / self.upgrade_level.max(1) as i64) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spd_rune(slot: u8, main_spd: i32, upgrade: u8) -> Rune {
        Rune {
            rune_id: RuneId(1),
            slot_no: Slot::new(slot).unwrap(),
            set_id: SetId::Swift,
            quality_class: QualityClass::Legend,
            rank: 6,
            upgrade_level: upgrade,
            main_effect: Effect { effect_id: EffectId(8), value: main_spd },
            prefix_effect: None,
            sub_effects: vec![],
            occupant: Occupant::Nobody,
        }
    }

    #[test]
    fn flat_spd_sums_main_prefix_sub_and_grind() {
        let mut r = spd_rune(2, 20, 15);
        r.prefix_effect = Some(Effect { effect_id: EffectId(8), value: 3 });
        r.sub_effects.push(SubEffect { effect_id: EffectId(8), base_value: 5, gemmed: false, grind_value: 2 });
        assert_eq!(r.flat_spd_contribution(), 20 + 3 + 7);
    }

    #[test]
    fn non_spd_main_slot_contributes_nothing_from_main() {
        let r = spd_rune(2, 0, 15);
        assert_eq!(r.flat_spd_contribution(), 0);
    }

    #[test]
    fn swift_requires_four_pieces_and_intangible_requires_one() {
        assert_eq!(SetId::Swift.required_pieces(), 4);
        assert_eq!(SetId::Intangible.required_pieces(), 1);
    }
}
