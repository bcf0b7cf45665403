use serde::{Deserialize, Serialize};

/// Raw numeric effect id as it appears in the account export (main stat,
/// substat, or artifact effect families all share this id space).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EffectId(pub u16);

/// The nameable main-stat keys a build can restrict a slot or artifact to.
/// Unknown effect ids map to `None` and are rejected at `Build` load time
/// rather than silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MainStatKey {
    HpFlat,
    HpPct,
    AtkFlat,
    AtkPct,
    DefFlat,
    DefPct,
    Spd,
    Cr,
    Cd,
    Res,
    Acc,
}

impl MainStatKey {
    /// `STAT_SCORE_WEIGHTS` from the reference scoring table.
    pub fn score_weight(self) -> i64 {
        match self {
            MainStatKey::HpFlat => 1,
            MainStatKey::HpPct => 8,
            MainStatKey::AtkFlat => 1,
            MainStatKey::AtkPct => 8,
            MainStatKey::DefFlat => 1,
            MainStatKey::DefPct => 8,
            MainStatKey::Spd => 18,
            MainStatKey::Cr => 10,
            MainStatKey::Cd => 9,
            MainStatKey::Res => 4,
            MainStatKey::Acc => 4,
        }
    }

    /// Percentage-scaling stats require the CP model's base*pct/100 term;
    /// flat stats add directly.
    pub fn is_percentage(self) -> bool {
        matches!(self, MainStatKey::HpPct | MainStatKey::AtkPct | MainStatKey::DefPct)
    }

    /// Even slots (2/4/6) only accept these keys as a "good" mainstat; any
    /// other key on an even slot draws the flat-mainstat penalty unless the
    /// active build forces it.
    pub fn is_good_even_slot_mainstat(self) -> bool {
        matches!(
            self,
            MainStatKey::HpPct
                | MainStatKey::AtkPct
                | MainStatKey::DefPct
                | MainStatKey::Spd
                | MainStatKey::Cr
                | MainStatKey::Cd
                | MainStatKey::Res
                | MainStatKey::Acc
        )
    }

    pub fn from_effect_id(id: EffectId) -> Option<MainStatKey> {
        Some(match id.0 {
            1 => MainStatKey::HpFlat,
            2 => MainStatKey::HpPct,
            3 => MainStatKey::AtkFlat,
            4 => MainStatKey::AtkPct,
            5 => MainStatKey::DefFlat,
            6 => MainStatKey::DefPct,
            8 => MainStatKey::Spd,
            9 => MainStatKey::Cr,
            10 => MainStatKey::Cd,
            11 => MainStatKey::Res,
            12 => MainStatKey::Acc,
            _ => return None,
        })
    }
}

/// `(effect_id, value)` pair: a rune main/prefix effect or an artifact
/// primary effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub effect_id: EffectId,
    pub value: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_ids_and_rejects_unknown() {
        assert_eq!(MainStatKey::from_effect_id(EffectId(8)), Some(MainStatKey::Spd));
        assert_eq!(MainStatKey::from_effect_id(EffectId(999)), None);
    }

    #[test]
    fn flat_mainstats_are_not_good_even_slot_stats() {
        assert!(!MainStatKey::HpFlat.is_good_even_slot_mainstat());
        assert!(MainStatKey::Spd.is_good_even_slot_mainstat());
    }
}
