use super::effect::{EffectId, MainStatKey};
use super::ids::{ArtifactKind, Slot};
use super::rune::SetId;
use crate::tick::TickBucket;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An ordered set-combination: each entry names a set id and the piece
/// count it requires under this option (so `[(Swift,4)]`,
/// `[(Violent,4)]`, or a mixed `[(Swift,4),(Will,2)]`). Total required
/// pieces across all entries must be <= 6; callers are responsible for
/// constructing valid options, the solver just consumes them.
pub type SetOption = Vec<(SetId, u8)>;

/// Soft/hard floors a build imposes on a monster's final stats.
/// "with-base" variants include the monster's own base stat; "no-base"
/// variants only count rune/artifact/totem/leader contributions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MinStats {
    pub hp: Option<i32>,
    pub hp_no_base: Option<i32>,
    pub atk: Option<i32>,
    pub atk_no_base: Option<i32>,
    pub def: Option<i32>,
    pub def_no_base: Option<i32>,
    pub spd: Option<i32>,
    pub spd_no_base: Option<i32>,
    pub cr: Option<i32>,
    pub cd: Option<i32>,
    pub res: Option<i32>,
    pub acc: Option<i32>,
}

/// Per-monster, per-mode build request: acceptable set combinations, main
/// stat restrictions, artifact preferences, stat floors, and a speed-tick
/// target, plus the scalar fields that drive sequencing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Build {
    pub name: String,
    pub set_options: Vec<SetOption>,
    pub mainstats: BTreeMap<Slot, Vec<MainStatKey>>,
    pub artifact_focus: BTreeMap<ArtifactKind, Vec<super::artifact::FocusKey>>,
    pub artifact_substats: BTreeMap<ArtifactKind, Vec<EffectId>>,
    pub min_stats: MinStats,
    pub spd_tick: Option<TickBucket>,
    pub priority: i32,
    pub turn_order: i32,
    pub optimize_order: i32,
}

impl Build {
    pub fn mainstats_for(&self, slot: Slot) -> Option<&[MainStatKey]> {
        self.mainstats.get(&slot).map(|v| v.as_slice())
    }

    pub fn restricts_slot(&self, slot: Slot) -> bool {
        self.mainstats.contains_key(&slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrestricted_slot_allows_any_mainstat() {
        let build = Build::default();
        assert!(!build.restricts_slot(Slot::new(2).unwrap()));
        assert_eq!(build.mainstats_for(Slot::new(2).unwrap()), None);
    }
}
