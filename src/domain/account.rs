use super::artifact::Artifact;
use super::ids::{ArtifactId, MonsterId, RuneId};
use super::monster::Monster;
use super::rune::Rune;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Optimisation mode; also indexes mode-specific rune exclusion sets in
/// the pruner and mode-specific equipment maps below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Mode {
    Siege,
    Wgb,
    Rta,
    ArenaRush,
    Team,
}

/// All monsters, runes and artifacts in an account snapshot, plus the
/// mode-specific current-equipment maps the scoring model's "currently
/// equipped" bonus reads. Built once by an importer (out of scope) and
/// never mutated afterward.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountData {
    pub monsters: BTreeMap<MonsterId, Monster>,
    pub runes: Vec<Rune>,
    pub artifacts: Vec<Artifact>,
    pub guild_rune_equip: BTreeMap<MonsterId, Vec<RuneId>>,
    pub rta_rune_equip: BTreeMap<MonsterId, Vec<RuneId>>,
    pub rta_artifact_equip: BTreeMap<MonsterId, Vec<ArtifactId>>,
    pub arena_defense_team: Vec<MonsterId>,
    pub arena_offense_decks: Vec<Vec<MonsterId>>,
    pub sky_tribe_totem_spd_pct: i32,
}

impl AccountData {
    pub fn monster(&self, id: MonsterId) -> Option<&Monster> {
        self.monsters.get(&id)
    }

    pub fn runes_by_id(&self) -> BTreeMap<RuneId, &Rune> {
        self.runes.iter().map(|r| (r.rune_id, r)).collect()
    }

    pub fn artifacts_by_id(&self) -> BTreeMap<ArtifactId, &Artifact> {
        self.artifacts.iter().map(|a| (a.artifact_id, a)).collect()
    }

    /// Rune ids currently equipped on `unit` under the RTA mode's dedicated
    /// equipment map, used by the scoring model's RTA "currently equipped"
    /// branch.
    pub fn rta_rune_ids_for(&self, unit: MonsterId) -> &[RuneId] {
        self.rta_rune_equip.get(&unit).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_account_has_no_monsters() {
        let account = AccountData::default();
        assert!(account.monster(MonsterId(1)).is_none());
        assert!(account.rta_rune_ids_for(MonsterId(1)).is_empty());
    }
}
