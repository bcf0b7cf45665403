use crate::domain::{ArtifactId, ArtifactKind, MonsterId, RuneId, Slot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot of a previously accepted assignment, consulted by both the CP
/// solver's objective and `PassScore` so a refinement pass never drifts
/// away from a known-good build purely by tie-breaking noise: every slot
/// that matches the baseline earns `weight`, which is
/// tuned large enough to dominate any quality/efficiency delta smaller
/// than a genuine upgrade.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaselineGuard {
    runes_by_unit: BTreeMap<MonsterId, BTreeMap<Slot, RuneId>>,
    artifacts_by_unit: BTreeMap<MonsterId, BTreeMap<ArtifactKind, ArtifactId>>,
    weight: i64,
}

impl BaselineGuard {
    pub fn new(weight: i64) -> Self {
        Self { runes_by_unit: BTreeMap::new(), artifacts_by_unit: BTreeMap::new(), weight }
    }

    pub fn set_baseline_rune(&mut self, unit: MonsterId, slot: Slot, rune_id: RuneId) {
        self.runes_by_unit.entry(unit).or_default().insert(slot, rune_id);
    }

    pub fn set_baseline_artifact(&mut self, unit: MonsterId, kind: ArtifactKind, artifact_id: ArtifactId) {
        self.artifacts_by_unit.entry(unit).or_default().insert(kind, artifact_id);
    }

    /// Retention reward for keeping `rune_id` in `slot` on `unit`, zero if
    /// there is no recorded baseline for that slot or the rune differs.
    pub fn rune_retention_bonus(&self, unit: MonsterId, slot: Slot, rune_id: RuneId) -> i64 {
        let retained = self
            .runes_by_unit
            .get(&unit)
            .and_then(|slots| slots.get(&slot))
            .is_some_and(|&baseline_id| baseline_id == rune_id);
        if retained { self.weight } else { 0 }
    }

    /// Retention reward for keeping `artifact_id` in `kind` on `unit`.
    pub fn artifact_retention_bonus(&self, unit: MonsterId, kind: ArtifactKind, artifact_id: ArtifactId) -> i64 {
        let retained = self
            .artifacts_by_unit
            .get(&unit)
            .and_then(|kinds| kinds.get(&kind))
            .is_some_and(|&baseline_id| baseline_id == artifact_id);
        if retained { self.weight } else { 0 }
    }

    /// Total retention reward for a full six-rune, two-artifact assignment
    /// on `unit`, used by `PassScore` to compare whole passes.
    pub fn total_bonus_for_unit(
        &self,
        unit: MonsterId,
        runes: &BTreeMap<Slot, RuneId>,
        artifacts: &BTreeMap<ArtifactKind, ArtifactId>,
    ) -> i64 {
        let rune_bonus: i64 = runes
            .iter()
            .map(|(&slot, &rune_id)| self.rune_retention_bonus(unit, slot, rune_id))
            .sum();
        let artifact_bonus: i64 = artifacts
            .iter()
            .map(|(&kind, &artifact_id)| self.artifact_retention_bonus(unit, kind, artifact_id))
            .sum();
        rune_bonus + artifact_bonus
    }

    pub fn has_baseline_for(&self, unit: MonsterId) -> bool {
        self.runes_by_unit.contains_key(&unit) || self.artifacts_by_unit.contains_key(&unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_rune_earns_weight_mismatched_does_not() {
        let mut guard = BaselineGuard::new(3000);
        let unit = MonsterId(1);
        let slot = Slot::new(2).unwrap();
        guard.set_baseline_rune(unit, slot, RuneId(42));

        assert_eq!(guard.rune_retention_bonus(unit, slot, RuneId(42)), 3000);
        assert_eq!(guard.rune_retention_bonus(unit, slot, RuneId(43)), 0);
        assert_eq!(guard.rune_retention_bonus(unit, Slot::new(1).unwrap(), RuneId(42)), 0);
    }

    #[test]
    fn unit_with_no_recorded_baseline_never_scores_a_bonus() {
        let guard = BaselineGuard::new(3000);
        assert!(!guard.has_baseline_for(MonsterId(9)));
        assert_eq!(guard.rune_retention_bonus(MonsterId(9), Slot::new(1).unwrap(), RuneId(1)), 0);
    }

    #[test]
    fn total_bonus_sums_across_slots_and_artifact_kinds() {
        let mut guard = BaselineGuard::new(100);
        let unit = MonsterId(1);
        let s1 = Slot::new(1).unwrap();
        let s2 = Slot::new(2).unwrap();
        guard.set_baseline_rune(unit, s1, RuneId(1));
        guard.set_baseline_rune(unit, s2, RuneId(2));
        guard.set_baseline_artifact(unit, ArtifactKind::Attribute, ArtifactId(10));

        let mut runes = BTreeMap::new();
        runes.insert(s1, RuneId(1));
        runes.insert(s2, RuneId(99));
        let mut artifacts = BTreeMap::new();
        artifacts.insert(ArtifactKind::Attribute, ArtifactId(10));

        assert_eq!(guard.total_bonus_for_unit(unit, &runes, &artifacts), 200);
    }
}
