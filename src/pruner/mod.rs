//! Candidate pruner: narrows an account's full rune/artifact
//! inventory down to what a single monster's solve actually needs to
//! consider, reporting empty buckets as data rather than panicking.

use crate::domain::{Artifact, ArtifactId, ArtifactKind, Rune, RuneId, SetId, Slot};
use crate::error::ErrorKind;
use crate::scoring::{efficiency_rune, EffVariant};
use std::collections::{BTreeMap, BTreeSet};

/// Per-mode/per-pass pruning policy. Mode exclusion sets are data the
/// caller loads (some sets are RTA-exclusive or siege-excluded), never a
/// hardcoded match on `Mode`.
#[derive(Debug, Clone, Default)]
pub struct PrunerConfig {
    pub mode_exclusions: BTreeMap<crate::domain::Mode, BTreeSet<SetId>>,
    /// Top-N runes kept per `(slot, set_id)` bucket, ranked by
    /// `prune_prescore`. Zero disables pruning entirely.
    pub rune_top_per_set: u32,
}

impl PrunerConfig {
    fn excluded_sets(&self, mode: crate::domain::Mode) -> &BTreeSet<SetId> {
        static EMPTY: BTreeSet<SetId> = BTreeSet::new();
        self.mode_exclusions.get(&mode).unwrap_or(&EMPTY)
    }
}

/// Unit-agnostic pre-score used only to rank candidates for top-N pruning,
/// never fed into the CP objective itself.
fn prune_prescore(rune: &Rune) -> i64 {
    let eff = efficiency_rune(rune, EffVariant::Current);
    (eff * 100.0) as i64 + rune.upgrade_level as i64 * 2 + rune.rank as i64 * 3 + rune.quality_class.rank() * 4
}

/// Rune and artifact candidates available to one monster's solve, already
/// partitioned the way the CP solver consumes them.
#[derive(Debug, Clone)]
pub struct CandidatePool<'a> {
    pub by_slot: [Vec<&'a Rune>; 6],
    pub by_type: [Vec<&'a Artifact>; 2],
}

impl<'a> CandidatePool<'a> {
    pub fn slot(&self, slot: Slot) -> &[&'a Rune] {
        &self.by_slot[slot.get() as usize - 1]
    }

    pub fn kind(&self, kind: ArtifactKind) -> &[&'a Artifact] {
        &self.by_type[kind as usize - 1]
    }
}

/// Builds the candidate pool for `mode`, excluding `excluded_runes`/
/// `excluded_artifacts` (already locked by another monster in the same
/// pass) and mode-ineligible sets, then optionally capping each
/// `(slot, set_id)` bucket at the configured top-N. Returns the pool plus
/// one diagnostic per empty bucket — pruning never decides fallback
/// policy, only reports facts.
pub fn prune<'a>(
    runes: &'a [Rune],
    artifacts: &'a [Artifact],
    mode: crate::domain::Mode,
    config: &PrunerConfig,
    excluded_runes: &BTreeSet<RuneId>,
    excluded_artifacts: &BTreeSet<ArtifactId>,
) -> (CandidatePool<'a>, Vec<ErrorKind>) {
    let excluded_sets = config.excluded_sets(mode);

    let mut by_slot: [Vec<&Rune>; 6] = Default::default();
    for rune in runes {
        if excluded_runes.contains(&rune.rune_id) || excluded_sets.contains(&rune.set_id) {
            continue;
        }
        by_slot[rune.slot_no.get() as usize - 1].push(rune);
    }

    if config.rune_top_per_set > 0 {
        for slot_candidates in &mut by_slot {
            let mut by_set: BTreeMap<SetId, Vec<&Rune>> = BTreeMap::new();
            for rune in slot_candidates.drain(..) {
                by_set.entry(rune.set_id).or_default().push(rune);
            }
            let mut kept = Vec::new();
            for (_, mut group) in by_set {
                group.sort_by_key(|r| std::cmp::Reverse(prune_prescore(r)));
                group.truncate(config.rune_top_per_set as usize);
                kept.extend(group);
            }
            *slot_candidates = kept;
        }
    }

    let mut by_type: [Vec<&Artifact>; 2] = Default::default();
    for artifact in artifacts {
        if excluded_artifacts.contains(&artifact.artifact_id) {
            continue;
        }
        by_type[artifact.kind as usize - 1].push(artifact);
    }

    let mut diagnostics = Vec::new();
    for slot in Slot::ALL {
        if by_slot[slot.get() as usize - 1].is_empty() {
            diagnostics.push(ErrorKind::SlotHasNoCandidates(slot));
        }
    }
    if by_type[ArtifactKind::Attribute as usize - 1].is_empty() {
        diagnostics.push(ErrorKind::NoAttributeArtifact);
    }
    if by_type[ArtifactKind::Type as usize - 1].is_empty() {
        diagnostics.push(ErrorKind::NoTypeArtifact);
    }

    (CandidatePool { by_slot, by_type }, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::*;

    fn rune(id: u32, slot: u8, set_id: SetId) -> Rune {
        Rune {
            rune_id: RuneId(id),
            slot_no: Slot::new(slot).unwrap(),
            set_id,
            quality_class: QualityClass::Legend,
            rank: 6,
            upgrade_level: 15,
            main_effect: Effect { effect_id: EffectId(8), value: 20 },
            prefix_effect: None,
            sub_effects: vec![],
            occupant: Occupant::Nobody,
        }
    }

    #[test]
    fn empty_slot_reports_a_diagnostic() {
        let runes = vec![rune(1, 1, SetId::Swift)];
        let artifacts = vec![];
        let config = PrunerConfig::default();
        let (pool, diagnostics) = prune(&runes, &artifacts, Mode::Siege, &config, &BTreeSet::new(), &BTreeSet::new());

        assert_eq!(pool.slot(Slot::new(1).unwrap()).len(), 1);
        assert!(pool.slot(Slot::new(2).unwrap()).is_empty());
        assert!(diagnostics.contains(&ErrorKind::SlotHasNoCandidates(Slot::new(2).unwrap())));
        assert!(diagnostics.contains(&ErrorKind::NoAttributeArtifact));
    }

    #[test]
    fn mode_exclusion_drops_an_entire_set() {
        let runes = vec![rune(1, 1, SetId::Swift), rune(2, 1, SetId::Violent)];
        let mut config = PrunerConfig::default();
        config.mode_exclusions.insert(Mode::Rta, BTreeSet::from([SetId::Swift]));
        let (pool, _) = prune(&runes, &[], Mode::Rta, &config, &BTreeSet::new(), &BTreeSet::new());
        assert_eq!(pool.slot(Slot::new(1).unwrap()).len(), 1);
        assert_eq!(pool.slot(Slot::new(1).unwrap())[0].rune_id, RuneId(2));
    }

    #[test]
    fn top_n_per_set_caps_each_slot_set_bucket() {
        let mut config = PrunerConfig::default();
        config.rune_top_per_set = 1;
        let mut a = rune(1, 1, SetId::Swift);
        a.upgrade_level = 3;
        let mut b = rune(2, 1, SetId::Swift);
        b.upgrade_level = 15;
        let runes = vec![a, b];
        let (pool, _) = prune(&runes, &[], Mode::Siege, &config, &BTreeSet::new(), &BTreeSet::new());
        let kept = pool.slot(Slot::new(1).unwrap());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].rune_id, RuneId(2));
    }

    #[test]
    fn excluded_runes_are_removed_regardless_of_set() {
        let runes = vec![rune(1, 1, SetId::Swift)];
        let config = PrunerConfig::default();
        let excluded = BTreeSet::from([RuneId(1)]);
        let (pool, diagnostics) = prune(&runes, &[], Mode::Siege, &config, &excluded, &BTreeSet::new());
        assert!(pool.slot(Slot::new(1).unwrap()).is_empty());
        assert!(diagnostics.contains(&ErrorKind::SlotHasNoCandidates(Slot::new(1).unwrap())));
    }
}
