use crate::domain::{ArtifactId, ArtifactKind, MonsterId, RuneId, Slot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome for a single monster within a sequential run: either a full
/// assignment, or `ok: false` with a human-readable `message` carrying the
/// `ErrorKind` that made the monster unsolvable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitResult {
    pub unit_id: MonsterId,
    pub ok: bool,
    pub message: String,
    pub chosen_build_id: usize,
    pub chosen_build_name: String,
    pub runes_by_slot: BTreeMap<Slot, RuneId>,
    pub artifacts_by_type: BTreeMap<ArtifactKind, ArtifactId>,
    pub final_speed: i32,
}

/// Result of a sequential (greedy or global) optimisation run over an
/// ordered list of monsters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptimizerResult {
    pub ok: bool,
    pub message: String,
    pub results: Vec<UnitResult>,
}

impl OptimizerResult {
    pub fn unit(&self, unit_id: MonsterId) -> Option<&UnitResult> {
        self.results.iter().find(|r| r.unit_id == unit_id)
    }

    pub fn failed_units(&self) -> impl Iterator<Item = &UnitResult> {
        self.results.iter().filter(|r| !r.ok)
    }
}

/// Per-offence outcome within an Arena Rush result: which
/// monsters were already pinned from the defence or an earlier offence
/// team, the team's own optimisation, and how its simulated opening order
/// compared to the one it was built for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArenaRushOffenseResult {
    pub team_index: usize,
    pub team_unit_ids: Vec<MonsterId>,
    pub shared_unit_ids: Vec<MonsterId>,
    pub swapped_in_unit_ids: Vec<MonsterId>,
    pub optimization: OptimizerResult,
    pub expected_opening_order: Vec<MonsterId>,
    pub simulated_opening_order: Vec<MonsterId>,
    pub opening_penalty: i64,
}

/// Full Arena Rush coordination result: one shared defence solve plus one
/// result per offence team.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArenaRushResult {
    pub ok: bool,
    pub message: String,
    pub defense: OptimizerResult,
    pub offenses: Vec<ArenaRushOffenseResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_units_filters_to_unsuccessful_entries() {
        let result = OptimizerResult {
            ok: false,
            message: "2 of 3 succeeded".into(),
            results: vec![
                UnitResult { unit_id: MonsterId(1), ok: true, ..Default::default() },
                UnitResult { unit_id: MonsterId(2), ok: false, message: "no candidates".into(), ..Default::default() },
            ],
        };
        let failed: Vec<_> = result.failed_units().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].unit_id, MonsterId(2));
    }
}
