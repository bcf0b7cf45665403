use super::profile::QualityProfile;
use crate::domain::{Archetype, ArtifactKind, Build, FocusKey, Mode, MonsterId};
use crate::scoring::BaselineGuard;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

impl Default for Mode {
    fn default() -> Self {
        Mode::Siege
    }
}

/// Whether a multi-pass run only ever improves on the previous pass's
/// assignment (`GreedyOnly`) or may also run the bounded refine loop that
/// re-opens already-locked monsters (`GreedyRefine`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultiPassStrategy {
    GreedyOnly,
    GreedyRefine,
}

impl Default for MultiPassStrategy {
    fn default() -> Self {
        MultiPassStrategy::GreedyRefine
    }
}

/// One sequential optimisation request: an ordered list of monsters, each
/// with its own candidate builds, plus the knobs that drive pruning,
/// multi-pass rotation, and turn-order enforcement.
///
/// Deliberately excludes `progress_callback`/`is_cancelled`/
/// `register_solver`: those are runtime hooks, not data, and live on
/// [`crate::greedy::RunHooks`] instead so this struct stays
/// `serde`-round-trippable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptimizerRequest {
    pub mode: Mode,
    pub unit_ids_in_order: Vec<MonsterId>,
    pub builds_by_unit: BTreeMap<MonsterId, Vec<Build>>,

    pub time_limit_per_unit_s: f64,
    pub workers: u32,

    pub multi_pass_enabled: bool,
    pub multi_pass_count: u32,
    pub multi_pass_strategy: MultiPassStrategy,
    pub multi_pass_time_factor: f64,

    pub rune_top_per_set: u32,
    pub quality_profile: QualityProfile,
    pub speed_slack_for_quality: i32,

    pub enforce_turn_order: bool,
    pub unit_team_index: BTreeMap<MonsterId, u32>,
    pub unit_team_turn_order: BTreeMap<MonsterId, i32>,
    pub unit_spd_leader_bonus_flat: BTreeMap<MonsterId, i32>,

    pub unit_archetype_by_uid: BTreeMap<MonsterId, Archetype>,
    pub unit_artifact_hints_by_uid: BTreeMap<MonsterId, BTreeMap<ArtifactKind, FocusKey>>,
    pub unit_team_has_spd_buff_by_uid: BTreeMap<MonsterId, bool>,

    pub baseline: Option<BaselineGuard>,
    pub baseline_regression_guard_weight: i64,
}

/// Per-monster opening-turn behaviour the Arena Rush simulation needs: an
/// ATB boost this unit's action broadcasts, whether it also turns on the
/// team-wide SPD buff, and whether that broadcast includes the caster
/// itself.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct OpeningTurnEffect {
    pub atb_boost_pct: f64,
    pub applies_spd_buff: bool,
    pub include_caster: bool,
}

/// One offence team within an Arena Rush request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArenaRushOffenseTeam {
    pub unit_ids: Vec<MonsterId>,
    pub expected_opening_order: Vec<MonsterId>,
    pub unit_turn_order: BTreeMap<MonsterId, i32>,
    pub unit_spd_leader_bonus_flat: BTreeMap<MonsterId, i32>,
    pub turn_effects_by_unit: BTreeMap<MonsterId, OpeningTurnEffect>,
}

/// Arena Rush coordination request: one shared defence roster plus any
/// number of offence teams, each solved against the same defence with
/// shared-unit pinning and opening-order floors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArenaRushRequest {
    pub defense_unit_ids: Vec<MonsterId>,
    pub defense_unit_team_turn_order: BTreeMap<MonsterId, i32>,
    pub defense_unit_spd_leader_bonus_flat: BTreeMap<MonsterId, i32>,
    pub offense_teams: Vec<ArenaRushOffenseTeam>,
    pub defense_candidate_count: u32,
    pub max_runtime_s: f64,
    pub base: OptimizerRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_request_has_no_units_and_refine_strategy() {
        let request = OptimizerRequest::default();
        assert!(request.unit_ids_in_order.is_empty());
        assert_eq!(request.multi_pass_strategy, MultiPassStrategy::GreedyRefine);
    }
}
