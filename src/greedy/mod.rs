//! Greedy sequential engine: processes monsters one at a
//! time in a deterministic order, locking each solved monster's items
//! before moving to the next, then scores the whole pass so multi-pass
//! mode can pick the best ordering it tried.

use crate::api::{MultiPassStrategy, OptimizerRequest, OptimizerResult, UnitResult};
use crate::cp::{self, CpContext, QualityWeighting, SolveMode};
use crate::domain::{AccountData, ArtifactId, ArtifactKind, Mode, MonsterId, RuneId, Slot};
use crate::pruner::{self, PrunerConfig};
use crate::scoring::{
    efficiency_artifact, efficiency_rune, round_half_to_even, EffVariant, PASS_EFFICIENCY_WEIGHT,
    TURN_ORDER_GAP_PENALTY_WEIGHT,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Reported once per monster processed; the `cli` binary is the one place
/// that wires this to a terminal progress bar, the library itself only
/// calls the closure.
#[derive(Debug, Clone, Copy)]
pub struct GreedyProgress {
    pub unit_index: usize,
    pub unit_total: usize,
    pub pass_index: u32,
    pub pass_total: u32,
}

/// Runtime-only extension points that don't belong on the serde-data
/// `OptimizerRequest`: a progress callback and a cooperative cancellation
/// flag, checked before each CP solve, between passes, and between teams.
#[derive(Default)]
pub struct RunHooks {
    pub progress_callback: Option<Box<dyn FnMut(GreedyProgress) + Send>>,
    pub cancellation_token: Arc<AtomicBool>,
}

impl RunHooks {
    pub(crate) fn report(&mut self, progress: GreedyProgress) {
        if let Some(cb) = self.progress_callback.as_mut() {
            cb(progress);
        }
    }

    pub(crate) fn cancelled(&self) -> bool {
        self.cancellation_token.load(Ordering::Relaxed)
    }
}

/// The seven-tuple pass score, compared lexicographically field by field
/// in declaration order; new fields must only ever be appended at the
/// tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PassScore {
    pub ok_count: i64,
    pub effective_quality: i64,
    pub total_quality: i64,
    pub avg_quality_scaled: i64,
    pub neg_turn_gap_excess_sq: i64,
    pub min_unit_quality: i64,
    pub total_combat_spd: i64,
}

fn ordered_units(request: &OptimizerRequest) -> Vec<MonsterId> {
    let mut indexed: Vec<(usize, MonsterId)> = request.unit_ids_in_order.iter().copied().enumerate().collect();
    indexed.sort_by_key(|(original_index, unit)| {
        let optimize_order = request
            .builds_by_unit
            .get(unit)
            .and_then(|builds| builds.first())
            .map(|b| b.optimize_order)
            .unwrap_or(0);
        (optimize_order == 0, optimize_order, *original_index)
    });
    let mut order: Vec<MonsterId> = indexed.into_iter().map(|(_, unit)| unit).collect();

    if request.enforce_turn_order {
        sort_within_teams_by_turn_order(request, &mut order);
    }
    order
}

/// Reorders `units` in place so that, within each team, members appear in
/// ascending `turn_order`; units outside a team, and the relative order of
/// different teams, are left untouched. Shared with the global engine,
/// which must process teammates in turn order for its per-unit speed cap
/// to enforce the turn-order invariant.
pub(crate) fn sort_within_teams_by_turn_order(request: &OptimizerRequest, units: &mut [MonsterId]) {
    let mut team_groups: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (pos, unit) in units.iter().enumerate() {
        if let Some(&team) = request.unit_team_index.get(unit) {
            team_groups.entry(team).or_default().push(pos);
        }
    }
    for positions in team_groups.values() {
        let mut members: Vec<MonsterId> = positions.iter().map(|&p| units[p]).collect();
        members.sort_by_key(|u| request.unit_team_turn_order.get(u).copied().unwrap_or(i32::MAX));
        for (&pos, unit) in positions.iter().zip(members) {
            units[pos] = unit;
        }
    }
}

/// Minimum `combat_spd - 1` over already-processed teammates with a lower
/// `turn_order` than `unit`, letting the earlier-turn monster claim the
/// fastest runes. Shared with the global engine, which
/// enforces the same turn-order invariant across its joint search.
pub(crate) fn speed_cap_from_teammates(
    request: &OptimizerRequest,
    unit: MonsterId,
    placements: &BTreeMap<MonsterId, i32>,
) -> Option<i32> {
    let team = request.unit_team_index.get(&unit)?;
    let my_turn = request.unit_team_turn_order.get(&unit).copied().unwrap_or(i32::MAX);
    placements
        .iter()
        .filter(|(other, _)| {
            request.unit_team_index.get(other) == Some(team)
                && request.unit_team_turn_order.get(other).copied().unwrap_or(i32::MAX) < my_turn
        })
        .map(|(_, &final_combat_spd)| final_combat_spd - 1)
        .min()
}

struct PassOutcome {
    result: OptimizerResult,
    score: PassScore,
    signature: Vec<(MonsterId, BTreeMap<Slot, RuneId>, BTreeMap<ArtifactKind, ArtifactId>)>,
}

#[allow(clippy::too_many_arguments)]
fn run_single_pass(
    account: &AccountData,
    request: &OptimizerRequest,
    mode: Mode,
    order: &[MonsterId],
    weighting: QualityWeighting,
    avoid_runes_by_unit: &BTreeMap<MonsterId, BTreeMap<Slot, RuneId>>,
    avoid_artifacts_by_unit: &BTreeMap<MonsterId, BTreeMap<ArtifactKind, ArtifactId>>,
    preferred_set_option: usize,
    pass_index: u32,
    pass_total: u32,
    hooks: &mut RunHooks,
) -> PassOutcome {
    let mut locked_runes: BTreeSet<RuneId> = BTreeSet::new();
    let mut locked_artifacts: BTreeSet<ArtifactId> = BTreeSet::new();
    let mut placements: BTreeMap<MonsterId, i32> = BTreeMap::new();
    let mut results: Vec<UnitResult> = Vec::with_capacity(order.len());
    let mut signature = Vec::with_capacity(order.len());

    let pruner_config = PrunerConfig { mode_exclusions: BTreeMap::new(), rune_top_per_set: request.rune_top_per_set };
    let runes_by_id = account.runes_by_id();
    let artifacts_by_id = account.artifacts_by_id();

    let mut ok_count = 0i64;
    let mut total_quality = 0i64;
    let mut total_efficiency_rounded = 0i64;
    let mut turn_gap_excess_sq = 0i64;
    let mut min_unit_quality = i64::MAX;
    let mut total_combat_spd = 0i64;
    let mut cancelled = false;

    for (unit_index, &unit_id) in order.iter().enumerate() {
        hooks.report(GreedyProgress { unit_index, unit_total: order.len(), pass_index, pass_total });
        if hooks.cancelled() {
            cancelled = true;
            break;
        }

        let Some(monster) = account.monster(unit_id) else {
            results.push(UnitResult {
                unit_id,
                ok: false,
                message: format!("unit {unit_id} not found in account data"),
                ..Default::default()
            });
            continue;
        };

        let Some(builds) = request.builds_by_unit.get(&unit_id) else {
            results.push(UnitResult {
                unit_id,
                ok: false,
                message: "no build configured for this unit".into(),
                ..Default::default()
            });
            continue;
        };

        let (pool, _diagnostics) =
            pruner::prune(&account.runes, &account.artifacts, mode, &pruner_config, &locked_runes, &locked_artifacts);

        let defensive = monster.archetype.is_defensive();
        let rta_ids = if mode == Mode::Rta { Some(account.rta_rune_ids_for(unit_id)) } else { None };
        let ctx = CpContext {
            max_final_combat_spd: speed_cap_from_teammates(request, unit_id, &placements),
            min_final_combat_spd: None,
            baseline: request.baseline.as_ref(),
            preferred_set_option,
            avoid_runes: avoid_runes_by_unit.get(&unit_id).cloned().unwrap_or_default(),
            avoid_artifacts: avoid_artifacts_by_unit.get(&unit_id).cloned().unwrap_or_default(),
            totem_spd_pct: account.sky_tribe_totem_spd_pct,
            spd_leader_bonus_flat: request.unit_spd_leader_bonus_flat.get(&unit_id).copied().unwrap_or(0),
            defensive,
            rta_ids,
        };

        let solve_mode = if request.speed_slack_for_quality > 0 {
            SolveMode::SpeedFirst { speed_slack: request.speed_slack_for_quality }
        } else {
            SolveMode::QualityFirst(weighting)
        };

        match cp::solve_monster(monster, builds, &pool, solve_mode, &ctx) {
            Ok(solution) => {
                for &rune_id in solution.runes_by_slot.values() {
                    locked_runes.insert(rune_id);
                }
                for &artifact_id in solution.artifacts_by_type.values() {
                    locked_artifacts.insert(artifact_id);
                }

                let quality = solution.objective;
                ok_count += 1;
                total_quality += quality;
                for &rune_id in solution.runes_by_slot.values() {
                    if let Some(rune) = runes_by_id.get(&rune_id) {
                        total_efficiency_rounded += round_half_to_even(efficiency_rune(rune, EffVariant::Current) * 10.0);
                    }
                }
                for &artifact_id in solution.artifacts_by_type.values() {
                    if let Some(artifact) = artifacts_by_id.get(&artifact_id) {
                        total_efficiency_rounded += round_half_to_even(efficiency_artifact(artifact) * 10.0);
                    }
                }
                min_unit_quality = min_unit_quality.min(quality);
                total_combat_spd += solution.final_combat_spd as i64;

                if let Some(cap) = ctx.max_final_combat_spd {
                    let gap_excess = (solution.final_combat_spd - (cap + 1)).max(0);
                    turn_gap_excess_sq += (gap_excess as i64) * (gap_excess as i64);
                }

                placements.insert(unit_id, solution.final_combat_spd);
                signature.push((unit_id, solution.runes_by_slot.clone(), solution.artifacts_by_type.clone()));

                results.push(UnitResult {
                    unit_id,
                    ok: true,
                    message: String::new(),
                    chosen_build_id: solution.build_index,
                    chosen_build_name: solution.build_name,
                    runes_by_slot: solution.runes_by_slot,
                    artifacts_by_type: solution.artifacts_by_type,
                    final_speed: solution.final_combat_spd,
                });
            }
            Err(err) => {
                results.push(UnitResult { unit_id, ok: false, message: err.to_string(), ..Default::default() });
            }
        }
    }

    if min_unit_quality == i64::MAX {
        min_unit_quality = 0;
    }
    let avg_quality_scaled = if ok_count > 0 { total_quality * 100 / ok_count } else { 0 };
    let effective_quality =
        total_quality + PASS_EFFICIENCY_WEIGHT * total_efficiency_rounded - turn_gap_excess_sq * TURN_ORDER_GAP_PENALTY_WEIGHT;

    let score = PassScore {
        ok_count,
        effective_quality,
        total_quality,
        avg_quality_scaled,
        neg_turn_gap_excess_sq: -turn_gap_excess_sq,
        min_unit_quality,
        total_combat_spd,
    };

    let ok = !cancelled && results.iter().all(|r| r.ok);
    let message = if cancelled {
        "cancelled".to_string()
    } else if ok {
        String::new()
    } else {
        let failed = results.iter().filter(|r| !r.ok).count();
        format!("{failed} of {} units failed", results.len())
    };

    PassOutcome { result: OptimizerResult { ok, message, results }, score, signature }
}

/// Rotates `order` left by one team-independent step and reverses every
/// other pass, a cheap deterministic diversification between passes.
fn next_pass_order(base: &[MonsterId], pass_index: u32) -> Vec<MonsterId> {
    if base.is_empty() {
        return Vec::new();
    }
    if pass_index % 2 == 1 {
        let mut reversed = base.to_vec();
        reversed.reverse();
        reversed
    } else {
        let shift = (pass_index as usize / 2) % base.len();
        let mut rotated = base[shift..].to_vec();
        rotated.extend_from_slice(&base[..shift]);
        rotated
    }
}

/// Runs the greedy engine, trying up to `multi_pass_count` orderings when
/// multi-pass mode is enabled and returning the best-scoring pass.
/// Early-stops after `PATIENCE` passes without improvement.
pub fn run(account: &AccountData, request: &OptimizerRequest, mut hooks: RunHooks) -> OptimizerResult {
    const PATIENCE: u32 = 3;

    if request.unit_ids_in_order.is_empty() {
        return OptimizerResult { ok: false, message: crate::error::ErrorKind::NoUnits.to_string(), results: Vec::new() };
    }

    let base_order = ordered_units(request);
    let pass_total = if request.multi_pass_enabled { request.multi_pass_count.max(1) } else { 1 };

    let mut best: Option<PassOutcome> = None;
    let mut best_signature: Option<Vec<(MonsterId, BTreeMap<Slot, RuneId>, BTreeMap<ArtifactKind, ArtifactId>)>> = None;
    let mut stale_passes = 0u32;

    for pass_index in 0..pass_total {
        if hooks.cancelled() {
            break;
        }

        let order = if pass_index == 0 { base_order.clone() } else { next_pass_order(&base_order, pass_index) };

        let refine = request.multi_pass_strategy == MultiPassStrategy::GreedyRefine && pass_index > 0;
        let weighting = if refine { QualityWeighting::EfficiencyFirst } else { QualityWeighting::Balanced };
        let preferred_set_option = if refine { pass_index as usize % 4 } else { 0 };

        let (avoid_runes, avoid_artifacts) = if refine {
            best.as_ref().map(|b| avoidance_maps(&b.result)).unwrap_or_default()
        } else {
            Default::default()
        };

        let outcome = run_single_pass(
            account,
            request,
            request.mode,
            &order,
            weighting,
            &avoid_runes,
            &avoid_artifacts,
            preferred_set_option,
            pass_index,
            pass_total,
            &mut hooks,
        );

        let improved = best.as_ref().is_none_or(|b| outcome.score > b.score);
        let identical_signature = best_signature.as_ref().is_some_and(|sig| *sig == outcome.signature);
        log::debug!("pass {}/{}: improved={}", pass_index + 1, pass_total, improved);

        if improved {
            stale_passes = 0;
            best_signature = Some(outcome.signature.clone());
            best = Some(outcome);
        } else {
            stale_passes += 1;
            if identical_signature || stale_passes >= PATIENCE {
                log::info!("greedy run stopped early after {} stale passes", stale_passes);
                break;
            }
        }

        if !request.multi_pass_enabled {
            break;
        }
    }

    best.map(|b| b.result).unwrap_or(OptimizerResult {
        ok: false,
        message: "no pass produced a result".into(),
        results: Vec::new(),
    })
}

fn avoidance_maps(
    result: &OptimizerResult,
) -> (BTreeMap<MonsterId, BTreeMap<Slot, RuneId>>, BTreeMap<MonsterId, BTreeMap<ArtifactKind, ArtifactId>>) {
    let mut runes = BTreeMap::new();
    let mut artifacts = BTreeMap::new();
    for unit in &result.results {
        if unit.ok {
            runes.insert(unit.unit_id, unit.runes_by_slot.clone());
            artifacts.insert(unit.unit_id, unit.artifacts_by_type.clone());
        }
    }
    (runes, artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::*;

    fn monster(id: u32, spd: i32) -> Monster {
        Monster {
            id: MonsterId(id),
            master_id: id,
            attribute: Attribute::Fire,
            class: 1,
            stars: 6,
            base: BaseStats { con: 1000, atk: 500, def: 500, spd, cr: 15, cd: 50, res: 15, acc: 0 },
            archetype: Archetype::Attack,
        }
    }

    fn spd_rune(id: u32, slot: u8) -> Rune {
        Rune {
            rune_id: RuneId(id),
            slot_no: Slot::new(slot).unwrap(),
            set_id: SetId::Violent,
            quality_class: QualityClass::Legend,
            rank: 6,
            upgrade_level: 15,
            main_effect: Effect { effect_id: EffectId(8), value: 20 },
            prefix_effect: None,
            sub_effects: vec![],
            occupant: Occupant::Nobody,
        }
    }

    fn artifact(id: u32, kind: ArtifactKind) -> Artifact {
        Artifact {
            artifact_id: ArtifactId(id),
            kind,
            attribute: None,
            rank: 5,
            level: 12,
            original_rank: 5,
            pri_effect: Effect { effect_id: EffectId(if kind == ArtifactKind::Attribute { 2 } else { 101 }), value: 80 },
            sec_effects: vec![],
            occupant: Occupant::Nobody,
        }
    }

    fn account_with_one_monster() -> AccountData {
        let mut monsters = BTreeMap::new();
        monsters.insert(MonsterId(1), monster(1, 100));
        let mut runes = Vec::new();
        for slot in 1..=6u8 {
            runes.push(spd_rune(slot as u32, slot));
        }
        let artifacts = vec![artifact(1, ArtifactKind::Attribute), artifact(2, ArtifactKind::Type)];
        AccountData { monsters, runes, artifacts, ..Default::default() }
    }

    #[test]
    fn single_monster_single_pass_succeeds() {
        let account = account_with_one_monster();
        let mut request = OptimizerRequest::default();
        request.unit_ids_in_order = vec![MonsterId(1)];
        request.builds_by_unit.insert(MonsterId(1), vec![Build::default()]);

        let result = run(&account, &request, RunHooks::default());
        assert!(result.ok);
        assert_eq!(result.results.len(), 1);
        assert!(result.results[0].ok);
    }

    #[test]
    fn missing_build_configuration_reports_a_failed_unit() {
        let account = account_with_one_monster();
        let mut request = OptimizerRequest::default();
        request.unit_ids_in_order = vec![MonsterId(1)];

        let result = run(&account, &request, RunHooks::default());
        assert!(!result.ok);
        assert!(!result.results[0].ok);
    }

    #[test]
    fn cancellation_token_stops_before_any_unit_is_solved() {
        let account = account_with_one_monster();
        let mut request = OptimizerRequest::default();
        request.unit_ids_in_order = vec![MonsterId(1)];
        request.builds_by_unit.insert(MonsterId(1), vec![Build::default()]);

        let token = Arc::new(AtomicBool::new(true));
        let hooks = RunHooks { progress_callback: None, cancellation_token: token };
        let result = run(&account, &request, hooks);
        assert!(!result.ok);
        assert_eq!(result.message, "cancelled");
    }

    #[test]
    fn rotation_pass_order_shifts_by_two_per_pass_pair() {
        let base = vec![MonsterId(1), MonsterId(2), MonsterId(3), MonsterId(4)];
        assert_eq!(next_pass_order(&base, 2), vec![MonsterId(2), MonsterId(3), MonsterId(4), MonsterId(1)]);
        assert_eq!(next_pass_order(&base, 1), vec![MonsterId(4), MonsterId(3), MonsterId(2), MonsterId(1)]);
    }
}
