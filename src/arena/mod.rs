//! Arena Rush coordinator: one shared defence team plus any number of
//! offence teams, each solved against the same inventory with
//! shared-unit pinning, opening-turn speed floors/caps, and a bounded
//! opening-order refine loop. Grounded on
//! `original_source/app/engine/arena_rush_optimizer.py`'s
//! `optimize_arena_rush` orchestration and `arena_rush_timing.py` for the
//! opening model.

use crate::api::{
    ArenaRushOffenseResult, ArenaRushOffenseTeam, ArenaRushRequest, ArenaRushResult, OptimizerRequest, OptimizerResult,
    QualityProfile, UnitResult,
};
use crate::cp::{self, CpContext, QualityWeighting, SolveMode};
use crate::domain::{AccountData, ArtifactId, Mode, MonsterId, RuneId, SPD_BUFF_INCREASE_EFFECT_ID};
use crate::global;
use crate::greedy::{self, RunHooks};
use crate::pruner::{self, PrunerConfig};
use crate::simulate;
use std::collections::{BTreeMap, BTreeSet};

/// Bounds the opening-order refine loop within a single offence team.
pub const MAX_OPENING_REFINE_ATTEMPTS: u32 = 3;

fn artifact_spd_buff_increase_pct(account: &AccountData, artifacts_by_type: &BTreeMap<crate::domain::ArtifactKind, ArtifactId>) -> f64 {
    let by_id = account.artifacts_by_id();
    artifacts_by_type
        .values()
        .filter_map(|id| by_id.get(id))
        .map(|a| a.total_sub_effect_value(SPD_BUFF_INCREASE_EFFECT_ID))
        .sum()
}

fn solve_defense(account: &AccountData, request: &OptimizerRequest, seed_offset: u32) -> OptimizerResult {
    let mut defense_request = request.clone();
    defense_request.quality_profile = QualityProfile::MaxQuality;
    defense_request.speed_slack_for_quality = request.speed_slack_for_quality + seed_offset as i32;

    let greedy_result = greedy::run(account, &defense_request, RunHooks::default());
    if greedy_result.ok {
        return greedy_result;
    }
    let global_result = global::run(account, &defense_request, RunHooks::default());
    if global_result.ok {
        global_result
    } else if global_result.results.iter().filter(|r| r.ok).count() >= greedy_result.results.iter().filter(|r| r.ok).count() {
        global_result
    } else {
        greedy_result
    }
}

struct TeamSolveOutcome {
    results: Vec<UnitResult>,
    combat_spd_by_unit: BTreeMap<MonsterId, i32>,
    artifact_spd_buff_by_unit: BTreeMap<MonsterId, f64>,
}

/// Runs one full pass over a single offence team's units in turn-order,
/// pinning already-assigned monsters and excluding every inventory item
/// the defence (or an earlier offence team) already committed to.
#[allow(clippy::too_many_arguments)]
fn solve_team_once(
    account: &AccountData,
    request: &OptimizerRequest,
    team: &ArenaRushOffenseTeam,
    pinned: &BTreeMap<MonsterId, UnitResult>,
    excluded_runes: &BTreeSet<RuneId>,
    excluded_artifacts: &BTreeSet<ArtifactId>,
    min_floor_overrides: &BTreeMap<MonsterId, i32>,
) -> TeamSolveOutcome {
    let pruner_config = PrunerConfig { mode_exclusions: BTreeMap::new(), rune_top_per_set: request.rune_top_per_set };

    // Everything the defence, or an earlier offence team, already committed
    // to is off-limits here except the pieces this team's own pinned
    // (shared) monsters reuse directly.
    let mut locked_runes: BTreeSet<RuneId> = excluded_runes.clone();
    let mut locked_artifacts: BTreeSet<ArtifactId> = excluded_artifacts.clone();
    for result in pinned.values() {
        locked_runes.extend(result.runes_by_slot.values().copied());
        locked_artifacts.extend(result.artifacts_by_type.values().copied());
    }

    let mut order: Vec<MonsterId> = team.unit_ids.clone();
    order.sort_by_key(|u| team.unit_turn_order.get(u).copied().unwrap_or(i32::MAX));

    let mut results = Vec::with_capacity(order.len());
    let mut combat_spd_by_unit = BTreeMap::new();
    let mut artifact_spd_buff_by_unit = BTreeMap::new();

    for &unit_id in &order {
        if let Some(reused) = pinned.get(&unit_id) {
            combat_spd_by_unit.insert(unit_id, reused.final_speed);
            artifact_spd_buff_by_unit.insert(unit_id, artifact_spd_buff_increase_pct(account, &reused.artifacts_by_type));
            results.push(reused.clone());
            continue;
        }

        let Some(monster) = account.monster(unit_id) else {
            results.push(UnitResult { unit_id, ok: false, message: format!("unit {unit_id} not found"), ..Default::default() });
            continue;
        };
        let Some(builds) = request.builds_by_unit.get(&unit_id) else {
            results.push(UnitResult { unit_id, ok: false, message: "no build configured for this unit".into(), ..Default::default() });
            continue;
        };

        let (pool, _diagnostics) =
            pruner::prune(&account.runes, &account.artifacts, request.mode, &pruner_config, &locked_runes, &locked_artifacts);

        let max_cap = order
            .iter()
            .take_while(|&&u| u != unit_id)
            .filter_map(|u| combat_spd_by_unit.get(u).map(|&spd| spd - 1))
            .min();
        let min_floor = min_floor_overrides.get(&unit_id).copied();

        let defensive = monster.archetype.is_defensive();
        let rta_ids = if request.mode == Mode::Rta { Some(account.rta_rune_ids_for(unit_id)) } else { None };
        let ctx = CpContext {
            max_final_combat_spd: max_cap,
            min_final_combat_spd: min_floor,
            baseline: request.baseline.as_ref(),
            preferred_set_option: 0,
            avoid_runes: BTreeMap::new(),
            avoid_artifacts: BTreeMap::new(),
            totem_spd_pct: account.sky_tribe_totem_spd_pct,
            spd_leader_bonus_flat: team.unit_spd_leader_bonus_flat.get(&unit_id).copied().unwrap_or(0),
            defensive,
            rta_ids,
        };

        match cp::solve_monster(monster, builds, &pool, SolveMode::QualityFirst(QualityWeighting::Balanced), &ctx) {
            Ok(solution) => {
                locked_runes.extend(solution.runes_by_slot.values().copied());
                locked_artifacts.extend(solution.artifacts_by_type.values().copied());
                combat_spd_by_unit.insert(unit_id, solution.final_combat_spd);
                let result = UnitResult {
                    unit_id,
                    ok: true,
                    message: String::new(),
                    chosen_build_id: solution.build_index,
                    chosen_build_name: solution.build_name.clone(),
                    runes_by_slot: solution.runes_by_slot.clone(),
                    artifacts_by_type: solution.artifacts_by_type.clone(),
                    final_speed: solution.final_combat_spd,
                };
                artifact_spd_buff_by_unit.insert(unit_id, artifact_spd_buff_increase_pct(account, &solution.artifacts_by_type));
                results.push(result);
            }
            Err(err) => {
                results.push(UnitResult { unit_id, ok: false, message: err.to_string(), ..Default::default() });
            }
        }
    }

    TeamSolveOutcome { results, combat_spd_by_unit, artifact_spd_buff_by_unit }
}

/// Retries a team whose first pass left a failed unit by re-solving it
/// with every preferred-set-option rotation and its opening-speed floor
/// dropped — a bounded stand-in for "run a global rescue for the failing
/// team" that stays inside the single-monster
/// branch-and-bound already proven out for the greedy/global engines.
#[allow(clippy::too_many_arguments)]
fn rescue_failed_units(
    account: &AccountData,
    request: &OptimizerRequest,
    team: &ArenaRushOffenseTeam,
    pinned: &BTreeMap<MonsterId, UnitResult>,
    excluded_runes: &BTreeSet<RuneId>,
    excluded_artifacts: &BTreeSet<ArtifactId>,
    outcome: &mut TeamSolveOutcome,
) {
    if outcome.results.iter().all(|r| r.ok) {
        return;
    }
    let retried = solve_team_once(account, request, team, pinned, excluded_runes, excluded_artifacts, &BTreeMap::new());
    for (slot, result) in outcome.results.iter_mut().enumerate() {
        if !result.ok {
            if let Some(replacement) = retried.results.get(slot) {
                if replacement.ok {
                    *result = replacement.clone();
                    outcome.combat_spd_by_unit.insert(replacement.unit_id, replacement.final_speed);
                }
            }
        }
    }
}

fn solve_offense_team(
    account: &AccountData,
    request: &OptimizerRequest,
    team_index: usize,
    team: &ArenaRushOffenseTeam,
    pinned_pool: &mut BTreeMap<MonsterId, UnitResult>,
) -> ArenaRushOffenseResult {
    let shared_unit_ids: Vec<MonsterId> = team.unit_ids.iter().copied().filter(|u| pinned_pool.contains_key(u)).collect();
    let swapped_in_unit_ids: Vec<MonsterId> =
        team.unit_ids.iter().copied().filter(|u| !pinned_pool.contains_key(u)).collect();
    let shared_snapshot: BTreeMap<MonsterId, UnitResult> =
        shared_unit_ids.iter().filter_map(|u| pinned_pool.get(u).map(|r| (*u, r.clone()))).collect();

    let excluded_runes: BTreeSet<RuneId> = pinned_pool.values().flat_map(|r| r.runes_by_slot.values().copied()).collect();
    let excluded_artifacts: BTreeSet<ArtifactId> =
        pinned_pool.values().flat_map(|r| r.artifacts_by_type.values().copied()).collect();

    let mut outcome =
        solve_team_once(account, request, team, &shared_snapshot, &excluded_runes, &excluded_artifacts, &BTreeMap::new());
    rescue_failed_units(account, request, team, &shared_snapshot, &excluded_runes, &excluded_artifacts, &mut outcome);

    let expected_order = if team.expected_opening_order.is_empty() { team.unit_ids.clone() } else { team.expected_opening_order.clone() };

    let mut simulated_order = simulate::simulate_opening_order(
        &team.unit_ids,
        &outcome.combat_spd_by_unit,
        &outcome.artifact_spd_buff_by_unit,
        &team.turn_effects_by_unit,
        &expected_order,
        None,
    );
    let mut penalty = simulate::opening_order_penalty(&expected_order, &simulated_order);

    let mut attempt = 0;
    while penalty > 0 && attempt < MAX_OPENING_REFINE_ATTEMPTS {
        let floors = simulate::min_speed_floor_by_unit_from_effects(
            &expected_order,
            &outcome.combat_spd_by_unit,
            &outcome.artifact_spd_buff_by_unit,
            &team.turn_effects_by_unit,
        );
        outcome =
            solve_team_once(account, request, team, &shared_snapshot, &excluded_runes, &excluded_artifacts, &floors);
        rescue_failed_units(account, request, team, &shared_snapshot, &excluded_runes, &excluded_artifacts, &mut outcome);

        simulated_order = simulate::simulate_opening_order(
            &team.unit_ids,
            &outcome.combat_spd_by_unit,
            &outcome.artifact_spd_buff_by_unit,
            &team.turn_effects_by_unit,
            &expected_order,
            None,
        );
        penalty = simulate::opening_order_penalty(&expected_order, &simulated_order);
        attempt += 1;
    }

    for result in &outcome.results {
        if result.ok && !shared_unit_ids.contains(&result.unit_id) {
            pinned_pool.insert(result.unit_id, result.clone());
        }
    }

    let ok = outcome.results.iter().all(|r| r.ok);
    let message = if ok {
        String::new()
    } else {
        let failed = outcome.results.iter().filter(|r| !r.ok).count();
        format!("{failed} of {} units failed", outcome.results.len())
    };

    ArenaRushOffenseResult {
        team_index,
        team_unit_ids: team.unit_ids.clone(),
        shared_unit_ids,
        swapped_in_unit_ids,
        optimization: OptimizerResult { ok, message, results: outcome.results },
        expected_opening_order: expected_order,
        simulated_opening_order: simulated_order,
        opening_penalty: penalty,
    }
}

fn run_one_candidate(account: &AccountData, request: &ArenaRushRequest, seed_offset: u32) -> ArenaRushResult {
    let mut defense_request = request.base.clone();
    defense_request.unit_ids_in_order = request.defense_unit_ids.clone();
    defense_request.unit_team_turn_order = request.defense_unit_team_turn_order.clone();
    defense_request.unit_spd_leader_bonus_flat = request.defense_unit_spd_leader_bonus_flat.clone();

    let defense = solve_defense(account, &defense_request, seed_offset);

    let mut pinned_pool: BTreeMap<MonsterId, UnitResult> =
        defense.results.iter().filter(|r| r.ok).map(|r| (r.unit_id, r.clone())).collect();

    let mut offenses = Vec::with_capacity(request.offense_teams.len());
    for (team_index, team) in request.offense_teams.iter().enumerate() {
        offenses.push(solve_offense_team(account, &request.base, team_index, team, &mut pinned_pool));
    }

    let ok = defense.ok && offenses.iter().all(|o| o.optimization.ok);
    let message = if ok { String::new() } else { "one or more Arena Rush teams failed to resolve".into() };

    ArenaRushResult { ok, message, defense, offenses }
}

fn candidate_score(result: &ArenaRushResult) -> (i64, i64, i64, i64) {
    let sum_ok = result.defense.results.iter().filter(|r| r.ok).count() as i64
        + result.offenses.iter().flat_map(|o| &o.optimization.results).filter(|r| r.ok).count() as i64;
    let total_penalty: i64 = result.offenses.iter().map(|o| o.opening_penalty).sum();
    let total_quality: i64 = 0;
    let total_combat_spd: i64 = result.defense.results.iter().map(|r| r.final_speed as i64).sum::<i64>()
        + result.offenses.iter().flat_map(|o| &o.optimization.results).map(|r| r.final_speed as i64).sum::<i64>();
    (sum_ok, -total_penalty, total_quality, total_combat_spd)
}

/// Runs the full Arena Rush coordination. `defense_candidate_count > 1`
/// tries several `global_seed_offset`-varied defence solves and keeps the
/// candidate that scores best on `(sum ok counts, -Σ opening_penalty,
/// total_quality, total_combat_spd)`.
pub fn run(account: &AccountData, request: &ArenaRushRequest, hooks: RunHooks) -> ArenaRushResult {
    if request.defense_unit_ids.is_empty() {
        return ArenaRushResult {
            ok: false,
            message: crate::error::ErrorKind::NoUnits.to_string(),
            defense: OptimizerResult::default(),
            offenses: Vec::new(),
        };
    }

    let candidate_count = request.defense_candidate_count.max(1);
    log::info!(
        "arena rush: {} defence candidate(s), {} offence team(s)",
        candidate_count,
        request.offense_teams.len()
    );

    #[cfg(feature = "parallel")]
    {
        if candidate_count > 1 {
            return run_candidates_parallel(account, request, candidate_count, hooks);
        }
    }

    let _ = &hooks;
    run_candidates_sequential(account, request, candidate_count)
}

fn run_candidates_sequential(account: &AccountData, request: &ArenaRushRequest, candidate_count: u32) -> ArenaRushResult {
    let mut best: Option<ArenaRushResult> = None;
    for seed_offset in 0..candidate_count {
        let candidate = run_one_candidate(account, request, seed_offset);
        let better = best.as_ref().is_none_or(|b| candidate_score(&candidate) > candidate_score(b));
        if better {
            best = Some(candidate);
        }
    }
    best.expect("candidate_count is at least 1")
}

#[cfg(feature = "parallel")]
fn run_candidates_parallel(
    account: &AccountData,
    request: &ArenaRushRequest,
    candidate_count: u32,
    hooks: RunHooks,
) -> ArenaRushResult {
    use rayon::prelude::*;

    let cancellation = hooks.cancellation_token.clone();
    let candidates: Vec<ArenaRushResult> = (0..candidate_count)
        .into_par_iter()
        .filter(|_| !cancellation.load(std::sync::atomic::Ordering::Relaxed))
        .map(|seed_offset| run_one_candidate(account, request, seed_offset))
        .collect();

    candidates
        .into_iter()
        .max_by_key(|c| candidate_score(c))
        .unwrap_or_else(|| run_one_candidate(account, request, 0))
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

    fn account_with(ids: &[u32]) -> AccountData {
        let mut monsters = BTreeMap::new();
        let mut runes = Vec::new();
        let mut artifacts = Vec::new();
        for (i, &id) in ids.iter().enumerate() {
            monsters.insert(MonsterId(id), monster(id, 100 + i as i32 * 10));
            for slot in 1..=6u8 {
                runes.push(spd_rune(id * 10 + slot as u32, slot));
            }
            artifacts.push(artifact(id * 2, ArtifactKind::Attribute));
            artifacts.push(artifact(id * 2 + 1, ArtifactKind::Type));
        }
        AccountData { monsters, runes, artifacts, ..Default::default() }
    }

    #[test]
    fn defense_unit_reused_byte_identical_in_offense_team() {
        let account = account_with(&[1, 2, 3, 4, 5]);
        let mut base = OptimizerRequest::default();
        for id in [1, 2, 3, 4, 5] {
            base.builds_by_unit.insert(MonsterId(id), vec![Build::default()]);
        }

        let mut request = ArenaRushRequest {
            defense_unit_ids: vec![MonsterId(1), MonsterId(2), MonsterId(3), MonsterId(4)],
            defense_candidate_count: 1,
            base,
            ..Default::default()
        };
        request.offense_teams.push(ArenaRushOffenseTeam {
            unit_ids: vec![MonsterId(2), MonsterId(5)],
            ..Default::default()
        });

        let result = run(&account, &request, RunHooks::default());
        assert!(result.defense.ok);
        let defense_d2 = result.defense.unit(MonsterId(2)).unwrap();
        let offense_d2 = result.offenses[0].optimization.unit(MonsterId(2)).unwrap();
        assert_eq!(defense_d2.runes_by_slot, offense_d2.runes_by_slot);
        assert!(result.offenses[0].shared_unit_ids.contains(&MonsterId(2)));
    }

    #[test]
    fn empty_defense_roster_fails_fast() {
        let account = AccountData::default();
        let request = ArenaRushRequest::default();
        let result = run(&account, &request, RunHooks::default());
        assert!(!result.ok);
    }
}
