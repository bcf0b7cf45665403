//! Per-monster CP solver, implemented as a tailored branch-and-bound over
//! the small per-slot branching factor rather than a CP-SAT model.

use crate::domain::{
    Artifact, ArtifactKind, Build, EffectId, MainStatKey, Monster, MonsterId, Rune, RuneId, SetId, Slot,
};
use crate::error::ErrorKind;
use crate::scoring::{
    artifact_build_bonus, efficiency_artifact, efficiency_rune, quality_artifact, quality_defensive_artifact,
    quality_defensive_rune, quality_rune, round_half_to_even, BaselineGuard, EffVariant, ARTIFACT_EFFICIENCY_WEIGHT_SOLVER,
    BUILD_PRIORITY_PENALTY, RUNE_EFFICIENCY_WEIGHT_SOLVER, SAME_ARTIFACT_PENALTY, SAME_RUNE_PENALTY,
    SET_OPTION_PREFERENCE_BONUS, SOFT_SPEED_WEIGHT,
};
use std::collections::BTreeMap;

/// Swift set's raw SPD bonus, applied as a percentage of base SPD once
/// four or more chosen runes carry `SetId::Swift`.
const SWIFT_BONUS_PCT: i32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityWeighting {
    Balanced,
    EfficiencyFirst,
    /// Ignores quality/efficiency entirely and scores each candidate by its
    /// own flat SPD contribution, so the search orders and prunes toward the
    /// fastest achievable assignment (`SolveMode::SpeedFirst` phase 1).
    SpeedOnly,
}

#[derive(Debug, Clone, Copy)]
pub enum SolveMode {
    /// Maximise speed first, then re-solve for quality within `speed_slack`
    /// of the best speed found.
    SpeedFirst { speed_slack: i32 },
    QualityFirst(QualityWeighting),
}

/// Read-only context shared by every build-variant attempt for one
/// monster: speed caps, baseline guard, avoidance state from a previous
/// pass, and the diversification knobs multi-pass refinement uses.
#[derive(Debug, Clone, Default)]
pub struct CpContext<'a> {
    pub max_final_combat_spd: Option<i32>,
    /// Pre-flight opening-speed floor (Arena Rush step 2d); independent of
    /// the `SpeedFirst` mode's internal `speed_floor` re-solve parameter.
    pub min_final_combat_spd: Option<i32>,
    pub baseline: Option<&'a BaselineGuard>,
    pub preferred_set_option: usize,
    pub avoid_runes: BTreeMap<Slot, RuneId>,
    pub avoid_artifacts: BTreeMap<ArtifactKind, crate::domain::ArtifactId>,
    pub totem_spd_pct: i32,
    pub spd_leader_bonus_flat: i32,
    pub defensive: bool,
    pub rta_ids: Option<&'a [RuneId]>,
}

#[derive(Debug, Clone)]
pub struct CpSolution {
    pub build_index: usize,
    pub build_name: String,
    pub runes_by_slot: BTreeMap<Slot, RuneId>,
    pub artifacts_by_type: BTreeMap<ArtifactKind, crate::domain::ArtifactId>,
    pub final_raw_spd: i32,
    pub final_combat_spd: i32,
    pub objective: i64,
}

pub type CpOutcome = Result<CpSolution, ErrorKind>;

#[derive(Default, Clone, Copy)]
struct StatTotals {
    hp_flat: i32,
    hp_pct: i32,
    atk_flat: i32,
    atk_pct: i32,
    def_flat: i32,
    def_pct: i32,
    cr: i32,
    cd: i32,
    res: i32,
    acc: i32,
    flat_spd: i32,
}

impl StatTotals {
    fn add(&mut self, key: MainStatKey, value: i32) {
        match key {
            MainStatKey::HpFlat => self.hp_flat += value,
            MainStatKey::HpPct => self.hp_pct += value,
            MainStatKey::AtkFlat => self.atk_flat += value,
            MainStatKey::AtkPct => self.atk_pct += value,
            MainStatKey::DefFlat => self.def_flat += value,
            MainStatKey::DefPct => self.def_pct += value,
            MainStatKey::Spd => self.flat_spd += value,
            MainStatKey::Cr => self.cr += value,
            MainStatKey::Cd => self.cd += value,
            MainStatKey::Res => self.res += value,
            MainStatKey::Acc => self.acc += value,
        }
    }

    fn from_rune(rune: &Rune) -> Self {
        let mut totals = Self::default();
        if let Some(key) = MainStatKey::from_effect_id(rune.main_effect.effect_id) {
            totals.add(key, rune.main_effect.value);
        }
        if let Some(prefix) = rune.prefix_effect {
            if let Some(key) = MainStatKey::from_effect_id(prefix.effect_id) {
                totals.add(key, prefix.value);
            }
        }
        for sub in &rune.sub_effects {
            if let Some(key) = MainStatKey::from_effect_id(sub.effect_id) {
                totals.add(key, sub.total_value());
            }
        }
        totals
    }

    fn from_artifact(artifact: &Artifact) -> Self {
        let mut totals = Self::default();
        for sub in &artifact.sec_effects {
            if let Some(key) = MainStatKey::from_effect_id(sub.effect_id) {
                totals.add(key, sub.value);
            }
        }
        totals
    }

    fn merge(&mut self, other: &StatTotals) {
        self.hp_flat += other.hp_flat;
        self.hp_pct += other.hp_pct;
        self.atk_flat += other.atk_flat;
        self.atk_pct += other.atk_pct;
        self.def_flat += other.def_flat;
        self.def_pct += other.def_pct;
        self.cr += other.cr;
        self.cd += other.cd;
        self.res += other.res;
        self.acc += other.acc;
        self.flat_spd += other.flat_spd;
    }
}

struct Finals {
    hp: i32,
    hp_no_base: i32,
    atk: i32,
    atk_no_base: i32,
    def: i32,
    def_no_base: i32,
    cr: i32,
    cd: i32,
    res: i32,
    acc: i32,
}

fn compute_finals(monster: &Monster, totals: &StatTotals) -> Finals {
    let base = &monster.base;
    let base_hp = base.hp();
    let hp_no_base = totals.hp_flat + base_hp * totals.hp_pct / 100;
    let atk_no_base = totals.atk_flat + base.atk * totals.atk_pct / 100;
    let def_no_base = totals.def_flat + base.def * totals.def_pct / 100;
    Finals {
        hp: base_hp + hp_no_base,
        hp_no_base,
        atk: base.atk + atk_no_base,
        atk_no_base,
        def: base.def + def_no_base,
        def_no_base,
        cr: base.cr + totals.cr,
        cd: base.cd + totals.cd,
        res: base.res + totals.res,
        acc: base.acc + totals.acc,
    }
}

/// Checks `build.min_stats` against the computed finals, in a fixed
/// field order (hp family, then atk, def, cr, cd, res, acc); SPD floors
/// are checked by the caller against raw/combat speed since they need
/// values this function doesn't receive.
fn check_min_stats(build: &Build, finals: &Finals) -> Result<(), ErrorKind> {
    let checks: [(Option<i32>, i32, &'static str); 8] = [
        (build.min_stats.hp, finals.hp, "hp"),
        (build.min_stats.hp_no_base, finals.hp_no_base, "hp_no_base"),
        (build.min_stats.atk, finals.atk, "atk"),
        (build.min_stats.atk_no_base, finals.atk_no_base, "atk_no_base"),
        (build.min_stats.def, finals.def, "def"),
        (build.min_stats.def_no_base, finals.def_no_base, "def_no_base"),
        (build.min_stats.cr, finals.cr, "cr"),
        (build.min_stats.cd, finals.cd, "cd"),
    ];
    for (threshold, actual, name) in checks {
        if let Some(threshold) = threshold {
            if actual < threshold {
                return Err(ErrorKind::MinStatUnreachable { stat: name, threshold });
            }
        }
    }
    if let Some(threshold) = build.min_stats.res {
        if finals.res < threshold {
            return Err(ErrorKind::MinStatUnreachable { stat: "res", threshold });
        }
    }
    if let Some(threshold) = build.min_stats.acc {
        if finals.acc < threshold {
            return Err(ErrorKind::MinStatUnreachable { stat: "acc", threshold });
        }
    }
    Ok(())
}

/// Whether `option` is realised by `chosen_sets`, allowing at most one
/// single-piece replacement sourced from an extra Intangible piece;
/// Intangible's own requirement can never itself be satisfied by a
/// replacement.
fn set_option_satisfied(chosen_sets: &[SetId], option: &[(SetId, u8)]) -> bool {
    let mut counts: BTreeMap<SetId, u32> = BTreeMap::new();
    for set_id in chosen_sets {
        *counts.entry(*set_id).or_insert(0) += 1;
    }
    let direct_intangible_needed: u32 =
        option.iter().filter(|(s, _)| s.is_intangible()).map(|(_, r)| *r as u32).sum();
    let intangible_have = counts.get(&SetId::Intangible).copied().unwrap_or(0);
    if intangible_have < direct_intangible_needed {
        return false;
    }
    let mut intangible_spare = intangible_have - direct_intangible_needed;
    let mut replacement_used = false;
    for (set_id, required) in option {
        if set_id.is_intangible() {
            continue;
        }
        let have = counts.get(set_id).copied().unwrap_or(0);
        if have >= *required as u32 {
            continue;
        }
        let deficit = *required as u32 - have;
        if deficit == 1 && !replacement_used && intangible_spare > 0 {
            replacement_used = true;
            intangible_spare -= 1;
            continue;
        }
        return false;
    }
    true
}

/// Best realised set option among `build.set_options`, scored by distance
/// to `preferred` so multi-pass refinement can rotate which option it
/// favours without changing feasibility.
fn best_set_option_bonus(chosen_sets: &[SetId], build: &Build, preferred: usize) -> Option<(usize, i64)> {
    if build.set_options.is_empty() {
        return Some((0, 0));
    }
    build
        .set_options
        .iter()
        .enumerate()
        .filter(|(_, option)| set_option_satisfied(chosen_sets, option))
        .map(|(idx, _)| {
            let distance = idx.abs_diff(preferred) as i64;
            (idx, SET_OPTION_PREFERENCE_BONUS / (1 + distance))
        })
        .max_by_key(|(_, bonus)| *bonus)
}

fn rune_score(rune: &Rune, slot: Slot, unit: MonsterId, weighting: QualityWeighting, ctx: &CpContext) -> i64 {
    if weighting == QualityWeighting::SpeedOnly {
        return StatTotals::from_rune(rune).flat_spd as i64;
    }
    let eff = round_half_to_even(efficiency_rune(rune, EffVariant::Current) * 100.0);
    let mut score = match weighting {
        QualityWeighting::Balanced => {
            let quality = if ctx.defensive {
                quality_defensive_rune(rune, unit, ctx.rta_ids)
            } else {
                quality_rune(rune, unit, ctx.rta_ids)
            };
            quality + RUNE_EFFICIENCY_WEIGHT_SOLVER * eff
        }
        QualityWeighting::EfficiencyFirst => eff,
        QualityWeighting::SpeedOnly => unreachable!(),
    };
    if let Some(baseline) = ctx.baseline {
        score += baseline.rune_retention_bonus(unit, slot, rune.rune_id);
    }
    if ctx.avoid_runes.get(&slot) == Some(&rune.rune_id) {
        score -= SAME_RUNE_PENALTY;
    }
    score
}

fn artifact_score(
    artifact: &Artifact,
    kind: ArtifactKind,
    unit: MonsterId,
    build: &Build,
    weighting: QualityWeighting,
    ctx: &CpContext,
) -> i64 {
    if weighting == QualityWeighting::SpeedOnly {
        return StatTotals::from_artifact(artifact).flat_spd as i64;
    }
    let eff = round_half_to_even(efficiency_artifact(artifact) * 100.0);
    let mut score = match weighting {
        QualityWeighting::Balanced => {
            let quality =
                if ctx.defensive { quality_defensive_artifact(artifact, unit) } else { quality_artifact(artifact, unit) };
            quality + ARTIFACT_EFFICIENCY_WEIGHT_SOLVER * eff
        }
        QualityWeighting::EfficiencyFirst => eff,
        QualityWeighting::SpeedOnly => unreachable!(),
    };
    let wanted_focus = build.artifact_focus.get(&kind).map(|v| v.as_slice()).unwrap_or(&[]);
    let wanted_substats = build.artifact_substats.get(&kind).map(|v| v.as_slice()).unwrap_or(&[]);
    score += artifact_build_bonus(artifact, wanted_focus, wanted_substats);
    if let Some(baseline) = ctx.baseline {
        score += baseline.artifact_retention_bonus(unit, kind, artifact.artifact_id);
    }
    if ctx.avoid_artifacts.get(&kind) == Some(&artifact.artifact_id) {
        score -= SAME_ARTIFACT_PENALTY;
    }
    score
}

/// One candidate pool entry, pre-scored and sorted best-first so the
/// depth-first search below explores its most promising branch first
/// and the running upper bound prunes aggressively.
struct ScoredRune<'a> {
    rune: &'a Rune,
    score: i64,
}

struct ScoredArtifact<'a> {
    artifact: &'a Artifact,
    score: i64,
}

fn filter_and_score_runes<'a>(
    candidates: &[&'a Rune],
    slot: Slot,
    build: &Build,
    unit: MonsterId,
    weighting: QualityWeighting,
    ctx: &CpContext,
) -> Result<Vec<ScoredRune<'a>>, ErrorKind> {
    let allowed = build.mainstats_for(slot);
    let mut scored: Vec<ScoredRune> = candidates
        .iter()
        .filter(|r| match (allowed, r.main_stat_key()) {
            (None, _) => true,
            (Some(keys), Some(key)) => keys.contains(&key),
            (Some(_), None) => false,
        })
        .map(|&rune| ScoredRune { rune, score: rune_score(rune, slot, unit, weighting, ctx) })
        .collect();
    if scored.is_empty() {
        return Err(ErrorKind::MainstatUnavailable {
            slot,
            allowed_keys: allowed.map(|k| k.to_vec()).unwrap_or_default(),
        });
    }
    scored.sort_by(|a, b| b.score.cmp(&a.score).then(a.rune.rune_id.cmp(&b.rune.rune_id)));
    Ok(scored)
}

fn filter_and_score_artifacts<'a>(
    candidates: &[&'a Artifact],
    kind: ArtifactKind,
    build: &Build,
    unit: MonsterId,
    weighting: QualityWeighting,
    ctx: &CpContext,
) -> Result<Vec<ScoredArtifact<'a>>, ErrorKind> {
    let wanted_focus = build.artifact_focus.get(&kind).map(|v| v.as_slice()).unwrap_or(&[]);
    let wanted_substats: &[EffectId] = build.artifact_substats.get(&kind).map(|v| v.as_slice()).unwrap_or(&[]);
    let mut scored: Vec<ScoredArtifact> = candidates
        .iter()
        .filter(|a| {
            let focus_ok = wanted_focus.is_empty() || a.focus().is_some_and(|f| wanted_focus.contains(&f));
            let substats_ok =
                wanted_substats.is_empty() || wanted_substats.iter().any(|id| a.sub_effect_ids().any(|have| have == *id));
            focus_ok && substats_ok
        })
        .map(|&artifact| ScoredArtifact { artifact, score: artifact_score(artifact, kind, unit, build, weighting, ctx) })
        .collect();
    if scored.is_empty() {
        return Err(ErrorKind::ArtifactFilterUnsatisfiable {
            kind,
            focus: wanted_focus.to_vec(),
            substats: wanted_substats.to_vec(),
        });
    }
    scored.sort_by(|a, b| b.score.cmp(&a.score).then(a.artifact.artifact_id.cmp(&b.artifact.artifact_id)));
    Ok(scored)
}

struct BuildSearch<'a> {
    monster: &'a Monster,
    build: &'a Build,
    slots: [Vec<ScoredRune<'a>>; 6],
    artifact_types: [Vec<ScoredArtifact<'a>>; 2],
    suffix_best: [i64; 7],
    artifact_suffix_best: [i64; 3],
    weighting: QualityWeighting,
    speed_floor: Option<i32>,
    /// Weight applied to `final_combat_spd` in the leaf objective:
    /// `SOFT_SPEED_WEIGHT` for `QualityFirst`, `1` for `SpeedFirst`'s
    /// quality re-solve phase. Unused when `weighting` is `SpeedOnly`,
    /// which maximises `final_combat_spd` directly.
    speed_weight: i64,
    ctx: &'a CpContext<'a>,
    best: Option<CpSolution>,
    best_objective: i64,
}

impl<'a> BuildSearch<'a> {
    fn run(&mut self) {
        let mut rune_pick: [Option<usize>; 6] = [None; 6];
        self.search_slots(0, &mut rune_pick, StatTotals::default(), 0);
    }

    fn search_slots(&mut self, slot_idx: usize, picks: &mut [Option<usize>; 6], totals: StatTotals, score: i64) {
        if slot_idx == 6 {
            let mut artifact_pick: [Option<usize>; 2] = [None; 2];
            self.search_artifacts(0, picks, &mut artifact_pick, totals, score);
            return;
        }
        if score + self.suffix_best[slot_idx] <= self.best_objective && self.best.is_some() {
            return;
        }
        for idx in 0..self.slots[slot_idx].len() {
            picks[slot_idx] = Some(idx);
            let rune = self.slots[slot_idx][idx].rune;
            let mut next_totals = totals;
            next_totals.merge(&StatTotals::from_rune(rune));
            self.search_slots(slot_idx + 1, picks, next_totals, score + self.slots[slot_idx][idx].score);
        }
        picks[slot_idx] = None;
    }

    fn search_artifacts(
        &mut self,
        type_idx: usize,
        rune_picks: &[Option<usize>; 6],
        artifact_picks: &mut [Option<usize>; 2],
        totals: StatTotals,
        score: i64,
    ) {
        if type_idx == 2 {
            self.evaluate_leaf(rune_picks, artifact_picks, totals, score);
            return;
        }
        if score + self.artifact_suffix_best[type_idx] <= self.best_objective && self.best.is_some() {
            return;
        }
        for idx in 0..self.artifact_types[type_idx].len() {
            artifact_picks[type_idx] = Some(idx);
            let artifact = self.artifact_types[type_idx][idx].artifact;
            let mut next_totals = totals;
            next_totals.merge(&StatTotals::from_artifact(artifact));
            self.search_artifacts(
                type_idx + 1,
                rune_picks,
                artifact_picks,
                next_totals,
                score + self.artifact_types[type_idx][idx].score,
            );
        }
        artifact_picks[type_idx] = None;
    }

    fn evaluate_leaf(
        &mut self,
        rune_picks: &[Option<usize>; 6],
        artifact_picks: &[Option<usize>; 2],
        totals: StatTotals,
        base_score: i64,
    ) {
        let mut sets = Vec::with_capacity(6);
        for (slot_idx, pick) in rune_picks.iter().enumerate() {
            let idx = pick.expect("all six slots are filled at a leaf");
            sets.push(self.slots[slot_idx][idx].rune.set_id);
        }

        let Some((option_idx, option_bonus)) = best_set_option_bonus(&sets, self.build, self.ctx.preferred_set_option)
        else {
            return;
        };

        let swift_count = sets.iter().filter(|s| **s == SetId::Swift).count();
        let swift_active = swift_count >= 4;
        let base_spd = self.monster.base.spd;
        let swift_bonus = if swift_active { base_spd * SWIFT_BONUS_PCT / 100 } else { 0 };
        let final_raw_spd = base_spd + totals.flat_spd + swift_bonus;
        let final_combat_spd =
            final_raw_spd + self.ctx.spd_leader_bonus_flat + final_raw_spd * self.ctx.totem_spd_pct / 100;

        if let Some(cap) = self.ctx.max_final_combat_spd {
            if final_combat_spd > cap {
                return;
            }
        }
        if let Some(floor) = self.speed_floor {
            if final_combat_spd < floor {
                return;
            }
        }
        if let Some(floor) = self.ctx.min_final_combat_spd {
            if final_combat_spd < floor {
                return;
            }
        }
        if let Some(tick) = self.build.spd_tick {
            if let Some(min_spd) = tick.min_combat_spd() {
                if final_combat_spd < min_spd {
                    return;
                }
            }
            if let Some(max_spd) = tick.max_combat_spd() {
                if final_combat_spd > max_spd {
                    return;
                }
            }
        }
        if let Some(spd_min) = self.build.min_stats.spd {
            if final_raw_spd < spd_min {
                return;
            }
        }
        if let Some(spd_no_base_min) = self.build.min_stats.spd_no_base {
            if final_raw_spd - base_spd < spd_no_base_min {
                return;
            }
        }

        let finals = compute_finals(self.monster, &totals);
        if check_min_stats(self.build, &finals).is_err() {
            return;
        }

        let priority_penalty = self.build.priority as i64 * BUILD_PRIORITY_PENALTY;
        let total_objective = if self.weighting == QualityWeighting::SpeedOnly {
            final_combat_spd as i64
        } else {
            base_score + option_bonus - priority_penalty + self.speed_weight * final_combat_spd as i64
        };

        if self.best.is_none() || total_objective > self.best_objective {
            let mut runes_by_slot = BTreeMap::new();
            for (slot_idx, pick) in rune_picks.iter().enumerate() {
                let idx = pick.unwrap();
                let slot = Slot::new(slot_idx as u8 + 1).unwrap();
                runes_by_slot.insert(slot, self.slots[slot_idx][idx].rune.rune_id);
            }
            let mut artifacts_by_type = BTreeMap::new();
            for (type_idx, pick) in artifact_picks.iter().enumerate() {
                let idx = pick.unwrap();
                let kind = crate::domain::ArtifactKind::ALL[type_idx];
                artifacts_by_type.insert(kind, self.artifact_types[type_idx][idx].artifact.artifact_id);
            }
            let _ = option_idx;
            self.best_objective = total_objective;
            self.best = Some(CpSolution {
                build_index: 0,
                build_name: self.build.name.clone(),
                runes_by_slot,
                artifacts_by_type,
                final_raw_spd,
                final_combat_spd,
                objective: total_objective,
            });
        }
    }
}

fn suffix_bests(slots: &[Vec<ScoredRune>; 6]) -> [i64; 7] {
    let mut suffix = [0i64; 7];
    for i in (0..6).rev() {
        let best = slots[i].first().map(|s| s.score).unwrap_or(0);
        suffix[i] = suffix[i + 1] + best;
    }
    suffix
}

fn artifact_suffix_bests(types: &[Vec<ScoredArtifact>; 2]) -> [i64; 3] {
    let mut suffix = [0i64; 3];
    for i in (0..2).rev() {
        let best = types[i].first().map(|s| s.score).unwrap_or(0);
        suffix[i] = suffix[i + 1] + best;
    }
    suffix
}

/// Solves a single build variant for `unit`, returning the best feasible
/// rune/artifact assignment or the structural cause that ruled every
/// candidate out.
#[allow(clippy::too_many_arguments)]
fn solve_build_variant(
    monster: &Monster,
    build: &Build,
    pool: &crate::pruner::CandidatePool,
    unit: MonsterId,
    weighting: QualityWeighting,
    speed_floor: Option<i32>,
    speed_weight: i64,
    ctx: &CpContext,
) -> CpOutcome {
    let mut slots: [Vec<ScoredRune>; 6] = Default::default();
    for slot in Slot::ALL {
        let idx = slot.get() as usize - 1;
        slots[idx] = filter_and_score_runes(pool.slot(slot), slot, build, unit, weighting, ctx)?;
    }
    let mut artifact_types: [Vec<ScoredArtifact>; 2] = Default::default();
    for kind in ArtifactKind::ALL {
        let idx = kind as usize - 1;
        artifact_types[idx] = filter_and_score_artifacts(pool.kind(kind), kind, build, unit, weighting, ctx)?;
    }

    let suffix_best = suffix_bests(&slots);
    let artifact_suffix_best = artifact_suffix_bests(&artifact_types);
    let mut search = BuildSearch {
        monster,
        build,
        slots,
        artifact_types,
        suffix_best,
        artifact_suffix_best,
        weighting,
        speed_floor,
        speed_weight,
        ctx,
        best: None,
        best_objective: i64::MIN,
    };
    search.run();

    search.best.ok_or_else(|| diagnose_infeasibility(pool))
}

/// Fixed diagnostic order: empty slot, then empty artifact type, since a
/// filtered-candidate failure already returned earlier with its own
/// specific reason.
fn diagnose_infeasibility(pool: &crate::pruner::CandidatePool) -> ErrorKind {
    for slot in Slot::ALL {
        if pool.slot(slot).is_empty() {
            return ErrorKind::SlotHasNoCandidates(slot);
        }
    }
    for kind in ArtifactKind::ALL {
        if pool.kind(kind).is_empty() {
            return match kind {
                ArtifactKind::Attribute => ErrorKind::NoAttributeArtifact,
                ArtifactKind::Type => ErrorKind::NoTypeArtifact,
            };
        }
    }
    ErrorKind::MinStatUnreachable { stat: "combined", threshold: 0 }
}

/// Solves every build variant for `unit` (outer loop bounded by the
/// number of variants, typically small) and returns the best feasible
/// solution across all of them, or the first variant's diagnostic if
/// none succeed.
pub fn solve_monster(
    monster: &Monster,
    builds: &[Build],
    pool: &crate::pruner::CandidatePool,
    mode: SolveMode,
    ctx: &CpContext,
) -> CpOutcome {
    if builds.is_empty() {
        return Err(ErrorKind::SlotHasNoCandidates(Slot::ALL[0]));
    }

    let mut best: Option<CpSolution> = None;
    let mut first_error: Option<ErrorKind> = None;

    for (build_index, build) in builds.iter().enumerate() {
        let outcome = match mode {
            SolveMode::QualityFirst(weighting) => {
                solve_build_variant(monster, build, pool, monster.id, weighting, None, SOFT_SPEED_WEIGHT, ctx)
            }
            SolveMode::SpeedFirst { speed_slack } => {
                let fastest =
                    solve_build_variant(monster, build, pool, monster.id, QualityWeighting::SpeedOnly, None, 0, ctx);
                match fastest {
                    Ok(fast) => {
                        let floor = fast.final_combat_spd - speed_slack;
                        solve_build_variant(
                            monster,
                            build,
                            pool,
                            monster.id,
                            QualityWeighting::Balanced,
                            Some(floor),
                            1,
                            ctx,
                        )
                    }
                    Err(e) => Err(e),
                }
            }
        };

        match outcome {
            Ok(mut solution) => {
                solution.build_index = build_index;
                if best.as_ref().is_none_or(|b| solution.objective > b.objective) {
                    best = Some(solution);
                }
            }
            Err(err) if first_error.is_none() => first_error = Some(err),
            Err(_) => {}
        }
    }

    best.ok_or_else(|| first_error.unwrap_or(ErrorKind::SlotHasNoCandidates(Slot::ALL[0])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::*;
    use crate::pruner::{prune, PrunerConfig};
    use std::collections::BTreeSet;

    fn monster(spd: i32) -> Monster {
        Monster {
            id: MonsterId(1),
            master_id: 1,
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

    #[test]
    fn single_monster_no_constraints_picks_all_six_speed_runes() {
        let m = monster(100);
        let runes: Vec<Rune> = Slot::ALL.iter().map(|s| spd_rune(s.get() as u32, s.get())).collect();
        let artifacts = vec![artifact(1, ArtifactKind::Attribute), artifact(2, ArtifactKind::Type)];
        let config = PrunerConfig::default();
        let (pool, _) = prune(&runes, &artifacts, Mode::Siege, &config, &BTreeSet::new(), &BTreeSet::new());

        let build = Build::default();
        let ctx = CpContext::default();
        let solution = solve_monster(&m, &[build], &pool, SolveMode::QualityFirst(QualityWeighting::Balanced), &ctx)
            .expect("feasible");

        assert_eq!(solution.runes_by_slot.len(), 6);
        assert_eq!(solution.final_raw_spd, 100 + 6 * 20);
    }

    #[test]
    fn missing_slot_candidate_reports_slot_has_no_candidates() {
        let m = monster(100);
        let runes: Vec<Rune> = (2..=6).map(|s| spd_rune(s, s as u8)).collect();
        let artifacts = vec![artifact(1, ArtifactKind::Attribute), artifact(2, ArtifactKind::Type)];
        let config = PrunerConfig::default();
        let (pool, _) = prune(&runes, &artifacts, Mode::Siege, &config, &BTreeSet::new(), &BTreeSet::new());
        let build = Build::default();
        let ctx = CpContext::default();

        let err = solve_monster(&m, &[build], &pool, SolveMode::QualityFirst(QualityWeighting::Balanced), &ctx).unwrap_err();
        assert_eq!(err, ErrorKind::SlotHasNoCandidates(Slot::new(1).unwrap()));
    }

    #[test]
    fn set_option_satisfied_allows_one_intangible_replacement() {
        let chosen = vec![SetId::Swift, SetId::Swift, SetId::Swift, SetId::Intangible, SetId::Intangible, SetId::Fatal];
        let option = vec![(SetId::Swift, 4)];
        assert!(set_option_satisfied(&chosen, &option));
    }

    #[test]
    fn set_option_rejects_two_missing_pieces_even_with_intangible() {
        let chosen = vec![SetId::Swift, SetId::Swift, SetId::Intangible, SetId::Fatal, SetId::Fatal, SetId::Fatal];
        let option = vec![(SetId::Swift, 4)];
        assert!(!set_option_satisfied(&chosen, &option));
    }
}
