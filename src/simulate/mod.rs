//! Opening simulation, a direct port of
//! `original_source/app/engine/arena_rush_timing.py`'s ATB tick model into
//! owned map-based state instead of loose dicts.

use crate::api::OpeningTurnEffect;
use crate::domain::MonsterId;
use std::collections::BTreeMap;

/// SPD buff a caster's action turns on for the team
/// (`original_source/app/engine/arena_rush_timing.py`).
pub const BASE_SPD_BUFF_PCT: f64 = 30.0;
/// ATB gained per tick, as a percentage of effective SPD.
pub const ATB_GAIN_PER_TICK_PCT: f64 = 7.0;

const ATB_FULL: f64 = 100.0;

struct UnitState {
    atb: f64,
    spd_buff_active: bool,
    acted_once: bool,
    combat_spd: i32,
    artifact_spd_buff_increase_pct: f64,
}

impl UnitState {
    fn effective_spd(&self) -> f64 {
        if self.spd_buff_active {
            self.combat_spd as f64 * (1.0 + (BASE_SPD_BUFF_PCT / 100.0) * (1.0 + self.artifact_spd_buff_increase_pct / 100.0))
        } else {
            self.combat_spd as f64
        }
    }
}

/// Simulates the opening turns of a team and returns the ordered list of
/// actors. `combat_spd_by_unit` and `artifact_spd_buff_increase_by_unit`
/// give each unit's final combat SPD and total "SPD Increasing Effect %"
/// from its artifacts; `expected_order` supplies the `-expected_order_position`
/// tie-break used to keep the simulation deterministic when several units
/// are equally ready to act.
pub fn simulate_opening_order(
    unit_ids: &[MonsterId],
    combat_spd_by_unit: &BTreeMap<MonsterId, i32>,
    artifact_spd_buff_increase_by_unit: &BTreeMap<MonsterId, f64>,
    turn_effects_by_unit: &BTreeMap<MonsterId, OpeningTurnEffect>,
    expected_order: &[MonsterId],
    max_actions: Option<usize>,
) -> Vec<MonsterId> {
    let expected_position: BTreeMap<MonsterId, usize> =
        expected_order.iter().enumerate().map(|(i, &u)| (u, i)).collect();

    let mut units: BTreeMap<MonsterId, UnitState> = unit_ids
        .iter()
        .map(|&id| {
            (
                id,
                UnitState {
                    atb: 0.0,
                    spd_buff_active: false,
                    acted_once: false,
                    combat_spd: combat_spd_by_unit.get(&id).copied().unwrap_or(0),
                    artifact_spd_buff_increase_pct: artifact_spd_buff_increase_by_unit.get(&id).copied().unwrap_or(0.0),
                },
            )
        })
        .collect();

    let action_limit = max_actions.unwrap_or(unit_ids.len());
    let safety_steps = (action_limit * 20).max(16);
    let mut actors = Vec::with_capacity(action_limit);

    for _ in 0..safety_steps {
        if actors.len() >= action_limit {
            break;
        }

        let min_ticks_to_ready = units
            .values()
            .filter(|u| u.effective_spd() > 0.0)
            .map(|u| {
                let remaining = (ATB_FULL - u.atb).max(0.0);
                let gain_per_tick = (ATB_GAIN_PER_TICK_PCT / 100.0) * u.effective_spd();
                (remaining / gain_per_tick).ceil() as u64
            })
            .min();

        let Some(ticks) = min_ticks_to_ready else { break };

        if ticks > 0 {
            for unit in units.values_mut() {
                let gain = (ATB_GAIN_PER_TICK_PCT / 100.0) * unit.effective_spd() * ticks as f64;
                unit.atb += gain;
            }
        }

        let actor_id = units
            .iter()
            .filter(|(_, u)| u.atb >= ATB_FULL)
            .max_by(|(id_a, a), (id_b, b)| {
                a.atb
                    .partial_cmp(&b.atb)
                    .unwrap()
                    .then_with(|| a.effective_spd().partial_cmp(&b.effective_spd()).unwrap())
                    .then_with(|| {
                        let pos_a = expected_position.get(id_a).copied().unwrap_or(usize::MAX);
                        let pos_b = expected_position.get(id_b).copied().unwrap_or(usize::MAX);
                        pos_b.cmp(&pos_a)
                    })
            })
            .map(|(&id, _)| id);

        let Some(actor_id) = actor_id else { break };

        {
            let actor = units.get_mut(&actor_id).unwrap();
            actor.atb = (actor.atb - ATB_FULL).max(0.0);
            actor.acted_once = true;
        }
        actors.push(actor_id);

        if let Some(effect) = turn_effects_by_unit.get(&actor_id) {
            for (&uid, unit) in units.iter_mut() {
                let is_caster = uid == actor_id;
                if is_caster && !effect.include_caster {
                    continue;
                }
                unit.atb = (unit.atb + effect.atb_boost_pct).min(ATB_FULL * 2.0);
                if effect.applies_spd_buff {
                    unit.spd_buff_active = true;
                }
            }
        }
    }

    actors
}

/// `Σ_i penalty(i)`: a correctly placed actor contributes 0, a mismatch at
/// position `i` contributes `1 + i`, a missing actor at position `i`
/// contributes `(team_size - i) * 5`.
pub fn opening_order_penalty(expected: &[MonsterId], observed: &[MonsterId]) -> i64 {
    let team_size = expected.len() as i64;
    let mut penalty = 0i64;
    for (i, expected_unit) in expected.iter().enumerate() {
        match observed.get(i) {
            Some(actual) if actual == expected_unit => {}
            Some(_) => penalty += 1 + i as i64,
            None => penalty += (team_size - i as i64) * 5,
        }
    }
    penalty
}

/// Pre-flight speed floor for `target` so that, if `caster` acts as
/// expected before it, `target`'s turn still lands after the caster's
/// broadcasted ATB boost and SPD buff are accounted for:
/// `ceil(caster_spd * (1 - atb_boost/100) / (1 + effective_spd_buff/100))`
/// (`arena_rush_timing.py`).
pub fn min_speed_floor_from_caster(caster_combat_spd: i32, effect: &OpeningTurnEffect, artifact_spd_buff_increase_pct: f64) -> i32 {
    let effective_spd_buff =
        if effect.applies_spd_buff { BASE_SPD_BUFF_PCT * (1.0 + artifact_spd_buff_increase_pct / 100.0) } else { 0.0 };
    let numerator = caster_combat_spd as f64 * (1.0 - effect.atb_boost_pct / 100.0);
    let denominator = 1.0 + effective_spd_buff / 100.0;
    (numerator / denominator).ceil() as i32
}

/// Per-unit floor folding in every caster that precedes it in
/// `expected_order` and carries an opening-turn effect, taking the max
/// over all such casters.
pub fn min_speed_floor_by_unit_from_effects(
    expected_order: &[MonsterId],
    combat_spd_by_unit: &BTreeMap<MonsterId, i32>,
    artifact_spd_buff_increase_by_unit: &BTreeMap<MonsterId, f64>,
    turn_effects_by_unit: &BTreeMap<MonsterId, OpeningTurnEffect>,
) -> BTreeMap<MonsterId, i32> {
    let mut floors: BTreeMap<MonsterId, i32> = BTreeMap::new();
    for (caster_pos, &caster_id) in expected_order.iter().enumerate() {
        let Some(effect) = turn_effects_by_unit.get(&caster_id) else { continue };
        let Some(&caster_spd) = combat_spd_by_unit.get(&caster_id) else { continue };
        let artifact_pct = artifact_spd_buff_increase_by_unit.get(&caster_id).copied().unwrap_or(0.0);
        let floor = min_speed_floor_from_caster(caster_spd, effect, artifact_pct);
        for &target_id in &expected_order[caster_pos + 1..] {
            let entry = floors.entry(target_id).or_insert(i32::MIN);
            *entry = (*entry).max(floor);
        }
    }
    floors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correctly_ordered_opening_has_zero_penalty() {
        let order = vec![MonsterId(1), MonsterId(2), MonsterId(3)];
        assert_eq!(opening_order_penalty(&order, &order), 0);
    }

    #[test]
    fn mismatch_at_position_costs_one_plus_index() {
        let expected = vec![MonsterId(1), MonsterId(2)];
        let observed = vec![MonsterId(2), MonsterId(1)];
        assert_eq!(opening_order_penalty(&expected, &observed), 1 + 0);
    }

    #[test]
    fn missing_actor_costs_remaining_size_times_five() {
        let expected = vec![MonsterId(1), MonsterId(2), MonsterId(3)];
        let observed = vec![MonsterId(1)];
        assert_eq!(opening_order_penalty(&expected, &observed), (3 - 1) * 5 + (3 - 2) * 5);
    }

    #[test]
    fn fastest_unit_acts_first_with_no_effects() {
        let units = vec![MonsterId(1), MonsterId(2)];
        let mut spd = BTreeMap::new();
        spd.insert(MonsterId(1), 100);
        spd.insert(MonsterId(2), 200);
        let order = simulate_opening_order(&units, &spd, &BTreeMap::new(), &BTreeMap::new(), &[], Some(1));
        assert_eq!(order, vec![MonsterId(2)]);
    }

    #[test]
    fn atb_boost_effect_advances_a_teammates_next_action() {
        let units = vec![MonsterId(1), MonsterId(2)];
        let mut spd = BTreeMap::new();
        spd.insert(MonsterId(1), 200);
        spd.insert(MonsterId(2), 100);
        let mut effects = BTreeMap::new();
        effects.insert(MonsterId(1), OpeningTurnEffect { atb_boost_pct: 50.0, applies_spd_buff: false, include_caster: false });
        let order = simulate_opening_order(&units, &spd, &BTreeMap::new(), &effects, &[], Some(2));
        assert_eq!(order[0], MonsterId(1));
        assert_eq!(order.len(), 2);
    }

    #[test]
    fn min_speed_floor_accounts_for_atb_boost_and_spd_buff() {
        let effect = OpeningTurnEffect { atb_boost_pct: 20.0, applies_spd_buff: true, include_caster: true };
        let floor = min_speed_floor_from_caster(200, &effect, 0.0);
        // ceil(200 * 0.8 / 1.3) = ceil(123.07..) = 124
        assert_eq!(floor, 124);
    }
}
