use crate::domain::{EffectId, MainStatKey, MonsterId, Rune};

const EVEN_SLOT_FLAT_MAIN_PENALTY: i64 = -140;
pub(super) const RUNE_SAME_OWNER_BONUS: i64 = 45;

fn score_stat_with(weight: impl Fn(MainStatKey) -> i64, effect_id: EffectId, value: i32) -> i64 {
    MainStatKey::from_effect_id(effect_id)
        .map(|key| weight(key) * value as i64)
        .unwrap_or(0)
}

fn score_stat(effect_id: EffectId, value: i32) -> i64 {
    score_stat_with(MainStatKey::score_weight, effect_id, value)
}

pub(super) fn currently_equipped(rune: &Rune, uid: MonsterId, rta_ids: Option<&[crate::domain::RuneId]>) -> bool {
    match rta_ids {
        Some(ids) => ids.contains(&rune.rune_id),
        None => matches!(rune.occupant, crate::domain::Occupant::Unit(owner) if owner == uid),
    }
}

/// Shared shape between the offensive and defensive rune scores: only the
/// per-stat weighting function differs.
pub(super) fn score_rune_with(
    rune: &Rune,
    uid: MonsterId,
    rta_ids: Option<&[crate::domain::RuneId]>,
    weight: impl Fn(MainStatKey) -> i64 + Copy,
) -> i64 {
    let mut score = 0i64;
    score += rune.upgrade_level as i64 * 8;
    score += rune.rank as i64 * 6;
    score += rune.quality_class.rank() * 10;
    score += rune.set_id.quality_bonus();

    score += score_stat_with(weight, rune.main_effect.effect_id, rune.main_effect.value);
    if let Some(prefix) = rune.prefix_effect {
        score += score_stat_with(weight, prefix.effect_id, prefix.value);
    }

    let main_key = MainStatKey::from_effect_id(rune.main_effect.effect_id);
    let is_good_even = main_key.map(|k| k.is_good_even_slot_mainstat()).unwrap_or(true);
    if rune.slot_no.is_even() && !is_good_even {
        score += EVEN_SLOT_FLAT_MAIN_PENALTY;
    }

    for sub in &rune.sub_effects {
        score += score_stat_with(weight, sub.effect_id, sub.total_value());
    }

    if currently_equipped(rune, uid, rta_ids) {
        score += RUNE_SAME_OWNER_BONUS;
    }

    score
}

/// Quality score of `rune` as if owned by `uid`. `rta_ids`,
/// when `Some`, switches the "currently equipped" bonus to the RTA
/// equipment map instead of the PvE `occupant` field.
pub fn quality_rune(rune: &Rune, uid: MonsterId, rta_ids: Option<&[crate::domain::RuneId]>) -> i64 {
    score_rune_with(rune, uid, rta_ids, MainStatKey::score_weight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::*;

    fn base_rune() -> Rune {
        Rune {
            rune_id: RuneId(1),
            slot_no: Slot::new(2).unwrap(),
            set_id: SetId::Swift,
            quality_class: QualityClass::Legend,
            rank: 6,
            upgrade_level: 15,
            main_effect: Effect { effect_id: EffectId(8), value: 30 },
            prefix_effect: None,
            sub_effects: vec![],
            occupant: Occupant::Nobody,
        }
    }

    #[test]
    fn even_slot_flat_mainstat_is_penalized() {
        let mut flat = base_rune();
        flat.main_effect = Effect { effect_id: EffectId(1), value: 300 };
        let mut spd = base_rune();
        spd.main_effect = Effect { effect_id: EffectId(8), value: 30 };

        let flat_score = quality_rune(&flat, MonsterId(1), None);
        let spd_score = quality_rune(&spd, MonsterId(1), None);
        assert!(flat_score < spd_score);
    }

    #[test]
    fn currently_equipped_rune_gets_owner_bonus() {
        let mut r = base_rune();
        r.occupant = Occupant::Unit(MonsterId(7));
        let equipped = quality_rune(&r, MonsterId(7), None);
        let unequipped = quality_rune(&r, MonsterId(8), None);
        assert_eq!(equipped - unequipped, 45);
    }

    #[test]
    fn rta_mode_checks_rta_equipment_set_instead_of_occupant() {
        let r = base_rune();
        let rta_ids = [RuneId(1)];
        let equipped = quality_rune(&r, MonsterId(1), Some(&rta_ids));
        let unequipped = quality_rune(&r, MonsterId(1), Some(&[]));
        assert_eq!(equipped - unequipped, 45);
    }
}
