use super::rune_quality::score_rune_with;
use crate::domain::{MainStatKey, MonsterId, Rune, RuneId};

/// Defensive-archetype stat weights: HP%/DEF%/RES/ACC climb
/// relative to the offensive table in `rune_quality`, ATK%/CR/CD fall.
fn defensive_weight(stat: MainStatKey) -> i64 {
    match stat {
        MainStatKey::HpFlat => 2,
        MainStatKey::HpPct => 16,
        MainStatKey::AtkFlat => 1,
        MainStatKey::AtkPct => 2,
        MainStatKey::DefFlat => 2,
        MainStatKey::DefPct => 13,
        MainStatKey::Spd => 18,
        MainStatKey::Cr => 4,
        MainStatKey::Cd => 3,
        MainStatKey::Res => 11,
        MainStatKey::Acc => 9,
    }
}

/// CR past 100% and CD past 200% cannot raise a monster's actual hit rate
/// or crit damage once the team's other pieces already cover the cap, so a
/// single rune's crit rolls are worth less than the raw weight table says.
/// This is a per-rune proxy discount (the function has no team context to
/// check the real total against) rather than an exact over-cap computation.
const OVERCAP_DISCOUNT_NUM: i64 = 2;
const OVERCAP_DISCOUNT_DEN: i64 = 3;

fn overcap_discount(stat: MainStatKey, value: i32) -> i64 {
    let weight = defensive_weight(stat);
    let raw = weight * value as i64;
    raw * OVERCAP_DISCOUNT_NUM / OVERCAP_DISCOUNT_DEN
}

/// Archetype-aware defensive quality score: same shape as `quality_rune`
/// but reweighted toward survivability stats, with crit rolls discounted
/// for diminishing team-wide value.
pub fn quality_defensive_rune(rune: &Rune, uid: MonsterId, rta_ids: Option<&[RuneId]>) -> i64 {
    let mut score = score_rune_with(rune, uid, rta_ids, defensive_weight);

    for sub in &rune.sub_effects {
        if let Some(MainStatKey::Cr) | Some(MainStatKey::Cd) = MainStatKey::from_effect_id(sub.effect_id) {
            let stat = MainStatKey::from_effect_id(sub.effect_id).unwrap();
            let full = defensive_weight(stat) * sub.total_value() as i64;
            score -= full - overcap_discount(stat, sub.total_value());
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::*;

    fn rune_with_main(effect_id: u16, value: i32) -> Rune {
        Rune {
            rune_id: RuneId(1),
            slot_no: Slot::new(1).unwrap(),
            set_id: SetId::Will,
            quality_class: QualityClass::Legend,
            rank: 6,
            upgrade_level: 15,
            main_effect: Effect { effect_id: EffectId(effect_id), value },
            prefix_effect: None,
            sub_effects: vec![],
            occupant: Occupant::Nobody,
        }
    }

    #[test]
    fn defensive_score_favors_hp_pct_over_atk_pct_mainstat() {
        let hp = rune_with_main(7, 63);
        let atk = rune_with_main(4, 63);
        assert!(
            quality_defensive_rune(&hp, MonsterId(1), None) > quality_defensive_rune(&atk, MonsterId(1), None)
        );
    }

    #[test]
    fn crit_rate_substat_is_discounted_versus_its_raw_weight() {
        let mut rune = rune_with_main(8, 0);
        rune.sub_effects = vec![SubEffect { effect_id: EffectId(9), base_value: 12, gemmed: false, grind_value: 0 }];
        let baseline = rune_with_main(8, 0);

        let with_cr = quality_defensive_rune(&rune, MonsterId(1), None);
        let without = quality_defensive_rune(&baseline, MonsterId(1), None);
        let delta = with_cr - without;
        let raw = defensive_weight(MainStatKey::Cr) * 12;
        assert!(delta > 0 && delta < raw);
    }
}
