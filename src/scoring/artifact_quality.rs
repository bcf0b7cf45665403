use crate::domain::{Artifact, EffectId, MonsterId};

const ARTIFACT_SAME_OWNER_BONUS: i64 = 60;
pub const ARTIFACT_BUILD_FOCUS_BONUS: i64 = 35;
pub const ARTIFACT_BUILD_MATCH_BONUS: i64 = 140;
pub const ARTIFACT_BUILD_VALUE_WEIGHT: i64 = 6;

/// Quality score of an artifact as if owned by `uid`.
pub fn quality_artifact(artifact: &Artifact, uid: MonsterId) -> i64 {
    let mut score = 0i64;
    score += artifact.level as i64 * 8;
    score += artifact.original_rank as i64 * 6;
    for sub in &artifact.sec_effects {
        score += (sub.value as f64 * 4.0).round() as i64;
    }
    if matches!(artifact.occupant, crate::domain::Occupant::Unit(owner) if owner == uid) {
        score += ARTIFACT_SAME_OWNER_BONUS;
    }
    score
}

/// Build-aware bonus for an artifact: a flat reward when the artifact's
/// focus matches the build's requested focus, plus a per-matching-substat
/// reward scaled by the substat's rolled value.
pub fn artifact_build_bonus(
    artifact: &Artifact,
    wanted_focus: &[crate::domain::FocusKey],
    wanted_substats: &[EffectId],
) -> i64 {
    let mut bonus = 0i64;
    if let Some(focus) = artifact.focus() {
        if wanted_focus.contains(&focus) {
            bonus += ARTIFACT_BUILD_FOCUS_BONUS;
        }
    }
    for sub in &artifact.sec_effects {
        if wanted_substats.contains(&sub.effect_id) {
            bonus += ARTIFACT_BUILD_MATCH_BONUS + sub.value as i64 * ARTIFACT_BUILD_VALUE_WEIGHT;
        }
    }
    bonus
}

/// Effect ids for the defensive combat rolls an artifact can carry:
/// damage received reduction and crit damage received reduction. These do
/// not appear in `MainStatKey` because they never participate in base
/// stat math — they are scoring-only signal.
pub const DAMAGE_RECEIVED_REDUCTION_EFFECT_ID: EffectId = EffectId(300);
pub const CD_RECEIVED_REDUCTION_EFFECT_ID: EffectId = EffectId(301);

const DEFENSIVE_SUBSTAT_WEIGHT: i64 = 6;
const ATK_MAIN_PENALTY: i64 = -80;

/// Archetype-aware defensive variant: penalises an ATK main-stat focus and
/// rewards HP/DEF/RES substats plus defensive combat rolls.
pub fn quality_defensive_artifact(artifact: &Artifact, uid: MonsterId) -> i64 {
    let mut score = quality_artifact(artifact, uid);
    if artifact.focus() == Some(crate::domain::FocusKey::Atk) {
        score += ATK_MAIN_PENALTY;
    }
    for sub in &artifact.sec_effects {
        if sub.effect_id == DAMAGE_RECEIVED_REDUCTION_EFFECT_ID || sub.effect_id == CD_RECEIVED_REDUCTION_EFFECT_ID {
            score += sub.value as i64 * DEFENSIVE_SUBSTAT_WEIGHT;
        }
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::*;

    fn artifact(focus_effect: u16, subs: &[(u16, i32)]) -> Artifact {
        Artifact {
            artifact_id: ArtifactId(1),
            kind: ArtifactKind::Type,
            attribute: None,
            rank: 5,
            level: 12,
            original_rank: 5,
            pri_effect: Effect { effect_id: EffectId(focus_effect), value: 80 },
            sec_effects: subs
                .iter()
                .map(|&(id, v)| ArtifactSubEffect { effect_id: EffectId(id), value: v, rolls: 3 })
                .collect(),
            occupant: Occupant::Nobody,
        }
    }

    #[test]
    fn focus_and_substat_match_both_contribute() {
        let art = artifact(101, &[(206, 20)]);
        let bonus = artifact_build_bonus(&art, &[FocusKey::Atk], &[EffectId(206)]);
        assert_eq!(bonus, ARTIFACT_BUILD_FOCUS_BONUS + ARTIFACT_BUILD_MATCH_BONUS + 20 * ARTIFACT_BUILD_VALUE_WEIGHT);
    }

    #[test]
    fn defensive_scoring_penalizes_atk_focus() {
        let atk_art = artifact(101, &[]);
        let def_art = artifact(102, &[]);
        assert!(quality_defensive_artifact(&atk_art, MonsterId(1)) < quality_defensive_artifact(&def_art, MonsterId(1)));
    }
}
