use crate::domain::{Artifact, MainStatKey, QualityClass, Rune};

/// Which quality-class's max-roll table a substat value is normalised
/// against. `Current` answers "how good is this roll for its own class",
/// `HeroMax`/`LegendMax` answer "how good would this roll look if this
/// were a Hero- or Legend-grade rune", the comparison players use to
/// decide whether a reforge/transmute is worth it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffVariant {
    Current,
    HeroMax,
    LegendMax,
}

/// A 6-star rune receives five substat increases over its upgrade
/// lifetime (+3/+6/+9/+12/+15), independent of quality class.
const TOTAL_SUBSTAT_INCREMENTS: f64 = 5.0;

/// Best possible single-roll value per stat at Legend grade.
fn legend_max_roll(stat: MainStatKey) -> f64 {
    match stat {
        MainStatKey::HpFlat => 375.0,
        MainStatKey::HpPct => 2.52,
        MainStatKey::AtkFlat => 25.0,
        MainStatKey::AtkPct => 2.52,
        MainStatKey::DefFlat => 25.0,
        MainStatKey::DefPct => 2.52,
        MainStatKey::Spd => 2.00,
        MainStatKey::Cr => 2.20,
        MainStatKey::Cd => 2.80,
        MainStatKey::Res => 2.45,
        MainStatKey::Acc => 2.45,
    }
}

/// Quality classes below Legend cap substat rolls at a fraction of the
/// Legend-grade max.
fn class_scale(class: QualityClass) -> f64 {
    match class {
        QualityClass::Normal => 0.6,
        QualityClass::Magic => 0.7,
        QualityClass::Rare => 0.8,
        QualityClass::Hero => 0.9,
        QualityClass::Legend => 1.0,
    }
}

fn max_roll(stat: MainStatKey, variant: EffVariant, own_class: QualityClass) -> f64 {
    let scale = match variant {
        EffVariant::Current => class_scale(own_class),
        EffVariant::HeroMax => class_scale(QualityClass::Hero),
        EffVariant::LegendMax => class_scale(QualityClass::Legend),
    };
    legend_max_roll(stat) * scale
}

/// Efficiency of `rune`'s substats, normalised to a 0..=100 percentage of
/// the theoretical maximum for `variant`.
pub fn efficiency_rune(rune: &Rune, variant: EffVariant) -> f64 {
    let mut normalized_total = 0.0;
    for sub in &rune.sub_effects {
        let Some(stat) = MainStatKey::from_effect_id(sub.effect_id) else { continue };
        let cap = max_roll(stat, variant, rune.quality_class);
        if cap > 0.0 {
            normalized_total += sub.total_value() as f64 / cap;
        }
    }
    (normalized_total / TOTAL_SUBSTAT_INCREMENTS * 100.0).clamp(0.0, 999.0)
}

/// Efficiency of an artifact's secondary rolls, same normalisation idea
/// applied to the artifact sub-effect list. Artifacts do
/// not carry a quality class distinct from rank, so they are always
/// scored against the Legend-grade table.
pub fn efficiency_artifact(artifact: &Artifact) -> f64 {
    const ARTIFACT_SUBSTAT_INCREMENTS: f64 = 4.0;
    let mut normalized_total = 0.0;
    for sub in &artifact.sec_effects {
        let Some(stat) = MainStatKey::from_effect_id(sub.effect_id) else { continue };
        let cap = legend_max_roll(stat);
        if cap > 0.0 {
            normalized_total += sub.value as f64 / cap;
        }
    }
    (normalized_total / ARTIFACT_SUBSTAT_INCREMENTS * 100.0).clamp(0.0, 999.0)
}

/// Round-half-to-even, the deterministic rounding required before
/// efficiency enters an integer objective term.
pub fn round_half_to_even(value: f64) -> i64 {
    value.round_ties_even() as i64
}
