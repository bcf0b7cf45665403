//! Quality and efficiency scoring. The integer weights below
//! are pinned to `original_source/app/engine/greedy_optimizer.py` so two
//! implementations that claim equivalence produce the same `PassScore`
//! tuple, not merely the same set of successful units.

mod artifact_quality;
mod baseline;
mod defensive;
mod efficiency;
mod rune_quality;

pub use artifact_quality::{artifact_build_bonus, quality_artifact, quality_defensive_artifact};
pub use baseline::BaselineGuard;
pub use defensive::quality_defensive_rune;
pub use efficiency::{efficiency_artifact, efficiency_rune, round_half_to_even, EffVariant};
pub use rune_quality::quality_rune;

/// Per-rune weight of efficiency inside the CP solver's objective
/// (`RUNE_EFFICIENCY_WEIGHT_SOLVER`).
pub const RUNE_EFFICIENCY_WEIGHT_SOLVER: i64 = 6;
/// Per-artifact weight of efficiency inside the CP solver's objective
/// (`ARTIFACT_EFFICIENCY_WEIGHT_SOLVER`).
pub const ARTIFACT_EFFICIENCY_WEIGHT_SOLVER: i64 = 5;
/// Weight applied to `Σ round(eff * 10)` in `PassScore.effective_quality`.
pub const PASS_EFFICIENCY_WEIGHT: i64 = 10;
/// Squared-excess turn-order gap penalty weight inside `PassScore`.
pub const TURN_ORDER_GAP_PENALTY_WEIGHT: i64 = 35;
/// Soft speed weight for the quality/efficiency-first objective mode.
pub const SOFT_SPEED_WEIGHT: i64 = 24;
/// Bonus for the currently-preferred set-option index during refinement.
pub const SET_OPTION_PREFERENCE_BONUS: i64 = 120;
/// Avoidance penalty for repeating a previous pass's rune choice.
pub const SAME_RUNE_PENALTY: i64 = 260;
/// Avoidance penalty for repeating a previous pass's artifact choice.
pub const SAME_ARTIFACT_PENALTY: i64 = 180;
/// Penalty per unit of `priority` applied to a low-priority build variant.
pub const BUILD_PRIORITY_PENALTY: i64 = 200;
/// Default baseline-retention reward weight.
pub const DEFAULT_BASELINE_RETENTION_WEIGHT: i64 = 3000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_match_the_reference_constants() {
        assert_eq!(RUNE_EFFICIENCY_WEIGHT_SOLVER, 6);
        assert_eq!(ARTIFACT_EFFICIENCY_WEIGHT_SOLVER, 5);
        assert_eq!(PASS_EFFICIENCY_WEIGHT, 10);
        assert_eq!(TURN_ORDER_GAP_PENALTY_WEIGHT, 35);
        assert_eq!(SOFT_SPEED_WEIGHT, 24);
        assert_eq!(SET_OPTION_PREFERENCE_BONUS, 120);
        assert_eq!(SAME_RUNE_PENALTY, 260);
        assert_eq!(SAME_ARTIFACT_PENALTY, 180);
        assert_eq!(BUILD_PRIORITY_PENALTY, 200);
        assert_eq!(DEFAULT_BASELINE_RETENTION_WEIGHT, 3000);
    }
}
