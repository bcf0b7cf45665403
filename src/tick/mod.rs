//! Speed-tick lookup table. A tick bucket classifies a monster by how
//! many ticks a full ATB bar takes and induces a closed interval on
//! combat SPD.

use serde::{Deserialize, Serialize};

/// `tick -> min_combat_spd`, ticks 11..=3, pinned to the reference table
/// in `original_source/app/domain/speed_ticks.py`.
const TICK_MIN_SPD: [(u8, i32); 9] = [
    (11, 130),
    (10, 143),
    (9, 159),
    (8, 179),
    (7, 205),
    (6, 239),
    (5, 286),
    (4, 358),
    (3, 477),
];

/// Sentinel ceiling for the fastest configured bucket, which has no faster
/// neighbor to derive an upper bound from.
const NO_UPPER_BOUND: i32 = 1_000_000_000;

/// Combat SPD cap applied to the special "low Leo tick" bucket. Its lower
/// bound is deliberately left open.
const LOW_LEO_MAX_COMBAT_SPD: i32 = 129;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickBucket {
    Normal(u8),
    LowLeo,
}

impl TickBucket {
    pub fn min_combat_spd(self) -> Option<i32> {
        match self {
            TickBucket::Normal(tick) => min_spd_for_tick(tick),
            TickBucket::LowLeo => None,
        }
    }

    pub fn max_combat_spd(self) -> Option<i32> {
        match self {
            TickBucket::Normal(tick) => max_spd_for_tick(tick),
            TickBucket::LowLeo => Some(LOW_LEO_MAX_COMBAT_SPD),
        }
    }
}

pub fn allowed_ticks() -> impl Iterator<Item = u8> {
    TICK_MIN_SPD.iter().map(|(tick, _)| *tick)
}

pub fn min_spd_for_tick(tick: u8) -> Option<i32> {
    TICK_MIN_SPD.iter().find(|(t, _)| *t == tick).map(|(_, spd)| *spd)
}

/// Inclusive max combat SPD that still belongs to `tick`. The fastest
/// configured bucket (tick 3) returns a very high sentinel ceiling.
pub fn max_spd_for_tick(tick: u8) -> Option<i32> {
    if !TICK_MIN_SPD.iter().any(|(t, _)| *t == tick) {
        return None;
    }
    let faster_tick = tick.checked_sub(1)?;
    Some(match min_spd_for_tick(faster_tick) {
        Some(faster_min) => faster_min - 1,
        None => NO_UPPER_BOUND,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_reference_breakpoints() {
        assert_eq!(min_spd_for_tick(11), Some(130));
        assert_eq!(min_spd_for_tick(3), Some(477));
        assert_eq!(min_spd_for_tick(12), None);
    }

    #[test]
    fn max_is_one_below_the_next_faster_tick_min() {
        assert_eq!(max_spd_for_tick(11), Some(142));
        assert_eq!(max_spd_for_tick(10), Some(158));
    }

    #[test]
    fn fastest_bucket_has_sentinel_ceiling() {
        assert_eq!(max_spd_for_tick(3), Some(NO_UPPER_BOUND));
    }

    #[test]
    fn low_leo_tick_has_open_lower_and_capped_upper_bound() {
        let bucket = TickBucket::LowLeo;
        assert_eq!(bucket.min_combat_spd(), None);
        assert_eq!(bucket.max_combat_spd(), Some(129));
    }

    #[test]
    fn interval_is_closed_and_non_overlapping_across_adjacent_ticks() {
        for tick in 3..=10u8 {
            let max_here = max_spd_for_tick(tick).unwrap();
            let min_next = min_spd_for_tick(tick + 1).unwrap();
            assert_eq!(max_here, min_next - 1);
        }
    }
}
