use serde::{Deserialize, Serialize};

/// Named quality/speed tradeoff a request selects; `tuning()` is the pure
/// function mapping it to concrete solver knobs (`num_workers`:
/// fast ~= 1, balanced ~= cpu/2, max ~= cpu).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityProfile {
    Fast,
    Balanced,
    MaxQuality,
    GpuSearchFast,
    GpuSearchBalanced,
    GpuSearchMax,
}

impl Default for QualityProfile {
    fn default() -> Self {
        QualityProfile::Balanced
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileTuning {
    pub num_workers: u32,
    pub time_limit_factor: f64,
    /// Whether this profile should prefer the global engine over the
    /// sequential greedy engine when the monster count stays tractable.
    pub prefer_global: bool,
}

impl QualityProfile {
    /// Resolves to the same tuning as its non-GPU counterpart: no
    /// GPU-accelerated backend exists in this core, so the `gpu_search_*`
    /// profiles only differ from their CPU counterparts once such a
    /// backend is added.
    pub fn tuning(self, available_workers: u32) -> ProfileTuning {
        let cpu_half = (available_workers / 2).max(1);
        match self {
            QualityProfile::Fast | QualityProfile::GpuSearchFast => {
                ProfileTuning { num_workers: 1, time_limit_factor: 0.5, prefer_global: false }
            }
            QualityProfile::Balanced | QualityProfile::GpuSearchBalanced => {
                ProfileTuning { num_workers: cpu_half, time_limit_factor: 1.0, prefer_global: false }
            }
            QualityProfile::MaxQuality | QualityProfile::GpuSearchMax => {
                ProfileTuning { num_workers: available_workers.max(1), time_limit_factor: 2.0, prefer_global: true }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_quality_prefers_the_global_engine_and_uses_all_workers() {
        let tuning = QualityProfile::MaxQuality.tuning(8);
        assert!(tuning.prefer_global);
        assert_eq!(tuning.num_workers, 8);
    }

    #[test]
    fn fast_profile_is_single_worker_regardless_of_availability() {
        assert_eq!(QualityProfile::Fast.tuning(16).num_workers, 1);
    }
}
