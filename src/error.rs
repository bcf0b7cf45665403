//! Error taxonomy. Per-unit infeasibilities are data, not
//! control flow: they travel inside `UnitResult.message` rather than
//! aborting the run, so this enum exists primarily to give that message a
//! stable, matchable shape.

use crate::domain::{ArtifactKind, EffectId, MainStatKey, Slot};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ErrorKind {
    #[error("no units requested")]
    NoUnits,

    #[error("cancelled")]
    Cancelled,

    #[error("no candidates available for slot {0}")]
    SlotHasNoCandidates(Slot),

    #[error("no attribute artifact available")]
    NoAttributeArtifact,

    #[error("no type artifact available")]
    NoTypeArtifact,

    #[error("slot {slot} requires one of {allowed_keys:?} but no candidate matches")]
    MainstatUnavailable { slot: Slot, allowed_keys: Vec<MainStatKey> },

    #[error("artifact kind {kind:?} requires focus {focus:?} and substats {substats:?} but no candidate matches")]
    ArtifactFilterUnsatisfiable {
        kind: ArtifactKind,
        focus: Vec<crate::domain::FocusKey>,
        substats: Vec<EffectId>,
    },

    #[error("set option for set {set_id:?} needs {required} pieces but only {available} are available")]
    SetOptionUnsatisfiable { set_id: crate::domain::SetId, required: u8, available: u8 },

    #[error("stat {stat} cannot reach threshold {threshold}")]
    MinStatUnreachable { stat: &'static str, threshold: i32 },

    #[error("global model hit its time limit")]
    GlobalTimeLimit,

    #[error("observed opening order diverged from the expected one (penalty {penalty})")]
    ArenaOpeningOrderViolated { penalty: i64 },
}

pub type Result<T> = std::result::Result<T, ErrorKind>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        let err = ErrorKind::SlotHasNoCandidates(Slot::new(3).unwrap());
        assert_eq!(err.to_string(), "no candidates available for slot 3");
    }
}
