//! Request/result/error-taxonomy surface: the data shapes a
//! caller builds to drive the sequential and Arena Rush engines, and gets
//! back as a result. Pure data — no callbacks or cancellation tokens live
//! here, those are runtime hooks passed alongside a request (see
//! `greedy::RunHooks`), which keeps this module `serde`-round-trippable
//! the way `persist::SavedOptimizationDocument` is.

mod profile;
mod request;
mod result;

pub use profile::{ProfileTuning, QualityProfile};
pub use request::{ArenaRushOffenseTeam, ArenaRushRequest, MultiPassStrategy, OpeningTurnEffect, OptimizerRequest};
pub use result::{ArenaRushOffenseResult, ArenaRushResult, OptimizerResult, UnitResult};
