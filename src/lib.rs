//! Rune/artifact optimization engine for Summoners War-style gear
//! assignment: given an account snapshot and a set of candidate builds,
//! assign the rune/artifact combination that maximises each monster's
//! effective score under set, mainstat, and minimum-stat constraints.
//!
//! The library never initialises a logger itself; callers
//! that want `log`'s output wired up call [`init`] once, the way the
//! `cli`-feature binary does on startup.

pub mod api;
pub mod arena;
pub mod cp;
pub mod domain;
pub mod error;
pub mod global;
pub mod greedy;
#[cfg(feature = "serde_json")]
pub mod persist;
pub mod pruner;
pub mod scoring;
pub mod simulate;
pub mod tick;

/// Installs `env_logger` as the `log` backend. Idempotent: safe to call
/// more than once, or from more than one binary linking this crate in the
/// same process.
#[cfg(feature = "cli")]
pub fn init() {
    let _ = env_logger::try_init();
}
