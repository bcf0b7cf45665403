//! Immutable domain records: monsters, runes, artifacts, builds, and the
//! account snapshot they live in. Nothing here is ever mutated after
//! construction; optimisation results are produced as new values keyed by
//! monster id.

pub mod account;
pub mod artifact;
pub mod build;
pub mod effect;
pub mod ids;
pub mod monster;
pub mod rune;

pub use account::{AccountData, Mode};
pub use artifact::{Artifact, ArtifactSubEffect, FocusKey, SPD_BUFF_INCREASE_EFFECT_ID};
pub use build::{Build, MinStats, SetOption};
pub use effect::{Effect, EffectId, MainStatKey};
pub use ids::{ArtifactId, ArtifactKind, MonsterId, RuneId, Slot, TeamIndex};
pub use monster::{Archetype, Attribute, BaseStats, Monster};
pub use rune::{Occupant, QualityClass, Rune, SetId, SubEffect};
