//! Saved-Optimization Persistence Format.
//!
//! The persistence subsystem (presets, teams, where the file lives) is out
//! of scope here, but the JSON shape callers exchange is an external
//! interface with its own round-trip guarantee: unknown fields a
//! newer client wrote must survive a read-modify-write by an older one.
//! `serde(flatten)` into a `serde_json::Map` gets that for free, the same
//! way a typed row mapper accepts schema drift at the edges instead of
//! hand-rolling a JSON walker.

use crate::domain::{Mode, MonsterId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level saved-optimization file: a map of named optimizations plus
/// whatever top-level keys this build doesn't know about.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SavedOptimizationDocument {
    pub version: u32,
    pub optimizations: BTreeMap<String, SavedOptimization>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One saved optimization: which teams it covered and the per-unit result
/// each monster settled on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SavedOptimization {
    pub name: String,
    pub mode: Mode,
    pub teams: Vec<Vec<MonsterId>>,
    pub timestamp: i64,
    pub results: Vec<SavedUnitResult>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A single monster's saved assignment, keyed by slot/kind number the way
/// the wire format represents them rather than by the richer in-memory
/// `UnitResult` (which carries transient fields like `chosen_build_id`
/// that aren't meaningful once reloaded into a different request).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SavedUnitResult {
    pub unit_id: MonsterId,
    pub runes_by_slot: BTreeMap<String, u32>,
    pub artifacts_by_type: BTreeMap<String, u32>,
    pub final_speed: i32,
}

impl From<&crate::api::UnitResult> for SavedUnitResult {
    fn from(result: &crate::api::UnitResult) -> Self {
        SavedUnitResult {
            unit_id: result.unit_id,
            runes_by_slot: result.runes_by_slot.iter().map(|(slot, id)| (slot.get().to_string(), id.0)).collect(),
            artifacts_by_type: result
                .artifacts_by_type
                .iter()
                .map(|(kind, id)| (kind.to_string(), id.0))
                .collect(),
            final_speed: result.final_speed,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("malformed saved-optimization JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parses a saved-optimization document from its on-disk JSON text.
pub fn load(text: &str) -> Result<SavedOptimizationDocument, PersistError> {
    Ok(serde_json::from_str(text)?)
}

/// Serializes a saved-optimization document back to JSON text, re-emitting
/// every `extra` key it didn't understand on load.
pub fn save(document: &SavedOptimizationDocument) -> Result<String, PersistError> {
    Ok(serde_json::to_string_pretty(document)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArtifactKind, Slot};

    #[test]
    fn unknown_top_level_and_nested_fields_round_trip() {
        let text = r#"{
            "version": 1,
            "future_top_level_field": "kept",
            "optimizations": {
                "my-siege-build": {
                    "name": "my-siege-build",
                    "mode": "Siege",
                    "teams": [[1, 2, 3]],
                    "timestamp": 1700000000,
                    "results": [],
                    "future_nested_field": 42
                }
            }
        }"#;

        let doc = load(text).expect("valid document");
        assert_eq!(doc.version, 1);
        assert_eq!(doc.extra.get("future_top_level_field").and_then(|v| v.as_str()), Some("kept"));

        let saved = &doc.optimizations["my-siege-build"];
        assert_eq!(saved.mode, Mode::Siege);
        assert_eq!(saved.teams, vec![vec![MonsterId(1), MonsterId(2), MonsterId(3)]]);
        assert_eq!(saved.extra.get("future_nested_field").and_then(|v| v.as_i64()), Some(42));

        let rendered = save(&doc).expect("serializable document");
        let reparsed = load(&rendered).expect("re-parses");
        assert_eq!(reparsed.extra.get("future_top_level_field"), doc.extra.get("future_top_level_field"));
        assert_eq!(
            reparsed.optimizations["my-siege-build"].extra.get("future_nested_field"),
            saved.extra.get("future_nested_field")
        );
    }

    #[test]
    fn unit_result_converts_to_saved_form_by_slot_and_kind_number() {
        let mut result = crate::api::UnitResult { unit_id: MonsterId(7), ok: true, final_speed: 213, ..Default::default() };
        result.runes_by_slot.insert(Slot::new(2).unwrap(), crate::domain::RuneId(501));
        result.artifacts_by_type.insert(ArtifactKind::Attribute, crate::domain::ArtifactId(9001));

        let saved: SavedUnitResult = (&result).into();
        assert_eq!(saved.runes_by_slot.get("2"), Some(&501));
        assert_eq!(saved.artifacts_by_type.get("1"), Some(&9001));
        assert_eq!(saved.final_speed, 213);
    }
}
