//! Exploration transcript: derived, deterministic JSON artifact.
//!
//! The recorder implements the core's observational tracer hooks and
//! assigns small dense ids to versions in first-sight order, so the
//! rendered artifact is independent of the store's internal version
//! numbering. Rendering goes through [`crate::canon`] and is digested
//! with SHA-256; identical runs produce identical digests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use sha2::{Digest, Sha256};

use quarry_search::trace::ExplorationTracer;
use quarry_store::model::ModelVersion;

use crate::canon::{canonical_json_bytes, CanonError};

/// One registered state: dense id plus its 32-bit state code.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TranscriptStateV1 {
    pub state: u64,
    pub code: u32,
}

/// One fired transition between registered states.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TranscriptTransitionV1 {
    pub from: u64,
    pub to: u64,
}

/// The finished transcript of one exploration run.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TranscriptV1 {
    pub world_id: String,
    pub states: Vec<TranscriptStateV1>,
    pub transitions: Vec<TranscriptTransitionV1>,
    /// State ids of recorded solutions, in recording order.
    pub solutions: Vec<u64>,
}

impl TranscriptV1 {
    /// The artifact as a JSON value.
    #[must_use]
    pub fn to_value(&self) -> serde_json::Value {
        let states: Vec<serde_json::Value> = self
            .states
            .iter()
            .map(|s| serde_json::json!({"code": s.code, "state": s.state}))
            .collect();
        let transitions: Vec<serde_json::Value> = self
            .transitions
            .iter()
            .map(|t| serde_json::json!({"from": t.from, "to": t.to}))
            .collect();
        serde_json::json!({
            "schema_version": "exploration_transcript.v1",
            "solutions": self.solutions,
            "states": states,
            "transitions": transitions,
            "world_id": self.world_id,
        })
    }

    /// Canonical bytes of the artifact.
    ///
    /// # Errors
    ///
    /// Propagates [`CanonError`]; transcript values are all integers and
    /// strings, so this only fails if the schema ever grows a float.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, CanonError> {
        canonical_json_bytes(&self.to_value())
    }

    /// `"sha256:<hex>"` digest of the canonical bytes.
    ///
    /// # Errors
    ///
    /// Propagates [`CanonError`] from rendering.
    pub fn digest(&self) -> Result<String, CanonError> {
        let bytes = self.canonical_bytes()?;
        Ok(format!("sha256:{}", hex::encode(Sha256::digest(&bytes))))
    }

    /// Write `exploration_transcript.json` into `dir`; returns the path.
    ///
    /// # Errors
    ///
    /// Returns an I/O error from the write, or `InvalidData` if rendering
    /// fails.
    pub fn write_to_dir(&self, dir: &Path) -> io::Result<PathBuf> {
        let bytes = self
            .canonical_bytes()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let path = dir.join("exploration_transcript.json");
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}

#[derive(Default)]
struct RecorderState {
    ids: HashMap<ModelVersion, u64>,
    states: Vec<TranscriptStateV1>,
    transitions: Vec<TranscriptTransitionV1>,
    solutions: Vec<u64>,
}

impl RecorderState {
    fn id_of(&mut self, version: &ModelVersion) -> u64 {
        let next = self.ids.len() as u64;
        *self.ids.entry(version.clone()).or_insert(next)
    }
}

/// Tracer recording states, transitions, and solutions.
///
/// Clones share one buffer: hand one clone to the strategy and keep
/// another to [`finish`](Self::finish) the transcript after the run.
#[derive(Clone, Default)]
pub struct TranscriptRecorder {
    inner: Rc<RefCell<RecorderState>>,
}

impl TranscriptRecorder {
    /// A fresh recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the recorded run as a transcript for `world_id`.
    #[must_use]
    pub fn finish(&self, world_id: &str) -> TranscriptV1 {
        let state = self.inner.borrow();
        TranscriptV1 {
            world_id: world_id.to_string(),
            states: state.states.clone(),
            transitions: state.transitions.clone(),
            solutions: state.solutions.clone(),
        }
    }
}

impl ExplorationTracer for TranscriptRecorder {
    fn state_added(&mut self, version: &ModelVersion, code: u32) {
        let mut state = self.inner.borrow_mut();
        let id = state.id_of(version);
        state.states.push(TranscriptStateV1 { state: id, code });
    }

    fn transition_added(&mut self, from: &ModelVersion, to: &ModelVersion) {
        let mut state = self.inner.borrow_mut();
        let from = state.id_of(from);
        let to = state.id_of(to);
        state.transitions.push(TranscriptTransitionV1 { from, to });
    }

    fn solution_added(&mut self, version: &ModelVersion) {
        let mut state = self.inner.borrow_mut();
        let id = state.id_of(version);
        state.solutions.push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_store::map::StoreStrategy;
    use quarry_store::model::Model;
    use quarry_store::symbol::{Symbol, SymbolId};
    use quarry_store::tuple::{Tuple, Value};

    fn versions(n: i64) -> Vec<ModelVersion> {
        let mut model = Model::new(vec![Symbol::counter("n")], StoreStrategy::Delta);
        (1..=n)
            .map(|i| {
                model.put(SymbolId(0), Tuple::empty(), Value::Int(i));
                model.commit()
            })
            .collect()
    }

    fn recorded_run() -> TranscriptV1 {
        let chain = versions(3);
        let recorder = TranscriptRecorder::new();
        let mut tracer = recorder.clone();
        tracer.state_added(&chain[0], 100);
        tracer.transition_added(&chain[0], &chain[1]);
        tracer.state_added(&chain[1], 200);
        tracer.transition_added(&chain[1], &chain[2]);
        tracer.state_added(&chain[2], 300);
        tracer.solution_added(&chain[2]);
        recorder.finish("test_world")
    }

    #[test]
    fn ids_are_dense_in_first_sight_order() {
        let transcript = recorded_run();
        let ids: Vec<u64> = transcript.states.iter().map(|s| s.state).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(transcript.transitions[0], TranscriptTransitionV1 { from: 0, to: 1 });
        assert_eq!(transcript.solutions, vec![2]);
    }

    #[test]
    fn digest_is_stable_across_renders() {
        let transcript = recorded_run();
        let d1 = transcript.digest().unwrap();
        let d2 = transcript.digest().unwrap();
        assert_eq!(d1, d2);
        assert!(d1.starts_with("sha256:"));
        assert_eq!(d1.len(), "sha256:".len() + 64);
    }

    #[test]
    fn canonical_bytes_are_sorted_json() {
        let transcript = recorded_run();
        let bytes = transcript.canonical_bytes().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with(r#"{"schema_version":"exploration_transcript.v1""#));
        assert!(text.contains(r#""world_id":"test_world""#));
    }

    #[test]
    fn write_to_dir_round_trips() {
        let transcript = recorded_run();
        let dir = tempfile::tempdir().unwrap();
        let path = transcript.write_to_dir(dir.path()).unwrap();
        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, transcript.canonical_bytes().unwrap());
    }
}
