//! Classifier model artifact and lifecycle
//!
//! The feature extractor and the trained ensemble are bundled into a single
//! versioned artifact: loading one without the other would silently corrupt
//! predictions through a vocabulary mismatch, so they are never persisted
//! separately.
//!
//! The manager holds the process-wide Unloaded -> Ready transition behind a
//! mutex-guarded check-then-act: concurrent first callers serialize on the
//! lock, so exactly one load-or-train occurs. Once Ready the artifact is
//! shared as an `Arc` and inference is read-only.

use crate::classifier::{BaggedForest, ForestParams};
use crate::corpus;
use crate::features::NgramVectorizer;
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

/// Schema version for persisted model artifacts.
pub const MODEL_SCHEMA_VERSION: u32 = 1;

/// Character n-gram range used for feature extraction.
const NGRAM_MIN: usize = 2;
const NGRAM_MAX: usize = 5;

/// zstd compression level for persisted artifacts.
const COMPRESSION_LEVEL: i32 = 3;

/// A trained classifier paired with the exact feature extractor it was
/// fit with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ModelArtifact {
    #[serde(rename = "schema_version")]
    pub schema_version: u32,
    vectorizer: NgramVectorizer,
    forest: BaggedForest,
}

impl ModelArtifact {
    /// Train a fresh artifact from the bootstrap corpus.
    ///
    /// Deterministic under a fixed random source: the same seed reproduces
    /// the synthetic negatives and the ensemble exactly.
    pub fn train(params: &ForestParams, rng: &mut StdRng) -> Self {
        let training_set = corpus::bootstrap_training_set(rng);
        let vectorizer = NgramVectorizer::fit(&training_set.documents, NGRAM_MIN, NGRAM_MAX);
        let rows = vectorizer.transform_batch(&training_set.documents);
        let forest = BaggedForest::train(&rows, &training_set.labels, params, rng);

        ModelArtifact {
            schema_version: MODEL_SCHEMA_VERSION,
            vectorizer,
            forest,
        }
    }

    /// P(string is a genuine algorithm identifier).
    pub fn predict(&self, s: &str) -> f64 {
        self.forest.predict_proba(&self.vectorizer.transform(s))
    }

    /// Serialize to zstd-compressed JSON.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let json = serde_json::to_string(self).context("failed to serialize model artifact")?;
        zstd::encode_all(json.as_bytes(), COMPRESSION_LEVEL)
            .context("failed to compress model artifact")
    }

    /// Deserialize from zstd-compressed JSON, validating the schema version.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let json = zstd::decode_all(bytes).context("failed to decompress model artifact")?;
        let json = std::str::from_utf8(&json).context("model artifact is not valid UTF-8")?;
        let artifact: ModelArtifact =
            serde_json::from_str(json).context("failed to parse model artifact JSON")?;

        if artifact.schema_version != MODEL_SCHEMA_VERSION {
            anyhow::bail!(
                "model schema version mismatch: expected {}, got {}",
                MODEL_SCHEMA_VERSION,
                artifact.schema_version
            );
        }

        Ok(artifact)
    }

    /// Load an artifact from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read model artifact: {}", path.display()))?;
        Self::from_bytes(&bytes)
    }

    /// Persist the artifact atomically (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        atomic_write(path, &bytes)
            .with_context(|| format!("failed to persist model artifact: {}", path.display()))
    }
}

/// Write data to file atomically using temp file + rename.
fn atomic_write(path: &Path, contents: &[u8]) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }

    let temp_path = path.with_extension("tmp");
    let mut file = std::fs::File::create(&temp_path)
        .with_context(|| format!("failed to create temp file: {}", temp_path.display()))?;
    file.write_all(contents)
        .with_context(|| format!("failed to write to temp file: {}", temp_path.display()))?;
    file.sync_all()
        .with_context(|| format!("failed to sync temp file: {}", temp_path.display()))?;
    drop(file);

    std::fs::rename(&temp_path, path)
        .with_context(|| format!("failed to rename temp file to: {}", path.display()))?;

    Ok(())
}

/// Process-wide model lifecycle: Unloaded -> Ready, exactly once.
#[derive(Debug, Default)]
pub struct ModelManager {
    slot: Mutex<Option<Arc<ModelArtifact>>>,
}

impl ModelManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once a model has been materialized.
    pub fn is_ready(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Return the Ready-state model, materializing it on first access.
    ///
    /// Attempts to load the persisted artifact at `model_path`; on any load
    /// failure trains from the bootstrap corpus instead and persists the
    /// fresh artifact best-effort (a persistence failure is logged, never
    /// fatal). Subsequent calls reuse the same `Arc` for the process
    /// lifetime; no automatic retraining occurs.
    pub fn get_or_init(&self, model_path: &Path, seed: Option<u64>) -> Arc<ModelArtifact> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(model) = slot.as_ref() {
            return Arc::clone(model);
        }

        let artifact = match ModelArtifact::load(model_path) {
            Ok(artifact) => artifact,
            Err(load_err) => {
                eprintln!(
                    "warning: no usable model at {} ({load_err}); training from bootstrap corpus",
                    model_path.display()
                );
                let artifact = train_seeded(seed);
                if let Err(save_err) = artifact.save(model_path) {
                    eprintln!(
                        "warning: failed to persist model snapshot ({save_err}); continuing with in-memory model"
                    );
                }
                artifact
            }
        };

        let model = Arc::new(artifact);
        *slot = Some(Arc::clone(&model));
        model
    }

    /// Force a fresh training run, persist it, and replace the Ready model.
    ///
    /// Unlike the lazy path, a persistence failure here is an error: the
    /// caller explicitly asked for a new snapshot.
    pub fn retrain(&self, model_path: &Path, seed: Option<u64>) -> Result<Arc<ModelArtifact>> {
        let artifact = train_seeded(seed);
        artifact.save(model_path)?;

        let model = Arc::new(artifact);
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::clone(&model));
        Ok(model)
    }
}

fn train_seeded(seed: Option<u64>) -> ModelArtifact {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };
    ModelArtifact::train(&ForestParams::default(), &mut rng)
}
