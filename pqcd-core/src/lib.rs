//! pqcd core library - cognitive decoy generation and effectiveness scoring
//! for post-quantum algorithm identifiers

#![deny(warnings)]

// Global invariants enforced in this crate:
// - All randomness flows through an explicit, seedable source
// - The classifier and its feature extractor travel as one artifact
// - Storage failures never fail generation or evaluation
// - Out-of-range numeric parameters are substituted, never rejected
// - One model initialization per process; inference is read-only after that

pub mod classifier;
pub mod config;
pub mod corpus;
pub mod features;
pub mod generator;
pub mod model;
pub mod mutate;
pub mod report;
pub mod scoring;
pub mod store;

pub use config::ResolvedConfig;
pub use model::{ModelArtifact, ModelManager};
pub use report::{render_evaluate_text, render_generate_text, render_json};
pub use report::{EvaluateResponse, GenerateResponse};
pub use scoring::{AggregateMetrics, EvaluationResult};
pub use store::StoredDecoy;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// Inbound generate operation parameters.
///
/// `complexity` and `count` accept any integer; out-of-range values are
/// substituted with the configured defaults, never rejected.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub target: String,
    pub complexity: Option<i64>,
    pub count: Option<i64>,
}

/// Inbound evaluate operation parameters.
#[derive(Debug, Clone)]
pub struct EvaluateRequest {
    pub target: String,
    pub decoys: Vec<String>,
}

/// Decoy engine: one instance per process, handling generate and evaluate
/// requests independently and synchronously.
///
/// The classifier is materialized lazily by the model manager on the first
/// request. The random source is shared behind a mutex; a configured seed
/// makes whole-engine runs reproducible.
pub struct DecoyEngine {
    config: ResolvedConfig,
    model: ModelManager,
    rng: Mutex<StdRng>,
}

/// Zero metrics substituted when a batch unexpectedly aggregates empty.
const ZERO_AGGREGATE: AggregateMetrics = AggregateMetrics {
    avg_effectiveness: 0.0,
    max_effectiveness: 0.0,
    min_effectiveness: 0.0,
    avg_similarity: 0.0,
};

impl DecoyEngine {
    pub fn new(config: ResolvedConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        DecoyEngine {
            config,
            model: ModelManager::new(),
            rng: Mutex::new(rng),
        }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Handle a generate operation.
    ///
    /// Validates the target, substitutes defaults for out-of-range numeric
    /// parameters, generates and scores a batch, and records it to the
    /// history store best-effort.
    pub fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        if request.target.is_empty() {
            anyhow::bail!("target string is required");
        }

        let started = Instant::now();
        let complexity =
            generator::normalize_complexity(request.complexity.unwrap_or(self.config.default_complexity));
        let count = generator::normalize_count(request.count.unwrap_or(self.config.default_count));

        let model = self.model.get_or_init(&self.config.model_path, self.config.seed);

        let decoys = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            generator::generate_batch(&request.target, complexity, count, &mut rng)
        };

        let results = scoring::evaluate_batch(&request.target, &decoys, Some(model.as_ref()));
        let aggregate = self.aggregate_or_zero(&results);
        let generation_time_ms = started.elapsed().as_millis() as u64;

        self.record_history(&request.target, complexity, &results);

        Ok(GenerateResponse::new(
            request.target.clone(),
            complexity,
            decoys,
            &aggregate,
            generation_time_ms,
        ))
    }

    /// Handle an evaluate operation.
    ///
    /// The target and a non-empty decoy list are required; violations are
    /// client errors and the operation is not attempted.
    pub fn evaluate(&self, request: &EvaluateRequest) -> Result<EvaluateResponse> {
        if request.target.is_empty() {
            anyhow::bail!("target string is required");
        }
        if request.decoys.is_empty() {
            anyhow::bail!("a non-empty decoys list is required");
        }

        let model = self.model.get_or_init(&self.config.model_path, self.config.seed);
        let results =
            scoring::evaluate_batch(&request.target, &request.decoys, Some(model.as_ref()));
        let aggregate = self.aggregate_or_zero(&results);

        Ok(EvaluateResponse::new(
            request.target.clone(),
            results,
            &aggregate,
        ))
    }

    /// Force a retraining run and persist the new snapshot.
    pub fn train(&self, seed: Option<u64>) -> Result<()> {
        self.model
            .retrain(&self.config.model_path, seed.or(self.config.seed))?;
        Ok(())
    }

    /// Query the decoy history store.
    pub fn history(&self, target: Option<&str>, limit: usize) -> Result<Vec<StoredDecoy>> {
        let store = store::DecoyStore::open(&self.config.db_path)?;
        store.recent(target, limit)
    }

    /// Aggregate a batch, substituting zeros (observably, via a warning)
    /// when the batch is empty. Batch sizes are normalized to at least one,
    /// so this is a guard rather than an expected path.
    fn aggregate_or_zero(&self, results: &[EvaluationResult]) -> AggregateMetrics {
        scoring::aggregate(results).unwrap_or_else(|| {
            eprintln!("warning: aggregating an empty batch; reporting zeroed metrics");
            ZERO_AGGREGATE
        })
    }

    /// Record a generated batch to the history store. Best-effort: failures
    /// are logged and never alter the response.
    fn record_history(&self, target: &str, complexity: u32, results: &[EvaluationResult]) {
        let rows: Vec<(String, f64)> = results
            .iter()
            .map(|r| (r.decoy.clone(), r.effectiveness))
            .collect();

        match store::DecoyStore::open(&self.config.db_path) {
            Ok(mut store) => {
                if let Err(e) = store.record_batch(target, complexity, &rows) {
                    eprintln!("warning: failed to record decoy batch: {e}");
                }
            }
            Err(e) => {
                eprintln!("warning: decoy history store unavailable: {e}");
            }
        }
    }
}
