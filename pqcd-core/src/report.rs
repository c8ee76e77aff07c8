//! Response types and output rendering

use crate::scoring::{AggregateMetrics, EvaluationResult};
use serde::{Deserialize, Serialize};

/// Batch metrics attached to a generation response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct GenerationMetrics {
    pub generation_time_ms: u64,
    pub avg_effectiveness: f64,
    pub max_effectiveness: f64,
    pub min_effectiveness: f64,
}

/// Response to a generate operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct GenerateResponse {
    pub decoys: Vec<String>,
    pub target: String,
    pub complexity: u32,
    pub count: usize,
    pub metrics: GenerationMetrics,
}

/// Batch metrics attached to an evaluation response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct EvaluationMetrics {
    pub avg_effectiveness: f64,
    pub avg_similarity: f64,
}

/// Response to an evaluate operation. Evaluations are sorted descending by
/// effectiveness.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct EvaluateResponse {
    pub target: String,
    pub evaluations: Vec<EvaluationResult>,
    pub metrics: EvaluationMetrics,
}

/// Round to two decimals for response payloads.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl GenerateResponse {
    pub fn new(
        target: String,
        complexity: u32,
        decoys: Vec<String>,
        aggregate: &AggregateMetrics,
        generation_time_ms: u64,
    ) -> Self {
        GenerateResponse {
            count: decoys.len(),
            decoys,
            target,
            complexity,
            metrics: GenerationMetrics {
                generation_time_ms,
                avg_effectiveness: round2(aggregate.avg_effectiveness),
                max_effectiveness: round2(aggregate.max_effectiveness),
                min_effectiveness: round2(aggregate.min_effectiveness),
            },
        }
    }
}

impl EvaluateResponse {
    /// Build a response from already-sorted evaluation results, rounding
    /// scores for the payload.
    pub fn new(target: String, results: Vec<EvaluationResult>, aggregate: &AggregateMetrics) -> Self {
        let evaluations = results
            .into_iter()
            .map(|r| EvaluationResult {
                decoy: r.decoy,
                effectiveness: round2(r.effectiveness),
                similarity: round2(r.similarity),
                real_probability: r.real_probability.map(round2),
            })
            .collect();

        EvaluateResponse {
            target,
            evaluations,
            metrics: EvaluationMetrics {
                avg_effectiveness: round2(aggregate.avg_effectiveness),
                avg_similarity: round2(aggregate.avg_similarity),
            },
        }
    }
}

/// Render any response as JSON output.
pub fn render_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Render a generation response as text output.
pub fn render_generate_text(response: &GenerateResponse) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Generated {} decoy(s) for \"{}\" (complexity {})\n\n",
        response.count, response.target, response.complexity
    ));
    for decoy in &response.decoys {
        output.push_str(&format!("  {}\n", decoy));
    }
    output.push_str(&format!(
        "\neffectiveness avg {:.2}  max {:.2}  min {:.2}  ({} ms)\n",
        response.metrics.avg_effectiveness,
        response.metrics.max_effectiveness,
        response.metrics.min_effectiveness,
        response.metrics.generation_time_ms,
    ));
    output
}

/// Render an evaluation response as text output.
pub fn render_evaluate_text(response: &EvaluateResponse) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{:<8} {:<8} {:<8} {}\n",
        "EFFECT", "SIM", "P(REAL)", "DECOY"
    ));
    for evaluation in &response.evaluations {
        let prob = evaluation
            .real_probability
            .map_or_else(|| "-".to_string(), |p| format!("{:.2}", p));
        output.push_str(&format!(
            "{:<8.2} {:<8.2} {:<8} {}\n",
            evaluation.effectiveness, evaluation.similarity, prob, evaluation.decoy
        ));
    }
    output.push_str(&format!(
        "\navg effectiveness {:.2}  avg similarity {:.2}\n",
        response.metrics.avg_effectiveness, response.metrics.avg_similarity
    ));
    output
}
