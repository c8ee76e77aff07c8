//! Decoy effectiveness scoring
//!
//! Combines order-sensitive textual similarity with classifier-estimated
//! plausibility into a single effectiveness metric, and aggregates metrics
//! across a batch.

use crate::model::ModelArtifact;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-decoy evaluation result, derived and read-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct EvaluationResult {
    pub decoy: String,
    pub effectiveness: f64,
    pub similarity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_probability: Option<f64>,
}

/// Aggregate metrics over a non-empty batch of evaluation results.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct AggregateMetrics {
    pub avg_effectiveness: f64,
    pub max_effectiveness: f64,
    pub min_effectiveness: f64,
    pub avg_similarity: f64,
}

/// Longest matching block between `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Returns `(i, j, k)`: the block `a[i..i+k] == b[j..j+k]` with maximal `k`,
/// preferring the earliest block in `a`, then in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let mut b_positions: HashMap<char, Vec<usize>> = HashMap::new();
    for j in blo..bhi {
        b_positions.entry(b[j]).or_default().push(j);
    }

    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    // j2len[j] = length of the match ending at a[i], b[j]
    let mut j2len: HashMap<usize, usize> = HashMap::new();

    for i in alo..ahi {
        let mut new_j2len: HashMap<usize, usize> = HashMap::new();
        if let Some(js) = b_positions.get(&a[i]) {
            for &j in js {
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| j2len.get(&prev).copied())
                    .unwrap_or(0)
                    + 1;
                new_j2len.insert(j, k);
                if k > best_k {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_k = k;
                }
            }
        }
        j2len = new_j2len;
    }

    (best_i, best_j, best_k)
}

/// Total characters matched by recursively taking longest blocks, the
/// Ratcliff/Obershelp strategy.
fn matched_total(a: &[char], b: &[char], alo: usize, ahi: usize, blo: usize, bhi: usize) -> usize {
    let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
    if k == 0 {
        return 0;
    }
    k + matched_total(a, b, alo, i, blo, j) + matched_total(a, b, i + k, ahi, j + k, bhi)
}

/// Sequence similarity ratio in `[0, 1]`.
///
/// `2 * M / (len(a) + len(b))` where `M` is the total length of matched
/// blocks. Order-sensitive: matched runs must appear in the same relative
/// order in both strings, so this is not symmetric in general. Two empty
/// strings are fully similar.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let total = a_chars.len() + b_chars.len();
    if total == 0 {
        return 1.0;
    }

    let matched = matched_total(&a_chars, &b_chars, 0, a_chars.len(), 0, b_chars.len());
    2.0 * matched as f64 / total as f64
}

/// Effectiveness of a decoy against its target.
///
/// An equal blend of textual similarity and classifier plausibility. Without
/// a model the plausibility term is the neutral 0.5 default, so evaluation
/// degrades rather than fails.
pub fn effectiveness(decoy: &str, target: &str, model: Option<&ModelArtifact>) -> f64 {
    let sim = similarity(decoy, target);
    let real_probability = model.map_or(0.5, |m| m.predict(decoy));
    0.5 * sim + 0.5 * real_probability
}

/// Evaluate a batch of decoys against one target.
///
/// Results are sorted descending by effectiveness with a stable sort, so
/// ties keep their input order.
pub fn evaluate_batch(
    target: &str,
    decoys: &[String],
    model: Option<&ModelArtifact>,
) -> Vec<EvaluationResult> {
    let mut results: Vec<EvaluationResult> = decoys
        .iter()
        .map(|decoy| {
            let sim = similarity(decoy, target);
            let real_probability = model.map(|m| m.predict(decoy));
            EvaluationResult {
                decoy: decoy.clone(),
                effectiveness: 0.5 * sim + 0.5 * real_probability.unwrap_or(0.5),
                similarity: sim,
                real_probability,
            }
        })
        .collect();

    results.sort_by(|a, b| {
        b.effectiveness
            .partial_cmp(&a.effectiveness)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results
}

/// Aggregate metrics over a batch.
///
/// Returns `None` for an empty batch — the caller decides how to surface
/// that, rather than receiving silent zeros.
pub fn aggregate(results: &[EvaluationResult]) -> Option<AggregateMetrics> {
    if results.is_empty() {
        return None;
    }

    let n = results.len() as f64;
    let sum_eff: f64 = results.iter().map(|r| r.effectiveness).sum();
    let sum_sim: f64 = results.iter().map(|r| r.similarity).sum();
    let max_eff = results
        .iter()
        .map(|r| r.effectiveness)
        .fold(f64::NEG_INFINITY, f64::max);
    let min_eff = results
        .iter()
        .map(|r| r.effectiveness)
        .fold(f64::INFINITY, f64::min);

    Some(AggregateMetrics {
        avg_effectiveness: sum_eff / n,
        max_effectiveness: max_eff,
        min_effectiveness: min_eff,
        avg_similarity: sum_sim / n,
    })
}
