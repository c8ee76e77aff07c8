//! End-to-end tests for the decoy engine

use pqcd_core::config::ResolvedConfig;
use pqcd_core::{DecoyEngine, EvaluateRequest, GenerateRequest};
use std::path::Path;

/// Engine rooted in a temp directory with a fixed seed.
fn engine_in(dir: &Path, seed: u64) -> DecoyEngine {
    let mut config = ResolvedConfig::defaults(dir);
    config.seed = Some(seed);
    DecoyEngine::new(config)
}

#[test]
fn test_generate_end_to_end_low_complexity() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine_in(dir.path(), 7);

    let response = engine
        .generate(&GenerateRequest {
            target: "kyber768".to_string(),
            complexity: Some(3),
            count: Some(5),
        })
        .expect("generate");

    assert_eq!(response.decoys.len(), 5);
    assert_eq!(response.count, 5);
    assert_eq!(response.complexity, 3);

    for decoy in &response.decoys {
        // Complexity <= 3 is pure character substitution: length preserved,
        // between 1 and len-1 positions changed.
        assert_eq!(decoy.chars().count(), "kyber768".chars().count());
        let changed = decoy
            .chars()
            .zip("kyber768".chars())
            .filter(|(a, b)| a != b)
            .count();
        assert!(changed >= 1, "decoy {decoy:?} identical to target");
        assert!(changed <= 7, "decoy {decoy:?} fully replaced");
        assert!(pqcd_core::scoring::similarity(decoy, "kyber768") >= 0.5);
    }

    assert!(response.metrics.avg_effectiveness >= 0.0);
    assert!(response.metrics.max_effectiveness <= 1.0);
    assert!(response.metrics.min_effectiveness <= response.metrics.max_effectiveness);
}

#[test]
fn test_generate_out_of_range_params_use_defaults() {
    let dir_a = tempfile::tempdir().expect("tempdir");
    let dir_b = tempfile::tempdir().expect("tempdir");

    let wild = engine_in(dir_a.path(), 3)
        .generate(&GenerateRequest {
            target: "kyber768".to_string(),
            complexity: Some(999),
            count: Some(-1),
        })
        .expect("generate");

    let default = engine_in(dir_b.path(), 3)
        .generate(&GenerateRequest {
            target: "kyber768".to_string(),
            complexity: Some(5),
            count: Some(10),
        })
        .expect("generate");

    // Same seed, same normalized parameters: identical batches.
    assert_eq!(wild.complexity, 5);
    assert_eq!(wild.count, 10);
    assert_eq!(wild.decoys, default.decoys);
}

#[test]
fn test_generate_is_reproducible_under_seed() {
    let dir_a = tempfile::tempdir().expect("tempdir");
    let dir_b = tempfile::tempdir().expect("tempdir");

    let request = GenerateRequest {
        target: "dilithium".to_string(),
        complexity: Some(8),
        count: Some(6),
    };
    let a = engine_in(dir_a.path(), 11).generate(&request).expect("generate");
    let b = engine_in(dir_b.path(), 11).generate(&request).expect("generate");

    assert_eq!(a.decoys, b.decoys);
}

#[test]
fn test_generate_rejects_empty_target() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine_in(dir.path(), 1);

    let err = engine
        .generate(&GenerateRequest {
            target: String::new(),
            complexity: None,
            count: None,
        })
        .expect_err("empty target must be a client error");
    assert!(err.to_string().contains("target"));
}

#[test]
fn test_evaluate_identical_decoy() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine_in(dir.path(), 2);

    let response = engine
        .evaluate(&EvaluateRequest {
            target: "kyber768".to_string(),
            decoys: vec!["kyber768".to_string()],
        })
        .expect("evaluate");

    assert_eq!(response.evaluations.len(), 1);
    let evaluation = &response.evaluations[0];
    assert_eq!(evaluation.similarity, 1.0);
    // The similarity term alone contributes 0.5 * 1.0.
    assert!(evaluation.effectiveness >= 0.5);
    assert!(evaluation.real_probability.is_some());
}

#[test]
fn test_evaluate_sorted_descending() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine_in(dir.path(), 4);

    let response = engine
        .evaluate(&EvaluateRequest {
            target: "kyber768".to_string(),
            decoys: vec![
                "zzzzzzzz".to_string(),
                "kyber768".to_string(),
                "kyber168".to_string(),
            ],
        })
        .expect("evaluate");

    assert_eq!(response.evaluations.len(), 3);
    for pair in response.evaluations.windows(2) {
        assert!(pair[0].effectiveness >= pair[1].effectiveness);
    }
}

#[test]
fn test_evaluate_rejects_empty_decoys() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine_in(dir.path(), 5);

    let err = engine
        .evaluate(&EvaluateRequest {
            target: "kyber768".to_string(),
            decoys: Vec::new(),
        })
        .expect_err("empty decoy list must be a client error");
    assert!(err.to_string().contains("decoys"));
}

#[test]
fn test_generate_records_history() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine_in(dir.path(), 6);

    engine
        .generate(&GenerateRequest {
            target: "saber".to_string(),
            complexity: Some(8),
            count: Some(4),
        })
        .expect("generate");

    let rows = engine.history(Some("saber"), 10).expect("history");
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r.target_text == "saber"));
    assert!(rows.iter().all(|r| r.complexity == 8));
}

#[test]
fn test_model_snapshot_created_once_and_reused() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine_in(dir.path(), 8);
    let model_path = engine.config().model_path.clone();

    engine
        .generate(&GenerateRequest {
            target: "ntru".to_string(),
            complexity: None,
            count: Some(2),
        })
        .expect("first generate");
    assert!(model_path.exists(), "first request must persist the model");

    let stamp = std::fs::metadata(&model_path)
        .expect("metadata")
        .modified()
        .expect("mtime");

    engine
        .generate(&GenerateRequest {
            target: "ntru".to_string(),
            complexity: None,
            count: Some(2),
        })
        .expect("second generate");

    let stamp_after = std::fs::metadata(&model_path)
        .expect("metadata")
        .modified()
        .expect("mtime");
    assert_eq!(stamp, stamp_after, "no retraining within the process lifetime");
}

#[test]
fn test_effectiveness_bounds_across_the_dial() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine_in(dir.path(), 9);

    for complexity in [1, 5, 10] {
        let response = engine
            .generate(&GenerateRequest {
                target: "falcon512".to_string(),
                complexity: Some(complexity),
                count: Some(20),
            })
            .expect("generate");
        assert!(response.metrics.max_effectiveness <= 1.0);
        assert!(response.metrics.min_effectiveness >= 0.0);
    }
}
