//! Bootstrap training corpus
//!
//! A small fixed list of genuine post-quantum algorithm identifiers, plus
//! synthetically generated negatives derived from them. This is the entire
//! training set for the plausibility classifier.

use crate::mutate;
use rand::rngs::StdRng;

/// Genuine identifiers (positive class).
pub const REAL_IDENTIFIERS: &[&str] = &[
    "kyber768",
    "kyber1024",
    "saber",
    "ntru",
    "dilithium",
    "falcon512",
    "falcon1024",
    "sphincs+",
    "picnic",
    "mceliece348864",
    "frodokem640",
    "frodokem976",
    "frodokem1344",
    "bike1",
    "bike2",
    "hqc128",
    "hqc192",
    "hqc256",
];

/// Number of synthetic negatives generated per real identifier.
pub const NEGATIVES_PER_IDENTIFIER: usize = 3;

/// Similarity target used when synthesizing negatives.
pub const NEGATIVE_SIMILARITY: f64 = 0.7;

/// A labeled training set: documents plus binary labels
/// (1 = real identifier, 0 = synthetic decoy).
#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub documents: Vec<String>,
    pub labels: Vec<u8>,
}

/// Build the bootstrap training set.
///
/// Positives are [`REAL_IDENTIFIERS`] verbatim; negatives are three
/// character-substitution decoys per positive at similarity 0.7. The random
/// source drives negative synthesis, so a fixed seed reproduces the set.
pub fn bootstrap_training_set(rng: &mut StdRng) -> TrainingSet {
    let mut documents: Vec<String> = REAL_IDENTIFIERS.iter().map(|s| s.to_string()).collect();
    let mut labels = vec![1u8; REAL_IDENTIFIERS.len()];

    for real in REAL_IDENTIFIERS {
        for _ in 0..NEGATIVES_PER_IDENTIFIER {
            documents.push(mutate::character_substitute(real, NEGATIVE_SIMILARITY, rng));
            labels.push(0);
        }
    }

    TrainingSet { documents, labels }
}
