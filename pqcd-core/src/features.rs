//! Character n-gram feature extraction
//!
//! Bag-of-n-grams representation over a vocabulary fit on the training
//! corpus. The vocabulary is ordered lexically so a fit on the same corpus
//! always yields the same feature layout, and serialized artifacts are
//! byte-stable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Character n-gram vectorizer paired with a trained classifier.
///
/// The vocabulary maps each n-gram seen during [`NgramVectorizer::fit`] to a
/// fixed feature index. N-grams unseen at fit time are ignored at transform
/// time. Input is lowercased before extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NgramVectorizer {
    ngram_min: usize,
    ngram_max: usize,
    vocabulary: BTreeMap<String, usize>,
}

/// Collect all character n-grams of `s` for n in `[ngram_min, ngram_max]`.
fn ngrams_of(s: &str, ngram_min: usize, ngram_max: usize) -> Vec<String> {
    let chars: Vec<char> = s.to_lowercase().chars().collect();
    let mut grams = Vec::new();

    for n in ngram_min..=ngram_max {
        if n == 0 || n > chars.len() {
            continue;
        }
        for window in chars.windows(n) {
            grams.push(window.iter().collect());
        }
    }

    grams
}

impl NgramVectorizer {
    /// Build a vocabulary from the corpus.
    ///
    /// Feature indices are assigned in lexical n-gram order, independent of
    /// corpus ordering.
    pub fn fit<S: AsRef<str>>(corpus: &[S], ngram_min: usize, ngram_max: usize) -> Self {
        let mut vocabulary = BTreeMap::new();
        for doc in corpus {
            for gram in ngrams_of(doc.as_ref(), ngram_min, ngram_max) {
                vocabulary.entry(gram).or_insert(0);
            }
        }

        // Re-index in sorted order (BTreeMap iteration is lexical).
        for (index, (_, slot)) in vocabulary.iter_mut().enumerate() {
            *slot = index;
        }

        NgramVectorizer {
            ngram_min,
            ngram_max,
            vocabulary,
        }
    }

    /// Number of features (vocabulary size).
    pub fn dim(&self) -> usize {
        self.vocabulary.len()
    }

    /// Transform a string into its n-gram count vector.
    pub fn transform(&self, s: &str) -> Vec<f64> {
        let mut counts = vec![0.0; self.vocabulary.len()];
        for gram in ngrams_of(s, self.ngram_min, self.ngram_max) {
            if let Some(&index) = self.vocabulary.get(&gram) {
                counts[index] += 1.0;
            }
        }
        counts
    }

    /// Transform a batch of strings into a row-major count matrix.
    pub fn transform_batch<S: AsRef<str>>(&self, docs: &[S]) -> Vec<Vec<f64>> {
        docs.iter().map(|d| self.transform(d.as_ref())).collect()
    }
}
