//! Decoy generation
//!
//! Maps the caller-facing complexity dial onto a target similarity and a
//! mutation strategy, then delegates to the mutation primitives.

use crate::mutate;
use rand::rngs::StdRng;
use rand::Rng;

/// Default complexity substituted for out-of-range values.
pub const DEFAULT_COMPLEXITY: u32 = 5;

/// Default batch size substituted for out-of-range values.
pub const DEFAULT_COUNT: usize = 10;

/// Valid complexity range.
pub const COMPLEXITY_RANGE: std::ops::RangeInclusive<i64> = 1..=10;

/// Valid batch count range.
pub const COUNT_RANGE: std::ops::RangeInclusive<i64> = 1..=100;

/// Normalize a requested complexity.
///
/// Out-of-range values are substituted with [`DEFAULT_COMPLEXITY`], not
/// clamped to the nearest bound and not rejected. Permissive by design; the
/// request always proceeds.
pub fn normalize_complexity(complexity: i64) -> u32 {
    if COMPLEXITY_RANGE.contains(&complexity) {
        complexity as u32
    } else {
        DEFAULT_COMPLEXITY
    }
}

/// Normalize a requested batch count. Same substitution policy as
/// [`normalize_complexity`], with [`DEFAULT_COUNT`] as the fallback.
pub fn normalize_count(count: i64) -> usize {
    if COUNT_RANGE.contains(&count) {
        count as usize
    } else {
        DEFAULT_COUNT
    }
}

/// Target similarity for a normalized complexity: `1 - complexity / 20`,
/// so complexity 1..=10 maps monotonically down from 0.95 to 0.5.
pub fn similarity_target(complexity: u32) -> f64 {
    1.0 - (f64::from(complexity) / 20.0)
}

/// Generate a single decoy for `target` at a normalized complexity.
///
/// Strategy selection:
/// - complexity <= 3: character substitution only
/// - complexity 4..=7: 50/50 between substitution and structural rewrite
/// - complexity >= 8: structural rewrite only
pub fn generate(target: &str, complexity: u32, rng: &mut StdRng) -> String {
    if target.is_empty() {
        return String::new();
    }

    let similarity = similarity_target(complexity);

    if complexity <= 3 {
        mutate::character_substitute(target, similarity, rng)
    } else if complexity <= 7 {
        if rng.random::<f64>() < 0.5 {
            mutate::character_substitute(target, similarity, rng)
        } else {
            mutate::structural_rewrite(target, similarity, rng)
        }
    } else {
        mutate::structural_rewrite(target, similarity, rng)
    }
}

/// Generate `count` decoys by independent calls to [`generate`].
///
/// Duplicates are permitted: each decoy is drawn independently and no
/// deduplication is applied.
pub fn generate_batch(target: &str, complexity: u32, count: usize, rng: &mut StdRng) -> Vec<String> {
    (0..count).map(|_| generate(target, complexity, rng)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn test_similarity_target_mapping() {
        assert!((similarity_target(1) - 0.95).abs() < 1e-12);
        assert!((similarity_target(5) - 0.75).abs() < 1e-12);
        assert!((similarity_target(10) - 0.5).abs() < 1e-12);
        // Monotonically decreasing across the dial
        for c in 1..10 {
            assert!(similarity_target(c) > similarity_target(c + 1));
        }
    }

    #[test]
    fn test_normalize_substitutes_defaults() {
        assert_eq!(normalize_complexity(999), DEFAULT_COMPLEXITY);
        assert_eq!(normalize_complexity(0), DEFAULT_COMPLEXITY);
        assert_eq!(normalize_complexity(-3), DEFAULT_COMPLEXITY);
        assert_eq!(normalize_complexity(7), 7);

        assert_eq!(normalize_count(-1), DEFAULT_COUNT);
        assert_eq!(normalize_count(101), DEFAULT_COUNT);
        assert_eq!(normalize_count(100), 100);
    }

    #[test]
    fn test_out_of_range_complexity_behaves_as_default() {
        // complexity=999 must produce the exact same decoy as complexity=5
        // under the same seed: the default is substituted before generation.
        let wild = generate("kyber768", normalize_complexity(999), &mut rng(11));
        let default = generate("kyber768", normalize_complexity(5), &mut rng(11));
        assert_eq!(wild, default);
    }

    #[test]
    fn test_generate_nonempty_for_real_targets() {
        for complexity in 1..=10 {
            for seed in 0..20 {
                let decoy = generate("kyber768", complexity, &mut rng(seed));
                assert!(!decoy.is_empty());
            }
        }
    }

    #[test]
    fn test_low_complexity_is_pure_substitution() {
        // Substitution preserves length and never returns the target itself.
        for seed in 0..50 {
            let decoy = generate("dilithium", 3, &mut rng(seed));
            assert_eq!(decoy.chars().count(), "dilithium".chars().count());
            assert_ne!(decoy, "dilithium");
        }
    }

    #[test]
    fn test_high_complexity_is_structural() {
        // Structural rewrites on an identifier without trailing digits are
        // affix rules, so the decoy either grows or (fallback) keeps length.
        for seed in 0..50 {
            let decoy = generate("saber", 9, &mut rng(seed));
            assert_ne!(decoy, "saber");
        }
    }

    #[test]
    fn test_generate_batch_count_and_independence() {
        let batch = generate_batch("falcon512", 4, 25, &mut rng(2));
        assert_eq!(batch.len(), 25);
        assert!(batch.iter().all(|d| !d.is_empty()));
    }

    #[test]
    fn test_generate_empty_target_degenerates() {
        assert_eq!(generate("", 5, &mut rng(1)), "");
    }
}
