//! Mutation primitives for decoy strings
//!
//! Pure string transforms. No hidden state: every function takes an explicit
//! random source, so a fixed seed reproduces outputs exactly.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::Rng;

/// Homoglyph substitution table. Keyed case-insensitively; each row lists the
/// visually confusable replacements for one letter.
const HOMOGLYPHS: &[(char, &[char])] = &[
    ('a', &['@', '4', 'á']),
    ('b', &['6', '8', 'ß']),
    ('e', &['3', 'é', 'ë']),
    ('i', &['1', '!', 'í']),
    ('l', &['1', '|', 'ł']),
    ('o', &['0', 'ø', 'ó']),
    ('s', &['5', '$', 'š']),
    ('t', &['7', '+', 'ţ']),
    ('z', &['2', 'ž', 'ż']),
];

/// Replacement pool for characters that are neither letters nor digits.
const SYMBOLS: &[char] = &['!', '@', '#', '$', '%', '^', '&', '*', '-', '_', '+', '='];

/// Structural rewrite rules applied by [`structural_rewrite`].
///
/// Fixed, hand-authored table of identifier-shaped transforms; kept as data so
/// rules can be listed and tested individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteRule {
    /// `kyber768` -> `kyber-768`
    DashBeforeTrailingDigits,
    /// `kyber768` -> `kyber_768`
    UnderscoreBeforeTrailingDigits,
    /// `ntru` -> `ntru-prime`
    PrimeSuffix,
    /// `dilithium` -> `dilithiumv2`
    V2Suffix,
    /// `saber` -> `lightsaber`
    LightPrefix,
    /// `saber` -> `firesaber`
    FirePrefix,
    /// `picnic` -> `picnic3`
    VersionDigitSuffix,
}

/// All rewrite rules, in selection order.
pub const REWRITE_RULES: &[RewriteRule] = &[
    RewriteRule::DashBeforeTrailingDigits,
    RewriteRule::UnderscoreBeforeTrailingDigits,
    RewriteRule::PrimeSuffix,
    RewriteRule::V2Suffix,
    RewriteRule::LightPrefix,
    RewriteRule::FirePrefix,
    RewriteRule::VersionDigitSuffix,
];

mod rewrite_patterns {
    use once_cell::sync::Lazy;
    use regex::Regex;

    /// Shortest alphanumeric stem followed by a trailing digit run.
    pub static TRAILING_DIGITS: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^(\w+?)(\d+)$").expect("static regex"));
}

impl RewriteRule {
    /// Apply this rule to `s`. Separator rules are no-ops when the input has
    /// no trailing digit run; affix rules always change non-empty input.
    pub fn apply(&self, s: &str, rng: &mut StdRng) -> String {
        match self {
            RewriteRule::DashBeforeTrailingDigits => rewrite_patterns::TRAILING_DIGITS
                .replace(s, "$1-$2")
                .into_owned(),
            RewriteRule::UnderscoreBeforeTrailingDigits => rewrite_patterns::TRAILING_DIGITS
                .replace(s, "${1}_$2")
                .into_owned(),
            RewriteRule::PrimeSuffix => format!("{s}-prime"),
            RewriteRule::V2Suffix => format!("{s}v2"),
            RewriteRule::LightPrefix => format!("light{s}"),
            RewriteRule::FirePrefix => format!("fire{s}"),
            RewriteRule::VersionDigitSuffix => {
                format!("{s}{}", rng.random_range(0..10u32))
            }
        }
    }
}

/// Look up homoglyph replacements for a character, case-insensitively.
fn homoglyphs_for(c: char) -> Option<&'static [char]> {
    let lower = c.to_ascii_lowercase();
    HOMOGLYPHS
        .iter()
        .find(|(key, _)| *key == lower)
        .map(|(_, options)| *options)
}

/// Rotate an ASCII letter by a uniform non-zero offset within its case,
/// guaranteeing a different letter.
fn rotate_letter(c: char, base: u8, rng: &mut StdRng) -> char {
    let offset = rng.random_range(1..26u8);
    char::from(base + (c as u8 - base + offset) % 26)
}

/// Replace one character according to its class: homoglyph if tabled, a
/// different case-preserving letter if alphabetic, a different digit if
/// numeric, otherwise a random symbol.
fn substitute_char(c: char, rng: &mut StdRng) -> char {
    if let Some(options) = homoglyphs_for(c) {
        options[rng.random_range(0..options.len())]
    } else if c.is_ascii_lowercase() {
        rotate_letter(c, b'a', rng)
    } else if c.is_ascii_uppercase() {
        rotate_letter(c, b'A', rng)
    } else if c.is_alphabetic() {
        // Non-ASCII letters fall back to a random lowercase ASCII letter,
        // which always differs from the original.
        char::from(rng.random_range(b'a'..=b'z'))
    } else if c.is_ascii_digit() {
        // Pick from the nine digits that differ from the original.
        let offset = rng.random_range(1..10u8);
        char::from(b'0' + (c as u8 - b'0' + offset) % 10)
    } else {
        SYMBOLS[rng.random_range(0..SYMBOLS.len())]
    }
}

/// Substitute characters at random distinct positions.
///
/// The number of modified positions is `(1 - similarity_target) * len`,
/// rounded, then clamped to `[1, len - 1]` so the output is never identical
/// to the input and never fully replaced. Empty input yields an empty string
/// (degenerate case, not an error).
pub fn character_substitute(s: &str, similarity_target: f64, rng: &mut StdRng) -> String {
    let mut chars: Vec<char> = s.chars().collect();
    if chars.is_empty() {
        return String::new();
    }

    let len = chars.len();
    let raw = ((1.0 - similarity_target) * len as f64).round() as usize;
    // At least one position, at most len - 1 (never a full replacement).
    let mut num_to_modify = raw.min(len - 1);
    if num_to_modify == 0 {
        num_to_modify = 1;
    }

    for pos in sample(rng, len, num_to_modify) {
        chars[pos] = substitute_char(chars[pos], rng);
    }

    chars.into_iter().collect()
}

/// Rewrite the structure of an identifier using one randomly chosen rule.
///
/// Guarantees the output differs from the input for non-empty `s`: a rule
/// that turns out to be a no-op falls back to [`character_substitute`].
pub fn structural_rewrite(s: &str, similarity_target: f64, rng: &mut StdRng) -> String {
    if s.is_empty() {
        return String::new();
    }

    let rule = REWRITE_RULES[rng.random_range(0..REWRITE_RULES.len())];
    let result = rule.apply(s, rng);

    if result == s {
        return character_substitute(s, similarity_target, rng);
    }

    result
}

/// Alphanumeric pool for random edits.
const EDIT_POOL: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn random_pool_char(rng: &mut StdRng) -> char {
    char::from(EDIT_POOL[rng.random_range(0..EDIT_POOL.len())])
}

/// Apply `mutation_count` independent random edits.
///
/// Each edit is uniformly one of substitute, insert, delete, or swap.
/// Delete and swap are skipped when the string has fewer than two characters,
/// so the result never degenerates to an invalid state.
pub fn random_edit(s: &str, mutation_count: usize, rng: &mut StdRng) -> String {
    let mut chars: Vec<char> = s.chars().collect();

    for _ in 0..mutation_count {
        match rng.random_range(0..4u8) {
            0 => {
                if !chars.is_empty() {
                    let pos = rng.random_range(0..chars.len());
                    chars[pos] = random_pool_char(rng);
                }
            }
            1 => {
                let pos = rng.random_range(0..=chars.len());
                chars.insert(pos, random_pool_char(rng));
            }
            2 => {
                if chars.len() >= 2 {
                    let pos = rng.random_range(0..chars.len());
                    chars.remove(pos);
                }
            }
            _ => {
                if chars.len() >= 2 {
                    let picks = sample(rng, chars.len(), 2);
                    chars.swap(picks.index(0), picks.index(1));
                }
            }
        }
    }

    chars.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn test_character_substitute_empty_input() {
        assert_eq!(character_substitute("", 0.8, &mut rng(1)), "");
    }

    #[test]
    fn test_character_substitute_changes_bounded_positions() {
        let target = "kyber768";
        for seed in 0..50 {
            let decoy = character_substitute(target, 0.85, &mut rng(seed));
            assert_eq!(decoy.chars().count(), target.chars().count());
            let changed = decoy
                .chars()
                .zip(target.chars())
                .filter(|(a, b)| a != b)
                .count();
            // (1 - 0.85) * 8 rounds to 1; at most len - 1 positions may differ
            assert!(changed >= 1, "decoy {decoy:?} is identical to target");
            assert!(changed <= target.len() - 1);
        }
    }

    #[test]
    fn test_character_substitute_single_char_still_modifies() {
        let decoy = character_substitute("k", 0.95, &mut rng(7));
        assert_eq!(decoy.chars().count(), 1);
        assert_ne!(decoy, "k");
    }

    #[test]
    fn test_substitute_char_digit_always_differs() {
        let mut r = rng(3);
        for _ in 0..100 {
            assert_ne!(substitute_char('7', &mut r), '7');
            let replacement = substitute_char('0', &mut r);
            assert!(replacement.is_ascii_digit());
            assert_ne!(replacement, '0');
        }
    }

    #[test]
    fn test_substitute_char_homoglyph_membership() {
        let mut r = rng(4);
        for _ in 0..50 {
            let replacement = substitute_char('o', &mut r);
            assert!(['0', 'ø', 'ó'].contains(&replacement));
            // Uppercase letters use the same table rows
            let upper = substitute_char('S', &mut r);
            assert!(['5', '$', 'š'].contains(&upper));
        }
    }

    #[test]
    fn test_substitute_char_preserves_case_and_differs() {
        let mut r = rng(5);
        for _ in 0..50 {
            // 'k' and 'K' have no homoglyph row
            let lower = substitute_char('k', &mut r);
            assert!(lower.is_lowercase());
            assert_ne!(lower, 'k');
            let upper = substitute_char('K', &mut r);
            assert!(upper.is_uppercase());
            assert_ne!(upper, 'K');
        }
    }

    #[test]
    fn test_structural_rewrite_never_identity() {
        for seed in 0..100 {
            let out = structural_rewrite("kyber768", 0.85, &mut rng(seed));
            assert_ne!(out, "kyber768");
            let out = structural_rewrite("ntru", 0.85, &mut rng(seed));
            assert_ne!(out, "ntru");
        }
    }

    #[test]
    fn test_rewrite_rule_trailing_digit_separators() {
        let mut r = rng(6);
        assert_eq!(
            RewriteRule::DashBeforeTrailingDigits.apply("kyber768", &mut r),
            "kyber-768"
        );
        assert_eq!(
            RewriteRule::UnderscoreBeforeTrailingDigits.apply("falcon512", &mut r),
            "falcon_512"
        );
        // No trailing digit run: rule is a no-op
        assert_eq!(
            RewriteRule::DashBeforeTrailingDigits.apply("saber", &mut r),
            "saber"
        );
    }

    #[test]
    fn test_rewrite_rule_affixes() {
        let mut r = rng(7);
        assert_eq!(RewriteRule::PrimeSuffix.apply("ntru", &mut r), "ntru-prime");
        assert_eq!(RewriteRule::V2Suffix.apply("dilithium", &mut r), "dilithiumv2");
        assert_eq!(RewriteRule::LightPrefix.apply("saber", &mut r), "lightsaber");
        assert_eq!(RewriteRule::FirePrefix.apply("saber", &mut r), "firesaber");
        let versioned = RewriteRule::VersionDigitSuffix.apply("picnic", &mut r);
        assert!(versioned.starts_with("picnic"));
        assert_eq!(versioned.len(), "picnic".len() + 1);
        assert!(versioned.chars().last().is_some_and(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_random_edit_short_string_skips_delete_and_swap() {
        // A 1-char string can only be substituted or grown; it never empties.
        for seed in 0..100 {
            let out = random_edit("k", 3, &mut rng(seed));
            assert!(!out.is_empty());
        }
    }

    #[test]
    fn test_random_edit_zero_count_is_identity() {
        assert_eq!(random_edit("kyber768", 0, &mut rng(1)), "kyber768");
    }

    #[test]
    fn test_seeded_reproducibility() {
        let a = character_substitute("mceliece348864", 0.7, &mut rng(42));
        let b = character_substitute("mceliece348864", 0.7, &mut rng(42));
        assert_eq!(a, b);

        let a = structural_rewrite("frodokem640", 0.7, &mut rng(42));
        let b = structural_rewrite("frodokem640", 0.7, &mut rng(42));
        assert_eq!(a, b);

        let a = random_edit("sphincs+", 4, &mut rng(42));
        let b = random_edit("sphincs+", 4, &mut rng(42));
        assert_eq!(a, b);
    }
}
