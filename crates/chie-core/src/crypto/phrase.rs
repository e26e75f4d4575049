//! Recovery phrase generation and normalization.
//!
//! A phrase is twelve words drawn with replacement from a fixed 48-word list,
//! joined with `-`. That is roughly 12 × log2(48) ≈ 67 bits of entropy, which
//! is then stretched through the same KDF as the password.

use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

/// Number of words in a recovery phrase.
pub const PHRASE_WORD_COUNT: usize = 12;

/// Separator placed between words.
pub const PHRASE_SEPARATOR: char = '-';

/// The fixed recovery dictionary.
pub const WORDLIST: [&str; 48] = [
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india", "juliet",
    "kilo", "lima", "mike", "november", "oscar", "papa", "quebec", "romeo", "sierra", "tango",
    "uniform", "victor", "whiskey", "xray", "yankee", "zulu", "azure", "bronze", "copper",
    "diamond", "emerald", "frost", "golden", "harbor", "ivory", "jade", "knight", "lunar",
    "marble", "nebula", "ocean", "pearl", "quartz", "ruby", "silver", "tiger", "ultra", "velvet",
];

/// A generated recovery phrase.
///
/// Held as a secret string; `Debug` output is redacted.
#[derive(Debug)]
pub struct RecoveryPhrase(SecretString);

impl RecoveryPhrase {
    /// Generate a new phrase from the OS random number generator.
    pub fn generate() -> Self {
        let mut rng = OsRng;
        let words: Vec<&str> = (0..PHRASE_WORD_COUNT)
            .map(|_| WORDLIST[rng.gen_range(0..WORDLIST.len())])
            .collect();
        let separator = PHRASE_SEPARATOR.to_string();
        Self(SecretString::from(words.join(&separator)))
    }

    /// The phrase text, for display to the user exactly once.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Whether `input` names the same phrase after normalization.
    pub fn matches(&self, input: &str) -> bool {
        let candidate = normalize_phrase(input);
        candidate.as_str() == self.expose()
    }
}

/// Trim surrounding whitespace and lower-case a user-entered phrase.
///
/// Generated phrases are already in this form, so normalization is the
/// identity on them.
pub fn normalize_phrase(input: &str) -> Zeroizing<String> {
    Zeroizing::new(input.trim().to_lowercase())
}

/// Text of the recovery-key file offered to the user at setup.
pub fn recovery_artifact(phrase: &RecoveryPhrase, created_at: DateTime<Utc>) -> Zeroizing<String> {
    Zeroizing::new(format!(
        "Chie Recovery Key\n\n\
         IMPORTANT: Keep this key safe and secure!\n\n\
         Your Recovery Key:\n{}\n\n\
         Date: {}\n\n\
         If you forget your password, you can use this recovery key to regain \
         access to your encrypted journal data.\n",
        phrase.expose(),
        created_at.format("%Y-%m-%d %H:%M:%S UTC"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_wordlist_has_48_unique_lowercase_words() {
        let unique: HashSet<&str> = WORDLIST.iter().copied().collect();
        assert_eq!(unique.len(), 48);
        assert!(WORDLIST
            .iter()
            .all(|w| w.chars().all(|c| c.is_ascii_lowercase())));
    }

    #[test]
    fn test_generated_phrase_shape() {
        let phrase = RecoveryPhrase::generate();
        let words: Vec<&str> = phrase.expose().split(PHRASE_SEPARATOR).collect();
        assert_eq!(words.len(), PHRASE_WORD_COUNT);
        assert!(words.iter().all(|w| WORDLIST.contains(w)));
    }

    #[test]
    fn test_generated_phrases_differ() {
        let a = RecoveryPhrase::generate();
        let b = RecoveryPhrase::generate();
        assert_ne!(a.expose(), b.expose());
    }

    #[test]
    fn test_normalization() {
        assert_eq!(
            normalize_phrase("  Alpha-Bravo-CHARLIE \n").as_str(),
            "alpha-bravo-charlie"
        );
    }

    #[test]
    fn test_matches_ignores_case_and_whitespace() {
        let phrase = RecoveryPhrase::generate();
        let shouted = format!("  {}  ", phrase.expose().to_uppercase());
        assert!(phrase.matches(&shouted));
        assert!(!phrase.matches("alpha"));
    }

    #[test]
    fn test_debug_does_not_leak_phrase() {
        let phrase = RecoveryPhrase::generate();
        let debug = format!("{:?}", phrase);
        assert!(!debug.contains(phrase.expose()));
    }

    #[test]
    fn test_artifact_contains_phrase_and_warning() {
        let phrase = RecoveryPhrase::generate();
        let text = recovery_artifact(&phrase, Utc::now());
        assert!(text.contains(phrase.expose()));
        assert!(text.contains("IMPORTANT"));
    }
}
