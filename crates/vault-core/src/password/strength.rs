//! Heuristic 0-100 strength score
//!
//! Points are additive: up to 40 for length and 15 for each character class
//! present. This is a display heuristic, not an entropy estimate.

use serde::{Deserialize, Serialize};

/// Score a password on a 0-100 scale
pub fn score(password: &str) -> u8 {
    let length = password.chars().count();
    let mut total: u32 = 0;

    if length >= 8 {
        total += 20;
    }
    if length >= 12 {
        total += 10;
    }
    if length >= 16 {
        total += 10;
    }

    let classes = [
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];
    total += 15 * classes.iter().filter(|present| **present).count() as u32;

    total.min(100) as u8
}

/// Display bucket for a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthLabel {
    Weak,
    Medium,
    Strong,
    Excellent,
}

impl StrengthLabel {
    pub fn from_score(score: u8) -> Self {
        if score >= 90 {
            Self::Excellent
        } else if score >= 70 {
            Self::Strong
        } else if score >= 50 {
            Self::Medium
        } else {
            Self::Weak
        }
    }

    pub fn of(password: &str) -> Self {
        Self::from_score(score(password))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weak => "Weak",
            Self::Medium => "Medium",
            Self::Strong => "Strong",
            Self::Excellent => "Excellent",
        }
    }
}

impl std::fmt::Display for StrengthLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_scores_zero() {
        assert_eq!(score(""), 0);
    }

    #[test]
    fn test_known_scores() {
        assert_eq!(score("abcdefgh"), 35);
        assert_eq!(score("Abcdefgh12!@"), 90);
        assert_eq!(score(&"a".repeat(20)), 55);
        assert_eq!(score("a"), 15);
        assert_eq!(score("!"), 15);
        assert_eq!(score("123456"), 15);
    }

    #[test]
    fn test_capped_at_one_hundred() {
        assert_eq!(score("Abcdefgh12!@Abcd"), 100);
        assert_eq!(score(&"aA1!".repeat(50)), 100);
    }

    #[test]
    fn test_non_ascii_counts_as_symbol() {
        // é is outside [A-Za-z0-9] and is not an ASCII lowercase letter
        assert_eq!(score("é"), 15);
        assert_eq!(score("ééééééé"), 15);
        assert_eq!(score("éééééééé"), 35);
    }

    #[test]
    fn test_score_always_in_range() {
        for password in ["", " ", "🔐🔐🔐🔐🔐🔐🔐🔐🔐🔐🔐🔐🔐🔐🔐🔐", "Zz9.", "PASSWORD"] {
            assert!(score(password) <= 100);
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(StrengthLabel::from_score(100), StrengthLabel::Excellent);
        assert_eq!(StrengthLabel::from_score(90), StrengthLabel::Excellent);
        assert_eq!(StrengthLabel::from_score(89), StrengthLabel::Strong);
        assert_eq!(StrengthLabel::from_score(70), StrengthLabel::Strong);
        assert_eq!(StrengthLabel::from_score(69), StrengthLabel::Medium);
        assert_eq!(StrengthLabel::from_score(50), StrengthLabel::Medium);
        assert_eq!(StrengthLabel::from_score(49), StrengthLabel::Weak);
        assert_eq!(StrengthLabel::from_score(0), StrengthLabel::Weak);

        assert_eq!(StrengthLabel::of("abcdefgh").to_string(), "Weak");
    }
}
