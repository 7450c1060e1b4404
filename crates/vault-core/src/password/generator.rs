//! Random password generator

use rand::{rngs::OsRng, seq::SliceRandom, CryptoRng, Rng};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};

const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const NUMBERS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Characters easily confused with one another when read
const SIMILAR: &str = "il1Lo0O";
/// Brackets, quotes and separators that break naive copy/paste
const AMBIGUOUS: &str = "{}[]()/\\'\"~,;<>.";

/// Generator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorOptions {
    pub length: usize,
    pub uppercase: bool,
    pub lowercase: bool,
    pub numbers: bool,
    pub symbols: bool,
    pub exclude_similar: bool,
    pub exclude_ambiguous: bool,
    /// Extra characters added to the set
    pub custom_chars: String,
    /// Characters removed from the set, applied last
    pub exclude_chars: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            length: 16,
            uppercase: true,
            lowercase: true,
            numbers: true,
            symbols: true,
            exclude_similar: true,
            exclude_ambiguous: false,
            custom_chars: String::new(),
            exclude_chars: String::new(),
        }
    }
}

impl GeneratorOptions {
    /// The distinct characters a generated password may contain, in
    /// class order followed by custom characters.
    pub fn charset(&self) -> Vec<char> {
        let classes = [
            (self.uppercase, UPPERCASE),
            (self.lowercase, LOWERCASE),
            (self.numbers, NUMBERS),
            (self.symbols, SYMBOLS),
        ];

        let mut charset: Vec<char> = classes
            .iter()
            .filter(|(enabled, _)| *enabled)
            .flat_map(|(_, chars)| chars.chars())
            .collect();

        if self.exclude_similar {
            charset.retain(|c| !SIMILAR.contains(*c));
        }
        if self.exclude_ambiguous {
            charset.retain(|c| !AMBIGUOUS.contains(*c));
        }

        charset.extend(self.custom_chars.chars());
        charset.retain(|c| !self.exclude_chars.contains(*c));

        let mut seen = std::collections::HashSet::new();
        charset.retain(|c| seen.insert(*c));
        charset
    }
}

/// Named option sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    HighSecurity,
    MediumSecurity,
    Basic,
    PinCode,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::HighSecurity,
        Preset::MediumSecurity,
        Preset::Basic,
        Preset::PinCode,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::HighSecurity => "High Security",
            Self::MediumSecurity => "Medium Security",
            Self::Basic => "Basic",
            Self::PinCode => "PIN Code",
        }
    }

    pub fn options(&self) -> GeneratorOptions {
        let (length, letters, symbols, exclude_similar) = match self {
            Self::HighSecurity => (20, true, true, true),
            Self::MediumSecurity => (16, true, true, false),
            Self::Basic => (12, true, false, false),
            Self::PinCode => (6, false, false, false),
        };

        GeneratorOptions {
            length,
            uppercase: letters,
            lowercase: letters,
            numbers: true,
            symbols,
            exclude_similar,
            ..GeneratorOptions::default()
        }
    }
}

impl std::str::FromStr for Preset {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "");
        Self::ALL
            .into_iter()
            .find(|p| p.name().to_ascii_lowercase().replace(' ', "") == normalized)
            .ok_or_else(|| VaultError::ConfigurationError(format!("unknown preset: {}", s)))
    }
}

/// Generate a password with the OS random number generator
pub fn generate(options: &GeneratorOptions) -> Result<String> {
    generate_with_rng(options, &mut OsRng)
}

/// Generate a password drawing each character uniformly from
/// [`GeneratorOptions::charset`]
pub fn generate_with_rng<R: Rng + CryptoRng>(
    options: &GeneratorOptions,
    rng: &mut R,
) -> Result<String> {
    if options.length == 0 {
        return Err(VaultError::ConfigurationError(
            "password length must be at least 1".to_string(),
        ));
    }

    let charset = options.charset();
    if charset.is_empty() {
        return Err(VaultError::ConfigurationError(
            "no characters available: enable a character class or add custom characters"
                .to_string(),
        ));
    }

    (0..options.length)
        .map(|_| {
            charset.choose(&mut *rng).copied().ok_or_else(|| {
                VaultError::ConfigurationError("character set is empty".to_string())
            })
        })
        .collect()
}
