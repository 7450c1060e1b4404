//! Password strength scoring and generation

mod generator;
mod strength;

pub use generator::{generate, generate_with_rng, GeneratorOptions, Preset};
pub use strength::{score, StrengthLabel};
