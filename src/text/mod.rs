//! Text cleanup for raw recognizer output
//!
//! Normalization collapses whitespace and drops recognition noise;
//! structuring re-indents list-like lines.

pub mod normalize;
pub mod structure;

pub use normalize::normalize;
pub use structure::structure;

/// Full cleanup: normalize then structure
pub fn clean(text: &str) -> String {
    structure(&normalize(text))
}
