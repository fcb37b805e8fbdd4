//! Utility functions and helpers.

pub mod id_generator;
pub mod text;
pub mod token;

// Re-export commonly used types
pub use id_generator::IdGenerator;
pub use text::{contains_ignore_case, matches_any};
