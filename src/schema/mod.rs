//! Schema module - Configuration and pattern types for container generation.

mod config;
mod pattern;

pub use config::*;
pub use pattern::*;
