//! The rule engine: declarative, data-only rules that combine signal
//! matching over an episode with topology-aware scoring.

pub mod engine;
pub mod error;
pub mod schema;

pub use engine::apply_rules;
pub use error::RuleLoadError;
pub use schema::{load_rules, Rule, ScoreWeights, Signal, When};
