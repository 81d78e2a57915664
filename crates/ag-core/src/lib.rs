//! Attribute-grammar local evaluation order analysis.
//!
//! Given a grammar's productions, nonterminal occurrences, and semantic
//! rules, computes — per production — a synchronized evaluation schedule
//! for that production's attributes, splitting groups where necessary to
//! break inter-occurrence cycles that do not reflect genuine circularity.

pub mod collections;
pub mod config;
pub mod error;
pub mod passes;
pub mod types;

pub use config::AnalysisConfig;
pub use error::{AgError, AgResult};
pub use types::{Attribute, AttributeArena, AttributeHandle, AttributeKind, EffectiveKind, Grammar, Group, Production, ProductionHandle, Variable, VariableHandle};

/// Runs all three passes in order (spec §4.4): transitive closure, then
/// attribute grouping, then per-production schedule construction.
pub fn analyze(grammar: &mut Grammar, config: &AnalysisConfig) -> AgResult<()> {
  grammar.compute_transitive_closure(config)?;
  grammar.compute_attribute_groups();
  grammar.determine_compatible_local_execution_orders();
  Ok(())
}
