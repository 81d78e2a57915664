/// Settings that control how the analysis passes run. Follows the same
/// plain flag-struct-with-`Default`-impl idiom as the teacher's
/// `ParserConfig` (`radlr-core/types/parser_config.rs`) rather than pulling
/// in a config-file crate the rest of the stack never needed.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisConfig {
  /// Safety bound on the `compute_transitive_closure` stabilization loop.
  /// The loop is mathematically guaranteed to terminate (spec §5: bounded
  /// by `|attributes|²` edges per occurrence), this just keeps a
  /// pathological input from spinning forever.
  pub max_closure_iterations: u32,

  /// When false (the default), `remove_not_needed_attributes` sweeps
  /// non-needed attributes and empty groups out of every production's
  /// execution order, per spec §4.3 step 3. Set true to keep them for
  /// diagnostic inspection.
  pub keep_unneeded_attributes: bool,
}

impl Default for AnalysisConfig {
  fn default() -> Self {
    Self { max_closure_iterations: 10_000, keep_unneeded_attributes: false }
  }
}
