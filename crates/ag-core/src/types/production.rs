use super::group::Group;
use super::handles::{ProductionHandle, VariableHandle};

/// One production rule: a fixed-size ordered list of occurrences, position
/// 0 is the LHS, positions 1..n are the RHS symbols (spec §3).
#[derive(Debug, Clone)]
pub struct Production {
  pub handle: ProductionHandle,
  pub lhs_name: String,
  /// Index of this production among all productions sharing its LHS,
  /// assigned in first-seen (parse) order — used only for display (spec §6
  /// `Production <LHS><idx>: ...`).
  pub lhs_ordinal: usize,
  pub variables: Vec<VariableHandle>,
  pub acyclic: bool,
  pub execution_order: Vec<Group>,
}

impl Production {
  pub fn new(handle: ProductionHandle, lhs_name: String, lhs_ordinal: usize) -> Self {
    Self { handle, lhs_name, lhs_ordinal, variables: Vec::new(), acyclic: true, execution_order: Vec::new() }
  }

  pub fn lhs(&self) -> VariableHandle {
    self.variables[0]
  }

  pub fn rhs(&self) -> &[VariableHandle] {
    &self.variables[1..]
  }
}
