use super::attribute::{Attribute, AttributeArena, AttributeKind};
use super::handles::{AttributeHandle, ProductionHandle, VariableHandle};
use super::production::Production;
use super::variable::Variable;
use crate::collections::OrderedMap;

/// Top-level container (spec §3, §4.4): productions grouped by LHS
/// nonterminal, occurrences grouped by nonterminal identifier, plus the
/// arenas that own every node addressed by the handles above (spec §9).
#[derive(Debug, Clone, Default)]
pub struct Grammar {
  pub(crate) attrs: AttributeArena,
  pub(crate) variables: Vec<Variable>,
  pub(crate) productions: Vec<Production>,
  pub productions_by_lhs: OrderedMap<String, Vec<ProductionHandle>>,
  pub occurrences_by_name: OrderedMap<String, Vec<VariableHandle>>,
}

impl Grammar {
  pub fn new() -> Self {
    Self::default()
  }

  // -- accessors ----------------------------------------------------------

  pub fn attrs(&self) -> &AttributeArena {
    &self.attrs
  }

  pub fn attrs_mut(&mut self) -> &mut AttributeArena {
    &mut self.attrs
  }

  pub fn attr(&self, handle: AttributeHandle) -> &Attribute {
    self.attrs.get(handle)
  }

  pub fn variable(&self, handle: VariableHandle) -> &Variable {
    &self.variables[handle.index()]
  }

  pub fn variable_mut(&mut self, handle: VariableHandle) -> &mut Variable {
    &mut self.variables[handle.index()]
  }

  pub fn production(&self, handle: ProductionHandle) -> &Production {
    &self.productions[handle.index()]
  }

  pub fn production_mut(&mut self, handle: ProductionHandle) -> &mut Production {
    &mut self.productions[handle.index()]
  }

  pub fn all_production_handles(&self) -> Vec<ProductionHandle> {
    (0..self.productions.len() as u32).map(ProductionHandle).collect()
  }

  pub fn representative_occurrence(&self, nonterm: &str) -> Option<VariableHandle> {
    self.occurrences_by_name.get(&nonterm.to_string()).and_then(|occs| occs.first().copied())
  }

  // -- construction ---------------------------------------------------------

  /// Allocates a new production for `lhs_name`, registering it (in
  /// first-seen order) under `productions_by_lhs`.
  pub fn alloc_production(&mut self, lhs_name: &str) -> ProductionHandle {
    let handle = ProductionHandle(self.productions.len() as u32);
    let ordinal = self.productions_by_lhs.get(&lhs_name.to_string()).map(|v| v.len()).unwrap_or(0);
    self.productions.push(Production::new(handle, lhs_name.to_string(), ordinal));
    self.productions_by_lhs.entry_or_insert_with(lhs_name.to_string(), Vec::new).push(handle);
    handle
  }

  /// Allocates a new occurrence of `name` at `position` within
  /// `owning_production`, immediately mirroring in any attributes already
  /// known for other occurrences of `name` (as not-needed placeholders),
  /// preserving the mirror invariant (spec §3) from the moment of creation.
  pub fn alloc_variable(&mut self, name: &str, position: usize, owning_production: ProductionHandle) -> VariableHandle {
    let handle = VariableHandle(self.variables.len() as u32);
    let mut variable = Variable::new(handle, name.to_string(), position, owning_production);

    if let Some(representative) = self.representative_occurrence(name) {
      let to_mirror: Vec<(String, AttributeKind)> =
        self.variable(representative).attributes.iter().map(|(n, &h)| (n.clone(), self.attrs.get(h).kind)).collect();
      for (attr_name, kind) in to_mirror {
        let mirrored = self.attrs.alloc(Attribute::new(attr_name.clone(), position, kind, handle));
        variable.attributes.insert(attr_name, mirrored);
      }
    }

    self.variables.push(variable);
    self.productions[owning_production.index()].variables.push(handle);
    self.occurrences_by_name.entry_or_insert_with(name.to_string(), Vec::new).push(handle);
    handle
  }

  /// Returns the attribute named `name` at `owner`, creating it (and
  /// mirroring its existence, as a not-needed placeholder, onto every other
  /// occurrence of the same nonterminal) if this is its first mention.
  pub fn ensure_attribute(&mut self, owner: VariableHandle, name: &str, kind: AttributeKind) -> AttributeHandle {
    if let Some(&existing) = self.variable(owner).attributes.get(&name.to_string()) {
      return existing;
    }

    let index = self.variable(owner).position;
    let handle = self.attrs.alloc(Attribute::new(name.to_string(), index, kind, owner));
    self.variable_mut(owner).attributes.insert(name.to_string(), handle);

    let nonterm = self.variable(owner).name.clone();
    let other_occurrences: Vec<VariableHandle> =
      self.occurrences_by_name.get(&nonterm).map(|o| o.iter().copied().filter(|&v| v != owner).collect()).unwrap_or_default();
    for other in other_occurrences {
      if !self.variable(other).attributes.contains_key(&name.to_string()) {
        let other_index = self.variable(other).position;
        let mirrored = self.attrs.alloc(Attribute::new(name.to_string(), other_index, kind, other));
        self.variable_mut(other).attributes.insert(name.to_string(), mirrored);
      }
    }

    handle
  }

  /// Like `ensure_attribute`, but for the one call site that knows it holds
  /// the rule's true defining occurrence (a rule's left-hand side): always
  /// overwrites `kind`, even when an earlier right-hand reference already
  /// created the attribute with a guessed kind, and mirrors the corrected
  /// kind onto every other occurrence the same way a freshly created
  /// attribute is mirrored.
  pub fn define_attribute(&mut self, owner: VariableHandle, name: &str, kind: AttributeKind) -> AttributeHandle {
    let handle = self.ensure_attribute(owner, name, kind);
    self.attrs.get_mut(handle).kind = kind;

    let nonterm = self.variable(owner).name.clone();
    let other_occurrences: Vec<VariableHandle> =
      self.occurrences_by_name.get(&nonterm).map(|o| o.iter().copied().filter(|&v| v != owner).collect()).unwrap_or_default();
    for other in other_occurrences {
      if let Some(&other_handle) = self.variable(other).attributes.get(&name.to_string()) {
        self.attrs.get_mut(other_handle).kind = kind;
      }
    }

    handle
  }

  pub fn mark_needed(&mut self, handle: AttributeHandle) {
    self.attrs.get_mut(handle).needed = true;
  }

  /// Adds the dependency `left -> right` declared by a semantic rule. When
  /// both attributes belong to the same occurrence (an intra-nonterminal
  /// dependency, spec §3 Mirror invariant), the edge is mirrored onto every
  /// other occurrence of that nonterminal immediately, the same way
  /// `compute_transitive_closure` mirrors projected edges later.
  pub fn add_rule_dependency(&mut self, left: AttributeHandle, right: AttributeHandle) {
    if !self.attrs.add_dependency(left, right) {
      return;
    }
    if self.attr(left).index != self.attr(right).index {
      return;
    }
    let owner = self.attr(left).owner;
    debug_assert_eq!(owner, self.attr(right).owner, "same-index dependency without a shared owning occurrence");
    self.mirror_intra_occurrence_dependency(owner, left, right);
  }

  pub(crate) fn mirror_intra_occurrence_dependency(&mut self, owner: VariableHandle, left: AttributeHandle, right: AttributeHandle) {
    let nonterm = self.variable(owner).name.clone();
    let left_name = self.attr(left).name.clone();
    let right_name = self.attr(right).name.clone();
    let left_kind = self.attr(left).kind;
    let right_kind = self.attr(right).kind;

    let others: Vec<VariableHandle> =
      self.occurrences_by_name.get(&nonterm).map(|o| o.iter().copied().filter(|&v| v != owner).collect()).unwrap_or_default();

    for other in others {
      let lh = self.ensure_attribute(other, &left_name, left_kind);
      let rh = self.ensure_attribute(other, &right_name, right_kind);
      self.attrs.add_dependency(lh, rh);
    }
  }
}
