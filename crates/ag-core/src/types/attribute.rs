use std::collections::BTreeSet;

use super::handles::{AttributeHandle, VariableHandle};

/// The three-valued tag from spec §3, kept as a dedicated enum rather than
/// dispatched by string or integer, per the teacher's `RecursionType` /
/// `ReductionType` style of small closed tag enums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
  Inherited,
  Synthesized,
  InitByValue,
}

/// Inherited vs. synthesized as it matters for grouping: `init-by-value` at
/// index 0 behaves like a synthesized attribute, elsewhere like an
/// inherited one (spec §4.2 step 1, §9 design note on `effective_kind`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectiveKind {
  Inherited,
  Synthesized,
}

/// One node of the dependence graph: a single attribute at a single
/// nonterminal occurrence, identified by `(name, index)` (spec §3).
#[derive(Debug, Clone)]
pub struct Attribute {
  pub name: String,
  pub index: usize,
  pub kind: AttributeKind,
  pub needed: bool,
  pub owner: VariableHandle,
  pub depends_on: BTreeSet<AttributeHandle>,
  pub used_for: BTreeSet<AttributeHandle>,
  pub same_index_pred_count: u32,
}

impl Attribute {
  pub fn new(name: String, index: usize, kind: AttributeKind, owner: VariableHandle) -> Self {
    Self {
      name,
      index,
      kind,
      needed: false,
      owner,
      depends_on: BTreeSet::new(),
      used_for: BTreeSet::new(),
      same_index_pred_count: 0,
    }
  }

  pub fn effective_kind(&self) -> EffectiveKind {
    match self.kind {
      AttributeKind::Synthesized => EffectiveKind::Synthesized,
      AttributeKind::Inherited => EffectiveKind::Inherited,
      AttributeKind::InitByValue => {
        if self.index == 0 {
          EffectiveKind::Synthesized
        } else {
          EffectiveKind::Inherited
        }
      }
    }
  }

  /// Renders as the `name[index]` form used throughout the grammar's own
  /// textual syntax (spec §6), which the dumps reuse to disambiguate
  /// attributes that share a name across occurrences.
  pub fn attr_ref(&self) -> String {
    format!("{}[{}]", self.name, self.index)
  }
}

/// Owns every `Attribute` node in the grammar, addressed by stable handles
/// (spec §9: arena-allocated nodes, global ID counter replaced by a
/// per-`Grammar` allocator).
#[derive(Debug, Clone, Default)]
pub struct AttributeArena {
  nodes: Vec<Attribute>,
}

impl AttributeArena {
  pub fn alloc(&mut self, attribute: Attribute) -> AttributeHandle {
    let handle = AttributeHandle(self.nodes.len() as u32);
    self.nodes.push(attribute);
    handle
  }

  pub fn get(&self, handle: AttributeHandle) -> &Attribute {
    &self.nodes[handle.index()]
  }

  pub fn get_mut(&mut self, handle: AttributeHandle) -> &mut Attribute {
    &mut self.nodes[handle.index()]
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  pub fn handles(&self) -> impl Iterator<Item = AttributeHandle> {
    (0..self.nodes.len() as u32).map(AttributeHandle)
  }

  /// `this.add_dependency_on(other)`: inserts `other` into `this.depends_on`
  /// and `this` into `other.used_for`. Returns whether the edge was new.
  pub fn add_dependency(&mut self, this: AttributeHandle, other: AttributeHandle) -> bool {
    let inserted = self.nodes[this.index()].depends_on.insert(other);
    if inserted {
      self.nodes[other.index()].used_for.insert(this);
      if self.nodes[this.index()].index == self.nodes[other.index()].index {
        self.nodes[this.index()].same_index_pred_count += 1;
      }
    }
    inserted
  }

  /// `this.remove_from_depends_on(other)`: the inverse of `add_dependency`,
  /// idempotent. Used by the grouping and scheduling passes to consume
  /// edges as attributes become ready (spec §4.2 step 3, §4.3 step 2b).
  pub fn remove_dependency(&mut self, this: AttributeHandle, other: AttributeHandle) -> bool {
    let removed = self.nodes[this.index()].depends_on.remove(&other);
    if removed {
      self.nodes[other.index()].used_for.remove(&this);
      if self.nodes[this.index()].index == self.nodes[other.index()].index {
        self.nodes[this.index()].same_index_pred_count -= 1;
      }
    }
    removed
  }

  /// DFS over `used_for` from `start`, looking for the first attribute on
  /// each branch whose `index == target_index`. When `skip_self_first` is
  /// set, `start` itself is not allowed to terminate the very first step of
  /// the search even if it already matches `target_index` (spec §4.1).
  ///
  /// Visitation state is a transient, per-call set rather than a flag
  /// stored on the node (spec §9, §5): each recursive branch removes itself
  /// from the set on the way back out, so sibling branches can revisit a
  /// node a different branch already passed through.
  /// `scope` restricts which attributes the DFS is allowed to step into.
  /// Callers scope this to "attributes belonging to the production
  /// currently being projected" (spec §4.3): index values are only unique
  /// *within* one production, so without a scope a numeric `index` match on
  /// an attribute that drifted into an unrelated production via a mirrored
  /// same-index edge would be a false "return" rather than a real one.
  pub fn find_paths_to_index(&self, start: AttributeHandle, target_index: usize, skip_self_first: bool, scope: &BTreeSet<AttributeHandle>) -> Vec<AttributeHandle> {
    let mut results = Vec::new();
    let mut on_path = BTreeSet::new();
    self.dfs_first_return(start, target_index, true, skip_self_first, scope, &mut on_path, &mut results);
    results
  }

  #[allow(clippy::too_many_arguments)]
  fn dfs_first_return(
    &self,
    node: AttributeHandle,
    target_index: usize,
    is_first_step: bool,
    skip_self_first: bool,
    scope: &BTreeSet<AttributeHandle>,
    on_path: &mut BTreeSet<AttributeHandle>,
    results: &mut Vec<AttributeHandle>,
  ) {
    if !on_path.insert(node) {
      return;
    }

    let attr = self.get(node);
    let may_terminate_here = !(is_first_step && skip_self_first);
    if may_terminate_here && attr.index == target_index {
      results.push(node);
    } else {
      for successor in attr.used_for.clone() {
        if scope.contains(&successor) {
          self.dfs_first_return(successor, target_index, false, skip_self_first, scope, on_path, results);
        }
      }
    }

    on_path.remove(&node);
  }
}
