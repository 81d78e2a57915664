//! The three analysis passes orchestrated by `Grammar` (spec §4.4):
//! transitive-closure expansion, per-nonterminal attribute grouping, and
//! per-production synchronized schedule construction (with splitting).

use std::collections::BTreeSet;

use crate::config::AnalysisConfig;
use crate::error::{AgError, AgResult};
use crate::types::group::Group;
use crate::types::handles::{AttributeHandle, ProductionHandle, VariableHandle};
use crate::types::variable::{self, GroupingOutcome};
use crate::types::Grammar;

impl Grammar {
  // == Pass 1: transitive closure (spec §4.3 "Transitive closure") =========

  pub fn compute_transitive_closure(&mut self, config: &AnalysisConfig) -> AgResult<()> {
    let mut iterations = 0u32;
    loop {
      iterations += 1;
      if iterations > config.max_closure_iterations {
        return Err(AgError::ClosureDidNotConverge { iterations });
      }

      let mut changed = false;
      for production in self.all_production_handles() {
        changed |= self.find_projections(production);
      }

      log::debug!("transitive closure iteration {iterations}: changed = {changed}");
      if !changed {
        log::info!("transitive closure stabilized after {iterations} iteration(s)");
        return Ok(());
      }
    }
  }

  fn find_projections(&mut self, production: ProductionHandle) -> bool {
    let variables = self.production(production).variables.clone();
    let mut changed = false;

    for v in variables {
      let scope: BTreeSet<AttributeHandle> = self.production(production).variables.iter().flat_map(|&pv| self.variable(pv).attributes.values().copied()).collect();

      let attr_handles: Vec<AttributeHandle> = self.variable(v).attributes.values().copied().collect();
      for a in attr_handles {
        let target_index = self.attr(a).index;
        let targets = self.attrs().find_paths_to_index(a, target_index, true, &scope);
        for b in targets {
          if self.attrs_mut().add_dependency(a, b) {
            changed = true;
            self.mirror_intra_occurrence_dependency(v, a, b);
          }
        }
      }
    }

    changed
  }

  // == Pass 2: attribute grouping (spec §4.2) ==============================

  pub fn compute_attribute_groups(&mut self) {
    let nonterms: Vec<String> = self.occurrences_by_name.keys().cloned().collect();

    for nonterm in nonterms {
      let occurrences = self.occurrences_by_name.get(&nonterm).cloned().unwrap_or_default();
      let Some(&representative) = occurrences.first() else { continue };

      let names = self.variable(representative).attribute_names_in_order();
      let rep_attrs = self.variable(representative).attributes.clone();
      let lookup = |n: &str| *rep_attrs.get(&n.to_string()).expect("attribute mirrored onto representative occurrence");

      match variable::create_groups(representative, &names, self.attrs_mut(), lookup) {
        GroupingOutcome::Cyclic => {
          log::warn!("nonterminal {nonterm} is cyclic at grouping");
          for &occurrence in &occurrences {
            self.variable_mut(occurrence).cyclic = true;
            let production = self.variable(occurrence).owning_production;
            self.production_mut(production).acyclic = false;
          }
        }
        GroupingOutcome::Groups(groups) => {
          self.variable_mut(representative).groups = groups.clone().into();

          for &occurrence in &occurrences {
            if occurrence == representative {
              continue;
            }
            let occ_attrs = self.variable(occurrence).attributes.clone();
            let occ_lookup = |n: &str| *occ_attrs.get(&n.to_string()).expect("mirror invariant: attribute must exist at every occurrence");
            let rep_attrs_for_names = self.variable(representative).attributes.clone();
            let source_names = move |h: AttributeHandle| {
              rep_attrs_for_names.iter().find(|&(_, &v)| v == h).map(|(n, _)| n.clone()).expect("handle belongs to representative occurrence")
            };
            let cloned = variable::clone_groups_onto(&groups, occurrence, occ_lookup, self.attrs_mut(), source_names);
            self.variable_mut(occurrence).groups = cloned.into();
          }
        }
      }
    }
  }

  // == Pass 3: synchronized schedule + splitting (spec §4.3) ===============

  pub fn determine_compatible_local_execution_orders(&mut self) {
    for production in self.all_production_handles() {
      self.determine_compatible_local_execution_order(production);
    }
  }

  fn determine_compatible_local_execution_order(&mut self, production: ProductionHandle) {
    let variables = self.production(production).variables.clone();

    if variables.iter().any(|&v| self.variable(v).cyclic) {
      self.production_mut(production).acyclic = false;
      return;
    }

    let mut last_scheduled = variables.len().saturating_sub(1);
    let mut order = Vec::new();

    loop {
      let remaining: usize = variables.iter().map(|&v| self.variable(v).groups.len()).sum();
      if remaining == 0 {
        break;
      }

      match self.find_schedulable_head(&variables, last_scheduled) {
        Some(idx) => {
          let v = variables[idx];
          let group = self.variable_mut(v).groups.pop_front().expect("schedulable head must exist");
          for &a in &group.members {
            let successors: Vec<AttributeHandle> = self.attr(a).used_for.iter().copied().filter(|&c| self.attr(c).index != self.attr(a).index).collect();
            for c in successors {
              self.attrs_mut().remove_dependency(c, a);
            }
          }
          order.push(group);
          last_scheduled = idx;
        }
        None => {
          if !self.split_to_break_cycle(&variables, last_scheduled) {
            log::warn!("production with LHS {} has an unresolvable inter-group cycle", self.production(production).lhs_name);
            self.production_mut(production).acyclic = false;
            self.production_mut(production).execution_order.clear();
            return;
          }
        }
      }
    }

    self.production_mut(production).execution_order = order;
    self.remove_not_needed_attributes(production);
  }

  /// Scans variables round-robin starting one past `last_scheduled`,
  /// looking for the first whose head group has every member's
  /// `depends_on` empty (spec §4.3 step 2a).
  fn find_schedulable_head(&self, variables: &[VariableHandle], last_scheduled: usize) -> Option<usize> {
    let n = variables.len();
    for offset in 1..=n {
      let idx = (last_scheduled + offset) % n;
      let v = variables[idx];
      let Some(group) = self.variable(v).groups.front() else { continue };
      if group.members.iter().all(|&a| self.attr(a).depends_on.is_empty()) {
        return Some(idx);
      }
    }
    None
  }

  /// Attempts to break a stand-off by peeling the ready prefix out of one
  /// variable's head group (spec §4.3 "Splitting"). Returns whether a split
  /// was made (in which case the caller should retry scheduling).
  fn split_to_break_cycle(&mut self, variables: &[VariableHandle], last_scheduled: usize) -> bool {
    let n = variables.len();
    for offset in 1..=n {
      let idx = (last_scheduled + offset) % n;
      let v = variables[idx];
      let Some(head) = self.variable(v).groups.front().cloned() else { continue };

      let ready: Vec<AttributeHandle> = head.members.iter().copied().filter(|&a| self.attr(a).depends_on.is_empty()).collect();
      if ready.is_empty() {
        continue;
      }
      let residual: Vec<AttributeHandle> = head.members.iter().copied().filter(|a| !ready.contains(a)).collect();

      self.apply_split(v, &head, &ready, &residual);
      self.propagate_split(v, &head, &ready, &residual);
      return true;
    }
    false
  }

  fn apply_split(&mut self, owner: VariableHandle, original: &Group, ready: &[AttributeHandle], residual: &[AttributeHandle]) {
    let new_group_index = original.end_position - residual.len();
    let queue = &mut self.variable_mut(owner).groups;
    queue[0] = Group { owner, end_position: original.end_position, kind: original.kind, members: residual.to_vec() };
    queue.push_front(Group { owner, end_position: new_group_index, kind: original.kind, members: ready.to_vec() });
  }

  fn propagate_split(&mut self, owner: VariableHandle, original: &Group, ready: &[AttributeHandle], residual: &[AttributeHandle]) {
    let nonterm = self.variable(owner).name.clone();
    let ready_names: BTreeSet<String> = ready.iter().map(|&h| self.attr(h).name.clone()).collect();
    let target_count = ready.len() + residual.len();
    let new_group_index = original.end_position - residual.len();

    let others: Vec<VariableHandle> = self.occurrences_by_name.get(&nonterm).map(|o| o.iter().copied().filter(|&o| o != owner).collect()).unwrap_or_default();

    for vj in others {
      if let Some(pos) = self.variable(vj).groups.iter().position(|g| g.end_position == original.end_position && g.len() == target_count) {
        self.split_queued_group(vj, pos, &ready_names, new_group_index);
        continue;
      }

      let owning_production = self.variable(vj).owning_production;
      if let Some(pos) = self
        .production(owning_production)
        .execution_order
        .iter()
        .position(|g| g.owner == vj && g.end_position == original.end_position && g.len() == target_count)
      {
        self.split_emitted_group(owning_production, pos, vj, &ready_names, new_group_index);
      }
    }
  }

  fn split_queued_group(&mut self, vj: VariableHandle, pos: usize, ready_names: &BTreeSet<String>, new_group_index: usize) {
    let group = self.variable(vj).groups[pos].clone();
    let (ready_j, residual_j): (Vec<_>, Vec<_>) = group.members.iter().copied().partition(|&a| ready_names.contains(&self.attr(a).name));
    let queue = &mut self.variable_mut(vj).groups;
    queue[pos] = Group { owner: vj, end_position: group.end_position, kind: group.kind, members: residual_j };
    queue.insert(pos, Group { owner: vj, end_position: new_group_index, kind: group.kind, members: ready_j });
  }

  fn split_emitted_group(&mut self, production: ProductionHandle, pos: usize, vj: VariableHandle, ready_names: &BTreeSet<String>, new_group_index: usize) {
    let group = self.production(production).execution_order[pos].clone();
    let (ready_j, residual_j): (Vec<_>, Vec<_>) = group.members.iter().copied().partition(|&a| ready_names.contains(&self.attr(a).name));
    let order = &mut self.production_mut(production).execution_order;
    order[pos] = Group { owner: vj, end_position: group.end_position, kind: group.kind, members: residual_j };
    order.insert(pos, Group { owner: vj, end_position: new_group_index, kind: group.kind, members: ready_j });
  }

  /// Spec §4.3 step 3: drop non-needed attributes from the emitted
  /// execution order, then drop groups that end up empty.
  fn remove_not_needed_attributes(&mut self, production: ProductionHandle) {
    let attrs = &self.attrs;
    let order = &mut self.productions[production.index()].execution_order;
    for group in order.iter_mut() {
      group.members.retain(|&a| attrs.get(a).needed);
    }
    order.retain(|group| !group.is_empty());
  }
}
