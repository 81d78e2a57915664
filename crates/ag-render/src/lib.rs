//! Textual dumps and a Graphviz diagram export over an analyzed `Grammar`
//! (spec §6 "Outputs (textual)"). Exact formatting is a contract: tests
//! compare these strings against golden output.

use ag_core::{Grammar, Group, ProductionHandle};

/// `<name>: <a> -> <b>\t<a> -> <c> ...`, one line per Variable, one field
/// per `used_for` edge owned by that Variable's own attributes.
pub fn dependency_dump(grammar: &Grammar) -> String {
  let mut out = String::new();
  for production in grammar.all_production_handles() {
    for &v in &grammar.production(production).variables {
      let var = grammar.variable(v);
      let mut edges = Vec::new();
      for &a in var.attributes.values() {
        let attr = grammar.attr(a);
        for &b in &attr.used_for {
          edges.push(format!("{} -> {}", attr.attr_ref(), grammar.attr(b).attr_ref()));
        }
      }
      out.push_str(&var.name);
      out.push_str(": ");
      out.push_str(&edges.join("\t"));
      out.push('\n');
    }
  }
  out
}

/// `Production <LHS><idx>: <LHS> -> <RHS...>\t\t[<G1>, <G2>, ...] cycle-free: <bool>`.
pub fn execution_order_dump(grammar: &Grammar) -> String {
  let mut out = String::new();
  for production in grammar.all_production_handles() {
    let p = grammar.production(production);
    let rhs_names: String = p.rhs().iter().map(|&v| grammar.variable(v).name.clone()).collect();
    let groups: Vec<String> = p.execution_order.iter().map(|g| render_group(grammar, g)).collect();
    out.push_str(&format!("Production {}{}: {} -> {}\t\t[{}] cycle-free: {}\n", p.lhs_name, p.lhs_ordinal, p.lhs_name, rhs_names, groups.join(", "), p.acyclic));
  }
  out
}

/// `<name>: [<G1>, <G2>, ...]` from the representative occurrence of every
/// nonterminal known to the grammar.
pub fn groups_dump(grammar: &Grammar) -> String {
  let mut out = String::new();
  for nonterm in grammar.occurrences_by_name.keys() {
    let Some(representative) = grammar.representative_occurrence(nonterm) else { continue };
    let groups: Vec<String> = grammar.variable(representative).groups.iter().map(|g| render_group(grammar, g)).collect();
    out.push_str(&format!("{}: [{}]\n", nonterm, groups.join(", ")));
  }
  out
}

fn render_group(grammar: &Grammar, group: &Group) -> String {
  let members: Vec<String> = group
    .members
    .iter()
    .map(|&a| {
      let attr = grammar.attr(a);
      let owner = grammar.variable(attr.owner);
      format!("{}{}.{}", owner.name, owner.position, attr.name)
    })
    .collect();
  format!("{{{}}}", members.join(", "))
}

/// Graphviz DOT export of one production's dependency graph. Not part of
/// spec §6's textual contract — an out-of-scope "diagram output" adapter
/// spec §1 mentions without specifying a format.
pub fn dot_diagram(grammar: &Grammar, production: ProductionHandle) -> String {
  let p = grammar.production(production);
  let mut out = format!("digraph {}{} {{\n", p.lhs_name, p.lhs_ordinal);
  for &v in &p.variables {
    for &a in grammar.variable(v).attributes.values() {
      let attr = grammar.attr(a);
      for &b in &attr.used_for {
        out.push_str(&format!("  \"{}\" -> \"{}\";\n", attr.attr_ref(), grammar.attr(b).attr_ref()));
      }
    }
  }
  out.push_str("}\n");
  out
}
