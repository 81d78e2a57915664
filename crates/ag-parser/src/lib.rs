//! Line-oriented grammar-text reader (spec §6): turns
//! `<LHS> -> <sym>{<sym>} [ : <rule> {; <rule>} ]` lines into a `Grammar`.
//! A blank line terminates input; malformed lines abort with `AgError::Parse`
//! and are not recovered (spec §7).

mod scan;

use ag_core::types::handles::{AttributeHandle, ProductionHandle, VariableHandle};
use ag_core::{AgError, AgResult, AttributeKind, Grammar};

use scan::scan_attr_refs;

/// Parses grammar text, stopping at the first blank line (or end of input).
pub fn parse_grammar(source: &str) -> AgResult<Grammar> {
  let mut grammar = Grammar::new();

  for (offset, raw_line) in source.lines().enumerate() {
    let line_no = offset + 1;
    if raw_line.trim().is_empty() {
      break;
    }
    parse_line(&mut grammar, line_no, raw_line)?;
  }

  Ok(grammar)
}

fn parse_line(grammar: &mut Grammar, line_no: usize, raw_line: &str) -> AgResult<()> {
  let (head, rules_section) = match raw_line.split_once(':') {
    Some((head, rules)) => (head, Some(rules)),
    None => (raw_line, None),
  };

  let (lhs_part, rhs_part) = head.split_once("->").ok_or_else(|| AgError::Parse { line: line_no, message: "expected '->' separating LHS from RHS symbols".to_string() })?;

  let lhs_name = single_symbol(lhs_part).ok_or_else(|| AgError::Parse { line: line_no, message: "LHS must be exactly one visible symbol".to_string() })?;
  let rhs_symbols: Vec<char> = rhs_part.chars().filter(|c| !c.is_whitespace()).collect();
  if rhs_symbols.is_empty() {
    return Err(AgError::Parse { line: line_no, message: "production has no RHS symbols".to_string() });
  }

  let production = grammar.alloc_production(&lhs_name.to_string());
  grammar.alloc_variable(&lhs_name.to_string(), 0, production);
  for (offset, sym) in rhs_symbols.into_iter().enumerate() {
    grammar.alloc_variable(&sym.to_string(), offset + 1, production);
  }

  if let Some(rules) = rules_section {
    for rule_text in rules.split(';') {
      let rule_text = rule_text.trim();
      if rule_text.is_empty() {
        continue;
      }
      parse_rule(grammar, line_no, production, rule_text)?;
    }
  }

  Ok(())
}

fn single_symbol(part: &str) -> Option<char> {
  let trimmed = part.trim();
  let mut chars = trimmed.chars();
  let only = chars.next()?;
  if chars.next().is_some() {
    return None;
  }
  Some(only)
}

fn parse_rule(grammar: &mut Grammar, line_no: usize, production: ProductionHandle, rule_text: &str) -> AgResult<()> {
  let (left_text, right_text) = rule_text.split_once('=').ok_or_else(|| AgError::Parse { line: line_no, message: format!("rule '{rule_text}' is missing '='") })?;

  let left_trimmed = left_text.trim();
  let left_matches = scan_attr_refs(left_trimmed);
  let left = match left_matches.as_slice() {
    [single] if single.start == 0 && single.end == left_trimmed.chars().count() => single,
    _ => {
      return Err(AgError::Parse { line: line_no, message: format!("left-hand side '{left_trimmed}' is not a single attribute reference") });
    }
  };

  let right_refs = scan_attr_refs(right_text);
  let left_variable = occurrence_at(grammar, production, left.index, line_no)?;

  let left_kind = if right_refs.is_empty() {
    AttributeKind::InitByValue
  } else if left.index == 0 {
    AttributeKind::Synthesized
  } else {
    AttributeKind::Inherited
  };
  let left_handle = grammar.define_attribute(left_variable, &left.name, left_kind);
  grammar.mark_needed(left_handle);

  for right in &right_refs {
    let right_variable = occurrence_at(grammar, production, right.index, line_no)?;
    let default_kind = if right.index == 0 { AttributeKind::Synthesized } else { AttributeKind::Inherited };
    let right_handle: AttributeHandle = grammar.ensure_attribute(right_variable, &right.name, default_kind);
    grammar.mark_needed(right_handle);
    grammar.add_rule_dependency(left_handle, right_handle);
  }

  Ok(())
}

fn occurrence_at(grammar: &Grammar, production: ProductionHandle, index: usize, line_no: usize) -> AgResult<VariableHandle> {
  grammar.production(production).variables.get(index).copied().ok_or(AgError::UndefinedOccurrence { line: line_no, index })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_a_single_production_with_one_rule() {
    let grammar = parse_grammar("A->BC : y[0]=z[2]\n").unwrap();
    assert_eq!(grammar.all_production_handles().len(), 1);
    let production = grammar.all_production_handles()[0];
    assert_eq!(grammar.production(production).variables.len(), 3);
  }

  #[test]
  fn stops_at_blank_line() {
    let grammar = parse_grammar("A->BC\n\nB->a\n").unwrap();
    assert_eq!(grammar.all_production_handles().len(), 1);
  }

  #[test]
  fn infers_init_by_value_when_right_side_has_no_attribute_refs() {
    let grammar = parse_grammar("A->B : x[0]=0\n").unwrap();
    let production = grammar.all_production_handles()[0];
    let lhs = grammar.production(production).lhs();
    let handle = *grammar.variable(lhs).attributes.get(&"x".to_string()).unwrap();
    assert_eq!(grammar.attr(handle).kind, AttributeKind::InitByValue);
  }

  #[test]
  fn rejects_a_missing_arrow() {
    let err = parse_grammar("A BC\n").unwrap_err();
    assert!(matches!(err, AgError::Parse { .. }));
  }

  #[test]
  fn rejects_an_out_of_range_occurrence_index() {
    let err = parse_grammar("A->B : x[5]=y[0]\n").unwrap_err();
    assert!(matches!(err, AgError::UndefinedOccurrence { index: 5, .. }));
  }

  #[test]
  fn a_later_defining_rule_corrects_an_earlier_guess() {
    // B.y is first seen as a right-hand reference (y[1]) in A->BC, guessed
    // Inherited from its index; B->C later defines it as y[0]=z[1], which
    // must win and make it Synthesized everywhere B occurs.
    let grammar = parse_grammar("A->BC : x[2]=y[1]\nB->C : y[0]=z[1]\n").unwrap();

    let productions = grammar.all_production_handles();
    let a_bc = productions[0];
    let b_occurrence_in_a_bc = grammar.production(a_bc).variables[1];
    let handle_in_a_bc = *grammar.variable(b_occurrence_in_a_bc).attributes.get(&"y".to_string()).unwrap();
    assert_eq!(grammar.attr(handle_in_a_bc).kind, AttributeKind::Synthesized);

    let b_c = productions[1];
    let b_lhs = grammar.production(b_c).lhs();
    let handle_at_lhs = *grammar.variable(b_lhs).attributes.get(&"y".to_string()).unwrap();
    assert_eq!(grammar.attr(handle_at_lhs).kind, AttributeKind::Synthesized);
  }
}
