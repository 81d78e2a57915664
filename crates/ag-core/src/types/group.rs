use super::attribute::EffectiveKind;
use super::handles::{AttributeHandle, VariableHandle};

/// A maximal, kind-pure batch of one occurrence's attributes that become
/// ready together during grouping (spec §3 "Group", §4.2).
#[derive(Debug, Clone)]
pub struct Group {
  pub owner: VariableHandle,
  /// Running count of attributes emitted at `owner` up to and including
  /// this group. Used to match corresponding groups across occurrences of
  /// the same nonterminal during cloning and splitting (spec §4.2, §4.3).
  pub end_position: usize,
  pub kind: EffectiveKind,
  pub members: Vec<AttributeHandle>,
}

impl Group {
  pub fn len(&self) -> usize {
    self.members.len()
  }

  pub fn is_empty(&self) -> bool {
    self.members.is_empty()
  }
}
