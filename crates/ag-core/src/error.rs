use std::fmt::{self, Display};

/// Stores every error type that can be produced while building or analyzing
/// an attribute grammar.
#[derive(Debug, Clone)]
pub enum AgError {
  /// A grammar-text line could not be parsed into a production or rule.
  Parse { line: usize, message: String },

  /// An attribute reference named a nonterminal occurrence that does not
  /// exist within the production being parsed.
  UndefinedOccurrence { line: usize, index: usize },

  /// The transitive-closure fixpoint loop did not converge within
  /// `AnalysisConfig::max_closure_iterations`.
  ClosureDidNotConverge { iterations: u32 },

  /// Wraps a lower-level I/O failure (reading stdin, a grammar file, ...).
  Io(String),
}

impl Display for AgError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AgError::Parse { line, message } => write!(f, "parse error at line {line}: {message}"),
      AgError::UndefinedOccurrence { line, index } => {
        write!(f, "line {line}: no occurrence at index {index} in this production")
      }
      AgError::ClosureDidNotConverge { iterations } => {
        write!(f, "transitive closure did not converge after {iterations} iterations")
      }
      AgError::Io(message) => write!(f, "I/O error: {message}"),
    }
  }
}

impl std::error::Error for AgError {}

impl From<std::io::Error> for AgError {
  fn from(err: std::io::Error) -> Self {
    AgError::Io(err.to_string())
  }
}

pub type AgResult<T> = Result<T, AgError>;
