//! Command-line entry point (spec §6 "CLI surface"): zero positional
//! arguments reads a grammar from stdin until a blank line; a positional
//! argument names one of the canned demo scenarios (`s1`..`s6`); an
//! unrecognized name falls back to stdin for that invocation.

use std::io::{self, Read};
use std::process::ExitCode;

use ag_core::{AgError, AnalysisConfig, Grammar};
use clap::Parser;

mod demos;

#[derive(Parser, Debug)]
#[command(name = "ag", about = "Attribute grammar local evaluation order analyzer")]
struct Cli {
  /// Name of a canned demo (s1..s6). Omit to read a grammar from stdin.
  demo: Option<String>,
}

fn main() -> ExitCode {
  env_logger::init();
  let cli = Cli::parse();

  let source = match cli.demo.as_deref().and_then(demos::lookup) {
    Some(text) => text.to_string(),
    None => match read_stdin_until_blank_line() {
      Ok(text) => text,
      Err(err) => {
        eprintln!("{err}");
        return ExitCode::from(1);
      }
    },
  };

  match run(&source) {
    Ok(report) => {
      print!("{report}");
      ExitCode::SUCCESS
    }
    Err(err) => {
      eprintln!("{err}");
      match err {
        AgError::Parse { .. } | AgError::UndefinedOccurrence { .. } => ExitCode::from(2),
        _ => ExitCode::from(1),
      }
    }
  }
}

fn read_stdin_until_blank_line() -> Result<String, AgError> {
  let mut whole = String::new();
  io::stdin().read_to_string(&mut whole)?;
  Ok(whole)
}

fn run(source: &str) -> Result<String, AgError> {
  let mut grammar: Grammar = ag_parser::parse_grammar(source)?;
  let config = AnalysisConfig::default();
  ag_core::analyze(&mut grammar, &config)?;

  let mut report = String::new();
  report.push_str(&ag_render::dependency_dump(&grammar));
  report.push('\n');
  report.push_str(&ag_render::execution_order_dump(&grammar));
  report.push('\n');
  report.push_str(&ag_render::groups_dump(&grammar));
  Ok(report)
}
