//! Rinha — an interpreter for a small functional scripting language with
//! first-class functions, closures, integers, booleans, strings, tuples,
//! and a recursion-friendly memoization cache.
//!
//! ## Architecture
//!
//! - **lexer**: tokenizes source text, tracking line/column for diagnostics.
//! - **symbol**: interns identifier spellings into dense `SymbolId`s.
//! - **ast**: the parsed tree and the runtime `Value` model.
//! - **parser**: recursive-descent, precedence-climbing parser producing an AST.
//! - **frame**: activation frames and the call-frame stack.
//! - **function**: function records and the per-function memoization cache.
//! - **interpreter**: the tree-walking evaluator; the crate's `run` entry point.
//! - **error**: the single `RinhaError` type shared by every fallible stage.
//! - **config**: compile-time resource budgets.
//! - **cli**: command-line argument parsing for this binary.

mod ast;
mod cli;
mod config;
mod error;
mod frame;
mod function;
mod interpreter;
mod lexer;
mod parser;
mod symbol;

use cli::Cli;
use error::RinhaError;
use log::{error, info};
use std::fs;
use std::io;
use std::process;

fn main() {
    let args = Cli::init();
    simple_logger::init_with_level((&args.verbosity).into()).unwrap();

    match run(&args) {
        Ok(true) => process::exit(0),
        Ok(false) => process::exit(1),
        Err(err) => {
            error!("{}", err);
            process::exit(1);
        }
    }
}

/// Reads the named source file and runs it, returning whether the run
/// succeeded. An `Err` here means the file itself could not be read; a
/// interpreter-fatal failure is instead reported as `Ok(false)`, since the
/// diagnostic has already been printed by the time we know about it.
fn run(args: &Cli) -> Result<bool, RinhaError> {
    let name = args.file.to_string_lossy().into_owned();
    let source = fs::read_to_string(&args.file)?;
    info!("loaded {}", name);

    let mut stdout = io::stdout();
    let outcome = interpreter::run(&name, &source, &mut stdout);

    if outcome.ok {
        info!("run finished: {}", outcome.value.render());
        Ok(true)
    } else {
        eprintln!("{}", outcome.diagnostic.unwrap_or_default());
        Ok(false)
    }
}
