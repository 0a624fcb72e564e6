//! Myco: lexer, parser, and tree-walking evaluator, exposed as a library so
//! integration tests can drive the pipeline directly.

pub mod ast;
pub mod config;
pub mod env;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod library;
pub mod modules;
pub mod parser;
pub mod sandbox;
pub mod value;

use std::io::Write;
use std::path::PathBuf;

use crate::config::{FsConfig, NetConfig};
use crate::error::PipelineError;
use crate::evaluator::Interpreter;
use crate::sandbox::Sandbox;

/// Run Myco source text to completion against a fresh [`Interpreter`],
/// writing `print` output to `output`. A runtime error outside any `try` is
/// reported to stderr and execution resumes at the next top-level statement
/// rather than aborting the whole run.
///
/// Returns `Ok(true)` if the program ran to completion but raised at least
/// one uncaught runtime error along the way.
pub fn run_source(
    source: &str,
    base_dir: PathBuf,
    output: Box<dyn Write>,
) -> Result<bool, PipelineError> {
    let tokens = lexer::Lexer::new(source).tokenize();
    if let Some(err) = lexer::first_error(&tokens) {
        return Err(err.into());
    }
    let program = parser::parse(&tokens)?;

    let fs_config = FsConfig::for_source_dir(base_dir.clone());
    let sandbox = Sandbox::new(fs_config).ok();

    let mut interp = Interpreter::new(output).with_net_config(NetConfig::default());
    if let Some(sandbox) = sandbox {
        interp = interp.with_sandbox(sandbox);
    }
    interp.push_base_dir(base_dir);
    Ok(interp.run(&program))
}
