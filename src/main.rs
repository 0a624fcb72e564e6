mod ast;
mod config;
mod env;
mod error;
mod evaluator;
mod lexer;
mod library;
mod modules;
mod parser;
mod sandbox;
mod value;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use config::VERSION;
use error::PipelineError;

/// Myco: a small dynamically-typed scripting language.
#[derive(Parser, Debug)]
#[command(name = "myco")]
#[command(version = VERSION)]
#[command(about = "Lexer, parser, and tree-walking evaluator for the Myco scripting language")]
struct CliArgs {
    /// Source file to run.
    source: PathBuf,

    /// Emit a C translation of the program instead of running it (out of
    /// scope for this interpreter: the C back-end is a separate tool).
    #[arg(long)]
    build: bool,

    /// Output path for `--build`.
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    if args.build {
        eprintln!("myco: --build (the C source emitter) is not part of this interpreter");
        return ExitCode::FAILURE;
    }
    let _ = &args.output;

    match run_file(&args.source) {
        Ok(had_error) => {
            if had_error {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            eprintln!("myco: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Read, lex, parse, and run a Myco source file. The initial base directory
/// for module resolution is the directory containing `path`.
fn run_file(path: &PathBuf) -> Result<bool, PipelineError> {
    let source = std::fs::read_to_string(path).map_err(|source| PipelineError::FileRead {
        path: path.display().to_string(),
        source,
    })?;

    let base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let tokens = lexer::Lexer::new(&source).tokenize();
    if let Some(err) = lexer::first_error(&tokens) {
        return Err(err.into());
    }
    let program = parser::parse(&tokens)?;

    let fs_config = config::FsConfig::for_source_dir(base_dir.clone());
    let sandbox = sandbox::Sandbox::new(fs_config).ok();

    let mut interp =
        evaluator::Interpreter::new(Box::new(std::io::stdout())).with_net_config(config::NetConfig::default());
    if let Some(sandbox) = sandbox {
        interp = interp.with_sandbox(sandbox);
    }
    interp.push_base_dir(base_dir);
    Ok(interp.run(&program))
}
