//! The `use "path" as alias` loader: resolve-by-alias, load-and-parse,
//! register functions and constants.
//!
//! A function defined in a loaded module is registered only under its
//! qualified name (`alias.fn`); the bare-name fallback is instead handled by
//! [`crate::evaluator::Interpreter`]'s call resolver, which tries a local
//! value, then the bare registry, then each loaded module in turn.

use std::fs;
use std::path::{Path, PathBuf};

use crate::ast::{Program, Stmt};
use crate::error::{function_call, MycoError};
use crate::evaluator::Interpreter;
use crate::lexer::Lexer;
use crate::library;
use crate::parser;

/// Strip a leading `./` and append `.myco` if the path has no extension.
fn normalize_path(path: &str) -> PathBuf {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    let mut normalized = PathBuf::from(stripped);
    if normalized.extension().is_none() {
        normalized.set_extension("myco");
    }
    normalized
}

/// Load the module named by `path` and register it under `alias`. Native
/// libraries (`math`, `text`, `io`, `test`, `http`, `json`) register as a
/// dispatch alias with no backing AST; everything else is resolved as a
/// `.myco` source file relative to the current base directory.
pub fn load_module(
    interp: &mut Interpreter,
    path: &str,
    alias: &str,
    line: usize,
) -> Result<(), MycoError> {
    if library::is_native_module(path) {
        interp.register_module(alias, Some(path.to_string()));
        return Ok(());
    }

    let full_path = interp.current_base_dir().join(normalize_path(path));
    let source = fs::read_to_string(&full_path)
        .map_err(|_| MycoError::new(function_call(), line))?;

    let tokens = Lexer::new(&source).tokenize();
    let program = parser::parse(&tokens).map_err(|_| MycoError::new(function_call(), line))?;

    interp.register_module(alias, None);

    let module_dir = full_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    interp.push_base_dir(module_dir);
    let result = register_module_contents(interp, &program, alias);
    interp.pop_base_dir();
    result
}

/// Register every top-level function under its qualified name, load any
/// nested `use` statements, then evaluate every top-level `let` constant.
/// Functions and nested modules are registered before constants are
/// evaluated, since a constant expression may call a sibling function.
fn register_module_contents(
    interp: &mut Interpreter,
    program: &Program,
    alias: &str,
) -> Result<(), MycoError> {
    for stmt in &program.statements {
        match stmt {
            Stmt::FuncDef {
                name, params, body, ..
            } => {
                interp.register_qualified_function(alias, name, params.clone(), body.clone());
            }
            Stmt::Use {
                path,
                alias: nested_alias,
                line,
            } => {
                load_module(interp, path, nested_alias, *line)?;
            }
            _ => {}
        }
    }

    for stmt in &program.statements {
        if let Stmt::Let { name, value, .. } = stmt {
            let v = interp.eval_top_level_expr(value)?;
            interp.define_constant(&format!("{alias}.{name}"), v);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn interpreter() -> Interpreter {
        Interpreter::new(Box::new(Vec::new()))
    }

    #[test]
    fn normalizes_bare_name_to_myco_extension() {
        assert_eq!(normalize_path("m"), PathBuf::from("m.myco"));
        assert_eq!(normalize_path("./m"), PathBuf::from("m.myco"));
        assert_eq!(normalize_path("sub/m.myco"), PathBuf::from("sub/m.myco"));
    }

    #[test]
    fn missing_module_file_is_a_function_call_error() {
        let mut interp = interpreter();
        let err = load_module(&mut interp, "does_not_exist", "m", 3).unwrap_err();
        assert_eq!(err.line, 3);
    }

    #[test]
    fn native_module_registers_without_reading_a_file() {
        let mut interp = interpreter();
        assert!(load_module(&mut interp, "math", "m", 1).is_ok());
    }

    #[test]
    fn loads_module_function_and_constant() {
        let tmp = std::env::temp_dir().join(format!("myco-modtest-{}", std::process::id()));
        std::fs::create_dir_all(&tmp).unwrap();
        let module_path = tmp.join("m.myco");
        let mut file = std::fs::File::create(&module_path).unwrap();
        writeln!(file, "func double(n): return n * 2; end").unwrap();
        writeln!(file, "let answer = double(21);").unwrap();
        drop(file);

        let mut interp = interpreter();
        interp.push_base_dir(tmp.clone());
        load_module(&mut interp, "m", "m", 1).expect("module should load");

        let tokens = Lexer::new("print(m.double(10)); print(m.answer);").tokenize();
        let program = parser::parse(&tokens).unwrap();
        interp.run(&program);

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
