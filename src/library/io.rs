//! `io` native module: sandboxed file access, plus the interactive `prompt`
//! built-in described in the external-interfaces stdin contract. Every path
//! is resolved through the interpreter's [`crate::sandbox::Sandbox`], which
//! rejects absolute paths and `..` traversal.

use std::io::BufRead;

use super::LibraryContext;
use crate::error::{function_call, input_failed, invalid_input, type_mismatch, MycoError};
use crate::value::Value;

fn arg_str<'a>(args: &'a [Value], idx: usize, line: usize) -> Result<&'a str, MycoError> {
    match args.get(idx) {
        Some(Value::Str(s)) => Ok(s.as_str()),
        _ => Err(MycoError::new(type_mismatch(), line)),
    }
}

/// Maps a canonical command word to its small integer code, per the stdin
/// contract's `left`/`right`/`up`/`down`/`attack` vocabulary.
fn command_code(word: &str) -> Option<i64> {
    match word {
        "left" => Some(0),
        "right" => Some(1),
        "up" => Some(2),
        "down" => Some(3),
        "attack" => Some(4),
        _ => None,
    }
}

/// Read one line from stdin and resolve it to an integer: a bare number
/// parses directly, a canonical command word maps to its code, anything
/// else is `invalid-input`. A read failure (e.g. closed stdin) is
/// `input-failed`.
fn prompt(line: usize) -> Result<Value, MycoError> {
    let mut buf = String::new();
    let n = std::io::stdin()
        .lock()
        .read_line(&mut buf)
        .map_err(|_| MycoError::new(input_failed(), line))?;
    if n == 0 {
        return Err(MycoError::new(input_failed(), line));
    }
    let trimmed = buf.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Ok(Value::Int(i));
    }
    match command_code(trimmed) {
        Some(code) => Ok(Value::Int(code)),
        None => Err(MycoError::new(invalid_input(), line)),
    }
}

/// `io.read(path)`, `io.write(path, contents)`, `io.exists(path)`,
/// `io.prompt()`.
pub fn call(
    fn_name: &str,
    args: &[Value],
    ctx: &mut dyn LibraryContext,
    line: usize,
) -> Result<Value, MycoError> {
    if fn_name == "prompt" {
        return prompt(line);
    }

    let Some(sandbox) = ctx.sandbox() else {
        return Err(MycoError::new(input_failed(), line));
    };
    match fn_name {
        "read" => {
            let path = arg_str(args, 0, line)?;
            sandbox
                .read_file(path)
                .map(Value::Str)
                .map_err(|_| MycoError::new(input_failed(), line))
        }
        "write" => {
            let path = arg_str(args, 0, line)?.to_string();
            let contents = arg_str(args, 1, line)?.to_string();
            sandbox
                .write_file(&path, &contents)
                .map(|_| Value::None)
                .map_err(|_| MycoError::new(input_failed(), line))
        }
        "exists" => {
            let path = arg_str(args, 0, line)?;
            sandbox
                .file_exists(path)
                .map(Value::Bool)
                .map_err(|_| MycoError::new(input_failed(), line))
        }
        _ => Err(MycoError::new(function_call(), line)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_words_map_to_stable_codes() {
        assert_eq!(command_code("left"), Some(0));
        assert_eq!(command_code("attack"), Some(4));
        assert_eq!(command_code("sprint"), None);
    }
}
