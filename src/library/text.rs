//! `text` native module: string helpers beyond the dot-method surface the
//! evaluator dispatches directly (`length`/`upper`/`lower`/`trim`/`split`/
//! `join`, see evaluator.rs).

use crate::error::{function_call, type_mismatch, MycoError};
use crate::value::{ArrayKind, Value};

fn arg_str<'a>(args: &'a [Value], idx: usize, line: usize) -> Result<&'a str, MycoError> {
    match args.get(idx) {
        Some(Value::Str(s)) => Ok(s.as_str()),
        _ => Err(MycoError::new(type_mismatch(), line)),
    }
}

/// `text.concat(a, b)`, `text.contains(haystack, needle)`,
/// `text.repeat(s, n)`, `text.reverse(s)`.
pub fn call(fn_name: &str, args: &[Value], line: usize) -> Result<Value, MycoError> {
    match fn_name {
        "concat" => {
            let mut out = String::new();
            for a in args {
                out.push_str(&a.to_display_string());
            }
            Ok(Value::Str(out))
        }
        "contains" => {
            let haystack = arg_str(args, 0, line)?;
            let needle = arg_str(args, 1, line)?;
            Ok(Value::Bool(haystack.contains(needle)))
        }
        "repeat" => {
            let s = arg_str(args, 0, line)?;
            let n = match args.get(1) {
                Some(Value::Int(i)) if *i >= 0 => *i as usize,
                _ => return Err(MycoError::new(type_mismatch(), line)),
            };
            Ok(Value::Str(s.repeat(n)))
        }
        "reverse" => {
            let s = arg_str(args, 0, line)?;
            Ok(Value::Str(s.chars().rev().collect()))
        }
        "split" => {
            let s = arg_str(args, 0, line)?;
            let sep = arg_str(args, 1, line)?;
            let parts = s
                .split(sep)
                .map(|p| Value::Str(p.to_string()))
                .collect::<Vec<_>>();
            Ok(Value::Array(ArrayKind::String, parts))
        }
        _ => Err(MycoError::new(function_call(), line)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_joins_display_forms() {
        let result = call("concat", &[Value::Str("a".into()), Value::Int(1)], 1).unwrap();
        assert_eq!(result.to_string(), "a1");
    }

    #[test]
    fn contains_checks_substring() {
        let args = [Value::Str("hello world".into()), Value::Str("wor".into())];
        assert!(matches!(call("contains", &args, 1), Ok(Value::Bool(true))));
    }

    #[test]
    fn split_builds_string_array() {
        let args = [Value::Str("a,b,c".into()), Value::Str(",".into())];
        let result = call("split", &args, 1).unwrap();
        assert!(matches!(result, Value::Array(ArrayKind::String, ref v) if v.len() == 3));
    }
}
