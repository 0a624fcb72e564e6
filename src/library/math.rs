//! `math` native module: elementary numeric functions beyond the operators
//! the evaluator already handles inline.

use crate::error::{function_call, type_mismatch, MycoError};
use crate::value::Value;

fn arg_f64(args: &[Value], idx: usize, line: usize) -> Result<f64, MycoError> {
    args.get(idx)
        .and_then(Value::as_f64)
        .ok_or_else(|| MycoError::new(type_mismatch(), line))
}

/// `math.sqrt(x)`, `math.abs(x)`, `math.pow(base, exp)`, `math.floor(x)`,
/// `math.ceil(x)`, `math.max(a, b)`, `math.min(a, b)`.
pub fn call(fn_name: &str, args: &[Value], line: usize) -> Result<Value, MycoError> {
    match fn_name {
        "sqrt" => Ok(Value::Float(arg_f64(args, 0, line)?.sqrt())),
        "abs" => match args.first() {
            Some(Value::Int(i)) => Ok(Value::Int(i.abs())),
            Some(Value::Float(f)) => Ok(Value::Float(f.abs())),
            _ => Err(MycoError::new(type_mismatch(), line)),
        },
        "pow" => Ok(Value::Float(
            arg_f64(args, 0, line)?.powf(arg_f64(args, 1, line)?),
        )),
        "floor" => Ok(Value::Int(arg_f64(args, 0, line)?.floor() as i64)),
        "ceil" => Ok(Value::Int(arg_f64(args, 0, line)?.ceil() as i64)),
        "max" => Ok(Value::Float(arg_f64(args, 0, line)?.max(arg_f64(args, 1, line)?))),
        "min" => Ok(Value::Float(arg_f64(args, 0, line)?.min(arg_f64(args, 1, line)?))),
        _ => Err(MycoError::new(function_call(), line)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqrt_of_perfect_square() {
        let result = call("sqrt", &[Value::Int(9)], 1).unwrap();
        assert!(matches!(result, Value::Float(f) if (f - 3.0).abs() < 1e-9));
    }

    #[test]
    fn abs_preserves_int_kind() {
        assert!(matches!(call("abs", &[Value::Int(-4)], 1), Ok(Value::Int(4))));
    }

    #[test]
    fn unknown_function_errors() {
        assert!(call("bogus", &[], 1).is_err());
    }
}
