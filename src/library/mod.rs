//! External dispatch surface for native (non-scripted) library namespaces:
//! `math`, `text`, `io`, `test`, `http`, `json`.
//!
//! Per the external-interfaces contract, a call `lib.fn(args…)` where `lib`
//! is a registered native-module alias dispatches to a single entry point
//! that receives the function name and the *raw argument AST* — each
//! library decides how (and whether) to evaluate its own arguments, via the
//! [`LibraryContext`] callback, rather than the core evaluator reducing them
//! up front.

mod http;
mod io;
mod json;
mod math;
mod text;

use crate::ast::Expr;
use crate::config::NetConfig;
use crate::error::{function_call, MycoError};
use crate::sandbox::Sandbox;
use crate::value::Value;

pub const NATIVE_MODULES: &[&str] = &["math", "text", "io", "test", "http", "json"];

pub fn is_native_module(name: &str) -> bool {
    NATIVE_MODULES.contains(&name)
}

/// Callback surface a library uses to reduce its own argument AST, and to
/// reach the ambient sandbox/network configuration.
pub trait LibraryContext {
    fn eval_arg(&mut self, expr: &Expr) -> Result<Value, MycoError>;
    fn sandbox(&self) -> Option<&Sandbox>;
    fn net_config(&self) -> &NetConfig;
}

/// Evaluate every argument eagerly; the common case for libraries with no
/// need for lazy or unevaluated access to their call site.
fn eval_all(args: &[Expr], ctx: &mut dyn LibraryContext) -> Result<Vec<Value>, MycoError> {
    args.iter().map(|e| ctx.eval_arg(e)).collect()
}

pub fn dispatch(
    lib: &str,
    fn_name: &str,
    args: &[Expr],
    ctx: &mut dyn LibraryContext,
    line: usize,
) -> Result<Value, MycoError> {
    match lib {
        "math" => math::call(fn_name, &eval_all(args, ctx)?, line),
        "text" => text::call(fn_name, &eval_all(args, ctx)?, line),
        "io" => io::call(fn_name, &eval_all(args, ctx)?, ctx, line),
        "test" => test::call(fn_name, &eval_all(args, ctx)?, line),
        "http" => http::call(fn_name, &eval_all(args, ctx)?, ctx, line),
        "json" => json::call(fn_name, &eval_all(args, ctx)?, line),
        _ => Err(MycoError::new(function_call(), line)),
    }
}
