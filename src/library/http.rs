//! `http` native module. A thin dispatch stub wired through `ureq`, so
//! enabling it is a config flip rather than a new dependency. Disabled by
//! default — the interpreter makes no outbound network calls on its own.

use super::LibraryContext;
use crate::error::{function_call, input_failed, type_mismatch, MycoError};
use crate::value::Value;

/// `http.get(url)`.
pub fn call(
    fn_name: &str,
    args: &[Value],
    ctx: &mut dyn LibraryContext,
    line: usize,
) -> Result<Value, MycoError> {
    if !ctx.net_config().enabled {
        return Err(MycoError::new(input_failed(), line));
    }
    match fn_name {
        "get" => {
            let url = match args.first() {
                Some(Value::Str(s)) => s.clone(),
                _ => return Err(MycoError::new(type_mismatch(), line)),
            };
            let addr_allowed = ctx.net_config().allowed_addresses.is_empty()
                || ctx
                    .net_config()
                    .allowed_addresses
                    .iter()
                    .any(|a| url.contains(a));
            if !addr_allowed {
                return Err(MycoError::new(input_failed(), line));
            }
            let response = ureq::get(&url)
                .call()
                .map_err(|_| MycoError::new(input_failed(), line))?;
            response
                .into_string()
                .map(Value::Str)
                .map_err(|_| MycoError::new(input_failed(), line))
        }
        _ => Err(MycoError::new(function_call(), line)),
    }
}
