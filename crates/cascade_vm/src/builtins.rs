use crate::runtime_error::{runtime_error_at, RuntimeError};
use crate::value::Value;
use crate::vm::Vm;
use cascade_core::Span;

impl Vm {
    /// Builtin dispatch by call name. Returns `None` for names that are not
    /// builtins so the caller falls back to environment lookup.
    pub(crate) fn eval_builtin_call(
        &mut self,
        name: &str,
        args: &[Value],
        span: Span,
    ) -> Result<Option<Value>, RuntimeError> {
        match name {
            "assert" => {
                if args.len() != 1 {
                    return Err(runtime_error_at(
                        "E0401",
                        format!("assert expects 1 argument, got {}.", args.len()),
                        span,
                    ));
                }
                match &args[0] {
                    Value::Bool(true) => Ok(Some(Value::Null)),
                    _ => Err(runtime_error_at("E0402", "Assertion failed.", span)),
                }
            }
            _ => Ok(None),
        }
    }
}
