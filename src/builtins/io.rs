//! I/O operations: prn, println, pr-str, str, slurp
//!
//! `prn`/`pr-str` render their arguments readably (quoted strings, escapes);
//! `println`/`str` render them for display. `slurp` reads a whole file as a
//! string; this interpreter does not sandbox filesystem access.

use crate::env::Environment;
use crate::error::{raise, EvalError};
use crate::printer::pr_str;
use crate::value::Value;
use std::rc::Rc;

fn join(args: &[Value], readable: bool, sep: &str) -> String {
    args.iter().map(|v| pr_str(v, readable)).collect::<Vec<_>>().join(sep)
}

pub fn builtin_prn(args: &[Value]) -> Result<Value, Value> {
    println!("{}", join(args, true, " "));
    Ok(Value::Nil)
}

pub fn builtin_println(args: &[Value]) -> Result<Value, Value> {
    println!("{}", join(args, false, " "));
    Ok(Value::Nil)
}

pub fn builtin_pr_str(args: &[Value]) -> Result<Value, Value> {
    Ok(Value::String(join(args, true, " ")))
}

pub fn builtin_str(args: &[Value]) -> Result<Value, Value> {
    Ok(Value::String(join(args, false, "")))
}

pub fn builtin_slurp(args: &[Value]) -> Result<Value, Value> {
    if args.len() != 1 {
        return Err(raise(EvalError::arity_error("slurp", "1", args.len())));
    }
    let path = match &args[0] {
        Value::String(s) => s,
        other => return Err(raise(EvalError::type_error("slurp", "a string path", other))),
    };
    std::fs::read_to_string(path)
        .map(Value::String)
        .map_err(|e| raise(EvalError::TypeError {
            function: "slurp".to_string(),
            expected: "a readable file".to_string(),
            actual: e.to_string(),
        }))
}

/// Register all I/O builtins in the environment
pub fn register(env: &Rc<Environment>) {
    env.define("prn", Value::NativeFunction(builtin_prn));
    env.define("println", Value::NativeFunction(builtin_println));
    env.define("pr-str", Value::NativeFunction(builtin_pr_str));
    env.define("str", Value::NativeFunction(builtin_str));
    env.define("slurp", Value::NativeFunction(builtin_slurp));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pr_str_quotes_and_escapes_strings() {
        assert_eq!(builtin_pr_str(&[Value::String("a\"b".into())]), Ok(Value::String("\"a\\\"b\"".into())));
    }

    #[test]
    fn str_concatenates_without_separators_or_quoting() {
        assert_eq!(builtin_str(&[Value::String("a".into()), Value::Number(1)]), Ok(Value::String("a1".into())));
    }

    #[test]
    fn slurp_reports_missing_files_as_a_catchable_error() {
        assert!(builtin_slurp(&[Value::String("/no/such/file".into())]).is_err());
    }
}
