//! Comparison operations: =, <, <=, >, >=
//!
//! `=` compares any two Terms via `Value`'s sequential equality; the
//! ordering operators are variadic and numeric-only, true when the
//! arguments form a non-increasing/non-decreasing chain.

use crate::env::Environment;
use crate::error::{raise, EvalError};
use crate::value::Value;
use std::rc::Rc;

pub fn builtin_eq(args: &[Value]) -> Result<Value, Value> {
    if args.len() != 2 {
        return Err(raise(EvalError::arity_error("=", "2", args.len())));
    }
    Ok(Value::Bool(args[0] == args[1]))
}

fn numbers(form: &str, args: &[Value]) -> Result<Vec<i64>, Value> {
    if args.len() < 2 {
        return Err(raise(EvalError::arity_error(form, "at least 2", args.len())));
    }
    args.iter()
        .map(|v| match v {
            Value::Number(n) => Ok(*n),
            other => Err(raise(EvalError::type_error(form, "a number", other))),
        })
        .collect()
}

fn chain(form: &str, args: &[Value], ok: impl Fn(i64, i64) -> bool) -> Result<Value, Value> {
    let nums = numbers(form, args)?;
    Ok(Value::Bool(nums.windows(2).all(|w| ok(w[0], w[1]))))
}

pub fn builtin_lt(args: &[Value]) -> Result<Value, Value> {
    chain("<", args, |a, b| a < b)
}

pub fn builtin_le(args: &[Value]) -> Result<Value, Value> {
    chain("<=", args, |a, b| a <= b)
}

pub fn builtin_gt(args: &[Value]) -> Result<Value, Value> {
    chain(">", args, |a, b| a > b)
}

pub fn builtin_ge(args: &[Value]) -> Result<Value, Value> {
    chain(">=", args, |a, b| a >= b)
}

/// Register all comparison builtins in the environment
pub fn register(env: &Rc<Environment>) {
    env.define("=", Value::NativeFunction(builtin_eq));
    env.define("<", Value::NativeFunction(builtin_lt));
    env.define("<=", Value::NativeFunction(builtin_le));
    env.define(">", Value::NativeFunction(builtin_gt));
    env.define(">=", Value::NativeFunction(builtin_ge));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eq_uses_sequential_equality() {
        let l = Value::list(vec![Value::Number(1)]);
        let v = Value::vector(vec![Value::Number(1)]);
        assert_eq!(builtin_eq(&[l, v]), Ok(Value::Bool(true)));
    }

    #[test]
    fn ordering_is_variadic() {
        assert_eq!(builtin_lt(&[Value::Number(1), Value::Number(2), Value::Number(3)]), Ok(Value::Bool(true)));
        assert_eq!(builtin_lt(&[Value::Number(1), Value::Number(3), Value::Number(2)]), Ok(Value::Bool(false)));
    }
}
