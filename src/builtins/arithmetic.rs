//! Arithmetic operations: +, -, *, /
//!
//! - `+`: sum of all arguments (0 for no arguments)
//! - `-`: subtracts the rest from the first argument; negates a single argument
//! - `*`: product of all arguments (1 for no arguments)
//! - `/`: divides the first argument by the rest, truncating toward zero

use crate::env::Environment;
use crate::error::{raise, EvalError};
use crate::value::Value;
use std::rc::Rc;

fn numbers(form: &str, args: &[Value]) -> Result<Vec<i64>, Value> {
    args.iter()
        .map(|v| match v {
            Value::Number(n) => Ok(*n),
            other => Err(raise(EvalError::type_error(form, "a number", other))),
        })
        .collect()
}

pub fn builtin_add(args: &[Value]) -> Result<Value, Value> {
    Ok(Value::Number(numbers("+", args)?.into_iter().sum()))
}

pub fn builtin_sub(args: &[Value]) -> Result<Value, Value> {
    let nums = numbers("-", args)?;
    match nums.as_slice() {
        [] => Err(raise(EvalError::arity_error("-", "at least 1", 0))),
        [only] => Ok(Value::Number(-only)),
        [first, rest @ ..] => Ok(Value::Number(rest.iter().fold(*first, |acc, n| acc - n))),
    }
}

pub fn builtin_mul(args: &[Value]) -> Result<Value, Value> {
    Ok(Value::Number(numbers("*", args)?.into_iter().product()))
}

pub fn builtin_div(args: &[Value]) -> Result<Value, Value> {
    let nums = numbers("/", args)?;
    let division_by_zero = || {
        raise(EvalError::TypeError {
            function: "/".to_string(),
            expected: "a non-zero divisor".to_string(),
            actual: "0".to_string(),
        })
    };
    match nums.as_slice() {
        [] => Err(raise(EvalError::arity_error("/", "at least 1", 0))),
        [only] => {
            if *only == 0 {
                return Err(division_by_zero());
            }
            Ok(Value::Number(1 / only))
        }
        [first, rest @ ..] => {
            let mut acc = *first;
            for n in rest {
                if *n == 0 {
                    return Err(division_by_zero());
                }
                acc /= n;
            }
            Ok(Value::Number(acc))
        }
    }
}

/// Register all arithmetic builtins in the environment
pub fn register(env: &Rc<Environment>) {
    env.define("+", Value::NativeFunction(builtin_add));
    env.define("-", Value::NativeFunction(builtin_sub));
    env.define("*", Value::NativeFunction(builtin_mul));
    env.define("/", Value::NativeFunction(builtin_div));
}
