//! Atom operations: atom, deref, reset!, swap!
//!
//! The only mutable state a Mal program can hold directly; everything else
//! (environments aside) is immutable.

use crate::env::Environment;
use crate::error::{raise, EvalError};
use crate::eval::apply;
use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

pub fn builtin_atom(args: &[Value]) -> Result<Value, Value> {
    if args.len() != 1 {
        return Err(raise(EvalError::arity_error("atom", "1", args.len())));
    }
    Ok(Value::Atom(Rc::new(RefCell::new(args[0].clone()))))
}

fn as_atom<'a>(form: &str, v: &'a Value) -> Result<&'a Rc<RefCell<Value>>, Value> {
    match v {
        Value::Atom(a) => Ok(a),
        other => Err(raise(EvalError::type_error(form, "an atom", other))),
    }
}

pub fn builtin_deref(args: &[Value]) -> Result<Value, Value> {
    if args.len() != 1 {
        return Err(raise(EvalError::arity_error("deref", "1", args.len())));
    }
    Ok(as_atom("deref", &args[0])?.borrow().clone())
}

pub fn builtin_reset(args: &[Value]) -> Result<Value, Value> {
    if args.len() != 2 {
        return Err(raise(EvalError::arity_error("reset!", "2", args.len())));
    }
    let atom = as_atom("reset!", &args[0])?;
    *atom.borrow_mut() = args[1].clone();
    Ok(args[1].clone())
}

pub fn builtin_swap(args: &[Value]) -> Result<Value, Value> {
    if args.len() < 2 {
        return Err(raise(EvalError::arity_error("swap!", "at least 2", args.len())));
    }
    let atom = as_atom("swap!", &args[0])?;
    let mut call_args = vec![atom.borrow().clone()];
    call_args.extend_from_slice(&args[2..]);
    let new_value = apply(&args[1], call_args)?;
    *atom.borrow_mut() = new_value.clone();
    Ok(new_value)
}

/// Register all atom builtins in the environment
pub fn register(env: &Rc<Environment>) {
    env.define("atom", Value::NativeFunction(builtin_atom));
    env.define("deref", Value::NativeFunction(builtin_deref));
    env.define("reset!", Value::NativeFunction(builtin_reset));
    env.define("swap!", Value::NativeFunction(builtin_swap));
}
