//! Constructors, metadata, and the "needs to call back into eval" builtins:
//! symbol, keyword, with-meta, meta, apply, map, vec, read-string, throw.

use crate::env::Environment;
use crate::error::{raise, EvalError};
use crate::eval::apply as eval_apply;
use crate::value::{Lambda, Value};
use std::rc::Rc;

pub fn builtin_symbol(args: &[Value]) -> Result<Value, Value> {
    if args.len() != 1 {
        return Err(raise(EvalError::arity_error("symbol", "1", args.len())));
    }
    match &args[0] {
        Value::String(s) => Ok(Value::symbol(s.clone())),
        other => Err(raise(EvalError::type_error("symbol", "a string", other))),
    }
}

pub fn builtin_keyword(args: &[Value]) -> Result<Value, Value> {
    if args.len() != 1 {
        return Err(raise(EvalError::arity_error("keyword", "1", args.len())));
    }
    match &args[0] {
        Value::Keyword(k) => Ok(Value::Keyword(k.clone())),
        Value::String(s) => Ok(Value::Keyword(s.clone())),
        other => Err(raise(EvalError::type_error("keyword", "a string or keyword", other))),
    }
}

/// `with-meta` only has a defined target in the data model: Function.
/// Rather than silently discarding `^m` on any other term, clone the Lambda
/// with its metadata slot replaced.
pub fn builtin_with_meta(args: &[Value]) -> Result<Value, Value> {
    if args.len() != 2 {
        return Err(raise(EvalError::arity_error("with-meta", "2", args.len())));
    }
    match &args[0] {
        Value::Function(lam) => Ok(Value::Function(Rc::new(Lambda {
            params: lam.params.clone(),
            body: lam.body.clone(),
            env: lam.env.clone(),
            is_macro: lam.is_macro.clone(),
            meta: std::cell::RefCell::new(Some(args[1].clone())),
        }))),
        other => Err(raise(EvalError::type_error("with-meta", "a function", other))),
    }
}

pub fn builtin_meta(args: &[Value]) -> Result<Value, Value> {
    if args.len() != 1 {
        return Err(raise(EvalError::arity_error("meta", "1", args.len())));
    }
    match &args[0] {
        Value::Function(lam) => Ok(lam.meta.borrow().clone().unwrap_or(Value::Nil)),
        other => Err(raise(EvalError::type_error("meta", "a function", other))),
    }
}

pub fn builtin_apply(args: &[Value]) -> Result<Value, Value> {
    if args.len() < 2 {
        return Err(raise(EvalError::arity_error("apply", "at least 2", args.len())));
    }
    let f = &args[0];
    let last = &args[args.len() - 1];
    let trailing = last
        .as_sequential()
        .ok_or_else(|| raise(EvalError::type_error("apply", "a sequential as the last argument", last)))?;
    let mut call_args = args[1..args.len() - 1].to_vec();
    call_args.extend_from_slice(trailing);
    eval_apply(f, call_args)
}

pub fn builtin_map(args: &[Value]) -> Result<Value, Value> {
    if args.len() != 2 {
        return Err(raise(EvalError::arity_error("map", "2", args.len())));
    }
    let items = args[1]
        .as_sequential()
        .ok_or_else(|| raise(EvalError::type_error("map", "a sequential", &args[1])))?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(eval_apply(&args[0], vec![item.clone()])?);
    }
    Ok(Value::list(out))
}

pub fn builtin_vec(args: &[Value]) -> Result<Value, Value> {
    if args.len() != 1 {
        return Err(raise(EvalError::arity_error("vec", "1", args.len())));
    }
    match &args[0] {
        Value::Vector(items) => Ok(Value::Vector(items.clone())),
        Value::List(items) => Ok(Value::vector(items.as_ref().clone())),
        other => Err(raise(EvalError::type_error("vec", "a sequential", other))),
    }
}

pub fn builtin_read_string(args: &[Value]) -> Result<Value, Value> {
    if args.len() != 1 {
        return Err(raise(EvalError::arity_error("read-string", "1", args.len())));
    }
    let source = match &args[0] {
        Value::String(s) => s,
        other => return Err(raise(EvalError::type_error("read-string", "a string", other))),
    };
    let (ast, _) = crate::reader::read_str(source)
        .map_err(|msg| raise(EvalError::ReaderError(msg)))?;
    Ok(ast)
}

pub fn builtin_throw(args: &[Value]) -> Result<Value, Value> {
    if args.len() != 1 {
        return Err(raise(EvalError::arity_error("throw", "1", args.len())));
    }
    Err(crate::error::throw(args[0].clone()))
}

/// Register all constructor/meta/callback builtins in the environment
pub fn register(env: &Rc<Environment>) {
    env.define("symbol", Value::NativeFunction(builtin_symbol));
    env.define("keyword", Value::NativeFunction(builtin_keyword));
    env.define("with-meta", Value::NativeFunction(builtin_with_meta));
    env.define("meta", Value::NativeFunction(builtin_meta));
    env.define("apply", Value::NativeFunction(builtin_apply));
    env.define("map", Value::NativeFunction(builtin_map));
    env.define("vec", Value::NativeFunction(builtin_vec));
    env.define("read-string", Value::NativeFunction(builtin_read_string));
    env.define("throw", Value::NativeFunction(builtin_throw));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_is_idempotent_on_an_existing_keyword() {
        assert_eq!(builtin_keyword(&[Value::Keyword("a".into())]), Ok(Value::Keyword("a".into())));
        assert_eq!(builtin_keyword(&[Value::String("a".into())]), Ok(Value::Keyword("a".into())));
    }

    #[test]
    fn apply_splices_the_trailing_sequence_onto_extra_args() {
        let add = Value::NativeFunction(crate::builtins::arithmetic::builtin_add);
        let rest = Value::list(vec![Value::Number(2), Value::Number(3)]);
        assert_eq!(builtin_apply(&[add, Value::Number(1), rest]), Ok(Value::Number(6)));
    }

    #[test]
    fn map_applies_a_function_across_a_sequence() {
        let add = Value::NativeFunction(crate::builtins::arithmetic::builtin_add);
        let items = Value::list(vec![Value::Number(1), Value::Number(2)]);
        assert_eq!(
            builtin_map(&[add, items]),
            Ok(Value::list(vec![Value::Number(1), Value::Number(2)]))
        );
    }

    #[test]
    fn read_string_parses_without_evaluating() {
        assert_eq!(
            builtin_read_string(&[Value::String("(+ 1 2)".into())]),
            Ok(Value::list(vec![Value::symbol("+"), Value::Number(1), Value::Number(2)]))
        );
    }

    #[test]
    fn throw_is_catchable_and_preserves_the_payload() {
        let err = builtin_throw(&[Value::Number(42)]).unwrap_err();
        assert_eq!(crate::error::payload_of(&err), Value::Number(42));
    }

    fn macro_lambda() -> Value {
        let env = Environment::new();
        let lam = Lambda {
            params: crate::env::Params { required: vec!["x".to_string()], rest: None },
            body: Value::symbol("x"),
            env,
            is_macro: std::cell::Cell::new(true),
            meta: std::cell::RefCell::new(None),
        };
        Value::Function(Rc::new(lam))
    }

    #[test]
    fn apply_rejects_a_macro_flagged_function() {
        assert!(builtin_apply(&[macro_lambda(), Value::vector(vec![Value::Number(5)])]).is_err());
    }

    #[test]
    fn map_rejects_a_macro_flagged_function() {
        let items = Value::list(vec![Value::Number(1)]);
        assert!(builtin_map(&[macro_lambda(), items]).is_err());
    }
}
