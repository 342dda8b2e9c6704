//! Map operations: hash-map, assoc, dissoc, get, contains?, keys, vals
//!
//! Maps are immutable: `assoc`/`dissoc` return a new map sharing no mutable
//! state with the original.

use crate::env::Environment;
use crate::error::{raise, EvalError};
use crate::value::{MapKey, Value};
use std::collections::HashMap;
use std::rc::Rc;

fn as_map<'a>(form: &str, v: &'a Value) -> Result<&'a HashMap<MapKey, Value>, Value> {
    match v {
        Value::Map(m) => Ok(m),
        other => Err(raise(EvalError::type_error(form, "a map", other))),
    }
}

fn as_key(form: &str, v: &Value) -> Result<MapKey, Value> {
    MapKey::from_value(v).ok_or_else(|| raise(EvalError::type_error(form, "a string or keyword key", v)))
}

pub fn builtin_hash_map(args: &[Value]) -> Result<Value, Value> {
    if args.len() % 2 != 0 {
        return Err(raise(EvalError::arity_error("hash-map", "an even number of key/value arguments", args.len())));
    }
    let mut map = HashMap::new();
    let mut it = args.iter();
    while let (Some(k), Some(v)) = (it.next(), it.next()) {
        map.insert(as_key("hash-map", k)?, v.clone());
    }
    Ok(Value::Map(Rc::new(map)))
}

pub fn builtin_assoc(args: &[Value]) -> Result<Value, Value> {
    if args.is_empty() || (args.len() - 1) % 2 != 0 {
        return Err(raise(EvalError::arity_error("assoc", "1 + an even number of key/value pairs", args.len())));
    }
    let mut map = as_map("assoc", &args[0])?.clone();
    let mut it = args[1..].iter();
    while let (Some(k), Some(v)) = (it.next(), it.next()) {
        map.insert(as_key("assoc", k)?, v.clone());
    }
    Ok(Value::Map(Rc::new(map)))
}

pub fn builtin_dissoc(args: &[Value]) -> Result<Value, Value> {
    if args.is_empty() {
        return Err(raise(EvalError::arity_error("dissoc", "at least 1", 0)));
    }
    let mut map = as_map("dissoc", &args[0])?.clone();
    for k in &args[1..] {
        map.remove(&as_key("dissoc", k)?);
    }
    Ok(Value::Map(Rc::new(map)))
}

pub fn builtin_get(args: &[Value]) -> Result<Value, Value> {
    if args.len() != 2 {
        return Err(raise(EvalError::arity_error("get", "2", args.len())));
    }
    if matches!(args[0], Value::Nil) {
        return Ok(Value::Nil);
    }
    let map = as_map("get", &args[0])?;
    let key = as_key("get", &args[1])?;
    Ok(map.get(&key).cloned().unwrap_or(Value::Nil))
}

pub fn builtin_contains_p(args: &[Value]) -> Result<Value, Value> {
    if args.len() != 2 {
        return Err(raise(EvalError::arity_error("contains?", "2", args.len())));
    }
    let map = as_map("contains?", &args[0])?;
    let key = as_key("contains?", &args[1])?;
    Ok(Value::Bool(map.contains_key(&key)))
}

pub fn builtin_keys(args: &[Value]) -> Result<Value, Value> {
    if args.len() != 1 {
        return Err(raise(EvalError::arity_error("keys", "1", args.len())));
    }
    let map = as_map("keys", &args[0])?;
    Ok(Value::list(map.keys().cloned().map(MapKey::into_value).collect()))
}

pub fn builtin_vals(args: &[Value]) -> Result<Value, Value> {
    if args.len() != 1 {
        return Err(raise(EvalError::arity_error("vals", "1", args.len())));
    }
    let map = as_map("vals", &args[0])?;
    Ok(Value::list(map.values().cloned().collect()))
}

/// Register all map builtins in the environment
pub fn register(env: &Rc<Environment>) {
    env.define("hash-map", Value::NativeFunction(builtin_hash_map));
    env.define("assoc", Value::NativeFunction(builtin_assoc));
    env.define("dissoc", Value::NativeFunction(builtin_dissoc));
    env.define("get", Value::NativeFunction(builtin_get));
    env.define("contains?", Value::NativeFunction(builtin_contains_p));
    env.define("keys", Value::NativeFunction(builtin_keys));
    env.define("vals", Value::NativeFunction(builtin_vals));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assoc_is_immutable() {
        let original = builtin_hash_map(&[Value::Keyword("a".into()), Value::Number(1)]).unwrap();
        let updated = builtin_assoc(&[original.clone(), Value::Keyword("b".into()), Value::Number(2)]).unwrap();
        assert_eq!(builtin_contains_p(&[original, Value::Keyword("b".into())]), Ok(Value::Bool(false)));
        assert_eq!(builtin_contains_p(&[updated, Value::Keyword("b".into())]), Ok(Value::Bool(true)));
    }

    #[test]
    fn get_on_nil_returns_nil_instead_of_erroring() {
        assert_eq!(builtin_get(&[Value::Nil, Value::Keyword("a".into())]), Ok(Value::Nil));
    }

    #[test]
    fn get_missing_key_returns_nil() {
        let map = builtin_hash_map(&[]).unwrap();
        assert_eq!(builtin_get(&[map, Value::Keyword("missing".into())]), Ok(Value::Nil));
    }
}
