// ABOUTME: Environment module for managing variable bindings and scopes

use crate::error::EvalError;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new global environment with no parent
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child environment with a parent
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Defines (or redefines) a binding in THIS scope.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    /// Looks up a symbol in THIS scope and parent scopes recursively.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|p| p.get(name))
    }

    /// True if `name` is bound in this scope or any ancestor.
    pub fn has(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name) || self.parent.as_ref().is_some_and(|p| p.has(name))
    }

    /// Updates an existing binding, walking the parent chain to find it.
    pub fn set(&self, name: &str, value: Value) -> Result<(), EvalError> {
        if self.bindings.borrow().contains_key(name) {
            self.bindings.borrow_mut().insert(name.to_string(), value);
            return Ok(());
        }
        if let Some(ref parent) = self.parent {
            return parent.set(name, value);
        }
        Err(EvalError::UnboundSymbol(name.to_string()))
    }

    /// Walks to the outermost ancestor. The root environment is where
    /// bootstrap forms and top-level `def!`s live, and is what the `eval`
    /// special form resumes evaluation in, so closures over `eval` see the
    /// global namespace rather than whatever lexical scope called it.
    pub fn root(self: &Rc<Self>) -> Rc<Self> {
        let mut current = Rc::clone(self);
        while let Some(parent) = current.parent.clone() {
            current = parent;
        }
        current
    }

    /// Binds `params` against `args` in a new child of `parent`. The
    /// rest-marker position is already validated by `Params::parse`; this
    /// only has to check arity and do the binding.
    pub fn bind(parent: Rc<Environment>, params: &Params, args: &[Value]) -> Result<Rc<Environment>, Value> {
        let required = params.required.len();
        let ok = if params.rest.is_some() {
            args.len() >= required
        } else {
            args.len() == required
        };
        if !ok {
            let expected = if params.rest.is_some() {
                format!("at least {required}")
            } else {
                required.to_string()
            };
            return Err(crate::error::raise(EvalError::arity_error("fn*", expected, args.len())));
        }

        let env = Environment::with_parent(parent);
        for (name, value) in params.required.iter().zip(args.iter()) {
            env.define(name.clone(), value.clone());
        }
        if let Some(rest) = &params.rest {
            env.define(rest.clone(), Value::list(args[required..].to_vec()));
        }
        Ok(env)
    }
}

/// A parsed `fn*`/`defmacro!` parameter list: the fixed names, plus an
/// optional rest name bound to the remaining arguments as a list.
#[derive(Debug, Clone)]
pub struct Params {
    pub required: Vec<String>,
    pub rest: Option<String>,
}

impl Params {
    /// Parses a parameter list term, validating the `&`-marker position
    /// eagerly so a malformed `(fn* (a & ) ...)` fails at construction time
    /// rather than at the first call.
    pub fn parse(form: &Value) -> Result<Params, Value> {
        let items = form.as_sequential().ok_or_else(|| {
            crate::error::raise(EvalError::type_error("fn*", "a parameter list", form))
        })?;

        let mut required = Vec::new();
        let mut rest = None;
        let mut i = 0;
        while i < items.len() {
            let name = items[i]
                .as_symbol()
                .ok_or_else(|| crate::error::raise(EvalError::type_error("fn*", "a symbol parameter", &items[i])))?;
            if name == "&" {
                if i != items.len() - 2 {
                    return Err(crate::error::raise(EvalError::InvalidRestParameter));
                }
                let rest_name = items[i + 1]
                    .as_symbol()
                    .ok_or_else(|| crate::error::raise(EvalError::InvalidRestParameter))?;
                rest = Some(rest_name.to_string());
                i += 2;
            } else {
                required.push(name.to_string());
                i += 1;
            }
        }
        Ok(Params { required, rest })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_get() {
        let env = Environment::new();
        env.define("x", Value::Number(42));
        assert_eq!(env.get("x"), Some(Value::Number(42)));
    }

    #[test]
    fn test_undefined_symbol() {
        let env = Environment::new();
        assert!(env.get("undefined").is_none());
    }

    #[test]
    fn test_shadowing() {
        let parent = Environment::new();
        parent.define("x", Value::Number(42));
        let child = Environment::with_parent(parent);
        child.define("x", Value::Number(100));
        assert_eq!(child.get("x"), Some(Value::Number(100)));
    }

    #[test]
    fn test_parent_lookup() {
        let parent = Environment::new();
        parent.define("x", Value::Number(42));
        let child = Environment::with_parent(parent);
        assert_eq!(child.get("x"), Some(Value::Number(42)));
    }

    #[test]
    fn root_walks_to_outermost_ancestor() {
        let root = Environment::new();
        let mid = Environment::with_parent(root.clone());
        let leaf = Environment::with_parent(mid);
        assert!(Rc::ptr_eq(&leaf.root(), &root));
    }

    #[test]
    fn params_parse_rejects_rest_marker_not_in_penultimate_position() {
        let form = Value::list(vec![Value::symbol("&"), Value::symbol("a"), Value::symbol("b")]);
        assert!(Params::parse(&form).is_err());
    }

    #[test]
    fn params_parse_accepts_trailing_rest() {
        let form = Value::list(vec![Value::symbol("a"), Value::symbol("&"), Value::symbol("more")]);
        let params = Params::parse(&form).unwrap();
        assert_eq!(params.required, vec!["a".to_string()]);
        assert_eq!(params.rest, Some("more".to_string()));
    }

    #[test]
    fn bind_rest_param_collects_trailing_args_as_a_list() {
        let form = Value::list(vec![Value::symbol("a"), Value::symbol("&"), Value::symbol("more")]);
        let params = Params::parse(&form).unwrap();
        let env = Environment::bind(Environment::new(), &params, &[Value::Number(1), Value::Number(2), Value::Number(3)]).unwrap();
        assert_eq!(env.get("a"), Some(Value::Number(1)));
        assert_eq!(env.get("more"), Some(Value::list(vec![Value::Number(2), Value::Number(3)])));
    }

    #[test]
    fn bind_rejects_wrong_arity_without_rest() {
        let form = Value::list(vec![Value::symbol("a"), Value::symbol("b")]);
        let params = Params::parse(&form).unwrap();
        assert!(Environment::bind(Environment::new(), &params, &[Value::Number(1)]).is_err());
    }
}
