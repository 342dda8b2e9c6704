// ABOUTME: Error types for evaluation failures in the Lisp interpreter

use crate::value::{ErrorData, Value};
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

// ===== Arity constant strings (eliminates allocations in error paths) =====
pub const ARITY_ONE: &str = "1";
pub const ARITY_TWO: &str = "2";
pub const ARITY_THREE: &str = "3";
pub const ARITY_AT_LEAST_ONE: &str = "at least 1";
pub const ARITY_ONE_OR_TWO: &str = "1-2";
pub const ARITY_TWO_OR_THREE: &str = "2-3";

/// The evaluator's error taxonomy. Every variant ends up wrapped in a
/// `Value::Error` so `try*`/`catch*` can bind it like any other thrown
/// value, with `Display` supplying the message text.
#[derive(Error, Debug, Clone)]
pub enum EvalError {
    #[error("'{0}' not found")]
    UnboundSymbol(String),

    #[error("not callable: {0}")]
    NotCallable(String),

    #[error("{function}: expected {expected} argument{}, got {actual}", if *.expected == "1" { "" } else { "s" })]
    ArityError {
        function: String,
        expected: String,
        actual: usize,
    },

    #[error("{function}: expected {expected}, got {actual}")]
    TypeError {
        function: String,
        expected: String,
        actual: String,
    },

    #[error("'&' must be followed by exactly one rest parameter")]
    InvalidRestParameter,

    #[error("{0}")]
    ReaderError(String),

    #[error("user error")]
    UserThrow,
}

impl EvalError {
    pub fn type_error(function: &str, expected: &str, actual: &Value) -> Self {
        EvalError::TypeError {
            function: function.to_string(),
            expected: expected.to_string(),
            actual: actual.type_name().to_string(),
        }
    }

    pub fn arity_error(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        EvalError::ArityError {
            function: function.to_string(),
            expected: expected.into(),
            actual,
        }
    }
}

/// Wraps `err` into a catchable `Value::Error` carrying a descriptive string
/// payload (everything except `(throw x)`, which keeps the raw Term).
pub fn raise(err: EvalError) -> Value {
    let value = Value::String(err.to_string());
    Value::Error(Rc::new(ErrorData {
        value,
        trace: RefCell::new(Vec::new()),
    }))
}

/// Wraps an arbitrary user Term as the payload of `(throw x)`.
pub fn throw(value: Value) -> Value {
    Value::Error(Rc::new(ErrorData {
        value,
        trace: RefCell::new(Vec::new()),
    }))
}

/// The Term a `(catch* name body)` binds `name` to: the wrapped payload, or
/// the value itself if it somehow isn't already wrapped.
pub fn payload_of(err: &Value) -> Value {
    match err {
        Value::Error(data) => data.value.clone(),
        other => other.clone(),
    }
}

/// Appends `ast` to the error's trace before it continues unwinding, so an
/// uncaught error can print a readable call chain.
pub fn with_trace(result: EvalResult, ast: &Value) -> EvalResult {
    result.map_err(|e| {
        if let Value::Error(data) = &e {
            data.trace.borrow_mut().push(ast.clone());
        }
        e
    })
}

pub type EvalResult = Result<Value, Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_throw_preserves_the_raw_term() {
        let payload = Value::list(vec![Value::Keyword("e".into()), Value::Number(1)]);
        let thrown = throw(payload.clone());
        assert_eq!(payload_of(&thrown), payload);
    }

    #[test]
    fn raise_wraps_a_descriptive_string() {
        let err = raise(EvalError::UnboundSymbol("x".into()));
        match payload_of(&err) {
            Value::String(s) => assert!(s.contains('x')),
            other => panic!("expected string payload, got {other:?}"),
        }
    }

    #[test]
    fn trace_accumulates_in_order() {
        let err = throw(Value::Number(1));
        let err = with_trace(Err(err), &Value::symbol("a")).unwrap_err();
        let err = with_trace(Err(err), &Value::symbol("b")).unwrap_err();
        if let Value::Error(data) = &err {
            let trace = data.trace.borrow();
            assert_eq!(trace.len(), 2);
            assert_eq!(trace[0], Value::symbol("a"));
            assert_eq!(trace[1], Value::symbol("b"));
        } else {
            panic!("expected Value::Error");
        }
    }
}
