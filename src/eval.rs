// ABOUTME: Evaluator - trampoline-based tree walker with TCO, macros, and quasiquote

use crate::env::{Environment, Params};
use crate::error::{self, with_trace, EvalError, EvalResult};
use crate::value::{Lambda, Value};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Evaluates `ast` in `env`. Tail positions (`let*`, `do`, `if`, function
/// application, `eval`, `quasiquote`, `macroexpand`) rebind `ast`/`env` and
/// loop instead of recursing, so deep tail recursion doesn't grow the host
/// stack.
pub fn eval(mut ast: Value, mut env: Rc<Environment>) -> EvalResult {
    loop {
        if !matches!(ast, Value::List(_)) {
            return eval_ast(&ast, &env);
        }

        ast = macroexpand(ast, &env)?;

        let items = match &ast {
            Value::List(items) => Rc::clone(items),
            _ => return eval_ast(&ast, &env),
        };
        if items.is_empty() {
            return Ok(Value::Nil);
        }

        if let Value::Symbol(head) = &items[0] {
            match head.as_str() {
                "def!" => return eval_def(&items, &env),
                "defmacro!" => return eval_defmacro(&items, &env),
                "let*" => {
                    let (body, child) = eval_let(&items, &env)?;
                    ast = body;
                    env = child;
                    continue;
                }
                "do" => {
                    ast = eval_do(&items, &env)?;
                    continue;
                }
                "if" => {
                    ast = eval_if(&items, &env)?;
                    continue;
                }
                "fn*" => return eval_fn_star(&items, &env),
                "quote" => return eval_quote(&items),
                "quasiquote" => {
                    let arg = nth_arg(&items, 1, "quasiquote")?;
                    ast = quasiquote(arg)?;
                    continue;
                }
                "macroexpand" => {
                    let arg = nth_arg(&items, 1, "macroexpand")?.clone();
                    ast = macroexpand(arg, &env)?;
                    continue;
                }
                "try*" => return eval_try(&items, &env),
                "eval" => {
                    let arg = nth_arg(&items, 1, "eval")?.clone();
                    let evaluated = with_trace(eval(arg, env.clone()), &items[1])?;
                    ast = evaluated;
                    env = env.root();
                    continue;
                }
                _ => {}
            }
        }

        let evaluated = eval_ast(&ast, &env)?;
        let evaluated_items = match evaluated {
            Value::List(items) => items,
            _ => unreachable!("eval_ast on a List always returns a List"),
        };
        let f = evaluated_items[0].clone();
        let args = evaluated_items[1..].to_vec();

        match f {
            Value::NativeFunction(native) => return native(&args).map_err(|e| annotate(e, &ast)),
            Value::Function(lam) => {
                if lam.is_macro.get() {
                    return Err(error::raise(EvalError::NotCallable("macro".to_string())));
                }
                let new_env = Environment::bind(lam.env.clone(), &lam.params, &args).map_err(|e| annotate(e, &ast))?;
                ast = lam.body.clone();
                env = new_env;
                continue;
            }
            other => return Err(annotate(error::raise(EvalError::NotCallable(other.type_name().to_string())), &ast)),
        }
    }
}

fn annotate(err: Value, ast: &Value) -> Value {
    with_trace(Err(err), ast).unwrap_err()
}

/// The "evaluate every sub-term" dispatch: symbols resolve, lists and
/// vectors evaluate each element, map values evaluate (keys pass through),
/// everything else self-evaluates.
fn eval_ast(ast: &Value, env: &Rc<Environment>) -> EvalResult {
    match ast {
        Value::Symbol(s) => env.get(s).ok_or_else(|| error::raise(EvalError::UnboundSymbol(s.clone()))),
        Value::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items.iter() {
                out.push(with_trace(eval(item.clone(), env.clone()), item)?);
            }
            Ok(Value::list(out))
        }
        Value::Vector(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items.iter() {
                out.push(with_trace(eval(item.clone(), env.clone()), item)?);
            }
            Ok(Value::vector(out))
        }
        Value::Map(map) => {
            let mut out = std::collections::HashMap::with_capacity(map.len());
            for (k, v) in map.iter() {
                out.insert(k.clone(), with_trace(eval(v.clone(), env.clone()), v)?);
            }
            Ok(Value::Map(Rc::new(out)))
        }
        other => Ok(other.clone()),
    }
}

fn nth_arg<'a>(items: &'a [Value], n: usize, form: &str) -> Result<&'a Value, Value> {
    items
        .get(n)
        .ok_or_else(|| error::raise(EvalError::arity_error(form, n.to_string(), items.len() - 1)))
}

fn symbol_name<'a>(v: &'a Value, form: &str) -> Result<&'a str, Value> {
    v.as_symbol()
        .ok_or_else(|| error::raise(EvalError::type_error(form, "a symbol", v)))
}

fn eval_def(items: &[Value], env: &Rc<Environment>) -> EvalResult {
    if items.len() != 3 {
        return Err(error::raise(EvalError::arity_error("def!", "2", items.len() - 1)));
    }
    let name = symbol_name(&items[1], "def!")?.to_string();
    let value = with_trace(eval(items[2].clone(), env.clone()), &items[2])?;
    env.define(name, value.clone());
    Ok(value)
}

fn eval_defmacro(items: &[Value], env: &Rc<Environment>) -> EvalResult {
    if items.len() != 3 {
        return Err(error::raise(EvalError::arity_error("defmacro!", "2", items.len() - 1)));
    }
    let name = symbol_name(&items[1], "defmacro!")?.to_string();
    let value = with_trace(eval(items[2].clone(), env.clone()), &items[2])?;
    let lam = match value {
        Value::Function(lam) => lam,
        other => return Err(error::raise(EvalError::type_error("defmacro!", "a function", &other))),
    };
    lam.is_macro.set(true);
    env.define(name, Value::Function(lam.clone()));
    Ok(Value::Function(lam))
}

fn eval_let(items: &[Value], env: &Rc<Environment>) -> Result<(Value, Rc<Environment>), Value> {
    if items.len() != 3 {
        return Err(error::raise(EvalError::arity_error("let*", "2", items.len() - 1)));
    }
    let bindings = items[1]
        .as_sequential()
        .ok_or_else(|| error::raise(EvalError::type_error("let*", "a sequential of bindings", &items[1])))?
        .to_vec();
    if bindings.len() % 2 != 0 {
        return Err(error::raise(EvalError::type_error("let*", "an even number of binding forms", &items[1])));
    }
    let child = Environment::with_parent(env.clone());
    let mut i = 0;
    while i < bindings.len() {
        let name = symbol_name(&bindings[i], "let*")?.to_string();
        let value = with_trace(eval(bindings[i + 1].clone(), child.clone()), &bindings[i + 1])?;
        child.define(name, value);
        i += 2;
    }
    Ok((items[2].clone(), child))
}

fn eval_do(items: &[Value], env: &Rc<Environment>) -> EvalResult {
    if items.len() < 2 {
        return Err(error::raise(EvalError::arity_error("do", "at least 1", items.len() - 1)));
    }
    for item in &items[1..items.len() - 1] {
        with_trace(eval(item.clone(), env.clone()), item)?;
    }
    Ok(items[items.len() - 1].clone())
}

fn eval_if(items: &[Value], env: &Rc<Environment>) -> EvalResult {
    if items.len() != 3 && items.len() != 4 {
        return Err(error::raise(EvalError::arity_error("if", "2-3", items.len() - 1)));
    }
    let cond = with_trace(eval(items[1].clone(), env.clone()), &items[1])?;
    if cond.truthy() {
        Ok(items[2].clone())
    } else if items.len() == 4 {
        Ok(items[3].clone())
    } else {
        Ok(Value::Nil)
    }
}

fn eval_fn_star(items: &[Value], env: &Rc<Environment>) -> EvalResult {
    if items.len() != 3 {
        return Err(error::raise(EvalError::arity_error("fn*", "2", items.len() - 1)));
    }
    let params = Params::parse(&items[1])?;
    let lam = Lambda {
        params,
        body: items[2].clone(),
        env: env.clone(),
        is_macro: Cell::new(false),
        meta: RefCell::new(None),
    };
    Ok(Value::Function(Rc::new(lam)))
}

fn eval_quote(items: &[Value]) -> EvalResult {
    if items.len() != 2 {
        return Err(error::raise(EvalError::arity_error("quote", "1", items.len() - 1)));
    }
    Ok(items[1].clone())
}

fn eval_try(items: &[Value], env: &Rc<Environment>) -> EvalResult {
    if items.len() != 3 {
        return Err(error::raise(EvalError::arity_error("try*", "2", items.len() - 1)));
    }
    let catch = match &items[2] {
        Value::List(catch_items) if catch_items.len() == 3 && catch_items[0].as_symbol() == Some("catch*") => {
            catch_items
        }
        other => return Err(error::raise(EvalError::type_error("try*", "(catch* name body)", other))),
    };
    match eval(items[1].clone(), env.clone()) {
        Ok(v) => Ok(v),
        Err(err) => {
            let name = symbol_name(&catch[1], "catch*")?.to_string();
            let child = Environment::with_parent(env.clone());
            child.define(name, error::payload_of(&err));
            eval(catch[2].clone(), child)
        }
    }
}

/// Expands `ast` to a fixed point: while it's a non-empty list headed by a
/// symbol bound to a macro Function, apply that macro (with unevaluated
/// args) and repeat.
pub fn macroexpand(mut ast: Value, env: &Rc<Environment>) -> EvalResult {
    loop {
        let Value::List(items) = &ast else { return Ok(ast) };
        if items.is_empty() {
            return Ok(ast);
        }
        let Value::Symbol(name) = &items[0] else { return Ok(ast) };
        let Some(Value::Function(lam)) = env.get(name) else { return Ok(ast) };
        if !lam.is_macro.get() {
            return Ok(ast);
        }
        let args = items[1..].to_vec();
        let new_env = Environment::bind(lam.env.clone(), &lam.params, &args)?;
        ast = with_trace(eval(lam.body.clone(), new_env), &lam.body)?;
    }
}

/// The structural quasiquote rewrite: produces a `cons`/`concat` expression
/// tree rather than evaluating inline, so the result can be tail-continued
/// by the trampoline.
pub fn quasiquote(x: &Value) -> EvalResult {
    if let Some(items) = x.as_sequential() {
        if items.is_empty() {
            return Ok(Value::list(vec![Value::symbol("quote"), x.clone()]));
        }
        if let Value::Symbol(s) = &items[0] {
            if s == "unquote" {
                if items.len() != 2 {
                    return Err(error::raise(EvalError::arity_error("unquote", "1", items.len() - 1)));
                }
                return Ok(items[1].clone());
            }
        }
        if let Some(head_items) = items[0].as_sequential() {
            if head_items.len() == 2 && head_items[0].as_symbol() == Some("splice-unquote") {
                let rest = Value::list(items[1..].to_vec());
                return Ok(Value::list(vec![
                    Value::symbol("concat"),
                    head_items[1].clone(),
                    quasiquote(&rest)?,
                ]));
            }
        }
        let head = quasiquote(&items[0])?;
        let rest = quasiquote(&Value::list(items[1..].to_vec()))?;
        return Ok(Value::list(vec![Value::symbol("cons"), head, rest]));
    }
    Ok(Value::list(vec![Value::symbol("quote"), x.clone()]))
}

/// Invokes `f` with already-evaluated `args`. Used by the `apply`/`map`/
/// `swap!` builtins, which need to call back into user Functions without
/// going through the reader/trampoline dispatch again.
pub fn apply(f: &Value, args: Vec<Value>) -> EvalResult {
    match f {
        Value::NativeFunction(native) => native(&args),
        Value::Function(lam) => {
            if lam.is_macro.get() {
                return Err(error::raise(EvalError::NotCallable("macro".to_string())));
            }
            let new_env = Environment::bind(lam.env.clone(), &lam.params, &args)?;
            eval(lam.body.clone(), new_env)
        }
        other => Err(error::raise(EvalError::NotCallable(other.type_name().to_string()))),
    }
}
