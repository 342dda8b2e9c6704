// ABOUTME: End-to-end tests driving read -> eval -> print exactly as the REPL does

use mal_core::env::Environment;
use mal_core::eval::eval;
use mal_core::printer::pr_str;
use mal_core::value::Value;
use mal_core::{bootstrap, builtins, reader};
use std::rc::Rc;

fn root() -> Rc<Environment> {
    let env = Environment::new();
    builtins::register_all(&env);
    bootstrap::install(&env);
    env
}

fn run(env: &Rc<Environment>, src: &str) -> Value {
    let (ast, _) = reader::read_str(src).unwrap_or_else(|e| panic!("read error for {src:?}: {e}"));
    eval(ast, env.clone()).unwrap_or_else(|e| panic!("eval error for {src:?}: {}", pr_str(&e, true)))
}

fn printed(env: &Rc<Environment>, src: &str) -> String {
    pr_str(&run(env, src), true)
}

#[test]
fn arithmetic_and_let_and_function_definition() {
    let env = root();
    assert_eq!(printed(&env, "(+ 1 2 3)"), "6");
    assert_eq!(printed(&env, "(let* [a 1 b 2] (+ a b))"), "3");
    run(&env, "(def! sq (fn* [n] (* n n)))");
    assert_eq!(printed(&env, "(sq 5)"), "25");
}

#[test]
fn quasiquote_unquote_and_splice() {
    let env = root();
    assert_eq!(printed(&env, "`(1 ~(+ 1 1) ~@(list 3 4) 5)"), "(1 2 3 4 5)");
}

#[test]
fn user_defined_macro_expands_before_evaluation() {
    let env = root();
    run(&env, "(defmacro! unless (fn* (p a b) `(if ~p ~b ~a)))");
    assert_eq!(printed(&env, "(unless false 1 2)"), "1");
}

#[test]
fn try_catch_binds_the_thrown_payload() {
    let env = root();
    assert_eq!(printed(&env, "(try* (throw {:e 1}) (catch* err (get err :e)))"), "1");
}

#[test]
fn tail_recursion_of_unbounded_depth_does_not_overflow_the_host_stack() {
    let env = root();
    run(&env, "(def! count-down (fn* (n) (if (= n 0) :done (count-down (- n 1)))))");
    assert_eq!(printed(&env, "(count-down 100000)"), ":done");
}

#[test]
fn quoting_an_ordinary_term_returns_it_unevaluated() {
    let env = root();
    assert_eq!(printed(&env, "(quote (1 2 3))"), "(1 2 3)");
    assert_eq!(printed(&env, "'(a b c)"), "(a b c)");
}

#[test]
fn macroexpand_is_idempotent() {
    let env = root();
    run(&env, "(defmacro! unless (fn* (p a b) `(if ~p ~b ~a)))");
    let once = printed(&env, "(macroexpand (unless false 1 2))");
    let twice = printed(&env, "(macroexpand (macroexpand (unless false 1 2)))");
    assert_eq!(once, twice);
}

#[test]
fn eval_resumes_in_the_root_environment_not_the_lexical_scope() {
    let env = root();
    let (ast, _) = reader::read_str("(let* (x 1) (eval (quote (+ x 1))))").unwrap();
    assert!(eval(ast, env).is_err());
}

#[test]
fn uncaught_error_carries_a_trace_through_nested_calls() {
    let env = root();
    run(&env, "(def! f (fn* (x) (g x)))");
    let (ast, _) = reader::read_str("(f 1)").unwrap();
    let err = eval(ast, env).unwrap_err();
    let Value::Error(data) = &err else { panic!("expected a wrapped error") };
    assert!(!data.trace.borrow().is_empty());
}

#[test]
fn atoms_are_mutable_references() {
    let env = root();
    run(&env, "(def! counter (atom 0))");
    run(&env, "(swap! counter (fn* (n) (+ n 1)))");
    run(&env, "(swap! counter (fn* (n) (+ n 1)))");
    assert_eq!(printed(&env, "(deref counter)"), "2");
    assert_eq!(printed(&env, "@counter"), "2");
}

#[test]
fn bootstrap_cond_and_or_and_not_are_available_from_the_start() {
    let env = root();
    assert_eq!(printed(&env, "(cond false 1 true 2)"), "2");
    assert_eq!(printed(&env, "(or nil false 3)"), "3");
    assert_eq!(printed(&env, "(not nil)"), "true");
}

#[test]
fn readable_printer_output_round_trips_through_the_reader() {
    let env = root();
    let original = run(&env, r#"(list 1 "a\nb" :kw nil true [1 2] {:a 1})"#);
    let printed_form = pr_str(&original, true);
    let (reparsed, _) = reader::read_str(&printed_form).unwrap();
    assert_eq!(original, reparsed);
}

#[test]
fn argv_is_bound_to_an_empty_vector_when_no_script_args_are_given() {
    let env = root();
    env.define("*ARGV*", Value::vector(vec![]));
    assert_eq!(printed(&env, "*ARGV*"), "[]");
}
