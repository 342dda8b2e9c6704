//! Self-hosted definitions, evaluated in the root environment once the
//! native built-in table is installed. Written in Mal itself rather than as
//! NativeFunctions because each one is naturally expressed in terms of
//! special forms (`cond`, `or`) or other built-ins (`load-file`).

use crate::env::Environment;
use crate::eval::eval;
use std::rc::Rc;

const FORMS: &[&str] = &[
    "(def! not (fn* [a] (if a false true)))",
    r#"(def! load-file (fn* (path) (eval (read-string (str "(do " (slurp path) "\nnil)")))))"#,
    "(defmacro! cond (fn* (& xs) (if (> (count xs) 0) (list 'if (first xs) (if (> (count xs) 1) (nth xs 1) (throw \"odd number of forms to cond\")) (cons 'cond (rest (rest xs)))))))",
    "(defmacro! or (fn* (& xs) (if (empty? xs) nil (if (= 1 (count xs)) (first xs) `(let* (or_FIXME ~(first xs)) (if or_FIXME or_FIXME (or ~@(rest xs))))))))",
];

/// Evaluates the bootstrap forms in `env`, defining `not`, `load-file`,
/// `cond`, and `or`. Panics on a malformed bootstrap form: that is a bug in
/// this module, never a user-facing error.
pub fn install(env: &Rc<Environment>) {
    for src in FORMS {
        let (ast, _) = crate::reader::read_str(src)
            .unwrap_or_else(|e| panic!("bootstrap form failed to parse: {src:?}: {e}"));
        eval(ast, env.clone())
            .unwrap_or_else(|e| panic!("bootstrap form failed to eval: {src:?}: {:?}", e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins;
    use crate::printer::pr_str;

    fn root() -> Rc<Environment> {
        let env = Environment::new();
        builtins::register_all(&env);
        install(&env);
        env
    }

    fn run(src: &str) -> String {
        let env = root();
        let (ast, _) = crate::reader::read_str(src).unwrap();
        pr_str(&eval(ast, env).unwrap(), true)
    }

    #[test]
    fn not_negates_truthiness() {
        assert_eq!(run("(not nil)"), "true");
        assert_eq!(run("(not 1)"), "false");
    }

    #[test]
    fn cond_falls_through_clauses() {
        assert_eq!(run("(cond false 1 false 2 true 3)"), "3");
        assert_eq!(run("(cond)"), "nil");
    }

    #[test]
    fn or_short_circuits_on_the_first_truthy_value() {
        assert_eq!(run("(or false nil 3 4)"), "3");
        assert_eq!(run("(or false nil)"), "nil");
    }

    #[test]
    fn load_file_evaluates_every_top_level_form_in_the_file() {
        let dir = std::env::temp_dir().join(format!("mal-bootstrap-test-{}", std::process::id()));
        std::fs::write(&dir, "(def! loaded 42)").unwrap();
        let env = root();
        let path = dir.to_string_lossy().to_string();
        let (ast, _) = crate::reader::read_str(&format!("(load-file \"{path}\")")).unwrap();
        eval(ast, env.clone()).unwrap();
        let (ast, _) = crate::reader::read_str("loaded").unwrap();
        assert_eq!(pr_str(&eval(ast, env).unwrap(), true), "42");
        std::fs::remove_file(&dir).unwrap();
    }
}
