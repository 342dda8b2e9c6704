mod bootstrap;
mod builtins;
mod config;
mod env;
mod error;
mod eval;
mod printer;
mod reader;
mod value;

use clap::Parser;
use config::{VERSION, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use env::Environment;
use eval::eval;
use printer::pr_str;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use value::Value;

/// A Clojure-inspired Lisp interpreter with TCO, macros, and quasiquote
#[derive(Parser, Debug)]
#[command(name = "mal")]
#[command(version = VERSION)]
#[command(about = "A small Lisp-family interpreter")]
struct CliArgs {
    /// Script file to execute (optional - if not provided, starts REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Extra positional arguments bound to *ARGV* in the script's environment
    #[arg(trailing_var_arg = true)]
    extra_args: Vec<String>,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let env = root_env(&args.extra_args);

    if let Some(script_path) = &args.script {
        match run_script(script_path, env) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{e}");
                ExitCode::FAILURE
            }
        }
    } else {
        run_repl(env);
        ExitCode::SUCCESS
    }
}

/// Builds the root environment: built-ins, bootstrap forms, then `*ARGV*`.
fn root_env(extra_args: &[String]) -> Rc<Environment> {
    let env = Environment::new();
    builtins::register_all(&env);
    bootstrap::install(&env);
    let argv = Value::vector(extra_args.iter().map(|s| Value::String(s.clone())).collect());
    env.define("*ARGV*", argv);
    env
}

/// Executes every top-level form in `path` via `(load-file ...)`, exiting
/// non-zero on the first unhandled error.
fn run_script(path: &PathBuf, env: Rc<Environment>) -> Result<(), String> {
    let path_str = path.to_string_lossy();
    let (ast, _) = reader::read_str(&format!("(load-file \"{path_str}\")"))
        .map_err(|e| format!("read error: {e}"))?;
    eval(ast, env).map(|_| ()).map_err(|e| describe_error(&e))
}

/// Interactive read-eval-print loop. An empty line re-prompts; EOF exits
/// cleanly.
fn run_repl(env: Rc<Environment>) {
    println!("{WELCOME_MESSAGE}");
    println!("{WELCOME_SUBTITLE}");

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("failed to initialize REPL: {e}");
            return;
        }
    };
    let history_file = ".mal_history";
    let _ = rl.load_history(history_file);

    loop {
        match rl.readline("user> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);
                match reader::read_str(&line) {
                    Ok((ast, _)) => match eval(ast, env.clone()) {
                        Ok(result) => println!("{}", pr_str(&result, true)),
                        Err(e) => eprintln!("{}", describe_error(&e)),
                    },
                    Err(e) => eprintln!("{e}"),
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("readline error: {e}");
                break;
            }
        }
    }

    let _ = rl.save_history(history_file);
}

/// Formats an uncaught error for the REPL/script boundary: its display form
/// plus the accumulated trace.
fn describe_error(err: &Value) -> String {
    let Value::Error(data) = err else {
        return pr_str(err, false);
    };
    let mut out = format!("Error: {}", pr_str(&data.value, false));
    let trace = data.trace.borrow();
    for ast in trace.iter() {
        out.push_str(&format!("\n  in {}", pr_str(ast, true)));
    }
    out
}
