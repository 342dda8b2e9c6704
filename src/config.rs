//! Startup constants: version string and REPL welcome banner. Filesystem and
//! network access are unsandboxed (`slurp` reads any path the host process
//! can); there is no separate I/O sandbox configuration to carry.

pub const VERSION: &str = "1.0.0";
pub const WELCOME_MESSAGE: &str = "Mal (Make-A-Lisp)";
pub const WELCOME_SUBTITLE: &str = "A Clojure-inspired Lisp interpreter with TCO, macros, and quasiquote";
