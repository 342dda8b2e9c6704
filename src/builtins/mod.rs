//! # Built-in Functions Module
//!
//! NativeFunctions bound into the root environment before bootstrap,
//! organized into one sub-module per category.
//!
//! - **[arithmetic]**: `+ - * /`
//! - **[comparison]**: `= < <= > >=`
//! - **[predicates]**: `nil? true? false? symbol? keyword? vector? list?
//!   sequential? map? fn? macro? atom?`
//! - **[sequences]**: `list vector count empty? cons concat nth first rest`
//! - **[maps]**: `hash-map assoc dissoc get contains? keys vals`
//! - **[io]**: `prn println pr-str str slurp`
//! - **[atoms]**: `atom deref reset! swap!`
//! - **[meta]**: `symbol keyword with-meta meta apply map vec read-string throw`

use crate::env::Environment;
use std::rc::Rc;

pub mod arithmetic;
pub mod atoms;
pub mod comparison;
pub mod io;
pub mod maps;
pub mod meta;
pub mod predicates;
pub mod sequences;

/// Register every built-in category in the environment.
pub fn register_all(env: &Rc<Environment>) {
    arithmetic::register(env);
    comparison::register(env);
    predicates::register(env);
    sequences::register(env);
    maps::register(env);
    io::register(env);
    atoms::register(env);
    meta::register(env);
}
