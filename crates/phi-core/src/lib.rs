//!
//! phi-core implements the φ-calculus rewriting and dataization engine: the
//! term syntax, the MetaPHI rule language, the matcher/substitutor, the
//! rewrite driver, the dataization interpreter and the confluence tester.
//!
//! This crate does not use unsafe code.

#![forbid(unsafe_code)]

pub mod builtins;
pub mod confluence;
pub mod context;
pub mod dataize;
pub mod driver;
pub mod error;
pub mod matcher;
pub mod metavars;
pub mod print;
pub mod rule;
pub mod ruleset;
pub mod stats;
pub mod subst;
pub mod term;

pub use context::Context;
pub use dataize::{dataize, dataize_package, Value};
pub use driver::{chain, enumerate_paths, is_normal_form, leftmost_chain, step, ChainBounds, ChainNode};
pub use error::Error;
pub use rule::{AttrRef, Condition, Rule, RuleContext};
pub use ruleset::Ruleset;
pub use term::{Attribute, Binding, MetaVar, Object};
