//! Concrete phi-syntax parser and the YAML ruleset/pipeline loaders that sit
//! outside the core engine (spec §1, §6): everything here is an external
//! collaborator consuming `phi-core`'s public API, never reaching into its
//! internals.

#![forbid(unsafe_code)]

pub mod parser;
pub mod pipeline;
pub mod ruleset_yaml;
pub mod syntax;

pub use parser::{parse_attribute, parse_object, parse_program};
pub use pipeline::PipelineConfig;
pub use ruleset_yaml::{load_ruleset, load_ruleset_with_tests, RuleTest};
pub use syntax::{ConditionSource, ContextSource, RuleSource, RulesetSource, TestSource};
