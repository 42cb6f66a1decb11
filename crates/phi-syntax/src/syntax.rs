//! Surface (YAML) shape of a ruleset, as it is deserialized before being
//! parsed and compiled. See spec §6.2.

use serde::Deserialize;

/// Top-level ruleset document: `title` and an ordered `rules` list.
#[derive(Debug, Clone, Deserialize)]
pub struct RulesetSource {
    pub title: String,
    pub rules: Vec<RuleSource>,
}

/// One rule as written in YAML: MetaPHI source strings for `pattern` and
/// `result`, plus optional context capture, side conditions and tests.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSource {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub context: Option<ContextSource>,
    pub pattern: String,
    pub result: String,
    #[serde(default)]
    pub when: Vec<ConditionSource>,
    #[serde(default)]
    pub tests: Vec<TestSource>,
}

/// `context: { global-object: !g, current-object: !c }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContextSource {
    #[serde(rename = "global-object")]
    pub global_object: String,
    #[serde(rename = "current-object")]
    pub current_object: String,
}

/// One entry of a rule's `when` list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionSource {
    Nf(Vec<String>),
    PresentAttrs(AttrsSource),
    AbsentAttrs(AttrsSource),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttrsSource {
    pub attrs: Vec<String>,
    pub bindings: String,
}

/// A per-rule example used by the ambient test-runner binary, not by the
/// core engine.
#[derive(Debug, Clone, Deserialize)]
pub struct TestSource {
    pub name: String,
    pub input: String,
    pub output: Option<String>,
    pub matches: Option<bool>,
}
