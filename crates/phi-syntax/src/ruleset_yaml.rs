//! Loads a [`crate::syntax::RulesetSource`] from YAML, parses each rule's
//! MetaPHI source through [`crate::parser`], and compiles the result into a
//! [`phi_core::Ruleset`]. See spec §4.2 and §6.2.

use phi_core::error::Error;
use phi_core::rule::{AttrRef, Condition, Rule, RuleContext};
use phi_core::term::Attribute;
use phi_core::Ruleset;

use crate::parser;
use crate::syntax::{AttrsSource, ConditionSource, RuleSource, RulesetSource, TestSource};

/// A rule's `tests` entries, parsed but not consumed by the core engine --
/// owned by whichever tool runs self-tests against a compiled ruleset.
#[derive(Debug, Clone)]
pub struct RuleTest {
    pub rule_name: String,
    pub name: String,
    pub input: phi_core::term::Object,
    pub output: Option<phi_core::term::Object>,
    pub matches: Option<bool>,
}

/// Deserializes `yaml`, then parses and compiles it into a [`Ruleset`].
pub fn load_ruleset(yaml: &str) -> Result<Ruleset, Error> {
    let (ruleset, _tests) = load_ruleset_with_tests(yaml)?;
    Ok(ruleset)
}

/// Like [`load_ruleset`], additionally returning every rule's `tests`
/// entries, parsed into [`phi_core::term::Object`] values.
pub fn load_ruleset_with_tests(yaml: &str) -> Result<(Ruleset, Vec<RuleTest>), Error> {
    let source: RulesetSource = serde_yaml::from_str(yaml).map_err(|e| Error::Parse(e.to_string()))?;
    compile_source(source)
}

fn compile_source(source: RulesetSource) -> Result<(Ruleset, Vec<RuleTest>), Error> {
    let mut rules = Vec::with_capacity(source.rules.len());
    let mut tests = Vec::new();
    for rule_source in source.rules {
        let rule_name = rule_source.name.clone();
        tests.extend(compile_tests(&rule_name, &rule_source.tests)?);
        rules.push(compile_rule(rule_source)?);
    }
    let ruleset = Ruleset::compile(source.title, rules)?;
    Ok((ruleset, tests))
}

fn compile_rule(source: RuleSource) -> Result<Rule, Error> {
    let pattern = parser::parse_object(&source.pattern)?;
    let replacement = parser::parse_object(&source.result)?;
    let context = source.context.map(|c| RuleContext {
        global_object: c.global_object.into(),
        current_object: c.current_object.into(),
    });

    let mut conditions = Vec::new();
    for when in &source.when {
        conditions.extend(compile_condition(when)?);
    }

    Ok(Rule { name: source.name, pattern, replacement, context, conditions })
}

fn compile_condition(source: &ConditionSource) -> Result<Vec<Condition>, Error> {
    Ok(match source {
        ConditionSource::Nf(ids) => ids.iter().map(|id| Condition::Nf(id.as_str().into())).collect(),
        ConditionSource::PresentAttrs(attrs) => vec![Condition::Present {
            attrs: compile_attr_refs(attrs)?,
            bindings: attrs.bindings.as_str().into(),
        }],
        ConditionSource::AbsentAttrs(attrs) => vec![Condition::Absent {
            attrs: compile_attr_refs(attrs)?,
            bindings: attrs.bindings.as_str().into(),
        }],
    })
}

fn compile_attr_refs(attrs: &AttrsSource) -> Result<Vec<AttrRef>, Error> {
    attrs
        .attrs
        .iter()
        .map(|s| {
            Ok(match parser::parse_attribute(s)? {
                Attribute::Meta(id) => AttrRef::Meta(id),
                other => AttrRef::Literal(other),
            })
        })
        .collect()
}

fn compile_tests(rule_name: &str, tests: &[TestSource]) -> Result<Vec<RuleTest>, Error> {
    tests
        .iter()
        .map(|t| {
            Ok(RuleTest {
                rule_name: rule_name.to_string(),
                name: t.name.clone(),
                input: parser::parse_object(&t.input)?,
                output: t.output.as_deref().map(parser::parse_object).transpose()?,
                matches: t.matches,
            })
        })
        .collect()
}
