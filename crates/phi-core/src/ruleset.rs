//! Rule compilation: validates a list of surface rules and assembles a
//! read-only [`Ruleset`]. See spec §4.2.

use ahash::AHashSet;

use crate::error::Error;
use crate::metavars;
use crate::rule::Rule;

/// An ordered, compiled collection of rewrite rules. Read-only once
/// constructed; shared by reference through every [`Context`](crate::context::Context).
#[derive(Debug, Clone)]
pub struct Ruleset {
    pub title: String,
    pub rules: Vec<Rule>,
}

impl Ruleset {
    /// Compiles `rules` into a [`Ruleset`], validating each rule:
    ///
    /// - every meta-variable used in the replacement or side conditions
    ///   also appears in the pattern (else [`Error::MalformedRule`]);
    /// - every `nf` condition names a meta-variable actually bound by the
    ///   pattern.
    pub fn compile(title: String, rules: Vec<Rule>) -> Result<Ruleset, Error> {
        for rule in &rules {
            let mut pattern_vars = AHashSet::default();
            metavars::collect_object(&rule.pattern, &mut pattern_vars);

            let mut replacement_vars = AHashSet::default();
            metavars::collect_object(&rule.replacement, &mut replacement_vars);

            for var in &replacement_vars {
                if !pattern_vars.contains(var) {
                    return Err(Error::MalformedRule {
                        rule: rule.name.clone(),
                        reason: format!("meta-variable `!{var}` used in replacement but not bound by the pattern"),
                    });
                }
            }

            for cond in &rule.conditions {
                let mut cond_vars = AHashSet::default();
                metavars::collect_condition(cond, &mut cond_vars);
                for var in &cond_vars {
                    if !pattern_vars.contains(var) {
                        return Err(Error::MalformedRule {
                            rule: rule.name.clone(),
                            reason: format!(
                                "meta-variable `!{var}` used in a side condition but not bound by the pattern"
                            ),
                        });
                    }
                }
            }

            if let Some(ctx) = &rule.context {
                for var in [&ctx.global_object, &ctx.current_object] {
                    if pattern_vars.contains(var) {
                        return Err(Error::MalformedRule {
                            rule: rule.name.clone(),
                            reason: format!(
                                "context meta-variable `!{var}` collides with a pattern meta-variable"
                            ),
                        });
                    }
                }
            }
        }

        Ok(Ruleset { title, rules })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Condition;
    use crate::term::{Attribute, Binding, Object};

    fn var_pattern(name: &str) -> Object {
        Object::formation(vec![Binding::Alpha(Attribute::Named("a".into()), Object::MetaObject(name.into()))])
    }

    #[test]
    fn test_rejects_unbound_replacement_var() {
        let rule = Rule {
            name: "bad".to_string(),
            pattern: Object::This,
            replacement: Object::MetaObject("x".into()),
            context: None,
            conditions: vec![],
        };
        assert!(Ruleset::compile("t".into(), vec![rule]).is_err());
    }

    #[test]
    fn test_accepts_bound_replacement_var() {
        let rule = Rule {
            name: "ok".to_string(),
            pattern: var_pattern("x"),
            replacement: Object::MetaObject("x".into()),
            context: None,
            conditions: vec![],
        };
        assert!(Ruleset::compile("t".into(), vec![rule]).is_ok());
    }

    #[test]
    fn test_rejects_unbound_nf_condition() {
        let rule = Rule {
            name: "bad-nf".to_string(),
            pattern: Object::This,
            replacement: Object::This,
            context: None,
            conditions: vec![Condition::Nf("x".into())],
        };
        assert!(Ruleset::compile("t".into(), vec![rule]).is_err());
    }
}
