//! The internal form of a rewrite rule: a pattern, a replacement, optional
//! context bindings and side conditions. See spec §3.2.

use std::fmt;

use crate::term::{MetaVar, Object};

/// An attribute appearing in a `present`/`absent` condition's attribute
/// list: either a literal name or a meta-variable bound elsewhere in the
/// pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrRef {
    Literal(crate::term::Attribute),
    Meta(MetaVar),
}

impl fmt::Display for AttrRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrRef::Literal(attr) => write!(f, "{attr}"),
            AttrRef::Meta(id) => write!(f, "!{id}"),
        }
    }
}

/// A side condition attached to a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// The subterm bound to `μ` must be in normal form under the current
    /// ruleset.
    Nf(MetaVar),
    /// Every attribute in `attrs` occurs in the bindings-sequence bound to
    /// `bindings`.
    Present { attrs: Vec<AttrRef>, bindings: MetaVar },
    /// None of the attributes in `attrs` occur in the bindings-sequence
    /// bound to `bindings`.
    Absent { attrs: Vec<AttrRef>, bindings: MetaVar },
}

/// Optional context capture: a pair of meta-variables bound to the global
/// object and the object currently being rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleContext {
    pub global_object: MetaVar,
    pub current_object: MetaVar,
}

/// A compiled rewrite rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: String,
    pub pattern: Object,
    pub replacement: Object,
    pub context: Option<RuleContext>,
    pub conditions: Vec<Condition>,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} => {}", self.name, self.pattern, self.replacement)
    }
}
