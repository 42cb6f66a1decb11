//! Contexts thread the compiled ruleset, the path of enclosing terms, the
//! current attribute and the dataization-package flag through every call.
//! This is an explicit value, never ambient/global state (spec §9).

use std::sync::Arc;

use crate::ruleset::Ruleset;
use crate::term::{Attribute, Object};

/// The context under which a rewrite or dataization step executes.
#[derive(Clone)]
pub struct Context<'a> {
    pub ruleset: &'a Ruleset,
    /// Enclosing terms from the root, oldest first.
    pub path: Vec<Arc<Object>>,
    /// The attribute under which the innermost enclosing formation was
    /// entered, if any.
    pub current_attribute: Option<Attribute>,
    /// Set while dataizing a `Package` formation's sibling bindings.
    pub dataize_package: bool,
}

impl<'a> Context<'a> {
    pub fn new(ruleset: &'a Ruleset) -> Self {
        Context {
            ruleset,
            path: Vec::new(),
            current_attribute: None,
            dataize_package: false,
        }
    }

    /// Returns a context for descending into `term` under `attr`, retaining
    /// the dataize-package flag (callers clear it explicitly when entering
    /// an Application/Dispatch head).
    pub fn enter(&self, term: Arc<Object>, attr: Attribute) -> Self {
        let mut path = self.path.clone();
        path.push(term);
        Context {
            ruleset: self.ruleset,
            path,
            current_attribute: Some(attr),
            dataize_package: self.dataize_package,
        }
    }

    /// A copy of this context with the dataize-package flag cleared, used
    /// when descending into an `Application`'s function or a `Dispatch`'s
    /// receiver. The caller restores the original context on return.
    pub fn without_package_flag(&self) -> Self {
        Context {
            ruleset: self.ruleset,
            path: self.path.clone(),
            current_attribute: self.current_attribute.clone(),
            dataize_package: false,
        }
    }

    pub fn with_package_flag(&self, flag: bool) -> Self {
        Context {
            ruleset: self.ruleset,
            path: self.path.clone(),
            current_attribute: self.current_attribute.clone(),
            dataize_package: flag,
        }
    }

    /// The innermost enclosing formation, used by rules that look up σ/ρ.
    pub fn enclosing(&self) -> Option<&Arc<Object>> {
        self.path.last()
    }
}
