//! Structural matching with non-linear meta-variables. See spec §4.3.
//!
//! A pattern's bindings-list may contain at most one "flexible" slot -- a
//! single `MetaBindings` capture, or a single `Alpha`/`Empty` binding whose
//! attribute is itself a meta-variable -- alongside any number of literal
//! (concrete-attribute) bindings. This covers the documented prefix/
//! captured/suffix case; rules needing more than one flexible slot in the
//! same bindings-list are out of scope here.

use crate::subst::Substitution;
use crate::term::{Attribute, Binding, Object};

/// Matches `pattern` against `term`, returning every substitution under
/// which the match succeeds, in the order the matcher discovers them.
pub fn match_pattern(pattern: &Object, term: &Object) -> Vec<Substitution> {
    match_object(pattern, term, Substitution::default())
}

fn match_object(pattern: &Object, term: &Object, subst: Substitution) -> Vec<Substitution> {
    match pattern {
        Object::MetaObject(id) => {
            let mut subst = subst;
            if subst.bind_object(id, term.clone()) {
                vec![subst]
            } else {
                vec![]
            }
        }
        Object::Global => matches!(term, Object::Global).then_some(subst).into_iter().collect(),
        Object::This => matches!(term, Object::This).then_some(subst).into_iter().collect(),
        Object::Termination => matches!(term, Object::Termination).then_some(subst).into_iter().collect(),
        Object::Formation(pattern_bindings) => match term {
            Object::Formation(term_bindings) => match_bindings(pattern_bindings, term_bindings, subst),
            _ => vec![],
        },
        Object::Application(pattern_head, pattern_bindings) => match term {
            Object::Application(term_head, term_bindings) => {
                let mut results = vec![];
                for s in match_object(pattern_head, term_head, subst) {
                    results.extend(match_bindings(pattern_bindings, term_bindings, s));
                }
                results
            }
            _ => vec![],
        },
        Object::Dispatch(pattern_head, pattern_attr) => match term {
            Object::Dispatch(term_head, term_attr) => {
                let mut results = vec![];
                for mut s in match_object(pattern_head, term_head, subst) {
                    if match_attr(pattern_attr, term_attr, &mut s) {
                        results.push(s);
                    }
                }
                results
            }
            _ => vec![],
        },
        // Meta-functions only occur in replacements, never in patterns being
        // matched against a term under evaluation.
        Object::MetaFunction(_, _) => vec![],
    }
}

fn match_attr(pattern_attr: &Attribute, term_attr: &Attribute, subst: &mut Substitution) -> bool {
    match pattern_attr {
        Attribute::Meta(id) => subst.bind_attribute(id, term_attr.clone()),
        concrete => concrete == term_attr,
    }
}

/// Splits `pattern` into the literal (concrete-attribute) bindings and the
/// at-most-one flexible slot.
enum Flexible<'a> {
    None,
    MetaBindings(&'a crate::term::MetaVar),
    MetaAttr(&'a crate::term::MetaVar, FlexKind<'a>),
}

enum FlexKind<'a> {
    Alpha(&'a Object),
    Empty,
}

fn match_bindings(pattern: &[Binding], term: &[Binding], subst: Substitution) -> Vec<Substitution> {
    let mut literal: Vec<&Binding> = Vec::new();
    let mut flexible = Flexible::None;

    for b in pattern {
        match b {
            Binding::MetaBindings(id) => flexible = Flexible::MetaBindings(id),
            Binding::Alpha(Attribute::Meta(id), obj) => flexible = Flexible::MetaAttr(id, FlexKind::Alpha(obj)),
            Binding::Empty(Attribute::Meta(id)) => flexible = Flexible::MetaAttr(id, FlexKind::Empty),
            other => literal.push(other),
        }
    }

    let mut pool: Vec<Binding> = term.to_vec();
    let mut subst = subst;

    for lit in literal {
        let attr = match lit.attribute() {
            Some(a) => a.clone(),
            None => {
                // Delta/Lambda: match by variant against any remaining candidate.
                let idx = pool.iter().position(|c| variant_matches(lit, c));
                match idx {
                    Some(i) => {
                        if !match_literal(lit, &pool.remove(i), &mut subst) {
                            return vec![];
                        }
                        continue;
                    }
                    None => return vec![],
                }
            }
        };
        let idx = pool.iter().position(|c| c.attribute() == Some(&attr));
        match idx {
            Some(i) => {
                let candidate = pool.remove(i);
                if !match_literal(lit, &candidate, &mut subst) {
                    return vec![];
                }
            }
            None => return vec![],
        }
    }

    match flexible {
        Flexible::None => {
            if pool.is_empty() {
                vec![subst]
            } else {
                vec![]
            }
        }
        Flexible::MetaBindings(id) => {
            if subst.bind_bindings(id, pool) {
                vec![subst]
            } else {
                vec![]
            }
        }
        Flexible::MetaAttr(id, kind) => {
            if pool.len() != 1 {
                return vec![];
            }
            let candidate = pool.into_iter().next().unwrap();
            match (&kind, &candidate) {
                (FlexKind::Alpha(pattern_obj), Binding::Alpha(attr, obj)) => {
                    if !subst.bind_attribute(id, attr.clone()) {
                        return vec![];
                    }
                    match_object(pattern_obj, obj, subst)
                }
                (FlexKind::Empty, Binding::Empty(attr)) => {
                    if subst.bind_attribute(id, attr.clone()) {
                        vec![subst]
                    } else {
                        vec![]
                    }
                }
                _ => vec![],
            }
        }
    }
}

fn variant_matches(pattern: &Binding, candidate: &Binding) -> bool {
    matches!(
        (pattern, candidate),
        (Binding::Delta(_), Binding::Delta(_)) | (Binding::Lambda(_), Binding::Lambda(_))
    )
}

/// Matches a single literal (non-flexible) pattern binding against its
/// already-located candidate.
fn match_literal(pattern: &Binding, candidate: &Binding, subst: &mut Substitution) -> bool {
    match (pattern, candidate) {
        (Binding::Alpha(_, pattern_obj), Binding::Alpha(_, obj)) => {
            let results = match_object(pattern_obj, obj, subst.clone());
            match results.into_iter().next() {
                Some(s) => {
                    *subst = s;
                    true
                }
                None => false,
            }
        }
        (Binding::Empty(_), Binding::Empty(_)) => true,
        (Binding::Delta(expected), Binding::Delta(actual)) => expected == actual,
        (Binding::Lambda(expected), Binding::Lambda(actual)) => expected == actual,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Attribute;

    #[test]
    fn test_match_literal_delta() {
        let pattern = Object::formation(vec![Binding::Delta(vec![1, 2, 3])]);
        let term = Object::formation(vec![Binding::Delta(vec![1, 2, 3])]);
        assert_eq!(match_pattern(&pattern, &term).len(), 1);
    }

    #[test]
    fn test_match_metaobject_binds() {
        let pattern = Object::formation(vec![Binding::Alpha(Attribute::Named("a".into()), Object::MetaObject("x".into()))]);
        let term = Object::formation(vec![Binding::Alpha(Attribute::Named("a".into()), Object::This)]);
        let results = match_pattern(&pattern, &term);
        assert_eq!(results.len(), 1);
        assert!(crate::term::equal(results[0].objects.get("x").unwrap(), &Object::This));
    }

    #[test]
    fn test_nonlinear_metaobject_requires_equal_subterms() {
        let pattern = Object::formation(vec![
            Binding::Alpha(Attribute::Named("a".into()), Object::MetaObject("x".into())),
            Binding::Alpha(Attribute::Named("b".into()), Object::MetaObject("x".into())),
        ]);
        let matching = Object::formation(vec![
            Binding::Alpha(Attribute::Named("a".into()), Object::This),
            Binding::Alpha(Attribute::Named("b".into()), Object::This),
        ]);
        let mismatching = Object::formation(vec![
            Binding::Alpha(Attribute::Named("a".into()), Object::This),
            Binding::Alpha(Attribute::Named("b".into()), Object::Global),
        ]);
        assert_eq!(match_pattern(&pattern, &matching).len(), 1);
        assert_eq!(match_pattern(&pattern, &mismatching).len(), 0);
    }

    #[test]
    fn test_metabindings_captures_remainder() {
        let pattern = Object::formation(vec![
            Binding::Alpha(Attribute::Named("a".into()), Object::MetaObject("x".into())),
            Binding::MetaBindings("rest".into()),
        ]);
        let term = Object::formation(vec![
            Binding::Alpha(Attribute::Named("a".into()), Object::This),
            Binding::Alpha(Attribute::Named("b".into()), Object::Global),
        ]);
        let results = match_pattern(&pattern, &term);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].bindings.get("rest").unwrap().len(), 1);
    }

    #[test]
    fn test_no_match_on_extra_bindings_without_capture() {
        let pattern = Object::formation(vec![Binding::Alpha(Attribute::Named("a".into()), Object::MetaObject("x".into()))]);
        let term = Object::formation(vec![
            Binding::Alpha(Attribute::Named("a".into()), Object::This),
            Binding::Alpha(Attribute::Named("b".into()), Object::Global),
        ]);
        assert_eq!(match_pattern(&pattern, &term).len(), 0);
    }
}
