//! The phi-term abstract syntax: objects, attributes and bindings.
//!
//! Terms are owned, `Arc`-shared value types (atomic so a compiled ruleset
//! can be read from several threads at once, see [`crate::confluence`]).
//! There is no hash-consing and no garbage collection beyond ordinary
//! reference counting; two structurally equal terms may or may not share an
//! allocation.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Identifier of a meta-variable, interned as its source-text name (without
/// the leading `!`). Meta-variants only ever occur inside patterns and rule
/// replacements, never in a term under evaluation.
pub type MetaVar = Arc<str>;

/// An attribute: one of the four distinguished names, a labelled name, a
/// positional (alpha) index, or -- patterns only -- a meta-variable standing
/// for an as-yet-unknown attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Attribute {
    Phi,
    Rho,
    Sigma,
    Nu,
    Named(Arc<str>),
    Alpha(u32),
    /// Pattern-only: the attribute itself is bound during matching.
    Meta(MetaVar),
}

impl Attribute {
    fn rank_class(&self) -> u8 {
        match self {
            Attribute::Phi => 0,
            Attribute::Rho => 1,
            Attribute::Sigma => 2,
            Attribute::Nu => 3,
            Attribute::Named(_) => 4,
            Attribute::Alpha(_) => 5,
            Attribute::Meta(_) => 6,
        }
    }
}

impl PartialOrd for Attribute {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Attribute {
    /// The natural order used to canonicalize a formation's bindings:
    /// distinguished names first in their fixed order, then labelled names
    /// lexicographically, then alpha-indices by numeric value.
    fn cmp(&self, other: &Self) -> Ordering {
        match self.rank_class().cmp(&other.rank_class()) {
            Ordering::Equal => match (self, other) {
                (Attribute::Named(a), Attribute::Named(b)) => a.cmp(b),
                (Attribute::Alpha(a), Attribute::Alpha(b)) => a.cmp(b),
                (Attribute::Meta(a), Attribute::Meta(b)) => a.cmp(b),
                _ => Ordering::Equal,
            },
            other => other,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Phi => write!(f, "φ"),
            Attribute::Rho => write!(f, "ρ"),
            Attribute::Sigma => write!(f, "σ"),
            Attribute::Nu => write!(f, "ν"),
            Attribute::Named(name) => write!(f, "{name}"),
            Attribute::Alpha(idx) => write!(f, "α{idx}"),
            Attribute::Meta(id) => write!(f, "!{id}"),
        }
    }
}

/// A single entry inside a formation or application's binding list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Binding {
    /// A named field holding a term.
    Alpha(Attribute, Object),
    /// A declared but absent attribute.
    Empty(Attribute),
    /// Byte-literal data.
    Delta(Vec<u8>),
    /// An opaque built-in.
    Lambda(Arc<str>),
    /// Pattern-only: matches a (possibly empty) run of bindings.
    MetaBindings(MetaVar),
}

impl Binding {
    /// The attribute this binding occupies, if it has one. `Delta`, `Lambda`
    /// and `MetaBindings` bindings are not attached to an attribute.
    pub fn attribute(&self) -> Option<&Attribute> {
        match self {
            Binding::Alpha(attr, _) | Binding::Empty(attr) => Some(attr),
            Binding::Delta(_) | Binding::Lambda(_) | Binding::MetaBindings(_) => None,
        }
    }

    fn sort_key(&self) -> (u8, Option<&Attribute>, Option<&str>) {
        match self {
            Binding::Alpha(attr, _) | Binding::Empty(attr) => (0, Some(attr), None),
            Binding::Delta(_) => (1, None, None),
            Binding::Lambda(name) => (2, None, Some(name)),
            Binding::MetaBindings(id) => (3, None, Some(id)),
        }
    }
}

/// A phi-term ("object"). See spec §3.1.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Object {
    /// An object literal.
    Formation(Vec<Binding>),
    /// Applies arguments to an object.
    Application(Arc<Object>, Vec<Binding>),
    /// Attribute access.
    Dispatch(Arc<Object>, Attribute),
    /// The outermost object reference, `Φ`.
    Global,
    /// Self-reference inside a formation, `ξ`.
    This,
    /// The stuck/error term, `⊥`.
    Termination,
    /// Pattern-only: a meta-variable placeholder.
    MetaObject(MetaVar),
    /// Pattern-only: a meta-level transformation applied to an object.
    MetaFunction(Arc<str>, Arc<Object>),
}

impl Object {
    pub fn formation(bindings: Vec<Binding>) -> Object {
        Object::Formation(bindings)
    }

    pub fn application(head: Object, bindings: Vec<Binding>) -> Object {
        Object::Application(Arc::new(head), bindings)
    }

    pub fn dispatch(head: Object, attr: Attribute) -> Object {
        Object::Dispatch(Arc::new(head), attr)
    }

    /// Whether this object contains any meta-variant. Normal terms under
    /// evaluation never do (invariant I3); only patterns and replacements do.
    pub fn is_pattern(&self) -> bool {
        match self {
            Object::MetaObject(_) | Object::MetaFunction(_, _) => true,
            Object::Formation(bindings) => bindings.iter().any(binding_is_pattern),
            Object::Application(head, bindings) => {
                head.is_pattern() || bindings.iter().any(binding_is_pattern)
            }
            Object::Dispatch(head, attr) => head.is_pattern() || matches!(attr, Attribute::Meta(_)),
            Object::Global | Object::This | Object::Termination => false,
        }
    }

    /// The bindings of a `Formation`, or `None` for any other variant.
    pub fn bindings(&self) -> Option<&[Binding]> {
        match self {
            Object::Formation(bindings) => Some(bindings),
            _ => None,
        }
    }

    /// Looks up the binding for `attr` in a formation's bindings, if present.
    pub fn find_binding<'a>(bindings: &'a [Binding], attr: &Attribute) -> Option<&'a Binding> {
        bindings.iter().find(|b| b.attribute() == Some(attr))
    }
}

fn binding_is_pattern(b: &Binding) -> bool {
    match b {
        Binding::Alpha(attr, obj) => matches!(attr, Attribute::Meta(_)) || obj.is_pattern(),
        Binding::Empty(attr) => matches!(attr, Attribute::Meta(_)),
        Binding::Delta(_) | Binding::Lambda(_) => false,
        Binding::MetaBindings(_) => true,
    }
}

/// Whether a formation is "decidable" (dataizable): it has at least one of
/// `Delta`, `Lambda`, or an `Alpha φ ↦ …` binding, and no `Empty` binding.
pub fn is_decidable(bindings: &[Binding]) -> bool {
    let has_empty = bindings.iter().any(|b| matches!(b, Binding::Empty(_)));
    if has_empty {
        return false;
    }
    bindings.iter().any(|b| {
        matches!(
            b,
            Binding::Delta(_) | Binding::Lambda(_) | Binding::Alpha(Attribute::Phi, _)
        )
    })
}

/// Canonicalizes a term by reordering every formation's bindings along the
/// natural attribute order. This makes binding order unobservable to
/// `equal`.
pub fn canonicalize(t: &Object) -> Object {
    match t {
        Object::Formation(bindings) => {
            let mut bindings: Vec<Binding> = bindings.iter().map(canonicalize_binding).collect();
            bindings.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
            Object::Formation(bindings)
        }
        Object::Application(head, bindings) => {
            let mut bindings: Vec<Binding> = bindings.iter().map(canonicalize_binding).collect();
            bindings.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
            Object::Application(Arc::new(canonicalize(head)), bindings)
        }
        Object::Dispatch(head, attr) => Object::Dispatch(Arc::new(canonicalize(head)), attr.clone()),
        Object::Global | Object::This | Object::Termination | Object::MetaObject(_) => t.clone(),
        Object::MetaFunction(name, arg) => {
            Object::MetaFunction(name.clone(), Arc::new(canonicalize(arg)))
        }
    }
}

fn canonicalize_binding(b: &Binding) -> Binding {
    match b {
        Binding::Alpha(attr, obj) => Binding::Alpha(attr.clone(), canonicalize(obj)),
        Binding::Empty(attr) => Binding::Empty(attr.clone()),
        Binding::Delta(bytes) => Binding::Delta(bytes.clone()),
        Binding::Lambda(name) => Binding::Lambda(name.clone()),
        Binding::MetaBindings(id) => Binding::MetaBindings(id.clone()),
    }
}

/// Structural equality after canonicalization -- alpha-invariant with
/// respect to binding order.
pub fn equal(a: &Object, b: &Object) -> bool {
    canonicalize(a) == canonicalize(b)
}

/// Counts the AST nodes of `t`. Used for shrink heuristics and depth-first
/// rewrite ordering; it has no semantic role.
pub fn size(t: &Object) -> usize {
    1 + match t {
        Object::Formation(bindings) => bindings.iter().map(binding_size).sum(),
        Object::Application(head, bindings) => size(head) + bindings.iter().map(binding_size).sum(),
        Object::Dispatch(head, _) => size(head),
        Object::Global | Object::This | Object::Termination | Object::MetaObject(_) => 0,
        Object::MetaFunction(_, arg) => size(arg),
    }
}

fn binding_size(b: &Binding) -> usize {
    1 + match b {
        Binding::Alpha(_, obj) => size(obj),
        Binding::Empty(_) | Binding::Delta(_) | Binding::Lambda(_) | Binding::MetaBindings(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(bytes: &[u8]) -> Binding {
        Binding::Delta(bytes.to_vec())
    }

    #[test]
    fn test_equal_is_order_invariant() {
        let a = Object::formation(vec![
            Binding::Alpha(Attribute::Named("a".into()), Object::This),
            Binding::Alpha(Attribute::Named("b".into()), Object::Global),
        ]);
        let b = Object::formation(vec![
            Binding::Alpha(Attribute::Named("b".into()), Object::Global),
            Binding::Alpha(Attribute::Named("a".into()), Object::This),
        ]);
        assert!(equal(&a, &b));
    }

    #[test]
    fn test_equal_distinguishes_different_terms() {
        let a = Object::formation(vec![Binding::Delta(vec![0x01])]);
        let b = Object::formation(vec![Binding::Delta(vec![0x02])]);
        assert!(!equal(&a, &b));
    }

    #[test]
    fn test_decidable_requires_no_empty() {
        let bindings = vec![delta(&[0x01]), Binding::Empty(Attribute::Named("x".into()))];
        assert!(!is_decidable(&bindings));
    }

    #[test]
    fn test_decidable_with_delta() {
        let bindings = vec![delta(&[0x01])];
        assert!(is_decidable(&bindings));
    }

    #[test]
    fn test_size_counts_nodes() {
        let t = Object::formation(vec![Binding::Alpha(Attribute::Phi, Object::This)]);
        // root formation (1) + binding (1) + This (1)
        assert_eq!(size(&t), 3);
    }

    #[test]
    fn test_canonical_order_distinguished_first() {
        let t = Object::formation(vec![
            Binding::Alpha(Attribute::Named("z".into()), Object::This),
            Binding::Alpha(Attribute::Nu, Object::This),
            Binding::Alpha(Attribute::Phi, Object::This),
        ]);
        let c = canonicalize(&t);
        if let Object::Formation(bindings) = c {
            let attrs: Vec<_> = bindings.iter().map(|b| b.attribute().unwrap().clone()).collect();
            assert_eq!(attrs, vec![Attribute::Phi, Attribute::Nu, Attribute::Named("z".into())]);
        } else {
            panic!("expected formation");
        }
    }
}
