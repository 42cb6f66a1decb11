//! A substitution binds the meta-variables of a single successful match:
//! objects (`MetaObject`), bindings-sequences (`MetaBindings`) and
//! attributes (`Attribute::Meta`). It lives only for the duration of one
//! match/substitute and carries no global state.

use ahash::AHashMap;

use crate::term::{Attribute, Binding, MetaVar, Object};

#[derive(Debug, Clone, Default)]
pub struct Substitution {
    pub objects: AHashMap<MetaVar, Object>,
    pub bindings: AHashMap<MetaVar, Vec<Binding>>,
    pub attrs: AHashMap<MetaVar, Attribute>,
}

impl Substitution {
    pub fn bind_object(&mut self, id: &MetaVar, obj: Object) -> bool {
        match self.objects.get(id) {
            Some(existing) => crate::term::equal(existing, &obj),
            None => {
                self.objects.insert(id.clone(), obj);
                true
            }
        }
    }

    pub fn bind_attribute(&mut self, id: &MetaVar, attr: Attribute) -> bool {
        match self.attrs.get(id) {
            Some(existing) => *existing == attr,
            None => {
                self.attrs.insert(id.clone(), attr);
                true
            }
        }
    }

    pub fn bind_bindings(&mut self, id: &MetaVar, bindings: Vec<Binding>) -> bool {
        match self.bindings.get(id) {
            Some(existing) => bindings_equal(existing, &bindings),
            None => {
                self.bindings.insert(id.clone(), bindings);
                true
            }
        }
    }

    /// Resolves an attribute that may itself be a meta-variable.
    pub fn resolve_attr<'a>(&'a self, attr: &'a Attribute) -> Option<&'a Attribute> {
        match attr {
            Attribute::Meta(id) => self.attrs.get(id),
            concrete => Some(concrete),
        }
    }

    /// Looks up the bindings-sequence named by a condition's `bindings`
    /// meta-variable: either a direct `MetaBindings` capture, or the
    /// bindings of a `Formation` bound to a `MetaObject` of that name.
    pub fn bindings_sequence(&self, id: &MetaVar) -> Option<&[Binding]> {
        if let Some(b) = self.bindings.get(id) {
            return Some(b);
        }
        if let Some(Object::Formation(b)) = self.objects.get(id) {
            return Some(b);
        }
        None
    }
}

/// Applies a substitution to a replacement term, resolving meta-variables
/// and evaluating meta-functions via `meta_fns`. Fails if a `MetaObject`,
/// `Attribute::Meta` or `MetaBindings` in the replacement has no binding, or
/// a `MetaFunction` name is not recognised by `meta_fns`.
pub fn substitute(
    replacement: &Object,
    subst: &Substitution,
    meta_fns: &dyn Fn(&str, &Object) -> Option<Object>,
) -> Option<Object> {
    match replacement {
        Object::MetaObject(id) => subst.objects.get(id).cloned(),
        Object::MetaFunction(name, arg) => {
            let arg = substitute(arg, subst, meta_fns)?;
            meta_fns(name, &arg)
        }
        Object::Global => Some(Object::Global),
        Object::This => Some(Object::This),
        Object::Termination => Some(Object::Termination),
        Object::Formation(bindings) => {
            Some(Object::Formation(substitute_bindings(bindings, subst, meta_fns)?))
        }
        Object::Application(head, bindings) => {
            let head = substitute(head, subst, meta_fns)?;
            let bindings = substitute_bindings(bindings, subst, meta_fns)?;
            Some(Object::application(head, bindings))
        }
        Object::Dispatch(head, attr) => {
            let head = substitute(head, subst, meta_fns)?;
            let attr = subst.resolve_attr(attr)?.clone();
            Some(Object::dispatch(head, attr))
        }
    }
}

fn substitute_bindings(
    bindings: &[Binding],
    subst: &Substitution,
    meta_fns: &dyn Fn(&str, &Object) -> Option<Object>,
) -> Option<Vec<Binding>> {
    let mut out = Vec::with_capacity(bindings.len());
    for b in bindings {
        match b {
            Binding::Alpha(attr, obj) => {
                let attr = subst.resolve_attr(attr)?.clone();
                let obj = substitute(obj, subst, meta_fns)?;
                out.push(Binding::Alpha(attr, obj));
            }
            Binding::Empty(attr) => {
                let attr = subst.resolve_attr(attr)?.clone();
                out.push(Binding::Empty(attr));
            }
            Binding::Delta(bytes) => out.push(Binding::Delta(bytes.clone())),
            Binding::Lambda(name) => out.push(Binding::Lambda(name.clone())),
            Binding::MetaBindings(id) => {
                let seq = subst.bindings_sequence(id)?;
                out.extend(seq.iter().cloned());
            }
        }
    }
    Some(out)
}

/// Multiset equality of two bindings-sequences, ignoring order.
pub fn bindings_equal(a: &[Binding], b: &[Binding]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut remaining: Vec<&Binding> = b.iter().collect();
    'outer: for x in a {
        for (i, y) in remaining.iter().enumerate() {
            if binding_equal(x, y) {
                remaining.remove(i);
                continue 'outer;
            }
        }
        return false;
    }
    true
}

fn binding_equal(a: &Binding, b: &Binding) -> bool {
    match (a, b) {
        (Binding::Alpha(aa, ao), Binding::Alpha(ba, bo)) => aa == ba && crate::term::equal(ao, bo),
        (Binding::Empty(aa), Binding::Empty(ba)) => aa == ba,
        (Binding::Delta(ab), Binding::Delta(bb)) => ab == bb,
        (Binding::Lambda(an), Binding::Lambda(bn)) => an == bn,
        (Binding::MetaBindings(a), Binding::MetaBindings(b)) => a == b,
        _ => false,
    }
}
