//! Collects the meta-variables mentioned by a pattern, replacement or
//! condition, used by rule compilation to validate that every meta-variable
//! used is actually bound by the pattern.

use ahash::AHashSet;

use crate::rule::{AttrRef, Condition};
use crate::term::{Attribute, Binding, MetaVar, Object};

pub fn collect_object(obj: &Object, out: &mut AHashSet<MetaVar>) {
    match obj {
        Object::MetaObject(id) => {
            out.insert(id.clone());
        }
        Object::MetaFunction(_, arg) => collect_object(arg, out),
        Object::Formation(bindings) => bindings.iter().for_each(|b| collect_binding(b, out)),
        Object::Application(head, bindings) => {
            collect_object(head, out);
            bindings.iter().for_each(|b| collect_binding(b, out));
        }
        Object::Dispatch(head, attr) => {
            collect_object(head, out);
            collect_attribute(attr, out);
        }
        Object::Global | Object::This | Object::Termination => {}
    }
}

pub fn collect_binding(b: &Binding, out: &mut AHashSet<MetaVar>) {
    match b {
        Binding::Alpha(attr, obj) => {
            collect_attribute(attr, out);
            collect_object(obj, out);
        }
        Binding::Empty(attr) => collect_attribute(attr, out),
        Binding::Delta(_) | Binding::Lambda(_) => {}
        Binding::MetaBindings(id) => {
            out.insert(id.clone());
        }
    }
}

fn collect_attribute(attr: &Attribute, out: &mut AHashSet<MetaVar>) {
    if let Attribute::Meta(id) = attr {
        out.insert(id.clone());
    }
}

pub fn collect_condition(cond: &Condition, out: &mut AHashSet<MetaVar>) {
    match cond {
        Condition::Nf(id) => {
            out.insert(id.clone());
        }
        Condition::Present { attrs, bindings } | Condition::Absent { attrs, bindings } => {
            out.insert(bindings.clone());
            for attr in attrs {
                if let AttrRef::Meta(id) = attr {
                    out.insert(id.clone());
                }
            }
        }
    }
}
