//! The dataization interpreter: drives a term to normal form and then
//! reduces known built-ins on byte literals. See spec §4.5.

use std::sync::Arc;

use crate::builtins::{self, Operand};
use crate::context::Context;
use crate::driver::{self, ChainBounds};
use crate::term::{self, Attribute, Binding, Object};

/// The result of dataizing a term: either it bottomed out at bytes, or it
/// got stuck (or was stopped by a bound) and is reported as a residual term
/// (spec §7 -- this is a value, never a fatal error).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bytes(Vec<u8>),
    Residual(Object),
}

/// Dataizes `term` under `ctx`, using the default exploration bounds.
pub fn dataize(term: &Object, ctx: &Context) -> Value {
    dataize_with_bounds(term, ctx, &ChainBounds::default())
}

/// Dataizes `term` with the ambient "dataize package" flag set, per the
/// `Package` built-in's special handling.
pub fn dataize_package(term: &Object, ctx: &Context) -> Value {
    dataize_with_bounds(term, &ctx.with_package_flag(true), &ChainBounds::default())
}

pub fn dataize_with_bounds(term: &Object, ctx: &Context, bounds: &ChainBounds) -> Value {
    let normalized = driver::normalize(term, ctx, bounds);
    interpret(&normalized, ctx, bounds)
}

fn interpret(t: &Object, ctx: &Context, bounds: &ChainBounds) -> Value {
    match t {
        Object::Formation(bindings) => interpret_formation(t, bindings, ctx, bounds),
        Object::Application(head, bindings) => {
            let head_ctx = ctx.without_package_flag();
            let reduced_head = reduce_to_object(head, &head_ctx, bounds);
            let rebuilt = Object::Application(Arc::new(reduced_head), bindings.clone());
            iterate_or_stop(&rebuilt, t, ctx, bounds)
        }
        Object::Dispatch(head, attr) => {
            let head_ctx = ctx.without_package_flag();
            let reduced_head = reduce_to_object(head, &head_ctx, bounds);
            let rebuilt = Object::Dispatch(Arc::new(reduced_head), attr.clone());
            iterate_or_stop(&rebuilt, t, ctx, bounds)
        }
        other => Value::Residual(other.clone()),
    }
}

/// Re-runs dataization on a term rebuilt from a reduced head, unless it is
/// unchanged from the input (the fixpoint check of spec §4.5 step 3).
fn iterate_or_stop(rebuilt: &Object, original: &Object, ctx: &Context, bounds: &ChainBounds) -> Value {
    if term::equal(rebuilt, original) {
        Value::Residual(rebuilt.clone())
    } else {
        dataize_with_bounds(rebuilt, ctx, bounds)
    }
}

/// Converts a dataization result back into an object suitable for
/// re-insertion as a reduced head: bytes are re-wrapped as a one-binding
/// `Delta` formation, a residual term is used as-is.
fn reduce_to_object(obj: &Object, ctx: &Context, bounds: &ChainBounds) -> Object {
    match dataize_with_bounds(obj, ctx, bounds) {
        Value::Bytes(bytes) => Object::formation(vec![Binding::Delta(bytes)]),
        Value::Residual(residual) => residual,
    }
}

fn find_delta(bindings: &[Binding]) -> Option<&Vec<u8>> {
    bindings.iter().find_map(|b| match b {
        Binding::Delta(bytes) => Some(bytes),
        _ => None,
    })
}

fn find_lambda(bindings: &[Binding]) -> Option<&str> {
    bindings.iter().find_map(|b| match b {
        Binding::Lambda(name) => Some(name.as_ref()),
        _ => None,
    })
}

fn find_phi(bindings: &[Binding]) -> Option<&Object> {
    bindings.iter().find_map(|b| match b {
        Binding::Alpha(Attribute::Phi, obj) => Some(obj),
        _ => None,
    })
}

fn interpret_formation(t: &Object, bindings: &[Binding], ctx: &Context, bounds: &ChainBounds) -> Value {
    if !term::is_decidable(bindings) {
        return Value::Residual(t.clone());
    }
    if let Some(bytes) = find_delta(bindings) {
        return Value::Bytes(bytes.clone());
    }
    if let Some(name) = find_lambda(bindings) {
        return interpret_lambda(name, t, bindings, ctx, bounds);
    }
    if let Some(inner) = find_phi(bindings) {
        let child_ctx = ctx.enter(Arc::new(t.clone()), Attribute::Phi).with_package_flag(false);
        return dataize_with_bounds(inner, &child_ctx, bounds);
    }
    Value::Residual(t.clone())
}

fn operand_of(value: Value) -> Option<Operand> {
    match value {
        Value::Bytes(bytes) => Some(Operand::Bytes(bytes)),
        Value::Residual(Object::Termination) => Some(Operand::Termination),
        Value::Residual(_) => None,
    }
}

/// Handles a `Lambda`-carrying formation: `Package` dataizes its sibling
/// bindings in place (only when the ambient package flag is set); every
/// other name is looked up in the built-in registry against `ρ`/`α0`.
fn interpret_lambda(name: &str, t: &Object, bindings: &[Binding], ctx: &Context, bounds: &ChainBounds) -> Value {
    if name == "Package" {
        return interpret_package(t, bindings, ctx, bounds);
    }

    let rho = bindings.iter().find_map(|b| match b {
        Binding::Alpha(Attribute::Rho, obj) => Some(obj),
        _ => None,
    });
    let arg0 = bindings.iter().find_map(|b| match b {
        Binding::Alpha(Attribute::Alpha(0), obj) => Some(obj),
        _ => None,
    });

    let child_ctx = ctx.without_package_flag();
    let rho_operand = match rho.and_then(|o| operand_of(dataize_with_bounds(o, &child_ctx, bounds))) {
        Some(operand) => operand,
        None => return Value::Residual(t.clone()),
    };
    let arg0_operand = match arg0 {
        Some(o) => match operand_of(dataize_with_bounds(o, &child_ctx, bounds)) {
            Some(operand) => Some(operand),
            None => return Value::Residual(t.clone()),
        },
        None => None,
    };

    match builtins::eval_builtin(name, &rho_operand, arg0_operand.as_ref()) {
        Some(result) => dataize_with_bounds(&result, ctx, bounds),
        None => Value::Residual(t.clone()),
    }
}

/// `Package`'s special handling (spec §4.5, §9 open question): dataizes
/// every `Alpha` sibling binding in place, leaving any binding that doesn't
/// reduce to bytes unchanged, and leaves the `Lambda Package` binding
/// itself untouched. A no-op, returning the formation as-is, when the
/// ambient "dataize package" flag isn't set.
fn interpret_package(t: &Object, bindings: &[Binding], ctx: &Context, bounds: &ChainBounds) -> Value {
    if !ctx.dataize_package {
        return Value::Residual(t.clone());
    }
    let mut new_bindings = Vec::with_capacity(bindings.len());
    for b in bindings {
        match b {
            Binding::Alpha(attr, obj) => {
                let child_ctx = ctx.enter(Arc::new(t.clone()), attr.clone());
                match dataize_with_bounds(obj, &child_ctx, bounds) {
                    Value::Bytes(bytes) => {
                        new_bindings.push(Binding::Alpha(attr.clone(), Object::formation(vec![Binding::Delta(bytes)])));
                    }
                    Value::Residual(_) => new_bindings.push(b.clone()),
                }
            }
            other => new_bindings.push(other.clone()),
        }
    }
    Value::Residual(Object::Formation(new_bindings))
}
