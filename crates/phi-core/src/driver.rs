//! The rewrite driver: the one-step relation, normal-form detection, and
//! bounded reduction chains. See spec §4.4.

use std::sync::Arc;

use log::{info, trace};

use crate::builtins;
use crate::context::Context;
use crate::matcher::match_pattern;
use crate::rule::{AttrRef, Condition, Rule};
use crate::stats::RewriteStatistics;
use crate::subst::{self, Substitution};
use crate::term::{Attribute, Binding, Object};

/// All one-step successors of `t` under `ctx.ruleset`, in the deterministic
/// traversal order documented in spec §4.4: this position first, then
/// Application's function / Dispatch's receiver / Formation's bindings
/// left-to-right, trying rules in ruleset order at each position.
pub fn step(t: &Object, ctx: &Context) -> Vec<Object> {
    step_inner(t, ctx, None)
}

/// Like [`step`], but records position/match counts into `stats` as it
/// explores. Used by [`chain`]/[`leftmost_chain`] to report driver
/// diagnostics (see [`crate::stats`]).
pub fn step_with_stats(t: &Object, ctx: &Context, stats: &mut RewriteStatistics) -> Vec<Object> {
    step_inner(t, ctx, Some(stats))
}

fn step_inner(t: &Object, ctx: &Context, mut stats: Option<&mut RewriteStatistics>) -> Vec<Object> {
    let mut out = Vec::new();

    if let Some(s) = stats.as_deref_mut() {
        s.record_position();
    }

    for rule in &ctx.ruleset.rules {
        let mut produced = 0usize;
        for subst in match_pattern(&rule.pattern, t) {
            if conditions_hold(rule, &subst, ctx) {
                if let Some(replaced) = apply_rule(rule, &subst, ctx) {
                    trace!("rule `{}` fired at {t}, produced {replaced}", rule.name);
                    out.push(replaced);
                    produced += 1;
                }
            }
        }
        if produced > 0 {
            if let Some(s) = stats.as_deref_mut() {
                s.record_match(produced);
            }
        }
    }

    match t {
        Object::Application(head, bindings) => {
            let head_ctx = ctx.without_package_flag();
            for succ in step_inner(head, &head_ctx, stats.as_deref_mut()) {
                out.push(Object::Application(Arc::new(succ), bindings.clone()));
            }
            for (i, b) in bindings.iter().enumerate() {
                if let Binding::Alpha(attr, obj) = b {
                    let child_ctx = ctx.enter(Arc::new(t.clone()), attr.clone());
                    for succ in step_inner(obj, &child_ctx, stats.as_deref_mut()) {
                        let mut new_bindings = bindings.clone();
                        new_bindings[i] = Binding::Alpha(attr.clone(), succ);
                        out.push(Object::Application(head.clone(), new_bindings));
                    }
                }
            }
        }
        Object::Dispatch(head, attr) => {
            let head_ctx = ctx.without_package_flag();
            for succ in step_inner(head, &head_ctx, stats.as_deref_mut()) {
                out.push(Object::Dispatch(Arc::new(succ), attr.clone()));
            }
        }
        Object::Formation(bindings) => {
            for (i, b) in bindings.iter().enumerate() {
                if let Binding::Alpha(attr, obj) = b {
                    let child_ctx = ctx.enter(Arc::new(t.clone()), attr.clone());
                    for succ in step_inner(obj, &child_ctx, stats.as_deref_mut()) {
                        let mut new_bindings = bindings.clone();
                        new_bindings[i] = Binding::Alpha(attr.clone(), succ);
                        out.push(Object::Formation(new_bindings));
                    }
                }
            }
        }
        Object::Global | Object::This | Object::Termination | Object::MetaObject(_) | Object::MetaFunction(_, _) => {}
    }

    out
}

/// A term is in normal form iff it has no one-step successor.
pub fn is_normal_form(t: &Object, ctx: &Context) -> bool {
    step(t, ctx).is_empty()
}

fn conditions_hold(rule: &Rule, subst: &Substitution, ctx: &Context) -> bool {
    rule.conditions.iter().all(|c| condition_holds(c, subst, ctx))
}

fn condition_holds(cond: &Condition, subst: &Substitution, ctx: &Context) -> bool {
    match cond {
        Condition::Nf(id) => match subst.objects.get(id) {
            Some(obj) => is_normal_form(obj, ctx),
            None => false,
        },
        Condition::Present { attrs, bindings } => match subst.bindings_sequence(bindings) {
            Some(seq) => attrs.iter().all(|a| attr_present(a, seq, subst)),
            None => false,
        },
        Condition::Absent { attrs, bindings } => match subst.bindings_sequence(bindings) {
            Some(seq) => !attrs.iter().any(|a| attr_present(a, seq, subst)),
            None => false,
        },
    }
}

fn attr_present(attr_ref: &AttrRef, seq: &[Binding], subst: &Substitution) -> bool {
    let attr = match attr_ref {
        AttrRef::Literal(a) => Some(a.clone()),
        AttrRef::Meta(id) => subst.attrs.get(id).cloned(),
    };
    match attr {
        Some(attr) => seq.iter().any(|b| b.attribute() == Some(&attr)),
        None => false,
    }
}

/// Substitutes `rule`'s context meta-variables, then its replacement, to
/// produce the rewritten subterm. `global_object` binds to [`Object::Global`];
/// `current_object` binds to the innermost enclosing term, or [`Object::This`]
/// at the root.
fn apply_rule(rule: &Rule, subst: &Substitution, ctx: &Context) -> Option<Object> {
    let mut subst = subst.clone();
    if let Some(rule_ctx) = &rule.context {
        let current = ctx
            .enclosing()
            .map(|rc| (**rc).clone())
            .unwrap_or(Object::This);
        subst.bind_object(&rule_ctx.global_object, Object::Global);
        subst.bind_object(&rule_ctx.current_object, current);
    }
    subst::substitute(&rule.replacement, &subst, &builtins::eval_meta_function)
}

/// Exploration bounds for [`chain`]: pruning long or oversized branches is a
/// normal return, not an error (spec §4.4, §7 `BoundExceeded`).
#[derive(Debug, Clone, Copy)]
pub struct ChainBounds {
    pub max_length: usize,
    pub max_size: usize,
}

impl Default for ChainBounds {
    fn default() -> Self {
        ChainBounds { max_length: 64, max_size: 4096 }
    }
}

/// One node of the reduction-chain tree: a term and the (possibly empty)
/// successors reached by one more `step`.
#[derive(Debug, Clone)]
pub struct ChainNode {
    pub term: Object,
    pub children: Vec<ChainNode>,
}

/// Builds the full tree of reduction chains from `t`, pruning any branch
/// that exceeds `bounds`. Logs the session's [`RewriteStatistics`] once
/// exploration completes.
pub fn chain(t: &Object, ctx: &Context, bounds: &ChainBounds) -> ChainNode {
    let mut stats = RewriteStatistics::default();
    let tree = build_chain(t, ctx, bounds, 0, &mut stats);
    info!("chain exploration: {stats}");
    tree
}

fn build_chain(t: &Object, ctx: &Context, bounds: &ChainBounds, depth: usize, stats: &mut RewriteStatistics) -> ChainNode {
    if depth >= bounds.max_length || crate::term::size(t) > bounds.max_size {
        return ChainNode { term: t.clone(), children: Vec::new() };
    }
    let children = step_with_stats(t, ctx, stats)
        .into_iter()
        .map(|succ| build_chain(&succ, ctx, bounds, depth + 1, stats))
        .collect();
    ChainNode { term: t.clone(), children }
}

/// Every maximal path from the root to a leaf, each path including the root
/// term itself (for `--chain`).
pub fn enumerate_paths(node: &ChainNode) -> Vec<Vec<Object>> {
    if node.children.is_empty() {
        return vec![vec![node.term.clone()]];
    }
    let mut out = Vec::new();
    for child in &node.children {
        for mut path in enumerate_paths(child) {
            path.insert(0, node.term.clone());
            out.push(path);
        }
    }
    out
}

/// Drives `t` towards normal form by repeatedly taking the leftmost
/// successor, stopping early if an iteration reproduces an α-equal term
/// (spec §4.5 step 3's fixpoint check) -- this is what keeps dataization
/// from looping on a rule that rewrites a term back into itself.
pub fn normalize(t: &Object, ctx: &Context, bounds: &ChainBounds) -> Object {
    let mut current = t.clone();
    for _ in 0..bounds.max_length {
        if crate::term::size(&current) > bounds.max_size {
            break;
        }
        match step(&current, ctx).into_iter().next() {
            Some(next) if !crate::term::equal(&next, &current) => current = next,
            _ => break,
        }
    }
    current
}

/// Follows the leftmost (first-listed) successor at each step until normal
/// form or a bound is hit, for `--single`. Logs the session's
/// [`RewriteStatistics`] once the chain settles.
pub fn leftmost_chain(t: &Object, ctx: &Context, bounds: &ChainBounds) -> Vec<Object> {
    let mut stats = RewriteStatistics::default();
    let mut path = vec![t.clone()];
    let mut current = t.clone();
    while path.len() <= bounds.max_length && crate::term::size(&current) <= bounds.max_size {
        let successors = step_with_stats(&current, ctx, &mut stats);
        match successors.into_iter().next() {
            Some(next) => {
                current = next;
                path.push(current.clone());
            }
            None => break,
        }
    }
    info!("leftmost reduction: {stats}");
    path
}
