//! Confluence testing: random term generation, critical-pair discovery, and
//! bounded joinability search, used as a property test of a ruleset. See
//! spec §4.6 and §9 (breadth-layered, not a lazy recursive stream).

use ahash::AHashSet;
use rand::Rng;
use rayon::prelude::*;

use crate::context::Context;
use crate::driver::{self, ChainBounds};
use crate::term::{self, Attribute, Binding, Object};

/// Bounds governing both random generation and the joinability search.
#[derive(Debug, Clone, Copy)]
pub struct ConfluenceBounds {
    pub max_depth: usize,
    pub max_bindings: usize,
    pub search_depth: usize,
    pub max_term_size: usize,
}

impl Default for ConfluenceBounds {
    fn default() -> Self {
        ConfluenceBounds {
            max_depth: 3,
            max_bindings: 3,
            search_depth: 7,
            max_term_size: 30,
        }
    }
}

/// Two distinct one-step successors of the same source term.
#[derive(Debug, Clone)]
pub struct CriticalPair {
    pub source: Object,
    pub left: Object,
    pub right: Object,
}

/// The outcome of searching for a common descendant of a critical pair.
#[derive(Debug, Clone)]
pub enum Joinability {
    Joined { depth: usize, common: Object },
    NotJoined,
}

/// Generates a random `Formation` bounded by `bounds`, used as a confluence
/// test's source term.
pub fn random_formation(rng: &mut impl Rng, bounds: &ConfluenceBounds) -> Object {
    random_object(rng, bounds, bounds.max_depth)
}

fn random_object(rng: &mut impl Rng, bounds: &ConfluenceBounds, depth_remaining: usize) -> Object {
    if depth_remaining == 0 {
        return leaf(rng);
    }
    match rng.random_range(0..4) {
        0 => leaf(rng),
        _ => {
            let count = rng.random_range(0..=bounds.max_bindings);
            let mut bindings = Vec::with_capacity(count);
            for i in 0..count {
                bindings.push(random_binding(rng, bounds, depth_remaining - 1, i));
            }
            Object::formation(bindings)
        }
    }
}

fn leaf(rng: &mut impl Rng) -> Object {
    match rng.random_range(0..3) {
        0 => Object::Global,
        1 => Object::This,
        _ => Object::Termination,
    }
}

fn random_binding(rng: &mut impl Rng, bounds: &ConfluenceBounds, depth_remaining: usize, index: usize) -> Binding {
    match rng.random_range(0..4) {
        0 => Binding::Delta(random_bytes(rng)),
        1 => Binding::Empty(Attribute::Alpha(index as u32)),
        2 => Binding::Lambda(format!("Lorg_eolang_int_{}", ["plus", "minus", "times"][rng.random_range(0..3)]).into()),
        _ => Binding::Alpha(Attribute::Alpha(index as u32), random_object(rng, bounds, depth_remaining)),
    }
}

fn random_bytes(rng: &mut impl Rng) -> Vec<u8> {
    let len = rng.random_range(0..=8);
    (0..len).map(|_| rng.random()).collect()
}

/// Finds every pair of distinct one-step successors of `term`.
pub fn critical_pairs(term: &Object, ctx: &Context) -> Vec<CriticalPair> {
    let successors = driver::step(term, ctx);
    let mut pairs = Vec::new();
    for i in 0..successors.len() {
        for j in (i + 1)..successors.len() {
            if !term::equal(&successors[i], &successors[j]) {
                pairs.push(CriticalPair {
                    source: term.clone(),
                    left: successors[i].clone(),
                    right: successors[j].clone(),
                });
            }
        }
    }
    pairs
}

/// Breadth-layered joinability search: enumerates `descendants_n(x)` and
/// `descendants_n(y)` level by level, pairing same-level frontiers, and
/// reports the first overlap found under `equal`. An explicit level-by-level
/// iterator rather than a lazy recursive stream, per spec §9.
pub fn search_joinable(pair: &CriticalPair, ctx: &Context, bounds: &ConfluenceBounds) -> Joinability {
    let mut left_frontier: Vec<Object> = vec![pair.left.clone()];
    let mut right_frontier: Vec<Object> = vec![pair.right.clone()];
    let mut left_seen: Vec<Object> = left_frontier.clone();
    let mut right_seen: Vec<Object> = right_frontier.clone();

    if let Some(common) = find_overlap(&left_seen, &right_seen) {
        return Joinability::Joined { depth: 0, common };
    }

    for depth in 1..=bounds.search_depth {
        left_frontier = expand(&left_frontier, ctx, bounds);
        right_frontier = expand(&right_frontier, ctx, bounds);
        left_seen.extend(left_frontier.iter().cloned());
        right_seen.extend(right_frontier.iter().cloned());

        if let Some(common) = find_overlap(&left_frontier, &right_seen) {
            return Joinability::Joined { depth, common };
        }
        if let Some(common) = find_overlap(&left_seen, &right_frontier) {
            return Joinability::Joined { depth, common };
        }
        if left_frontier.is_empty() && right_frontier.is_empty() {
            break;
        }
    }
    Joinability::NotJoined
}

fn expand(frontier: &[Object], ctx: &Context, bounds: &ConfluenceBounds) -> Vec<Object> {
    frontier
        .iter()
        .filter(|t| term::size(t) <= bounds.max_term_size)
        .flat_map(|t| driver::step(t, ctx))
        .collect()
}

fn find_overlap(xs: &[Object], ys: &[Object]) -> Option<Object> {
    xs.iter().find(|x| ys.iter().any(|y| term::equal(x, y))).cloned()
}

/// Shrinks a source `Formation` that produced a critical pair, returning
/// variants with fewer or shallower bindings that still have ≥ 2 one-step
/// successors, smallest first.
pub fn shrink(source: &Object, ctx: &Context) -> Vec<Object> {
    let Object::Formation(bindings) = source else {
        return Vec::new();
    };
    let mut candidates = Vec::new();
    for i in 0..bindings.len() {
        let mut trimmed = bindings.clone();
        trimmed.remove(i);
        candidates.push(Object::Formation(trimmed));
    }
    for (i, b) in bindings.iter().enumerate() {
        if let Binding::Alpha(attr, inner) = b {
            if let Object::Formation(inner_bindings) = inner {
                if !inner_bindings.is_empty() {
                    let mut shallowed = bindings.clone();
                    shallowed[i] = Binding::Alpha(attr.clone(), Object::Termination);
                    candidates.push(Object::Formation(shallowed));
                }
            }
        }
    }

    let mut surviving: Vec<Object> = candidates
        .into_iter()
        .filter(|c| driver::step(c, ctx).len() >= 2)
        .collect();
    surviving.sort_by_key(term::size);
    dedup_by_equal(surviving)
}

fn dedup_by_equal(terms: Vec<Object>) -> Vec<Object> {
    let mut out: Vec<Object> = Vec::new();
    for t in terms {
        if !out.iter().any(|o| term::equal(o, &t)) {
            out.push(t);
        }
    }
    out
}

/// One sample's full result: its critical pairs and whether each joined.
pub struct ConfluenceReport {
    pub source: Object,
    pub results: Vec<(CriticalPair, Joinability)>,
}

/// Checks confluence over `samples` independently generated terms. Ruleset
/// access is read-only after compilation, so samples are checked with
/// `rayon`'s parallel iterator (spec §5: the driver itself shares no
/// mutable state, only the confluence tester may parallelize).
pub fn check_many(samples: Vec<Object>, ctx: &Context, bounds: &ConfluenceBounds) -> Vec<ConfluenceReport> {
    samples
        .into_par_iter()
        .map(|source| {
            let pairs = critical_pairs(&source, ctx);
            let results = pairs
                .into_iter()
                .map(|pair| {
                    let joined = search_joinable(&pair, ctx, bounds);
                    (pair, joined)
                })
                .collect();
            ConfluenceReport { source, results }
        })
        .collect()
}

/// Counts the distinct critical-pair sources across a batch, for reporting.
pub fn distinct_sources(reports: &[ConfluenceReport]) -> usize {
    let mut seen: AHashSet<String> = AHashSet::default();
    reports
        .iter()
        .filter(|r| seen.insert(format!("{}", r.source)))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Rule;
    use crate::ruleset::Ruleset;

    // Two non-overlapping rules, each rewriting a different binding of
    // `⟦ a ↦ ξ, b ↦ ξ ⟧` to `Φ` while leaving its sibling untouched
    // (captured via `MetaBindings`), matching spec §8 scenario 5.
    fn diverging_ruleset() -> Ruleset {
        let rule_a = Rule {
            name: "rewrite-a".to_string(),
            pattern: Object::formation(vec![
                Binding::Alpha(Attribute::Named("a".into()), Object::This),
                Binding::MetaBindings("rest".into()),
            ]),
            replacement: Object::formation(vec![
                Binding::Alpha(Attribute::Named("a".into()), Object::Global),
                Binding::MetaBindings("rest".into()),
            ]),
            context: None,
            conditions: vec![],
        };
        let rule_b = Rule {
            name: "rewrite-b".to_string(),
            pattern: Object::formation(vec![
                Binding::Alpha(Attribute::Named("b".into()), Object::This),
                Binding::MetaBindings("rest".into()),
            ]),
            replacement: Object::formation(vec![
                Binding::Alpha(Attribute::Named("b".into()), Object::Global),
                Binding::MetaBindings("rest".into()),
            ]),
            context: None,
            conditions: vec![],
        };
        Ruleset::compile("diverging".into(), vec![rule_a, rule_b]).unwrap()
    }

    #[test]
    fn test_critical_pair_found_for_non_overlapping_rules() {
        let ruleset = diverging_ruleset();
        let ctx = Context::new(&ruleset);
        let t = Object::formation(vec![
            Binding::Alpha(Attribute::Named("a".into()), Object::This),
            Binding::Alpha(Attribute::Named("b".into()), Object::This),
        ]);
        let pairs = critical_pairs(&t, &ctx);
        assert_eq!(pairs.len(), 1);
        assert!(!term::equal(&pairs[0].left, &pairs[0].right));
    }

    #[test]
    fn test_critical_pair_joins_within_one_step() {
        let ruleset = diverging_ruleset();
        let ctx = Context::new(&ruleset);
        let t = Object::formation(vec![
            Binding::Alpha(Attribute::Named("a".into()), Object::This),
            Binding::Alpha(Attribute::Named("b".into()), Object::This),
        ]);
        let pair = &critical_pairs(&t, &ctx)[0];
        match search_joinable(pair, &ctx, &ConfluenceBounds::default()) {
            Joinability::Joined { depth, .. } => assert!(depth <= 1),
            Joinability::NotJoined => panic!("expected the diverging rules to join"),
        }
    }

    #[test]
    fn test_no_critical_pair_when_rules_do_not_overlap_with_term() {
        let ruleset = diverging_ruleset();
        let ctx = Context::new(&ruleset);
        assert!(critical_pairs(&Object::Global, &ctx).is_empty());
    }

    #[test]
    fn test_check_many_reports_one_per_sample() {
        let _ = env_logger::builder().is_test(true).try_init();

        let ruleset = diverging_ruleset();
        let ctx = Context::new(&ruleset);
        let samples = vec![
            Object::formation(vec![
                Binding::Alpha(Attribute::Named("a".into()), Object::This),
                Binding::Alpha(Attribute::Named("b".into()), Object::This),
            ]),
            Object::Global,
        ];
        let reports = check_many(samples, &ctx, &ConfluenceBounds::default());
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].results.len(), 1);
        assert!(reports[1].results.is_empty());
    }
}
