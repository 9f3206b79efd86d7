//! The cover of a set of formulas: a set of property states, each a set of
//! elementary formulas, such that the conjunction of the input is
//! equivalent to the disjunction of the states (the tableau step of
//! Daniele, Giunchiglia and Vardi).
//!
//! Derivability is purely syntactic: an elementary formula is derivable
//! from a set when it is a member, a compound formula when every formula of
//! one of its decomposition branches is.

use ltl_domain::*;
use std::collections::BTreeSet;

pub fn cover(to_cover: &BTreeSet<Formula>) -> BTreeSet<PropState> {
    let mut result = BTreeSet::new();
    cover_rec(to_cover.clone(), BTreeSet::new(), &mut result);
    result
}

fn cover_rec(
    mut to_cover: BTreeSet<Formula>,
    mut current: BTreeSet<Formula>,
    result: &mut BTreeSet<PropState>,
) {
    let f = match to_cover.pop_first() {
        Some(f) => f,
        None => {
            if !current.contains(&Formula::False) {
                result.insert(PropState::new(current));
            }
            return;
        }
    };

    let mut context: BTreeSet<Formula> = to_cover.union(&current).cloned().collect();
    context.insert(Formula::True);

    if derivable(&f.negate(), &context) {
        return;
    }

    let redundant = derivable(&f, &context)
        && match &f {
            Formula::Until(_, r) => derivable(r, &context),
            _ => true,
        };
    if redundant {
        cover_rec(to_cover, current, result);
        return;
    }

    if f.is_elementary() {
        if f != Formula::True {
            current.insert(f);
        }
        cover_rec(to_cover, current, result);
        return;
    }

    for branch in decompose(&f) {
        let mut next = to_cover.clone();
        next.extend(branch.into_iter().filter(|g| !current.contains(g)));
        cover_rec(next, current.clone(), result);
    }
}

/// Is `f` syntactically derivable from `from`?
pub fn derivable(f: &Formula, from: &BTreeSet<Formula>) -> bool {
    if f.is_elementary() {
        return from.contains(f);
    }
    decompose(f)
        .iter()
        .any(|branch| branch.iter().all(|g| derivable(g, from)))
}

/// The alternative branches a compound formula splits into. Elementary
/// formulas are their own single branch.
pub fn decompose(f: &Formula) -> Vec<BTreeSet<Formula>> {
    match f {
        Formula::Conjunction(args) => vec![args.clone()],
        Formula::Disjunction(args) => args.iter().map(|a| hashset![a.clone()]).collect(),
        Formula::Until(l, r) => vec![
            hashset![r.as_ref().clone()],
            hashset![l.as_ref().clone(), Formula::next(f.clone())],
        ],
        Formula::Release(l, r) => vec![
            hashset![l.as_ref().clone(), r.as_ref().clone()],
            hashset![r.as_ref().clone(), Formula::next(f.clone())],
        ],
        _ => vec![hashset![f.clone()]],
    }
}
