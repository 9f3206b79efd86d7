/// This file defines LTL formulas and the negation normal form transform.
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// An immutable LTL formula. Sub-formulas are shared through `Arc`, so a
/// clone never copies the tree. Conjunctions and disjunctions hold ordered
/// sets, which makes equality independent of how the formula was written.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Formula {
    Proposition(String),
    Negation(Arc<Formula>),
    Next(Arc<Formula>),
    Conjunction(BTreeSet<Formula>),
    Disjunction(BTreeSet<Formula>),
    Until(Arc<Formula>, Arc<Formula>),
    Release(Arc<Formula>, Arc<Formula>),
    True,
    False,
}

impl Default for Formula {
    fn default() -> Self {
        Formula::True
    }
}

impl Formula {
    pub fn prop(name: &str) -> Formula {
        Formula::Proposition(name.to_string())
    }

    pub fn not(f: Formula) -> Formula {
        Formula::Negation(Arc::new(f))
    }

    pub fn next(f: Formula) -> Formula {
        Formula::Next(Arc::new(f))
    }

    /// Conjunction of the given formulas. Nested conjunctions are flattened,
    /// an empty conjunction is `True` and a single conjunct is returned as is.
    pub fn and<I: IntoIterator<Item = Formula>>(args: I) -> Formula {
        let mut args: BTreeSet<Formula> = args
            .into_iter()
            .flat_map(|a| match a {
                Formula::Conjunction(inner) => inner.into_iter().collect::<Vec<_>>(),
                a => vec![a],
            })
            .collect();
        match args.len() {
            0 => Formula::True,
            1 => args.pop_first().unwrap_or_default(),
            _ => Formula::Conjunction(args),
        }
    }

    /// Disjunction of the given formulas. An empty disjunction is `False`.
    pub fn or<I: IntoIterator<Item = Formula>>(args: I) -> Formula {
        let mut args: BTreeSet<Formula> = args
            .into_iter()
            .flat_map(|a| match a {
                Formula::Disjunction(inner) => inner.into_iter().collect::<Vec<_>>(),
                a => vec![a],
            })
            .collect();
        match args.len() {
            0 => Formula::False,
            1 => args.pop_first().unwrap_or(Formula::False),
            _ => Formula::Disjunction(args),
        }
    }

    pub fn until(l: Formula, r: Formula) -> Formula {
        Formula::Until(Arc::new(l), Arc::new(r))
    }

    pub fn release(l: Formula, r: Formula) -> Formula {
        Formula::Release(Arc::new(l), Arc::new(r))
    }

    pub fn implies(l: Formula, r: Formula) -> Formula {
        Formula::or([Formula::not(l), r])
    }

    pub fn iff(l: Formula, r: Formula) -> Formula {
        Formula::and([
            Formula::implies(l.clone(), r.clone()),
            Formula::implies(r, l),
        ])
    }

    /// `F f`, sugar for `true U f`.
    pub fn eventually(f: Formula) -> Formula {
        Formula::until(Formula::True, f)
    }

    /// `G f`, sugar for `false R f`.
    pub fn always(f: Formula) -> Formula {
        Formula::release(Formula::False, f)
    }

    /// `l W r`, sugar for `r R (l || r)`.
    pub fn weak_until(l: Formula, r: Formula) -> Formula {
        Formula::release(r.clone(), Formula::or([l, r]))
    }

    /// Negation normal form: negations only appear directly above
    /// propositions. Total and idempotent.
    pub fn nnf(&self) -> Formula {
        match self {
            Formula::Proposition(_) | Formula::True | Formula::False => self.clone(),
            Formula::Negation(arg) => arg.negated_nnf(),
            Formula::Next(arg) => Formula::next(arg.nnf()),
            Formula::Conjunction(args) => Formula::and(args.iter().map(|a| a.nnf())),
            Formula::Disjunction(args) => Formula::or(args.iter().map(|a| a.nnf())),
            Formula::Until(l, r) => Formula::until(l.nnf(), r.nnf()),
            Formula::Release(l, r) => Formula::release(l.nnf(), r.nnf()),
        }
    }

    /// The NNF of the negation of this formula.
    pub fn negate(&self) -> Formula {
        self.negated_nnf()
    }

    fn negated_nnf(&self) -> Formula {
        match self {
            Formula::Proposition(_) => Formula::not(self.clone()),
            Formula::Negation(arg) => arg.nnf(),
            Formula::Next(arg) => Formula::next(arg.negated_nnf()),
            Formula::Conjunction(args) => Formula::or(args.iter().map(|a| a.negated_nnf())),
            Formula::Disjunction(args) => Formula::and(args.iter().map(|a| a.negated_nnf())),
            Formula::Until(l, r) => Formula::release(l.negated_nnf(), r.negated_nnf()),
            Formula::Release(l, r) => Formula::until(l.negated_nnf(), r.negated_nnf()),
            Formula::True => Formula::False,
            Formula::False => Formula::True,
        }
    }

    pub fn is_nnf(&self) -> bool {
        match self {
            Formula::Proposition(_) | Formula::True | Formula::False => true,
            Formula::Negation(arg) => matches!(arg.as_ref(), Formula::Proposition(_)),
            Formula::Next(arg) => arg.is_nnf(),
            Formula::Conjunction(args) | Formula::Disjunction(args) => {
                args.iter().all(|a| a.is_nnf())
            }
            Formula::Until(l, r) | Formula::Release(l, r) => l.is_nnf() && r.is_nnf(),
        }
    }

    /// Elementary formulas are the ones the cover engine never decomposes.
    pub fn is_elementary(&self) -> bool {
        !matches!(
            self,
            Formula::Conjunction(_) | Formula::Disjunction(_) | Formula::Until(..) | Formula::Release(..)
        )
    }

    /// A proposition or a negated proposition.
    pub fn is_literal(&self) -> bool {
        match self {
            Formula::Proposition(_) => true,
            Formula::Negation(arg) => matches!(arg.as_ref(), Formula::Proposition(_)),
            _ => false,
        }
    }

    /// The names of all propositions occurring in the formula.
    pub fn propositions(&self) -> BTreeSet<String> {
        let mut s = BTreeSet::new();
        self.collect_propositions(&mut s);
        s
    }

    fn collect_propositions(&self, s: &mut BTreeSet<String>) {
        match self {
            Formula::Proposition(name) => {
                s.insert(name.clone());
            }
            Formula::Negation(arg) | Formula::Next(arg) => arg.collect_propositions(s),
            Formula::Conjunction(args) | Formula::Disjunction(args) => {
                args.iter().for_each(|a| a.collect_propositions(s))
            }
            Formula::Until(l, r) | Formula::Release(l, r) => {
                l.collect_propositions(s);
                r.collect_propositions(s);
            }
            Formula::True | Formula::False => {}
        }
    }

    /// All `Until` sub-formulas, without duplicates, in formula order.
    pub fn untils(&self) -> Vec<Formula> {
        let mut s = BTreeSet::new();
        self.collect_untils(&mut s);
        s.into_iter().collect()
    }

    fn collect_untils(&self, s: &mut BTreeSet<Formula>) {
        match self {
            Formula::Until(l, r) => {
                s.insert(self.clone());
                l.collect_untils(s);
                r.collect_untils(s);
            }
            Formula::Release(l, r) => {
                l.collect_untils(s);
                r.collect_untils(s);
            }
            Formula::Negation(arg) | Formula::Next(arg) => arg.collect_untils(s),
            Formula::Conjunction(args) | Formula::Disjunction(args) => {
                args.iter().for_each(|a| a.collect_untils(s))
            }
            Formula::Proposition(_) | Formula::True | Formula::False => {}
        }
    }

    pub fn has_next(&self) -> bool {
        match self {
            Formula::Next(_) => true,
            Formula::Negation(arg) => arg.has_next(),
            Formula::Conjunction(args) | Formula::Disjunction(args) => {
                args.iter().any(|a| a.has_next())
            }
            Formula::Until(l, r) | Formula::Release(l, r) => l.has_next() || r.has_next(),
            Formula::Proposition(_) | Formula::True | Formula::False => false,
        }
    }

    /// Next-free formulas cannot tell a state from its repetition.
    pub fn is_stutter_invariant(&self) -> bool {
        !self.has_next()
    }

    /// Syntactic safety: once in NNF, the formula uses no `Until`.
    pub fn is_syntactic_safety(&self) -> bool {
        self.nnf().untils().is_empty()
    }

    /// Structural 32 bit hash, stable within a process.
    pub fn fx_hash(&self) -> u32 {
        let mut hasher = FxHasher::default();
        self.hash(&mut hasher);
        let h = hasher.finish();
        (h ^ (h >> 32)) as u32
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, fmtr: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: String = match &self {
            Formula::Proposition(name) => name.clone(),
            Formula::Negation(arg) => format!("!{arg}"),
            Formula::Next(arg) => format!("X {arg}"),
            Formula::Conjunction(args) if args.is_empty() => "true".into(),
            Formula::Conjunction(args) => {
                let children: Vec<_> = args.iter().map(|p| format!("{p}")).collect();
                format!("({})", children.join(" && "))
            }
            Formula::Disjunction(args) if args.is_empty() => "false".into(),
            Formula::Disjunction(args) => {
                let children: Vec<_> = args.iter().map(|p| format!("{p}")).collect();
                format!("({})", children.join(" || "))
            }
            Formula::Until(l, r) => format!("({l} U {r})"),
            Formula::Release(l, r) => format!("({l} R {r})"),
            Formula::True => "true".into(),
            Formula::False => "false".into(),
        };

        write!(fmtr, "{}", &s)
    }
}
