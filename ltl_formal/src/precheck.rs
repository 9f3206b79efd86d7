//! Warnings computed before a run. They never stop the run, they tell the
//! user when the verdict may not mean what they think it means.

use ltl_domain::*;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Concern {
    /// The proposition oracle does not model the construct.
    NotEvaluated,
    /// The construct breaks the assumptions of partial order reduction.
    BreaksReduction,
    /// The construct is not handled by slicing.
    BreaksSlicing,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Advisory {
    /// Partial order reduction with a property that can see stuttering.
    NotStutterInvariant,
    /// Slicing with a property that is not a safety property.
    NotSafety,
    Unsupported { construct: Construct, concern: Concern },
}

impl fmt::Display for Advisory {
    fn fmt(&self, fmtr: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::NotStutterInvariant => write!(
                fmtr,
                "the property uses X and is not stutter invariant, partial order reduction may hide violations"
            ),
            Advisory::NotSafety => write!(
                fmtr,
                "the property is not a safety property, slicing may hide violations"
            ),
            Advisory::Unsupported { construct, concern } => {
                let what = match concern {
                    Concern::NotEvaluated => "is not modelled by the evaluator",
                    Concern::BreaksReduction => "is not supported by partial order reduction",
                    Concern::BreaksSlicing => "is not supported by slicing",
                };
                write!(fmtr, "{construct} {what}")
            }
        }
    }
}

/// Advisories for checking `property` (as written, not negated) on a
/// program with the given constructs.
pub fn precheck(property: &Formula, directives: &Directives, constructs: &[Construct]) -> Vec<Advisory> {
    let mut advisories = vec![];
    if directives.partial_order_reduction && !property.is_stutter_invariant() {
        advisories.push(Advisory::NotStutterInvariant);
    }
    if directives.slicing && !property.is_syntactic_safety() {
        advisories.push(Advisory::NotSafety);
    }

    let unsupported = |construct: &Construct, concern| Advisory::Unsupported {
        construct: construct.clone(),
        concern,
    };
    for c in constructs {
        match c.kind {
            ConstructKind::Communication => {
                advisories.push(unsupported(c, Concern::NotEvaluated));
                if directives.partial_order_reduction {
                    advisories.push(unsupported(c, Concern::BreaksReduction));
                }
            }
            ConstructKind::PerceptRule => advisories.push(unsupported(c, Concern::NotEvaluated)),
            ConstructKind::NestedModule => {
                if directives.partial_order_reduction {
                    advisories.push(unsupported(c, Concern::BreaksReduction));
                }
                if directives.slicing {
                    advisories.push(unsupported(c, Concern::BreaksSlicing));
                }
            }
        }
    }
    advisories
}
