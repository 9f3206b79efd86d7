//! Guards and assignments over model variables.
use super::*;
use rustc_hash::FxHashMap;

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub enum Predicate {
    AND(Vec<Predicate>),
    OR(Vec<Predicate>),
    NOT(Box<Predicate>),
    TRUE,
    FALSE,
    EQ(PredicateValue, PredicateValue),
    NEQ(PredicateValue, PredicateValue),
}

/// A constant or a variable. Variables carry their index in the model state
/// once resolved.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum PredicateValue {
    Value(Value),
    Var(String, Option<usize>),
}

/// Used in actions to compute the next value of a variable. Values are
/// always computed from the state before the transition.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub enum Compute {
    Value(PredicateValue),
    Predicate(Predicate), // boolean assignments
    Any,                  // Free variable, takes every value of its domain.
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Action {
    pub var: String,
    pub value: Compute,
    #[serde(skip)]
    index: Option<usize>,
}

impl PartialEq for PredicateValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PredicateValue::Value(a), PredicateValue::Value(b)) => a == b,
            (PredicateValue::Var(a, _), PredicateValue::Var(b, _)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        self.var == other.var && self.value == other.value
    }
}

impl fmt::Display for PredicateValue {
    fn fmt(&self, fmtr: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredicateValue::Value(v) => write!(fmtr, "{v}"),
            PredicateValue::Var(name, _) => write!(fmtr, "{name}"),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, fmtr: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: String = match &self {
            Predicate::AND(x) => {
                let children: Vec<_> = x.iter().map(|p| format!("{p}")).collect();
                format!("({})", children.join(" && "))
            }
            Predicate::OR(x) => {
                let children: Vec<_> = x.iter().map(|p| format!("{p}")).collect();
                format!("({})", children.join(" || "))
            }
            Predicate::NOT(p) => format!("!({p})"),
            Predicate::TRUE => "true".into(),
            Predicate::FALSE => "false".into(),
            Predicate::EQ(x, y) => format!("{x} == {y}"),
            Predicate::NEQ(x, y) => format!("{x} != {y}"),
        };

        write!(fmtr, "{}", &s)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, fmtr: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match &self.value {
            Compute::Value(v) => v.to_string(),
            Compute::Predicate(p) => p.to_string(),
            Compute::Any => "?".to_string(),
        };
        write!(fmtr, "{} := {}", self.var, value)
    }
}

impl Default for Predicate {
    fn default() -> Self {
        Predicate::TRUE
    }
}

impl Default for PredicateValue {
    fn default() -> Self {
        PredicateValue::Value(Value::default())
    }
}

impl PredicateValue {
    pub fn var(name: &str) -> Self {
        PredicateValue::Var(name.to_string(), None)
    }

    pub fn value<T: ToValue>(v: T) -> Self {
        PredicateValue::Value(v.to_value())
    }

    pub fn resolve(&mut self, index: &FxHashMap<String, usize>) {
        if let PredicateValue::Var(name, idx) = self {
            *idx = index.get(name).copied();
        }
    }

    pub fn eval(&self, state: &ModelState) -> MCResult<Value> {
        match self {
            PredicateValue::Value(v) => Ok(*v),
            PredicateValue::Var(name, idx) => idx
                .and_then(|i| state.get(i))
                .ok_or_else(|| MCError::Evaluation(format!("unknown variable `{name}`"))),
        }
    }
}

impl Predicate {
    pub fn parse(from: &str) -> MCResult<Self> {
        predicate_parser::pred_parser::predicate(from)
            .map_err(|e| MCError::Syntax(format!("{e} in `{from}`")))
    }

    pub fn from_string(from: &str) -> Option<Self> {
        Predicate::parse(from).ok()
    }

    /// A boolean variable that must be true.
    pub fn is_true(var: &str) -> Self {
        Predicate::EQ(PredicateValue::var(var), PredicateValue::value(true))
    }

    pub fn resolve(&mut self, index: &FxHashMap<String, usize>) {
        match self {
            Predicate::AND(x) | Predicate::OR(x) => x.iter_mut().for_each(|p| p.resolve(index)),
            Predicate::NOT(x) => x.resolve(index),
            Predicate::TRUE | Predicate::FALSE => {}
            Predicate::EQ(x, y) | Predicate::NEQ(x, y) => {
                x.resolve(index);
                y.resolve(index);
            }
        }
    }

    /// Return the supporting variables of this expression
    pub fn support(&self) -> Vec<String> {
        let mut s = Vec::new();
        match &self {
            Predicate::AND(x) | Predicate::OR(x) => s.extend(x.iter().flat_map(|p| p.support())),
            Predicate::NOT(x) => s.extend(x.support()),
            Predicate::TRUE | Predicate::FALSE => {}
            Predicate::EQ(x, y) | Predicate::NEQ(x, y) => {
                if let PredicateValue::Var(p, _) = x {
                    s.push(p.clone())
                }
                if let PredicateValue::Var(p, _) = y {
                    s.push(p.clone())
                }
            }
        };
        s.sort();
        s.dedup();
        s
    }

    pub fn eval(&self, state: &ModelState) -> MCResult<bool> {
        Ok(match self {
            Predicate::AND(ps) => {
                for p in ps {
                    if !p.eval(state)? {
                        return Ok(false);
                    }
                }
                true
            }
            Predicate::OR(ps) => {
                for p in ps {
                    if p.eval(state)? {
                        return Ok(true);
                    }
                }
                false
            }
            Predicate::NOT(p) => !p.eval(state)?,
            Predicate::TRUE => true,
            Predicate::FALSE => false,
            Predicate::EQ(x, y) => x.eval(state)? == y.eval(state)?,
            Predicate::NEQ(x, y) => x.eval(state)? != y.eval(state)?,
        })
    }
}

impl Action {
    pub fn new(var: &str, value: Compute) -> Self {
        Action {
            var: var.to_string(),
            value,
            index: None,
        }
    }

    pub fn assign<T: ToValue>(var: &str, value: T) -> Self {
        Action::new(var, Compute::Value(PredicateValue::value(value)))
    }

    pub fn parse(from: &str) -> MCResult<Self> {
        predicate_parser::pred_parser::action(from)
            .map_err(|e| MCError::Syntax(format!("{e} in `{from}`")))
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn resolve(&mut self, index: &FxHashMap<String, usize>) {
        self.index = index.get(&self.var).copied();
        match &mut self.value {
            Compute::Value(v) => v.resolve(index),
            Compute::Predicate(p) => p.resolve(index),
            Compute::Any => {}
        }
    }

    /// Variables read when computing the new value.
    pub fn support(&self) -> Vec<String> {
        match &self.value {
            Compute::Value(PredicateValue::Var(name, _)) => vec![name.clone()],
            Compute::Predicate(p) => p.support(),
            _ => vec![],
        }
    }

    /// The values the variable may take after the action, in domain order
    /// for `Compute::Any`.
    pub fn next_values(&self, state: &ModelState, domain: &[Value]) -> MCResult<Vec<Value>> {
        Ok(match &self.value {
            Compute::Value(v) => vec![v.eval(state)?],
            Compute::Predicate(p) => vec![Value::Bool(p.eval(state)?)],
            Compute::Any => domain.to_vec(),
        })
    }
}
