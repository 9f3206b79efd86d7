use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i32),
}

impl Default for Value {
    fn default() -> Self {
        Value::Bool(false)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, fmtr: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(fmtr, "{b}"),
            Value::Int(i) => write!(fmtr, "{i}"),
        }
    }
}

pub trait ToValue {
    fn to_value(&self) -> Value;
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl ToValue for i32 {
    fn to_value(&self) -> Value {
        Value::Int(*self)
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        *self
    }
}

/// A state of a transition system model: one value per variable, in
/// variable order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct ModelState(pub Vec<Value>);

impl ModelState {
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.get(index).copied()
    }
}

impl StateDigest for ModelState {
    fn digest(&self) -> Digest {
        let mut key = Vec::with_capacity(self.0.len() * 5);
        for v in &self.0 {
            match v {
                Value::Bool(b) => key.extend_from_slice(&[0, *b as u8]),
                Value::Int(i) => {
                    key.push(1);
                    key.extend_from_slice(&i.to_le_bytes());
                }
            }
        }
        Digest::from_key(key)
    }
}

impl fmt::Display for ModelState {
    fn fmt(&self, fmtr: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<_> = self.0.iter().map(|v| v.to_string()).collect();
        write!(fmtr, "[{}]", values.join(", "))
    }
}
