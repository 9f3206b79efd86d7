use super::*;

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub domain: Vec<Value>,
    pub initial: Value,
}

impl Variable {
    pub fn new(name: &str, domain: Vec<Value>, initial: Value) -> Variable {
        Variable {
            name: name.to_string(),
            domain,
            initial,
        }
    }

    pub fn new_boolean(name: &str, initial: bool) -> Variable {
        Variable::new(
            name,
            vec![false.to_value(), true.to_value()],
            initial.to_value(),
        )
    }

    /// An integer variable ranging over `lo..=hi`.
    pub fn new_int(name: &str, lo: i32, hi: i32, initial: i32) -> Variable {
        Variable::new(name, (lo..=hi).map(Value::Int).collect(), initial.to_value())
    }

    pub fn domain(&self) -> &[Value] {
        self.domain.as_slice()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
