use super::*;
use std::collections::BTreeSet;

/// Settings of one verification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Directives {
    /// Expand the program automaton during the search instead of up front.
    pub on_the_fly_program: bool,
    /// Expand the property automaton during the search instead of up front.
    pub on_the_fly_property: bool,
    /// Requires a stutter-invariant property and a program without
    /// communication or nested modules.
    pub partial_order_reduction: bool,
    /// Requires a safety property.
    pub slicing: bool,
    pub print_search_tree: bool,
    /// Upper bound on ample set size, 0 for none.
    pub ample_set_size: usize,
}

impl Default for Directives {
    fn default() -> Self {
        Directives {
            on_the_fly_program: true,
            on_the_fly_property: true,
            partial_order_reduction: false,
            slicing: false,
            print_search_tree: false,
            ample_set_size: 0,
        }
    }
}

impl Directives {
    pub fn from_json(json: &str) -> MCResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_por(mut self, on: bool) -> Self {
        self.partial_order_reduction = on;
        self
    }

    pub fn program_options(&self, visible: BTreeSet<String>) -> ProgramOptions {
        ProgramOptions {
            partial_order_reduction: self.partial_order_reduction,
            slicing: self.slicing,
            ample_set_size: self.ample_set_size,
            visible,
        }
    }
}
