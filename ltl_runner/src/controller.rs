use super::*;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One check of a property against a program.
pub struct Verification<P: ProgramAutomaton, E> {
    run_id: Uuid,
    property: String,
    directives: Directives,
    advisories: Vec<Advisory>,
    explorer: Explorer<P, E>,
}

impl<P, E> Verification<P, E>
where
    P: ProgramAutomaton,
    E: Evaluator<P::State>,
{
    /// Parse the property and set the program up for checking it.
    /// Malformed properties are rejected with `MCError::Syntax` before the
    /// program is touched.
    pub fn new(property: &str, program: P, evaluator: E, directives: Directives) -> MCResult<Self> {
        let formula = Formula::parse(property)?;
        let automaton = PropertyAutomaton::for_property(&formula);

        let mut view = ProgramView::new(program, evaluator);
        view.configure(&directives.program_options(formula.propositions()))?;

        let advisories = precheck(&formula, &directives, &view.program().unsupported_constructs());
        for a in &advisories {
            log_warn!("{a}");
        }

        let explorer = Explorer::new(view, automaton)
            .with_por(directives.partial_order_reduction)
            .with_search_tree(directives.print_search_tree);

        Ok(Verification {
            run_id: Uuid::new_v4(),
            property: property.to_string(),
            directives,
            advisories,
            explorer,
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn directives(&self) -> &Directives {
        &self.directives
    }

    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    pub fn program(&self) -> &P {
        self.explorer.program().program()
    }

    pub fn explorer(&self) -> &Explorer<P, E> {
        &self.explorer
    }

    pub fn run(&mut self) -> RunReport<P::State> {
        self.run_with(|_| true)
    }

    /// Run the check to the end, then release the program. `tick` is handed
    /// to the explorer, also while generating up front, and can stop the
    /// search by returning false.
    pub fn run_with<F>(&mut self, tick: F) -> RunReport<P::State>
    where
        F: FnMut(&Explorer<P, E>) -> bool,
    {
        let started = Utc::now();
        log_info!("run {}: checking `{}`", self.run_id, self.property);

        let outcome = if self.is_disposed() {
            Outcome::Cancelled
        } else {
            Outcome::from_search(self.search(tick))
        };
        self.dispose();

        match &outcome {
            Outcome::Error(e) => log_error!("run {}: {e}", self.run_id),
            o => log_info!("run {}: {o}", self.run_id),
        }

        RunReport {
            run_id: self.run_id,
            property: self.property.clone(),
            outcome,
            advisories: self.advisories.clone(),
            stats: self.explorer.stats(),
            started,
            finished: Utc::now(),
        }
    }

    /// Report for a run whose search panicked. The program is released.
    pub(crate) fn aborted(&mut self, started: DateTime<Utc>, cause: &str) -> RunReport<P::State> {
        self.dispose();
        log_error!("run {}: search panicked: {cause}", self.run_id);
        RunReport {
            run_id: self.run_id,
            property: self.property.clone(),
            outcome: Outcome::Error(MCError::No(format!("search panicked: {cause}"))),
            advisories: self.advisories.clone(),
            stats: self.explorer.stats(),
            started,
            finished: Utc::now(),
        }
    }

    fn search<F>(&mut self, mut tick: F) -> MCResult<Verdict<P::State>>
    where
        F: FnMut(&Explorer<P, E>) -> bool,
    {
        let program = !self.directives.on_the_fly_program;
        let property = !self.directives.on_the_fly_property;
        if (program || property) && !self.explorer.generate_with(program, property, &mut tick)? {
            return Ok(Verdict::Cancelled);
        }
        self.explorer.explore_with(tick)
    }

    /// The outer search stack, root first.
    pub fn first_search_path(&self) -> Vec<ProductState<P::State>> {
        self.explorer.first_search_path()
    }

    pub fn evaluated_states(&self) -> usize {
        self.explorer.program().evaluated_states()
    }

    pub fn is_disposed(&self) -> bool {
        self.explorer.program().is_disposed()
    }

    /// Release the program. A run started afterwards is cancelled at once.
    pub fn dispose(&mut self) {
        self.explorer.program_mut().dispose();
    }
}
