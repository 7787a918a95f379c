//! Best-first exploration over a fitness-ranked frontier.
//!
//! The frontier holds (trajectory, fitness) entries under the oracle's
//! injected comparator. Each step resumes one frontier trajectory and
//! fires one untried activation from it. A strictly fitter child is
//! descended into immediately; an equally fit child descends only when
//! the policy says so; a worse child abandons the greedy line but still
//! joins the frontier for later expansion. A trajectory leaves the
//! frontier once its last untried activation has been fired.
//!
//! [`BestFirstStrategy::worker`] is the probabilistic-restart variant:
//! with the configured probability a step resumes from a uniformly random
//! frontier state instead of the best one, and isomorphism pruning is
//! forced on so only genuinely new equivalence classes stay part of the
//! frontier.

use std::cmp::Ordering;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use quarry_coder::classify::IsomorphismPolicy;
use quarry_coder::neighbourhood::NeighbourhoodCoder;
use quarry_store::model::{Model, ModelVersion};

use crate::activation_store::ActivationStore;
use crate::cancel::CancellationToken;
use crate::contract::{ObjectiveOracle, TransformationSource};
use crate::equivalence::{EquivalenceClassStore, Submission};
use crate::error::ExplorationError;
use crate::objective_queue::ObjectivePriorityQueue;
use crate::outcome::{ExplorationOutcome, StoppedReasonV1};
use crate::policy::ExplorationPolicyV1;
use crate::solution_store::SolutionStore;
use crate::trace::{ExplorationTracer, NoopTracer};
use crate::trajectory::Trajectory;

/// Frontier-driven strategy with greedy descent.
pub struct BestFirstStrategy<S: TransformationSource, O: ObjectiveOracle> {
    model: Model,
    source: S,
    oracle: O,
    policy: ExplorationPolicyV1,
    coder: NeighbourhoodCoder,
    cancel: CancellationToken,
    tracer: Box<dyn ExplorationTracer>,
    activations: ActivationStore<S::Activation>,
    equivalence: EquivalenceClassStore,
    solutions: SolutionStore,
    frontier: ObjectivePriorityQueue<O::Fitness>,
    rng: StdRng,
    /// The committed version the model currently sits at.
    current: ModelVersion,
    /// Frontier entry to expand next when greedy descent is under way.
    selected: Option<u64>,
    individuals: Vec<u32>,
    started: bool,
    steps_fired: u64,
    states_visited: u64,
    duplicates_pruned: u64,
}

impl<S: TransformationSource, O: ObjectiveOracle> BestFirstStrategy<S, O> {
    /// Start an exploration at the committed version `initial`.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorationError::InvalidPolicy`] if the policy fails
    /// pre-flight validation.
    ///
    /// # Panics
    ///
    /// Panics if the model has uncommitted changes, or if `initial` was
    /// not committed by `model` (contract faults).
    pub fn start_exploration(
        mut model: Model,
        source: S,
        oracle: O,
        policy: ExplorationPolicyV1,
        initial: ModelVersion,
        seed: u64,
    ) -> Result<Self, ExplorationError> {
        policy.validate()?;
        assert!(
            !model.has_uncommitted_changes(),
            "exploration requires committed state, but the model has uncommitted changes"
        );
        model.restore(&initial);
        let solutions = SolutionStore::bounded(policy.max_solutions);
        Ok(Self {
            model,
            source,
            oracle,
            policy,
            coder: NeighbourhoodCoder::new(seed),
            cancel: CancellationToken::new(),
            tracer: Box::new(NoopTracer),
            activations: ActivationStore::new(),
            equivalence: EquivalenceClassStore::with_undecided_policy(),
            solutions,
            frontier: ObjectivePriorityQueue::new(),
            rng: StdRng::seed_from_u64(seed),
            current: initial,
            selected: None,
            individuals: Vec::new(),
            started: false,
            steps_fired: 0,
            states_visited: 0,
            duplicates_pruned: 0,
        })
    }

    /// The probabilistic-restart worker variant: isomorphism pruning is
    /// forced on; `policy.restart_probability_percent` sets the restart
    /// chance.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorationError::InvalidPolicy`] if the policy fails
    /// pre-flight validation.
    pub fn worker(
        model: Model,
        source: S,
        oracle: O,
        mut policy: ExplorationPolicyV1,
        initial: ModelVersion,
        seed: u64,
    ) -> Result<Self, ExplorationError> {
        policy.prune_isomorphic = true;
        Self::start_exploration(model, source, oracle, policy, initial, seed)
    }

    /// A token that cancels this exploration when set.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Replace the observational tracer.
    pub fn set_tracer(&mut self, tracer: Box<dyn ExplorationTracer>) {
        self.tracer = tracer;
    }

    /// Replace the supplementary isomorphism policy.
    pub fn set_isomorphism_policy(&mut self, policy: Box<dyn IsomorphismPolicy>) {
        self.equivalence.set_policy(policy);
    }

    /// Nodes the coder pre-seeds with distinct codes, so they can never
    /// be conflated with any other node.
    pub fn set_individuals(&mut self, individuals: Vec<u32>) {
        self.individuals = individuals;
    }

    /// The recorded solutions.
    #[must_use]
    pub fn solutions(&self) -> &SolutionStore {
        &self.solutions
    }

    /// The model, always at a committed version between `explore` calls.
    #[must_use]
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Consume the strategy, handing the model back.
    #[must_use]
    pub fn into_model(self) -> Model {
        self.model
    }

    fn outcome(&self, reason: StoppedReasonV1) -> ExplorationOutcome {
        ExplorationOutcome {
            reason,
            solutions_found: self.solutions.len(),
            steps_fired: self.steps_fired,
            states_visited: self.states_visited,
            duplicates_pruned: self.duplicates_pruned,
        }
    }

    /// Seed the frontier with the initial state.
    fn start(&mut self) {
        let initial = self.current.clone();
        let code = self.coder.code(&self.model, &self.individuals).model_code;
        if self.equivalence.submit(code, initial.clone()) == Submission::New {
            self.states_visited += 1;
            self.tracer.state_added(&initial, code);
        }
        let fitness = self.oracle.measure(&self.model);
        let is_solution = self.oracle.satisfies_hard_objectives(&fitness);
        if is_solution && self.solutions.record(initial.clone(), Trajectory::new(initial.clone()))
        {
            self.tracer.solution_added(&initial);
        }
        if !(is_solution && self.policy.backtrack_on_solution) {
            self.frontier.push(Trajectory::new(initial), fitness);
        }
    }

    /// Pick the frontier entry to expand: a pending greedy descent, the
    /// best entry, or — with the restart probability — a random one.
    fn choose_entry(&mut self) -> Option<u64> {
        if let Some(id) = self.selected.take() {
            if self.frontier.get(id).is_some() {
                return Some(id);
            }
        }
        if self.frontier.is_empty() {
            return None;
        }
        let restart = self.policy.restart_probability_percent > 0
            && self.rng.gen_range(0..100u8) < self.policy.restart_probability_percent;
        if restart {
            self.frontier.random(&mut self.rng).map(|entry| entry.id)
        } else {
            self.frontier
                .best(|a, b| self.oracle.compare(a, b))
                .map(|entry| entry.id)
        }
    }

    /// Run to exhaustion, the solution bound, or cancellation.
    #[allow(clippy::too_many_lines)]
    pub fn explore(&mut self) -> ExplorationOutcome {
        if !self.started {
            self.started = true;
            self.start();
        }
        loop {
            if self.cancel.is_cancelled() {
                return self.outcome(StoppedReasonV1::Cancelled);
            }
            if self.solutions.has_enough_solutions() {
                return self.outcome(StoppedReasonV1::SolutionLimit);
            }

            let Some(entry_id) = self.choose_entry() else {
                return self.outcome(StoppedReasonV1::Exhausted);
            };
            let Some(entry) = self.frontier.get(entry_id) else {
                continue;
            };
            let parent_version = entry.trajectory.last().clone();
            let parent_fitness = entry.fitness.clone();
            let parent_trajectory = entry.trajectory.clone();

            // Resume the trajectory's state.
            if self.current != parent_version {
                self.model.restore(&parent_version);
                self.current = parent_version.clone();
            }

            self.activations
                .visit(&parent_version, || self.source.activations(&self.model));
            let Some(activation) = self.activations.next_untried(&parent_version) else {
                self.frontier.remove(entry_id);
                continue;
            };
            if self.activations.is_exhausted(&parent_version) {
                // Its last untried activation is being fired now.
                self.frontier.remove(entry_id);
            }

            if !self.source.fire(&activation, &mut self.model) {
                self.model.restore(&parent_version);
                continue;
            }

            let version = self.model.commit();
            self.current = version.clone();
            self.steps_fired += 1;
            self.tracer.transition_added(&parent_version, &version);

            let code = self.coder.code(&self.model, &self.individuals).model_code;
            if self.equivalence.submit(code, version.clone()) == Submission::New {
                self.states_visited += 1;
                self.tracer.state_added(&version, code);
            } else if self.policy.prune_isomorphic {
                self.duplicates_pruned += 1;
                continue;
            }

            if !self.oracle.check_constraints(&self.model) {
                continue;
            }

            let trajectory = parent_trajectory.child(version.clone());
            let fitness = self.oracle.measure(&self.model);
            if self.oracle.satisfies_hard_objectives(&fitness) {
                if self.solutions.record(version.clone(), trajectory.clone()) {
                    self.tracer.solution_added(&version);
                }
                if self.solutions.has_enough_solutions() {
                    return self.outcome(StoppedReasonV1::SolutionLimit);
                }
                if self.policy.backtrack_on_solution {
                    continue;
                }
            }

            if trajectory.depth() >= self.policy.max_depth {
                continue;
            }

            let child_id = self.frontier.push(trajectory, fitness.clone());
            match self.oracle.compare(&fitness, &parent_fitness) {
                Ordering::Greater => self.selected = Some(child_id),
                Ordering::Equal if self.policy.continue_on_equal_fitness => {
                    self.selected = Some(child_id);
                }
                Ordering::Less | Ordering::Equal => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_store::map::StoreStrategy;
    use quarry_store::symbol::{Symbol, SymbolId};
    use quarry_store::tuple::{Tuple, Value};

    const N: SymbolId = SymbolId(0);

    struct CounterSource {
        limit: i64,
        increments: Vec<i64>,
    }

    impl TransformationSource for CounterSource {
        type Activation = i64;

        fn activations(&mut self, model: &Model) -> Vec<i64> {
            let n = read_n(model);
            self.increments
                .iter()
                .copied()
                .filter(|k| (0..=self.limit).contains(&(n + k)))
                .collect()
        }

        fn fire(&mut self, activation: &i64, model: &mut Model) -> bool {
            let n = read_n(model);
            if !(0..=self.limit).contains(&(n + activation)) {
                return false;
            }
            model.put(N, Tuple::empty(), Value::Int(n + activation));
            true
        }
    }

    struct CounterOracle {
        target: i64,
    }

    impl ObjectiveOracle for CounterOracle {
        type Fitness = i64;

        fn measure(&self, model: &Model) -> i64 {
            read_n(model)
        }

        fn compare(&self, a: &i64, b: &i64) -> Ordering {
            a.cmp(b)
        }

        fn satisfies_hard_objectives(&self, fitness: &i64) -> bool {
            *fitness == self.target
        }
    }

    fn read_n(model: &Model) -> i64 {
        match model.get(N, &Tuple::empty()) {
            Value::Int(n) => n,
            Value::Bool(_) => 0,
        }
    }

    fn strategy(
        limit: i64,
        target: i64,
        increments: &[i64],
        policy: ExplorationPolicyV1,
    ) -> BestFirstStrategy<CounterSource, CounterOracle> {
        let mut model = Model::new(vec![Symbol::counter("n")], StoreStrategy::State);
        let initial = model.commit();
        BestFirstStrategy::start_exploration(
            model,
            CounterSource {
                limit,
                increments: increments.to_vec(),
            },
            CounterOracle { target },
            policy,
            initial,
            17,
        )
        .expect("valid policy")
    }

    #[test]
    fn greedy_descent_reaches_the_target() {
        let mut search = strategy(5, 5, &[1, 2], ExplorationPolicyV1::default());
        let outcome = search.explore();
        assert_eq!(outcome.reason, StoppedReasonV1::SolutionLimit);
        assert_eq!(outcome.solutions_found, 1);
        assert!(!search.model().has_uncommitted_changes());
    }

    #[test]
    fn fitness_is_monotone_along_the_greedy_solution_path() {
        let mut search = strategy(6, 6, &[1, 2, 3], ExplorationPolicyV1::default());
        let outcome = search.explore();
        assert_eq!(outcome.reason, StoppedReasonV1::SolutionLimit);

        let trajectory = search.solutions().solutions()[0].trajectory.clone();
        let mut model = search.into_model();
        let mut previous = i64::MIN;
        for version in trajectory.versions() {
            model.restore(version);
            let fitness = read_n(&model);
            assert!(fitness >= previous, "greedy descent fitness regressed");
            previous = fitness;
        }
    }

    #[test]
    fn worse_children_join_the_frontier_and_get_expanded_later() {
        // Reaching 3 with increments {+2, -1} forces the search through a
        // worse (-1) step: 0 → 2 → 1 → 3.
        let mut search = strategy(3, 3, &[2, -1], ExplorationPolicyV1::default());
        let outcome = search.explore();
        assert_eq!(outcome.reason, StoppedReasonV1::SolutionLimit);
        assert_eq!(outcome.solutions_found, 1);
        let depth = search.solutions().solutions()[0].trajectory.depth();
        assert!(depth >= 3, "solution path must pass through the worse state");
    }

    #[test]
    fn frontier_exhaustion_is_an_ordinary_outcome() {
        let mut search = strategy(2, 9, &[1], ExplorationPolicyV1::default());
        let outcome = search.explore();
        assert_eq!(outcome.reason, StoppedReasonV1::Exhausted);
        assert_eq!(outcome.solutions_found, 0);
        assert_eq!(outcome.states_visited, 3, "n = 0, 1, 2");
    }

    #[test]
    fn worker_restarts_still_find_the_target() {
        let mut model = Model::new(vec![Symbol::counter("n")], StoreStrategy::State);
        let initial = model.commit();
        let policy = ExplorationPolicyV1 {
            restart_probability_percent: 50,
            ..ExplorationPolicyV1::default()
        };
        let mut search = BestFirstStrategy::worker(
            model,
            CounterSource {
                limit: 4,
                increments: vec![1],
            },
            CounterOracle { target: 4 },
            policy,
            initial,
            23,
        )
        .expect("valid policy");
        let outcome = search.explore();
        assert_eq!(outcome.reason, StoppedReasonV1::SolutionLimit);
        assert_eq!(outcome.solutions_found, 1);
    }

    #[test]
    fn pre_cancelled_run_stops_cleanly() {
        let mut search = strategy(3, 3, &[1], ExplorationPolicyV1::default());
        search.cancellation_token().cancel();
        let outcome = search.explore();
        assert_eq!(outcome.reason, StoppedReasonV1::Cancelled);
        assert_eq!(outcome.steps_fired, 0);
    }

    #[test]
    fn initial_solution_short_circuits() {
        let mut search = strategy(3, 0, &[1], ExplorationPolicyV1::default());
        let outcome = search.explore();
        assert_eq!(outcome.reason, StoppedReasonV1::SolutionLimit);
        assert_eq!(outcome.solutions_found, 1);
        assert_eq!(outcome.steps_fired, 0, "the initial state already satisfies");
    }
}
