//! Depth-first exploration: a single branch, backtracking through the
//! version history.
//!
//! The loop walks one trajectory. At each committed state it checks
//! cancellation, the constraint gate, the objectives, and the depth
//! budget, then fires the next untried activation; when a state is spent
//! it backtracks by restoring the previous version. Newly committed
//! states are submitted to the equivalence store and — with pruning
//! enabled — duplicates of a visited class are abandoned immediately.
//!
//! Every stop is an ordinary [`ExplorationOutcome`]; the model is always
//! left at a committed version with no uncommitted edits.

use quarry_coder::classify::IsomorphismPolicy;
use quarry_coder::neighbourhood::NeighbourhoodCoder;
use quarry_store::model::{Model, ModelVersion};

use crate::activation_store::ActivationStore;
use crate::cancel::CancellationToken;
use crate::contract::{ObjectiveOracle, TransformationSource};
use crate::equivalence::{EquivalenceClassStore, Submission};
use crate::error::ExplorationError;
use crate::outcome::{ExplorationOutcome, StoppedReasonV1};
use crate::policy::ExplorationPolicyV1;
use crate::solution_store::SolutionStore;
use crate::trace::{ExplorationTracer, NoopTracer};
use crate::trajectory::Trajectory;

/// Single-branch backtracking strategy.
pub struct DepthFirstStrategy<S: TransformationSource, O: ObjectiveOracle> {
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
    trajectory: Trajectory,
    individuals: Vec<u32>,
    started: bool,
    steps_fired: u64,
    states_visited: u64,
    duplicates_pruned: u64,
}

impl<S: TransformationSource, O: ObjectiveOracle> DepthFirstStrategy<S, O> {
    /// Start an exploration at the committed version `initial`.
    ///
    /// The model is restored to `initial`, which doubles as the contract
    /// check that the version belongs to this model.
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
            trajectory: Trajectory::new(initial),
            individuals: Vec::new(),
            started: false,
            steps_fired: 0,
            states_visited: 0,
            duplicates_pruned: 0,
        })
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

    /// Pop the trajectory and restore the previous version. `false` when
    /// the history is exhausted (the initial state has no parent).
    fn backtrack(&mut self) -> bool {
        if self.trajectory.pop().is_none() {
            return false;
        }
        let target = self.trajectory.last().clone();
        self.model.restore(&target);
        true
    }

    /// Register the state the model currently sits at.
    fn register_current_state(&mut self) -> Submission {
        let code = self.coder.code(&self.model, &self.individuals).model_code;
        let version = self.trajectory.last().clone();
        let submission = self.equivalence.submit(code, version.clone());
        if submission == Submission::New {
            self.states_visited += 1;
            self.tracer.state_added(&version, code);
        }
        submission
    }

    /// Run to exhaustion, the solution bound, or cancellation.
    pub fn explore(&mut self) -> ExplorationOutcome {
        if !self.started {
            self.started = true;
            let _ = self.register_current_state();
        }
        loop {
            if self.cancel.is_cancelled() {
                return self.outcome(StoppedReasonV1::Cancelled);
            }

            if !self.oracle.check_constraints(&self.model) {
                if self.backtrack() {
                    continue;
                }
                return self.outcome(StoppedReasonV1::Exhausted);
            }

            let fitness = self.oracle.measure(&self.model);
            if self.oracle.satisfies_hard_objectives(&fitness) {
                let version = self.trajectory.last().clone();
                if self.solutions.record(version.clone(), self.trajectory.clone()) {
                    self.tracer.solution_added(&version);
                    if self.solutions.has_enough_solutions() {
                        return self.outcome(StoppedReasonV1::SolutionLimit);
                    }
                    if self.policy.backtrack_on_solution {
                        if self.backtrack() {
                            continue;
                        }
                        return self.outcome(StoppedReasonV1::Exhausted);
                    }
                }
            }

            if self.trajectory.depth() >= self.policy.max_depth {
                if self.backtrack() {
                    continue;
                }
                return self.outcome(StoppedReasonV1::Exhausted);
            }

            // Find an untried activation, backtracking through spent
            // states; the run is exhausted when the history runs out.
            let activation = loop {
                if self.cancel.is_cancelled() {
                    return self.outcome(StoppedReasonV1::Cancelled);
                }
                let current = self.trajectory.last().clone();
                self.activations
                    .visit(&current, || self.source.activations(&self.model));
                if let Some(activation) = self.activations.next_untried(&current) {
                    break activation;
                }
                if !self.backtrack() {
                    return self.outcome(StoppedReasonV1::Exhausted);
                }
            };

            let parent = self.trajectory.last().clone();
            if !self.source.fire(&activation, &mut self.model) {
                // Stale activation: drop whatever it half-wrote.
                self.model.restore(&parent);
                continue;
            }

            let version = self.model.commit();
            self.steps_fired += 1;
            self.tracer.transition_added(&parent, &version);
            self.trajectory.push(version);

            if self.register_current_state() != Submission::New
                && self.policy.prune_isomorphic
            {
                self.duplicates_pruned += 1;
                if !self.backtrack() {
                    return self.outcome(StoppedReasonV1::Exhausted);
                }
            }
        }
    }
}
