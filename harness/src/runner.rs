//! Runner: world-level orchestration of one exploration.
//!
//! The runner builds the model from the world's schema, seeds and commits
//! the initial state, drives the chosen strategy to completion, and
//! packages the outcome together with the recorded transcript. It holds
//! no search logic of its own.

use quarry_search::best_first::BestFirstStrategy;
use quarry_search::depth_first::DepthFirstStrategy;
use quarry_search::error::ExplorationError;
use quarry_search::outcome::ExplorationOutcome;
use quarry_search::policy::ExplorationPolicyV1;
use quarry_search::solution_store::SolutionRecordV1;
use quarry_store::map::StoreStrategy;
use quarry_store::model::{Model, ModelVersion};

use crate::contract::ExplorationWorldV1;
use crate::transcript::{TranscriptRecorder, TranscriptV1};

/// Everything one run produced.
pub struct RunReportV1 {
    pub world_id: String,
    pub outcome: ExplorationOutcome,
    pub solutions: Vec<SolutionRecordV1>,
    pub transcript: TranscriptV1,
}

/// Which strategy a run uses.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StrategyKindV1 {
    DepthFirst,
    BestFirst,
    /// Best-first with probabilistic restarts and forced pruning.
    BestFirstWorker,
}

fn build_initial<W: ExplorationWorldV1>(
    world: &W,
    store: StoreStrategy,
) -> (Model, ModelVersion) {
    let mut model = Model::new(world.symbols(), store);
    world.seed_initial_state(&mut model);
    let initial = model.commit();
    (model, initial)
}

/// Run `world` to completion with the given strategy kind.
///
/// # Errors
///
/// Returns [`ExplorationError`] from pre-flight policy validation.
pub fn run<W: ExplorationWorldV1>(
    world: &W,
    kind: StrategyKindV1,
    store: StoreStrategy,
    policy: ExplorationPolicyV1,
    seed: u64,
) -> Result<RunReportV1, ExplorationError> {
    let (model, initial) = build_initial(world, store);
    let recorder = TranscriptRecorder::new();

    let (outcome, solutions) = match kind {
        StrategyKindV1::DepthFirst => {
            let mut strategy = DepthFirstStrategy::start_exploration(
                model,
                world.source(),
                world.oracle(),
                policy,
                initial,
                seed,
            )?;
            strategy.set_tracer(Box::new(recorder.clone()));
            let outcome = strategy.explore();
            (outcome, strategy.solutions().solutions().to_vec())
        }
        StrategyKindV1::BestFirst => {
            let mut strategy = BestFirstStrategy::start_exploration(
                model,
                world.source(),
                world.oracle(),
                policy,
                initial,
                seed,
            )?;
            strategy.set_tracer(Box::new(recorder.clone()));
            let outcome = strategy.explore();
            (outcome, strategy.solutions().solutions().to_vec())
        }
        StrategyKindV1::BestFirstWorker => {
            let mut strategy = BestFirstStrategy::worker(
                model,
                world.source(),
                world.oracle(),
                policy,
                initial,
                seed,
            )?;
            strategy.set_tracer(Box::new(recorder.clone()));
            let outcome = strategy.explore();
            (outcome, strategy.solutions().solutions().to_vec())
        }
    };

    Ok(RunReportV1 {
        world_id: world.world_id().to_string(),
        outcome,
        solutions,
        transcript: recorder.finish(world.world_id()),
    })
}
