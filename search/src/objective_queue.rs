//! `ObjectivePriorityQueue`: the best-first frontier.
//!
//! Entries pair a trajectory with the fitness measured at its last
//! version, ranked by an injected comparator supplied per query. The
//! queue supports best-selection, uniform random-selection (for
//! probabilistic restarts), and removal of a specific entry once its
//! state's activations are exhausted — a combination a `BinaryHeap`
//! cannot offer, so a scanned `Vec` carries the frontier instead. Ties
//! under the comparator fall back to the oldest insertion id, keeping
//! selection deterministic.

use std::cmp::Ordering;

use rand::rngs::StdRng;
use rand::Rng;

use crate::trajectory::Trajectory;

/// One frontier entry.
#[derive(Clone, Debug)]
pub struct QueueEntry<F> {
    /// Insertion id: unique, monotone, used for deterministic tie-breaks.
    pub id: u64,
    pub trajectory: Trajectory,
    /// Fitness measured at the trajectory's last version.
    pub fitness: F,
}

/// Frontier of visited-but-not-fully-expanded states.
pub struct ObjectivePriorityQueue<F> {
    entries: Vec<QueueEntry<F>>,
    next_id: u64,
    high_water: usize,
}

impl<F: Clone> ObjectivePriorityQueue<F> {
    /// An empty frontier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            high_water: 0,
        }
    }

    /// Enqueue a trajectory with its fitness; returns the entry id.
    pub fn push(&mut self, trajectory: Trajectory, fitness: F) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(QueueEntry {
            id,
            trajectory,
            fitness,
        });
        self.high_water = self.high_water.max(self.entries.len());
        id
    }

    /// The fittest entry under `compare` (`Greater` = fitter); ties go to
    /// the oldest id.
    pub fn best(&self, mut compare: impl FnMut(&F, &F) -> Ordering) -> Option<&QueueEntry<F>> {
        self.entries.iter().reduce(|best, entry| {
            match compare(&entry.fitness, &best.fitness) {
                Ordering::Greater => entry,
                _ => best,
            }
        })
    }

    /// A uniformly random entry.
    pub fn random(&self, rng: &mut StdRng) -> Option<&QueueEntry<F>> {
        if self.entries.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.entries.len());
        Some(&self.entries[index])
    }

    /// Look an entry up by id.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<&QueueEntry<F>> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Remove and return the entry with `id`.
    pub fn remove(&mut self, id: u64) -> Option<QueueEntry<F>> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index))
    }

    /// Current frontier size.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the frontier is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// High-water mark of the frontier size.
    #[must_use]
    pub fn high_water(&self) -> usize {
        self.high_water
    }
}

impl<F: Clone> Default for ObjectivePriorityQueue<F> {
    fn default() -> Self {
        Self::new()
    }
}
