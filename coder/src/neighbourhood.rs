//! Iterative neighbourhood-hash refinement.
//!
//! Every node's code is recomputed each round from the previous round's
//! codes of its tuple neighbours, positionally weighted by per-symbol
//! impact values. Refinement stops as soon as the number of distinct codes
//! stops increasing — the partition only ever refines and is bounded by
//! the node count, so the loop always terminates.
//!
//! **Exactly one place defines the mixing function** ([`mix64`]): every
//! hash in the coder routes through it so determinism is auditable in one
//! spot.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use quarry_store::model::Model;
use quarry_store::symbol::SymbolId;
use quarry_store::tuple::Value;

use crate::object_code::ObjectCode;

/// Domain tags folded into hashes so unrelated inputs cannot collide by
/// construction.
const TAG_SYMBOL: u64 = 0x71AA_0001;
const TAG_BOOL: u64 = 0x71AA_0002;
const TAG_INT: u64 = 0x71AA_0003;
const TAG_INDIVIDUAL: u64 = 0x71AA_0004;
const TAG_NULLARY: u64 = 0x71AA_0005;

/// SplitMix64 step: the pinned 64-bit mixer.
///
/// A bijection on `u64`, so distinct inputs keep distinct images.
const fn mix64(value: u64) -> u64 {
    let mut x = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

fn hash_value(value: Value) -> u64 {
    match value {
        Value::Bool(b) => mix64(TAG_BOOL ^ u64::from(b)),
        Value::Int(i) => mix64(TAG_INT ^ u64::from_le_bytes(i.to_le_bytes())),
    }
}

/// One positive-arity relation entry, flattened for the round loop.
struct TupleEntry {
    /// Index into the impact-weight table (symbol order).
    symbol: usize,
    nodes: Box<[u32]>,
    value_hash: u64,
}

/// Result of coding one committed model state.
#[derive(Clone, Debug)]
pub struct StateCodeResult {
    /// The 32-bit model state code.
    pub model_code: u32,
    /// Final per-node codes.
    pub node_codes: ObjectCode,
    /// Refinement rounds run before the distinct-code count stabilized.
    pub rounds: u32,
}

/// The refinement driver. Cheap to construct; all state lives per call.
#[derive(Clone, Copy, Debug)]
pub struct NeighbourhoodCoder {
    seed: u64,
}

impl NeighbourhoodCoder {
    /// Construct a coder with the given impact-weight seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// The impact-weight seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Code the current content of `model`.
    ///
    /// `individuals` are pre-seeded with distinct codes so they can never
    /// be conflated with any other node. The model's uncommitted view is
    /// read as-is; callers that need the code of a *version* restore it
    /// first.
    #[must_use]
    pub fn code(&self, model: &Model, individuals: &[u32]) -> StateCodeResult {
        // One pseudorandom impact weight per argument position, drawn in
        // symbol order from the seeded generator. Weights are forced odd
        // so multiplication never collapses a code to 0.
        let mut rng = StdRng::seed_from_u64(self.seed);
        let impacts: Vec<Vec<u64>> = model
            .symbols()
            .iter()
            .map(|symbol| (0..symbol.arity()).map(|_| rng.gen::<u64>() | 1).collect())
            .collect();

        // Separate nullary relations from positive-arity ones.
        let mut nullary_acc = mix64(TAG_NULLARY);
        let mut entries: Vec<TupleEntry> = Vec::new();
        for (index, symbol) in model.symbols().iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let id = SymbolId(index as u32);
            let symbol_hash = mix64(TAG_SYMBOL ^ index as u64);
            if symbol.arity() == 0 {
                for (_, value) in model.entries(id) {
                    nullary_acc = mix64(nullary_acc ^ symbol_hash ^ hash_value(*value));
                }
            } else {
                for (tuple, value) in model.entries(id) {
                    entries.push(TupleEntry {
                        symbol: index,
                        nodes: tuple.nodes().collect(),
                        value_hash: mix64(symbol_hash ^ hash_value(*value)),
                    });
                }
            }
        }

        // The node universe: everything mentioned by a tuple, plus the
        // individuals.
        let mut mentioned: Vec<u32> = entries
            .iter()
            .flat_map(|entry| entry.nodes.iter().copied())
            .chain(individuals.iter().copied())
            .collect();
        mentioned.sort_unstable();
        mentioned.dedup();

        let node_limit = mentioned.last().map_or(0, |&n| n as usize + 1);
        let mut tuples_of: Vec<Vec<usize>> = vec![Vec::new(); node_limit];
        for (entry_index, entry) in entries.iter().enumerate() {
            for &node in &entry.nodes {
                let slots = &mut tuples_of[node as usize];
                if slots.last() != Some(&entry_index) {
                    slots.push(entry_index);
                }
            }
        }

        let mut codes = ObjectCode::new();
        for &node in individuals {
            codes.set(node, mix64(TAG_INDIVIDUAL ^ u64::from(node)));
        }

        let mut rounds = 0;
        let mut distinct = distinct_codes(&codes, &mentioned);
        // The first round recomputes every node so tuple content enters
        // the codes even when the initial partition is already discrete;
        // later rounds freeze unique codes and shrink to the
        // still-ambiguous region.
        let mut targets: Vec<u32> = mentioned.clone();
        while !targets.is_empty() && (rounds as usize) < mentioned.len() {
            let mut next = codes.clone();
            for &node in &targets {
                let mut code = mix64(codes.get(node));
                for &entry_index in &tuples_of[node as usize] {
                    let entry = &entries[entry_index];
                    let tuple = tuple_hash(entry, &codes, &impacts[entry.symbol]);
                    for (position, &occupant) in entry.nodes.iter().enumerate() {
                        if occupant == node {
                            code = code.wrapping_add(mix64(
                                tuple ^ impacts[entry.symbol][position],
                            ));
                        }
                    }
                }
                next.set(node, code);
            }
            rounds += 1;
            let next_distinct = distinct_codes(&next, &mentioned);
            codes = next;
            if next_distinct <= distinct {
                break;
            }
            distinct = next_distinct;
            targets = ambiguous_nodes(&codes, &mentioned);
        }

        // Model code: nullary values folded with an order-independent
        // aggregate of the final node codes.
        let mut aggregate: u64 = 0;
        for &node in &mentioned {
            aggregate = aggregate.wrapping_add(mix64(codes.get(node)));
        }
        let folded = mix64(nullary_acc ^ aggregate);
        #[allow(clippy::cast_possible_truncation)]
        let model_code = (folded ^ (folded >> 32)) as u32;

        StateCodeResult {
            model_code,
            node_codes: codes,
            rounds,
        }
    }
}

/// Hash one tuple from the previous round's neighbour codes.
fn tuple_hash(entry: &TupleEntry, codes: &ObjectCode, impacts: &[u64]) -> u64 {
    let mut hash = entry.value_hash;
    for (position, &node) in entry.nodes.iter().enumerate() {
        hash = hash.wrapping_add(mix64(codes.get(node)).wrapping_mul(impacts[position]));
    }
    // A node occurring at several positions folds one extra mix per
    // repeat, so self-referencing tuples hash apart from the
    // distinct-node case even when the neighbour codes agree.
    for (position, &node) in entry.nodes.iter().enumerate() {
        if entry.nodes[..position].contains(&node) {
            hash = mix64(hash);
        }
    }
    hash
}

fn distinct_codes(codes: &ObjectCode, mentioned: &[u32]) -> usize {
    let mut seen: Vec<u64> = mentioned.iter().map(|&n| codes.get(n)).collect();
    seen.sort_unstable();
    seen.dedup();
    seen.len()
}

fn ambiguous_nodes(codes: &ObjectCode, mentioned: &[u32]) -> Vec<u32> {
    let mut by_code: Vec<(u64, u32)> = mentioned.iter().map(|&n| (codes.get(n), n)).collect();
    by_code.sort_unstable();
    let mut ambiguous = Vec::new();
    let mut index = 0;
    while index < by_code.len() {
        let mut end = index + 1;
        while end < by_code.len() && by_code[end].0 == by_code[index].0 {
            end += 1;
        }
        if end - index > 1 {
            for &(_, node) in &by_code[index..end] {
                ambiguous.push(node);
            }
        }
        index = end;
    }
    ambiguous.sort_unstable();
    ambiguous
}
