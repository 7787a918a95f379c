//! `Tuple` and `Value`: the shared vocabulary of relation entries.
//!
//! A relation of arity `n` maps `Tuple`s of `n` node ids to `Value`s.
//! Node ids are small non-negative integers assigned by whoever builds the
//! model; the store itself never invents ids.
//!
//! # Canonical ordering
//!
//! Both types derive `Ord`. Tuples order lexicographically by their node
//! ids, which makes `BTreeMap`/`OrdMap` iteration deterministic — every
//! enumeration boundary in the workspace relies on that.

use std::fmt;

/// An ordered tuple of node ids: the key of one relation entry.
///
/// Arity 0 (the empty tuple) keys nullary relations, which behave as
/// single model-global values.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tuple(Box<[u32]>);

impl Tuple {
    /// The empty tuple, key of every nullary relation entry.
    #[must_use]
    pub fn empty() -> Self {
        Self(Box::new([]))
    }

    /// Construct a tuple from node ids.
    #[must_use]
    pub fn new(nodes: &[u32]) -> Self {
        Self(nodes.into())
    }

    /// Construct the arity-1 tuple `(n)`.
    #[must_use]
    pub fn of1(n: u32) -> Self {
        Self(Box::new([n]))
    }

    /// Construct the arity-2 tuple `(a, b)`.
    #[must_use]
    pub fn of2(a: u32, b: u32) -> Self {
        Self(Box::new([a, b]))
    }

    /// Number of node positions.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.0.len()
    }

    /// Node id at `position`. Panics if out of bounds.
    #[must_use]
    pub fn get(&self, position: usize) -> u32 {
        self.0[position]
    }

    /// Iterate the node ids in position order.
    pub fn nodes(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Debug for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tuple(")?;
        for (i, n) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{n}")?;
        }
        write!(f, ")")
    }
}

/// A relation value.
///
/// `Bool(false)` is the conventional default for relations (an absent
/// tuple reads as `FALSE`); `Int` carries counters and nullary scalars.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Value {
    Bool(bool),
    Int(i64),
}

impl Value {
    /// Shorthand for `Value::Bool(true)`.
    pub const TRUE: Self = Self::Bool(true);

    /// Shorthand for `Value::Bool(false)`.
    pub const FALSE: Self = Self::Bool(false);
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
        }
    }
}
