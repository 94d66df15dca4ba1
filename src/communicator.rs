//! Collective reductions among cooperating workers.
//!
//! Every norm evaluation takes an explicit [`Communicator`] handle. Each worker owns a disjoint
//! block of mesh cells ([`CellPartition`]), computes a local partial result, and combines it with
//! the results of the other workers through exactly one [`Communicator::all_reduce`] call.
use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::Arc;

/// Reduction operations supported by [`Communicator::all_reduce`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReduceOp {
    Sum,
    /// The maximum. Unlike [`f64::max`], NaN is propagated.
    Max,
}

impl ReduceOp {
    /// Combines two values.
    pub fn apply(&self, a: f64, b: f64) -> f64 {
        match self {
            Self::Sum => a + b,
            Self::Max => nan_propagating_max(a, b),
        }
    }

    /// The value `x` for which `apply(x, b) == b` for all `b`.
    pub fn identity(&self) -> f64 {
        match self {
            Self::Sum => 0.0,
            Self::Max => f64::NEG_INFINITY,
        }
    }

    /// Folds the values in order, starting from the identity.
    pub fn fold(&self, values: impl IntoIterator<Item = f64>) -> f64 {
        values
            .into_iter()
            .fold(self.identity(), |acc, value| self.apply(acc, value))
    }
}

/// The maximum of `a` and `b`, or NaN if either is NaN.
pub fn nan_propagating_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

/// A handle to a group of cooperating workers.
///
/// `all_reduce` is collective: every worker in the group must call it, with the same operation,
/// the same number of times. It blocks until all workers have contributed, after which every
/// worker observes the same reduced value.
pub trait Communicator {
    /// The index of this worker, in `0..size()`.
    fn rank(&self) -> usize;

    /// The number of workers in the group.
    fn size(&self) -> usize;

    /// Combines `value` with the values of all other workers using `op`.
    ///
    /// # Panics
    ///
    /// Implementations may panic if the workers disagree on `op`.
    fn all_reduce(&self, value: f64, op: ReduceOp) -> f64;

    fn all_reduce_sum(&self, value: f64) -> f64 {
        self.all_reduce(value, ReduceOp::Sum)
    }

    fn all_reduce_max(&self, value: f64) -> f64 {
        self.all_reduce(value, ReduceOp::Max)
    }
}

/// A communicator consisting of a single worker.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SelfCommunicator;

impl Communicator for SelfCommunicator {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn all_reduce(&self, value: f64, _op: ReduceOp) -> f64 {
        value
    }
}

#[derive(Debug)]
struct ReductionRound {
    // Incremented every time a reduction completes
    generation: u64,
    op: Option<ReduceOp>,
    contributions: Vec<Option<f64>>,
    arrived: usize,
    result: f64,
    // Set when a worker violates the collective contract. Permanent, since the group can no
    // longer agree on how many reductions have taken place
    poisoned: Option<String>,
}

#[derive(Debug)]
struct SharedReduction {
    round: Mutex<ReductionRound>,
    completed: Condvar,
}

/// A communicator for a group of workers living on separate threads of the same process.
///
/// Handles are created together with [`ThreadCommunicator::group`] and each one is moved to the
/// thread acting as the worker of that rank. Contributions are folded in rank order, so the
/// reduced value does not depend on the order in which threads arrive.
///
/// If a worker calls [`Communicator::all_reduce`] with an operation that differs from the one
/// of the other workers in the same round, or contributes twice to a round, every worker of the
/// group panics, including those already waiting for the round to complete. Any later reduction
/// on the group panics as well.
#[derive(Debug, Clone)]
pub struct ThreadCommunicator {
    rank: usize,
    size: usize,
    shared: Arc<SharedReduction>,
}

impl ThreadCommunicator {
    /// Creates handles for a group of `size` workers, ordered by rank.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn group(size: usize) -> Vec<Self> {
        assert!(size > 0, "a communicator group must have at least one worker");
        let shared = Arc::new(SharedReduction {
            round: Mutex::new(ReductionRound {
                generation: 0,
                op: None,
                contributions: vec![None; size],
                arrived: 0,
                result: 0.0,
                poisoned: None,
            }),
            completed: Condvar::new(),
        });
        (0..size)
            .map(|rank| Self {
                rank,
                size,
                shared: Arc::clone(&shared),
            })
            .collect()
    }
}

impl Communicator for ThreadCommunicator {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn all_reduce(&self, value: f64, op: ReduceOp) -> f64 {
        let mut round = self.shared.round.lock();
        if let Some(reason) = &round.poisoned {
            let message = format!("rank {}: communicator group is unusable: {}", self.rank, reason);
            drop(round);
            panic!("{}", message);
        }

        let violation = match round.op {
            Some(expected_op) if expected_op != op => Some(format!(
                "rank {} requested {:?}, but the current reduction is {:?}",
                self.rank, op, expected_op
            )),
            _ if round.contributions[self.rank].is_some() => {
                Some(format!("rank {} contributed twice to the same reduction", self.rank))
            }
            _ => None,
        };
        if let Some(reason) = violation {
            round.poisoned = Some(reason.clone());
            self.shared.completed.notify_all();
            drop(round);
            panic!("collective reduction contract violated: {}", reason);
        }

        let generation = round.generation;
        round.op = Some(op);
        round.contributions[self.rank] = Some(value);
        round.arrived += 1;

        if round.arrived == self.size {
            let result = op.fold(round.contributions.iter_mut().filter_map(Option::take));
            round.result = result;
            round.arrived = 0;
            round.op = None;
            round.generation += 1;
            self.shared.completed.notify_all();
            result
        } else {
            while round.generation == generation && round.poisoned.is_none() {
                self.shared.completed.wait(&mut round);
            }
            if round.generation == generation {
                let message = format!(
                    "rank {}: reduction aborted: {}",
                    self.rank,
                    round.poisoned.as_deref().unwrap_or_default()
                );
                drop(round);
                panic!("{}", message);
            }
            // A new round cannot complete before this worker contributes to it, so the result
            // of our round is still in place
            round.result
        }
    }
}

/// The contiguous block of cells owned by one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellPartition {
    cells: Range<usize>,
}

impl CellPartition {
    /// Splits `num_cells` cells into `size` nearly equal contiguous blocks and returns block
    /// `rank`.
    ///
    /// # Panics
    ///
    /// Panics if `rank >= size`.
    pub fn block(num_cells: usize, rank: usize, size: usize) -> Self {
        assert!(rank < size, "rank {} is out of bounds for {} workers", rank, size);
        let start = num_cells * rank / size;
        let end = num_cells * (rank + 1) / size;
        Self { cells: start..end }
    }

    pub fn for_communicator(num_cells: usize, communicator: &(impl Communicator + ?Sized)) -> Self {
        Self::block(num_cells, communicator.rank(), communicator.size())
    }

    pub fn cells(&self) -> Range<usize> {
        self.cells.clone()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
