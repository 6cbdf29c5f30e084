//! Visiting order of a multi-dimensional sweep.
//!
//! An acquisition loop linearizes its sweep variables into a flat, row-major
//! index space. Before iterating, each axis can be reordered:
//!
//! - [`PlainOrder`] keeps row-major order.
//! - [`SnakeOrder`] alternates the direction of one axis every time the
//!   outer axes advance (boustrophedon scanning).
//! - [`RandomOrder`] shuffles the visiting order of one axis independently
//!   for every combination of the outer axes.
//!
//! All strategies move whole runs of `jump = product(shape[k+1..])` indices,
//! so the inner axes keep their relative order.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SweepError {
    #[error("Axis {axis} out of range for a {ndim}-dimensional sweep")]
    AxisOutOfRange { axis: usize, ndim: usize },

    #[error("{found} indices for a sweep of {expected} points")]
    LengthMismatch { expected: usize, found: usize },

    #[error("Sweep shape {0:?} has too many points")]
    ShapeOverflow(Vec<usize>),
}

pub type SweepResult<T> = std::result::Result<T, SweepError>;

/// Number of points in `shape`.
fn point_count(shape: &[usize]) -> SweepResult<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &n| acc.checked_mul(n))
        .ok_or_else(|| SweepError::ShapeOverflow(shape.to_vec()))
}

/// Block layout of axis `axis`: `(snake_size, jump)`.
fn partition(indices: &[usize], shape: &[usize], axis: usize) -> SweepResult<(usize, usize)> {
    if axis >= shape.len() {
        return Err(SweepError::AxisOutOfRange {
            axis,
            ndim: shape.len(),
        });
    }
    let expected = point_count(shape)?;
    if indices.len() != expected {
        return Err(SweepError::LengthMismatch {
            expected,
            found: indices.len(),
        });
    }
    // The product of a suffix cannot overflow once the full product did not.
    let jump = shape[axis + 1..].iter().product();
    Ok((shape[axis], jump))
}

/// Rebuild every block from its groups, visited in the order `order(block)` yields.
fn regroup<F>(indices: &[usize], snake_size: usize, jump: usize, mut order: F) -> Vec<usize>
where
    F: FnMut(usize) -> Vec<usize>,
{
    let block_len = snake_size * jump;
    if block_len == 0 {
        return indices.to_vec();
    }
    let mut out = Vec::with_capacity(indices.len());
    for (b, block) in indices.chunks(block_len).enumerate() {
        for g in order(b) {
            out.extend_from_slice(&block[g * jump..(g + 1) * jump]);
        }
    }
    out
}

/// A strategy permuting the flat index array for one axis.
pub trait SweepOrder {
    fn reorder(&self, indices: &[usize], shape: &[usize], axis: usize) -> SweepResult<Vec<usize>>;
}

/// Row-major order, unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainOrder;

impl SweepOrder for PlainOrder {
    fn reorder(&self, indices: &[usize], shape: &[usize], axis: usize) -> SweepResult<Vec<usize>> {
        partition(indices, shape, axis)?;
        Ok(indices.to_vec())
    }
}

/// Reverses axis `k` in every odd block of the outer axes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeOrder;

impl SweepOrder for SnakeOrder {
    fn reorder(&self, indices: &[usize], shape: &[usize], axis: usize) -> SweepResult<Vec<usize>> {
        let (snake_size, jump) = partition(indices, shape, axis)?;
        if axis == 0 {
            return Ok(indices.to_vec());
        }
        Ok(regroup(indices, snake_size, jump, |block| {
            if block % 2 == 1 {
                (0..snake_size).rev().collect()
            } else {
                (0..snake_size).collect()
            }
        }))
    }
}

/// Shuffles axis `k` in every block of the outer axes.
///
/// A seeded order is reproducible; an unseeded one draws from entropy on
/// every call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RandomOrder {
    seed: Option<u64>,
}

impl RandomOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl SweepOrder for RandomOrder {
    fn reorder(&self, indices: &[usize], shape: &[usize], axis: usize) -> SweepResult<Vec<usize>> {
        let (snake_size, jump) = partition(indices, shape, axis)?;
        let mut rng = match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Ok(regroup(indices, snake_size, jump, |_| {
            let mut groups: Vec<usize> = (0..snake_size).collect();
            rng.shuffle(&mut groups);
            groups
        }))
    }
}

/// Serializable choice of ordering for one sweep axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "order", rename_all = "snake_case")]
pub enum SweepOrderKind {
    #[default]
    Plain,
    Snake,
    Random {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<u64>,
    },
}

impl SweepOrderKind {
    pub fn reorder(&self, indices: &[usize], shape: &[usize], axis: usize) -> SweepResult<Vec<usize>> {
        match *self {
            SweepOrderKind::Plain => PlainOrder.reorder(indices, shape, axis),
            SweepOrderKind::Snake => SnakeOrder.reorder(indices, shape, axis),
            SweepOrderKind::Random { seed } => RandomOrder { seed }.reorder(indices, shape, axis),
        }
    }
}

/// The identity permutation `0..product(shape)`.
pub fn linear_indices(shape: &[usize]) -> SweepResult<Vec<usize>> {
    Ok((0..point_count(shape)?).collect())
}

/// Visiting order of the whole sweep.
///
/// `kinds[k]` reorders axis `k`, outermost first. Axes without an entry keep
/// plain order.
pub fn sweep_order(shape: &[usize], kinds: &[SweepOrderKind]) -> SweepResult<Vec<usize>> {
    if kinds.len() > shape.len() {
        return Err(SweepError::AxisOutOfRange {
            axis: kinds.len() - 1,
            ndim: shape.len(),
        });
    }
    let mut indices = linear_indices(shape)?;
    for (axis, kind) in kinds.iter().enumerate() {
        indices = kind.reorder(&indices, shape, axis)?;
    }
    tracing::debug!("Sweep order computed for shape {:?} ({:?})", shape, kinds);
    Ok(indices)
}
