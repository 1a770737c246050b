//! Errors surfaced by the summary engine.
use thiserror::Error;

/// Errors returned when configuring a [`Stream`](crate::stream::Stream).
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Error {
    /// The requested accuracy cannot be met for the declared stream length.
    ///
    /// Either `epsilon` lies outside of (0, 1) or the derived block size
    /// `floor(ln(epsilon * expected_count) / epsilon)` is below one. Relax
    /// epsilon or raise the expected count.
    #[error("invalid parameters: epsilon {epsilon} is unusable for {expected_count} observations")]
    InvalidParameters {
        /// the requested error factor
        epsilon: f64,
        /// the declared length of the stream
        expected_count: usize,
    },
}

/// A summary handed to prune or merge does not have the shape those
/// operations require.
///
/// The stream only ever hands well-formed summaries to these operations, so
/// seeing one of these from inside the stream is a defect in the engine, not
/// a property of the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// The summary holds no tuples.
    #[error("summary is empty")]
    Empty,
    /// The tuple at `index` does not sort strictly after its predecessor.
    #[error("summary is not strictly ascending at tuple {index}")]
    NotAscending {
        /// position of the offending tuple
        index: usize,
    },
}
