//! This crate provides approximate quantiles over a data stream of known
//! length in bounded memory.
//!
//! Observations are gathered into blocks, and each full block is compacted
//! into a Greenwald Khanna style summary and carried through a ladder of
//! levels the way a binary counter carries a bit. For an error ε and a stream
//! declared to hold n observations no more than `O((1/ε) log(εn))` tuples are
//! ever held, and for distinct observations every quantile answered has a
//! true rank within εn of the one requested. Repeated values loosen that
//! bound; see the [`stream`] module.
//!
//! ```
//! use leveled_quantiles::stream::Stream;
//!
//! let mut stream = Stream::new(0.01, 10_000).unwrap();
//! stream.extend((0..10_000).map(f64::from));
//! let latencies = stream.finalize();
//!
//! let p99 = latencies.query(0.99).unwrap();
//! assert!((p99 - 9_900.0).abs() <= 100.0);
//! ```
#![deny(
    missing_docs,
    missing_copy_implementations,
    missing_debug_implementations,
    unstable_features,
    unused_import_braces
)]

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

pub mod error;
pub mod stream;
pub mod summary;
pub mod util;

pub use crate::error::{Error, InvariantViolation};
pub use crate::stream::{Finalized, Stream};
pub use crate::summary::{RankBound, Summary, Tuple};
