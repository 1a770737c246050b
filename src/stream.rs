//! A leveled, mergeable variant of Greenwald Khanna for streams of a known
//! length, after Zhang and Wang's "An Efficient Quantile Approximation
//! Algorithm for Data Streams" (ICDE 2007).
//!
//! Observations are buffered unsorted in level 0. Once `b` of them have
//! arrived the buffer is sorted, pruned to `(b + 1) / 2 + 1` tuples and
//! carried upward: an empty level absorbs the carry, an occupied level is
//! merged with it, re-pruned and emptied, and the carry moves on. Levels fill
//! and empty exactly like the digits of a binary counter, so at most
//! `O(log(n / b))` levels exist, each holding `O(1 / ε)` tuples.
//!
//! With `b = floor(ln(εn) / ε)` the accumulated pruning error stays within
//! `ε`: every answer from [`Finalized::query`] has a true rank within `εn`
//! of the requested one, as long as the observations are distinct.
//!
//! Repeated values weaken that bound. A run of equal values coalesces into
//! one tuple whose `r_min` is the run's first rank, and the run's length moves
//! into the next tuple's `g`. Merging can only credit the other operand with
//! that first rank, so every merge under-ranks what follows a repeated value,
//! and the loss compounds with the number of levels. Windows still contain the
//! true ranks, and the minimum and maximum are still exact, but answers can
//! stray past `εn`. With runs of about `εn` observations the error stays
//! within `2εn`; with a handful of distinct values it is unbounded.
//!
//! # Examples
//!
//! ```
//! use leveled_quantiles::stream::Stream;
//!
//! let epsilon = 0.01;
//! let n = 1000;
//!
//! let mut stream = Stream::new(epsilon, n).unwrap();
//! for i in 1..=n {
//!     stream.insert(i as f64);
//! }
//! let quantiles = stream.finalize();
//!
//! let in_range = |phi: f64, value: f64| {
//!     let r = phi * n as f64;
//!     (value - r).abs() <= epsilon * n as f64
//! };
//! assert_eq!(quantiles.query(0.0), Some(1.0));
//! assert!(in_range(0.5, quantiles.query(0.5).unwrap()));
//! assert!(in_range(0.99, quantiles.query(0.99).unwrap()));
//! assert_eq!(quantiles.query(1.0), Some(1000.0));
//! ```
use std::mem;

use tracing::{debug, trace};

use crate::error::{Error, InvariantViolation};
use crate::summary::{Summary, Tuple};

/// Accepts observations until [`Stream::finalize`].
#[derive(Debug, Clone)]
pub struct Stream {
    /// The error factor
    epsilon: f64,

    /// The number of observations the stream was sized for
    expected_count: usize,

    /// b, the capacity of level 0
    block_size: usize,

    /// The number of observations inserted so far
    count: usize,

    // levels[0] is the unsorted insertion buffer of singleton tuples. Every
    // other level is either empty or holds one pruned summary.
    levels: Vec<Summary>,
}

impl Stream {
    /// Creates a new instance of a Stream sized for `expected_count`
    /// observations answered to within `epsilon * expected_count` ranks.
    ///
    /// `epsilon` must lie in (0, 1) and `floor(ln(epsilon * expected_count)
    /// / epsilon)` must be at least one, otherwise
    /// [`Error::InvalidParameters`] is returned.
    ///
    /// ```
    /// use leveled_quantiles::stream::Stream;
    ///
    /// assert_eq!(Stream::new(0.01, 1000).unwrap().block_size(), 230);
    /// assert!(Stream::new(0.5, 2).is_err());
    /// ```
    pub fn new(epsilon: f64, expected_count: usize) -> Result<Stream, Error> {
        let invalid = Error::InvalidParameters {
            epsilon,
            expected_count,
        };
        if !(epsilon > 0.0 && epsilon < 1.0) {
            return Err(invalid);
        }

        let b = ((epsilon * expected_count as f64).ln() / epsilon).floor();
        // also rejects NaN and -inf from ln(0)
        if !(b >= 1.0) {
            return Err(invalid);
        }
        let block_size = b as usize;
        debug!(epsilon, expected_count, block_size, "sized stream");

        Ok(Stream {
            epsilon,
            expected_count,
            block_size,
            count: 0,
            levels: vec![Summary::new()],
        })
    }

    /// Records one observation.
    ///
    /// Every `block_size()` inserts the insertion buffer is compacted and
    /// carried through the levels, amortizing to `O(log(n) / b)` merge work
    /// per insert.
    pub fn insert(&mut self, v: f64) {
        self.levels[0].push(Tuple::singleton(v));
        self.count += 1;

        if self.levels[0].len() >= self.block_size {
            self.compact();
        }
    }

    /// Folds every level into one summary. The stream answers queries from
    /// then on and accepts no more observations.
    pub fn finalize(self) -> Finalized {
        let mut levels = self.levels.into_iter();
        let mut summary = levels.next().unwrap_or_default();
        summary.sort_values();
        summary.coalesce_duplicates();

        let mut folded = 0;
        for level in levels.filter(|l| !l.is_empty()) {
            summary = well_formed(summary.merge(&level));
            folded += 1;
        }
        debug_assert_eq!(summary.size(), self.count);
        debug!(
            levels = folded,
            tuples = summary.len(),
            count = self.count,
            "finalized stream"
        );

        Finalized {
            epsilon: self.epsilon,
            expected_count: self.expected_count,
            count: self.count,
            summary,
        }
    }

    /// The error factor
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// The number of observations the stream was sized for.
    pub fn expected_count(&self) -> usize {
        self.expected_count
    }

    /// b, the number of observations buffered before a compaction.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// The number of observations inserted so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// The number of levels, the insertion buffer included.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Indication of the space usage of the stream. Returns the number of
    /// tuples held across all levels.
    pub fn tuple_count(&self) -> usize {
        self.levels.iter().map(Summary::len).sum()
    }

    /// Tuples kept per compacted level.
    fn prune_target(&self) -> usize {
        (self.block_size + 1) / 2 + 1
    }

    fn compact(&mut self) {
        let target = self.prune_target();

        let buffer = &mut self.levels[0];
        buffer.sort_values();
        buffer.coalesce_duplicates();
        let mut carry = well_formed(buffer.prune(target));
        buffer.clear();

        for level in 1..self.levels.len() {
            if self.levels[level].is_empty() {
                trace!(level, tuples = carry.len(), "carry absorbed");
                self.levels[level] = carry;
                return;
            }

            let resident = mem::take(&mut self.levels[level]);
            let merged = well_formed(resident.merge(&carry));
            carry = well_formed(merged.prune(target));
            trace!(level, tuples = carry.len(), "carry propagated");
        }

        trace!(
            level = self.levels.len(),
            tuples = carry.len(),
            "new level"
        );
        self.levels.push(carry);
    }
}

impl Extend<f64> for Stream {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for v in iter {
            self.insert(v);
        }
    }
}

// The stream only hands sorted, coalesced, non-empty summaries to prune and
// merge. A violation here means the engine is broken and any answer built on
// it would be silently wrong.
fn well_formed(result: Result<Summary, InvariantViolation>) -> Summary {
    match result {
        Ok(summary) => summary,
        Err(e) => panic!("quantile engine invariant violated: {}", e),
    }
}

/// A finalized stream, answering quantile queries.
#[derive(Debug, Clone)]
pub struct Finalized {
    epsilon: f64,
    expected_count: usize,
    count: usize,
    summary: Summary,
}

impl Finalized {
    /// Compute the epsilon-approximate phi-quantile.
    ///
    /// The requested rank is `floor(phi * count())`. Of the tuples whose
    /// window lies within `epsilon * expected_count()` of it the one straying
    /// least is answered. Should none qualify, which can happen once values
    /// repeat, the least straying tuple is answered anyway.
    ///
    /// Returns `None` if no observations were inserted.
    ///
    /// # Panics
    ///
    /// Panics if `phi` is not in [0, 1].
    pub fn query(&self, phi: f64) -> Option<f64> {
        assert!(phi >= 0.0 && phi <= 1.0);

        let rank = (phi * self.count as f64).floor() as usize;
        let tolerance = self.epsilon * self.expected_count as f64;

        let mut best: Option<(usize, f64)> = None;
        for b in self.summary.rank_bounds() {
            let deviation = b.deviation(rank);
            match best {
                Some((d, _)) if b.rmin > rank + d => break,
                Some((d, _)) if d <= deviation => {}
                _ => best = Some((deviation, b.value)),
            }
        }

        best.map(|(deviation, value)| {
            if deviation as f64 > tolerance {
                trace!(phi, rank, deviation, tolerance, "no tuple within tolerance");
            }
            value
        })
    }

    /// The error factor
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// The number of observations the stream was sized for.
    pub fn expected_count(&self) -> usize {
        self.expected_count
    }

    /// The number of observations inserted before finalizing.
    pub fn count(&self) -> usize {
        self.count
    }

    /// The summary queries are answered from.
    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Gives up the summary queries are answered from.
    pub fn into_summary(self) -> Summary {
        self.summary
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::summary::test::bounds_hold;
    use crate::util::Xorshift;
    use quickcheck::{QuickCheck, TestResult};

    fn shuffled(n: u32, seed: u64) -> Vec<f64> {
        let mut vs: Vec<f64> = (1..=n).map(f64::from).collect();
        Xorshift::new(seed).shuffle(&mut vs);
        vs
    }

    #[test]
    fn test_invalid_parameters() {
        assert_eq!(
            Stream::new(0.5, 2).unwrap_err(),
            Error::InvalidParameters {
                epsilon: 0.5,
                expected_count: 2,
            }
        );
        assert!(Stream::new(0.01, 0).is_err());
        assert!(Stream::new(0.01, 100).is_err());
        assert!(Stream::new(0.0, 1000).is_err());
        assert!(Stream::new(1.0, 1000).is_err());
        assert!(Stream::new(-0.1, 1000).is_err());
        assert!(Stream::new(std::f64::NAN, 1000).is_err());
    }

    #[test]
    fn test_block_size() {
        let s = Stream::new(0.01, 1000).unwrap();
        assert_eq!(s.block_size(), 230);
        assert_eq!(s.prune_target(), 116);
        assert_eq!(s.level_count(), 1);
        // ln(0.1 * 50) / 0.1 = 16.09
        assert_eq!(Stream::new(0.1, 50).unwrap().block_size(), 16);
    }

    #[test]
    fn test_binary_counter() {
        let mut s = Stream::new(0.01, 1000).unwrap();
        let occupied = |s: &Stream| -> Vec<bool> {
            s.levels.iter().skip(1).map(|l| !l.is_empty()).collect()
        };

        s.extend(shuffled(230, 1));
        assert_eq!(occupied(&s), vec![true]);
        assert!(s.levels[0].is_empty());

        s.extend(shuffled(230, 2));
        assert_eq!(occupied(&s), vec![false, true]);

        s.extend(shuffled(230, 3));
        assert_eq!(occupied(&s), vec![true, true]);

        s.extend(shuffled(230, 4));
        assert_eq!(occupied(&s), vec![false, false, true]);
        assert_eq!(s.levels[3].size(), 920);
        assert_eq!(s.count(), 920);
    }

    #[test]
    fn test_levels_hold_their_share() {
        let mut s = Stream::new(0.05, 5000).unwrap();
        let b = s.block_size();
        for v in shuffled(5000, 1972) {
            s.insert(v);
            for (k, level) in s.levels.iter().enumerate().skip(1) {
                if !level.is_empty() {
                    assert_eq!(level.size(), b << (k - 1));
                    assert!(level.len() <= s.prune_target() + 1);
                    assert!(level.is_strictly_ascending());
                }
            }
        }
    }

    #[test]
    fn test_uncertainty_bounded_every_level() {
        let epsilon = 0.01;
        let mut s = Stream::new(epsilon, 20_000).unwrap();
        for v in shuffled(20_000, 7) {
            s.insert(v);
            for level in s.levels.iter().skip(1).filter(|l| !l.is_empty()) {
                let n = level.size() as f64;
                assert!(level.max_uncertainty() as f64 <= 2.0 * epsilon * n);
                assert!(level.rank_bounds().all(|b| b.rmin <= b.rmax));
            }
        }
    }

    #[test]
    fn test_space_bounded() {
        let mut s = Stream::new(0.01, 100_000).unwrap();
        let b = s.block_size();
        let target = s.prune_target();
        let mut high_water = 0;
        for v in shuffled(100_000, 42) {
            s.insert(v);
            high_water = high_water.max(s.tuple_count());
        }
        // log2(100_000 / 690) < 8
        assert!(s.level_count() <= 9);
        assert!(high_water <= b + 8 * (target + 1));
    }

    #[test]
    fn test_empty_stream() {
        let s = Stream::new(0.01, 1000).unwrap().finalize();
        assert_eq!(s.count(), 0);
        assert_eq!(s.query(0.5), None);
        assert!(s.summary().is_empty());
    }

    #[test]
    fn test_single_observation() {
        let mut s = Stream::new(0.01, 1000).unwrap();
        s.insert(-3.5);
        let s = s.finalize();
        assert_eq!(s.query(0.0), Some(-3.5));
        assert_eq!(s.query(1.0), Some(-3.5));
    }

    #[test]
    fn test_repeated_value() {
        let mut s = Stream::new(0.01, 1000).unwrap();
        for _ in 0..100 {
            s.insert(7.0);
        }
        let s = s.finalize();
        assert_eq!(s.summary().size(), 100);
        for phi in 0..101 {
            assert_eq!(s.query(f64::from(phi) / 100.0), Some(7.0));
        }
    }

    #[test]
    fn test_repeated_value_across_levels() {
        let mut s = Stream::new(0.01, 1000).unwrap();
        for _ in 0..1000 {
            s.insert(7.0);
        }
        let s = s.finalize();
        assert_eq!(s.summary().size(), 1000);
        assert_eq!(s.summary().len(), 1);
        assert_eq!(s.query(0.3), Some(7.0));
    }

    #[test]
    #[should_panic]
    fn test_query_out_of_range() {
        let mut s = Stream::new(0.01, 1000).unwrap();
        s.insert(1.0);
        s.finalize().query(1.5);
    }

    #[test]
    fn test_finalized_size_is_count() {
        fn inner(data: Vec<i16>) -> TestResult {
            let mut s = Stream::new(0.1, 50).unwrap();
            let data: Vec<f64> = data.iter().map(|v| f64::from(*v)).collect();
            s.extend(data.iter().cloned());
            let f = s.finalize();
            TestResult::from_bool(
                f.summary().size() == data.len()
                    && f.count() == data.len()
                    && f.summary().is_strictly_ascending()
                    && bounds_hold(f.summary(), &data),
            )
        }
        QuickCheck::new().quickcheck(inner as fn(Vec<i16>) -> TestResult);
    }

    quickcheck! {
        fn extremes_are_exact(data: Vec<u16>) -> TestResult {
            if data.is_empty() {
                return TestResult::discard();
            }
            let mut s = Stream::new(0.1, 50).unwrap();
            s.extend(data.iter().map(|v| f64::from(*v)));
            let f = s.finalize();

            let min = data.iter().min().map(|v| f64::from(*v));
            let max = data.iter().max().map(|v| f64::from(*v));
            TestResult::from_bool(f.query(0.0) == min && f.query(1.0) == max)
        }
    }
}
