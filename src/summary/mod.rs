//! A quantile summary S is an ordered, duplicate-free sequence of tuples
//! `t[i] = (v[i], g[i], delta[i])`, following Greenwald and Khanna.
//!
//! terminology:
//!
//!   * `r_min(v[i])`: lower bound on the rank of v[i]
//!   * `r_max(v[i])`: upper bound on the rank of v[i]
//!   * `g[i] = r_min(v[i]) - r_min(v[i - 1])`
//!   * `delta[i] = r_max(v[i]) - r_min(v[i])`
//!
//! identities:
//!
//! * `r_min(v[i]) = forall j<=i sum of g[j]`
//! * `r_max(v[i]) = ( forall j<=i sum of g[j] ) + delta[i]`
//! * `size(S) = ( sum of g[i] ) + delta[last]`, the number of observations S
//!   stands for
//!
//! The true rank of every v[i] lies in `[r_min(v[i]), r_max(v[i])]`. Both
//! [`Summary::prune`] and [`Summary::merge`] preserve that, and preserve
//! `size(S)`.
//!
//! # Examples
//!
//! ```
//! use leveled_quantiles::summary::Summary;
//!
//! let left = Summary::from_values(vec![1.0, 3.0, 5.0, 7.0]);
//! let right = Summary::from_values(vec![2.0, 4.0, 6.0, 8.0]);
//!
//! let merged = left.merge(&right).unwrap();
//! assert_eq!(merged.size(), 8);
//!
//! let pruned = merged.prune(2).unwrap();
//! assert_eq!(pruned.size(), 8);
//! assert!(pruned.len() <= 3);
//! ```
use std::cmp;
use std::slice;

use crate::error::InvariantViolation;

mod entry;
mod merge;
mod prune;

pub use self::entry::{RankBound, Tuple};

/// An ordered sequence of rank-bound tuples.
///
/// Apart from [`Summary::from_tuples`] and the stream's insertion buffer,
/// every way of building a Summary yields one that is strictly ascending by
/// value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    tuples: Vec<Tuple>,
}

impl Summary {
    /// Creates an empty Summary
    pub fn new() -> Summary {
        Summary { tuples: Vec::new() }
    }

    /// Wraps `tuples` as they are. No ordering is checked; prune and merge
    /// will refuse the result if it is not strictly ascending.
    pub fn from_tuples(tuples: Vec<Tuple>) -> Summary {
        Summary { tuples }
    }

    /// An exact summary of `values`: one tuple per distinct value.
    ///
    /// ```
    /// use leveled_quantiles::summary::{Summary, Tuple};
    ///
    /// let s = Summary::from_values(vec![6.0, 5.0, 5.0, 5.0]);
    /// assert_eq!(s.tuples(), &[Tuple::new(5.0, 1, 2), Tuple::new(6.0, 3, 0)]);
    /// assert_eq!(s.size(), 4);
    /// ```
    pub fn from_values<I>(values: I) -> Summary
    where
        I: IntoIterator<Item = f64>,
    {
        let mut summary =
            Summary::from_tuples(values.into_iter().map(Tuple::singleton).collect());
        summary.sort_values();
        summary.coalesce_duplicates();
        summary
    }

    /// Number of tuples held. This is the space cost of the summary, not the
    /// number of observations it stands for; see [`Summary::size`].
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    /// True if the summary holds no tuples.
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// The number of observations this summary stands for, zero when empty.
    pub fn size(&self) -> usize {
        match self.tuples.last() {
            None => 0,
            Some(last) => self.tuples.iter().map(|t| t.g).sum::<usize>() + last.delta,
        }
    }

    /// The tuples, in order.
    pub fn tuples(&self) -> &[Tuple] {
        &self.tuples
    }

    /// Iterates the tuples in order.
    pub fn iter(&self) -> slice::Iter<'_, Tuple> {
        self.tuples.iter()
    }

    /// Iterates `(value, r_min, r_max)` for each tuple in order.
    pub fn rank_bounds(&self) -> RankBounds<'_> {
        RankBounds {
            inner: self.tuples.iter(),
            rmin: 0,
        }
    }

    /// The widest `r_max - r_min` of any tuple, zero when empty.
    pub fn max_uncertainty(&self) -> usize {
        self.tuples.iter().map(|t| t.delta).max().unwrap_or(0)
    }

    /// Ok if every tuple sorts strictly after its predecessor. An empty
    /// summary is trivially ascending.
    pub fn check_ascending(&self) -> Result<(), InvariantViolation> {
        for (i, pair) in self.tuples.windows(2).enumerate() {
            if pair[0].cmp_value(&pair[1]) != cmp::Ordering::Less {
                return Err(InvariantViolation::NotAscending { index: i + 1 });
            }
        }
        Ok(())
    }

    /// True if every tuple sorts strictly after its predecessor.
    pub fn is_strictly_ascending(&self) -> bool {
        self.check_ascending().is_ok()
    }

    /// Folds runs of equal values into the first tuple of each run.
    ///
    /// Must only be called on a summary sorted by value. The folded tuple's
    /// `r_max` grows to cover the run's last member and the run's `g` is
    /// carried into the next distinct tuple, so `size()` is unchanged.
    /// Running this on its own output does nothing.
    ///
    /// ```
    /// use leveled_quantiles::summary::{Summary, Tuple};
    ///
    /// let mut s = Summary::from_tuples(vec![
    ///     Tuple::new(5.0, 1, 0),
    ///     Tuple::new(5.0, 1, 0),
    ///     Tuple::new(6.0, 1, 0),
    /// ]);
    /// s.coalesce_duplicates();
    /// assert_eq!(s.tuples(), &[Tuple::new(5.0, 1, 1), Tuple::new(6.0, 2, 0)]);
    /// ```
    pub fn coalesce_duplicates(&mut self) {
        if self.tuples.len() < 2 {
            return;
        }

        // g of the folded tuples, owed to the next distinct tuple
        let mut missing = 0;
        let mut dst = 0;

        for src in 1..self.tuples.len() {
            let t = self.tuples[src];
            if self.tuples[dst].cmp_value(&t) == cmp::Ordering::Equal {
                let head = &mut self.tuples[dst];
                head.delta = cmp::max(head.delta, missing + t.g + t.delta);
                missing += t.g;
                continue;
            }

            dst += 1;
            self.tuples[dst] = Tuple::new(t.value, t.g + missing, t.delta);
            missing = 0;
        }

        self.tuples.truncate(dst + 1);
    }

    pub(crate) fn push(&mut self, t: Tuple) {
        self.tuples.push(t);
    }

    pub(crate) fn sort_values(&mut self) {
        self.tuples.sort_by(|a, b| a.cmp_value(b));
    }

    pub(crate) fn clear(&mut self) {
        self.tuples.clear();
    }
}

impl<'a> IntoIterator for &'a Summary {
    type Item = &'a Tuple;
    type IntoIter = slice::Iter<'a, Tuple>;

    fn into_iter(self) -> Self::IntoIter {
        self.tuples.iter()
    }
}

/// Iterator over the [`RankBound`] of each tuple in a [`Summary`].
#[derive(Debug, Clone)]
pub struct RankBounds<'a> {
    inner: slice::Iter<'a, Tuple>,
    rmin: usize,
}

impl<'a> Iterator for RankBounds<'a> {
    type Item = RankBound;

    fn next(&mut self) -> Option<RankBound> {
        let t = self.inner.next()?;
        self.rmin += t.g;
        Some(RankBound {
            value: t.value,
            rmin: self.rmin,
            rmax: self.rmin + t.delta,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
