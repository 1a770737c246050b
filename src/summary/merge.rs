//! COMBINE from Greenwald and Khanna's "Power-Conserving Computation of
//! Order-Statistics over Sensor Networks".
//!
//! Take summaries Q' over n' observations and Q'' over n'' observations. For
//! a tuple x of Q', let y_s be the last tuple of Q'' ordered before x and y_t
//! the first tuple of Q'' ordered after it. Then in the combined summary
//!
//! * `r_min(x) = r'_min(x) + r''_min(y_s)`, or `r'_min(x)` without a y_s
//! * `r_max(x) = r'_max(x) + r''_max(y_t) - 1`, or `r'_max(x) + n''` without a y_t
//!
//! and symmetrically for the tuples of Q''. Each side's bounds are widened by
//! the uncertainty of the other side around the point they interleave. Equal
//! values order the left operand first; the result is then coalesced.
use std::cmp;

use crate::error::InvariantViolation;
use crate::summary::{RankBound, Summary, Tuple};

impl Summary {
    /// Combines two summaries into one standing for `self.size() +
    /// other.size()` observations.
    ///
    /// Merging with an empty summary returns the other operand unchanged.
    /// Fails if either operand is not strictly ascending.
    ///
    /// The result holds up to `self.len() + other.len()` tuples; callers
    /// bounding their memory prune it.
    pub fn merge(&self, other: &Summary) -> Result<Summary, InvariantViolation> {
        self.check_ascending()?;
        other.check_ascending()?;

        if other.is_empty() {
            return Ok(self.clone());
        }
        if self.is_empty() {
            return Ok(other.clone());
        }

        let left = self.merge_bounds();
        let right = other.merge_bounds();
        let (n_left, n_right) = (self.size(), other.size());

        let mut merged = Vec::with_capacity(left.len() + right.len());
        let mut rmin = 0;
        let (mut i, mut j) = (0, 0);

        while i < left.len() || j < right.len() {
            let take_left = match (left.get(i), right.get(j)) {
                (Some(l), Some(r)) => l.value.total_cmp(&r.value) != cmp::Ordering::Greater,
                (Some(_), None) => true,
                _ => false,
            };

            let t = if take_left {
                i += 1;
                interleave(&left[i - 1], &right, j, n_right, &mut rmin)
            } else {
                j += 1;
                interleave(&right[j - 1], &left, i, n_left, &mut rmin)
            };
            merged.push(t);
        }

        let mut summary = Summary::from_tuples(merged);
        summary.coalesce_duplicates();
        debug_assert_eq!(summary.size(), n_left + n_right);
        Ok(summary)
    }

    // The first tuple is its own operand's minimum and so exactly ranked 1
    // within it. Any excess g moves into the window's width.
    fn merge_bounds(&self) -> Vec<RankBound> {
        let mut bounds: Vec<RankBound> = self.rank_bounds().collect();
        if let Some(first) = bounds.first_mut() {
            first.rmin = 1;
        }
        bounds
    }
}

/// Re-ranks `x` against the other operand, of which `passed` tuples have
/// already been emitted. `rmin` tracks r_min of the last emitted tuple.
fn interleave(
    x: &RankBound,
    other: &[RankBound],
    passed: usize,
    other_n: usize,
    rmin: &mut usize,
) -> Tuple {
    let below = match passed {
        0 => 0,
        p => other[p - 1].rmin,
    };
    let above = match other.get(passed) {
        Some(next) => next.rmax - 1,
        None => other_n,
    };

    let x_rmin = x.rmin + below;
    let x_rmax = x.rmax + above;
    debug_assert!(x_rmin > *rmin, "r_min must strictly increase");
    debug_assert!(x_rmax >= x_rmin, "delta must not be negative");

    let t = Tuple::new(x.value, x_rmin - *rmin, x_rmax - x_rmin);
    *rmin = x_rmin;
    t
}
