//! PRUNE from Greenwald and Khanna's "Power-Conserving Computation of
//! Order-Statistics over Sensor Networks": query the summary at `target`
//! evenly spaced ranks and keep only the tuples those queries land on.
//!
//! If the input is e-approximate the output is `(e + 1/(2 * target))`
//! approximate and holds at most `target + 1` tuples.
use crate::error::InvariantViolation;
use crate::summary::{RankBound, Summary, Tuple};

impl Summary {
    /// Compresses this summary down to at most `target + 1` tuples.
    ///
    /// The first tuple is kept untouched, being the minimum. The rest are
    /// picked as the best-fitting tuples for ranks `floor(size * i / target)`
    /// with `i` in `1..=target`. Picked tuples keep their original `r_min` and
    /// `r_max`, so the declared error of the result is never wider than the
    /// input's and `size()` is preserved.
    ///
    /// Fails if the summary is empty or not strictly ascending.
    ///
    /// # Panics
    ///
    /// Panics if `target` is zero.
    pub fn prune(&self, target: usize) -> Result<Summary, InvariantViolation> {
        assert!(target >= 1);
        if self.is_empty() {
            return Err(InvariantViolation::Empty);
        }
        self.check_ascending()?;

        let bounds: Vec<RankBound> = self.rank_bounds().collect();
        let n = self.size();

        let mut pruned = Vec::with_capacity(target + 1);
        pruned.push(self.tuples[0]);

        let mut taken = 0;
        let mut rmin = bounds[0].rmin;
        for i in 1..=target {
            let rank = ((n as u128 * i as u128) / target as u128) as usize;
            let found = closest(&bounds, taken, rank);
            if found == taken {
                // already covered
                continue;
            }

            let b = &bounds[found];
            pruned.push(Tuple::new(b.value, b.rmin - rmin, b.rmax - b.rmin));
            rmin = b.rmin;
            taken = found;
        }

        debug_assert_eq!(n, Summary::from_tuples(pruned.clone()).size());
        Ok(Summary::from_tuples(pruned))
    }
}

/// Index of the tuple at or after `start` whose window strays least from
/// `rank`. Ties go to the later tuple.
///
/// Searching from `start` keeps the picks monotone, which keeps every `g` of
/// the pruned summary positive. Windows only drift further from `rank` once
/// `r_min` passes `rank + best`, so the scan stops there.
fn closest(bounds: &[RankBound], start: usize, rank: usize) -> usize {
    let mut best = start;
    let mut best_deviation = bounds[start].deviation(rank);

    for (i, b) in bounds.iter().enumerate().skip(start + 1) {
        if b.rmin > rank + best_deviation {
            break;
        }
        let deviation = b.deviation(rank);
        if deviation <= best_deviation {
            best = i;
            best_deviation = deviation;
        }
    }

    best
}
