use std::cmp;

/// 3-tuple of a value v[i], g[i] and delta[i].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuple {
    /// v[i], an observation in the set of observations
    pub value: f64,

    /// the difference between the rank lowerbounds of t[i] and t[i-1]
    /// g = r_min(v[i]) - r_min(v[i - 1])
    pub g: usize,

    /// the difference between the rank upper and lower bounds for this tuple
    pub delta: usize,
}

impl Tuple {
    /// Creates a new instance of a Tuple
    pub fn new(value: f64, g: usize, delta: usize) -> Tuple {
        Tuple { value, g, delta }
    }

    /// A tuple standing for exactly one, exactly ranked, observation.
    pub fn singleton(value: f64) -> Tuple {
        Tuple::new(value, 1, 0)
    }

    // The sole ordering value in a Tuple is its value. f64::total_cmp gives
    // every float, NaN included, a place in that order.
    pub(crate) fn cmp_value(&self, other: &Tuple) -> cmp::Ordering {
        self.value.total_cmp(&other.value)
    }
}

/// The rank window `[rmin, rmax]` a tuple's value is known to lie in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankBound {
    /// the observation
    pub value: f64,
    /// lower bound on the rank of `value`
    pub rmin: usize,
    /// upper bound on the rank of `value`
    pub rmax: usize,
}

impl RankBound {
    /// How far this window strays from `rank` on its worse side.
    ///
    /// Zero only when the window is exactly `[rank, rank]`.
    pub fn deviation(&self, rank: usize) -> usize {
        cmp::max(
            rank.saturating_sub(self.rmin),
            self.rmax.saturating_sub(rank),
        )
    }
}
