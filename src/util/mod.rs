//! Small helpers shared by the tests, benchmarks and fuzz targets.

/// A splitmix64 pseudo-random generator. Deterministic for a given seed,
/// which makes shuffled insertion orders reproducible.
#[derive(Debug, Clone, Copy)]
pub struct Xorshift {
    seed: u64,
}

impl Xorshift {
    /// Creates a generator from `seed`.
    pub fn new(seed: u64) -> Xorshift {
        Xorshift { seed }
    }

    /// The next value, in [0, 65536).
    pub fn next_val(&mut self) -> u32 {
        // implementation inspired by
        // https://github.com/astocko/xorshift/blob/master/src/splitmix64.rs
        use std::num::Wrapping as w;

        let mut z = w(self.seed) + w(0x9E37_79B9_7F4A_7C15_u64);
        let nxt_seed = z.0;
        z = (z ^ (z >> 30)) * w(0xBF58_476D_1CE4_E5B9_u64);
        z = (z ^ (z >> 27)) * w(0x94D0_49BB_1331_11EB_u64);
        self.seed = nxt_seed;
        u32::from((z ^ (z >> 31)).0 as u16)
    }

    /// Fisher-Yates shuffles `vs` in place.
    pub fn shuffle<T>(&mut self, vs: &mut [T]) {
        for i in (1..vs.len()).rev() {
            let j = self.next_val() as usize % (i + 1);
            vs.swap(i, j);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_deterministic() {
        let mut a = Xorshift::new(1972);
        let mut b = Xorshift::new(1972);
        for _ in 0..100 {
            let v = a.next_val();
            assert_eq!(v, b.next_val());
            assert!(v < 65_536);
        }
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut vs: Vec<u32> = (0..1000).collect();
        Xorshift::new(7).shuffle(&mut vs);
        assert_ne!(vs, (0..1000).collect::<Vec<u32>>());
        vs.sort();
        assert_eq!(vs, (0..1000).collect::<Vec<u32>>());
    }
}
