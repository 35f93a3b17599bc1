/// Source of uniformly distributed values in `[0, 1)`.
///
/// The page uses `Math.random`; tests plug in seeded generators or closures.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;

    /// Uniform index in `0..upper`. `upper` must be non-zero.
    fn next_index(&mut self, upper: usize) -> usize {
        let scaled = (self.next_unit() * upper as f64).floor() as usize;
        scaled.min(upper.saturating_sub(1))
    }
}

impl<F: FnMut() -> f64> RandomSource for F {
    fn next_unit(&mut self) -> f64 {
        self()
    }
}

#[cfg(target_arch = "wasm32")]
pub struct MathRandom;

#[cfg(target_arch = "wasm32")]
impl RandomSource for MathRandom {
    fn next_unit(&mut self) -> f64 {
        js_sys::Math::random()
    }
}

/// Picks entries from a fixed pool, never returning the same index twice in a row
/// when the pool has more than one entry.
#[derive(Clone, Debug)]
pub struct NonRepeatingPicker<T: 'static> {
    pool: &'static [T],
    last: Option<usize>,
}

impl<T: 'static> NonRepeatingPicker<T> {
    pub fn new(pool: &'static [T]) -> Self {
        Self { pool, last: None }
    }

    pub fn last_index(&self) -> Option<usize> {
        self.last
    }

    pub fn pick_index(&mut self, rng: &mut impl RandomSource) -> Option<usize> {
        if self.pool.is_empty() {
            return None;
        }
        let mut index = rng.next_index(self.pool.len());
        if self.pool.len() > 1 && Some(index) == self.last {
            // shift to a different slot instead of redrawing; keeps the draw bounded
            let offset = 1 + rng.next_index(self.pool.len() - 1);
            index = (index + offset) % self.pool.len();
        }
        self.last = Some(index);
        Some(index)
    }

    pub fn pick(&mut self, rng: &mut impl RandomSource) -> Option<&'static T> {
        let pool = self.pool;
        self.pick_index(rng).map(|index| &pool[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const POOL: &[&str] = &["a", "b", "c"];

    #[test]
    fn index_stays_in_bounds_at_the_edge() {
        let mut almost_one = || 0.999_999_999_999_f64;
        assert_eq!(almost_one.next_index(12), 11);
        let mut zero = || 0.0_f64;
        assert_eq!(zero.next_index(12), 0);
    }

    #[test]
    fn never_repeats_consecutive_picks() {
        let mut seeded = StdRng::seed_from_u64(7);
        let mut rng = move || seeded.random::<f64>();
        let mut picker = NonRepeatingPicker::new(POOL);
        let mut previous = None;
        for _ in 0..1000 {
            let index = picker.pick_index(&mut rng);
            assert!(index.is_some());
            assert_ne!(index, previous);
            previous = index;
        }
    }

    #[test]
    fn repeated_draws_are_redirected() {
        let mut constant = || 0.5_f64;
        let mut picker = NonRepeatingPicker::new(POOL);
        assert_eq!(picker.pick(&mut constant), Some(&"b"));
        assert_ne!(picker.pick(&mut constant), Some(&"b"));
    }

    #[test]
    fn single_entry_pool_repeats() {
        const ONE: &[&str] = &["only"];
        let mut picker = NonRepeatingPicker::new(ONE);
        let mut rng = || 0.3_f64;
        assert_eq!(picker.pick(&mut rng), Some(&"only"));
        assert_eq!(picker.pick(&mut rng), Some(&"only"));
    }

    #[test]
    fn empty_pool_yields_nothing() {
        const EMPTY: &[&str] = &[];
        let mut picker = NonRepeatingPicker::new(EMPTY);
        assert_eq!(picker.pick(&mut || 0.1_f64), None);
    }
}
