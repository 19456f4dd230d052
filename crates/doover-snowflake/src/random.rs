use std::sync::{Arc, OnceLock};

use portable_atomic::{AtomicUsize, Ordering};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::DooverSnowflakeId;

/// A trait for sources of the random field.
///
/// This abstraction lets generators share the process-wide
/// [`ShuffledCycle`], own an isolated one, or use a mocked source in tests.
///
/// # Example
/// ```
/// use doover_snowflake::RandSource;
///
/// struct FixedRand;
/// impl RandSource<u8> for FixedRand {
///     fn rand(&self) -> u8 {
///         7
///     }
/// }
///
/// assert_eq!(FixedRand.rand(), 7);
/// ```
pub trait RandSource<T> {
    /// Returns the next random value.
    fn rand(&self) -> T;
}

impl<T, R: RandSource<T> + ?Sized> RandSource<T> for &R {
    fn rand(&self) -> T {
        (**self).rand()
    }
}

impl<T, R: RandSource<T> + ?Sized> RandSource<T> for Arc<R> {
    fn rand(&self) -> T {
        (**self).rand()
    }
}

/// Number of distinct values the 4-bit random field can hold.
pub const CYCLE_LEN: usize = DooverSnowflakeId::RANDOM_MASK as usize + 1;

/// A shuffled permutation of `0..=15`, replayed forever.
///
/// The permutation is fixed at construction. Each draw takes the value under
/// an atomically advanced cursor, so any 16 consecutive draws yield every
/// value exactly once, even when several threads draw at the same time.
/// `CYCLE_LEN` divides `usize::MAX + 1`, so the cursor wrapping around keeps
/// the cycle intact.
///
/// ## Features
/// - ✅ Thread-safe and lock-free
/// - ✅ Seedable for reproducible tests
///
/// # Example
/// ```
/// use doover_snowflake::{RandSource, ShuffledCycle};
///
/// let cycle = ShuffledCycle::from_seed(7);
/// let mut drawn: Vec<u8> = (0..16).map(|_| cycle.rand()).collect();
/// drawn.sort_unstable();
/// assert_eq!(drawn, (0..16).collect::<Vec<u8>>());
/// ```
#[derive(Debug)]
pub struct ShuffledCycle {
    values: [u8; CYCLE_LEN],
    cursor: AtomicUsize,
}

impl ShuffledCycle {
    /// Creates a cycle shuffled by the thread-local RNG.
    pub fn new() -> Self {
        Self::shuffled_by(&mut rand::rng())
    }

    /// Creates a cycle whose permutation is fully determined by `seed`.
    pub fn from_seed(seed: u64) -> Self {
        Self::shuffled_by(&mut StdRng::seed_from_u64(seed))
    }

    /// Creates a cycle that replays `values` in the given order.
    ///
    /// Returns `None` unless `values` is a permutation of `0..=15`.
    pub fn from_permutation(values: [u8; CYCLE_LEN]) -> Option<Self> {
        let mut seen = [false; CYCLE_LEN];
        for &v in &values {
            let slot = seen.get_mut(usize::from(v))?;
            if *slot {
                return None;
            }
            *slot = true;
        }
        Some(Self {
            values,
            cursor: AtomicUsize::new(0),
        })
    }

    fn shuffled_by<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut values = [0u8; CYCLE_LEN];
        for (i, v) in values.iter_mut().enumerate() {
            *v = i as u8;
        }
        values.shuffle(rng);
        Self {
            values,
            cursor: AtomicUsize::new(0),
        }
    }

    /// The permutation this cycle replays.
    pub fn permutation(&self) -> [u8; CYCLE_LEN] {
        self.values
    }

    /// Draws the next value and advances the cycle.
    pub fn next_value(&self) -> u8 {
        let pos = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.values[pos % CYCLE_LEN]
    }

    /// Returns the value the next draw will produce, without advancing.
    pub fn peek(&self) -> u8 {
        self.values[self.cursor.load(Ordering::Relaxed) % CYCLE_LEN]
    }
}

impl Default for ShuffledCycle {
    fn default() -> Self {
        Self::new()
    }
}

impl RandSource<u8> for ShuffledCycle {
    fn rand(&self) -> u8 {
        self.next_value()
    }
}

/// The cycle shared by every caller in this process.
///
/// Created on first use and never reset.
pub fn process_cycle() -> &'static ShuffledCycle {
    static CYCLE: OnceLock<ShuffledCycle> = OnceLock::new();
    CYCLE.get_or_init(ShuffledCycle::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::thread::scope;

    #[test]
    fn every_window_of_sixteen_covers_all_values() {
        let cycle = ShuffledCycle::from_seed(42);
        let drawn: Vec<u8> = (0..CYCLE_LEN * 4).map(|_| cycle.next_value()).collect();

        for window in drawn.windows(CYCLE_LEN) {
            let unique: HashSet<u8> = window.iter().copied().collect();
            assert_eq!(unique.len(), CYCLE_LEN);
            assert!(unique.iter().all(|v| usize::from(*v) < CYCLE_LEN));
        }
    }

    #[test]
    fn cycle_repeats_its_permutation() {
        let cycle = ShuffledCycle::from_seed(1);
        let first: Vec<u8> = (0..CYCLE_LEN).map(|_| cycle.next_value()).collect();
        let second: Vec<u8> = (0..CYCLE_LEN).map(|_| cycle.next_value()).collect();
        assert_eq!(first, second);
        assert_eq!(first, cycle.permutation().to_vec());
    }

    #[test]
    fn seeded_cycles_are_reproducible() {
        assert_eq!(
            ShuffledCycle::from_seed(99).permutation(),
            ShuffledCycle::from_seed(99).permutation()
        );
    }

    #[test]
    fn from_permutation_validates() {
        let identity: [u8; CYCLE_LEN] = core::array::from_fn(|i| i as u8);
        let cycle = ShuffledCycle::from_permutation(identity).unwrap();
        assert_eq!(cycle.peek(), 0);
        assert_eq!(cycle.next_value(), 0);
        assert_eq!(cycle.next_value(), 1);

        let mut duplicate = identity;
        duplicate[3] = 4;
        assert!(ShuffledCycle::from_permutation(duplicate).is_none());

        let mut out_of_range = identity;
        out_of_range[0] = 16;
        assert!(ShuffledCycle::from_permutation(out_of_range).is_none());
    }

    #[test]
    fn peek_does_not_advance() {
        let cycle = ShuffledCycle::from_seed(5);
        let next = cycle.peek();
        assert_eq!(cycle.peek(), next);
        assert_eq!(cycle.next_value(), next);
    }

    #[test]
    fn concurrent_draws_keep_uniform_coverage() {
        const THREADS: usize = 8;
        const DRAWS_PER_THREAD: usize = CYCLE_LEN * 64;

        let cycle = ShuffledCycle::new();
        let counts = Mutex::new([0usize; CYCLE_LEN]);

        scope(|s| {
            for _ in 0..THREADS {
                s.spawn(|| {
                    let mut local = [0usize; CYCLE_LEN];
                    for _ in 0..DRAWS_PER_THREAD {
                        local[usize::from(cycle.next_value())] += 1;
                    }
                    let mut counts = counts.lock().unwrap();
                    for (total, n) in counts.iter_mut().zip(local) {
                        *total += n;
                    }
                });
            }
        });

        let expected = THREADS * DRAWS_PER_THREAD / CYCLE_LEN;
        assert!(counts.into_inner().unwrap().iter().all(|&n| n == expected));
    }

    #[test]
    fn process_cycle_is_shared() {
        assert!(core::ptr::eq(process_cycle(), process_cycle()));
    }
}
