//! Time and randomness sources used for deadlines and instance names.
//!
//! Both are injected so tests can pin the clock and seed the generator while
//! production uses wall-clock time and thread-local entropy.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of the current time.
pub trait Clock {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Source of non-negative 63-bit integers for instance-name suffixes.
pub trait RandomSource {
    /// Returns the next integer; never exceeds `i64::MAX`.
    fn next_int(&self) -> u64;
}

/// Thread-local entropy; effectively unique across processes.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_int(&self) -> u64 {
        rand::thread_rng().next_u64() >> 1
    }
}

/// Reproducible generator seeded from a fixed value.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<ChaCha8Rng>,
}

impl SeededRandom {
    /// Creates a generator that yields the same sequence for the same seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_int(&self) -> u64 {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.next_u64() >> 1
    }
}

impl<T: RandomSource + ?Sized> RandomSource for &T {
    fn next_int(&self) -> u64 {
        (**self).next_int()
    }
}

impl<T: RandomSource + ?Sized> RandomSource for Box<T> {
    fn next_int(&self) -> u64 {
        (**self).next_int()
    }
}
