//! Uniform random draws behind a swappable source.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rand::Rng;

/// Source of uniform integer and duration draws.
///
/// Both operations draw from the half-open range `[from, to)`. A degenerate
/// range (`from >= to`) yields `from`.
pub trait RandomSource: Send + Sync {
    fn int(&self, from: u64, to: u64) -> u64;

    fn duration(&self, from: Duration, to: Duration) -> Duration;
}

/// Production source backed by the thread-local generator, which is
/// seeded from the OS and periodically reseeded.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn int(&self, from: u64, to: u64) -> u64 {
        if from >= to {
            return from;
        }
        rand::thread_rng().gen_range(from..to)
    }

    fn duration(&self, from: Duration, to: Duration) -> Duration {
        if from >= to {
            return from;
        }
        let span = (to - from).as_nanos();
        let offset = rand::thread_rng().gen_range(0..span);
        from + Duration::from_nanos(u64::try_from(offset).unwrap_or(u64::MAX))
    }
}

/// Deterministic source that ignores the requested range and returns the
/// programmed values.
#[derive(Debug, Default)]
pub struct FixedRandom {
    int: AtomicU64,
    duration_nanos: AtomicU64,
}

impl FixedRandom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_int(value: u64) -> Self {
        let random = Self::new();
        random.set_int(value);
        random
    }

    pub fn with_duration(value: Duration) -> Self {
        let random = Self::new();
        random.set_duration(value);
        random
    }

    pub fn set_int(&self, value: u64) {
        self.int.store(value, Ordering::SeqCst);
    }

    pub fn set_duration(&self, value: Duration) {
        let nanos = u64::try_from(value.as_nanos()).unwrap_or(u64::MAX);
        self.duration_nanos.store(nanos, Ordering::SeqCst);
    }
}

impl RandomSource for FixedRandom {
    fn int(&self, _from: u64, _to: u64) -> u64 {
        self.int.load(Ordering::SeqCst)
    }

    fn duration(&self, _from: Duration, _to: Duration) -> Duration {
        Duration::from_nanos(self.duration_nanos.load(Ordering::SeqCst))
    }
}
