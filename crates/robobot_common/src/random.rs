//! Random choices made while replying (ticket ids, fallback phrasing).
//!
//! Production uses the thread-local RNG; tests inject a seeded or fixed source.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Smallest ticket number
pub const TICKET_MIN: u16 = 1000;

/// Largest ticket number
pub const TICKET_MAX: u16 = 9999;

pub trait RandomSource: Send + Sync {
    /// Ticket number in `TICKET_MIN..=TICKET_MAX`
    fn ticket_number(&self) -> u16;

    /// Index in `0..len`; `len` is never zero
    fn pick(&self, len: usize) -> usize;
}

/// Thread-local RNG, not reproducible
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn ticket_number(&self) -> u16 {
        rand::thread_rng().gen_range(TICKET_MIN..=TICKET_MAX)
    }

    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Seeded RNG, reproducible for a given seed
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn ticket_number(&self) -> u16 {
        self.rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .gen_range(TICKET_MIN..=TICKET_MAX)
    }

    fn pick(&self, len: usize) -> usize {
        self.rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .gen_range(0..len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_random_ranges() {
        let rng = ThreadRandom;
        for _ in 0..500 {
            let n = rng.ticket_number();
            assert!((TICKET_MIN..=TICKET_MAX).contains(&n));
            assert!(rng.pick(3) < 3);
        }
    }

    #[test]
    fn test_seeded_random_is_reproducible() {
        let a = SeededRandom::new(42);
        let b = SeededRandom::new(42);
        for _ in 0..20 {
            assert_eq!(a.ticket_number(), b.ticket_number());
            assert_eq!(a.pick(3), b.pick(3));
        }
    }

    #[test]
    fn test_pick_single_option() {
        assert_eq!(SeededRandom::new(7).pick(1), 0);
        assert_eq!(ThreadRandom.pick(1), 0);
    }
}
