//! Default seed material for generators constructed without an explicit seed.
//!
//! The values are *not* cryptographic: they only make two unseeded
//! generators created in quick succession diverge.

use crate::primitive::lcg::{INCREMENT, MULTIPLIER};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Per-instance counter step between successive draws.
const COUNTER_STEP: u64 = 11;

/// Mixes wall-clock time, process id and a draw counter into seed words.
///
/// State is held in the value itself. Callers that want distinct defaults
/// for a batch of generators share one `EntropySeed` across them.
#[derive(Debug)]
pub struct EntropySeed {
    draws: u64,
    origin: Instant,
}

impl EntropySeed {
    pub fn new() -> Self {
        Self {
            draws: 0,
            origin: Instant::now(),
        }
    }

    /// Returns the next 64-bit default seed value.
    pub fn next_value(&mut self) -> u64 {
        self.draws = self.draws.wrapping_add(COUNTER_STEP);

        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        let elapsed = self.origin.elapsed().as_nanos() as u64;
        let pid = u64::from(std::process::id());

        let mixed = self
            .draws
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(pid.rotate_left(32) ^ wall);
        mixed.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT) ^ elapsed
    }

    /// Default seed bytes in the little-endian layout used by `seed`.
    pub fn next_seed(&mut self) -> [u8; 8] {
        self.next_value().to_le_bytes()
    }
}

impl Default for EntropySeed {
    fn default() -> Self {
        Self::new()
    }
}
