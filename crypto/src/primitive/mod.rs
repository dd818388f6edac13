//! Primitive arithmetic generators.
//!
//! Every primitive owns its numeric state inside an `Option`; `None` marks a
//! torn-down generator. State types derive `Zeroize` so teardown and drop
//! both scrub the recurrence words.
//!
//! The word-oriented recurrences (QCG, Coveyou, Fibonacci, GCK and
//! Mitchell–Moore) share one output rule: each state step yields a 32-bit
//! word of which the top three bytes are emitted, most significant first.
//! The low byte is discarded. Bytes not yet consumed by one `extract` are
//! delivered by the next one, so splitting a read never changes the stream.

pub mod coveyou;
pub mod fibonacci;
pub mod gck;
pub mod lcg;
pub mod mitchell_moore;
pub mod nlfsr;
pub mod qcg;

pub use coveyou::Coveyou;
pub use fibonacci::Fibonacci;
pub use gck::Gck;
pub use lcg::Lcg;
pub use mitchell_moore::MitchellMoore;
pub use nlfsr::Nlfsr;
pub use qcg::Qcg;

use crate::error::{GeneratorError, GeneratorResult};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Modulus shared by the Coveyou, Fibonacci, GCK and Mitchell–Moore defaults.
pub const DEFAULT_MODULUS: u32 = 0xFFFF_FFFB;

/// Bytes emitted per recurrence word.
pub(crate) const BYTES_PER_WORD: usize = 3;

/// Reads the `index`-th little-endian 32-bit word of a seed buffer.
///
/// Callers check the seed length first.
pub(crate) fn seed_word(seed: &[u8], index: usize) -> u32 {
    let at = index * 4;
    u32::from_le_bytes([seed[at], seed[at + 1], seed[at + 2], seed[at + 3]])
}

/// Rejects a zero modulus taken from seed material.
pub(crate) fn nonzero_modulus(m: u32) -> GeneratorResult<u32> {
    if m == 0 {
        return Err(GeneratorError::InvalidValue("modulus must be non-zero".into()));
    }
    Ok(m)
}

/// Output bytes of the current word still waiting to be extracted.
#[derive(Debug, Default, Clone, Zeroize)]
pub(crate) struct WordTap {
    pending: [u8; BYTES_PER_WORD],
    available: usize,
}

impl WordTap {
    /// Replaces any pending bytes with the top three bytes of `word`.
    pub(crate) fn load(&mut self, word: u32) {
        let bytes = word.to_be_bytes();
        self.pending = [bytes[0], bytes[1], bytes[2]];
        self.available = BYTES_PER_WORD;
    }

    pub(crate) fn take(&mut self) -> Option<u8> {
        if self.available == 0 {
            return None;
        }
        let byte = self.pending[BYTES_PER_WORD - self.available];
        self.available -= 1;
        Some(byte)
    }

    pub(crate) fn clear(&mut self) {
        self.zeroize();
    }
}

/// A recurrence producing one 32-bit output word per step.
pub(crate) trait WordRecurrence {
    /// Advances the recurrence and returns the new output word.
    fn step(&mut self) -> u32;

    fn tap(&mut self) -> &mut WordTap;

    /// One state transition; the new word replaces any pending bytes.
    fn advance_word(&mut self) {
        let word = self.step();
        self.tap().load(word);
    }

    /// Fills `out`, stepping only when the pending bytes run out.
    fn fill(&mut self, out: &mut [u8]) {
        for byte in out.iter_mut() {
            *byte = loop {
                if let Some(b) = self.tap().take() {
                    break b;
                }
                self.advance_word();
            };
        }
    }
}

/// Ring of lagged words addressed relative to a moving head.
///
/// Logical index 0 is the oldest word. `rotate_in` drops it and appends a
/// new word at the tail, which is the shift-left-and-append step of the
/// lagged recurrences without moving memory.
#[derive(Debug, Clone, Zeroize, ZeroizeOnDrop)]
pub(crate) struct LagRing {
    words: Vec<u32>,
    head: usize,
}

impl LagRing {
    /// Copies `len` little-endian words out of `seed`.
    pub(crate) fn from_seed(seed: &[u8], len: usize) -> GeneratorResult<Self> {
        let mut words = Vec::new();
        words.try_reserve_exact(len).map_err(|e| {
            GeneratorError::AllocationFailure(format!("lag ring of {len} words: {e}"))
        })?;
        words.extend((0..len).map(|i| seed_word(seed, i)));
        Ok(Self { words, head: 0 })
    }

    pub(crate) fn len(&self) -> usize {
        self.words.len()
    }

    pub(crate) fn at(&self, index: usize) -> u32 {
        self.words[(self.head + index) % self.words.len()]
    }

    pub(crate) fn rotate_in(&mut self, word: u32) {
        self.words[self.head] = word;
        self.head = (self.head + 1) % self.words.len();
    }
}

/// Serializes words into the little-endian seed layout.
pub(crate) fn words_to_seed(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}
