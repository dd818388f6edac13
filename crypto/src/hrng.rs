//! Hash-based generator: a counter hashed block by block.
//!
//! Seeding sets the counter to `H(seed)`. Every refill increments the last
//! counter word and hashes the whole counter into a fresh output block.
//! Output is served lazily: a block is only refilled when a read needs more
//! bytes than remain in the current one.

use crate::entropy::EntropySeed;
use crate::error::{GeneratorError, GeneratorResult};
use crate::generator::{check_output, check_seed, fmt_redacted, released, Generator, Sealed};
use rngforge_types::GeneratorKind;
use sha2::{Digest, Sha512};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Digest width, counter width and output block size in bytes.
pub const BLOCK_LEN: usize = 64;

const COUNTER_WORDS: usize = BLOCK_LEN / 8;
const KIND: GeneratorKind = GeneratorKind::Hash;

/// One-shot hash function producing a 64-byte digest.
pub trait DigestFunction {
    /// Hashes `input` into `output`, which must be [`BLOCK_LEN`] bytes.
    fn digest_into(&mut self, input: &[u8], output: &mut [u8]) -> GeneratorResult<()>;
}

/// SHA-512 from the `sha2` crate.
#[derive(Default, Clone)]
pub struct Sha512Digest {
    hasher: Sha512,
}

impl DigestFunction for Sha512Digest {
    fn digest_into(&mut self, input: &[u8], output: &mut [u8]) -> GeneratorResult<()> {
        if output.len() != BLOCK_LEN {
            return Err(GeneratorError::InvalidLength(format!(
                "digest output must be {BLOCK_LEN} bytes, got {}",
                output.len()
            )));
        }
        self.hasher.update(input);
        output.copy_from_slice(&self.hasher.finalize_reset());
        Ok(())
    }
}

#[derive(Zeroize, ZeroizeOnDrop)]
struct HrngState {
    counter: [u64; COUNTER_WORDS],
    buffer: [u8; BLOCK_LEN],
    /// Unread bytes at the tail of `buffer`.
    capacity: usize,
}

impl HrngState {
    fn counter_bytes(&self) -> [u8; BLOCK_LEN] {
        let mut bytes = [0u8; BLOCK_LEN];
        for (chunk, word) in bytes.chunks_exact_mut(8).zip(self.counter.iter()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    fn refill<D: DigestFunction>(&mut self, digest: &mut D) -> GeneratorResult<()> {
        let last = COUNTER_WORDS - 1;
        self.counter[last] = self.counter[last].wrapping_add(1);
        let mut input = self.counter_bytes();
        let result = digest.digest_into(&input, &mut self.buffer);
        input.zeroize();
        result?;
        self.capacity = BLOCK_LEN;
        Ok(())
    }

    fn reset<D: DigestFunction>(&mut self, digest: &mut D, seed: &[u8]) -> GeneratorResult<()> {
        let mut hashed = [0u8; BLOCK_LEN];
        let result = digest.digest_into(seed, &mut hashed);
        if result.is_ok() {
            for (word, chunk) in self.counter.iter_mut().zip(hashed.chunks_exact(8)) {
                let mut le = [0u8; 8];
                le.copy_from_slice(chunk);
                *word = u64::from_le_bytes(le);
            }
        }
        hashed.zeroize();
        result?;
        self.refill(digest)
    }
}

/// Counter-mode hash generator, SHA-512 unless another
/// [`DigestFunction`] is supplied.
pub struct Hrng<D: DigestFunction = Sha512Digest> {
    digest: D,
    state: Option<HrngState>,
}

impl<D: DigestFunction> fmt::Debug for Hrng<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_redacted(self, "Hrng", f)
    }
}

impl Hrng<Sha512Digest> {
    /// SHA-512 generator seeded from a fresh [`EntropySeed`].
    pub fn new() -> GeneratorResult<Self> {
        Self::with_entropy(&mut EntropySeed::new())
    }

    pub fn with_entropy(entropy: &mut EntropySeed) -> GeneratorResult<Self> {
        let mut seed = entropy.next_seed();
        let hrng = Self::from_seed(&seed);
        seed.zeroize();
        hrng
    }

    pub fn from_seed(seed: &[u8]) -> GeneratorResult<Self> {
        Self::with_digest(Sha512Digest::default(), seed)
    }
}

impl<D: DigestFunction> Hrng<D> {
    pub fn with_digest(digest: D, seed: &[u8]) -> GeneratorResult<Self> {
        let mut hrng = Self {
            digest,
            state: Some(HrngState {
                counter: [0; COUNTER_WORDS],
                buffer: [0; BLOCK_LEN],
                capacity: 0,
            }),
        };
        hrng.seed(seed)?;
        Ok(hrng)
    }

    /// Unread bytes left in the current block.
    pub fn capacity(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.capacity)
    }
}

impl<D: DigestFunction> Sealed for Hrng<D> {}

impl<D: DigestFunction> Generator for Hrng<D> {
    fn kind(&self) -> GeneratorKind {
        KIND
    }

    fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    fn advance(&mut self) -> GeneratorResult<()> {
        let state = self.state.as_mut().ok_or_else(|| released(KIND))?;
        state.refill(&mut self.digest)
    }

    fn seed(&mut self, seed: &[u8]) -> GeneratorResult<()> {
        let state = self.state.as_mut().ok_or_else(|| released(KIND))?;
        check_seed(seed)?;
        state.reset(&mut self.digest, seed)?;
        tracing::debug!(algorithm = %KIND, seed_bytes = seed.len(), "seeded generator");
        Ok(())
    }

    fn extract(&mut self, out: &mut [u8]) -> GeneratorResult<()> {
        let state = self.state.as_mut().ok_or_else(|| released(KIND))?;
        check_output(out)?;

        let mut written = 0;
        while out.len() - written > state.capacity {
            let start = BLOCK_LEN - state.capacity;
            let end = written + state.capacity;
            out[written..end].copy_from_slice(&state.buffer[start..]);
            written = end;
            state.refill(&mut self.digest)?;
        }
        let rest = out.len() - written;
        let start = BLOCK_LEN - state.capacity;
        out[written..].copy_from_slice(&state.buffer[start..start + rest]);
        state.capacity -= rest;
        Ok(())
    }

    fn teardown(&mut self) -> GeneratorResult<()> {
        if let Some(mut state) = self.state.take() {
            state.zeroize();
        }
        Ok(())
    }
}
