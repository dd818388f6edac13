use crate::entropy::EntropySeed;
use crate::error::GeneratorResult;
use crate::generator::{check_output, check_seed, fmt_redacted, released, Generator, Sealed};
use rngforge_types::{GeneratorKind, PrimitiveVariant};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub(crate) const MULTIPLIER: u64 = 125_643_267_795_740_073;
pub(crate) const INCREMENT: u64 = 506_098_983_240_188_723;

const KIND: GeneratorKind = GeneratorKind::Primitive(PrimitiveVariant::Lcg);

#[derive(Zeroize, ZeroizeOnDrop)]
struct LcgState {
    x: u64,
}

impl LcgState {
    fn step(&mut self) {
        self.x = self.x.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
    }
}

/// Linear congruential generator `x <- a*x + c (mod 2^64)`.
///
/// Each output byte is bits 16..24 of the current state, after which the
/// state advances once.
pub struct Lcg {
    state: Option<LcgState>,
}

impl fmt::Debug for Lcg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_redacted(self, "Lcg", f)
    }
}

impl Lcg {
    /// Creates a generator seeded from a fresh [`EntropySeed`].
    pub fn new() -> Self {
        Self::with_entropy(&mut EntropySeed::new())
    }

    /// Creates a generator seeded from a caller-held entropy helper.
    pub fn with_entropy(entropy: &mut EntropySeed) -> Self {
        let mut lcg = Self::unseeded();
        if let Some(state) = lcg.state.as_mut() {
            absorb(state, &entropy.next_seed());
        }
        lcg
    }

    pub fn from_seed(seed: &[u8]) -> GeneratorResult<Self> {
        let mut lcg = Self::unseeded();
        lcg.seed(seed)?;
        Ok(lcg)
    }

    fn unseeded() -> Self {
        Self {
            state: Some(LcgState { x: 0 }),
        }
    }

    fn state_mut(&mut self) -> GeneratorResult<&mut LcgState> {
        self.state.as_mut().ok_or_else(|| released(KIND))
    }
}

impl Default for Lcg {
    fn default() -> Self {
        Self::new()
    }
}

/// Starts from the first seed byte, then steps and adds every byte in turn,
/// finishing with one extra step.
fn absorb(state: &mut LcgState, seed: &[u8]) {
    state.x = u64::from(seed[0]);
    for &byte in seed {
        state.step();
        state.x = state.x.wrapping_add(u64::from(byte));
    }
    state.step();
}

impl Sealed for Lcg {}

impl Generator for Lcg {
    fn kind(&self) -> GeneratorKind {
        KIND
    }

    fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    fn advance(&mut self) -> GeneratorResult<()> {
        self.state_mut()?.step();
        Ok(())
    }

    fn seed(&mut self, seed: &[u8]) -> GeneratorResult<()> {
        let state = self.state_mut()?;
        check_seed(seed)?;
        absorb(state, seed);
        tracing::debug!(algorithm = %KIND, seed_bytes = seed.len(), "seeded generator");
        Ok(())
    }

    fn extract(&mut self, out: &mut [u8]) -> GeneratorResult<()> {
        let state = self.state_mut()?;
        check_output(out)?;
        for byte in out.iter_mut() {
            *byte = (state.x >> 16) as u8;
            state.step();
        }
        Ok(())
    }

    fn teardown(&mut self) -> GeneratorResult<()> {
        if let Some(mut state) = self.state.take() {
            state.zeroize();
        }
        Ok(())
    }
}
