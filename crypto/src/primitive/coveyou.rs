use super::{nonzero_modulus, seed_word, words_to_seed, WordRecurrence, WordTap, DEFAULT_MODULUS};
use crate::error::{GeneratorError, GeneratorResult};
use crate::generator::{check_output, check_seed_len, fmt_redacted, released, Generator, Sealed};
use rngforge_types::{GeneratorKind, PrimitiveVariant};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const DEFAULT_X0: u32 = 0x0038_0316;

const KIND: GeneratorKind = GeneratorKind::Primitive(PrimitiveVariant::Coveyou);

#[derive(Zeroize, ZeroizeOnDrop)]
struct CoveyouState {
    x: u32,
    m: u32,
    tap: WordTap,
}

impl WordRecurrence for CoveyouState {
    fn step(&mut self) -> u32 {
        let x = u64::from(self.x);
        self.x = (x * (x + 1) % u64::from(self.m)) as u32;
        self.x
    }

    fn tap(&mut self) -> &mut WordTap {
        &mut self.tap
    }
}

/// Coveyou's quadratic generator `x <- x(x + 1) (mod m)`.
///
/// The starting value must be congruent to 2 modulo 4. A seed of at least
/// eight bytes carries the modulus in its second word; a shorter one
/// restores the default modulus.
pub struct Coveyou {
    state: Option<CoveyouState>,
}

impl fmt::Debug for Coveyou {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_redacted(self, "Coveyou", f)
    }
}

impl Coveyou {
    pub fn new() -> Self {
        Self {
            state: Some(CoveyouState {
                x: DEFAULT_X0,
                m: DEFAULT_MODULUS,
                tap: WordTap::default(),
            }),
        }
    }

    pub fn with_params(x0: u32, m: u32) -> GeneratorResult<Self> {
        let mut coveyou = Self::new();
        coveyou.seed(&words_to_seed(&[x0, m]))?;
        Ok(coveyou)
    }

    pub fn from_seed(seed: &[u8]) -> GeneratorResult<Self> {
        let mut coveyou = Self::new();
        coveyou.seed(seed)?;
        Ok(coveyou)
    }

    fn state_mut(&mut self) -> GeneratorResult<&mut CoveyouState> {
        self.state.as_mut().ok_or_else(|| released(KIND))
    }
}

impl Default for Coveyou {
    fn default() -> Self {
        Self::new()
    }
}

impl Sealed for Coveyou {}

impl Generator for Coveyou {
    fn kind(&self) -> GeneratorKind {
        KIND
    }

    fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    fn advance(&mut self) -> GeneratorResult<()> {
        self.state_mut()?.advance_word();
        Ok(())
    }

    fn seed(&mut self, seed: &[u8]) -> GeneratorResult<()> {
        let state = self.state_mut()?;
        check_seed_len(seed, PrimitiveVariant::Coveyou.min_seed_len(), KIND)?;
        let x = seed_word(seed, 0);
        if x & 3 != 2 {
            return Err(GeneratorError::InvalidValue(format!(
                "starting value {x:#x} is not congruent to 2 mod 4"
            )));
        }
        let m = if seed.len() >= 8 {
            nonzero_modulus(seed_word(seed, 1))?
        } else {
            DEFAULT_MODULUS
        };
        state.x = x;
        state.m = m;
        state.tap.clear();
        tracing::debug!(algorithm = %KIND, seed_bytes = seed.len(), "seeded generator");
        Ok(())
    }

    fn extract(&mut self, out: &mut [u8]) -> GeneratorResult<()> {
        let state = self.state_mut()?;
        check_output(out)?;
        state.fill(out);
        Ok(())
    }

    fn teardown(&mut self) -> GeneratorResult<()> {
        if let Some(mut state) = self.state.take() {
            state.zeroize();
        }
        Ok(())
    }
}
