use super::{nonzero_modulus, seed_word, words_to_seed, WordRecurrence, WordTap, DEFAULT_MODULUS};
use crate::error::GeneratorResult;
use crate::generator::{check_output, check_seed_len, fmt_redacted, released, Generator, Sealed};
use rngforge_types::{GeneratorKind, PrimitiveVariant};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Default `(x_n, x_{n-1})` pair.
pub const DEFAULT_PAIR: (u32, u32) = (0x4E5F_6A7B, 0xA1B2_C3D4);

const KIND: GeneratorKind = GeneratorKind::Primitive(PrimitiveVariant::Fibonacci);

#[derive(Zeroize, ZeroizeOnDrop)]
struct FibonacciState {
    current: u32,
    previous: u32,
    m: u32,
    tap: WordTap,
}

impl WordRecurrence for FibonacciState {
    fn step(&mut self) -> u32 {
        let next = (u64::from(self.current) + u64::from(self.previous)) % u64::from(self.m);
        self.previous = self.current;
        self.current = next as u32;
        self.current
    }

    fn tap(&mut self) -> &mut WordTap {
        &mut self.tap
    }
}

/// Additive Fibonacci generator `x_{n+1} = x_n + x_{n-1} (mod m)`.
///
/// Seeds are the little-endian words `x_n, x_{n-1}` and optionally `m`.
/// Without a third word the default modulus applies.
pub struct Fibonacci {
    state: Option<FibonacciState>,
}

impl fmt::Debug for Fibonacci {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_redacted(self, "Fibonacci", f)
    }
}

impl Fibonacci {
    pub fn new() -> Self {
        Self {
            state: Some(FibonacciState {
                current: DEFAULT_PAIR.0,
                previous: DEFAULT_PAIR.1,
                m: DEFAULT_MODULUS,
                tap: WordTap::default(),
            }),
        }
    }

    pub fn with_params(current: u32, previous: u32, m: u32) -> GeneratorResult<Self> {
        let mut fibonacci = Self::new();
        fibonacci.seed(&words_to_seed(&[current, previous, m]))?;
        Ok(fibonacci)
    }

    pub fn from_seed(seed: &[u8]) -> GeneratorResult<Self> {
        let mut fibonacci = Self::new();
        fibonacci.seed(seed)?;
        Ok(fibonacci)
    }

    fn state_mut(&mut self) -> GeneratorResult<&mut FibonacciState> {
        self.state.as_mut().ok_or_else(|| released(KIND))
    }
}

impl Default for Fibonacci {
    fn default() -> Self {
        Self::new()
    }
}

impl Sealed for Fibonacci {}

impl Generator for Fibonacci {
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
        check_seed_len(seed, PrimitiveVariant::Fibonacci.min_seed_len(), KIND)?;
        let m = if seed.len() >= 12 {
            nonzero_modulus(seed_word(seed, 2))?
        } else {
            DEFAULT_MODULUS
        };
        state.current = seed_word(seed, 0);
        state.previous = seed_word(seed, 1);
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

#[cfg(test)]
mod tests {
    use super::*;
    use rngforge_types::ErrorCode;

    #[test]
    fn pair_recurrence() {
        // 0x0100_0000 + 0x0100_0000 = 0x0200_0000, then 0x0300_0000, 0x0500_0000
        let mut fibonacci = Fibonacci::with_params(0x0100_0000, 0x0100_0000, u32::MAX).unwrap();
        let mut out = [0u8; 9];
        fibonacci.extract(&mut out).unwrap();
        assert_eq!(out, [0x02, 0, 0, 0x03, 0, 0, 0x05, 0, 0]);
    }

    #[test]
    fn sum_wraps_through_modulus() {
        let mut fibonacci = Fibonacci::with_params(0xFFFF_FFF0, 0xFFFF_FFF0, DEFAULT_MODULUS).unwrap();
        fibonacci.advance().unwrap();
        let expected = ((0xFFFF_FFF0u64 * 2) % u64::from(DEFAULT_MODULUS)) as u32;
        assert_eq!(fibonacci.state.as_ref().unwrap().current, expected);
    }

    #[test]
    fn eight_byte_seed_keeps_default_modulus() {
        let mut fibonacci = Fibonacci::from_seed(&words_to_seed(&[1, 2])).unwrap();
        assert_eq!(fibonacci.state_mut().unwrap().m, DEFAULT_MODULUS);
        assert_eq!(
            Fibonacci::from_seed(&[0u8; 7]).unwrap_err().error_code(),
            ErrorCode::InvalidLength
        );
        assert_eq!(
            Fibonacci::with_params(1, 1, 0).unwrap_err().error_code(),
            ErrorCode::InvalidValue
        );
    }

    #[test]
    fn short_reseed_restores_default_modulus() {
        let mut used = Fibonacci::with_params(1, 2, 1_000_003).unwrap();
        let mut scratch = [0u8; 7];
        used.extract(&mut scratch).unwrap();
        let pair = words_to_seed(&[0x0A0B_0C0D, 0x0102_0304]);
        used.seed(&pair).unwrap();
        assert_eq!(used.state_mut().unwrap().m, DEFAULT_MODULUS);

        let mut fresh = Fibonacci::from_seed(&pair).unwrap();
        let mut a = [0u8; 21];
        let mut b = [0u8; 21];
        used.extract(&mut a).unwrap();
        fresh.extract(&mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn default_stream_is_reproducible() {
        let mut a = Fibonacci::new();
        let mut b = Fibonacci::default();
        let mut x = [0u8; 48];
        let mut y = [0u8; 48];
        a.extract(&mut x).unwrap();
        b.extract(&mut y[..13]).unwrap();
        b.extract(&mut y[13..]).unwrap();
        assert_eq!(x, y);
    }
}
