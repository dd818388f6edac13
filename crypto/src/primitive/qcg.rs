use super::{nonzero_modulus, seed_word, words_to_seed, WordRecurrence, WordTap};
use crate::error::GeneratorResult;
use crate::generator::{check_output, check_seed_len, fmt_redacted, released, Generator, Sealed};
use rngforge_types::{GeneratorKind, PrimitiveVariant};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const DEFAULT_A: u32 = 0x57FF7;
pub const DEFAULT_C: u32 = 0x0041_8693;
pub const DEFAULT_D: u32 = 2;
pub const DEFAULT_M: u32 = 0xFFFF_FFFC;
pub const DEFAULT_X0: u32 = 0x8299;

/// Seed length that also carries the coefficients `a, c, d, m`.
pub const FULL_SEED_LEN: usize = 20;

const KIND: GeneratorKind = GeneratorKind::Primitive(PrimitiveVariant::Qcg);

#[derive(Zeroize, ZeroizeOnDrop)]
struct QcgState {
    x: u32,
    a: u32,
    c: u32,
    d: u32,
    m: u32,
    tap: WordTap,
}

impl WordRecurrence for QcgState {
    /// `x <- d*x^2 + a*x + c (mod m)`, evaluated without overflow.
    fn step(&mut self) -> u32 {
        let (x, m) = (u64::from(self.x), u64::from(self.m));
        let square = x * x % m;
        let quadratic = u64::from(self.d) * square % m;
        let linear = u64::from(self.a) * x % m;
        self.x = ((quadratic + linear + u64::from(self.c)) % m) as u32;
        self.x
    }

    fn tap(&mut self) -> &mut WordTap {
        &mut self.tap
    }
}

/// Quadratic congruential generator.
///
/// A seed of 20 or more bytes is read as the little-endian words
/// `x, a, c, d, m`. A shorter seed sets `x` and restores the default
/// coefficients.
pub struct Qcg {
    state: Option<QcgState>,
}

impl fmt::Debug for Qcg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_redacted(self, "Qcg", f)
    }
}


impl Qcg {
    /// Default coefficients starting from `x0 = 0x8299`.
    pub fn new() -> Self {
        Self {
            state: Some(QcgState {
                x: DEFAULT_X0,
                a: DEFAULT_A,
                c: DEFAULT_C,
                d: DEFAULT_D,
                m: DEFAULT_M,
                tap: WordTap::default(),
            }),
        }
    }

    pub fn with_params(x0: u32, a: u32, c: u32, d: u32, m: u32) -> GeneratorResult<Self> {
        let mut qcg = Self::new();
        qcg.seed(&words_to_seed(&[x0, a, c, d, m]))?;
        Ok(qcg)
    }

    pub fn from_seed(seed: &[u8]) -> GeneratorResult<Self> {
        let mut qcg = Self::new();
        qcg.seed(seed)?;
        Ok(qcg)
    }

    fn state_mut(&mut self) -> GeneratorResult<&mut QcgState> {
        self.state.as_mut().ok_or_else(|| released(KIND))
    }
}

impl Default for Qcg {
    fn default() -> Self {
        Self::new()
    }
}

impl Sealed for Qcg {}

impl Generator for Qcg {
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
        check_seed_len(seed, PrimitiveVariant::Qcg.min_seed_len(), KIND)?;
        let (a, c, d, m) = if seed.len() >= FULL_SEED_LEN {
            let m = nonzero_modulus(seed_word(seed, 4))?;
            (seed_word(seed, 1), seed_word(seed, 2), seed_word(seed, 3), m)
        } else {
            (DEFAULT_A, DEFAULT_C, DEFAULT_D, DEFAULT_M)
        };
        state.x = seed_word(seed, 0);
        state.a = a;
        state.c = c;
        state.d = d;
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
    fn known_first_word() {
        // d*1 + a*1 + c = 2 + 0x57FF7 + 0x418693 = 0x0047068C
        let mut qcg = Qcg::from_seed(&1u32.to_le_bytes()).unwrap();
        let mut out = [0u8; 3];
        qcg.extract(&mut out).unwrap();
        assert_eq!(out, [0x00, 0x47, 0x06]);
    }

    #[test]
    fn full_seed_overrides_coefficients() {
        // a = 0, c = 0, d = 1, m = 2^32 - 1: squares only.
        let mut qcg = Qcg::with_params(0x1000, 0, 0, 1, u32::MAX).unwrap();
        let mut out = [0u8; 6];
        qcg.extract(&mut out).unwrap();
        // 0x1000^2 = 0x0100_0000, then 0x0100_0000^2 mod (2^32 - 1) = 0x0001_0000
        assert_eq!(out, [0x01, 0x00, 0x00, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn large_terms_do_not_overflow() {
        let (x0, a, c, d, m) = (u32::MAX - 1, u32::MAX - 3, u32::MAX - 4, u32::MAX - 2, u32::MAX);
        let mut qcg = Qcg::with_params(x0, a, c, d, m).unwrap();

        let (x, m) = (u64::from(x0), u64::from(m));
        let expected = (u64::from(d) * (x * x % m) % m + u64::from(a) * x % m + u64::from(c)) % m;
        let mut out = [0u8; 3];
        qcg.extract(&mut out).unwrap();
        let word = (expected as u32).to_be_bytes();
        assert_eq!(out, [word[0], word[1], word[2]]);
        assert_ne!(expected, 0);
    }

    #[test]
    fn zero_modulus_rejected() {
        let err = Qcg::with_params(1, 1, 1, 1, 0).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::InvalidValue);
    }

    #[test]
    fn short_seed_rejected() {
        let mut qcg = Qcg::new();
        assert_eq!(qcg.seed(&[1, 2, 3]).unwrap_err().error_code(), ErrorCode::InvalidLength);
        assert_eq!(qcg.seed(&[]).unwrap_err().error_code(), ErrorCode::InvalidArgument);
    }

    #[test]
    fn reseed_drops_pending_bytes() {
        let mut used = Qcg::new();
        let mut one = [0u8; 1];
        used.extract(&mut one).unwrap();
        used.seed(&0xDEADu32.to_le_bytes()).unwrap();

        let mut fresh = Qcg::from_seed(&0xDEADu32.to_le_bytes()).unwrap();
        let mut a = [0u8; 30];
        let mut b = [0u8; 30];
        used.extract(&mut a).unwrap();
        fresh.extract(&mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn short_reseed_restores_default_coefficients() {
        let mut used = Qcg::with_params(1, 3, 5, 7, 1_000_003).unwrap();
        let mut scratch = [0u8; 5];
        used.extract(&mut scratch).unwrap();
        used.seed(&0x1234u32.to_le_bytes()).unwrap();

        let mut fresh = Qcg::from_seed(&0x1234u32.to_le_bytes()).unwrap();
        let mut a = [0u8; 24];
        let mut b = [0u8; 24];
        used.extract(&mut a).unwrap();
        fresh.extract(&mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn split_reads_are_continuous() {
        let mut whole = Qcg::new();
        let mut split = Qcg::new();
        let mut expected = [0u8; 20];
        whole.extract(&mut expected).unwrap();
        let mut got = [0u8; 20];
        for chunk in got.chunks_mut(7) {
            split.extract(chunk).unwrap();
        }
        assert_eq!(got, expected);
    }
}
