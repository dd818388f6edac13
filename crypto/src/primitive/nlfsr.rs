use crate::entropy::EntropySeed;
use crate::error::{GeneratorError, GeneratorResult};
use crate::generator::{check_output, check_seed, fmt_redacted, released, Generator, Sealed};
use rngforge_types::{GeneratorKind, PrimitiveVariant};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Register width used by [`Nlfsr::new`].
pub const DEFAULT_WIDTH: u32 = 32;
/// Linear feedback taps used by [`Nlfsr::new`].
pub const DEFAULT_LINEAR_MASK: u32 = 183_599_831;

pub const MIN_WIDTH: u32 = 3;
pub const MAX_WIDTH: u32 = 32;

const KIND: GeneratorKind = GeneratorKind::Primitive(PrimitiveVariant::Nlfsr);

#[derive(Zeroize, ZeroizeOnDrop)]
struct NlfsrState {
    register: u32,
    linear: u32,
    nonlinear: u32,
    width: u32,
}

impl NlfsrState {
    /// A zero register is a fixed point, so an all-zero draw becomes 1.
    fn from_entropy(width: u32, linear: u32, entropy: &mut EntropySeed) -> Self {
        let mut state = Self {
            register: 0,
            linear,
            nonlinear: nonlinear_mask(width),
            width,
        };
        state.register = state.truncate(entropy.next_value() as u32).max(1);
        state
    }

    fn truncate(&self, value: u32) -> u32 {
        if self.width == 32 {
            value
        } else {
            value & ((1u32 << self.width) - 1)
        }
    }

    /// Shifts the register one bit to the right, feeding back into the top.
    fn step(&mut self) {
        let low = self.register & 1;
        let shifted = self.register >> 1;
        let linear = self.linear & shifted;
        let feedback = linear ^ (self.nonlinear & shifted & (shifted >> 1));
        let bit = low ^ (feedback.count_ones() & 1);
        self.register = shifted ^ (bit << (self.width - 1));
    }

    /// Eight steps, collecting the low register bit after each, first bit highest.
    fn next_byte(&mut self) -> u8 {
        let mut byte = 0u8;
        for _ in 0..8 {
            self.step();
            byte = (byte << 1) | (self.register & 1) as u8;
        }
        byte
    }
}

/// Nonlinear mask: starting from 1, `width - 3` rounds of `v <- (v << 1) ^ v`.
fn nonlinear_mask(width: u32) -> u32 {
    let mut v: u32 = 1;
    for _ in 0..width - MIN_WIDTH {
        v ^= v << 1;
    }
    v
}

/// Nonlinear feedback shift register of 3 to 32 bits.
///
/// Feedback is the low register bit XOR the parity of
/// `L & s ^ N & s & (s >> 1)` where `s` is the register shifted right once,
/// `L` the linear taps and `N` a fixed nonlinear mask derived from the width.
/// `advance` is a single bit step; each output byte costs eight.
pub struct Nlfsr {
    state: Option<NlfsrState>,
}

impl fmt::Debug for Nlfsr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_redacted(self, "Nlfsr", f)
    }
}

impl Nlfsr {
    /// 32-bit register with the default taps, seeded from a fresh
    /// [`EntropySeed`].
    pub fn new() -> Self {
        Self::with_entropy(&mut EntropySeed::new())
    }

    pub fn with_entropy(entropy: &mut EntropySeed) -> Self {
        Self {
            state: Some(NlfsrState::from_entropy(DEFAULT_WIDTH, DEFAULT_LINEAR_MASK, entropy)),
        }
    }

    /// Register of `width` bits with the given linear taps, seeded from a
    /// fresh [`EntropySeed`].
    pub fn with_params(width: u32, linear_mask: u32) -> GeneratorResult<Self> {
        Self::with_params_and_entropy(width, linear_mask, &mut EntropySeed::new())
    }

    pub fn with_params_and_entropy(
        width: u32,
        linear_mask: u32,
        entropy: &mut EntropySeed,
    ) -> GeneratorResult<Self> {
        if !(MIN_WIDTH..=MAX_WIDTH).contains(&width) {
            return Err(GeneratorError::InvalidArgument(format!(
                "register width must be in {MIN_WIDTH}..={MAX_WIDTH}, got {width}"
            )));
        }
        tracing::debug!(algorithm = %KIND, width, linear_mask, "created register");
        Ok(Self {
            state: Some(NlfsrState::from_entropy(width, linear_mask, entropy)),
        })
    }

    /// Default-width register loaded from `seed`.
    pub fn from_seed(seed: &[u8]) -> GeneratorResult<Self> {
        let mut nlfsr = Self::with_params(DEFAULT_WIDTH, DEFAULT_LINEAR_MASK)?;
        nlfsr.seed(seed)?;
        Ok(nlfsr)
    }

    /// Register width in bits, if still initialized.
    pub fn width(&self) -> Option<u32> {
        self.state.as_ref().map(|s| s.width)
    }

    fn state_mut(&mut self) -> GeneratorResult<&mut NlfsrState> {
        self.state.as_mut().ok_or_else(|| released(KIND))
    }
}

impl Default for Nlfsr {
    fn default() -> Self {
        Self::new()
    }
}

impl Sealed for Nlfsr {}

impl Generator for Nlfsr {
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

    /// Packs up to four seed bytes big-endian and truncates to the width.
    fn seed(&mut self, seed: &[u8]) -> GeneratorResult<()> {
        let state = self.state_mut()?;
        check_seed(seed)?;
        let packed = seed
            .iter()
            .take(4)
            .fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
        state.register = state.truncate(packed);
        tracing::debug!(algorithm = %KIND, seed_bytes = seed.len(), "seeded generator");
        Ok(())
    }

    fn extract(&mut self, out: &mut [u8]) -> GeneratorResult<()> {
        let state = self.state_mut()?;
        check_output(out)?;
        for byte in out.iter_mut() {
            *byte = state.next_byte();
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

#[cfg(test)]
mod tests {
    use super::*;
    use rngforge_types::ErrorCode;

    fn extract(nlfsr: &mut Nlfsr, n: usize) -> Vec<u8> {
        let mut out = vec![0u8; n];
        nlfsr.extract(&mut out).unwrap();
        out
    }

    #[test]
    fn nonlinear_mask_expansion() {
        assert_eq!(nonlinear_mask(3), 0b1);
        assert_eq!(nonlinear_mask(4), 0b11);
        assert_eq!(nonlinear_mask(5), 0b101);
        assert_eq!(nonlinear_mask(6), 0b1111);
    }

    #[test]
    fn width_bounds() {
        for width in [0, 1, 2, 33, 64] {
            let err = Nlfsr::with_params(width, 0b101).unwrap_err();
            assert_eq!(err.error_code(), ErrorCode::InvalidArgument);
        }
        assert_eq!(Nlfsr::with_params(3, 0b11).unwrap().width(), Some(3));
        assert_eq!(Nlfsr::with_params(32, 1).unwrap().width(), Some(32));
    }

    #[test]
    fn single_bit_step() {
        // width 3, linear taps 0b01, nonlinear mask 0b1; register 0b001:
        // s = 0, feedback parity 0, bit = 1, register = 0b100.
        let mut nlfsr = Nlfsr::with_params(3, 0b01).unwrap();
        nlfsr.seed(&[0b001]).unwrap();
        nlfsr.advance().unwrap();
        assert_eq!(nlfsr.state.as_ref().unwrap().register, 0b100);
        // s = 0b10, linear = 0, nonlinear = 1 & 2 & 1 = 0, bit = 0.
        nlfsr.advance().unwrap();
        assert_eq!(nlfsr.state.as_ref().unwrap().register, 0b010);
    }

    #[test]
    fn seed_packs_big_endian_and_truncates() {
        let mut wide = Nlfsr::with_params(8, 0x1D).unwrap();
        wide.seed(&[0xFF, 0xFF, 0xFF, 0xFF]).unwrap();
        let mut short = Nlfsr::with_params(8, 0x1D).unwrap();
        short.seed(&[0xFF]).unwrap();
        assert_eq!(extract(&mut wide, 16), extract(&mut short, 16));

        let mut five = Nlfsr::from_seed(&[0x12, 0x34, 0x56, 0x78, 0x9A]).unwrap();
        let mut four = Nlfsr::from_seed(&[0x12, 0x34, 0x56, 0x78]).unwrap();
        assert_eq!(extract(&mut five, 16), extract(&mut four, 16));
        assert_eq!(four.state.as_ref().map(|s| s.width), Some(32));
    }

    #[test]
    fn each_byte_is_eight_advances() {
        let mut a = Nlfsr::from_seed(&[0xC0, 0xFF, 0xEE]).unwrap();
        let mut b = Nlfsr::from_seed(&[0xC0, 0xFF, 0xEE]).unwrap();
        let two = extract(&mut a, 2);
        for _ in 0..8 {
            b.advance().unwrap();
        }
        assert_eq!(extract(&mut b, 1)[0], two[1]);
    }

    #[test]
    fn custom_params_start_from_entropy() {
        let mut nlfsr = Nlfsr::with_params(21, 849_314).unwrap();
        assert_ne!(nlfsr.state.as_ref().unwrap().register, 0);
        assert_ne!(extract(&mut nlfsr, 32), vec![0u8; 32]);

        let mut entropy = EntropySeed::new();
        let a = Nlfsr::with_params_and_entropy(21, 849_314, &mut entropy).unwrap();
        let b = Nlfsr::with_params_and_entropy(21, 849_314, &mut entropy).unwrap();
        let (ra, rb) = (a.state.as_ref().unwrap().register, b.state.as_ref().unwrap().register);
        assert!(ra < 1 << 21 && rb < 1 << 21);
        assert_eq!(format!("{a:?}"), "Nlfsr { kind: Primitive(Nlfsr), initialized: true, .. }");
    }

    #[test]
    fn zero_register_is_fixed_point() {
        let mut nlfsr = Nlfsr::from_seed(&[0]).unwrap();
        assert_eq!(extract(&mut nlfsr, 8), vec![0u8; 8]);
    }

    #[test]
    fn reseed_and_split_reads() {
        let mut used = Nlfsr::from_seed(b"old").unwrap();
        extract(&mut used, 5);
        used.seed(b"new!").unwrap();
        let mut fresh = Nlfsr::from_seed(b"new!").unwrap();

        let mut split = vec![0u8; 12];
        used.extract(&mut split[..7]).unwrap();
        used.extract(&mut split[7..]).unwrap();
        assert_eq!(split, extract(&mut fresh, 12));
    }

    #[test]
    fn teardown_then_use() {
        let mut nlfsr = Nlfsr::new();
        nlfsr.teardown().unwrap();
        assert_eq!(nlfsr.seed(&[1]).unwrap_err().error_code(), ErrorCode::NullReference);
        assert_eq!(nlfsr.width(), None);
    }
}
