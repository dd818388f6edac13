use super::{words_to_seed, LagRing, WordRecurrence, WordTap, DEFAULT_MODULUS};
use crate::error::{GeneratorError, GeneratorResult};
use crate::generator::{check_output, check_seed, fmt_redacted, released, Generator, Sealed};
use rngforge_types::{GeneratorKind, PrimitiveVariant};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Number of lagged words.
pub const LAGS: usize = 55;
/// Distance of the short lag from the oldest word.
pub const SHORT_LAG: usize = 30;
/// Exact seed length accepted by `seed`.
pub const SEED_LEN: usize = LAGS * 4;

/// Lag vector loaded by [`MitchellMoore::new`].
pub const DEFAULT_LAGS: [u32; LAGS] = [
    0x9f4b_4f6a, 0xc1ed_8d5e, 0x3bfe_8d14, 0x05b8_cc52, 0x6a7e_2b19, 0xd444_a710, 0xf39b_d3af,
    0xc9a9_f92e, 0x537c_e20b, 0xa4f3_c218, 0xfb93_acd4, 0xc52d_fd21, 0x1125_bf61, 0xe8a7_2d6c,
    0x7bad_a3ed, 0x628c_51be, 0x05b4_a3f7, 0x2e9c_8f24, 0x9ba3_42df, 0xeca1_9c3a, 0x18f8_c871,
    0x4df9_b16b, 0x93a7_d8c2, 0x7afd_a0b6, 0x5d4a_3c48, 0xd3b8_f5c7, 0x4af3_5c91, 0x1e98_fa6e,
    0xaa67_c449, 0x84ba_cf3f, 0x5e4c_2a79, 0x0ba8_7422, 0x15e7_2fbb, 0x4f9c_3ae6, 0x3058_14e0,
    0x7f21_0a58, 0xa7f6_9127, 0x7d9a_3f10, 0x62db_4ad5, 0x8493_c6f0, 0x5325_f4db, 0x7ff8_d83a,
    0xfcbe_7c05, 0x9c21_37b3, 0x143a_df57, 0xc5b4_2a01, 0x6d4c_06ea, 0x317f_21c8, 0x1fa7_83f1,
    0x72e5_9a90, 0x49f2_dcbd, 0xd8ad_6ec2, 0x58f6_836d, 0xb0e9_c3ff, 0x329b_0edc,
];

const KIND: GeneratorKind = GeneratorKind::Primitive(PrimitiveVariant::MitchellMoore);

#[derive(Zeroize, ZeroizeOnDrop)]
struct MitchellMooreState {
    ring: LagRing,
    carry: u32,
    m: u32,
    tap: WordTap,
}

impl WordRecurrence for MitchellMooreState {
    /// New carry is `oldest + ring[30] (mod m)`; the old carry joins the ring.
    fn step(&mut self) -> u32 {
        let sum = u64::from(self.ring.at(0)) + u64::from(self.ring.at(SHORT_LAG));
        let next = (sum % u64::from(self.m)) as u32;
        self.ring.rotate_in(self.carry);
        self.carry = next;
        self.carry
    }

    fn tap(&mut self) -> &mut WordTap {
        &mut self.tap
    }
}

/// Mitchell–Moore additive generator over 55 lagged words.
pub struct MitchellMoore {
    state: Option<MitchellMooreState>,
}

impl fmt::Debug for MitchellMoore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_redacted(self, "MitchellMoore", f)
    }
}

impl MitchellMoore {
    pub fn new() -> GeneratorResult<Self> {
        Self::from_seed(&words_to_seed(&DEFAULT_LAGS))
    }

    /// Loads 55 little-endian words; the seed must be exactly 220 bytes.
    pub fn from_seed(seed: &[u8]) -> GeneratorResult<Self> {
        let ring = load_ring(seed)?;
        Ok(Self {
            state: Some(MitchellMooreState {
                ring,
                carry: 0,
                m: DEFAULT_MODULUS,
                tap: WordTap::default(),
            }),
        })
    }

    fn state_mut(&mut self) -> GeneratorResult<&mut MitchellMooreState> {
        self.state.as_mut().ok_or_else(|| released(KIND))
    }
}

fn load_ring(seed: &[u8]) -> GeneratorResult<LagRing> {
    check_seed(seed)?;
    if seed.len() != SEED_LEN {
        return Err(GeneratorError::InvalidLength(format!(
            "{KIND} needs exactly {SEED_LEN} seed bytes, got {}",
            seed.len()
        )));
    }
    LagRing::from_seed(seed, LAGS)
}

impl Sealed for MitchellMoore {}

impl Generator for MitchellMoore {
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
        state.ring = load_ring(seed)?;
        state.carry = 0;
        state.tap.clear();
        tracing::debug!(algorithm = %KIND, "seeded generator");
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

    fn reference_words(lags: &[u32], n: usize) -> Vec<u32> {
        let mut buffer = lags.to_vec();
        let mut carry = 0u32;
        let m = u64::from(DEFAULT_MODULUS);
        (0..n)
            .map(|_| {
                let next = ((u64::from(buffer[0]) + u64::from(buffer[30])) % m) as u32;
                buffer.remove(0);
                buffer.push(carry);
                carry = next;
                next
            })
            .collect()
    }

    #[test]
    fn default_stream_matches_model() {
        let mut mm = MitchellMoore::new().unwrap();
        let expected: Vec<u8> = reference_words(&DEFAULT_LAGS, 120)
            .iter()
            .flat_map(|w| w.to_be_bytes()[..3].to_vec())
            .collect();
        let mut out = vec![0u8; 360];
        mm.extract(&mut out[..100]).unwrap();
        mm.extract(&mut out[100..]).unwrap();
        assert_eq!(out, expected);
    }

    #[test]
    fn first_word_uses_lags_zero_and_thirty() {
        let mut words = [0u32; LAGS];
        words[0] = 0x0100_0000;
        words[SHORT_LAG] = 0x0200_0000;
        let mut mm = MitchellMoore::from_seed(&words_to_seed(&words)).unwrap();
        let mut out = [0u8; 3];
        mm.extract(&mut out).unwrap();
        assert_eq!(out, [0x03, 0, 0]);
    }

    #[test]
    fn seed_must_be_exact() {
        for len in [4, 219, 221, 440] {
            let err = MitchellMoore::from_seed(&vec![1u8; len]).err().map(|e| e.error_code());
            assert_eq!(err, Some(ErrorCode::InvalidLength));
        }
        let mut mm = MitchellMoore::new().unwrap();
        assert_eq!(mm.seed(&[]).unwrap_err().error_code(), ErrorCode::InvalidArgument);
    }

    #[test]
    fn reseed_matches_fresh() {
        let seed: Vec<u8> = (0..SEED_LEN).map(|i| (i * 7) as u8).collect();
        let mut used = MitchellMoore::new().unwrap();
        used.advance().unwrap();
        used.seed(&seed).unwrap();
        let mut fresh = MitchellMoore::from_seed(&seed).unwrap();

        let mut a = [0u8; 64];
        let mut b = [0u8; 64];
        used.extract(&mut a).unwrap();
        fresh.extract(&mut b).unwrap();
        assert_eq!(a, b);
        used.teardown().unwrap();
        assert!(!used.is_initialized());
    }
}
