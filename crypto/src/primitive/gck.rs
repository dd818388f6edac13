use super::{words_to_seed, LagRing, WordRecurrence, WordTap, DEFAULT_MODULUS};
use crate::error::{GeneratorError, GeneratorResult};
use crate::generator::{check_output, check_seed_len, fmt_redacted, released, Generator, Sealed};
use rngforge_types::{GeneratorKind, PrimitiveVariant};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Lag vector loaded by [`Gck::new`].
pub const DEFAULT_LAGS: [u32; 45] = [
    0x74b3_f95c, 0x8f6e_a02e, 0x0127_d3ab, 0xf30c_98bd, 0x5d86_a1e2, 0xdba4_6cc1, 0x6e79_34df,
    0xca47_b8f0, 0x3e91_dc2a, 0x89fa_4cc9, 0x1273_bf04, 0x40e9_5dea, 0xc156_7ff1, 0x9ed3_a6c8,
    0x28fa_e80c, 0x6db0_5bc2, 0x718c_9f75, 0x24d6_715f, 0x9b69_49e8, 0xa390_df17, 0xc083_1a62,
    0x46fd_8dc3, 0x5b4e_63f9, 0x2c3a_e4b7, 0x7f19_d209, 0x9d20_e151, 0xeb3c_a74b, 0x66a1_cd0e,
    0xf4be_9a6d, 0x3bdd_f0a5, 0x0f71_b93a, 0x5c82_0df4, 0x9a54_6362, 0x32fe_8cc0, 0xbbb2_a4db,
    0xe862_3d97, 0x151d_e34c, 0x8cec_96ed, 0x615f_7432, 0x2f40_abd1, 0x49ea_6738, 0x0a2b_193f,
    0xe515_0c29, 0x7b03_4c16, 0x14cf_9bb1,
];

const KIND: GeneratorKind = GeneratorKind::Primitive(PrimitiveVariant::Gck);

#[derive(Zeroize, ZeroizeOnDrop)]
struct GckState {
    ring: LagRing,
    carry: u32,
    m: u32,
    tap: WordTap,
}

impl WordRecurrence for GckState {
    /// New carry is `carry + oldest (mod m)`; the old carry joins the ring.
    fn step(&mut self) -> u32 {
        let next = (u64::from(self.carry) + u64::from(self.ring.at(0))) % u64::from(self.m);
        self.ring.rotate_in(self.carry);
        self.carry = next as u32;
        self.carry
    }

    fn tap(&mut self) -> &mut WordTap {
        &mut self.tap
    }
}

/// Lagged additive generator with a carry word, the Knuth variant of a
/// generalized lagged-Fibonacci sequence.
///
/// The lag count `k` is the seed length in 32-bit words, so any non-empty
/// seed whose length is a multiple of four is accepted. The carry restarts
/// at zero on every seed.
pub struct Gck {
    state: Option<GckState>,
}

impl fmt::Debug for Gck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_redacted(self, "Gck", f)
    }
}

impl Gck {
    /// Generator loaded with [`DEFAULT_LAGS`].
    pub fn new() -> GeneratorResult<Self> {
        Self::from_seed(&words_to_seed(&DEFAULT_LAGS))
    }

    pub fn from_seed(seed: &[u8]) -> GeneratorResult<Self> {
        let ring = load_ring(seed)?;
        tracing::debug!(algorithm = %KIND, lags = ring.len(), "seeded generator");
        Ok(Self {
            state: Some(GckState {
                ring,
                carry: 0,
                m: DEFAULT_MODULUS,
                tap: WordTap::default(),
            }),
        })
    }

    /// Number of lagged words, if still initialized.
    pub fn lags(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.ring.len())
    }

    fn state_mut(&mut self) -> GeneratorResult<&mut GckState> {
        self.state.as_mut().ok_or_else(|| released(KIND))
    }
}

fn load_ring(seed: &[u8]) -> GeneratorResult<LagRing> {
    check_seed_len(seed, PrimitiveVariant::Gck.min_seed_len(), KIND)?;
    if seed.len() % 4 != 0 {
        return Err(GeneratorError::InvalidLength(format!(
            "seed length {} is not a whole number of 32-bit words",
            seed.len()
        )));
    }
    LagRing::from_seed(seed, seed.len() / 4)
}

impl Sealed for Gck {}

impl Generator for Gck {
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
        let ring = load_ring(seed)?;
        // Assigning drops the old ring, which zeroizes it.
        state.ring = ring;
        state.carry = 0;
        state.tap.clear();
        tracing::debug!(algorithm = %KIND, lags = state.ring.len(), "seeded generator");
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
