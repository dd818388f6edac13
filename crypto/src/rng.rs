//! Adapter exposing any [`Generator`] through `rand_core 0.6` traits.
//!
//! Lets the `rand` ecosystem (distributions, shuffles, ranges) draw from an
//! engine generator. The adapter does not implement `CryptoRng`.

use crate::generator::Generator;
use rand_core::{impls, Error, RngCore};

/// `RngCore` view over a generator.
///
/// Owns its generator; pass `&mut g` to borrow one instead.
///
/// # Panics
///
/// The infallible `RngCore` methods panic if the generator fails, for
/// example after teardown or when a device read fails. Use
/// [`RngCore::try_fill_bytes`] to observe the error instead.
pub struct GeneratorRng<G: Generator> {
    inner: G,
}

impl<G: Generator> GeneratorRng<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }

    pub fn get_mut(&mut self) -> &mut G {
        &mut self.inner
    }

    pub fn into_inner(self) -> G {
        self.inner
    }
}

impl<G: Generator> RngCore for GeneratorRng<G> {
    fn next_u32(&mut self) -> u32 {
        impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        if let Err(e) = self.try_fill_bytes(dest) {
            panic!("{} generator failed: {e}", self.inner.kind());
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        if dest.is_empty() {
            return Ok(());
        }
        self.inner.extract(dest).map_err(Error::new)
    }
}
