use crate::error::{GeneratorError, GeneratorResult};
use rngforge_types::GeneratorKind;
use std::fmt;

mod sealed {
    pub trait Sealed {}
}

pub(crate) use sealed::Sealed;

/// Common lifecycle and output contract shared by every generator.
///
/// A generator is *initialized* from construction until [`teardown`]
/// releases its state. After teardown every operation fails with
/// [`GeneratorError::NullReference`] instead of touching released memory.
///
/// The trait is sealed: the set of algorithms is closed and each one is
/// implemented in this crate.
///
/// Generators are not internally synchronized. `&mut self` on every
/// state-changing operation is the only exclusion mechanism.
///
/// [`teardown`]: Generator::teardown
pub trait Generator: Sealed {
    /// Identity tag, used only for external lookup.
    fn kind(&self) -> GeneratorKind;

    /// Whether the generator still owns its algorithm state.
    fn is_initialized(&self) -> bool;

    /// Performs one internal state transition.
    ///
    /// Combinators and tests use this to step a source independently of
    /// the byte extraction width.
    fn advance(&mut self) -> GeneratorResult<()>;

    /// Replaces the generator state with one derived from `seed`.
    ///
    /// Re-seeding fully discards the influence of earlier seeds.
    fn seed(&mut self, seed: &[u8]) -> GeneratorResult<()> {
        let _ = seed;
        Err(GeneratorError::unsupported("seed", self.kind()))
    }

    /// Fills `out` with the next `out.len()` bytes of the stream.
    fn extract(&mut self, out: &mut [u8]) -> GeneratorResult<()>;

    /// Zeroes and releases the algorithm state. Calling it again is a no-op.
    fn teardown(&mut self) -> GeneratorResult<()>;

    /// Draws a single byte from the stream.
    fn next_byte(&mut self) -> GeneratorResult<u8> {
        let mut byte = [0u8; 1];
        self.extract(&mut byte)?;
        Ok(byte[0])
    }
}

/// `Debug` output for a generator that names it without exposing its state.
pub(crate) fn fmt_redacted(
    generator: &dyn Generator,
    name: &str,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    f.debug_struct(name)
        .field("kind", &generator.kind())
        .field("initialized", &generator.is_initialized())
        .finish_non_exhaustive()
}

impl<G: Generator + ?Sized> Sealed for &mut G {}

impl<G: Generator + ?Sized> Generator for &mut G {
    fn kind(&self) -> GeneratorKind {
        (**self).kind()
    }

    fn is_initialized(&self) -> bool {
        (**self).is_initialized()
    }

    fn advance(&mut self) -> GeneratorResult<()> {
        (**self).advance()
    }

    fn seed(&mut self, seed: &[u8]) -> GeneratorResult<()> {
        (**self).seed(seed)
    }

    fn extract(&mut self, out: &mut [u8]) -> GeneratorResult<()> {
        (**self).extract(out)
    }

    fn teardown(&mut self) -> GeneratorResult<()> {
        (**self).teardown()
    }
}

impl<G: Generator + ?Sized> Sealed for Box<G> {}

impl<G: Generator + ?Sized> Generator for Box<G> {
    fn kind(&self) -> GeneratorKind {
        (**self).kind()
    }

    fn is_initialized(&self) -> bool {
        (**self).is_initialized()
    }

    fn advance(&mut self) -> GeneratorResult<()> {
        (**self).advance()
    }

    fn seed(&mut self, seed: &[u8]) -> GeneratorResult<()> {
        (**self).seed(seed)
    }

    fn extract(&mut self, out: &mut [u8]) -> GeneratorResult<()> {
        (**self).extract(out)
    }

    fn teardown(&mut self) -> GeneratorResult<()> {
        (**self).teardown()
    }
}

/// Rejects an empty seed buffer.
pub(crate) fn check_seed(seed: &[u8]) -> GeneratorResult<()> {
    if seed.is_empty() {
        return Err(GeneratorError::InvalidArgument(
            "seed buffer must not be empty".into(),
        ));
    }
    Ok(())
}

/// Rejects a seed shorter than the algorithm's minimum.
pub(crate) fn check_seed_len(seed: &[u8], min: usize, kind: GeneratorKind) -> GeneratorResult<()> {
    check_seed(seed)?;
    if seed.len() < min {
        return Err(GeneratorError::InvalidLength(format!(
            "{kind} needs at least {min} seed bytes, got {}",
            seed.len()
        )));
    }
    Ok(())
}

/// Rejects an empty output buffer.
pub(crate) fn check_output(out: &[u8]) -> GeneratorResult<()> {
    if out.is_empty() {
        return Err(GeneratorError::InvalidLength(
            "output buffer must not be empty".into(),
        ));
    }
    Ok(())
}

pub(crate) fn released(kind: GeneratorKind) -> GeneratorError {
    tracing::debug!(algorithm = %kind, "operation on a released generator");
    GeneratorError::NullReference("generator state has been released")
}
