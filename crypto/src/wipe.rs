use crate::error::{GeneratorError, GeneratorResult};
use crate::generator::Generator;
use std::sync::atomic::{compiler_fence, Ordering};

/// Overwrites `region` with generator output, then mixes it in place.
///
/// If the generator fails the region is zero-filled instead, still mixed,
/// and the failure is returned wrapped in [`GeneratorError::WipeFailed`].
/// An empty region is a no-op.
pub fn wipe(region: &mut [u8], generator: &mut dyn Generator) -> GeneratorResult<()> {
    if !generator.is_initialized() {
        return Err(GeneratorError::NullReference("wipe generator is not initialized"));
    }
    if region.is_empty() {
        return Ok(());
    }

    let outcome = generator.extract(region);
    if let Err(e) = &outcome {
        tracing::warn!(
            algorithm = %generator.kind(),
            bytes = region.len(),
            error = %e,
            "wipe generator failed, zero-filling"
        );
        region.fill(0);
    }
    mix(region);
    outcome.map_err(|e| GeneratorError::WipeFailed(Box::new(e)))
}

/// `b[i] += b[n - 1 - i]` in index order, so later bytes see earlier updates.
fn mix(region: &mut [u8]) {
    let n = region.len();
    for i in 0..n {
        region[i] = region[i].wrapping_add(region[n - 1 - i]);
    }
    // The stores must survive as observable writes.
    compiler_fence(Ordering::SeqCst);
    std::hint::black_box(&*region);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Sealed;
    use crate::primitive::Lcg;
    use rngforge_types::{ErrorCode, GeneratorKind};

    struct Broken;

    impl Sealed for Broken {}

    impl Generator for Broken {
        fn kind(&self) -> GeneratorKind {
            GeneratorKind::Hash
        }

        fn is_initialized(&self) -> bool {
            true
        }

        fn advance(&mut self) -> GeneratorResult<()> {
            Ok(())
        }

        fn extract(&mut self, out: &mut [u8]) -> GeneratorResult<()> {
            out[0] = 0x55;
            Err(GeneratorError::Io(std::io::Error::other("device unplugged")))
        }

        fn teardown(&mut self) -> GeneratorResult<()> {
            Ok(())
        }
    }

    #[test]
    fn mix_is_sequential() {
        let mut region = [1u8, 2, 3];
        mix(&mut region);
        // b0 = 1 + 3 = 4, b1 = 2 + 2 = 4, b2 = 3 + b0 = 7
        assert_eq!(region, [4, 4, 7]);
    }

    #[test]
    fn wipe_overwrites_with_mixed_stream() {
        let mut expected = [0u8; 16];
        Lcg::from_seed(b"wipe").unwrap().extract(&mut expected).unwrap();
        mix(&mut expected);

        let mut secret = *b"correct horse ba";
        let mut lcg = Lcg::from_seed(b"wipe").unwrap();
        wipe(&mut secret, &mut lcg).unwrap();
        assert_eq!(secret, expected);
    }

    #[test]
    fn failure_zero_fills() {
        let mut secret = [0xAAu8; 8];
        let err = wipe(&mut secret, &mut Broken).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::WipeFailed);
        assert!(matches!(err, GeneratorError::WipeFailed(inner) if inner.error_code() == ErrorCode::ReadFailed));
        assert_eq!(secret, [0u8; 8]);
    }

    #[test]
    fn released_generator_rejected() {
        let mut lcg = Lcg::from_seed(b"gone").unwrap();
        lcg.teardown().unwrap();
        let mut secret = [7u8; 4];
        let err = wipe(&mut secret, &mut lcg).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::NullReference);
        assert_eq!(secret, [7u8; 4]);
    }

    #[test]
    fn empty_region_is_noop() {
        let mut lcg = Lcg::from_seed(b"empty").unwrap();
        wipe(&mut [], &mut lcg).unwrap();
    }
}
