//! Generators reading bytes from an OS file or character device.
//!
//! A device source is not seedable and has no state to step: `seed` and
//! `advance` report [`GeneratorError::UnsupportedOperation`]. A regular file
//! is read cyclically; reaching its end rewinds to the start.

use crate::error::{GeneratorError, GeneratorResult};
use crate::generator::{check_output, fmt_redacted, released, Generator, Sealed};
use rngforge_types::{DeviceVariant, GeneratorKind};
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

#[cfg(unix)]
pub const DEV_RANDOM: &str = "/dev/random";
#[cfg(unix)]
pub const DEV_URANDOM: &str = "/dev/urandom";

/// Byte stream backed by a readable, seekable source.
pub struct DeviceGenerator<R = File> {
    variant: DeviceVariant,
    source: Option<R>,
}

impl<R: Read + Seek> fmt::Debug for DeviceGenerator<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_redacted(self, "DeviceGenerator", f)
    }
}

impl DeviceGenerator<File> {
    /// Opens `path` for reading as a cyclic byte source.
    pub fn open(path: impl AsRef<Path>) -> GeneratorResult<Self> {
        Self::open_as(path.as_ref(), DeviceVariant::File)
    }

    #[cfg(unix)]
    pub fn dev_random() -> GeneratorResult<Self> {
        Self::open_as(Path::new(DEV_RANDOM), DeviceVariant::DevRandom)
    }

    #[cfg(unix)]
    pub fn dev_urandom() -> GeneratorResult<Self> {
        Self::open_as(Path::new(DEV_URANDOM), DeviceVariant::DevUrandom)
    }

    fn open_as(path: &Path, variant: DeviceVariant) -> GeneratorResult<Self> {
        let file = File::open(path).map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "failed to open entropy source");
            GeneratorError::Io(e)
        })?;
        tracing::debug!(algorithm = %variant, path = %path.display(), "opened entropy source");
        Ok(Self::with_variant(file, variant))
    }
}

impl<R: Read + Seek> DeviceGenerator<R> {
    /// Wraps an already open source.
    pub fn from_reader(reader: R) -> Self {
        Self::with_variant(reader, DeviceVariant::File)
    }

    fn with_variant(reader: R, variant: DeviceVariant) -> Self {
        Self {
            variant,
            source: Some(reader),
        }
    }

    pub fn variant(&self) -> DeviceVariant {
        self.variant
    }
}

/// Fills `out` completely, rewinding at end of stream.
///
/// A rewind that is immediately followed by another end of stream means the
/// source is empty; that is reported instead of looping forever.
fn read_cyclic<R: Read + Seek>(source: &mut R, out: &mut [u8]) -> io::Result<()> {
    let mut filled = 0;
    let mut rewound = false;
    while filled < out.len() {
        match source.read(&mut out[filled..]) {
            Ok(0) if rewound => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "entropy source is empty",
                ));
            }
            Ok(0) => {
                tracing::trace!("end of entropy source, rewinding");
                source.seek(SeekFrom::Start(0))?;
                rewound = true;
            }
            Ok(n) => {
                filled += n;
                rewound = false;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

impl<R: Read + Seek> Sealed for DeviceGenerator<R> {}

impl<R: Read + Seek> Generator for DeviceGenerator<R> {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Device(self.variant)
    }

    fn is_initialized(&self) -> bool {
        self.source.is_some()
    }

    fn advance(&mut self) -> GeneratorResult<()> {
        if self.source.is_none() {
            return Err(released(self.kind()));
        }
        Err(GeneratorError::unsupported("advance", self.kind()))
    }

    fn seed(&mut self, _seed: &[u8]) -> GeneratorResult<()> {
        if self.source.is_none() {
            return Err(released(self.kind()));
        }
        Err(GeneratorError::unsupported("seed", self.kind()))
    }

    fn extract(&mut self, out: &mut [u8]) -> GeneratorResult<()> {
        let kind = self.kind();
        let source = self.source.as_mut().ok_or_else(|| released(kind))?;
        check_output(out)?;
        out.fill(0);
        read_cyclic(source, out).map_err(|e| {
            tracing::error!(algorithm = %kind, error = %e, "entropy source read failed");
            GeneratorError::Io(e)
        })
    }

    /// Closes the source. Dropping a `File` cannot report a close error, so
    /// teardown always succeeds and leaves the handle inert.
    fn teardown(&mut self) -> GeneratorResult<()> {
        if self.source.take().is_some() {
            tracing::debug!(algorithm = %self.kind(), "closed entropy source");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rngforge_types::ErrorCode;
    use std::io::Cursor;

    /// Reader yielding one byte per call, interrupted every other call.
    struct Flaky {
        inner: Cursor<Vec<u8>>,
        interrupt: bool,
    }

    impl Read for Flaky {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "signal"));
            }
            let end = buf.len().min(1);
            self.inner.read(&mut buf[..end])
        }
    }

    impl Seek for Flaky {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    #[test]
    fn file_is_read_cyclically() {
        let mut device = DeviceGenerator::from_reader(Cursor::new(vec![1u8, 2, 3]));
        let mut out = [0u8; 8];
        device.extract(&mut out).unwrap();
        assert_eq!(out, [1, 2, 3, 1, 2, 3, 1, 2]);
        let mut more = [0u8; 2];
        device.extract(&mut more).unwrap();
        assert_eq!(more, [3, 1]);
    }

    #[test]
    fn wraps_four_byte_source() {
        let file = vec![0x10u8, 0x20, 0x30, 0x40];
        let mut device = DeviceGenerator::from_reader(Cursor::new(file.clone()));
        let mut out = [0u8; 10];
        device.extract(&mut out).unwrap();
        let expected: Vec<u8> = [&file[..], &file[..], &file[..2]].concat();
        assert_eq!(out.to_vec(), expected);
    }

    #[test]
    fn interrupted_reads_are_retried() {
        let mut device = DeviceGenerator::from_reader(Flaky {
            inner: Cursor::new(vec![9, 8]),
            interrupt: false,
        });
        let mut out = [0u8; 5];
        device.extract(&mut out).unwrap();
        assert_eq!(out, [9, 8, 9, 8, 9]);
    }

    #[test]
    fn empty_source_fails() {
        let mut device = DeviceGenerator::from_reader(Cursor::new(Vec::<u8>::new()));
        let mut out = [0u8; 4];
        let err = device.extract(&mut out).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::ReadFailed);
    }

    #[test]
    fn seed_and_advance_unsupported() {
        let mut device = DeviceGenerator::from_reader(Cursor::new(vec![0u8; 4]));
        assert_eq!(device.seed(b"x").unwrap_err().error_code(), ErrorCode::UnsupportedOperation);
        assert_eq!(device.advance().unwrap_err().error_code(), ErrorCode::UnsupportedOperation);
        assert_eq!(device.extract(&mut []).unwrap_err().error_code(), ErrorCode::InvalidLength);
    }

    #[test]
    fn teardown_makes_handle_inert() {
        let mut device = DeviceGenerator::from_reader(Cursor::new(vec![5u8]));
        device.teardown().unwrap();
        assert!(!device.is_initialized());
        let mut out = [0u8; 1];
        assert_eq!(device.extract(&mut out).unwrap_err().error_code(), ErrorCode::NullReference);
        assert_eq!(device.seed(b"x").unwrap_err().error_code(), ErrorCode::NullReference);
        device.teardown().unwrap();
    }

    #[test]
    fn opens_regular_file() {
        let path = std::env::temp_dir().join(format!("rngforge-device-{}.bin", std::process::id()));
        std::fs::write(&path, [0xAA, 0xBB]).unwrap();

        let mut device = DeviceGenerator::open(&path).unwrap();
        assert_eq!(device.kind(), GeneratorKind::Device(DeviceVariant::File));
        let mut out = [0u8; 5];
        device.extract(&mut out).unwrap();
        assert_eq!(out, [0xAA, 0xBB, 0xAA, 0xBB, 0xAA]);

        device.teardown().unwrap();
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_is_read_failure() {
        let err = DeviceGenerator::open("/nonexistent/rngforge/source").err().unwrap();
        assert_eq!(err.error_code(), ErrorCode::ReadFailed);
    }

    #[cfg(unix)]
    #[test]
    fn urandom_produces_bytes() {
        let mut device = DeviceGenerator::dev_urandom().unwrap();
        let mut out = [0u8; 64];
        device.extract(&mut out).unwrap();
        assert_ne!(out, [0u8; 64]);
        assert_eq!(device.kind().name(), "dev-urandom");
    }
}
