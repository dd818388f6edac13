//! Knuth's shuffling combinators (TAOCP vol. 2, 3.2.2).
//!
//! Both keep a table of `k` bytes. Algorithm M shuffles the output of a
//! source X with a selector stream Y; Algorithm B uses one source for both
//! roles. The combinators borrow their sources and never tear them down.

use crate::error::{GeneratorError, GeneratorResult};
use crate::generator::{check_output, fmt_redacted, released, Generator, Sealed};
use rngforge_types::{GeneratorKind, ShuffleVariant};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Table size used when none is configured.
pub const DEFAULT_TABLE_SIZE: u8 = 64;

#[derive(Zeroize, ZeroizeOnDrop)]
struct ShuffleTable {
    v: Vec<u8>,
    next: u8,
}

impl ShuffleTable {
    fn fill(k: u8, source: &mut dyn Generator) -> GeneratorResult<Self> {
        if k == 0 {
            return Err(GeneratorError::InvalidArgument(
                "shuffle table size must be at least 1".into(),
            ));
        }
        let mut v = Vec::new();
        v.try_reserve_exact(usize::from(k)).map_err(|e| {
            GeneratorError::AllocationFailure(format!("shuffle table of {k} bytes: {e}"))
        })?;
        v.resize(usize::from(k), 0);
        let mut table = Self { v, next: 0 };
        source.extract(&mut table.v)?;
        Ok(table)
    }

    /// Slot chosen by a selector byte: `floor(k * y / 256)`.
    fn slot(&self, selector: u8) -> usize {
        (self.v.len() * usize::from(selector)) >> 8
    }

    fn shuffle(
        &mut self,
        selector: &mut dyn Generator,
        source: &mut dyn Generator,
    ) -> GeneratorResult<()> {
        let j = self.slot(selector.next_byte()?);
        self.next = self.v[j];
        self.v[j] = source.next_byte()?;
        Ok(())
    }

    fn emit(
        &mut self,
        out: &mut [u8],
        mut step: impl FnMut(&mut Self) -> GeneratorResult<()>,
    ) -> GeneratorResult<()> {
        for byte in out.iter_mut() {
            step(self)?;
            *byte = self.next;
        }
        Ok(())
    }
}

/// Algorithm M: X fills the table, Y picks the slot to emit and refill.
pub struct KnuthM<'a> {
    x: Option<&'a mut dyn Generator>,
    y: Option<&'a mut dyn Generator>,
    table: Option<ShuffleTable>,
}

impl fmt::Debug for KnuthM<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_redacted(self, "KnuthM", f)
    }
}

impl<'a> KnuthM<'a> {
    /// Builds the table from the first `k` bytes of `x`.
    pub fn new(x: &'a mut dyn Generator, y: &'a mut dyn Generator, k: u8) -> GeneratorResult<Self> {
        let table = ShuffleTable::fill(k, x)?;
        tracing::debug!(
            algorithm = %ShuffleVariant::KnuthM,
            table_size = k,
            source = %x.kind(),
            selector = %y.kind(),
            "built shuffle table"
        );
        Ok(Self {
            x: Some(x),
            y: Some(y),
            table: Some(table),
        })
    }

    pub fn table_size(&self) -> Option<usize> {
        self.table.as_ref().map(|t| t.v.len())
    }
}

impl Sealed for KnuthM<'_> {}

impl Generator for KnuthM<'_> {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Shuffle(ShuffleVariant::KnuthM)
    }

    fn is_initialized(&self) -> bool {
        self.table.is_some()
    }

    fn advance(&mut self) -> GeneratorResult<()> {
        let kind = self.kind();
        match (self.table.as_mut(), self.x.as_deref_mut(), self.y.as_deref_mut()) {
            (Some(table), Some(x), Some(y)) => table.shuffle(y, x),
            _ => Err(released(kind)),
        }
    }

    fn extract(&mut self, out: &mut [u8]) -> GeneratorResult<()> {
        let kind = self.kind();
        let (Some(table), Some(x), Some(y)) =
            (self.table.as_mut(), self.x.as_deref_mut(), self.y.as_deref_mut())
        else {
            return Err(released(kind));
        };
        check_output(out)?;
        table.emit(out, |t| t.shuffle(&mut *y, &mut *x))
    }

    fn teardown(&mut self) -> GeneratorResult<()> {
        if let Some(mut table) = self.table.take() {
            table.zeroize();
        }
        self.x = None;
        self.y = None;
        Ok(())
    }
}

/// Algorithm B: one source both selects the slot and refills it.
pub struct KnuthB<'a> {
    source: Option<&'a mut dyn Generator>,
    table: Option<ShuffleTable>,
}

impl fmt::Debug for KnuthB<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_redacted(self, "KnuthB", f)
    }
}

impl<'a> KnuthB<'a> {
    pub fn new(source: &'a mut dyn Generator, k: u8) -> GeneratorResult<Self> {
        let table = ShuffleTable::fill(k, source)?;
        tracing::debug!(
            algorithm = %ShuffleVariant::KnuthB,
            table_size = k,
            source = %source.kind(),
            "built shuffle table"
        );
        Ok(Self {
            source: Some(source),
            table: Some(table),
        })
    }

    pub fn table_size(&self) -> Option<usize> {
        self.table.as_ref().map(|t| t.v.len())
    }
}

/// Selector and refill both draw from the same stream, in that order.
fn shuffle_single(table: &mut ShuffleTable, source: &mut dyn Generator) -> GeneratorResult<()> {
    let j = table.slot(source.next_byte()?);
    table.next = table.v[j];
    table.v[j] = source.next_byte()?;
    Ok(())
}

impl Sealed for KnuthB<'_> {}

impl Generator for KnuthB<'_> {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Shuffle(ShuffleVariant::KnuthB)
    }

    fn is_initialized(&self) -> bool {
        self.table.is_some()
    }

    fn advance(&mut self) -> GeneratorResult<()> {
        let kind = self.kind();
        match (self.table.as_mut(), self.source.as_deref_mut()) {
            (Some(table), Some(source)) => shuffle_single(table, source),
            _ => Err(released(kind)),
        }
    }

    fn extract(&mut self, out: &mut [u8]) -> GeneratorResult<()> {
        let kind = self.kind();
        let (Some(table), Some(source)) = (self.table.as_mut(), self.source.as_deref_mut()) else {
            return Err(released(kind));
        };
        check_output(out)?;
        table.emit(out, |t| shuffle_single(t, &mut *source))
    }

    fn teardown(&mut self) -> GeneratorResult<()> {
        if let Some(mut table) = self.table.take() {
            table.zeroize();
        }
        self.source = None;
        Ok(())
    }
}
