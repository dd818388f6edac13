use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Primitive arithmetic generators with a fixed-size numeric state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveVariant {
    Lcg,
    Nlfsr,
    Qcg,
    Coveyou,
    Fibonacci,
    Gck,
    MitchellMoore,
}

/// Generators reading bytes from an OS file or character device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceVariant {
    File,
    DevRandom,
    DevUrandom,
}

/// Knuth's shuffling combinators (TAOCP vol. 2, 3.2.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShuffleVariant {
    KnuthM,
    KnuthB,
}

/// Identity tag attached to every generator.
///
/// Only used to name a generator for external lookup; it never influences
/// the produced stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneratorKind {
    Primitive(PrimitiveVariant),
    Device(DeviceVariant),
    Hash,
    Shuffle(ShuffleVariant),
}

/// Returned when a name does not match any known generator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown generator name: {0}")]
pub struct UnknownGeneratorName(pub String);

impl GeneratorKind {
    /// Every identity the engine can produce, in registry order.
    pub const ALL: [GeneratorKind; 13] = [
        GeneratorKind::Primitive(PrimitiveVariant::Lcg),
        GeneratorKind::Primitive(PrimitiveVariant::Nlfsr),
        GeneratorKind::Primitive(PrimitiveVariant::Qcg),
        GeneratorKind::Primitive(PrimitiveVariant::Coveyou),
        GeneratorKind::Primitive(PrimitiveVariant::Fibonacci),
        GeneratorKind::Primitive(PrimitiveVariant::Gck),
        GeneratorKind::Primitive(PrimitiveVariant::MitchellMoore),
        GeneratorKind::Device(DeviceVariant::File),
        GeneratorKind::Device(DeviceVariant::DevRandom),
        GeneratorKind::Device(DeviceVariant::DevUrandom),
        GeneratorKind::Hash,
        GeneratorKind::Shuffle(ShuffleVariant::KnuthM),
        GeneratorKind::Shuffle(ShuffleVariant::KnuthB),
    ];

    /// Canonical lower-case registry name.
    pub fn name(&self) -> &'static str {
        match self {
            GeneratorKind::Primitive(v) => v.name(),
            GeneratorKind::Device(v) => v.name(),
            GeneratorKind::Hash => "hrng",
            GeneratorKind::Shuffle(v) => v.name(),
        }
    }

    /// Resolves a registry name back to its identity tag.
    pub fn from_name(name: &str) -> Result<Self, UnknownGeneratorName> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| UnknownGeneratorName(name.to_string()))
    }

    /// Whether the stream is fully determined by the seed.
    pub fn is_deterministic(&self) -> bool {
        !matches!(self, GeneratorKind::Device(_))
    }

    /// Whether the generator accepts caller-supplied seed material.
    pub fn is_seedable(&self) -> bool {
        matches!(self, GeneratorKind::Primitive(_) | GeneratorKind::Hash)
    }
}

impl PrimitiveVariant {
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveVariant::Lcg => "lcg",
            PrimitiveVariant::Nlfsr => "nlfsr",
            PrimitiveVariant::Qcg => "qcg",
            PrimitiveVariant::Coveyou => "coveyou",
            PrimitiveVariant::Fibonacci => "fibonacci",
            PrimitiveVariant::Gck => "gck",
            PrimitiveVariant::MitchellMoore => "mitchell-moore",
        }
    }

    /// Minimum seed length in bytes accepted by `seed`.
    pub fn min_seed_len(&self) -> usize {
        match self {
            PrimitiveVariant::Lcg | PrimitiveVariant::Nlfsr => 1,
            PrimitiveVariant::Qcg | PrimitiveVariant::Coveyou | PrimitiveVariant::Gck => 4,
            PrimitiveVariant::Fibonacci => 8,
            PrimitiveVariant::MitchellMoore => 220,
        }
    }
}

impl DeviceVariant {
    pub fn name(&self) -> &'static str {
        match self {
            DeviceVariant::File => "file",
            DeviceVariant::DevRandom => "dev-random",
            DeviceVariant::DevUrandom => "dev-urandom",
        }
    }
}

impl ShuffleVariant {
    pub fn name(&self) -> &'static str {
        match self {
            ShuffleVariant::KnuthM => "knuth-m",
            ShuffleVariant::KnuthB => "knuth-b",
        }
    }
}

impl FromStr for GeneratorKind {
    type Err = UnknownGeneratorName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for PrimitiveVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for DeviceVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for ShuffleVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
