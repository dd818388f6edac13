//! Serde-loadable parameter sets for the configurable generators.

use crate::combinator::{KnuthB, KnuthM, DEFAULT_TABLE_SIZE};
use crate::device::DeviceGenerator;
use crate::error::GeneratorError;
use crate::generator::Generator;
use crate::hrng::Hrng;
use crate::primitive::{
    coveyou, fibonacci, nlfsr, qcg, Coveyou, Fibonacci, Lcg, Nlfsr, Qcg, DEFAULT_MODULUS,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::PathBuf;

/// Nonlinear feedback shift register parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NlfsrConfig {
    /// Register width in bits, 3 to 32.
    pub width: u32,
    pub linear_mask: u32,
    /// Seed bytes; when absent the register is seeded from the entropy helper.
    pub seed: Option<Vec<u8>>,
}

impl Default for NlfsrConfig {
    fn default() -> Self {
        Self {
            width: nlfsr::DEFAULT_WIDTH,
            linear_mask: nlfsr::DEFAULT_LINEAR_MASK,
            seed: None,
        }
    }
}

impl NlfsrConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(nlfsr::MIN_WIDTH..=nlfsr::MAX_WIDTH).contains(&self.width) {
            return Err(ConfigError::InvalidWidth(self.width));
        }
        if matches!(&self.seed, Some(seed) if seed.is_empty()) {
            return Err(ConfigError::EmptySeed);
        }
        Ok(())
    }

    pub fn build(&self) -> Result<Nlfsr, ConfigError> {
        self.validate()?;
        let mut generator = Nlfsr::with_params(self.width, self.linear_mask)?;
        if let Some(seed) = &self.seed {
            generator.seed(seed)?;
        }
        Ok(generator)
    }
}

/// Quadratic congruential generator coefficients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QcgConfig {
    pub x0: u32,
    pub a: u32,
    pub c: u32,
    pub d: u32,
    pub m: u32,
}

impl Default for QcgConfig {
    fn default() -> Self {
        Self {
            x0: qcg::DEFAULT_X0,
            a: qcg::DEFAULT_A,
            c: qcg::DEFAULT_C,
            d: qcg::DEFAULT_D,
            m: qcg::DEFAULT_M,
        }
    }
}

impl QcgConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.m == 0 {
            return Err(ConfigError::ZeroModulus("qcg"));
        }
        Ok(())
    }

    pub fn build(&self) -> Result<Qcg, ConfigError> {
        self.validate()?;
        Ok(Qcg::with_params(self.x0, self.a, self.c, self.d, self.m)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoveyouConfig {
    /// Starting value, congruent to 2 mod 4.
    pub x0: u32,
    pub m: u32,
}

impl Default for CoveyouConfig {
    fn default() -> Self {
        Self {
            x0: coveyou::DEFAULT_X0,
            m: DEFAULT_MODULUS,
        }
    }
}

impl CoveyouConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.m == 0 {
            return Err(ConfigError::ZeroModulus("coveyou"));
        }
        if self.x0 & 3 != 2 {
            return Err(ConfigError::InvalidCoveyouStart(self.x0));
        }
        Ok(())
    }

    pub fn build(&self) -> Result<Coveyou, ConfigError> {
        self.validate()?;
        Ok(Coveyou::with_params(self.x0, self.m)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FibonacciConfig {
    pub current: u32,
    pub previous: u32,
    pub m: u32,
}

impl Default for FibonacciConfig {
    fn default() -> Self {
        Self {
            current: fibonacci::DEFAULT_PAIR.0,
            previous: fibonacci::DEFAULT_PAIR.1,
            m: DEFAULT_MODULUS,
        }
    }
}

impl FibonacciConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.m == 0 {
            return Err(ConfigError::ZeroModulus("fibonacci"));
        }
        Ok(())
    }

    pub fn build(&self) -> Result<Fibonacci, ConfigError> {
        self.validate()?;
        Ok(Fibonacci::with_params(self.current, self.previous, self.m)?)
    }
}

/// File or character device read as a byte stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub path: PathBuf,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/dev/urandom"),
        }
    }
}

impl DeviceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath);
        }
        Ok(())
    }

    pub fn build(&self) -> Result<DeviceGenerator<File>, ConfigError> {
        self.validate()?;
        Ok(DeviceGenerator::open(&self.path)?)
    }
}

/// Shuffle table size for the Knuth combinators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShuffleConfig {
    pub table_size: u8,
}

impl Default for ShuffleConfig {
    fn default() -> Self {
        Self {
            table_size: DEFAULT_TABLE_SIZE,
        }
    }
}

impl ShuffleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table_size == 0 {
            return Err(ConfigError::EmptyTable);
        }
        Ok(())
    }

    pub fn build_m<'a>(
        &self,
        x: &'a mut dyn Generator,
        y: &'a mut dyn Generator,
    ) -> Result<KnuthM<'a>, ConfigError> {
        self.validate()?;
        Ok(KnuthM::new(x, y, self.table_size)?)
    }

    pub fn build_b<'a>(&self, source: &'a mut dyn Generator) -> Result<KnuthB<'a>, ConfigError> {
        self.validate()?;
        Ok(KnuthB::new(source, self.table_size)?)
    }
}

/// Any standalone generator, tagged by its registry name.
///
/// Combinators borrow their sources and are configured separately through
/// [`ShuffleConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "kebab-case")]
pub enum GeneratorConfig {
    Lcg { seed: Option<Vec<u8>> },
    Nlfsr(NlfsrConfig),
    Qcg(QcgConfig),
    Coveyou(CoveyouConfig),
    Fibonacci(FibonacciConfig),
    Hrng { seed: Option<Vec<u8>> },
    File(DeviceConfig),
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            GeneratorConfig::Lcg { seed } | GeneratorConfig::Hrng { seed } => {
                if matches!(seed, Some(s) if s.is_empty()) {
                    return Err(ConfigError::EmptySeed);
                }
                Ok(())
            }
            GeneratorConfig::Nlfsr(c) => c.validate(),
            GeneratorConfig::Qcg(c) => c.validate(),
            GeneratorConfig::Coveyou(c) => c.validate(),
            GeneratorConfig::Fibonacci(c) => c.validate(),
            GeneratorConfig::File(c) => c.validate(),
        }
    }

    pub fn build(&self) -> Result<Box<dyn Generator>, ConfigError> {
        self.validate()?;
        let generator: Box<dyn Generator> = match self {
            GeneratorConfig::Lcg { seed: Some(seed) } => Box::new(Lcg::from_seed(seed)?),
            GeneratorConfig::Lcg { seed: None } => Box::new(Lcg::new()),
            GeneratorConfig::Nlfsr(c) => Box::new(c.build()?),
            GeneratorConfig::Qcg(c) => Box::new(c.build()?),
            GeneratorConfig::Coveyou(c) => Box::new(c.build()?),
            GeneratorConfig::Fibonacci(c) => Box::new(c.build()?),
            GeneratorConfig::Hrng { seed: Some(seed) } => Box::new(Hrng::from_seed(seed)?),
            GeneratorConfig::Hrng { seed: None } => Box::new(Hrng::new()?),
            GeneratorConfig::File(c) => Box::new(c.build()?),
        };
        tracing::debug!(algorithm = %generator.kind(), "built generator from config");
        Ok(generator)
    }
}

/// Errors arising from generator configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("register width {0} outside 3..=32")]
    InvalidWidth(u32),
    #[error("{0} modulus must be non-zero")]
    ZeroModulus(&'static str),
    #[error("coveyou start {0:#x} is not congruent to 2 mod 4")]
    InvalidCoveyouStart(u32),
    #[error("seed must not be empty")]
    EmptySeed,
    #[error("shuffle table size must be at least 1")]
    EmptyTable,
    #[error("device path is empty")]
    EmptyPath,
    #[error("generator error: {0}")]
    Generator(#[from] GeneratorError),
}
