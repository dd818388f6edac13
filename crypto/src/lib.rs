//! Pluggable pseudo-random byte generators.
//!
//! Every generator implements [`Generator`]: seed it, pull bytes with
//! `extract`, step it with `advance`, release it with `teardown`. The
//! algorithms range from classic arithmetic recurrences to a SHA-512
//! counter generator and OS entropy devices, plus Knuth's shuffling
//! combinators layered over any of them.
//!
//! None of the arithmetic generators are suitable for key material.

pub mod combinator;
pub mod config;
pub mod device;
pub mod entropy;
pub mod error;
pub mod generator;
pub mod hrng;
pub mod primitive;
pub mod rng;
pub mod wipe;

pub use block_test::{block_test, BlockStatistics};
pub use combinator::{KnuthB, KnuthM};
pub use config::{ConfigError, GeneratorConfig};
pub use device::DeviceGenerator;
pub use entropy::EntropySeed;
pub use error::{GeneratorError, GeneratorResult};
pub use generator::Generator;
pub use hrng::{DigestFunction, Hrng, Sha512Digest};
pub use primitive::{Coveyou, Fibonacci, Gck, Lcg, MitchellMoore, Nlfsr, Qcg};
pub use rng::GeneratorRng;
pub use wipe::wipe;
