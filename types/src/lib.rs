pub mod algorithm;
pub mod error_code;

pub use algorithm::{
    DeviceVariant, GeneratorKind, PrimitiveVariant, ShuffleVariant, UnknownGeneratorName,
};
pub use error_code::ErrorCode;
