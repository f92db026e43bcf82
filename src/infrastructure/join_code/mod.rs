//! Join-code infrastructure

mod generator;

pub use generator::{JoinCodeGenerator, JOIN_CODE_LENGTH};
