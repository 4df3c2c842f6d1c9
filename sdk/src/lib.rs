//! protoenv
//!
//! Runtime support for loaders generated by `protoenv-gen`.
//!
//! - [`LoadFromEnv`], implemented by every generated message loader
//! - [`env`] lookup helpers the generated code calls
//! - [`LoadError`], returned when an environment value cannot be applied

pub mod env;
pub mod error;
pub mod traits;

pub use env::{EnvSource, ProcessEnv};
pub use error::LoadError;
pub use traits::LoadFromEnv;
