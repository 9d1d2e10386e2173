//! Crate-wide building blocks shared by the pipeline and the HTTP services.

pub mod error;
pub mod status;

pub use error::{ErrorKind, OrderError, OrderResult};
