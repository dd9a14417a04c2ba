//! Error types for `hookline-core`.

use thiserror::Error;

/// Errors the normalization pipeline can produce.
///
/// Field-level problems inside a payload never error; they degrade to the
/// documented defaults. Only a body that is not well-formed JSON at all is
/// worth rejecting.
#[derive(Debug, Error)]
pub enum Error {
  /// The notification body was not a well-formed JSON document.
  #[error("malformed payload: {0}")]
  MalformedPayload(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
