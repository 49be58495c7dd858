#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use derive_more::{Display, From};
use swagplus_core::SpecError;

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// IO Error wrapper.
    #[display("IO Error: {}", _0)]
    Io(std::io::Error),

    /// Declaration, configuration or rendering failure from the core.
    #[display("{}", _0)]
    Spec(SpecError),

    /// A command line value could not be interpreted.
    #[from(ignore)]
    #[display("Invalid argument: {}", _0)]
    InvalidArgument(String),
}

/// Manual implementation of the standard Error trait.
///
/// `InvalidArgument` carries a plain `String`, so `source()` cannot be derived.
impl std::error::Error for CliError {}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_error_passes_through() {
        let err: CliError = SpecError::Config("title must not be empty".into()).into();
        assert_eq!(err.to_string(), "Configuration Error: title must not be empty");
    }

    #[test]
    fn test_io_error_is_prefixed() {
        let err: CliError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.to_string(), "IO Error: gone");
    }
}
