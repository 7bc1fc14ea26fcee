//! The [`AmandaErrorKind`] which makes it easy for downstream users of the error type to match on the exact error.

use context_error::{BoxedError, ErrorKind};
use serde::{Deserialize, Serialize};

/// The kind of error that can occur when reading an MS Amanda result file
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum AmandaErrorKind {
    /// The header is missing or misses one or more mandatory columns, nothing was parsed
    Schema,
    /// A data row has a numeric field that could not be read, or misses a mandatory field
    RowFormat,
    /// A modification annotation does not follow the `location(name|mass|flag)` grammar
    ModificationGrammar,
    /// The underlying file could not be opened or read
    #[default]
    IO,
}

impl ErrorKind for AmandaErrorKind {
    type Settings = ();
    fn descriptor(&self) -> &'static str {
        "error"
    }
    fn ignored(&self, _settings: Self::Settings) -> bool {
        false
    }
    fn is_error(&self, _settings: Self::Settings) -> bool {
        true
    }
}

/// The error type returned by all fallible operations in this crate
pub type AmandaError = BoxedError<'static, AmandaErrorKind>;
