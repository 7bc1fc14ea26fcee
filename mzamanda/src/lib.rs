#![doc = include_str!("../README.md")]

mod cancellation;
mod columns;
mod common_parser;
/// Parse the character separated files while keeping track of all necessary info to generate great error messages
pub mod csv;
mod error;
mod helper_functions;
mod modification;
mod reader;
mod sequence;
mod spectrum_match;


pub use cancellation::{CancellationSignal, NeverCancelled};
pub use columns::{AmandaColumn, ColumnIndex};
pub use error::{AmandaError, AmandaErrorKind};
pub use modification::{ModificationAnnotation, ModificationKind, parse_modification_annotations};
pub use reader::{
    EXTENSION, MsAmandaParameters, MsAmandaReader, SOFTWARE_NAME, extract_version,
    is_amanda_file, parse_all, parse_file, parse_reader,
};
pub use sequence::{IupacAmbiguity, SequenceExpander};
pub use spectrum_match::{
    Advocate, MatchAssumption, ParseResult, PeptideCandidate, SpectrumMatch,
};

/// A subset of the types and traits that are envisioned to be used the most, importing this is a good starting point for working with the crate
pub mod prelude {
    pub use crate::{
        Advocate, AmandaErrorKind, CancellationSignal, MatchAssumption, MsAmandaParameters,
        MsAmandaReader, NeverCancelled, SequenceExpander, SpectrumMatch,
    };
}
