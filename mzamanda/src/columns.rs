//! The column schema of MS Amanda result files and the resolution of a header line into column positions.

use std::sync::Arc;

use context_error::{BoxedError, Context, CreateError};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{AmandaError, AmandaErrorKind, common_parser::Location, csv::CsvLine};

/// Set up the column schema.
///
/// The required columns are present in all versions of the export, a file misses any of these is
/// rejected before any row is read. The optional columns were added (or removed) in some versions
/// and are resolved to absent when not found. For each column the variant name and the header text
/// (matched case insensitively) are given.
macro_rules! column_schema {
    (required { $($(#[doc = $rdoc:expr])* $rname:ident => $rheader:literal;)* }
     optional { $($(#[doc = $odoc:expr])* $oname:ident => $oheader:literal;)* }) => {
        /// All columns that are recognised in MS Amanda result files
        #[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
        #[allow(missing_docs)]
        pub enum AmandaColumn {
            $($(#[doc = $rdoc])* $rname,)*
            $($(#[doc = $odoc])* $oname,)*
        }

        impl AmandaColumn {
            /// The columns that have to be present in every file
            pub const REQUIRED: &'static [Self] = &[$(Self::$rname,)*];
            /// The columns that are only present in some versions
            pub const OPTIONAL: &'static [Self] = &[$(Self::$oname,)*];
            const COUNT: usize = Self::REQUIRED.len() + Self::OPTIONAL.len();

            /// The header text as written by MS Amanda
            pub const fn header(self) -> &'static str {
                match self {
                    $(Self::$rname => $rheader,)*
                    $(Self::$oname => $oheader,)*
                }
            }

            /// Check if this column has to be present in every file
            pub const fn is_required(self) -> bool {
                match self {
                    $(Self::$rname => true,)*
                    $(Self::$oname => false,)*
                }
            }

            /// Iterate over all columns, required columns first
            pub fn all() -> impl Iterator<Item = Self> {
                Self::REQUIRED.iter().chain(Self::OPTIONAL).copied()
            }
        }
    };
}

column_schema!(
    required {
        ScanNumber => "Scan Number";
        Title => "Title";
        Sequence => "Sequence";
        Modifications => "Modifications";
        ProteinAccessions => "Protein Accessions";
        AmandaScore => "Amanda Score";
        Rank => "Rank";
        Mz => "m/z";
        Charge => "Charge";
        Filename => "Filename";
    }
    optional {
        /// The e-value like score, used instead of the derived score when present
        WeightedProbability => "Weighted Probability";
        /// Retention time, written as `PT2700.46S` by some versions
        RetentionTime => "RT";
        MatchedPeaks => "Nr of matched peaks";
        MissedCleavages => "number of missed cleavages";
        Residues => "number of residues";
        ConsideredFragmentIons => "number of considered fragment ions";
        DeltaM => "delta M";
        AverageMS2Error => "avg MS2 error[ppm]";
        AssignedIntensityFraction => "assigned intensity fraction";
        BinomScore => "binom score";
        SearchDepth => "SearchDepth";
        Id => "Id";
        PercolatorQValue => "percolator:Q value";
    }
);

impl std::fmt::Display for AmandaColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.header())
    }
}

/// The position of all recognised columns in a specific file, built once from the header line
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ColumnIndex {
    positions: Vec<Option<usize>>,
}

impl ColumnIndex {
    /// Resolve the given (lowercased) header into column positions. If a header occurs multiple
    /// times the last occurrence is used. Unknown headers are ignored.
    /// # Errors
    /// If any of the required columns is missing, all missing columns are named in the error.
    pub fn from_header(header: &[Arc<String>], line_index: usize) -> Result<Self, AmandaError> {
        let mut positions = vec![None; AmandaColumn::COUNT];
        for (index, name) in header.iter().enumerate() {
            let column = AmandaColumn::all().find(|c| c.header().eq_ignore_ascii_case(name));
            if let Some(column) = column {
                positions[column as usize] = Some(index);
            }
        }
        let missing = AmandaColumn::REQUIRED
            .iter()
            .filter(|c| positions[**c as usize].is_none())
            .collect_vec();
        if missing.is_empty() {
            Ok(Self { positions })
        } else {
            Err(BoxedError::new(
                AmandaErrorKind::Schema,
                "Missing mandatory columns",
                format!(
                    "This MS Amanda file misses the mandatory column{} {}",
                    if missing.len() == 1 { "" } else { "s" },
                    missing.iter().map(|c| format!("'{c}'")).join(", ")
                ),
                Context::show(header.iter().join("\t"))
                    .line_index(line_index as u32)
                    .to_owned(),
            ))
        }
    }

    /// Get the position of the column, if it is present in this file
    pub fn position(&self, column: AmandaColumn) -> Option<usize> {
        self.positions.get(column as usize).copied().flatten()
    }

    /// Open a required column on the given line.
    /// # Errors
    /// If the line is too short to contain this column.
    pub(crate) fn required<'a>(
        &self,
        line: &'a CsvLine,
        column: AmandaColumn,
    ) -> Result<Location<'a>, AmandaError> {
        self.position(column)
            .and_then(|index| Location::column(line, index, column.header()))
            .ok_or_else(|| {
                BoxedError::new(
                    AmandaErrorKind::RowFormat,
                    "Invalid MS Amanda line",
                    format!(
                        "This line has only {} columns and misses the column '{column}'",
                        line.number_of_columns()
                    ),
                    line.full_context().to_owned(),
                )
            })
    }
}

#[cfg(test)]
#[expect(clippy::missing_panics_doc)]
mod tests {
    use context_error::{FullErrorContent, StaticErrorContent};

    use super::*;

    fn header(text: &str) -> Vec<Arc<String>> {
        text.split('\t')
            .map(|h| Arc::new(h.to_lowercase()))
            .collect()
    }

    const FULL: &str = "Scan Number\tTitle\tSequence\tModifications\tProtein Accessions\tAmanda Score\tWeighted Probability\tRank\tm/z\tCharge\tRT\tFilename";

    #[test]
    fn resolve() {
        let index = ColumnIndex::from_header(&header(FULL), 0).unwrap();
        assert_eq!(index.position(AmandaColumn::ScanNumber), Some(0));
        assert_eq!(index.position(AmandaColumn::WeightedProbability), Some(6));
        assert_eq!(index.position(AmandaColumn::Filename), Some(11));
        assert_eq!(index.position(AmandaColumn::PercolatorQValue), None);
    }

    #[test]
    fn case_insensitive_last_wins() {
        let index = ColumnIndex::from_header(
            &header(&format!("{FULL}\tUnknown column\tCHARGE")),
            1,
        )
        .unwrap();
        assert_eq!(index.position(AmandaColumn::Charge), Some(13));
    }

    #[test]
    fn inner_spaces_are_significant() {
        let error = ColumnIndex::from_header(
            &header(&FULL.replace("Scan Number", "ScanNumber")),
            0,
        )
        .unwrap_err();
        assert_eq!(error.get_kind(), AmandaErrorKind::Schema);
        assert!(error.to_string().contains("'Scan Number'"));
    }

    #[test]
    fn missing_columns_named() {
        let error = ColumnIndex::from_header(
            &header(&FULL.replace("\tCharge", "").replace("\tm/z", "")),
            0,
        )
        .unwrap_err();
        assert_eq!(error.get_kind(), AmandaErrorKind::Schema);
        let text = error.to_string();
        assert!(text.contains("'m/z'"));
        assert!(text.contains("'Charge'"));
    }

    #[test]
    fn deserialised_short_index() {
        let index: ColumnIndex = serde_json::from_str(r#"{"positions":[0,1]}"#).unwrap();
        assert_eq!(index.position(AmandaColumn::Title), Some(1));
        assert_eq!(index.position(AmandaColumn::Filename), None);
        assert_eq!(index.position(AmandaColumn::PercolatorQValue), None);
    }

    #[test]
    fn schema_table() {
        assert_eq!(AmandaColumn::REQUIRED.len(), 10);
        assert_eq!(AmandaColumn::OPTIONAL.len(), 13);
        assert!(AmandaColumn::all().take(10).all(AmandaColumn::is_required));
        assert!(!AmandaColumn::WeightedProbability.is_required());
        assert_eq!(AmandaColumn::AverageMS2Error.header(), "avg MS2 error[ppm]");
    }
}
