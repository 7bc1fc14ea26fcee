//! Read MS Amanda result files (`.ms-amanda.csv`) into spectrum matches.

use std::{
    io::{BufRead, BufReader, Read},
    path::{Path, PathBuf},
    sync::Arc,
};

use context_error::{BoxedError, Context, CreateError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thin_vec::ThinVec;

use crate::{
    Advocate, AmandaColumn, AmandaError, AmandaErrorKind, CancellationSignal, ColumnIndex,
    IupacAmbiguity, MatchAssumption, ModificationAnnotation, ModificationKind, ParseResult,
    PeptideCandidate, SequenceExpander, SpectrumMatch,
    csv::{CsvLine, CsvLineIter, open_file, parse_csv, parse_csv_raw, version_from_line},
    helper_functions::{check_extension, parse_decimal, url_decode},
    modification::parse_modifications,
};

/// The extension used for MS Amanda result files
pub const EXTENSION: &str = ".ms-amanda.csv";
/// The name of the search engine
pub const SOFTWARE_NAME: &str = "MS Amanda";

const SEPARATOR: u8 = b'\t';

static NUMBER_ERROR: (&str, &str) = (
    "Invalid MS Amanda line",
    "This column is not a number but it is required to be a number in this MS Amanda format",
);
static RANK_ERROR: (&str, &str) = (
    "Invalid MS Amanda line",
    "The rank has to be a positive whole number, with 1 the best candidate",
);

/// The settings for parsing an MS Amanda result file
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct MsAmandaParameters {
    /// Create a separate match for every concrete sequence an ambiguous sequence stands for
    pub expand_ambiguous_combinations: bool,
    /// Keep an ambiguous sequence as is when it would expand into more sequences than this
    /// (`X` alone gives 20 per position), `None` expands every sequence fully
    pub maximum_combinations: Option<usize>,
}

impl Default for MsAmandaParameters {
    fn default() -> Self {
        Self {
            expand_ambiguous_combinations: true,
            maximum_combinations: None,
        }
    }
}

/// Check if the file looks like an MS Amanda result file based on its name (`.gz` is allowed)
pub fn is_amanda_file(path: impl AsRef<Path>) -> bool {
    check_extension(path, EXTENSION)
}

/// Get the MS Amanda version from the first line of the file.
/// # Errors
/// If the file could not be opened or read.
pub fn extract_version(path: impl AsRef<Path>) -> Result<Option<String>, AmandaError> {
    let path = path.as_ref();
    match BufReader::new(open_file(path)?).lines().next() {
        None => Ok(None),
        Some(Ok(line)) => Ok(version_from_line(&line)),
        Some(Err(err)) => Err(BoxedError::new(
            AmandaErrorKind::IO,
            "Could not read version line",
            err.to_string(),
            Context::none()
                .line_index(0)
                .source(path.to_string_lossy())
                .to_owned(),
        )),
    }
}

/// Parse all spectrum matches in an MS Amanda result file with the IUPAC ambiguity codes.
/// # Errors
/// See [`parse_file`].
pub fn parse_all(
    path: impl AsRef<Path>,
    expand_ambiguous_combinations: bool,
    cancel: &impl CancellationSignal,
) -> Result<Vec<SpectrumMatch>, AmandaError> {
    parse_file(
        path,
        MsAmandaParameters {
            expand_ambiguous_combinations,
            ..MsAmandaParameters::default()
        },
        &IupacAmbiguity,
        cancel,
    )
    .map(|result| result.spectrum_matches)
}

/// Parse an MS Amanda result file, gzipped files (`.gz`) are decompressed on the fly. The
/// assumptions are labelled with the file name.
/// # Errors
/// * If the file could not be opened or read.
/// * If the header misses any required column.
/// * If any line contains an invalid number or modification.
pub fn parse_file(
    path: impl AsRef<Path>,
    parameters: MsAmandaParameters,
    expander: &impl SequenceExpander,
    cancel: &impl CancellationSignal,
) -> Result<ParseResult, AmandaError> {
    let path = path.as_ref();
    let label = path
        .file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned();
    parse_lines(
        parse_csv(path, SEPARATOR)?,
        &label,
        parameters,
        expander,
        cancel,
    )
}

/// Parse MS Amanda results from any reader, the assumptions are labelled with the given label.
/// # Errors
/// See [`parse_file`].
pub fn parse_reader(
    reader: impl Read,
    label: &str,
    parameters: MsAmandaParameters,
    expander: &impl SequenceExpander,
    cancel: &impl CancellationSignal,
) -> Result<ParseResult, AmandaError> {
    parse_lines(
        parse_csv_raw(reader, SEPARATOR, Some(Arc::new(label.to_string())))?,
        label,
        parameters,
        expander,
        cancel,
    )
}

fn parse_lines<T: Read>(
    lines: CsvLineIter<T>,
    label: &str,
    parameters: MsAmandaParameters,
    expander: &impl SequenceExpander,
    cancel: &impl CancellationSignal,
) -> Result<ParseResult, AmandaError> {
    let software_version = lines.version().map(ToString::to_string);
    if let Some(version) = &software_version {
        log::debug!("{SOFTWARE_NAME} version {version} ({label})");
    }
    let columns = ColumnIndex::from_header(lines.header(), lines.header_index())?;
    log::debug!(
        "Resolved columns for {label}: {}",
        AmandaColumn::all()
            .filter_map(|c| columns.position(c).map(|p| format!("{c}={p}")))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let mut matches: IndexMap<String, IndexMap<String, SpectrumMatch>> = IndexMap::new();
    let mut rows = 0;
    let mut cancelled = false;
    for line in lines {
        let line = line?;
        let row = Row::parse(&line, &columns)?;
        rows += 1;

        let spectrum = matches
            .entry(row.spectrum_file.clone())
            .or_default()
            .entry(row.spectrum_title.clone())
            .or_insert_with(|| SpectrumMatch::new(&row.spectrum_file, &row.spectrum_title));
        for assumption in row.assumptions(label, parameters, expander) {
            spectrum.add_assumption(Advocate::MsAmanda, assumption);
        }

        if cancel.is_cancelled() {
            log::info!("Cancelled reading {label} after {rows} rows");
            cancelled = true;
            break;
        }
    }

    let spectrum_matches: Vec<SpectrumMatch> = matches
        .into_values()
        .flat_map(IndexMap::into_values)
        .collect();
    let result = ParseResult {
        spectrum_matches,
        software_version,
        cancelled,
    };
    log::info!(
        "Read {rows} rows from {label} into {} spectrum matches with {} assumptions",
        result.spectrum_matches.len(),
        result.number_of_assumptions()
    );
    Ok(result)
}

/// A single data row, before ambiguity expansion
struct Row {
    spectrum_file: String,
    spectrum_title: String,
    sequence: String,
    variable_modifications: ThinVec<ModificationAnnotation>,
    rank: usize,
    charge: isize,
    raw_score: f64,
    score: f64,
    scan_number: String,
    protein_accessions: Vec<String>,
    mz: Option<f64>,
}

impl Row {
    fn parse(line: &CsvLine, columns: &ColumnIndex) -> Result<Self, AmandaError> {
        let spectrum_title = url_decode(
            columns
                .required(line, AmandaColumn::Title)?
                .as_str()
                .trim(),
        )
        .into_owned();
        let sequence = columns
            .required(line, AmandaColumn::Sequence)?
            .as_str()
            .trim()
            .to_uppercase();
        let raw_score = columns
            .required(line, AmandaColumn::AmandaScore)?
            .parse_decimal(AmandaErrorKind::RowFormat, NUMBER_ERROR)?;
        // A file with the weighted probability column needs it on every row
        let score = if columns.position(AmandaColumn::WeightedProbability).is_some() {
            columns
                .required(line, AmandaColumn::WeightedProbability)?
                .parse_decimal(AmandaErrorKind::RowFormat, NUMBER_ERROR)?
        } else {
            10.0_f64.powf(-raw_score)
        };
        let rank_location = columns.required(line, AmandaColumn::Rank)?;
        let rank = rank_location.parse::<usize>(RANK_ERROR)?;
        if rank == 0 {
            return Err(rank_location.error(
                AmandaErrorKind::RowFormat,
                RANK_ERROR.0,
                RANK_ERROR.1,
            ));
        }
        let charge = columns
            .required(line, AmandaColumn::Charge)?
            .parse::<isize>(NUMBER_ERROR)?;
        let variable_modifications =
            parse_modifications(columns.required(line, AmandaColumn::Modifications)?, &sequence)?
                .into_iter()
                .filter(|m| m.kind == ModificationKind::Variable)
                .collect();

        Ok(Self {
            spectrum_file: columns
                .required(line, AmandaColumn::Filename)?
                .as_str()
                .trim()
                .to_string(),
            spectrum_title,
            sequence,
            variable_modifications,
            rank,
            charge,
            raw_score,
            score,
            scan_number: columns
                .required(line, AmandaColumn::ScanNumber)?
                .trim()
                .get_string(),
            protein_accessions: columns
                .required(line, AmandaColumn::ProteinAccessions)?
                .array(';')
                .map(|accession| accession.trim())
                .filter(|accession| !accession.as_str().is_empty())
                .map(|accession| accession.get_string())
                .collect(),
            mz: columns
                .required(line, AmandaColumn::Mz)
                .ok()
                .and_then(|location| parse_decimal(location.as_str()).ok()),
        })
    }

    /// Build the assumptions for this row, one per concrete sequence if expansion is requested
    fn assumptions(
        &self,
        label: &str,
        parameters: MsAmandaParameters,
        expander: &impl SequenceExpander,
    ) -> Vec<MatchAssumption> {
        let combinations = if parameters.expand_ambiguous_combinations
            && expander.is_ambiguous(&self.sequence)
        {
            expander.number_of_combinations(&self.sequence)
        } else {
            1
        };
        let sequences = if combinations == 1 {
            vec![self.sequence.clone()]
        } else if parameters
            .maximum_combinations
            .is_some_and(|maximum| combinations > maximum)
        {
            log::warn!(
                "Not expanding {} on spectrum '{}' into {combinations} sequences",
                self.sequence,
                self.spectrum_title
            );
            vec![self.sequence.clone()]
        } else {
            expander.expand(&self.sequence)
        };
        sequences
            .into_iter()
            .map(|sequence| MatchAssumption {
                candidate: PeptideCandidate {
                    sequence,
                    variable_modifications: self.variable_modifications.clone(),
                },
                rank: self.rank,
                advocate: Advocate::MsAmanda,
                charge: self.charge,
                raw_score: self.raw_score,
                score: self.score,
                identification_file: label.to_string(),
                scan_number: self.scan_number.clone(),
                protein_accessions: self.protein_accessions.clone(),
                mz: self.mz,
            })
            .collect()
    }
}

/// An MS Amanda result file, the version is read when the file is opened
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MsAmandaReader {
    path: PathBuf,
    version: Option<String>,
}

impl MsAmandaReader {
    /// Open a result file and read its version line.
    /// # Errors
    /// If the file could not be opened or read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AmandaError> {
        let path = path.as_ref().to_path_buf();
        let version = extract_version(&path)?;
        Ok(Self { path, version })
    }

    /// The path of the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The MS Amanda version that wrote this file, if it was noted in the file
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// All software with the versions used to create this file
    pub fn software_versions(&self) -> IndexMap<String, Vec<String>> {
        let mut versions = IndexMap::new();
        versions.insert(
            SOFTWARE_NAME.to_string(),
            self.version.iter().cloned().collect(),
        );
        versions
    }

    /// Parse all spectrum matches with the IUPAC ambiguity codes.
    /// # Errors
    /// See [`parse_file`].
    pub fn parse_all(
        &self,
        expand_ambiguous_combinations: bool,
        cancel: &impl CancellationSignal,
    ) -> Result<Vec<SpectrumMatch>, AmandaError> {
        parse_all(&self.path, expand_ambiguous_combinations, cancel)
    }

    /// Parse all spectrum matches with the given settings.
    /// # Errors
    /// See [`parse_file`].
    pub fn parse_all_with(
        &self,
        parameters: MsAmandaParameters,
        expander: &impl SequenceExpander,
        cancel: &impl CancellationSignal,
    ) -> Result<ParseResult, AmandaError> {
        parse_file(&self.path, parameters, expander, cancel)
    }
}
