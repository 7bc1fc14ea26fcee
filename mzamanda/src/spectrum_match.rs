//! The identifications read from a result file, grouped per spectrum.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thin_vec::ThinVec;

use crate::ModificationAnnotation;

/// The search engine that produced a match
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[non_exhaustive]
pub enum Advocate {
    /// MS Amanda
    #[default]
    MsAmanda,
}

impl Advocate {
    /// The name of the search engine
    pub const fn name(self) -> &'static str {
        match self {
            Self::MsAmanda => "MS Amanda",
        }
    }
}

impl std::fmt::Display for Advocate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A candidate peptide for a spectrum
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct PeptideCandidate {
    /// The uppercased sequence, this can contain ambiguous amino acids if it was not expanded
    pub sequence: String,
    /// The variable modifications, in the order they were annotated
    pub variable_modifications: ThinVec<ModificationAnnotation>,
}

impl std::fmt::Display for PeptideCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sequence)?;
        for modification in &self.variable_modifications {
            write!(f, " {modification}")?;
        }
        Ok(())
    }
}

/// A single peptide to spectrum match (PSM)
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct MatchAssumption {
    /// The peptide
    pub candidate: PeptideCandidate,
    /// The rank of this peptide for this spectrum, 1 is the best candidate
    pub rank: usize,
    /// The search engine
    pub advocate: Advocate,
    /// The charge used for the identification
    pub charge: isize,
    /// The score as reported by the search engine
    pub raw_score: f64,
    /// The e-value like score, lower is better
    pub score: f64,
    /// The name of the file this identification was read from
    pub identification_file: String,
    /// The scan number column as written
    pub scan_number: String,
    /// The protein accessions this peptide was matched to
    pub protein_accessions: Vec<String>,
    /// The precursor m/z, if it could be read
    pub mz: Option<f64>,
}

/// All matches for a single spectrum
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SpectrumMatch {
    /// The raw file the spectrum was recorded in
    pub spectrum_file: String,
    /// The title of the spectrum
    pub spectrum_title: String,
    /// All matches per search engine, in the order they were read
    pub assumptions: IndexMap<Advocate, Vec<MatchAssumption>>,
}

impl SpectrumMatch {
    /// Create a spectrum match without any assumptions
    pub fn new(spectrum_file: impl Into<String>, spectrum_title: impl Into<String>) -> Self {
        Self {
            spectrum_file: spectrum_file.into(),
            spectrum_title: spectrum_title.into(),
            assumptions: IndexMap::new(),
        }
    }

    /// Add a match for the given search engine
    pub fn add_assumption(&mut self, advocate: Advocate, assumption: MatchAssumption) {
        self.assumptions.entry(advocate).or_default().push(assumption);
    }

    /// Get the matches for the given search engine
    pub fn assumptions(&self, advocate: Advocate) -> &[MatchAssumption] {
        self.assumptions
            .get(&advocate)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The total number of matches over all search engines
    pub fn number_of_assumptions(&self) -> usize {
        self.assumptions.values().map(Vec::len).sum()
    }
}

/// The outcome of reading a full result file
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ParseResult {
    /// All spectrum matches, in the order each spectrum was first seen
    pub spectrum_matches: Vec<SpectrumMatch>,
    /// The version of the search engine, if it was written in the file
    pub software_version: Option<String>,
    /// If the parse was stopped before the end of the file
    pub cancelled: bool,
}

impl ParseResult {
    /// The total number of matches over all spectra
    pub fn number_of_assumptions(&self) -> usize {
        self.spectrum_matches
            .iter()
            .map(SpectrumMatch::number_of_assumptions)
            .sum()
    }
}
