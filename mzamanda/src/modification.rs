//! Decode the modification annotations written by MS Amanda, e.g.
//! `N-Term(acetylation of protein n-term|42.010565|variable);C4(carbamidomethyl c|57.021464|fixed)`.

use serde::{Deserialize, Serialize};

use crate::{
    AmandaError, AmandaErrorKind,
    common_parser::Location,
    csv::CsvLine,
    helper_functions::{explain_number_error, parse_decimal},
};

/// Whether a modification was searched as fixed (always present) or variable
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum ModificationKind {
    /// Fixed modifications are implicit in the search settings
    Fixed,
    /// Variable modifications
    Variable,
}

/// A single modification on a peptide as annotated in the modifications column
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ModificationAnnotation {
    /// The 1-based position in the peptide, N-terminal modifications are placed on 1 and C-terminal modifications on the last residue
    pub site: usize,
    /// The mass shift in Dalton
    pub mass: f64,
    /// Fixed or variable
    pub kind: ModificationKind,
    /// The residue at the site in the (uppercased) sequence
    pub residue: char,
    /// The lowercased human readable name
    pub name: String,
}

impl ModificationAnnotation {
    /// The identifier used to find this modification in a modification catalog: `<mass>@<residue>`
    pub fn identifier(&self) -> String {
        format!("{:?}@{}", self.mass, self.residue)
    }
}

impl std::fmt::Display for ModificationAnnotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}({})", self.residue, self.site, self.identifier())
    }
}

/// Parse a full modifications column, the annotations are separated by semicolons. Both fixed
/// and variable modifications are returned. An empty text contains no modifications.
/// # Errors
/// If any annotation is malformed, the error points at that annotation.
pub fn parse_modification_annotations(
    text: &str,
    sequence: &str,
) -> Result<Vec<ModificationAnnotation>, AmandaError> {
    let line = CsvLine::single(text);
    let location = Location {
        line: &line,
        location: 0..text.len(),
        column: Some("Modifications"),
    };
    parse_modifications(location, sequence)
}

pub(crate) fn parse_modifications(
    location: Location<'_>,
    sequence: &str,
) -> Result<Vec<ModificationAnnotation>, AmandaError> {
    location
        .array(';')
        .map(|annotation| annotation.trim())
        .filter(|annotation| !annotation.as_str().is_empty())
        .filter_map(|annotation| parse_annotation(&annotation, sequence).transpose())
        .collect()
}

/// Parse a single `location(name|mass|flag)` annotation. Any fields after the flag are ignored.
/// Returns `None` if the flag is not recognised.
fn parse_annotation(
    annotation: &Location<'_>,
    sequence: &str,
) -> Result<Option<ModificationAnnotation>, AmandaError> {
    let grammar_error = |long_description: String| {
        annotation.error(
            AmandaErrorKind::ModificationGrammar,
            "Invalid MS Amanda modification",
            long_description,
        )
    };

    let (head, tail) = annotation.clone().split_once('(').ok_or_else(|| {
        grammar_error(format!(
            "The modification '{}' does not have the format `location(name|mass|fixed/variable)`, the opening bracket is missing",
            annotation.as_str()
        ))
    })?;
    let (body, _) = tail.rsplit_once(')').ok_or_else(|| {
        grammar_error(format!(
            "The modification '{}' does not have the format `location(name|mass|fixed/variable)`, the closing bracket is missing",
            annotation.as_str()
        ))
    })?;

    let length = sequence.chars().count();
    let site_text = head.as_str().trim();
    let site = if site_text.eq_ignore_ascii_case("N-Term") {
        1
    } else if site_text.eq_ignore_ascii_case("C-Term") {
        length
    } else {
        // Amino acid followed by the position, e.g. `C4`
        head.trim()
            .skip_char()
            .as_str()
            .parse::<usize>()
            .map_err(|err| {
                grammar_error(format!(
                    "The location '{site_text}' of modification '{}' should be 'N-Term', 'C-Term', or an amino acid followed by its position, but the position {}",
                    annotation.as_str(),
                    explain_number_error(&err)
                ))
            })?
    };
    let mut fields = body.array('|');
    let (Some(name), Some(mass), Some(flag)) = (fields.next(), fields.next(), fields.next()) else {
        return Err(grammar_error(format!(
            "The modification '{}' should have a name, mass, and fixed/variable flag separated by '|'",
            annotation.as_str()
        )));
    };
    let mass = parse_decimal(mass.as_str()).map_err(|_| {
        grammar_error(format!(
            "The mass '{}' of modification '{}' is not a number",
            mass.as_str().trim(),
            annotation.as_str()
        ))
    })?;
    let kind = match flag.as_str().trim().to_ascii_lowercase().as_str() {
        "variable" => ModificationKind::Variable,
        "fixed" => ModificationKind::Fixed,
        other => {
            log::warn!(
                "Ignoring modification '{}' on line {} with unknown flag '{other}'",
                annotation.as_str(),
                annotation.line.line_index() + 1,
            );
            return Ok(None);
        }
    };
    // Fixed modifications are never placed on the peptide, so their site is not checked
    let residue = site.checked_sub(1).and_then(|index| sequence.chars().nth(index));
    if kind == ModificationKind::Variable && (residue.is_none() || site > length) {
        return Err(grammar_error(format!(
            "The site {site} of modification '{}' is outside of the peptide '{sequence}'",
            annotation.as_str()
        )));
    }

    Ok(Some(ModificationAnnotation {
        site,
        mass,
        kind,
        residue: residue.unwrap_or('X'),
        name: name.as_str().trim().to_lowercase(),
    }))
}
