//! Expansion of peptide sequences containing ambiguous amino acid codes into all concrete sequences.

use itertools::Itertools;

/// A way of detecting and expanding ambiguous amino acid codes in a peptide sequence
pub trait SequenceExpander {
    /// Get the concrete residues an ambiguous code stands for, `None` if the residue is not ambiguous
    fn options(&self, residue: char) -> Option<&[char]>;

    /// Check if the sequence contains any ambiguous residue
    fn is_ambiguous(&self, sequence: &str) -> bool {
        sequence.chars().any(|residue| self.options(residue).is_some())
    }

    /// The number of concrete sequences this sequence stands for, saturating at `usize::MAX`
    fn number_of_combinations(&self, sequence: &str) -> usize {
        sequence
            .chars()
            .map(|residue| self.options(residue).map_or(1, <[char]>::len))
            .try_fold(1_usize, usize::checked_mul)
            .unwrap_or(usize::MAX)
    }

    /// Get all concrete sequences, in the order of the Cartesian product of the options at each
    /// ambiguous position (first position varies slowest). A sequence without ambiguous residues
    /// gives only itself.
    fn expand(&self, sequence: &str) -> Vec<String> {
        sequence
            .chars()
            .map(|residue| {
                self.options(residue)
                    .map_or_else(|| vec![residue], <[char]>::to_vec)
            })
            .multi_cartesian_product()
            .map(|residues| residues.into_iter().collect())
            .collect()
    }
}

/// The ambiguity codes of the IUPAC amino acid alphabet
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct IupacAmbiguity;

const ASX: &[char] = &['D', 'N'];
const XLE: &[char] = &['I', 'L'];
const GLX: &[char] = &['E', 'Q'];
const XAA: &[char] = &[
    'A', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'V', 'W',
    'Y',
];

impl SequenceExpander for IupacAmbiguity {
    fn options(&self, residue: char) -> Option<&[char]> {
        match residue {
            'B' => Some(ASX),
            'J' => Some(XLE),
            'Z' => Some(GLX),
            'X' => Some(XAA),
            _ => None,
        }
    }
}

#[cfg(test)]
#[expect(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn single_code() {
        assert!(IupacAmbiguity.is_ambiguous("PEPJIDE"));
        assert_eq!(
            IupacAmbiguity.expand("PEPJIDE"),
            vec!["PEPIIDE".to_string(), "PEPLIDE".to_string()]
        );
    }

    #[test]
    fn cartesian_product() {
        let expanded = IupacAmbiguity.expand("BAZ");
        assert_eq!(expanded, vec!["DAE", "DAQ", "NAE", "NAQ"]);
        assert_eq!(IupacAmbiguity.expand("XK").len(), 20);
        assert_eq!(IupacAmbiguity.number_of_combinations("BAZ"), 4);
        assert_eq!(IupacAmbiguity.number_of_combinations("XXX"), 8000);
        assert_eq!(IupacAmbiguity.number_of_combinations(&"X".repeat(30)), usize::MAX);
        assert!(IupacAmbiguity.expand("XK").iter().all(|s| s.len() == 2));
    }

    #[test]
    fn unambiguous() {
        assert!(!IupacAmbiguity.is_ambiguous("PEPTIDE"));
        assert_eq!(IupacAmbiguity.expand("PEPTIDE"), vec!["PEPTIDE"]);
        assert_eq!(IupacAmbiguity.number_of_combinations("PEPTIDE"), 1);
    }
}
