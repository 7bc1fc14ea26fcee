//! Fuzz target for the modification annotations, the first line is the sequence
use afl::*;

fn main() {
    fuzz!(|data: &[u8]| {
        if let Ok(s) = std::str::from_utf8(data) {
            let (sequence, annotations) = s.split_once('\n').unwrap_or(("PEPTIDE", s));
            let _unused = mzamanda::parse_modification_annotations(annotations, sequence);
        }
    });
}
