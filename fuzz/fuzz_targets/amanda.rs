//! Fuzz target for full MS Amanda result files, with a bound on the ambiguity expansion
use afl::*;
use mzamanda::{IupacAmbiguity, MsAmandaParameters, NeverCancelled};

fn main() {
    fuzz!(|data: &[u8]| {
        let _unused = mzamanda::parse_reader(
            data,
            "fuzz",
            MsAmandaParameters {
                expand_ambiguous_combinations: true,
                maximum_combinations: Some(1000),
            },
            &IupacAmbiguity,
            &NeverCancelled,
        );
    });
}
