//! Convert an MS Amanda result file into a flat CSV table with one line per peptide-spectrum match.

use std::{fs::File, io::BufWriter, path::PathBuf, process::ExitCode};

use clap::Parser;
use mzamanda::{
    Advocate, IupacAmbiguity, MsAmandaParameters, NeverCancelled, ParseResult, csv::write_csv,
    is_amanda_file, parse_file,
};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// The MS Amanda result file (`.ms-amanda.csv`, optionally gzipped)
    #[arg(short, long)]
    in_path: PathBuf,

    /// Where to store the table of peptide-spectrum matches
    #[arg(short, long)]
    out_path: PathBuf,

    /// Keep sequences with ambiguous amino acids (B, J, Z, X) as is instead of generating all concrete sequences
    #[arg(long)]
    no_expand: bool,

    /// Do not expand sequences that would give more than this number of concrete sequences
    #[arg(long)]
    maximum_combinations: Option<usize>,

    /// The separator for the output table
    #[arg(short, long, default_value_t = ',')]
    separator: char,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Cli::parse();

    if !is_amanda_file(&args.in_path) {
        log::warn!(
            "{} does not have the MS Amanda extension, trying to read it anyway",
            args.in_path.display()
        );
    }

    let result = match parse_file(
        &args.in_path,
        MsAmandaParameters {
            expand_ambiguous_combinations: !args.no_expand,
            maximum_combinations: args.maximum_combinations,
        },
        &IupacAmbiguity,
        &NeverCancelled,
    ) {
        Ok(result) => result,
        Err(error) => {
            eprintln!("{error}");
            return ExitCode::FAILURE;
        }
    };

    let out_file = match File::create(&args.out_path) {
        Ok(file) => BufWriter::new(file),
        Err(error) => {
            eprintln!("Could not create {}: {error}", args.out_path.display());
            return ExitCode::FAILURE;
        }
    };
    if let Err(error) = write_csv(out_file, rows(&result), args.separator) {
        eprintln!("Could not write {}: {error}", args.out_path.display());
        return ExitCode::FAILURE;
    }
    println!(
        "Wrote {} peptide-spectrum matches for {} spectra",
        result.number_of_assumptions(),
        result.spectrum_matches.len()
    );
    ExitCode::SUCCESS
}

/// Flatten all matches into table rows
fn rows(result: &ParseResult) -> Vec<Vec<(String, String)>> {
    let version = result.software_version.clone().unwrap_or_default();
    result
        .spectrum_matches
        .iter()
        .flat_map(|spectrum| {
            spectrum
                .assumptions(Advocate::MsAmanda)
                .iter()
                .map(|assumption| {
                    vec![
                        ("raw_file".to_string(), spectrum.spectrum_file.clone()),
                        ("title".to_string(), spectrum.spectrum_title.clone()),
                        ("scan_number".to_string(), assumption.scan_number.clone()),
                        ("rank".to_string(), assumption.rank.to_string()),
                        (
                            "sequence".to_string(),
                            assumption.candidate.sequence.clone(),
                        ),
                        (
                            "variable_modifications".to_string(),
                            assumption
                                .candidate
                                .variable_modifications
                                .iter()
                                .map(ToString::to_string)
                                .collect::<Vec<_>>()
                                .join(";"),
                        ),
                        ("charge".to_string(), assumption.charge.to_string()),
                        (
                            "mz".to_string(),
                            assumption.mz.map(|mz| mz.to_string()).unwrap_or_default(),
                        ),
                        ("amanda_score".to_string(), assumption.raw_score.to_string()),
                        ("score".to_string(), assumption.score.to_string()),
                        (
                            "proteins".to_string(),
                            assumption.protein_accessions.join(";"),
                        ),
                        (
                            "identification_file".to_string(),
                            assumption.identification_file.clone(),
                        ),
                        ("advocate".to_string(), assumption.advocate.to_string()),
                        ("software_version".to_string(), version.clone()),
                    ]
                })
                .collect::<Vec<_>>()
        })
        .collect()
}
