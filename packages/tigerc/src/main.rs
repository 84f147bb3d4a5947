//! Tiger front-end CLI.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use tiger_diagnostics::span::FileIdMap;
use tiger_diagnostics::Diagnostics;
use tiger_passes::display::dump_escapes;
use tiger_passes::{parse_file, run_front_passes};

/// The Tiger CLI. Parses a program, runs escape analysis, and prints the
/// per-declaration escape report.
#[derive(Debug, Parser)]
pub struct Args {
    /// The Tiger source file to analyze.
    #[arg(short = 'i', long)]
    input: PathBuf,
}

fn main() {
    match entry() {
        Ok(_) => {}
        Err(err) => eprintln!("{err}"),
    }
}

fn entry() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let diagnostics = Diagnostics::default();
    let mut map = FileIdMap::new();
    let file_id = map.insert_new_file(args.input.clone());
    let file = match parse_file(&args.input, file_id, diagnostics.clone()) {
        Ok(file) => file,
        Err(err) => {
            diagnostics.eprint(&map);
            return Err(err.into());
        }
    };
    if !diagnostics.eprint(&map) {
        return Ok(());
    }

    run_front_passes(&file.ast);
    print!("{}", dump_escapes(&file.ast));
    Ok(())
}
