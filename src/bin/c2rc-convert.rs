use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(name = "c2rc-convert")]
#[command(about = "Convert a c2rc.sh credentials file to c2rc.bat", long_about = None, version = env!("C2_BUILD_VERSION"))]
struct Args {
    /// Path to c2rc.sh file
    infile: PathBuf,

    /// Path to c2rc.bat file. Prints to screen if not set
    outfile: Option<PathBuf>,
}

fn run(args: Args) -> Result<()> {
    let input = File::open(&args.infile)
        .with_context(|| format!("Failed to open {}", args.infile.display()))?;
    let input = BufReader::new(input);

    match &args.outfile {
        Some(path) => {
            let output = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            c2client::c2rc::convert(input, &mut BufWriter::new(output))
                .with_context(|| format!("Failed to write {}", path.display()))
        }
        None => c2client::c2rc::convert(input, &mut io::stdout().lock())
            .context("Failed to write to stdout"),
    }
}

fn main() {
    if let Err(e) = run(Args::parse()) {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        process::exit(1);
    }
}
