//! ofxgen - CLI tool for converting bank transaction exports into OFX files.

use clap::Parser;
use ofxgen::{DelimitedStatement, Error, Profile, Result};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ofxgen")]
#[command(about = "Convert bank transaction data files into proper OFX files", long_about = None)]
struct Cli {
    /// The institution-specific profile to use for parsing the data file
    profile: PathBuf,

    /// The data transaction file downloaded from the financial institution
    datafile: PathBuf,

    /// Output file path (or stdout if not provided)
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr so stdout stays free for the OFX document.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    debug!(profile = %cli.profile.display(), datafile = %cli.datafile.display(), "starting conversion");

    let profile = Profile::load(&cli.profile)?;
    let parsed = DelimitedStatement::from_path(&cli.datafile, &profile)?;
    let statement = parsed.into_ofx(&profile)?;

    // The sink is only opened once the whole statement is ready.
    if let Some(ref output_path) = cli.output {
        let file = File::create(output_path).map_err(Error::OutputWriteFailure)?;
        statement.write_to(&mut BufWriter::new(file))
    } else {
        statement.write_to(&mut io::stdout().lock())
    }
}

