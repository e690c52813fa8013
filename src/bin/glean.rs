//! glean - transcript entity resolution CLI
//!
//! Resolves one story segment's tagger output into flat entity records.
//!
//! # Usage
//!
//! ```bash
//! # Resolve one story to JSON Lines on stdout
//! glean resolve --data-dir refdata/ --transcript story.txt \
//!     --pass2 story.p2.csv --pass3 story.p3.csv --segment-id 42
//!
//! # Write to a file instead
//! glean resolve --data-dir refdata/ --transcript story.txt \
//!     --pass2 story.p2.csv --pass3 story.p3.csv --segment-id 42 -o out.jsonl
//!
//! # Verify a gazetteer bundle loads cleanly
//! glean check --data-dir refdata/
//! ```

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use glean::domestic::StateTable;
use glean::org::TableAuthority;
use glean::{Gazetteer, JsonLinesSink, Pipeline, Story};

/// Transcript entity resolution - dates, organizations, states, countries.
#[derive(Parser)]
#[command(name = "glean", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one story segment into entity records
    Resolve(ResolveArgs),
    /// Load the gazetteer bundle and report whether it is usable
    Check(CheckArgs),
}

#[derive(clap::Args)]
struct ResolveArgs {
    /// Directory holding the gazetteer reference files
    #[arg(long, value_name = "DIR")]
    data_dir: PathBuf,

    /// The interview transcript file
    #[arg(long, value_name = "FILE")]
    transcript: PathBuf,

    /// First tagger's output file
    #[arg(long, value_name = "FILE")]
    pass2: PathBuf,

    /// Second tagger's output file
    #[arg(long, value_name = "FILE")]
    pass3: PathBuf,

    /// Story segment identifier stamped on every record
    #[arg(long)]
    segment_id: u64,

    /// Organization authority file: `name<TAB>canonicalID` per line
    #[arg(long, value_name = "FILE")]
    authority: Option<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
struct CheckArgs {
    /// Directory holding the gazetteer reference files
    #[arg(long, value_name = "DIR")]
    data_dir: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Resolve(args) => resolve(args),
        Commands::Check(args) => check(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {}", msg);
            ExitCode::FAILURE
        }
    }
}

fn resolve(args: ResolveArgs) -> Result<(), String> {
    let gazetteer = Gazetteer::load(&args.data_dir).map_err(|e| e.to_string())?;
    let authority = match &args.authority {
        Some(path) => load_authority(path)?,
        None => TableAuthority::default(),
    };

    let story = Story {
        segment_id: args.segment_id,
        transcript: read(&args.transcript)?,
        pass_two: read(&args.pass2)?,
        pass_three: read(&args.pass3)?,
    };

    let pipeline = Pipeline::new(&gazetteer, &StateTable, &authority);
    let stats = match &args.output {
        Some(path) => {
            let file = fs::File::create(path)
                .map_err(|e| format!("{}: {}", path.display(), e))?;
            let mut sink = JsonLinesSink::new(io::BufWriter::new(file));
            let stats = pipeline
                .resolve_story(&story, &mut sink)
                .map_err(|e| e.to_string())?;
            sink.into_inner().map_err(|e| e.to_string())?;
            stats
        }
        None => {
            let mut sink = JsonLinesSink::new(io::stdout().lock());
            let stats = pipeline
                .resolve_story(&story, &mut sink)
                .map_err(|e| e.to_string())?;
            sink.into_inner().map_err(|e| e.to_string())?;
            stats
        }
    };

    eprintln!(
        "segment {}: {} spans, {} merged, {} records",
        args.segment_id, stats.spans, stats.merged, stats.records
    );
    Ok(())
}

fn check(args: CheckArgs) -> Result<(), String> {
    Gazetteer::load(&args.data_dir).map_err(|e| e.to_string())?;
    println!("gazetteer bundle in {} loads cleanly", args.data_dir.display());
    Ok(())
}

fn read(path: &PathBuf) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))
}

fn load_authority(path: &PathBuf) -> Result<TableAuthority, String> {
    let content = read(path)?;
    let pairs: Vec<(&str, &str)> = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| l.split_once('\t'))
        .collect();
    Ok(TableAuthority::new(&pairs))
}
