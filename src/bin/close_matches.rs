use std::{collections::HashSet, io::Read, path::PathBuf};

use anyhow::Context as _;
use clap::Parser;
use regex::Regex;
use rodiff::{
    algorithm::{get_close_matches, DEFAULT_CUTOFF, DEFAULT_MAX_RESULTS},
    input::read_text,
};
use tracing_subscriber::EnvFilter;

/// Prints the words of FILE (or standard input) that are most similar to WORD.
#[derive(Parser)]
struct Args {
    word: String,

    file: Option<PathBuf>,

    /// Maximum number of matches to print.
    #[arg(short, default_value_t = DEFAULT_MAX_RESULTS)]
    n: usize,

    /// Minimum similarity ratio in [0, 1].
    #[arg(long, default_value_t = DEFAULT_CUTOFF)]
    cutoff: f64,

    /// Only consider candidate words matching this regex.
    #[arg(short, long, default_value_t = String::from(""))]
    filter: String,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();

    let regex = Regex::new(&args.filter)?;

    let text = match &args.file {
        Some(path) => read_text(path).with_context(|| format!("can't read {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    let mut seen = HashSet::new();
    let candidates: Vec<&str> = text
        .split_whitespace()
        .filter(|word| regex.is_match(word))
        .filter(|word| seen.insert(*word))
        .collect();
    tracing::debug!(candidates = candidates.len(), "collected candidate words");

    for word in get_close_matches(&args.word, &candidates, args.n, args.cutoff)? {
        println!("{word}");
    }

    Ok(())
}
