use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use clap::{Parser, ValueEnum};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use regex::Regex;
use rodiff::{
    algorithm::{JunkPolicy, SequenceMatcher},
    input::{read_text, split_lines_keepends},
};

#[derive(Debug)]
struct Testcase {
    name: String,
    left: String,
    right: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Measure {
    Ratio,
    Quick,
    RealQuick,
    Opcodes,
}

#[derive(Parser)]
struct Args {
    /// Directory with `NAME.left` and `NAME.right` files.
    testcase_directory: Option<String>,

    #[arg(short, long, default_value_t = String::from(""))]
    filter: String,

    /// Benchmark on this many generated pairs instead of a directory.
    #[arg(long, value_name = "COUNT")]
    random: Option<usize>,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(long)]
    no_autojunk: bool,

    #[arg(value_enum, long = "measure")]
    measures: Vec<Measure>,
}

fn read_testcases(directory: &Path, regex: &Regex) -> anyhow::Result<Vec<Testcase>> {
    let mut testcases = vec![];
    for file in std::fs::read_dir(directory)? {
        let path = file?.path();
        if path.extension() != Some(OsStr::new("left")) {
            continue;
        }

        let Some(name) = path.file_stem().and_then(OsStr::to_str).map(str::to_owned) else {
            continue;
        };
        if !regex.is_match(&name) {
            continue;
        }
        let mut right: PathBuf = path.clone();
        right.set_extension("right");
        if !right.exists() {
            continue;
        }

        testcases.push(Testcase {
            name,
            left: read_text(&path)?,
            right: read_text(&right)?,
        });
    }
    testcases.sort_by(|x, y| x.name.cmp(&y.name));
    Ok(testcases)
}

/// Source-like files: lines drawn from a small vocabulary, then edited.
fn random_testcases(seed: u64, count: usize) -> Vec<Testcase> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let vocabulary: Vec<String> = (0..64).map(|i| format!("line {i}\n")).collect();
    (0..count)
        .map(|index| {
            let len = rng.gen_range(0..2000);
            let left: Vec<&str> = (0..len).map(|_| vocabulary[rng.gen_range(0..vocabulary.len())].as_str()).collect();
            let right: Vec<&str> = left
                .iter()
                .filter_map(|line| match rng.gen_range(0..20) {
                    0 => None,
                    1 => Some(vocabulary[rng.gen_range(0..vocabulary.len())].as_str()),
                    _ => Some(*line),
                })
                .collect();
            Testcase {
                name: format!("random-{index}"),
                left: left.concat(),
                right: right.concat(),
            }
        })
        .collect()
}

fn run(matcher: &SequenceMatcher<&str>, measure: Measure) -> (String, Duration) {
    let start = Instant::now();
    let result = match measure {
        Measure::Ratio => format!("{:.4}", matcher.ratio()),
        Measure::Quick => format!("{:.4}", matcher.quick_ratio()),
        Measure::RealQuick => format!("{:.4}", matcher.real_quick_ratio()),
        Measure::Opcodes => format!("{} opcodes", matcher.opcodes().len()),
    };
    (result, start.elapsed())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let regex = Regex::new(&args.filter)?;

    let testcases = match (&args.testcase_directory, args.random) {
        (_, Some(count)) => random_testcases(args.seed, count),
        (Some(directory), None) => read_testcases(Path::new(directory), &regex)?,
        (None, None) => anyhow::bail!("give a testcase directory or --random COUNT"),
    };

    let measures = if args.measures.is_empty() {
        vec![Measure::Ratio, Measure::Quick, Measure::RealQuick]
    } else {
        args.measures.clone()
    };

    for testcase in testcases {
        let left = split_lines_keepends(&testcase.left);
        let right = split_lines_keepends(&testcase.right);
        println!("Compare {} ({} vs {} lines)", testcase.name, left.len(), right.len());

        let policy = if args.no_autojunk {
            JunkPolicy::NoJunk
        } else {
            JunkPolicy::Popularity
        };
        let start = Instant::now();
        let matcher = SequenceMatcher::with_policy(policy, &left, &right);
        println!("  index built in {:?}", start.elapsed());

        for &measure in &measures {
            // The first measure also pays for the matching blocks, which are cached after that.
            let (result, elapsed) = run(&matcher, measure);
            println!("  {measure:?}: {result} in {elapsed:?}");
        }
    }

    Ok(())
}
