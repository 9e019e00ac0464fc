use anyhow::Context as _;
use clap::Parser;
use regex::Regex;
use rodiff::{
    algorithm::{is_character_junk, Differ, JunkPolicy, JunkPredicate, Opcode, SequenceMatcher},
    basic_terminal::{side_by_side, write_lines, SideBySideLayout},
    config::{default_config_path, load_config_file, resolve, Config, ConfigOpt, OutputMode},
    input::read_file_pair,
    patch::{context_diff_from_opcodes, unified_diff_from_opcodes, PatchHeader},
    validate::{print_errors, validate_opcodes},
};
use std::io::stdout;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Compare two files line by line")]
struct Args {
    #[command(flatten)]
    config: ConfigOpt,

    /// Read settings from this TOML file instead of the default location.
    #[arg(long, value_name = "PATH")]
    config_file: Option<PathBuf>,

    fromfile: String,

    tofile: String,
}

fn line_opcodes(a: &[&str], b: &[&str], line_junk: Option<&Regex>, autojunk: bool) -> Vec<Opcode> {
    let predicate = line_junk.map(|re| Box::new(move |line: &&str| re.is_match(line)) as JunkPredicate<&str>);
    let matcher = SequenceMatcher::with_policy(JunkPolicy::from_parts(predicate, autojunk), a, b);
    matcher.opcodes().to_vec()
}

fn render(config: &Config, args: &Args, a: &[&str], b: &[&str], dates: &[String; 2]) -> anyhow::Result<Vec<String>> {
    let line_junk = config.line_junk_regex()?;
    let opcodes = line_opcodes(a, b, line_junk.as_ref(), config.autojunk);
    print_errors(&validate_opcodes(&opcodes, a.len(), b.len()));

    let header = PatchHeader::new(&args.fromfile, &args.tofile).with_dates(&dates[0], &dates[1]);
    let lines = match config.mode {
        OutputMode::Context => context_diff_from_opcodes(a, b, &opcodes, &header, config.context_lines),
        OutputMode::Unified => unified_diff_from_opcodes(a, b, &opcodes, &header, config.context_lines),
        OutputMode::Ndiff => {
            let mut differ = Differ::new().with_cutoff(config.cutoff)?;
            if let Some(re) = &line_junk {
                differ = differ.with_line_junk(move |line: &str| re.is_match(line));
            }
            if config.char_junk {
                differ = differ.with_char_junk(is_character_junk);
            }
            let delta: Vec<String> = differ.compare(a, b).collect();
            delta
        }
        OutputMode::SideBySide => {
            let layout = SideBySideLayout {
                width: config.width,
                tab_size: config.tab_size,
                context: config.side_by_side_context.then_some(config.context_lines),
            };
            side_by_side(a, b, &opcodes, &layout)
        }
    };
    Ok(lines)
}

fn try_main() -> anyhow::Result<()> {
    let mut args = Args::parse();

    let file_config = match args.config_file.clone().or_else(default_config_path) {
        Some(path) => load_config_file(&path)?,
        None => None,
    };
    let config = resolve(std::mem::take(&mut args.config), file_config)?;
    tracing::debug!(?config, "resolved configuration");

    let input = read_file_pair(&args.fromfile, &args.tofile)
        .with_context(|| format!("can't read {} and {}", args.fromfile, args.tofile))?;
    let [a, b] = input.lines();

    let lines = render(&config, &args, &a, &b, &input.dates)?;
    write_lines(lines, &mut stdout().lock())?;

    Ok(())
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    // Returning the error from main() would print it with Debug, not Display.
    if let Err(e) = try_main() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
