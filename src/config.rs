use crate::error::{Error, Result};
use clap::{Args, ValueEnum};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// Before/after blocks for each cluster of changes.
    Context,

    /// Removed and added lines interleaved in each cluster of changes.
    Unified,

    /// Every line, with markers under the characters that changed.
    Ndiff,

    /// Two columns.
    SideBySide,
}

macro_rules! config_structs {
    {
        $(
            $( #[config_opt($attr:meta)] )*
            pub $name:ident: $typ:ty,
        )*
        $(
            #[config_alias($atarget:ident = $avalue:expr)]
            $( #[config_opt($aattr:meta)] )*
            pub $aname:ident: bool,
        )*
    } => {
        #[derive(Clone, Debug, PartialEq)]
        pub struct Config {
            $( pub $name: $typ, )*
        }

        #[derive(Args, Deserialize, Debug, Default)]
        pub struct ConfigOpt {
            $( $( #[$aattr] )* #[serde(skip)] pub $aname: bool, )*
            $( $( #[$attr] )* pub $name: Option<$typ>, )*
        }

        impl Config {
            pub fn update(self, mut opt: ConfigOpt) -> Config {
                $(
                    if opt.$aname {
                        opt.$atarget = Some($avalue);
                    }
                )*
                Config {
                    $( $name: opt.$name.unwrap_or(self.$name), )*
                }
            }
        }
    }
}

config_structs! {
    #[config_opt(arg(long, value_enum))]
    pub mode: OutputMode,

    #[config_opt(doc = "Number of unchanged lines shown around each change.")]
    #[config_opt(arg(short = 'l', long = "lines", value_name = "NUM"))]
    pub context_lines: usize,

    #[config_opt(doc = "Width of each column in side-by-side mode.")]
    #[config_opt(arg(long, value_name = "COLUMNS"))]
    pub width: usize,

    #[config_opt(arg(long, value_name = "COLUMNS"))]
    pub tab_size: usize,

    #[config_opt(doc = "How similar two lines must be to get intraline markers in ndiff mode.")]
    #[config_opt(arg(long, value_name = "RATIO"))]
    pub cutoff: f64,

    #[config_opt(doc = "Lines matching this regex can't anchor a match (empty: none).")]
    #[config_opt(arg(long, value_name = "REGEX"))]
    pub line_junk: String,

    #[config_opt(arg(long, require_equals = true, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL", group = "char_junk_group"))]
    pub char_junk: bool,

    #[config_opt(arg(long, require_equals = true, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL", group = "autojunk_group"))]
    pub autojunk: bool,

    #[config_opt(arg(long, require_equals = true, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL"))]
    pub side_by_side_context: bool,

    #[config_alias(mode = OutputMode::Context)]
    #[config_opt(arg(short = 'c', long = "context", help = "Produce a context format diff (default)"))]
    pub context: bool,

    #[config_alias(mode = OutputMode::SideBySide)]
    #[config_opt(arg(short = 'm', long = "side-by-side", help = "Produce a side by side diff (use -c to show only changes)"))]
    pub side_by_side: bool,

    #[config_alias(mode = OutputMode::Ndiff)]
    #[config_opt(arg(short = 'n', long = "ndiff", help = "Produce an ndiff format diff"))]
    pub ndiff: bool,

    #[config_alias(mode = OutputMode::Unified)]
    #[config_opt(arg(short = 'u', long = "unified", help = "Produce a unified format diff"))]
    pub unified: bool,

    #[config_alias(char_junk = false)]
    #[config_opt(arg(long, group = "char_junk_group"))]
    pub no_char_junk: bool,

    #[config_alias(autojunk = false)]
    #[config_opt(arg(long, group = "autojunk_group"))]
    pub no_autojunk: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            mode: OutputMode::Context,
            context_lines: 3,
            width: 60,
            tab_size: 8,
            cutoff: crate::algorithm::DEFAULT_FANCY_CUTOFF,
            line_junk: String::new(),
            char_junk: true,
            autojunk: true,
            side_by_side_context: false,
        }
    }
}

impl ConfigOpt {
    /// `-m -c` asks for side-by-side output restricted to the changes.
    fn apply_side_by_side_context(&mut self) {
        if self.side_by_side && self.context && !self.ndiff && !self.unified {
            self.side_by_side_context = Some(true);
        }
    }
}

impl Config {
    pub fn check(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.cutoff) {
            return Err(Error::Config(format!("cutoff must be in [0.0, 1.0]: {}", self.cutoff)));
        }
        if self.width == 0 {
            return Err(Error::Config("width must be positive".to_owned()));
        }
        Ok(())
    }

    pub fn line_junk_regex(&self) -> Result<Option<Regex>> {
        if self.line_junk.is_empty() {
            return Ok(None);
        }
        Ok(Some(Regex::new(&self.line_junk)?))
    }
}

/// `$RODIFF_CONFIG`, or `rodiff/config.toml` in the user's configuration directory.
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("RODIFF_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("rodiff").join("config.toml"))
}

/// Parses a TOML config file. A file that doesn't exist is not an error.
pub fn load_config_file(path: &Path) -> Result<Option<ConfigOpt>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file");
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };
    let opt: ConfigOpt = toml::from_str(&text).map_err(|err| Error::Config(format!("{}: {err}", path.display())))?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(Some(opt))
}

/// Defaults, overridden by the config file, overridden by the command line.
pub fn resolve(mut cli: ConfigOpt, file: Option<ConfigOpt>) -> Result<Config> {
    cli.apply_side_by_side_context();
    let mut config = Config::default();
    if let Some(file) = file {
        config = config.update(file);
    }
    let config = config.update(cli);
    config.check()?;
    Ok(config)
}
