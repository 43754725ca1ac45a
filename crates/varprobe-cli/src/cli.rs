//! CLI argument definitions using Clap v4

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use varprobe_core::config::{default_cases, DEFAULT_FONT_FILE};
use varprobe_core::{FontSource, ProbeConfig};

/// varprobe - does a variable font with a changed variation still compare equal?
#[derive(Parser, Debug)]
#[command(name = "varprobe")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Font file handed to the platform as raw bytes
    #[arg(short = 'f', long = "font-file", default_value = DEFAULT_FONT_FILE)]
    pub font_file: PathBuf,

    /// Point size to probe (repeatable); replaces the fixed size set
    #[arg(short = 's', long = "size", action = ArgAction::Append, allow_negative_numbers = true)]
    pub sizes: Vec<f64>,

    /// Which base fonts to probe
    #[arg(long = "source", default_value = "all")]
    pub source: SourceArg,

    /// Font framework to probe
    #[arg(long = "host", default_value = "auto")]
    pub host: HostArg,

    /// Optical sizing for fresh fonts on the reference host
    #[arg(long = "font-optical-sizing", default_value = "auto")]
    pub font_optical_sizing: OpticalSizingArg,

    /// Output format
    #[arg(short = 'O', long = "format", default_value = "text")]
    pub format: FormatArg,

    /// Skip the per-font consistency checks
    #[arg(long = "no-checks", action = ArgAction::SetTrue)]
    pub no_checks: bool,

    /// Exit with status 2 when a suspect trial was found
    #[arg(long = "strict")]
    pub strict: bool,

    /// Silent mode (errors only)
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum SourceArg {
    /// The system UI font
    Ui,
    /// The font file
    File,
    /// Both, UI font first
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum HostArg {
    /// CoreText on macOS, reference elsewhere
    Auto,
    /// CoreText (macOS only)
    Coretext,
    /// Consistent model built on the font's fvar table
    Reference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OpticalSizingArg {
    Auto,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum FormatArg {
    /// Line-oriented diagnostic text
    Text,
    /// One JSON object per line
    Jsonl,
}

impl Cli {
    pub fn probe_config(&self) -> ProbeConfig {
        let wanted = |source: &FontSource| match self.source {
            SourceArg::Ui => *source == FontSource::SystemUi,
            SourceArg::File => matches!(source, FontSource::File(_)),
            SourceArg::All => true,
        };

        let config = if self.sizes.is_empty() {
            let cases = default_cases(self.font_file.clone())
                .into_iter()
                .filter(|case| wanted(&case.source))
                .collect();
            ProbeConfig {
                cases,
                ..Default::default()
            }
        } else {
            let sources: Vec<FontSource> =
                [FontSource::SystemUi, FontSource::File(self.font_file.clone())]
                    .into_iter()
                    .filter(|source| wanted(source))
                    .collect();
            ProbeConfig::cross(&sources, &self.sizes)
        };

        ProbeConfig {
            checks: !self.no_checks,
            ..config
        }
    }

    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}
