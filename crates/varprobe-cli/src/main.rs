//! varprobe CLI - probe a font framework's variable-font equality

mod cli;

use std::io;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;

use varprobe_core::{FontHost, JsonlReporter, Probe, ProbeSummary, Reporter, TextReporter};
use varprobe_ref::{OpticalSizing, ReferenceHost};

use cli::{Cli, FormatArg, HostArg, OpticalSizingArg};

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();

    match run(&cli) {
        Ok(summary) if cli.strict && summary.suspect > 0 => ExitCode::from(2),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        },
    }
}

fn run(cli: &Cli) -> Result<ProbeSummary> {
    match resolve_host(cli.host)? {
        HostArg::Coretext => run_coretext(cli),
        _ => {
            let optical_sizing = match cli.font_optical_sizing {
                OpticalSizingArg::Auto => OpticalSizing::Auto,
                OpticalSizingArg::None => OpticalSizing::None,
            };
            probe(&ReferenceHost::new(optical_sizing), cli)
        },
    }
}

/// Pick the concrete host for `auto` and reject hosts this build lacks
fn resolve_host(host: HostArg) -> Result<HostArg> {
    match host {
        HostArg::Auto if cfg!(target_os = "macos") => Ok(HostArg::Coretext),
        HostArg::Auto => Ok(HostArg::Reference),
        HostArg::Coretext if !cfg!(target_os = "macos") => {
            bail!("the coretext host is only available on macOS")
        },
        other => Ok(other),
    }
}

#[cfg(target_os = "macos")]
fn run_coretext(cli: &Cli) -> Result<ProbeSummary> {
    probe(&varprobe_ct::CoreTextHost::new(), cli)
}

#[cfg(not(target_os = "macos"))]
fn run_coretext(_cli: &Cli) -> Result<ProbeSummary> {
    bail!("the coretext host is only available on macOS")
}

fn probe<H: FontHost>(host: &H, cli: &Cli) -> Result<ProbeSummary> {
    let config = cli.probe_config();
    log::info!(
        "Probing {} case(s) with the {} host, {} trials each",
        config.cases.len(),
        host.name(),
        config.plan.len()
    );

    let stdout = io::stdout().lock();
    let mut reporter: Box<dyn Reporter> = match cli.format {
        FormatArg::Text => Box::new(TextReporter::new(stdout)),
        FormatArg::Jsonl => Box::new(JsonlReporter::new(stdout)),
    };

    let summary = Probe::new(host, &config)
        .run(reporter.as_mut())
        .context("probe failed")?;

    if summary.suspect > 0 {
        log::warn!(
            "{} trial(s) changed variation but kept font equality",
            summary.suspect
        );
    }
    Ok(summary)
}
