//! Reporting probe results
//!
//! Two reporters share one event stream: line-oriented text meant to be read
//! by eye, and JSON lines for diffing runs across OS releases.

use std::io::Write;

use serde::Serialize;

use crate::checks::{CheckOutcome, CheckStatus};
use crate::error::{ProbeError, Result};
use crate::sweep::{RequestedAxis, TrialOutcome};
use crate::tag::AxisTag;
use crate::variation::format_resolved;

/// Render a request in axis order; an omitted axis reads `#opsz: 17.0000#`
pub fn format_request(request: &[RequestedAxis]) -> String {
    request
        .iter()
        .map(|axis| {
            if axis.omitted {
                format!("#{}: {:.4}#", axis.tag, axis.value)
            } else {
                format!("({}: {:.4})", axis.tag, axis.value)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Totals for one test case
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CaseSummary {
    pub label: String,
    pub trials: usize,
    pub suspect: usize,
    pub failed_checks: usize,
}

/// Totals for a whole run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProbeSummary {
    pub cases: usize,
    pub failed_cases: usize,
    pub trials: usize,
    pub suspect: usize,
    pub failed_checks: usize,
}

impl ProbeSummary {
    pub fn add_case(&mut self, case: &CaseSummary) {
        self.cases += 1;
        self.trials += case.trials;
        self.suspect += case.suspect;
        self.failed_checks += case.failed_checks;
    }
}

/// Receives probe events as they happen
pub trait Reporter {
    fn begin_case(&mut self, label: &str, host: &str, resolved: &[(AxisTag, f64)]) -> Result<()>;

    /// The case could not be built or aborted part way
    fn case_failed(&mut self, label: &str, error: &ProbeError) -> Result<()>;

    fn check(&mut self, label: &str, outcome: &CheckOutcome) -> Result<()>;

    fn trial(&mut self, label: &str, outcome: &TrialOutcome) -> Result<()>;

    fn end_case(&mut self, summary: &CaseSummary) -> Result<()>;

    fn finish(&mut self, summary: &ProbeSummary) -> Result<()>;
}

/// Human-readable diagnostic output
pub struct TextReporter<W: Write> {
    out: W,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn begin_case(&mut self, label: &str, host: &str, resolved: &[(AxisTag, f64)]) -> Result<()> {
        writeln!(self.out, "== {} ({})", label, host)?;
        writeln!(self.out, "axes: {}", format_resolved(resolved))?;
        Ok(())
    }

    fn case_failed(&mut self, label: &str, error: &ProbeError) -> Result<()> {
        writeln!(self.out, "== {}: {}", label, error)?;
        Ok(())
    }

    fn check(&mut self, _label: &str, outcome: &CheckOutcome) -> Result<()> {
        match &outcome.status {
            CheckStatus::Passed => writeln!(self.out, "check {}: ok", outcome.name)?,
            CheckStatus::Failed(detail) => {
                writeln!(self.out, "check {}: FAILED ({})", outcome.name, detail)?
            },
            CheckStatus::Skipped(reason) => {
                writeln!(self.out, "check {}: skipped ({})", outcome.name, reason)?
            },
        }
        Ok(())
    }

    fn trial(&mut self, _label: &str, outcome: &TrialOutcome) -> Result<()> {
        writeln!(self.out, "Request : {}", format_request(&outcome.request))?;
        writeln!(self.out, "Result  : {}", format_resolved(&outcome.result_axes))?;
        writeln!(self.out, "Original: {}", format_resolved(&outcome.original_axes))?;
        write!(
            self.out,
            "{}: variationEqual={} fontEqual={}",
            outcome.trial.describe(),
            outcome.variation_equal,
            outcome.font_equal
        )?;
        if outcome.is_suspect() {
            write!(self.out, "  <-- BUG")?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn end_case(&mut self, summary: &CaseSummary) -> Result<()> {
        writeln!(
            self.out,
            "-- {}: {} trials, {} suspect",
            summary.label, summary.trials, summary.suspect
        )?;
        writeln!(self.out)?;
        Ok(())
    }

    fn finish(&mut self, summary: &ProbeSummary) -> Result<()> {
        writeln!(
            self.out,
            "{} cases ({} failed), {} trials, {} suspect, {} failed checks",
            summary.cases,
            summary.failed_cases,
            summary.trials,
            summary.suspect,
            summary.failed_checks
        )?;
        self.out.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
struct AxisValue {
    tag: AxisTag,
    value: f64,
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Event<'a> {
    Case {
        label: &'a str,
        host: &'a str,
        axes: Vec<AxisValue>,
    },
    CaseFailed {
        label: &'a str,
        error: String,
    },
    Check {
        label: &'a str,
        #[serde(flatten)]
        outcome: &'a CheckOutcome,
    },
    Trial {
        label: &'a str,
        #[serde(flatten)]
        outcome: &'a TrialOutcome,
        suspect: bool,
    },
    CaseSummary(&'a CaseSummary),
    Summary(&'a ProbeSummary),
}

/// One JSON object per line
pub struct JsonlReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonlReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, event: &Event<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.out, event)?;
        writeln!(self.out)?;
        Ok(())
    }
}

impl<W: Write> Reporter for JsonlReporter<W> {
    fn begin_case(&mut self, label: &str, host: &str, resolved: &[(AxisTag, f64)]) -> Result<()> {
        let axes = resolved
            .iter()
            .map(|&(tag, value)| AxisValue { tag, value })
            .collect();
        self.emit(&Event::Case { label, host, axes })
    }

    fn case_failed(&mut self, label: &str, error: &ProbeError) -> Result<()> {
        self.emit(&Event::CaseFailed {
            label,
            error: error.to_string(),
        })
    }

    fn check(&mut self, label: &str, outcome: &CheckOutcome) -> Result<()> {
        self.emit(&Event::Check { label, outcome })
    }

    fn trial(&mut self, label: &str, outcome: &TrialOutcome) -> Result<()> {
        self.emit(&Event::Trial {
            label,
            outcome,
            suspect: outcome.is_suspect(),
        })
    }

    fn end_case(&mut self, summary: &CaseSummary) -> Result<()> {
        self.emit(&Event::CaseSummary(summary))
    }

    fn finish(&mut self, summary: &ProbeSummary) -> Result<()> {
        self.emit(&Event::Summary(summary))?;
        self.out.flush()?;
        Ok(())
    }
}
