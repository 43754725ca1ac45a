//! Driving test cases through checks and the sweep

use crate::checks::run_checks;
use crate::config::ProbeConfig;
use crate::error::{ProbeError, Result};
use crate::host::{FontHost, TestCase};
use crate::report::{CaseSummary, ProbeSummary, Reporter};
use crate::sweep::{run_trial, Baseline};

/// Runs a [`ProbeConfig`] against one host
pub struct Probe<'a, H: FontHost> {
    host: &'a H,
    config: &'a ProbeConfig,
}

impl<'a, H: FontHost> Probe<'a, H> {
    pub fn new(host: &'a H, config: &'a ProbeConfig) -> Self {
        Self { host, config }
    }

    /// Probe every configured case
    ///
    /// A case that cannot be built is reported and skipped; the rest still
    /// run. Only reporter failures abort the run.
    pub fn run(&self, reporter: &mut dyn Reporter) -> Result<ProbeSummary> {
        self.config.validate()?;
        let mut summary = ProbeSummary::default();

        for (source, size) in self.config.cases() {
            let label = TestCase::<H::Font>::label_for(source, size);
            let font = match self.host.open(source, size) {
                Ok(font) => font,
                Err(e) => {
                    log::warn!("Skipping {}: {}", label, e);
                    reporter.case_failed(&label, &e)?;
                    summary.failed_cases += 1;
                    continue;
                },
            };

            let case = TestCase::new(font, label);
            match self.run_case(&case, reporter) {
                Ok(case_summary) => summary.add_case(&case_summary),
                Err(e @ (ProbeError::Io(_) | ProbeError::Json(_))) => return Err(e),
                Err(e) => {
                    log::error!("{} aborted: {}", case.label, e);
                    reporter.case_failed(&case.label, &e)?;
                    summary.failed_cases += 1;
                },
            }
        }

        reporter.finish(&summary)?;
        Ok(summary)
    }

    /// Checks, then the full sweep, for a single case
    pub fn run_case(
        &self,
        case: &TestCase<H::Font>,
        reporter: &mut dyn Reporter,
    ) -> Result<CaseSummary> {
        let baseline = Baseline::capture(self.host, &case.font);
        log::debug!(
            "{}: {} axes, variation {}",
            case.label,
            baseline.resolved.len(),
            baseline.variation
        );
        reporter.begin_case(&case.label, self.host.name(), &baseline.resolved)?;

        let mut summary = CaseSummary {
            label: case.label.clone(),
            ..Default::default()
        };

        if self.config.checks {
            for outcome in run_checks(self.host, &case.font)? {
                if outcome.failed() {
                    log::warn!("{}: check {} failed", case.label, outcome.name);
                    summary.failed_checks += 1;
                }
                reporter.check(&case.label, &outcome)?;
            }
        }

        let plan = &self.config.plan;
        for trial in plan.trials() {
            let outcome = run_trial(self.host, &baseline, &trial, plan.bump_amount)?;
            if outcome.is_suspect() {
                log::warn!(
                    "{}: {} changed variation {:?} but font compares equal",
                    case.label,
                    trial.describe(),
                    outcome.result.differing_axes(&baseline.variation)
                );
                summary.suspect += 1;
            }
            summary.trials += 1;
            reporter.trial(&case.label, &outcome)?;
        }

        reporter.end_case(&summary)?;
        Ok(summary)
    }
}
