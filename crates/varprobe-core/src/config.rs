//! Resolved probe configuration, independent of any host

use std::path::PathBuf;

use crate::error::{ProbeError, Result};
use crate::host::FontSource;
use crate::sweep::SweepPlan;

/// Font file probed when none is given
pub const DEFAULT_FONT_FILE: &str = "/System/Library/Fonts/SFNS.ttf";

/// One base font at one point size
#[derive(Debug, Clone, PartialEq)]
pub struct CaseSpec {
    pub source: FontSource,
    pub size: f64,
}

impl CaseSpec {
    pub fn new(source: FontSource, size: f64) -> Self {
        Self { source, size }
    }
}

/// The fixed run: both sources at 24pt, then the UI font at the `opsz`
/// range boundaries (just above the minimum, just below and at the maximum)
pub fn default_cases(font_file: impl Into<PathBuf>) -> Vec<CaseSpec> {
    let ui = |size| CaseSpec::new(FontSource::SystemUi, size);
    vec![
        ui(24.0),
        CaseSpec::new(FontSource::File(font_file.into()), 24.0),
        ui(17.0),
        ui(17.01),
        ui(95.99),
        ui(96.0),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeConfig {
    /// Test cases, probed in order
    pub cases: Vec<CaseSpec>,
    pub plan: SweepPlan,
    /// Run the consistency checks before each sweep
    pub checks: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            cases: default_cases(DEFAULT_FONT_FILE),
            plan: SweepPlan::default(),
            checks: true,
        }
    }
}

impl ProbeConfig {
    /// Every size of the first source, then every size of the next
    pub fn cross(sources: &[FontSource], sizes: &[f64]) -> Self {
        let cases = sources
            .iter()
            .flat_map(|source| {
                sizes
                    .iter()
                    .map(move |&size| CaseSpec::new(source.clone(), size))
            })
            .collect();
        Self {
            cases,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cases.is_empty() {
            return Err(ProbeError::Config("no test cases selected".into()));
        }
        if let Some(case) = self
            .cases
            .iter()
            .find(|case| !case.size.is_finite() || case.size <= 0.0)
        {
            return Err(ProbeError::Config(format!(
                "point size must be positive, got {}",
                case.size
            )));
        }
        if self.plan.is_empty() {
            return Err(ProbeError::Config("sweep plan has no trials".into()));
        }
        Ok(())
    }

    /// Test cases in run order
    pub fn cases(&self) -> impl Iterator<Item = (&FontSource, f64)> + '_ {
        self.cases.iter().map(|case| (&case.source, case.size))
    }
}
