//! varprobe core: is a changed variable font still "equal"?
//!
//! Platform font frameworks cache font instances aggressively. This crate
//! holds the host-independent half of a harness that asks one question of
//! such a framework: when a derived font reports a different variation than
//! the font it came from, does the framework still consider the two equal?
//!
//! ## How a run works
//!
//! 1. A [`FontHost`] opens each base font (the system UI font, a font file)
//! 2. Its axes are resolved to effective values ([`variation::resolve`])
//! 3. Consistency [`checks`] run once per font
//! 4. The [`sweep`] derives 54 fonts per case (`omit_opsz` × bump × `wght`)
//! 5. Each derived font is compared by variation and by font equality
//! 6. A [`Reporter`] prints the outcome; suspect trials are flagged
//!
//! ```rust,no_run
//! use varprobe_core::{FontHost, Probe, ProbeConfig, TextReporter};
//!
//! fn probe<H: FontHost>(host: &H) -> varprobe_core::Result<()> {
//!     let config = ProbeConfig::default();
//!     let mut reporter = TextReporter::new(std::io::stdout());
//!     let summary = Probe::new(host, &config).run(&mut reporter)?;
//!     println!("{} suspect trials", summary.suspect);
//!     Ok(())
//! }
//! ```

pub mod checks;
pub mod config;
pub mod error;
pub mod host;
pub mod probe;
pub mod report;
pub mod sweep;
pub mod tag;
pub mod variation;

pub use config::{CaseSpec, ProbeConfig};
pub use error::{ProbeError, Result};
pub use host::{FontHost, FontSource, TestCase};
pub use probe::Probe;
pub use report::{CaseSummary, JsonlReporter, ProbeSummary, Reporter, TextReporter};
pub use sweep::{SweepPlan, Trial, TrialOutcome};
pub use tag::AxisTag;
pub use variation::{Axis, VariationMap};
