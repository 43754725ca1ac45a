//! The perturbation sweep
//!
//! Each trial asks the host for a font derived from the original with a
//! slightly different variation, then compares the result against the
//! original twice: once by variation dictionary, once by font equality.
//! A font whose variation changed must not compare equal to the original.
//!
//! Trials are enumerated as `omit_opsz` × `bump` × `wght`, outermost first.

use serde::Serialize;

use crate::error::Result;
use crate::host::FontHost;
use crate::tag::AxisTag;
use crate::variation::VariationMap;

/// Nudge applied to the bumped axis
pub const BUMP_AMOUNT: f64 = 0.0001;

/// Weights forced onto `wght`, one per trial
pub const WEIGHTS: [f64; 9] = [100.0, 200.0, 300.0, 400.0, 500.0, 600.0, 700.0, 800.0, 900.0];

/// One point in the sweep
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trial {
    /// Leave `opsz` out of the requested variation entirely
    pub omit_opsz: bool,
    /// Axis nudged by the plan's bump amount, if any
    pub bump: Option<AxisTag>,
    /// Value forced onto `wght`
    pub wght: f64,
}

impl Trial {
    pub fn describe(&self) -> String {
        let bump = self
            .bump
            .map(|tag| tag.to_string())
            .unwrap_or_else(|| "none".to_string());
        format!(
            "omit_opsz={} bump={} wght={}",
            self.omit_opsz, bump, self.wght
        )
    }
}

/// The parameter grid a test case is swept over
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPlan {
    pub omit_opsz: Vec<bool>,
    pub bumps: Vec<Option<AxisTag>>,
    pub weights: Vec<f64>,
    pub bump_amount: f64,
}

impl Default for SweepPlan {
    fn default() -> Self {
        Self {
            omit_opsz: vec![false, true],
            bumps: vec![None, Some(AxisTag::OPSZ), Some(AxisTag::WDTH)],
            weights: WEIGHTS.to_vec(),
            bump_amount: BUMP_AMOUNT,
        }
    }
}

impl SweepPlan {
    pub fn trials(&self) -> impl Iterator<Item = Trial> + '_ {
        self.omit_opsz.iter().flat_map(move |&omit_opsz| {
            self.bumps.iter().flat_map(move |&bump| {
                self.weights.iter().map(move |&wght| Trial {
                    omit_opsz,
                    bump,
                    wght,
                })
            })
        })
    }

    pub fn len(&self) -> usize {
        self.omit_opsz.len() * self.bumps.len() * self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One axis of a trial's request, in the font's axis order
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RequestedAxis {
    pub tag: AxisTag,
    pub value: f64,
    /// Left out of the dictionary sent to the host; `value` is the resolved one
    pub omitted: bool,
}

/// Lay out a trial's request over every axis of the original font
///
/// The bump is relative to the resolved value; `wght` is forced regardless.
/// An omitted `opsz` keeps its resolved value and is flagged instead.
pub fn request_axes(
    resolved: &[(AxisTag, f64)],
    trial: &Trial,
    bump_amount: f64,
) -> Vec<RequestedAxis> {
    resolved
        .iter()
        .map(|&(tag, value)| {
            if trial.omit_opsz && tag == AxisTag::OPSZ {
                return RequestedAxis {
                    tag,
                    value,
                    omitted: true,
                };
            }
            let mut value = value;
            if trial.bump == Some(tag) {
                value += bump_amount;
            }
            if tag == AxisTag::WGHT {
                value = trial.wght;
            }
            RequestedAxis {
                tag,
                value,
                omitted: false,
            }
        })
        .collect()
}

/// Build the variation dictionary a trial sends to the host
///
/// Covers every axis of the original font except `opsz` when omitted.
pub fn requested_variation(
    resolved: &[(AxisTag, f64)],
    trial: &Trial,
    bump_amount: f64,
) -> VariationMap {
    request_axes(resolved, trial, bump_amount)
        .into_iter()
        .filter(|axis| !axis.omitted)
        .map(|axis| (axis.tag, axis.value))
        .collect()
}

/// What the host reported for one trial
#[derive(Debug, Clone, Serialize)]
pub struct TrialOutcome {
    #[serde(flatten)]
    pub trial: Trial,
    /// Request in axis order, omitted axes included
    pub request: Vec<RequestedAxis>,
    pub requested: VariationMap,
    /// Variation read back from the derived font
    pub result: VariationMap,
    /// Effective axis values of the derived font
    pub result_axes: Vec<(AxisTag, f64)>,
    /// Effective axis values of the original font, re-read after the trial
    pub original_axes: Vec<(AxisTag, f64)>,
    /// Derived variation equals the original font's variation
    pub variation_equal: bool,
    /// Host reports the derived font equal to the original
    pub font_equal: bool,
}

impl TrialOutcome {
    /// Variation changed but the fonts still compare equal
    pub fn is_suspect(&self) -> bool {
        !self.variation_equal && self.font_equal
    }

    /// Resolved `opsz` left out of the request, if it was
    pub fn omitted_opsz(&self) -> Option<f64> {
        self.request
            .iter()
            .find(|axis| axis.omitted && axis.tag == AxisTag::OPSZ)
            .map(|axis| axis.value)
    }
}

/// State captured once per test case and shared by all its trials
pub struct Baseline<'f, F> {
    pub font: &'f F,
    pub variation: VariationMap,
    pub resolved: Vec<(AxisTag, f64)>,
}

impl<'f, F> Baseline<'f, F> {
    pub fn capture<H: FontHost<Font = F>>(host: &H, font: &'f F) -> Self {
        Self {
            font,
            variation: host.variation(font),
            resolved: host.resolved_axes(font),
        }
    }
}

/// Run a single trial against the baseline
pub fn run_trial<H: FontHost>(
    host: &H,
    baseline: &Baseline<'_, H::Font>,
    trial: &Trial,
    bump_amount: f64,
) -> Result<TrialOutcome> {
    let request = request_axes(&baseline.resolved, trial, bump_amount);
    let requested: VariationMap = request
        .iter()
        .filter(|axis| !axis.omitted)
        .map(|axis| (axis.tag, axis.value))
        .collect();
    let derived = host.with_variation(baseline.font, &requested)?;
    let result = host.variation(&derived);
    let result_axes = host.resolved_axes(&derived);
    let original_axes = host.resolved_axes(baseline.font);
    let variation_equal = result == baseline.variation;
    let font_equal = host.fonts_equal(&derived, baseline.font);

    log::debug!(
        "{}: requested {} -> result {}",
        trial.describe(),
        requested,
        result
    );

    Ok(TrialOutcome {
        trial: *trial,
        request,
        requested,
        result,
        result_axes,
        original_axes,
        variation_equal,
        font_equal,
    })
}
