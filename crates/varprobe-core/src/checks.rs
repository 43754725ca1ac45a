//! Per-font consistency checks run before the sweep

use serde::Serialize;

use crate::error::Result;
use crate::host::FontHost;
use crate::tag::AxisTag;
use crate::variation::VariationMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum CheckStatus {
    Passed,
    Failed(String),
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckOutcome {
    pub name: &'static str,
    #[serde(flatten)]
    pub status: CheckStatus,
}

impl CheckOutcome {
    fn new(name: &'static str, status: CheckStatus) -> Self {
        Self { name, status }
    }

    pub fn failed(&self) -> bool {
        matches!(self.status, CheckStatus::Failed(_))
    }
}

/// Run every check against `font`
pub fn run_checks<H: FontHost>(host: &H, font: &H::Font) -> Result<Vec<CheckOutcome>> {
    Ok(vec![
        non_empty_axes(host, font),
        round_trip(host, font)?,
        explicit_default_weight(host, font)?,
    ])
}

/// The font must expose at least one variation axis
pub fn non_empty_axes<H: FontHost>(host: &H, font: &H::Font) -> CheckOutcome {
    let status = if host.axes(font).is_empty() {
        CheckStatus::Failed("font reports no variation axes".to_string())
    } else {
        CheckStatus::Passed
    };
    CheckOutcome::new("non-empty-axes", status)
}

/// An unperturbed variation must read back exactly as requested
pub fn round_trip<H: FontHost>(host: &H, font: &H::Font) -> Result<CheckOutcome> {
    let requested: VariationMap = host.resolved_axes(font).into_iter().collect();
    if requested.is_empty() {
        return Ok(CheckOutcome::new(
            "round-trip",
            CheckStatus::Skipped("no axes".to_string()),
        ));
    }

    let derived = host.with_variation(font, &requested)?;
    let read_back = host.variation(&derived);
    let status = if read_back == requested {
        CheckStatus::Passed
    } else {
        CheckStatus::Failed(format!("requested {} read back {}", requested, read_back))
    };
    Ok(CheckOutcome::new("round-trip", status))
}

/// A weight equal to the axis default must still be reported explicitly
pub fn explicit_default_weight<H: FontHost>(host: &H, font: &H::Font) -> Result<CheckOutcome> {
    let name = "explicit-default-weight";
    let Some(axis) = host
        .axes(font)
        .into_iter()
        .find(|axis| axis.tag == AxisTag::WGHT)
    else {
        return Ok(CheckOutcome::new(
            name,
            CheckStatus::Skipped("no wght axis".to_string()),
        ));
    };

    let mut requested = VariationMap::new();
    requested.insert(AxisTag::WGHT, axis.default);
    let derived = host.with_variation(font, &requested)?;
    let read_back = host.variation(&derived);

    let status = match read_back.get(AxisTag::WGHT) {
        Some(value) if value == axis.default => CheckStatus::Passed,
        Some(value) => CheckStatus::Failed(format!(
            "wght={} requested, {} read back",
            axis.default, value
        )),
        None => CheckStatus::Failed(format!(
            "wght={} (default) dropped from {}",
            axis.default, read_back
        )),
    };
    Ok(CheckOutcome::new(name, status))
}
