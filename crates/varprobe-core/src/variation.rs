//! Variation axes and variation dictionaries
//!
//! A font reports two things about its design space: the axes it has (with
//! their bounds and defaults) and the explicit per-axis overrides currently
//! applied. An axis missing from the overrides sits at its default.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::tag::AxisTag;

/// One variation axis as reported by a font
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub tag: AxisTag,
    /// Display name, when the font provides one
    pub name: Option<String>,
    pub min: f64,
    pub default: f64,
    pub max: f64,
}

impl Axis {
    pub fn new(tag: AxisTag, min: f64, default: f64, max: f64) -> Self {
        Self {
            tag,
            name: None,
            min,
            default,
            max,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Clamp a requested coordinate into this axis' range
    pub fn clamp(&self, value: f64) -> f64 {
        if self.min <= self.max {
            value.clamp(self.min, self.max)
        } else {
            value
        }
    }
}

/// Explicit axis overrides applied to a font instance
///
/// Equality is structural: same key set, bit-equal values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariationMap(BTreeMap<AxisTag, f64>);

impl VariationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: AxisTag, value: f64) -> Option<f64> {
        self.0.insert(tag, value)
    }

    pub fn get(&self, tag: AxisTag) -> Option<f64> {
        self.0.get(&tag).copied()
    }

    pub fn contains(&self, tag: AxisTag) -> bool {
        self.0.contains_key(&tag)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AxisTag, f64)> + '_ {
        self.0.iter().map(|(tag, value)| (*tag, *value))
    }

    /// Tags whose presence or value differs between the two maps
    pub fn differing_axes(&self, other: &VariationMap) -> Vec<AxisTag> {
        let mut tags: Vec<AxisTag> = self
            .0
            .keys()
            .chain(other.0.keys())
            .copied()
            .filter(|tag| self.0.get(tag) != other.0.get(tag))
            .collect();
        tags.sort();
        tags.dedup();
        tags
    }
}

impl FromIterator<(AxisTag, f64)> for VariationMap {
    fn from_iter<I: IntoIterator<Item = (AxisTag, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for VariationMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (tag, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={:.4}", tag, value)?;
        }
        write!(f, "}}")
    }
}

impl Serialize for VariationMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter())
    }
}

/// Pair each axis with its effective value, in the font's axis order
///
/// The explicit variation value wins; otherwise the axis default applies.
pub fn resolve(axes: &[Axis], variation: &VariationMap) -> Vec<(AxisTag, f64)> {
    axes.iter()
        .map(|axis| (axis.tag, variation.get(axis.tag).unwrap_or(axis.default)))
        .collect()
}

/// Render resolved axes as `(opsz: 17.0000) (wght: 400.0000)`
pub fn format_resolved(resolved: &[(AxisTag, f64)]) -> String {
    resolved
        .iter()
        .map(|(tag, value)| format!("({}: {:.4})", tag, value))
        .collect::<Vec<_>>()
        .join(" ")
}
