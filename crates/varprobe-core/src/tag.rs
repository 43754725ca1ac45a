//! Four-byte OpenType axis tags
//!
//! CoreText keys variation dictionaries by the tag packed into a big-endian
//! integer, so the tag carries both forms.

use std::fmt;

use serde::{Serialize, Serializer};

/// A variation axis tag such as `wght` or `opsz`
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AxisTag([u8; 4]);

impl AxisTag {
    /// Optical size
    pub const OPSZ: AxisTag = AxisTag(*b"opsz");
    /// Width
    pub const WDTH: AxisTag = AxisTag(*b"wdth");
    /// Weight
    pub const WGHT: AxisTag = AxisTag(*b"wght");

    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Numeric axis identifier, e.g. `wght` -> 0x77676874
    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    pub const fn from_u32(id: u32) -> Self {
        Self(id.to_be_bytes())
    }

    /// Identifier read back from a platform number; `None` outside `u32`
    pub fn from_id(id: i64) -> Option<Self> {
        u32::try_from(id).ok().map(Self::from_u32)
    }
}

impl fmt::Display for AxisTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            let ch = if (0x20..=0x7e).contains(&b) {
                b as char
            } else {
                '?'
            };
            write!(f, "{}", ch)?;
        }
        Ok(())
    }
}

impl fmt::Debug for AxisTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AxisTag({:?})", self.to_string())
    }
}

impl Serialize for AxisTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
