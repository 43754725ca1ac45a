//! Sanity checks on font bytes before CoreText sees them
//!
//! CoreText can crash on corrupted data, so anything without a known sfnt or
//! collection signature is rejected up front.

use varprobe_core::{ProbeError, Result};

/// Check the container signature of `data`
pub fn validate_font_data(data: &[u8], origin: &str) -> Result<()> {
    let invalid = |reason: String| ProbeError::InvalidFont {
        origin: origin.to_string(),
        reason,
    };

    if data.len() < 12 {
        return Err(invalid("font data too small to be valid".to_string()));
    }

    let sig = &data[0..4];
    let is_valid = matches!(
        sig,
        // TrueType
        [0x00, 0x01, 0x00, 0x00]
        // OpenType with CFF
        | [b'O', b'T', b'T', b'O']
        // TrueType (Mac)
        | [b't', b'r', b'u', b'e']
        // TrueType Collection
        | [b't', b't', b'c', b'f']
    );

    if !is_valid {
        return Err(invalid(format!(
            "invalid font signature: {:02x}{:02x}{:02x}{:02x}",
            sig[0], sig[1], sig[2], sig[3]
        )));
    }

    Ok(())
}
