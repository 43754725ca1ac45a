//! CoreText font host
//!
//! Puts CoreText's variable-font API behind [`varprobe_core::FontHost`]:
//! fonts come from the UI font registry or from raw file bytes, derived
//! fonts come from descriptor-level copies, and font equality is `CFEqual`.
//! Only the byte validation is portable; the host itself needs macOS.

pub mod validate;

#[cfg(target_os = "macos")]
mod host;

#[cfg(target_os = "macos")]
pub use host::{CoreTextHost, CtFont};
