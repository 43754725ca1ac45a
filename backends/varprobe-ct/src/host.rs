// this_file: backends/varprobe-ct/src/host.rs

use std::ffi::c_void;
use std::fs::File;
use std::path::Path;
use std::ptr;

use memmap2::Mmap;
use objc2_core_foundation::{
    CFAllocator, CFAllocatorContext, CFArray, CFData, CFDictionary, CFIndex, CFNumber,
    CFRetained, CFString, CFType, CGFloat,
};
use objc2_core_text::{
    kCTFontVariationAttribute, kCTFontVariationAxisDefaultValueKey,
    kCTFontVariationAxisIdentifierKey, kCTFontVariationAxisMaximumValueKey,
    kCTFontVariationAxisMinimumValueKey, kCTFontVariationAxisNameKey,
    CTFontManagerCreateFontDescriptorFromData, CTFontUIFontType, CTFont, CTFontDescriptor,
};

use varprobe_core::{Axis, AxisTag, FontHost, ProbeError, Result, VariationMap};

use crate::validate::validate_font_data;

/// Unmaps the font file once CoreText is done with the bytes
///
/// `info` is the boxed mapping handed to the allocator context.
unsafe extern "C-unwind" fn unmap_callback(_ptr: *mut c_void, info: *mut c_void) {
    if !info.is_null() {
        // Reconstruct the Box to drop (and unmap) it
        let _ = unsafe { Box::from_raw(info as *mut Mmap) };
        log::debug!("CoreTextHost: font file unmapped");
    }
}

/// Wrap a mapping in CFData without copying
///
/// Ownership of the mapping moves to CoreText: a one-off allocator whose only
/// job is to run [`unmap_callback`] is installed as the bytes deallocator.
fn data_from_mmap(mmap: Mmap) -> Result<CFRetained<CFData>> {
    let bytes = mmap.as_ptr();
    let len = mmap.len() as CFIndex;
    let info = Box::into_raw(Box::new(mmap)) as *mut c_void;

    let mut context = CFAllocatorContext {
        version: 0,
        info,
        retain: None,
        release: None,
        copyDescription: None,
        allocate: None,
        reallocate: None,
        deallocate: Some(unmap_callback),
        preferredSize: None,
    };

    let deallocator = unsafe { CFAllocator::new(None, &mut context) };
    let data = deallocator
        .as_deref()
        .and_then(|deallocator| unsafe {
            CFData::with_bytes_no_copy(None, bytes, len, Some(deallocator))
        });

    data.ok_or_else(|| {
        // CoreText never took the mapping; release it here
        let _ = unsafe { Box::from_raw(info as *mut Mmap) };
        ProbeError::Platform("CFDataCreateWithBytesNoCopy failed".to_string())
    })
}

/// A CoreText font instance
pub struct CtFont {
    font: CFRetained<CTFont>,
}

fn as_cf_type<T>(value: &T) -> &CFType {
    unsafe { &*(value as *const T as *const CFType) }
}

fn number_value(dict: &CFDictionary<CFString, CFType>, key: &CFString) -> Option<f64> {
    let value = dict.get(key)?;
    value.downcast_ref::<CFNumber>()?.as_f64()
}

/// Font host backed by CoreText
#[derive(Debug, Default)]
pub struct CoreTextHost;

impl CoreTextHost {
    pub fn new() -> Self {
        Self
    }

    fn font_from_descriptor(descriptor: &CTFontDescriptor, size: f64) -> CtFont {
        let font =
            unsafe { CTFont::with_font_descriptor(descriptor, size as CGFloat, ptr::null()) };
        CtFont { font }
    }

    /// Build `{ kCTFontVariationAttribute: { axis id: value } }`
    fn variation_attributes(variation: &VariationMap) -> CFRetained<CFDictionary> {
        let pairs: Vec<(CFRetained<CFNumber>, CFRetained<CFNumber>)> = variation
            .iter()
            .map(|(tag, value)| {
                (
                    CFNumber::new_i64(i64::from(tag.to_u32())),
                    CFNumber::new_f64(value),
                )
            })
            .collect();
        let keys: Vec<&CFNumber> = pairs.iter().map(|(k, _)| k.as_ref()).collect();
        let values: Vec<&CFNumber> = pairs.iter().map(|(_, v)| v.as_ref()).collect();
        let var_dict = CFDictionary::from_slices(&keys, &values);
        let var_dict_type = unsafe { CFRetained::cast_unchecked::<CFType>(var_dict) };

        let var_key: &CFString = unsafe { kCTFontVariationAttribute };
        let attr_keys: [&CFString; 1] = [var_key];
        let attr_values: [&CFType; 1] = [&var_dict_type];
        let attrs = CFDictionary::from_slices(&attr_keys, &attr_values);
        unsafe { CFRetained::cast_unchecked::<CFDictionary>(attrs) }
    }

    fn read_axis(dict: &CFDictionary<CFString, CFType>) -> Option<Axis> {
        let tag = dict
            .get(unsafe { kCTFontVariationAxisIdentifierKey })?
            .downcast_ref::<CFNumber>()?
            .as_i64()
            .and_then(AxisTag::from_id)?;
        let default = number_value(dict, unsafe { kCTFontVariationAxisDefaultValueKey })?;
        let min = number_value(dict, unsafe { kCTFontVariationAxisMinimumValueKey })
            .unwrap_or(default);
        let max = number_value(dict, unsafe { kCTFontVariationAxisMaximumValueKey })
            .unwrap_or(default);
        let name = dict
            .get(unsafe { kCTFontVariationAxisNameKey })
            .and_then(|value| value.downcast_ref::<CFString>().map(|s| s.to_string()));

        Some(Axis {
            tag,
            name,
            min,
            default,
            max,
        })
    }
}

impl FontHost for CoreTextHost {
    type Font = CtFont;

    fn name(&self) -> &'static str {
        "coretext"
    }

    fn system_ui_font(&self, size: f64) -> Result<CtFont> {
        let font = unsafe {
            CTFont::new_ui_font_for_language(CTFontUIFontType::System, size as CGFloat, None)
        }
        .ok_or_else(|| ProbeError::Platform("CTFontCreateUIFontForLanguage failed".into()))?;
        Ok(CtFont { font })
    }

    fn font_from_file(&self, path: &Path, size: f64) -> Result<CtFont> {
        let file = File::open(path).map_err(|e| ProbeError::FontOpen {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mmap = unsafe {
            Mmap::map(&file).map_err(|e| ProbeError::FontOpen {
                path: path.to_path_buf(),
                source: e,
            })?
        };
        validate_font_data(&mmap, &path.display().to_string())?;
        log::debug!(
            "CoreTextHost: mapped {} ({} bytes)",
            path.display(),
            mmap.len()
        );

        let data = data_from_mmap(mmap)?;
        let descriptor = unsafe { CTFontManagerCreateFontDescriptorFromData(&data) }
            .ok_or_else(|| ProbeError::InvalidFont {
                origin: path.display().to_string(),
                reason: "CTFontManagerCreateFontDescriptorFromData returned null".to_string(),
            })?;
        Ok(Self::font_from_descriptor(&descriptor, size))
    }

    fn point_size(&self, font: &CtFont) -> f64 {
        unsafe { font.font.size() as f64 }
    }

    fn axes(&self, font: &CtFont) -> Vec<Axis> {
        let Some(axes) = (unsafe { font.font.variation_axes() }) else {
            return Vec::new();
        };
        let axes =
            unsafe { CFRetained::cast_unchecked::<CFArray<CFDictionary<CFString, CFType>>>(axes) };
        axes.iter()
            .filter_map(|axis| {
                let parsed = Self::read_axis(&axis);
                if parsed.is_none() {
                    log::warn!("CoreTextHost: skipping malformed variation axis");
                }
                parsed
            })
            .collect()
    }

    fn variation(&self, font: &CtFont) -> VariationMap {
        let Some(dict) = (unsafe { font.font.variation() }) else {
            return VariationMap::new();
        };
        let dict = unsafe { CFRetained::cast_unchecked::<CFDictionary<CFNumber, CFNumber>>(dict) };
        let (keys, values) = dict.to_vecs();
        keys.iter()
            .zip(values.iter())
            .filter_map(|(key, value)| {
                let tag = key.as_i64().and_then(AxisTag::from_id);
                match (tag, value.as_f64()) {
                    (Some(tag), Some(value)) => Some((tag, value)),
                    _ => {
                        log::warn!(
                            "CoreTextHost: skipping undecodable variation entry ({:?} -> {:?})",
                            key.as_i64(),
                            value.as_f64()
                        );
                        None
                    },
                }
            })
            .collect()
    }

    fn with_variation(&self, font: &CtFont, variation: &VariationMap) -> Result<CtFont> {
        // CTFontCreateCopyWithAttributes leaves stale equality metadata on the
        // copy, so go through the descriptor and re-instantiate
        let attributes = Self::variation_attributes(variation);
        let descriptor = unsafe { font.font.font_descriptor() };
        let derived = unsafe { descriptor.copy_with_attributes(&attributes) };
        Ok(Self::font_from_descriptor(&derived, self.point_size(font)))
    }

    fn fonts_equal(&self, a: &CtFont, b: &CtFont) -> bool {
        as_cf_type::<CTFont>(&a.font) == as_cf_type::<CTFont>(&b.font)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use varprobe_core::config::DEFAULT_FONT_FILE;
    use varprobe_core::sweep::{run_trial, Baseline};
    use varprobe_core::Trial;

    #[test]
    fn test_ui_font_reports_axes_at_both_sizes() {
        let _ = env_logger::builder().is_test(true).try_init();
        let host = CoreTextHost::new();
        for size in [17.0, 17.01] {
            let font = host.system_ui_font(size).unwrap();
            assert!(!host.resolved_axes(&font).is_empty());
            assert!((host.point_size(&font) - size).abs() < 1e-6);
        }
    }

    #[test]
    fn test_font_equals_itself() {
        let host = CoreTextHost::new();
        let font = host.system_ui_font(17.0).unwrap();
        assert!(host.fonts_equal(&font, &font));
    }

    #[test]
    fn test_width_bump_changes_variation() {
        let host = CoreTextHost::new();
        let font = host.system_ui_font(17.0).unwrap();
        if !host.axes(&font).iter().any(|axis| axis.tag == AxisTag::WDTH) {
            return;
        }
        let baseline = Baseline::capture(&host, &font);
        let trial = Trial {
            omit_opsz: true,
            bump: Some(AxisTag::WDTH),
            wght: 400.0,
        };

        let outcome = run_trial(&host, &baseline, &trial, 0.0001).unwrap();

        assert!(!outcome.variation_equal);
    }

    #[test]
    fn test_with_system_font_file() {
        let path = Path::new(DEFAULT_FONT_FILE);
        if !path.exists() {
            return;
        }
        let host = CoreTextHost::new();
        let font = host.font_from_file(path, 17.0).unwrap();
        assert!(!host.axes(&font).is_empty());
    }

    #[test]
    fn test_missing_file() {
        let host = CoreTextHost::new();
        let result = host.font_from_file(Path::new("/nonexistent/font.ttf"), 17.0);
        assert!(matches!(result, Err(ProbeError::FontOpen { .. })));
    }
}
