use std::path::{Path, PathBuf};

use varprobe_core::checks::{run_checks, CheckStatus};
use varprobe_core::sweep::{run_trial, Baseline};
use varprobe_core::{
    Axis, AxisTag, FontHost, FontSource, JsonlReporter, Probe, ProbeConfig, ProbeError,
    Result, SweepPlan, TestCase, TextReporter, Trial, VariationMap,
};

#[derive(Debug, Clone)]
struct MockFont {
    face: u32,
    size: f64,
    variation: VariationMap,
    /// What `fonts_equal` actually compares
    equality_key: VariationMap,
}

/// A font framework with a configurable set of quirks
#[derive(Default)]
struct MockHost {
    axes: Vec<Axis>,
    /// Pin opsz to the point size when a request leaves it out
    auto_opsz: bool,
    /// Keep the original's equality key when opsz was left out
    stale_equality: bool,
    /// Drop entries equal to the axis default
    drop_defaults: bool,
}

impl MockHost {
    fn system_font_axes() -> Vec<Axis> {
        vec![
            Axis::new(AxisTag::WDTH, 30.0, 100.0, 150.0).with_name("Width"),
            Axis::new(AxisTag::OPSZ, 17.0, 28.0, 96.0).with_name("Optical Size"),
            Axis::new(AxisTag::WGHT, 1.0, 400.0, 1000.0).with_name("Weight"),
        ]
    }

    fn consistent() -> Self {
        Self {
            axes: Self::system_font_axes(),
            auto_opsz: true,
            ..Default::default()
        }
    }

    fn stale() -> Self {
        Self {
            stale_equality: true,
            ..Self::consistent()
        }
    }

    fn axis(&self, tag: AxisTag) -> Option<&Axis> {
        self.axes.iter().find(|axis| axis.tag == tag)
    }

    fn fresh(&self, face: u32, size: f64) -> MockFont {
        let mut variation = VariationMap::new();
        if let (true, Some(opsz)) = (self.auto_opsz, self.axis(AxisTag::OPSZ)) {
            variation.insert(AxisTag::OPSZ, opsz.clamp(size));
        }
        MockFont {
            face,
            size,
            equality_key: variation.clone(),
            variation,
        }
    }
}

impl FontHost for MockHost {
    type Font = MockFont;

    fn name(&self) -> &'static str {
        "mock"
    }

    fn system_ui_font(&self, size: f64) -> Result<MockFont> {
        Ok(self.fresh(1, size))
    }

    fn font_from_file(&self, path: &Path, size: f64) -> Result<MockFont> {
        if path.starts_with("/missing") {
            return Err(ProbeError::FontOpen {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            });
        }
        Ok(self.fresh(2, size))
    }

    fn point_size(&self, font: &MockFont) -> f64 {
        font.size
    }

    fn axes(&self, _font: &MockFont) -> Vec<Axis> {
        self.axes.clone()
    }

    fn variation(&self, font: &MockFont) -> VariationMap {
        font.variation.clone()
    }

    fn with_variation(&self, font: &MockFont, requested: &VariationMap) -> Result<MockFont> {
        let mut variation: VariationMap = requested
            .iter()
            .filter_map(|(tag, value)| self.axis(tag).map(|axis| (tag, axis.clamp(value))))
            .filter(|(tag, value)| {
                !(self.drop_defaults && self.axis(*tag).map(|a| a.default) == Some(*value))
            })
            .collect();
        let omitted_opsz = !requested.contains(AxisTag::OPSZ);
        if let (true, true, Some(opsz)) = (self.auto_opsz, omitted_opsz, self.axis(AxisTag::OPSZ)) {
            variation.insert(AxisTag::OPSZ, opsz.clamp(font.size));
        }
        let equality_key = if self.stale_equality && omitted_opsz {
            font.equality_key.clone()
        } else {
            variation.clone()
        };
        Ok(MockFont {
            face: font.face,
            size: font.size,
            variation,
            equality_key,
        })
    }

    fn fonts_equal(&self, a: &MockFont, b: &MockFont) -> bool {
        a.face == b.face && a.size == b.size && a.equality_key == b.equality_key
    }
}

fn ui_only(sizes: &[f64]) -> ProbeConfig {
    ProbeConfig::cross(&[FontSource::SystemUi], sizes)
}

fn width_bump_trial() -> Trial {
    Trial {
        omit_opsz: true,
        bump: Some(AxisTag::WDTH),
        wght: 400.0,
    }
}

#[test]
fn consistent_host_has_no_suspect_trials() {
    let host = MockHost::consistent();
    let config = ui_only(&[17.0]);
    let mut reporter = TextReporter::new(Vec::new());

    let summary = Probe::new(&host, &config).run(&mut reporter).unwrap();

    assert_eq!(summary.cases, 1);
    assert_eq!(summary.trials, 54);
    assert_eq!(summary.suspect, 0);
    assert_eq!(summary.failed_checks, 0);
    let text = String::from_utf8(reporter.into_inner()).unwrap();
    assert!(!text.contains("<-- BUG"));
}

#[test]
fn stale_host_is_flagged() {
    let host = MockHost::stale();
    let config = ui_only(&[17.0]);
    let mut reporter = TextReporter::new(Vec::new());

    let summary = Probe::new(&host, &config).run(&mut reporter).unwrap();

    // Every omit_opsz trial keeps the stale equality key
    assert_eq!(summary.suspect, 27);
    let text = String::from_utf8(reporter.into_inner()).unwrap();
    assert!(text
        .contains("omit_opsz=true bump=wdth wght=400: variationEqual=false fontEqual=true  <-- BUG"));
    assert!(text.contains("-- system UI font @ 17.00pt: 54 trials, 27 suspect"));
}

#[test]
fn width_bump_with_opsz_omitted_changes_variation() {
    let host = MockHost::consistent();
    let font = host.system_ui_font(17.0).unwrap();
    let baseline = Baseline::capture(&host, &font);

    let outcome = run_trial(&host, &baseline, &width_bump_trial(), 0.0001).unwrap();

    assert!(!outcome.variation_equal);
    assert!(!outcome.font_equal);
    assert_eq!(outcome.result.get(AxisTag::WDTH), Some(100.0 + 0.0001));
    assert_eq!(outcome.result.get(AxisTag::OPSZ), Some(17.0));
}

#[test]
fn width_bump_with_opsz_omitted_is_suspect_on_stale_host() {
    let host = MockHost::stale();
    let font = host.system_ui_font(17.0).unwrap();
    let baseline = Baseline::capture(&host, &font);

    let outcome = run_trial(&host, &baseline, &width_bump_trial(), 0.0001).unwrap();

    assert!(!outcome.variation_equal);
    assert!(outcome.font_equal);
    assert!(outcome.is_suspect());
}

#[test]
fn unperturbed_request_keeps_font_equal_on_identical_variation() {
    // With only opsz on the font, an unperturbed request reproduces the original
    let host = MockHost {
        axes: vec![Axis::new(AxisTag::OPSZ, 17.0, 28.0, 96.0)],
        auto_opsz: true,
        ..Default::default()
    };
    let font = host.system_ui_font(20.0).unwrap();
    let baseline = Baseline::capture(&host, &font);
    let trial = Trial {
        omit_opsz: false,
        bump: None,
        wght: 100.0,
    };

    let outcome = run_trial(&host, &baseline, &trial, 0.0001).unwrap();

    assert!(outcome.variation_equal);
    assert!(outcome.font_equal);
    assert!(!outcome.is_suspect());
}

#[test]
fn ui_font_sizes_resolve_different_opsz() {
    let host = MockHost::consistent();
    let small = host.system_ui_font(17.0).unwrap();
    let larger = host.system_ui_font(17.01).unwrap();

    let small_axes = host.resolved_axes(&small);
    let larger_axes = host.resolved_axes(&larger);

    assert!(!small_axes.is_empty());
    assert!(!larger_axes.is_empty());
    assert!(small_axes.contains(&(AxisTag::OPSZ, 17.0)));
    assert!(larger_axes.contains(&(AxisTag::OPSZ, 17.01)));
    assert_eq!(host.point_size(&larger), 17.01);
}

#[test]
fn opsz_clamps_to_axis_max_at_96pt() {
    let host = MockHost::consistent();
    let below = host.system_ui_font(95.99).unwrap();
    let at_max = host.system_ui_font(96.0).unwrap();

    assert!(host.resolved_axes(&below).contains(&(AxisTag::OPSZ, 95.99)));
    assert!(host.resolved_axes(&at_max).contains(&(AxisTag::OPSZ, 96.0)));

    // An opsz bump past the maximum clamps back, so only wght differs
    let baseline = Baseline::capture(&host, &at_max);
    let trial = Trial {
        omit_opsz: false,
        bump: Some(AxisTag::OPSZ),
        wght: 700.0,
    };
    let outcome = run_trial(&host, &baseline, &trial, 0.0001).unwrap();
    assert_eq!(outcome.requested.get(AxisTag::OPSZ), Some(96.0 + 0.0001));
    assert_eq!(outcome.result.get(AxisTag::OPSZ), Some(96.0));
    assert!(!outcome.variation_equal);
    assert!(!outcome.font_equal);
}

#[test]
fn stale_host_is_flagged_at_opsz_max() {
    let host = MockHost::stale();
    let config = ui_only(&[96.0]);
    let mut reporter = TextReporter::new(Vec::new());

    let summary = Probe::new(&host, &config).run(&mut reporter).unwrap();

    assert_eq!(summary.suspect, 27);
    let text = String::from_utf8(reporter.into_inner()).unwrap();
    assert!(text.contains("axes: (wdth: 100.0000) (opsz: 96.0000) (wght: 400.0000)"));
    assert!(text.contains("Request : (wdth: 100.0001) #opsz: 96.0000# (wght: 400.0000)"));
    assert!(text.contains("-- system UI font @ 96.00pt: 54 trials, 27 suspect"));
}

#[test]
fn default_run_covers_six_cases() {
    let host = MockHost::consistent();
    let config = ProbeConfig::default();
    let mut reporter = TextReporter::new(Vec::new());

    let summary = Probe::new(&host, &config).run(&mut reporter).unwrap();

    assert_eq!(summary.cases, 6);
    assert_eq!(summary.trials, 6 * 54);
    assert_eq!(summary.suspect, 0);
    let text = String::from_utf8(reporter.into_inner()).unwrap();
    assert!(text.contains("== system UI font @ 24.00pt (mock)"));
    assert!(text.contains("== /System/Library/Fonts/SFNS.ttf @ 24.00pt (mock)"));
    assert!(text.contains("== system UI font @ 95.99pt (mock)"));
}

#[test]
fn missing_font_file_skips_only_that_case() {
    let host = MockHost::consistent();
    let config = ProbeConfig::cross(
        &[
            FontSource::File(PathBuf::from("/missing/SFNS.ttf")),
            FontSource::SystemUi,
        ],
        &[17.0],
    );
    let mut reporter = JsonlReporter::new(Vec::new());

    let summary = Probe::new(&host, &config).run(&mut reporter).unwrap();

    assert_eq!(summary.failed_cases, 1);
    assert_eq!(summary.cases, 1);
    assert_eq!(summary.trials, 54);

    let text = String::from_utf8(reporter.into_inner()).unwrap();
    let events: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(events[0]["event"], "case_failed");
    assert_eq!(events[0]["label"], "/missing/SFNS.ttf @ 17.00pt");
    assert_eq!(events[1]["event"], "case");
    assert_eq!(events.last().unwrap()["event"], "summary");
    assert_eq!(events.last().unwrap()["failed_cases"], 1);
}

#[test]
fn checks_pass_on_consistent_host() {
    let host = MockHost::consistent();
    let font = host.system_ui_font(17.0).unwrap();

    let outcomes = run_checks(&host, &font).unwrap();

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.iter().all(|o| o.status == CheckStatus::Passed));
}

#[test]
fn dropped_default_weight_fails_checks() {
    let host = MockHost {
        drop_defaults: true,
        ..MockHost::consistent()
    };
    let font = host.system_ui_font(17.0).unwrap();

    let outcomes = run_checks(&host, &font).unwrap();

    let by_name = |name: &str| outcomes.iter().find(|o| o.name == name).unwrap();
    assert!(by_name("explicit-default-weight").failed());
    assert!(by_name("round-trip").failed());
    assert_eq!(by_name("non-empty-axes").status, CheckStatus::Passed);
}

#[test]
fn static_font_skips_variation_checks() {
    let host = MockHost::default();
    let font = host.system_ui_font(17.0).unwrap();

    let outcomes = run_checks(&host, &font).unwrap();

    assert!(outcomes[0].failed());
    assert!(matches!(outcomes[1].status, CheckStatus::Skipped(_)));
    assert!(matches!(outcomes[2].status, CheckStatus::Skipped(_)));
}

#[test]
fn custom_plan_limits_trials() {
    let host = MockHost::stale();
    let config = ProbeConfig {
        plan: SweepPlan {
            omit_opsz: vec![true],
            bumps: vec![Some(AxisTag::WDTH)],
            weights: vec![400.0],
            bump_amount: 0.0001,
        },
        checks: false,
        ..ui_only(&[17.0, 17.01])
    };
    let mut reporter = TextReporter::new(Vec::new());

    let summary = Probe::new(&host, &config).run(&mut reporter).unwrap();

    assert_eq!(summary.cases, 2);
    assert_eq!(summary.trials, 2);
    assert_eq!(summary.suspect, 2);
    let text = String::from_utf8(reporter.into_inner()).unwrap();
    assert!(!text.contains("check "));
}

#[test]
fn test_case_owns_its_font() {
    let host = MockHost::consistent();
    let case = TestCase::new(host.system_ui_font(17.0).unwrap(), "ui");
    assert_eq!(case.label, "ui");
    assert_eq!(host.point_size(&case.font), 17.0);
}
