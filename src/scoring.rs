//! Calibrated scoring curves
//!
//! Turns normalized finding rates into 0-10 scores. Two curve families:
//!
//! - **linear**: straight interpolation between a calibrated (best, worst)
//!   rate pair, clamped to [0, 10]. Simple, but every rate beyond the
//!   calibration span collapses onto 0 or 10.
//! - **absolute**: a saturating logistic through the same calibration
//!   pair. Rates beyond the span keep discriminating instead of clamping,
//!   and metrics with a true extreme (zero warnings, zero assertions) can
//!   pin that end of the curve exactly.
//!
//! The calibration constants are compiled in and versioned; changing them
//! changes score comparability across historical runs.

use crate::models::ToolResult;
use anyhow::{ensure, Result};

/// Logistic steepness in normalized [0, 1] coordinates, solved in closed
/// form from the 10%/90% calibration anchors: sigma(0.1) = 0.1 requires
/// e^(0.4 K) = 9, so K = ln(9) / 0.4.
const LOGISTIC_K: f64 = 5.493061443340549;

/// Calibration table version. Bumped whenever a constant changes.
pub const CALIBRATION_VERSION: &str = "v2";

/// Boundary behavior of the saturating curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// The fitted sigmoid is used across the whole domain; both tails
    /// saturate smoothly outside the calibration span.
    Floating,
    /// Score pinned to exactly 10 at and beyond `best`, with a linear ramp
    /// through the upper half of the span. For metrics whose ideal end is
    /// an absolute, tool-independent floor (e.g. zero warnings).
    BestFixed,
    /// Mirror of BestFixed: score pinned to 0 at and below `worst`.
    WorstFixed,
}

/// A calibrated scoring curve. `best` maps to 10 and `worst` to 0; the
/// sign of `best - worst` encodes whether higher or lower rates are
/// better, so both directions work unchanged.
#[derive(Debug, Clone, Copy)]
pub struct Curve {
    best: f64,
    worst: f64,
    case: Boundary,
}

impl Curve {
    /// A degenerate pair would divide by zero inside the curve, so it is
    /// rejected here instead.
    pub fn new(best: f64, worst: f64, case: Boundary) -> Result<Self> {
        ensure!(
            best != worst,
            "degenerate calibration pair: best == worst == {best}"
        );
        Ok(Self { best, worst, case })
    }

    /// Position of `rate` within the calibration span: 0 at `worst`, 1 at
    /// `best`, unbounded outside.
    fn normalized(&self, rate: f64) -> f64 {
        (rate - self.worst) / (self.best - self.worst)
    }

    /// Linear-relative score, clamped to [0, 10].
    pub fn linear(&self, rate: f64) -> f64 {
        (10.0 * self.normalized(rate)).clamp(0.0, 10.0)
    }

    /// Saturating-absolute score.
    pub fn absolute(&self, rate: f64) -> f64 {
        let t = self.normalized(rate);
        match self.case {
            Boundary::Floating => 10.0 * sigmoid(t),
            Boundary::BestFixed => {
                if t >= 1.0 {
                    10.0
                } else if t >= 0.5 {
                    10.0 * t
                } else {
                    10.0 * sigmoid(t)
                }
            }
            Boundary::WorstFixed => {
                if t <= 0.0 {
                    0.0
                } else if t <= 0.5 {
                    10.0 * t
                } else {
                    10.0 * sigmoid(t)
                }
            }
        }
    }
}

fn sigmoid(t: f64) -> f64 {
    1.0 / (1.0 + (-LOGISTIC_K * (t - 0.5)).exp())
}

/// The scored metrics and their calibration constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    CompilerAndSanitizer,
    Assertions,
    Cppcheck,
    ClangTidy,
    CyclomaticComplexity,
    LizardWarnings,
    Unique,
    KwStyle,
    Infer,
    TestCount,
}

impl Metric {
    /// Calibration constants derived from the reference benchmark corpus.
    pub fn curve(self) -> Curve {
        let (best, worst, case) = match self {
            Metric::CompilerAndSanitizer => (0.0, 0.5, Boundary::BestFixed),
            Metric::Assertions => (0.0088, 0.0, Boundary::WorstFixed),
            Metric::Cppcheck => (0.001, 0.1, Boundary::Floating),
            Metric::ClangTidy => (0.001, 0.26, Boundary::Floating),
            Metric::CyclomaticComplexity => (2.6, 22.2, Boundary::Floating),
            Metric::LizardWarnings => (0.0175, 0.3, Boundary::Floating),
            Metric::Unique => (0.98, 0.815, Boundary::Floating),
            Metric::KwStyle => (0.0014, 0.29, Boundary::Floating),
            Metric::Infer => (0.001, 0.05, Boundary::Floating),
            Metric::TestCount => (0.2, 0.0, Boundary::WorstFixed),
        };
        Curve::new(best, worst, case).expect("calibration table holds no degenerate pairs")
    }

    /// Score a rate with this metric's absolute curve.
    pub fn score(self, rate: f64) -> f64 {
        self.curve().absolute(rate)
    }
}

/// Normalize a weighted count into a rate. A zero denominator is a bug in
/// the supplied inputs, never a rate.
pub fn rate(weighted: f64, denominator: u64) -> Result<f64> {
    ensure!(denominator > 0, "rate denominator is zero");
    Ok(weighted / denominator as f64)
}

/// Unweighted mean over the flattened sub-scores of the surviving tools.
/// `None` when no tool survived.
pub fn composite<'a, I>(results: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a ToolResult>,
{
    let surviving: Vec<f64> = results
        .into_iter()
        .filter(|r| r.success)
        .flat_map(|r| r.scores.iter().copied())
        .collect();

    if surviving.is_empty() {
        None
    } else {
        Some(surviving.iter().sum::<f64>() / surviving.len() as f64)
    }
}

/// `"<name> Score: X.X/10"` line used in tool logs and the final report.
pub fn score_line(name: &str, score: f64) -> String {
    format!("{} Score: {:.1}/10", name, score)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assertion_curve() -> Curve {
        Curve::new(0.0088, 0.0, Boundary::WorstFixed).unwrap()
    }

    #[test]
    fn test_linear_clamps_exactly_at_endpoints() {
        let curve = Curve::new(0.001, 0.1, Boundary::Floating).unwrap();
        assert_eq!(curve.linear(0.001), 10.0);
        assert_eq!(curve.linear(0.1), 0.0);
        // Beyond the calibration span the clamp holds
        assert_eq!(curve.linear(0.0), 10.0);
        assert_eq!(curve.linear(0.5), 0.0);
    }

    #[test]
    fn test_linear_is_monotonic_in_the_goodness_direction() {
        // Lower is better
        let lower = Curve::new(0.001, 0.1, Boundary::Floating).unwrap();
        let mut previous = f64::INFINITY;
        for step in 0..=100 {
            let r = step as f64 * 0.002;
            let score = lower.linear(r);
            assert!(score <= previous, "not monotonic at rate {r}");
            previous = score;
        }

        // Higher is better
        let higher = Curve::new(0.98, 0.815, Boundary::Floating).unwrap();
        let mut previous = f64::NEG_INFINITY;
        for step in 0..=100 {
            let r = 0.8 + step as f64 * 0.002;
            let score = higher.linear(r);
            assert!(score >= previous, "not monotonic at rate {r}");
            previous = score;
        }
    }

    #[test]
    fn test_linear_assertion_scenario() {
        // 8 assertions in 1000 lines
        let score = assertion_curve().linear(0.008);
        assert!((score - 9.0909).abs() < 1e-3);
    }

    #[test]
    fn test_absolute_pins_the_fixed_ends() {
        let best_fixed = Curve::new(0.0, 0.5, Boundary::BestFixed).unwrap();
        assert_eq!(best_fixed.absolute(0.0), 10.0);
        // Past the pinned end it stays pinned
        assert_eq!(best_fixed.absolute(-0.1), 10.0);

        let worst_fixed = assertion_curve();
        assert_eq!(worst_fixed.absolute(0.0), 0.0);
        assert_eq!(worst_fixed.absolute(-0.5), 0.0);
    }

    #[test]
    fn test_absolute_ramps_linearly_in_the_pinned_half() {
        let best_fixed = Curve::new(0.0, 0.5, Boundary::BestFixed).unwrap();
        // Rate 0.125 sits at 75% of the span towards best
        assert!((best_fixed.absolute(0.125) - 7.5).abs() < 1e-9);

        let worst_fixed = assertion_curve();
        // Rate 0.0022 sits at 25% of the span
        assert!((worst_fixed.absolute(0.0022) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_absolute_is_continuous_at_the_midpoint() {
        let curve = Curve::new(0.0, 0.5, Boundary::BestFixed).unwrap();
        let below = curve.absolute(0.25 + 1e-9);
        let above = curve.absolute(0.25 - 1e-9);
        assert!((below - 5.0).abs() < 1e-6);
        assert!((above - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_floating_passes_through_the_anchors() {
        let curve = Curve::new(0.001, 0.1, Boundary::Floating).unwrap();
        let span = 0.001 - 0.1;
        // 10% and 90% of the way from worst to best
        assert!((curve.absolute(0.1 + 0.1 * span) - 1.0).abs() < 1e-9);
        assert!((curve.absolute(0.1 + 0.9 * span) - 9.0).abs() < 1e-9);
        assert!((curve.absolute(0.1 + 0.5 * span) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_floating_tails_saturate_instead_of_clamping() {
        let curve = Curve::new(0.001, 0.1, Boundary::Floating).unwrap();
        let endpoint = 10.0 / (1.0 + 9f64.powf(1.25));
        assert!((curve.absolute(0.1) - endpoint).abs() < 1e-9);
        assert!((curve.absolute(0.001) - (10.0 - endpoint)).abs() < 1e-9);
        // Far outside the span, still strictly inside (0, 10)
        let far_bad = curve.absolute(1.0);
        assert!(far_bad > 0.0 && far_bad < endpoint);
        let far_good = curve.absolute(-0.5);
        assert!(far_good < 10.0 && far_good > 10.0 - endpoint);
    }

    #[test]
    fn test_degenerate_calibration_is_rejected() {
        assert!(Curve::new(0.5, 0.5, Boundary::Floating).is_err());
    }

    #[test]
    fn test_every_metric_has_a_valid_curve() {
        for metric in [
            Metric::CompilerAndSanitizer,
            Metric::Assertions,
            Metric::Cppcheck,
            Metric::ClangTidy,
            Metric::CyclomaticComplexity,
            Metric::LizardWarnings,
            Metric::Unique,
            Metric::KwStyle,
            Metric::Infer,
            Metric::TestCount,
        ] {
            let score = metric.score(0.01);
            assert!((0.0..=10.0).contains(&score), "{metric:?} => {score}");
        }
    }

    #[test]
    fn test_rate_rejects_zero_denominator() {
        assert!(rate(5.0, 0).is_err());
        assert_eq!(rate(8.0, 1000).unwrap(), 0.008);
    }

    #[test]
    fn test_composite_skips_excluded_tools() {
        let results = [
            ToolResult::ok(vec![10.0], String::new()),
            ToolResult::ok(vec![0.0], String::new()),
            ToolResult::failed(1),
        ];
        // mean(10, 0), not mean(10, 0, 0)
        assert_eq!(composite(results.iter()), Some(5.0));
    }

    #[test]
    fn test_composite_flattens_subscores() {
        let results = [
            ToolResult::ok(vec![10.0, 4.0, 1.0], String::new()),
            ToolResult::ok(vec![5.0], String::new()),
        ];
        assert_eq!(composite(results.iter()), Some(5.0));
    }

    #[test]
    fn test_composite_with_no_survivors() {
        let results = [ToolResult::failed(1), ToolResult::failed(3)];
        assert_eq!(composite(results.iter()), None);
        assert_eq!(composite(std::iter::empty()), None);
    }

    #[test]
    fn test_score_line_rounds_to_one_decimal() {
        assert_eq!(score_line("Assertion", 9.0909), "Assertion Score: 9.1/10");
        assert_eq!(score_line("Cppcheck", 10.0), "Cppcheck Score: 10.0/10");
    }
}
