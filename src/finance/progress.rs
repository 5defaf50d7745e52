//! Progress of a value towards a limit or target.
//!
//! Used for both `spent / limit` (budgets) and `current / target` (savings
//! goals). The bar saturates at 100% while the true numbers stay available
//! for "over by" and "remaining" text.

/// Where a value stands relative to its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStatus {
    /// Below 75%.
    OnTrack,
    /// 75% up to and including 100%.
    NearLimit,
    /// Past the limit, including any spend against a zero limit.
    Over,
}

/// Percentage at which a budget is flagged as close to its limit.
const NEAR_LIMIT_PERCENT: f64 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    current: f64,
    target: f64,
}

impl Progress {
    /// Non-finite inputs are treated as 0.
    #[must_use]
    pub fn new(current: f64, target: f64) -> Self {
        Self {
            current: finite_or_zero(current),
            target: finite_or_zero(target),
        }
    }

    #[must_use]
    pub fn current(&self) -> f64 {
        self.current
    }

    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// True ratio × 100; may exceed 100 or be negative.
    ///
    /// A non-positive target reads as 0% with nothing spent and 100% otherwise.
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.target <= 0.0 {
            return if self.current > 0.0 { 100.0 } else { 0.0 };
        }
        self.current / self.target * 100.0
    }

    /// Percentage for the bar width, clamped to `[0, 100]`.
    #[must_use]
    pub fn display_percent(&self) -> f64 {
        self.percent().clamp(0.0, 100.0)
    }

    /// Rounded bar width for markup.
    #[must_use]
    pub fn bar_width(&self) -> u8 {
        // Clamped to [0, 100] so the cast cannot truncate.
        #[allow(clippy::cast_sign_loss)]
        let width = self.display_percent().round() as u8;
        width
    }

    /// `target - current`; negative once over.
    #[must_use]
    pub fn remaining(&self) -> f64 {
        self.target - self.current
    }

    /// How far past the target, or 0.
    #[must_use]
    pub fn over_by(&self) -> f64 {
        (self.current - self.target).max(0.0)
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.current > self.target
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.target > 0.0 && self.current >= self.target
    }

    #[must_use]
    pub fn status(&self) -> ProgressStatus {
        if self.is_over() {
            ProgressStatus::Over
        } else if self.percent() >= NEAR_LIMIT_PERCENT {
            ProgressStatus::NearLimit
        } else {
            ProgressStatus::OnTrack
        }
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overspend_saturates_the_bar_but_keeps_the_overage() {
        let p = Progress::new(250.0, 200.0);
        assert!((p.display_percent() - 100.0).abs() < f64::EPSILON);
        assert_eq!(p.bar_width(), 100);
        assert!((p.percent() - 125.0).abs() < f64::EPSILON);
        assert!((p.over_by() - 50.0).abs() < f64::EPSILON);
        assert!((p.remaining() + 50.0).abs() < f64::EPSILON);
        assert_eq!(p.status(), ProgressStatus::Over);
    }

    #[test]
    fn under_budget_reports_remaining() {
        let p = Progress::new(50.0, 200.0);
        assert!((p.display_percent() - 25.0).abs() < f64::EPSILON);
        assert!((p.remaining() - 150.0).abs() < f64::EPSILON);
        assert!(p.over_by().abs() < f64::EPSILON);
        assert_eq!(p.status(), ProgressStatus::OnTrack);
    }

    #[test]
    fn near_limit_band() {
        assert_eq!(Progress::new(150.0, 200.0).status(), ProgressStatus::NearLimit);
        assert_eq!(Progress::new(200.0, 200.0).status(), ProgressStatus::NearLimit);
    }

    #[test]
    fn zero_target_does_not_divide() {
        assert!(Progress::new(0.0, 0.0).percent().abs() < f64::EPSILON);
        assert!((Progress::new(5.0, 0.0).percent() - 100.0).abs() < f64::EPSILON);
        assert!(!Progress::new(0.0, 0.0).is_complete());
    }

    #[test]
    fn any_spend_against_a_zero_limit_is_over() {
        let p = Progress::new(5.0, 0.0);
        assert_eq!(p.status(), ProgressStatus::Over);
        assert!((p.over_by() - 5.0).abs() < f64::EPSILON);
        assert_eq!(Progress::new(0.0, 0.0).status(), ProgressStatus::OnTrack);
    }

    #[test]
    fn negative_and_nan_inputs_clamp() {
        assert!(Progress::new(-10.0, 100.0).display_percent().abs() < f64::EPSILON);
        let p = Progress::new(f64::NAN, 100.0);
        assert!(p.current().abs() < f64::EPSILON);
    }

    #[test]
    fn goal_completion() {
        assert!(Progress::new(1000.0, 1000.0).is_complete());
        assert!(!Progress::new(999.0, 1000.0).is_complete());
    }
}
