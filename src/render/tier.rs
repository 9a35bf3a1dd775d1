//! Coverage severity tiers.
//!
//! One percentage maps to exactly one tier and every visual class for that
//! value (badge, table row, progress bar, card) is derived from the tier, so
//! the pieces of one row can never disagree.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityTier {
    /// `>= 80`
    Good,
    /// `>= 60`
    Warning,
    /// `> 0`
    Bad,
    /// Zero, negative or not a number.
    None,
}

impl SeverityTier {
    pub fn from_percentage(pct: f64) -> Self {
        if pct.is_nan() {
            SeverityTier::None
        } else if pct >= 80.0 {
            SeverityTier::Good
        } else if pct >= 60.0 {
            SeverityTier::Warning
        } else if pct > 0.0 {
            SeverityTier::Bad
        } else {
            SeverityTier::None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SeverityTier::Good => "Completa",
            SeverityTier::Warning => "Parcial",
            SeverityTier::Bad => "Baja",
            SeverityTier::None => "Sin Cobertura",
        }
    }

    pub fn badge_class(self) -> &'static str {
        match self {
            SeverityTier::Good => "bg-success",
            SeverityTier::Warning => "bg-warning",
            SeverityTier::Bad => "bg-danger",
            SeverityTier::None => "bg-secondary",
        }
    }

    pub fn row_class(self) -> &'static str {
        match self {
            SeverityTier::Good => "table-success",
            SeverityTier::Warning => "table-warning",
            SeverityTier::Bad => "table-danger",
            SeverityTier::None => "table-light",
        }
    }

    /// Same palette as the badge, including `None`.
    pub fn progress_class(self) -> &'static str {
        self.badge_class()
    }

    /// Summary cards have no neutral color: anything under 60 is danger.
    pub fn card_class(self) -> &'static str {
        match self {
            SeverityTier::Good => "bg-success",
            SeverityTier::Warning => "bg-warning",
            SeverityTier::Bad | SeverityTier::None => "bg-danger",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn boundaries() {
        assert_eq!(SeverityTier::from_percentage(80.0), SeverityTier::Good);
        assert_eq!(SeverityTier::from_percentage(79.99), SeverityTier::Warning);
        assert_eq!(SeverityTier::from_percentage(60.0), SeverityTier::Warning);
        assert_eq!(SeverityTier::from_percentage(59.9), SeverityTier::Bad);
        assert_eq!(SeverityTier::from_percentage(0.1), SeverityTier::Bad);
        assert_eq!(SeverityTier::from_percentage(0.0), SeverityTier::None);
        assert_eq!(SeverityTier::from_percentage(-5.0), SeverityTier::None);
        assert_eq!(SeverityTier::from_percentage(f64::NAN), SeverityTier::None);
    }

    #[test]
    fn row_badge_and_progress_agree() {
        for pct in [0.0, 30.0, 65.0, 95.0] {
            let tier = SeverityTier::from_percentage(pct);
            let suffix = tier.badge_class().trim_start_matches("bg-");
            let row_suffix = tier.row_class().trim_start_matches("table-");
            if tier == SeverityTier::None {
                assert_eq!((suffix, row_suffix), ("secondary", "light"));
            } else {
                assert_eq!(suffix, row_suffix);
            }
            assert_eq!(tier.progress_class(), tier.badge_class());
        }
    }

    fn rank(t: SeverityTier) -> u8 {
        match t {
            SeverityTier::None => 0,
            SeverityTier::Bad => 1,
            SeverityTier::Warning => 2,
            SeverityTier::Good => 3,
        }
    }

    proptest! {
        #[test]
        fn tier_is_deterministic(pct in -100.0f64..200.0) {
            prop_assert_eq!(SeverityTier::from_percentage(pct), SeverityTier::from_percentage(pct));
        }

        #[test]
        fn tier_is_monotone(a in -10.0f64..110.0, b in -10.0f64..110.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(rank(SeverityTier::from_percentage(lo)) <= rank(SeverityTier::from_percentage(hi)));
        }
    }
}
