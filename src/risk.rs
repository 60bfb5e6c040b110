use crate::models::RiskLevel;
use serde::Serialize;
use std::fmt;

/// Shown instead of a percentage when the probability is not a number.
const UNAVAILABLE: &str = "N/A";

/// Colour family the risk card uses for its text, bar and border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTier {
    Red,
    Amber,
    Green,
    Neutral,
}

impl ColorTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorTier::Red => "red",
            ColorTier::Amber => "amber",
            ColorTier::Green => "green",
            ColorTier::Neutral => "neutral",
        }
    }
}

impl fmt::Display for ColorTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RiskLevel> for ColorTier {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::High => ColorTier::Red,
            RiskLevel::Medium => ColorTier::Amber,
            RiskLevel::Low => ColorTier::Green,
            RiskLevel::Unknown => ColorTier::Neutral,
        }
    }
}

/// Display-ready view of a churn probability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskDisplay {
    /// Probability as a percentage with two decimals, e.g. `"87.34%"`.
    pub percentage_text: String,
    pub color_tier: ColorTier,
    /// Fill of the progress bar, always within `[0, 1]`.
    pub progress_fraction: f64,
}

/// Derives the risk card's display values.
///
/// The colour follows the server's `risk_level` only; it is never inferred
/// from `probability`, so tier and percentage cannot disagree.
pub fn derive_display(probability: f64, risk_level: RiskLevel) -> RiskDisplay {
    let percentage_text = if probability.is_finite() {
        format!("{:.2}%", probability * 100.0)
    } else {
        UNAVAILABLE.to_string()
    };
    // NaN survives clamp()
    let progress_fraction = if probability.is_nan() {
        0.0
    } else {
        probability.clamp(0.0, 1.0)
    };

    RiskDisplay {
        percentage_text,
        color_tier: ColorTier::from(risk_level),
        progress_fraction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_risk_display() {
        let display = derive_display(0.8734, RiskLevel::High);
        assert_eq!(display.percentage_text, "87.34%");
        assert_eq!(display.color_tier, ColorTier::Red);
        assert_eq!(display.progress_fraction, 0.8734);
    }

    #[test]
    fn test_tier_mapping() {
        assert_eq!(derive_display(0.5, RiskLevel::Medium).color_tier, ColorTier::Amber);
        assert_eq!(derive_display(0.1, RiskLevel::Low).color_tier, ColorTier::Green);
        assert_eq!(derive_display(0.1, RiskLevel::Unknown).color_tier, ColorTier::Neutral);
    }

    #[test]
    fn test_tier_not_recomputed_from_probability() {
        // Server says LOW even though the number looks high; the server wins.
        let display = derive_display(0.95, RiskLevel::Low);
        assert_eq!(display.color_tier, ColorTier::Green);
        assert_eq!(display.percentage_text, "95.00%");
    }

    #[test]
    fn test_out_of_range_probability_is_clamped() {
        let over = derive_display(1.3, RiskLevel::High);
        assert_eq!(over.progress_fraction, 1.0);
        assert_eq!(over.percentage_text, "130.00%");

        let under = derive_display(-0.2, RiskLevel::Low);
        assert_eq!(under.progress_fraction, 0.0);
    }

    #[test]
    fn test_non_finite_probability_does_not_panic() {
        let nan = derive_display(f64::NAN, RiskLevel::High);
        assert_eq!(nan.percentage_text, "N/A");
        assert_eq!(nan.progress_fraction, 0.0);

        let inf = derive_display(f64::INFINITY, RiskLevel::High);
        assert_eq!(inf.percentage_text, "N/A");
        assert_eq!(inf.progress_fraction, 1.0);
    }

    #[test]
    fn test_exact_boundaries() {
        assert_eq!(derive_display(0.0, RiskLevel::Low).percentage_text, "0.00%");
        assert_eq!(derive_display(1.0, RiskLevel::High).percentage_text, "100.00%");
        assert_eq!(derive_display(0.12, RiskLevel::Low).percentage_text, "12.00%");
    }
}
