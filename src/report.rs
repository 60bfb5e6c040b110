//! Presentation binding.
//!
//! Turns a [`RequestState`] into exactly one thing to render: nothing, a
//! loading indicator, an error surface, or the risk report.

use crate::errors::ErrorReport;
use crate::lifecycle::RequestState;
use crate::models::{PredictionResponse, RiskLevel};
use crate::risk::{derive_display, RiskDisplay};
use crate::strategy::{rank, Recommendations, NO_RECOMMENDATIONS};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Everything the risk card and strategy list need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    pub churn_probability: f64,
    pub risk_level: RiskLevel,
    pub display: RiskDisplay,
    pub recommendations: Recommendations,
    pub generated_at: DateTime<Utc>,
}

impl RiskReport {
    pub fn from_response(response: &PredictionResponse) -> Self {
        Self {
            churn_probability: response.churn_probability,
            risk_level: response.risk_level,
            display: derive_display(response.churn_probability, response.risk_level),
            recommendations: rank(&response.actions),
            generated_at: Utc::now(),
        }
    }
}

impl fmt::Display for RiskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Churn Risk Assessment")?;
        writeln!(
            f,
            "  Churn probability: {} [{}]",
            self.display.percentage_text,
            progress_bar(self.display.progress_fraction, 20)
        )?;
        writeln!(
            f,
            "  Risk level: {} ({})",
            self.risk_level, self.display.color_tier
        )?;
        writeln!(f)?;

        match &self.recommendations {
            Recommendations::None => writeln!(f, "{}", NO_RECOMMENDATIONS),
            Recommendations::Ranked(ranked) => {
                writeln!(f, "Recommended Retention Strategies")?;
                for (i, action) in ranked.ordered().iter().enumerate() {
                    writeln!(f, "  {}. [{}] {}", i + 1, action.priority, action.action)?;
                    writeln!(f, "     {}", action.details)?;
                }
                Ok(())
            }
        }
    }
}

impl RiskReport {
    /// Text rendering with actions sectioned by priority instead of ranked.
    pub fn grouped(&self) -> GroupedReport<'_> {
        GroupedReport(self)
    }
}

/// [`RiskReport`] rendered as HIGH, MEDIUM, LOW, then unknown-priority sections.
pub struct GroupedReport<'a>(&'a RiskReport);

impl fmt::Display for GroupedReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        writeln!(f, "Churn Risk Assessment")?;
        writeln!(
            f,
            "  Churn probability: {} ({})",
            report.display.percentage_text, report.display.color_tier
        )?;
        writeln!(f, "  Risk level: {}", report.risk_level)?;
        writeln!(f)?;

        match &report.recommendations {
            Recommendations::None => writeln!(f, "{}", NO_RECOMMENDATIONS),
            Recommendations::Ranked(ranked) => {
                for group in ranked.grouped() {
                    writeln!(f, "{} priority", group.priority)?;
                    for action in group.actions {
                        writeln!(f, "  - {}: {}", action.action, action.details)?;
                    }
                }
                Ok(())
            }
        }
    }
}

fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "#".repeat(filled), "-".repeat(width - filled))
}

/// The one surface to render for a given state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    Idle,
    Loading,
    Error(ErrorReport),
    Report(RiskReport),
}

impl From<&RequestState> for View {
    fn from(state: &RequestState) -> Self {
        match state {
            RequestState::Idle => View::Idle,
            RequestState::Pending => View::Loading,
            RequestState::Rejected(report) => View::Error(report.clone()),
            RequestState::Fulfilled(response) => View::Report(RiskReport::from_response(response)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorKind, PredictionError};
    use crate::models::{Priority, RetentionAction};
    use crate::risk::ColorTier;

    fn high_risk_response() -> PredictionResponse {
        PredictionResponse {
            churn_probability: 0.8734,
            risk_level: RiskLevel::High,
            actions: vec![
                RetentionAction {
                    priority: Priority::High,
                    action: "Win-back Campaign".to_string(),
                    details: "Send personalized email with 20% discount".to_string(),
                },
                RetentionAction {
                    priority: Priority::Medium,
                    action: "Loyalty Program Enrollment".to_string(),
                    details: "Offer bonus points for joining loyalty program".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_views_are_mutually_exclusive() {
        assert_eq!(View::from(&RequestState::Idle), View::Idle);
        assert_eq!(View::from(&RequestState::Pending), View::Loading);

        let report = ErrorReport::from(PredictionError::NetworkUnreachable("refused".into()));
        assert!(matches!(
            View::from(&RequestState::Rejected(report)),
            View::Error(ErrorReport {
                kind: ErrorKind::NetworkUnreachable,
                ..
            })
        ));

        let view = View::from(&RequestState::Fulfilled(high_risk_response()));
        match view {
            View::Report(report) => {
                assert_eq!(report.display.color_tier, ColorTier::Red);
                assert_eq!(report.display.percentage_text, "87.34%");
            }
            other => panic!("Expected report view, got {:?}", other),
        }
    }

    #[test]
    fn test_text_rendering_lists_actions_in_order() {
        let text = RiskReport::from_response(&high_risk_response()).to_string();
        assert!(text.contains("87.34%"));
        assert!(text.contains("Risk level: HIGH (red)"));
        let first = text.find("Win-back Campaign").unwrap();
        let second = text.find("Loyalty Program Enrollment").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_text_rendering_without_actions() {
        let response = PredictionResponse {
            churn_probability: 0.12,
            risk_level: RiskLevel::Low,
            actions: vec![],
        };
        let text = RiskReport::from_response(&response).to_string();
        assert!(text.contains(NO_RECOMMENDATIONS));
        assert!(!text.contains("Recommended Retention Strategies"));
    }

    #[test]
    fn test_grouped_rendering_sections_by_priority() {
        let response = PredictionResponse {
            churn_probability: 0.55,
            risk_level: RiskLevel::Medium,
            actions: vec![
                RetentionAction {
                    priority: Priority::Low,
                    action: "Survey".to_string(),
                    details: "Ask for feedback".to_string(),
                },
                RetentionAction {
                    priority: Priority::Unknown,
                    action: "Call".to_string(),
                    details: "Account manager follow-up".to_string(),
                },
                RetentionAction {
                    priority: Priority::High,
                    action: "Discount".to_string(),
                    details: "Offer 15% off next order".to_string(),
                },
                RetentionAction {
                    priority: Priority::Medium,
                    action: "Newsletter".to_string(),
                    details: "Re-subscribe to weekly deals".to_string(),
                },
            ],
        };
        let text = RiskReport::from_response(&response).grouped().to_string();

        assert!(text.contains("Churn probability: 55.00% (amber)"));
        assert!(text.contains("Risk level: MEDIUM"));
        assert!(text.contains("  - Discount: Offer 15% off next order"));

        let headings = [
            "HIGH priority",
            "MEDIUM priority",
            "LOW priority",
            "UNKNOWN priority",
        ];
        let positions: Vec<usize> = headings
            .iter()
            .map(|heading| text.find(heading).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", text);
        assert!(text.find("Discount").unwrap() < text.find("Survey").unwrap());
        assert!(text.find("Survey").unwrap() < text.find("Call").unwrap());
    }

    #[test]
    fn test_grouped_rendering_skips_empty_sections() {
        let text = RiskReport::from_response(&high_risk_response()).grouped().to_string();
        assert!(text.contains("HIGH priority"));
        assert!(text.contains("MEDIUM priority"));
        assert!(!text.contains("LOW priority"));
        assert!(!text.contains("UNKNOWN priority"));
    }

    #[test]
    fn test_grouped_rendering_without_actions() {
        let response = PredictionResponse {
            churn_probability: 0.12,
            risk_level: RiskLevel::Low,
            actions: vec![],
        };
        let text = RiskReport::from_response(&response).grouped().to_string();
        assert!(text.contains(NO_RECOMMENDATIONS));
        assert!(!text.contains("priority"));
    }

    #[test]
    fn test_progress_bar_bounds() {
        assert_eq!(progress_bar(0.0, 4), "----");
        assert_eq!(progress_bar(0.5, 4), "##--");
        assert_eq!(progress_bar(1.7, 4), "####");
    }
}
