use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============ Request Models ============

/// Acquisition channel of the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    #[default]
    Web,
    Mobile,
    App,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Web, Channel::Mobile, Channel::App];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Web => "web",
            Channel::Mobile => "mobile",
            Channel::App => "app",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Channel::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unrecognized channel '{}'", wanted))
    }
}

/// Customer attributes sent to `POST /predict`.
///
/// Every numeric field is already typed; building one from form input goes
/// through [`crate::input::normalize`], which never yields a non-numeric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// Average order value in currency units.
    pub avg_order_value: f64,
    pub total_purchases: u32,
    /// Percentage, 0-100.
    pub email_open_rate: f64,
    pub days_since_last_purchase: u32,
    /// Encoded on the wire as `0`/`1`.
    #[serde(with = "flag_as_int")]
    pub loyalty_program: bool,
    pub website_visits: u32,
    /// Percentage, 0-100.
    pub return_rate: f64,
    pub support_tickets: u32,
    pub channel: Channel,
}

impl PredictionRequest {
    /// The values a fresh form starts with.
    pub fn form_defaults() -> Self {
        Self {
            avg_order_value: 50.0,
            total_purchases: 5,
            email_open_rate: 50.0,
            days_since_last_purchase: 30,
            loyalty_program: false,
            website_visits: 15,
            return_rate: 10.0,
            support_tickets: 1,
            channel: Channel::Web,
        }
    }
}

mod flag_as_int {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*flag))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(u8::deserialize(deserializer)? != 0)
    }
}

// ============ Response Models ============

/// Risk tier assigned by the service. Unrecognized values are kept as
/// `Unknown` instead of failing the whole response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    #[serde(other)]
    Unknown,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority of a recommended retention action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
    #[serde(other)]
    Unknown,
}

impl Priority {
    /// Section order for grouped presentation.
    pub const SECTION_ORDER: [Priority; 4] =
        [Priority::High, Priority::Medium, Priority::Low, Priority::Unknown];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
            Priority::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recommended intervention returned alongside a prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionAction {
    pub priority: Priority,
    /// Short label, e.g. "Win-back Campaign".
    pub action: String,
    pub details: String,
}

/// Successful body of `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Probability in `[0, 1]`.
    pub churn_probability: f64,
    /// Authoritative tier; never recomputed on the client.
    pub risk_level: RiskLevel,
    /// Ordered by importance as decided by the service.
    pub actions: Vec<RetentionAction>,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub scaler_loaded: bool,
}

impl HealthStatus {
    pub fn is_ready(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy") && self.model_loaded
    }
}
