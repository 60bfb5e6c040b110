//! Form input normalization.
//!
//! Turns loosely typed form values (text boxes, selects, JSON numbers) into a
//! fully typed [`PredictionRequest`]. Normalization is total: unparseable,
//! empty, NaN or negative numbers become zero, and anything too large
//! (positive infinity included) saturates at the field's ceiling, so a
//! request never leaves this module with a non-numeric field.

use crate::errors::PredictionError;
use crate::models::{Channel, PredictionRequest};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A single raw form value as the form component hands it over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

/// Unvalidated form fields. Absent fields normalize like invalid ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFields {
    pub avg_order_value: Option<RawValue>,
    pub total_purchases: Option<RawValue>,
    pub email_open_rate: Option<RawValue>,
    pub days_since_last_purchase: Option<RawValue>,
    pub loyalty_program: Option<RawValue>,
    pub website_visits: Option<RawValue>,
    pub return_rate: Option<RawValue>,
    pub support_tickets: Option<RawValue>,
    pub channel: Option<String>,
}

/// Builds a request from raw fields.
///
/// `default_channel` is used when the channel is absent or unrecognized.
/// Callers that must refuse unknown channels run [`validate_channel`] first.
pub fn normalize(raw: &RawFields, default_channel: Channel) -> PredictionRequest {
    let channel = raw
        .channel
        .as_deref()
        .and_then(|c| c.parse::<Channel>().ok())
        .unwrap_or(default_channel);

    PredictionRequest {
        avg_order_value: coerce_amount(decimal(raw.avg_order_value.as_ref())),
        total_purchases: coerce_count(integer(raw.total_purchases.as_ref())),
        email_open_rate: coerce_rate(decimal(raw.email_open_rate.as_ref())),
        days_since_last_purchase: coerce_count(integer(raw.days_since_last_purchase.as_ref())),
        loyalty_program: flag(raw.loyalty_program.as_ref()),
        website_visits: coerce_count(integer(raw.website_visits.as_ref())),
        return_rate: coerce_rate(decimal(raw.return_rate.as_ref())),
        support_tickets: coerce_count(integer(raw.support_tickets.as_ref())),
        channel,
    }
}

/// Rejects a present-but-unrecognized channel at the form boundary.
pub fn validate_channel(raw: &RawFields) -> Result<(), PredictionError> {
    match raw.channel.as_deref() {
        None => Ok(()),
        Some(c) => c
            .parse::<Channel>()
            .map(|_| ())
            .map_err(PredictionError::Validation),
    }
}

fn decimal_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?")
            .expect("decimal prefix pattern is valid")
    })
}

fn integer_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*[+-]?[0-9]+").expect("integer prefix pattern is valid"))
}

/// Longest leading decimal in `text`, e.g. `"12.5kg"` -> 12.5.
fn parse_leading(re: &Regex, text: &str) -> f64 {
    re.find(text)
        .and_then(|m| m.as_str().trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn decimal(value: Option<&RawValue>) -> f64 {
    match value {
        None => 0.0,
        Some(RawValue::Number(n)) => *n,
        Some(RawValue::Bool(b)) => f64::from(u8::from(*b)),
        Some(RawValue::Text(t)) => parse_leading(decimal_prefix(), t),
    }
}

/// Integer fields truncate: `"3.7"` and `3.7` both give 3.
fn integer(value: Option<&RawValue>) -> f64 {
    match value {
        None => 0.0,
        Some(RawValue::Number(n)) => n.trunc(),
        Some(RawValue::Bool(b)) => f64::from(u8::from(*b)),
        Some(RawValue::Text(t)) => parse_leading(integer_prefix(), t),
    }
}

fn flag(value: Option<&RawValue>) -> bool {
    match value {
        None => false,
        Some(RawValue::Bool(b)) => *b,
        Some(RawValue::Number(n)) => n.is_finite() && n.trunc() != 0.0,
        Some(RawValue::Text(t)) => match t.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "on" => true,
            "false" | "no" | "n" | "off" | "" => false,
            other => parse_leading(integer_prefix(), other) != 0.0,
        },
    }
}

fn coerce_amount(value: f64) -> f64 {
    if value.is_nan() || value <= 0.0 {
        0.0
    } else {
        value.min(f64::MAX)
    }
}

fn coerce_rate(value: f64) -> f64 {
    coerce_amount(value).min(100.0)
}

fn coerce_count(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        // `as` saturates at u32::MAX, infinity included
        value as u32
    }
}
