//! Churn Prediction Client Library
//!
//! This library collects customer attributes, submits them to a remote
//! churn-prediction service, and turns the answer into a prioritized risk
//! report ready for display.
//!
//! # Modules
//!
//! - `core`: Domain logic (input, lifecycle, risk, strategy).
//! - `integrations`: External service integrations.
//! - `config`: Configuration management.
//! - `errors`: Error taxonomy and user-facing messages.
//! - `input`: Form input normalization.
//! - `lifecycle`: Request state machine with last-submit-wins ordering.
//! - `models`: Wire data models.
//! - `prediction_client`: HTTP client for `/predict` and `/health`.
//! - `report`: Risk report and view selection for presentation.
//! - `risk`: Probability to display values.
//! - `strategy`: Retention action ranking and grouping.
//! - `warmup`: Cold-start health polling.

pub mod core;
pub mod integrations;

pub mod config;
pub mod errors;
pub mod input;
pub mod lifecycle;
pub mod models;
pub mod prediction_client;
pub mod report;
pub mod risk;
pub mod strategy;
pub mod warmup;
