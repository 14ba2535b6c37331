//! Confidence module
//!
//! Maps the inference probability to a confidence tier and scales the
//! stop-loss / take-profit parameters of an approved trade

mod classifier;
mod protection;

pub use classifier::{ConfidenceClassifier, ConfidenceThresholds, ConfidenceTier, ScalingFactors};
pub use protection::{ProtectionConfig, ProtectiveParams};
