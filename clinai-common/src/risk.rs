//! Risk tiers and assessment results

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Probabilities at or above this are HIGH
pub const HIGH_THRESHOLD: f64 = 0.50;
/// Probabilities at or above this (and below HIGH) are MODERATE
pub const MODERATE_THRESHOLD: f64 = 0.30;

/// Discretized readmission risk bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    /// Bucket a probability into a tier
    ///
    /// Bands are closed-open: [0, 0.3) LOW, [0.3, 0.5) MODERATE, [0.5, 1] HIGH.
    /// HIGH is tested first.
    pub fn from_probability(probability: f64) -> Self {
        if probability >= HIGH_THRESHOLD {
            RiskTier::High
        } else if probability >= MODERATE_THRESHOLD {
            RiskTier::Moderate
        } else {
            RiskTier::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Low => "LOW",
            RiskTier::Moderate => "MODERATE",
            RiskTier::High => "HIGH",
        }
    }

    /// Gauge and card colour for this tier
    pub fn color(&self) -> &'static str {
        match self {
            RiskTier::Low => "#2a9d8f",
            RiskTier::Moderate => "#f77f00",
            RiskTier::High => "#d62828",
        }
    }

    /// Discharge recommendations shown with the result
    pub fn recommendations(&self) -> &'static [&'static str] {
        match self {
            RiskTier::High => &[
                "Delay discharge until stabilization confirmed",
                "Repeat laboratory evaluation within 24 hours",
                "Comprehensive medication reconciliation",
                "Multidisciplinary case review",
                "Schedule follow-up within ≤ 7 days",
                "Evaluate caregiver support",
            ],
            RiskTier::Moderate => &[
                "Confirm discharge readiness",
                "Optimize medication adherence",
                "Structured discharge counseling",
                "Schedule follow-up within ≤ 14 days",
            ],
            RiskTier::Low => &[
                "Proceed with standard discharge protocol",
                "Routine outpatient follow-up",
                "Educate patient on warning symptoms",
            ],
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reject oracle output that is not a probability
pub fn validate_probability(probability: f64) -> Result<f64> {
    if probability.is_finite() && (0.0..=1.0).contains(&probability) {
        Ok(probability)
    } else {
        Err(Error::Oracle(format!(
            "model returned {} which is not a probability",
            probability
        )))
    }
}

/// Result of one analysis request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub probability: f64,
    pub tier: RiskTier,
    /// 12-character uppercase hex token, displayed with the `CAI-` prefix
    pub report_id: String,
    pub generated_at: DateTime<Utc>,
}

impl RiskAssessment {
    /// Probability as a percentage, e.g. 62.3 for 0.623
    pub fn risk_percent(&self) -> f64 {
        self.probability * 100.0
    }

    /// Percentage with one decimal, e.g. "62.3%"
    pub fn risk_percent_display(&self) -> String {
        format!("{:.1}%", self.risk_percent())
    }
}
