//! Scoring oracle
//!
//! The trained readmission model is consumed as a black box: it takes a
//! [`FeatureVector`] and returns P(readmission within 30 days).

pub mod xgboost;

pub use xgboost::XgbClassifier;

use crate::features::FeatureVector;
use crate::Result;

/// A loaded, immutable probability model
///
/// Implementations are shared read-only across requests for the lifetime of
/// the process, hence `Send + Sync`.
pub trait ScoringOracle: Send + Sync {
    /// Probability of the positive class (readmission) for one vector
    ///
    /// A vector that does not match the columns the model was trained on is
    /// a contract violation and must return an error, never a score.
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64>;

    /// Short human-readable description for startup logging
    fn describe(&self) -> String;
}
