//! # Clinical AI Common Library
//!
//! Readmission risk core shared by the web service and the CLI:
//! - Patient profile validation
//! - Feature schema loading and feature engineering
//! - Scoring oracle (XGBoost JSON tree ensemble)
//! - Risk tiers and assessments
//! - Report assembly (identifier, gauge, downloadable document)
//! - Configuration loading

pub mod config;
pub mod context;
pub mod error;
pub mod features;
pub mod oracle;
pub mod profile;
pub mod report;
pub mod risk;
pub mod schema;

pub use context::AppContext;
pub use error::{Error, Result};
pub use features::FeatureVector;
pub use oracle::ScoringOracle;
pub use profile::{Gender, PatientInput, PatientProfile};
pub use risk::{RiskAssessment, RiskTier};
pub use schema::FeatureSchema;
