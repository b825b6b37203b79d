//! Application context
//!
//! Holds the feature schema and the loaded scoring oracle. Built once at
//! startup, then shared read-only by every analysis request.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::features::FeatureVector;
use crate::oracle::{ScoringOracle, XgbClassifier};
use crate::profile::PatientProfile;
use crate::report::{self, Report, ReportDocument};
use crate::risk::{validate_probability, RiskAssessment, RiskTier};
use crate::schema::FeatureSchema;
use crate::{Error, Result};

/// Schema plus oracle, immutable for the process lifetime
#[derive(Clone)]
pub struct AppContext {
    schema: FeatureSchema,
    oracle: Arc<dyn ScoringOracle>,
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("schema_columns", &self.schema.len())
            .field("oracle", &self.oracle.describe())
            .finish()
    }
}

impl AppContext {
    pub fn new(schema: FeatureSchema, oracle: Arc<dyn ScoringOracle>) -> Self {
        Self { schema, oracle }
    }

    /// Load the schema and XGBoost model artifacts
    ///
    /// Any failure here is fatal to startup; there is no degraded mode.
    pub fn load(model_path: &Path, schema_path: &Path) -> Result<Self> {
        let schema = FeatureSchema::load(schema_path)?;
        info!(
            "Feature schema: {} columns from {}",
            schema.len(),
            schema_path.display()
        );
        let model = XgbClassifier::load(model_path, &schema)?;
        Ok(Self::new(schema, Arc::new(model)))
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn oracle(&self) -> &dyn ScoringOracle {
        self.oracle.as_ref()
    }

    /// Feature vector for a profile under this context's schema
    pub fn features(&self, profile: &PatientProfile) -> FeatureVector {
        FeatureVector::build(profile, &self.schema)
    }

    /// Score a profile and assign its tier, stamped with the current time
    pub fn analyze(&self, profile: &PatientProfile) -> Result<RiskAssessment> {
        self.analyze_at(profile, Utc::now())
    }

    /// Score a profile with an explicit generation timestamp
    pub fn analyze_at(
        &self,
        profile: &PatientProfile,
        generated_at: DateTime<Utc>,
    ) -> Result<RiskAssessment> {
        let features = self.features(profile);
        if !features.matches_schema(&self.schema) {
            return Err(Error::ContractViolation(
                "feature vector columns differ from the schema".to_string(),
            ));
        }

        let probability = validate_probability(self.oracle.predict_proba(&features)?)?;
        let tier = RiskTier::from_probability(probability);
        let report_id = report::report_id(&generated_at, profile.age(), profile.diagnosis_code());

        info!("Assessment {}: {} risk", report_id, tier);

        Ok(RiskAssessment {
            probability,
            tier,
            report_id,
            generated_at,
        })
    }

    /// Analyze and render the downloadable document in one step
    pub fn analyze_with_document(
        &self,
        profile: &PatientProfile,
    ) -> Result<(RiskAssessment, ReportDocument)> {
        let assessment = self.analyze(profile)?;
        let document = report::document::render(&Report::new(profile, &assessment))?;
        Ok((assessment, document))
    }
}
