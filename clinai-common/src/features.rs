//! Feature engineering
//!
//! Maps a [`PatientProfile`] onto the exact column layout of a
//! [`FeatureSchema`]. Every function here is pure; the output depends only on
//! the profile and the schema.

use serde::Serialize;

use crate::profile::{Gender, PatientProfile};
use crate::schema::FeatureSchema;

pub const AGE: &str = "age";
pub const LENGTH_OF_STAY: &str = "length_of_stay";
pub const PREVIOUS_ADMISSIONS: &str = "previous_admissions";
pub const COMORBIDITY_COUNT: &str = "comorbidity_count";
pub const AVG_CREATININE: &str = "avg_creatinine";
pub const AVG_HEMOGLOBIN: &str = "avg_hemoglobin";
pub const AVG_GLUCOSE: &str = "avg_glucose";
pub const NUM_MEDICATIONS: &str = "num_medications";
pub const GENDER_M: &str = "gender_M";
pub const LOS_X_COMORB: &str = "los_x_comorb";
pub const GLUCOSE_FLAG: &str = "glucose_flag";
pub const CREATININE_FLAG: &str = "creatinine_flag";
pub const HB_FLAG: &str = "hb_flag";
pub const POLYPHARMACY_FLAG: &str = "polypharmacy_flag";

/// Glucose above this (mg/dL) is flagged
pub const GLUCOSE_CUTOFF: f64 = 200.0;
/// Creatinine above this (mg/dL) is flagged
pub const CREATININE_CUTOFF: f64 = 2.0;
/// Hemoglobin below this (g/dL) is flagged
pub const HEMOGLOBIN_CUTOFF: f64 = 10.0;
/// This many medications or more is polypharmacy
pub const POLYPHARMACY_CUTOFF: u32 = 15;

pub fn glucose_flag(glucose: f64) -> u8 {
    u8::from(glucose > GLUCOSE_CUTOFF)
}

pub fn creatinine_flag(creatinine: f64) -> u8 {
    u8::from(creatinine > CREATININE_CUTOFF)
}

pub fn hb_flag(hemoglobin: f64) -> u8 {
    u8::from(hemoglobin < HEMOGLOBIN_CUTOFF)
}

pub fn polypharmacy_flag(num_medications: u32) -> u8 {
    u8::from(num_medications >= POLYPHARMACY_CUTOFF)
}

pub fn gender_m(gender: Gender) -> u8 {
    u8::from(gender == Gender::Male)
}

pub fn los_x_comorb(length_of_stay: u32, comorbidity_count: u32) -> u32 {
    length_of_stay * comorbidity_count
}

/// Diagnosis group: the uppercased first character of the code
///
/// Only the first character is used; "I50.9" and "I10" both map to "I".
/// Returns `None` for an empty code.
pub fn diagnosis_group(diagnosis_code: &str) -> Option<String> {
    diagnosis_code
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
}

/// Named features derived from a profile, before schema alignment
pub fn derived_features(profile: &PatientProfile) -> Vec<(&'static str, f64)> {
    vec![
        (AGE, f64::from(profile.age())),
        (LENGTH_OF_STAY, f64::from(profile.length_of_stay())),
        (PREVIOUS_ADMISSIONS, f64::from(profile.previous_admissions())),
        (COMORBIDITY_COUNT, f64::from(profile.comorbidity_count())),
        (AVG_CREATININE, profile.creatinine()),
        (AVG_HEMOGLOBIN, profile.hemoglobin()),
        (AVG_GLUCOSE, profile.glucose()),
        (NUM_MEDICATIONS, f64::from(profile.num_medications())),
        (GENDER_M, f64::from(gender_m(profile.gender()))),
        (
            LOS_X_COMORB,
            f64::from(los_x_comorb(profile.length_of_stay(), profile.comorbidity_count())),
        ),
        (GLUCOSE_FLAG, f64::from(glucose_flag(profile.glucose()))),
        (CREATININE_FLAG, f64::from(creatinine_flag(profile.creatinine()))),
        (HB_FLAG, f64::from(hb_flag(profile.hemoglobin()))),
        (POLYPHARMACY_FLAG, f64::from(polypharmacy_flag(profile.num_medications()))),
    ]
}

/// Feature values aligned to a schema's column order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    names: Vec<String>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Build the vector the model expects for this profile
    ///
    /// Columns come from the schema, in the schema's order. Columns the
    /// profile does not produce are 0. Derived features the schema does not
    /// list are dropped.
    pub fn build(profile: &PatientProfile, schema: &FeatureSchema) -> Self {
        let derived = derived_features(profile);
        let group = diagnosis_group(profile.diagnosis_code());

        let values = schema
            .columns()
            .iter()
            .map(|column| {
                let produced = derived.iter().find(|(name, _)| *name == column.as_str());
                if let Some((_, value)) = produced {
                    *value
                } else if group.as_deref() == Some(column.as_str()) {
                    1.0
                } else {
                    0.0
                }
            })
            .collect();

        Self {
            names: schema.columns().to_vec(),
            values,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    /// True when names and order equal the schema exactly
    pub fn matches_schema(&self, schema: &FeatureSchema) -> bool {
        self.names == schema.columns() && self.values.len() == self.names.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}
