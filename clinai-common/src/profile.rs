//! Patient clinical profile
//!
//! A [`PatientProfile`] is the validated form submission. Raw submissions
//! arrive as [`PatientInput`] (HTTP form, JSON body or CLI file) and are
//! checked against the input bounds before anything is scored.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const AGE_RANGE: RangeInclusive<u32> = 18..=120;
pub const LENGTH_OF_STAY_RANGE: RangeInclusive<u32> = 1..=60;
pub const PREVIOUS_ADMISSIONS_RANGE: RangeInclusive<u32> = 0..=20;
pub const COMORBIDITY_RANGE: RangeInclusive<u32> = 0..=15;
pub const MEDICATIONS_RANGE: RangeInclusive<u32> = 0..=50;
/// Creatinine, mg/dL
pub const CREATININE_RANGE: RangeInclusive<f64> = 0.3..=10.0;
/// Hemoglobin, g/dL
pub const HEMOGLOBIN_RANGE: RangeInclusive<f64> = 6.0..=20.0;
/// Glucose, mg/dL
pub const GLUCOSE_RANGE: RangeInclusive<f64> = 50.0..=500.0;

/// Longest diagnosis code accepted (full ICD-10-CM codes are at most 8 characters)
pub const MAX_DIAGNOSIS_CODE_LEN: usize = 16;

/// Patient gender as captured by the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(alias = "M", alias = "male")]
    Male,
    #[serde(alias = "F", alias = "female")]
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unvalidated patient submission
///
/// Missing fields fall back to the form defaults, so a partial JSON body
/// behaves like a form where the user only edited some inputs. Unknown
/// fields are rejected so a misspelled name never falls back silently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatientInput {
    pub age: u32,
    pub gender: Gender,
    pub length_of_stay: u32,
    pub previous_admissions: u32,
    pub comorbidity_count: u32,
    pub num_medications: u32,
    pub diagnosis_code: String,
    pub creatinine: f64,
    pub hemoglobin: f64,
    pub glucose: f64,
}

impl Default for PatientInput {
    fn default() -> Self {
        Self {
            age: 65,
            gender: Gender::Male,
            length_of_stay: 7,
            previous_admissions: 2,
            comorbidity_count: 2,
            num_medications: 10,
            diagnosis_code: "I50.9".to_string(),
            creatinine: 1.2,
            hemoglobin: 12.0,
            glucose: 110.0,
        }
    }
}

/// Validated patient profile, immutable once constructed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PatientInput", into = "PatientInput")]
pub struct PatientProfile {
    age: u32,
    gender: Gender,
    length_of_stay: u32,
    previous_admissions: u32,
    comorbidity_count: u32,
    num_medications: u32,
    diagnosis_code: String,
    creatinine: f64,
    hemoglobin: f64,
    glucose: f64,
}

impl PatientProfile {
    /// Validate a raw submission against the input bounds
    pub fn from_input(input: PatientInput) -> Result<Self> {
        check_int("age", input.age, &AGE_RANGE)?;
        check_int("length_of_stay", input.length_of_stay, &LENGTH_OF_STAY_RANGE)?;
        check_int(
            "previous_admissions",
            input.previous_admissions,
            &PREVIOUS_ADMISSIONS_RANGE,
        )?;
        check_int("comorbidity_count", input.comorbidity_count, &COMORBIDITY_RANGE)?;
        check_int("num_medications", input.num_medications, &MEDICATIONS_RANGE)?;
        check_float("creatinine", input.creatinine, &CREATININE_RANGE)?;
        check_float("hemoglobin", input.hemoglobin, &HEMOGLOBIN_RANGE)?;
        check_float("glucose", input.glucose, &GLUCOSE_RANGE)?;

        let diagnosis_code = input.diagnosis_code.trim().to_string();
        if diagnosis_code.chars().count() > MAX_DIAGNOSIS_CODE_LEN {
            return Err(Error::InvalidInput(format!(
                "diagnosis_code must be at most {} characters",
                MAX_DIAGNOSIS_CODE_LEN
            )));
        }

        Ok(Self {
            age: input.age,
            gender: input.gender,
            length_of_stay: input.length_of_stay,
            previous_admissions: input.previous_admissions,
            comorbidity_count: input.comorbidity_count,
            num_medications: input.num_medications,
            diagnosis_code,
            creatinine: input.creatinine,
            hemoglobin: input.hemoglobin,
            glucose: input.glucose,
        })
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn length_of_stay(&self) -> u32 {
        self.length_of_stay
    }

    pub fn previous_admissions(&self) -> u32 {
        self.previous_admissions
    }

    pub fn comorbidity_count(&self) -> u32 {
        self.comorbidity_count
    }

    pub fn num_medications(&self) -> u32 {
        self.num_medications
    }

    pub fn diagnosis_code(&self) -> &str {
        &self.diagnosis_code
    }

    pub fn creatinine(&self) -> f64 {
        self.creatinine
    }

    pub fn hemoglobin(&self) -> f64 {
        self.hemoglobin
    }

    pub fn glucose(&self) -> f64 {
        self.glucose
    }
}

impl TryFrom<PatientInput> for PatientProfile {
    type Error = Error;

    fn try_from(input: PatientInput) -> Result<Self> {
        Self::from_input(input)
    }
}

impl From<PatientProfile> for PatientInput {
    fn from(profile: PatientProfile) -> Self {
        Self {
            age: profile.age,
            gender: profile.gender,
            length_of_stay: profile.length_of_stay,
            previous_admissions: profile.previous_admissions,
            comorbidity_count: profile.comorbidity_count,
            num_medications: profile.num_medications,
            diagnosis_code: profile.diagnosis_code,
            creatinine: profile.creatinine,
            hemoglobin: profile.hemoglobin,
            glucose: profile.glucose,
        }
    }
}

fn check_int(field: &str, value: u32, range: &RangeInclusive<u32>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "{} must be between {} and {} (got {})",
            field,
            range.start(),
            range.end(),
            value
        )))
    }
}

fn check_float(field: &str, value: f64, range: &RangeInclusive<f64>) -> Result<()> {
    // NaN fails `contains`, so non-finite values are rejected here too
    if range.contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "{} must be between {} and {} (got {})",
            field,
            range.start(),
            range.end(),
            value
        )))
    }
}
