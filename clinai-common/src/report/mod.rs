//! Report assembly
//!
//! Turns a profile and its assessment into the content shown on screen and
//! written to the downloadable document: report identifier, timestamps,
//! the patient data table and the verification payload.

pub mod document;
pub mod gauge;

pub use document::ReportDocument;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::profile::PatientProfile;
use crate::risk::RiskAssessment;

/// Prefix shown before every report identifier
pub const REPORT_ID_PREFIX: &str = "CAI-";
/// Number of hex characters kept from the digest
pub const REPORT_ID_LEN: usize = 12;

pub const REPORT_TITLE: &str = "CLINICAL AI — OFFICIAL RISK REPORT";
pub const REPORT_SUBTITLE: &str = "Hospital Clinical Decision Support System";
pub const REPORT_FOOTER: &str = "Clinical AI — Official Hospital Decision Support Prototype";

/// Derive the report identifier from (timestamp, age, diagnosis code)
///
/// SHA-256 over `"<timestamp>-<age>-<code>"` with the timestamp at
/// microsecond precision, first 12 hex digits, uppercased.
pub fn report_id(generated_at: &DateTime<Utc>, age: u32, diagnosis_code: &str) -> String {
    let seed = format!(
        "{}-{}-{}",
        generated_at.format("%Y-%m-%d %H:%M:%S%.6f"),
        age,
        diagnosis_code
    );
    let digest = Sha256::digest(seed.as_bytes());
    let mut id = format!("{:x}", digest);
    id.truncate(REPORT_ID_LEN);
    id.to_uppercase()
}

/// Timestamp as printed on reports, e.g. "07 Mar 2026 | 14:05 UTC"
pub fn format_timestamp(generated_at: &DateTime<Utc>) -> String {
    generated_at.format("%d %b %Y | %H:%M UTC").to_string()
}

/// Lab values keep one decimal when whole ("12.0"), otherwise print as entered
fn format_lab(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Everything needed to render one analysis, on screen or as a document
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub profile: &'a PatientProfile,
    pub assessment: &'a RiskAssessment,
}

impl<'a> Report<'a> {
    pub fn new(profile: &'a PatientProfile, assessment: &'a RiskAssessment) -> Self {
        Self { profile, assessment }
    }

    /// Identifier with its display prefix, e.g. "CAI-3F9A0C71B2D4"
    pub fn display_id(&self) -> String {
        format!("{}{}", REPORT_ID_PREFIX, self.assessment.report_id)
    }

    pub fn generated(&self) -> String {
        format_timestamp(&self.assessment.generated_at)
    }

    /// Patient data table: inputs followed by the computed risk
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let p = self.profile;
        vec![
            ("Age", p.age().to_string()),
            ("Gender", p.gender().to_string()),
            ("Diagnosis Code", p.diagnosis_code().to_string()),
            ("Length of Stay", p.length_of_stay().to_string()),
            ("Previous Admissions", p.previous_admissions().to_string()),
            ("Comorbidity Count", p.comorbidity_count().to_string()),
            ("Number of Medications", p.num_medications().to_string()),
            ("Creatinine (mg/dL)", format_lab(p.creatinine())),
            ("Hemoglobin (g/dL)", format_lab(p.hemoglobin())),
            ("Glucose (mg/dL)", format_lab(p.glucose())),
            ("Predicted Risk (%)", self.assessment.risk_percent_display()),
            ("Risk Category", self.assessment.tier.label().to_string()),
        ]
    }

    /// Text encoded in the verification QR code
    ///
    /// Informational only; nothing checks it against a server.
    pub fn verification_payload(&self) -> String {
        [
            "Clinical AI Official Report".to_string(),
            format!("Report ID: {}", self.display_id()),
            format!("Risk Level: {}", self.assessment.tier.label()),
            format!("Probability: {}", self.assessment.risk_percent_display()),
            format!("Generated: {}", self.generated()),
            "This is a computer-generated clinical document.".to_string(),
        ]
        .join("\n")
    }

    pub fn gauge_svg(&self) -> String {
        gauge::render(self.assessment.risk_percent(), self.assessment.tier)
    }
}

/// Minimal HTML escaping for text interpolated into documents and pages
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
