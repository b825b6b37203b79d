//! Analysis endpoints
//!
//! Each request runs one assessment: validate the profile, build the feature
//! vector, score it, classify the tier and assemble the report. Nothing is
//! kept between requests.

use axum::{
    extract::{rejection::FormRejection, rejection::JsonRejection, State},
    http::header,
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use clinai_common::report::{self, escape_html, Report, ReportDocument};
use clinai_common::{PatientInput, PatientProfile, RiskTier};
use serde::Serialize;

use crate::{ApiResult, AppState};

const RESULT_HTML: &str = include_str!("../../ui/result.html");

/// JSON assessment returned by `POST /api/analyze`
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    /// Display identifier, e.g. "CAI-3F9A0C71B2D4"
    pub report_id: String,
    pub probability: f64,
    /// Percentage rounded to one decimal
    pub risk_percent: f64,
    pub tier: RiskTier,
    pub color: &'static str,
    pub recommendations: &'static [&'static str],
    pub generated_at: DateTime<Utc>,
    pub generated: String,
}

impl AnalysisResponse {
    fn from_report(report: &Report<'_>) -> Self {
        let assessment = report.assessment;
        Self {
            report_id: report.display_id(),
            probability: assessment.probability,
            risk_percent: (assessment.risk_percent() * 10.0).round() / 10.0,
            tier: assessment.tier,
            color: assessment.tier.color(),
            recommendations: assessment.tier.recommendations(),
            generated_at: assessment.generated_at,
            generated: report.generated(),
        }
    }
}

/// Fill the result page template
pub fn render_result(report: &Report<'_>, document: &ReportDocument) -> String {
    let tier = report.assessment.tier;
    let recommendations: String = tier
        .recommendations()
        .iter()
        .map(|item| format!("<li>{}</li>\n", escape_html(item)))
        .collect();

    RESULT_HTML
        .replace("{{LEVEL}}", tier.label())
        .replace("{{COLOR}}", tier.color())
        .replace("{{PERCENT}}", &report.assessment.risk_percent_display())
        .replace("{{GAUGE}}", &report.gauge_svg())
        .replace("{{FILE_NAME}}", document.file_name)
        .replace("{{DOCUMENT_B64}}", &STANDARD.encode(document.body.as_bytes()))
        .replace("{{REPORT_ID}}", &escape_html(&report.display_id()))
        .replace("{{GENERATED}}", &escape_html(&report.generated()))
        .replace("{{RECOMMENDATIONS}}", recommendations.trim_end())
}

/// POST /analyze
///
/// Form submission from the UI. Returns the result page with the risk card,
/// gauge, recommendations and the report document embedded as a download.
pub async fn analyze_form(
    State(state): State<AppState>,
    form: Result<Form<PatientInput>, FormRejection>,
) -> ApiResult<Html<String>> {
    let Form(input) = form?;
    let profile = PatientProfile::from_input(input)?;

    let (assessment, document) = state.context.analyze_with_document(&profile)?;
    let report = Report::new(&profile, &assessment);

    Ok(Html(render_result(&report, &document)))
}

/// POST /api/analyze
///
/// JSON profile in, JSON assessment out.
pub async fn analyze_json(
    State(state): State<AppState>,
    body: Result<Json<PatientInput>, JsonRejection>,
) -> ApiResult<Json<AnalysisResponse>> {
    let Json(input) = body?;
    let profile = PatientProfile::from_input(input)?;

    let assessment = state.context.analyze(&profile)?;
    Ok(Json(AnalysisResponse::from_report(&Report::new(
        &profile,
        &assessment,
    ))))
}

/// POST /api/report
///
/// JSON profile in, report document out as a file attachment.
pub async fn download_report(
    State(state): State<AppState>,
    body: Result<Json<PatientInput>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(input) = body?;
    let profile = PatientProfile::from_input(input)?;

    let (assessment, document) = state.context.analyze_with_document(&profile)?;

    Ok((
        [
            (header::CONTENT_TYPE, document.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", document.file_name),
            ),
            (
                header::HeaderName::from_static("x-report-id"),
                format!("{}{}", report::REPORT_ID_PREFIX, assessment.report_id),
            ),
        ],
        document.body,
    )
        .into_response())
}
