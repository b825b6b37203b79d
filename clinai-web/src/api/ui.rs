//! UI serving routes
//!
//! Serves the patient form. Input bounds and defaults are filled in from
//! the same constants the server validates against.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use clinai_common::profile::{
    Gender, PatientInput, AGE_RANGE, COMORBIDITY_RANGE, CREATININE_RANGE, GLUCOSE_RANGE,
    HEMOGLOBIN_RANGE, LENGTH_OF_STAY_RANGE, MAX_DIAGNOSIS_CODE_LEN, MEDICATIONS_RANGE,
    PREVIOUS_ADMISSIONS_RANGE,
};
use clinai_common::report::escape_html;

const INDEX_HTML: &str = include_str!("../../ui/index.html");
const APP_CSS: &str = include_str!("../../ui/app.css");

/// Fill the form template with bounds and the given starting values
pub fn render_index(input: &PatientInput) -> String {
    let selected = |g: Gender| if input.gender == g { " selected" } else { "" };

    INDEX_HTML
        .replace("{{AGE_MIN}}", &AGE_RANGE.start().to_string())
        .replace("{{AGE_MAX}}", &AGE_RANGE.end().to_string())
        .replace("{{AGE}}", &input.age.to_string())
        .replace("{{MALE_SELECTED}}", selected(Gender::Male))
        .replace("{{FEMALE_SELECTED}}", selected(Gender::Female))
        .replace("{{LOS_MIN}}", &LENGTH_OF_STAY_RANGE.start().to_string())
        .replace("{{LOS_MAX}}", &LENGTH_OF_STAY_RANGE.end().to_string())
        .replace("{{LOS}}", &input.length_of_stay.to_string())
        .replace("{{PREV_MIN}}", &PREVIOUS_ADMISSIONS_RANGE.start().to_string())
        .replace("{{PREV_MAX}}", &PREVIOUS_ADMISSIONS_RANGE.end().to_string())
        .replace("{{PREV}}", &input.previous_admissions.to_string())
        .replace("{{COMORB_MIN}}", &COMORBIDITY_RANGE.start().to_string())
        .replace("{{COMORB_MAX}}", &COMORBIDITY_RANGE.end().to_string())
        .replace("{{COMORB}}", &input.comorbidity_count.to_string())
        .replace("{{MEDS_MIN}}", &MEDICATIONS_RANGE.start().to_string())
        .replace("{{MEDS_MAX}}", &MEDICATIONS_RANGE.end().to_string())
        .replace("{{MEDS}}", &input.num_medications.to_string())
        .replace("{{CODE_MAX_LEN}}", &MAX_DIAGNOSIS_CODE_LEN.to_string())
        .replace("{{CODE}}", &escape_html(&input.diagnosis_code))
        .replace("{{CREAT_MIN}}", &CREATININE_RANGE.start().to_string())
        .replace("{{CREAT_MAX}}", &CREATININE_RANGE.end().to_string())
        .replace("{{CREAT}}", &input.creatinine.to_string())
        .replace("{{HB_MIN}}", &HEMOGLOBIN_RANGE.start().to_string())
        .replace("{{HB_MAX}}", &HEMOGLOBIN_RANGE.end().to_string())
        .replace("{{HB}}", &input.hemoglobin.to_string())
        .replace("{{GLUCOSE_MIN}}", &GLUCOSE_RANGE.start().to_string())
        .replace("{{GLUCOSE_MAX}}", &GLUCOSE_RANGE.end().to_string())
        .replace("{{GLUCOSE}}", &input.glucose.to_string())
}

/// GET /
///
/// Serves the patient form with default values
pub async fn serve_index() -> Html<String> {
    Html(render_index(&PatientInput::default()))
}

/// GET /static/app.css
pub async fn serve_app_css() -> Response {
    (StatusCode::OK, [("content-type", "text/css")], APP_CSS).into_response()
}
