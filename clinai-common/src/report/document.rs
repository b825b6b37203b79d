//! Downloadable report document
//!
//! A single self-contained HTML file (inline CSS and SVG, no external
//! resources) that prints cleanly to paper or PDF from any browser.

use qrcode::render::svg;
use qrcode::QrCode;

use super::{escape_html, Report, REPORT_FOOTER, REPORT_SUBTITLE, REPORT_TITLE};
use crate::{Error, Result};

pub const FILE_NAME: &str = "Clinical_AI_Official_Report.html";
pub const CONTENT_TYPE: &str = "text/html; charset=utf-8";

const QR_SIZE: u32 = 160;

const STYLE: &str = "body{font-family:Helvetica,Arial,sans-serif;max-width:720px;margin:40px auto;color:#1b1b1b}\
h1{text-align:center;font-size:22px;margin-bottom:8px}\
p.meta{margin:2px 0}\
table{border-collapse:collapse;width:100%;margin:28px 0}\
td{border:0.5px solid #888;padding:6px 10px;width:50%}\
tr:first-child td{background:#f5f5f5}\
.qr{margin-top:32px}\
footer{margin-top:40px;font-size:12px;color:#666}";

/// Rendered report, ready to be served or written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

/// Verification QR code as an inline `<svg>` element
pub fn qr_svg(payload: &str) -> Result<String> {
    let code = QrCode::new(payload.as_bytes())
        .map_err(|e| Error::Report(format!("cannot encode verification code: {}", e)))?;
    let image = code
        .render::<svg::Color>()
        .min_dimensions(QR_SIZE, QR_SIZE)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build();

    // Drop the XML prolog so the element can sit inside HTML
    match image.find("<svg") {
        Some(start) => Ok(image[start..].to_string()),
        None => Err(Error::Report("QR renderer produced no svg element".to_string())),
    }
}

/// Render the downloadable document for a report
pub fn render(report: &Report<'_>) -> Result<ReportDocument> {
    let qr = qr_svg(&report.verification_payload())?;

    let rows: String = report
        .rows()
        .into_iter()
        .map(|(label, value)| {
            format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                escape_html(label),
                escape_html(&value)
            )
        })
        .collect();

    let body = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>{id} | Clinical AI Risk Report</title>\n<style>{style}</style>\n</head>\n<body>\n\
<h1>{title}</h1>\n<p class=\"meta\">{subtitle}</p>\n\
<p class=\"meta\">Report ID: {id}</p>\n<p class=\"meta\">Generated: {generated}</p>\n\
<table>{rows}</table>\n\
<div class=\"qr\"><p>Verification QR Code:</p>{qr}</div>\n\
<footer>{footer}</footer>\n</body>\n</html>\n",
        id = escape_html(&report.display_id()),
        style = STYLE,
        title = escape_html(REPORT_TITLE),
        subtitle = escape_html(REPORT_SUBTITLE),
        generated = escape_html(&report.generated()),
        rows = rows,
        qr = qr,
        footer = escape_html(REPORT_FOOTER),
    );

    Ok(ReportDocument {
        file_name: FILE_NAME,
        content_type: CONTENT_TYPE,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{PatientInput, PatientProfile};
    use crate::risk::{RiskAssessment, RiskTier};
    use chrono::{TimeZone, Utc};

    fn sample(code: &str) -> (PatientProfile, RiskAssessment) {
        let profile = PatientProfile::from_input(PatientInput {
            diagnosis_code: code.to_string(),
            ..PatientInput::default()
        })
        .unwrap();
        let assessment = RiskAssessment {
            probability: 0.71,
            tier: RiskTier::High,
            report_id: "A1B2C3D4E5F6".to_string(),
            generated_at: Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap(),
        };
        (profile, assessment)
    }

    #[test]
    fn test_qr_svg_is_inline_element() {
        let svg = qr_svg("Report ID: CAI-A1B2C3D4E5F6").unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(!svg.contains("<?xml"));
    }

    #[test]
    fn test_document_contents() {
        let (profile, assessment) = sample("I50.9");
        let doc = render(&Report::new(&profile, &assessment)).unwrap();

        assert_eq!(doc.file_name, "Clinical_AI_Official_Report.html");
        assert!(doc.body.starts_with("<!DOCTYPE html>"));
        assert!(doc.body.contains("CLINICAL AI — OFFICIAL RISK REPORT"));
        assert!(doc.body.contains("Report ID: CAI-A1B2C3D4E5F6"));
        assert!(doc.body.contains("Generated: 19 Oct 2026 | 09:30 UTC"));
        assert!(doc.body.contains("<td>Risk Category</td><td>HIGH</td>"));
        assert!(doc.body.contains("<td>Predicted Risk (%)</td><td>71.0%</td>"));
        assert!(doc.body.contains("Verification QR Code:"));
        assert_eq!(doc.body.matches("<tr>").count(), 12);
    }

    #[test]
    fn test_document_escapes_diagnosis_code() {
        let (profile, assessment) = sample("<script>");
        let doc = render(&Report::new(&profile, &assessment)).unwrap();
        assert!(!doc.body.contains("<script>"));
        assert!(doc.body.contains("&lt;script&gt;"));
    }
}
