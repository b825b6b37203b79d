//! Semicircular risk gauge rendered as inline SVG
//!
//! Bands match the tier boundaries: 0–30 LOW, 30–50 MODERATE, 50–100 HIGH.

use std::f64::consts::PI;

use crate::risk::{RiskTier, HIGH_THRESHOLD, MODERATE_THRESHOLD};

const WIDTH: f64 = 300.0;
const HEIGHT: f64 = 190.0;
const CX: f64 = 150.0;
const CY: f64 = 160.0;
const RADIUS: f64 = 120.0;
const BAND_WIDTH: f64 = 26.0;

/// Point on the gauge arc for a percentage in [0, 100]
fn arc_point(percent: f64, radius: f64) -> (f64, f64) {
    let theta = PI * (1.0 - percent.clamp(0.0, 100.0) / 100.0);
    (CX + radius * theta.cos(), CY - radius * theta.sin())
}

fn band(from: f64, to: f64, color: &str) -> String {
    let (x0, y0) = arc_point(from, RADIUS);
    let (x1, y1) = arc_point(to, RADIUS);
    format!(
        r#"<path d="M {:.2} {:.2} A {r} {r} 0 0 1 {:.2} {:.2}" fill="none" stroke="{}" stroke-width="{}"/>"#,
        x0,
        y0,
        x1,
        y1,
        color,
        BAND_WIDTH,
        r = RADIUS
    )
}

/// Render the gauge for a risk percentage
pub fn render(percent: f64, tier: RiskTier) -> String {
    let moderate = MODERATE_THRESHOLD * 100.0;
    let high = HIGH_THRESHOLD * 100.0;
    let (nx, ny) = arc_point(percent, RADIUS - BAND_WIDTH);

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}" class="gauge" role="img" aria-label="Readmission risk {:.1}%">"#,
        WIDTH, HEIGHT, percent
    );
    svg.push_str(&band(0.0, moderate, RiskTier::Low.color()));
    svg.push_str(&band(moderate, high, RiskTier::Moderate.color()));
    svg.push_str(&band(high, 100.0, RiskTier::High.color()));
    svg.push_str(&format!(
        r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="6" stroke-linecap="round"/>"#,
        CX,
        CY,
        nx,
        ny,
        tier.color()
    ));
    svg.push_str(&format!(
        r#"<circle cx="{:.2}" cy="{:.2}" r="8" fill="{}"/>"#,
        CX,
        CY,
        tier.color()
    ));
    svg.push_str(&format!(
        r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" font-size="28" font-weight="700">{:.1}%</text>"#,
        CX,
        CY + 26.0,
        percent
    ));
    svg.push_str("</svg>");
    svg
}
