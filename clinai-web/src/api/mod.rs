//! HTTP API handlers for clinai-web

pub mod analyze;
pub mod buildinfo;
pub mod health;
pub mod ui;

pub use analyze::{analyze_form, analyze_json, download_report};
pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use ui::{serve_app_css, serve_index};
