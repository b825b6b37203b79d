//! clinai-assess - score one patient profile from the command line
//!
//! Reads a profile from a TOML or JSON file (fields as in the web form;
//! missing fields take the form defaults), prints the assessment and
//! optionally writes the report document.
//!
//! Usage:
//!   clinai-assess --profile patient.toml [--report report.html]

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use clinai_common::config::{CliOverrides, Settings};
use clinai_common::report::Report;
use clinai_common::{AppContext, PatientInput, PatientProfile};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "clinai-assess")]
#[command(about = "Score a single patient profile for 30-day readmission risk")]
#[command(version)]
struct Args {
    /// Patient profile (.toml or .json)
    #[arg(long)]
    profile: PathBuf,

    /// Write the report document to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// XGBoost JSON model file
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Feature schema file (JSON array of column names)
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Print the feature vector sent to the model
    #[arg(long)]
    show_features: bool,
}

fn load_profile(path: &Path) -> Result<PatientProfile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile {}", path.display()))?;

    let input: PatientInput = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&content).context("Invalid TOML profile")?,
        Some("json") => serde_json::from_str(&content).context("Invalid JSON profile")?,
        _ => bail!("Profile must be a .toml or .json file: {}", path.display()),
    };

    Ok(PatientProfile::from_input(input)?)
}

/// `RUST_LOG` when set and valid, else warn; stdout carries the assessment
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = Settings::resolve(&CliOverrides {
        config: args.config.clone(),
        model_path: args.model.clone(),
        schema_path: args.schema.clone(),
        ..CliOverrides::default()
    })
    .context("Failed to resolve configuration")?;

    let context = AppContext::load(&settings.model_path, &settings.schema_path)
        .context("Failed to load scoring model")?;
    let profile = load_profile(&args.profile)?;

    if args.show_features {
        for (name, value) in context.features(&profile).iter() {
            println!("{:<24} {}", name, value);
        }
        println!();
    }

    let (assessment, document) = context.analyze_with_document(&profile)?;
    let report = Report::new(&profile, &assessment);

    println!("Report ID:   {}", report.display_id());
    println!("Generated:   {}", report.generated());
    println!(
        "Risk:        {} ({})",
        assessment.risk_percent_display(),
        assessment.tier
    );
    println!("Recommendations:");
    for item in assessment.tier.recommendations() {
        println!("  • {}", item);
    }

    if let Some(path) = &args.report {
        std::fs::write(path, &document.body)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        info!("Report written to {}", path.display());
        println!("Report:      {}", path.display());
    }

    Ok(())
}
