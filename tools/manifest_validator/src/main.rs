use clap::{Parser, ValueEnum};
use pwa_check_core::catalog::load_catalog;
use pwa_check_core::error::{CoreError, CoreResult};
use pwa_check_core::eval::default_registry;
use pwa_check_core::eval::report::{render_results_csv, render_results_text};
use pwa_check_core::manifest::ManifestDocument;
use pwa_check_core::{Evaluator, ScanReport, ServiceWorkerInfo, ValidationContext};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Csv,
    Text,
}

/// Checks a web app manifest and service worker for PWA readiness.
#[derive(Debug, Parser)]
#[command(name = "manifest_validator")]
struct Cli {
    /// Full validation context as JSON (siteUrl, manifest, serviceWorkerInfo, ...)
    #[arg(long, conflicts_with_all = ["site_url", "manifest", "manifest_url", "sw_scope", "sw_script"])]
    context: Option<PathBuf>,

    /// Page the manifest was collected from
    #[arg(long, required_unless_present = "context")]
    site_url: Option<String>,

    /// Manifest JSON file; omit to scan a site with no manifest
    #[arg(long)]
    manifest: Option<PathBuf>,

    #[arg(long)]
    manifest_url: Option<String>,

    /// Service worker scope; passing this or --sw-script marks a worker as present
    #[arg(long)]
    sw_scope: Option<String>,

    #[arg(long)]
    sw_script: Option<String>,

    /// The manifest was produced by a generator rather than discovered
    #[arg(long)]
    generated: bool,

    #[arg(long)]
    edited: bool,

    /// Rule catalog JSON replacing the built-in one
    #[arg(long)]
    catalog: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
}

fn read_context(path: &Path) -> CoreResult<ValidationContext> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

fn build_context(cli: &Cli) -> CoreResult<ValidationContext> {
    if let Some(path) = &cli.context {
        return read_context(path);
    }
    let site_url = cli
        .site_url
        .clone()
        .ok_or_else(|| CoreError::InvalidInput("--site-url is required".to_string()))?;
    let mut ctx = ValidationContext::new(site_url)
        .generated(cli.generated)
        .edited(cli.edited);
    if let Some(path) = &cli.manifest {
        let json = std::fs::read_to_string(path)?;
        ctx = ctx.with_manifest(ManifestDocument::from_json_str(&json)?);
    }
    if let Some(url) = &cli.manifest_url {
        ctx = ctx.with_manifest_url(url.clone());
    }
    if cli.sw_scope.is_some() || cli.sw_script.is_some() {
        ctx = ctx.with_service_worker(ServiceWorkerInfo {
            scope: cli.sw_scope.clone(),
            script_url: cli.sw_script.clone(),
        });
    }
    Ok(ctx)
}

fn scan(cli: &Cli) -> CoreResult<ScanReport> {
    let ctx = build_context(cli)?;
    tracing::debug!(
        site = %ctx.site_url,
        has_manifest = ctx.manifest.is_some(),
        has_service_worker = ctx.service_worker.is_some(),
        "context built"
    );
    match &cli.catalog {
        Some(path) => {
            let registry = load_catalog(path)?.into_registry()?;
            Ok(Evaluator::new(&registry).scan(&ctx))
        }
        None => Ok(Evaluator::new(default_registry()).scan(&ctx)),
    }
}

fn render(report: &ScanReport, format: Format) -> CoreResult<String> {
    match format {
        Format::Json => Ok(format!("{}\n", serde_json::to_string_pretty(report)?)),
        Format::Csv => render_results_csv(&report.results),
        Format::Text => Ok(render_results_text(report)),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let report = match scan(&cli) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("manifest_validator error: {}", e);
            std::process::exit(2);
        }
    };
    match render(&report, cli.format) {
        Ok(out) => print!("{}", out),
        Err(e) => {
            eprintln!("manifest_validator error: {}", e);
            std::process::exit(2);
        }
    }
    if !report.required_passed {
        std::process::exit(1);
    }
}
