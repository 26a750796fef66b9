//! Formpix CLI: compress attachments under the form's size budget and send
//! enquiries.
//!
//! Limits come from INTAKE_* variables (see `IntakeConfig::from_env`); the
//! send endpoints from FORMPIX_SEND_URL and FORMPIX_WEBHOOK_URL.

use anyhow::Context;
use clap::{Parser, Subcommand};
use formpix_cli::{
    apply_overrides, init_tracing, load_raw_file, log_intake_error, write_accepted, BatchSummary,
};
use formpix_client::{ContactForm, Service, SubmissionClient, SubmissionOutcome};
use formpix_core::{ErrorMetadata, IntakeConfig, IntakeError};
use formpix_processing::{BatchReport, IntakeSession};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "formpix", about = "Image intake and enquiry CLI")]
struct Cli {
    /// Use the embroidery site's limits (8 MiB total, no per-file cap)
    #[arg(long, global = true)]
    embroidery: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress images as one batch and report what was accepted
    Compress {
        /// Files to add, in selection order
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Directory to write the compressed files to
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Longest side of the output in pixels
        #[arg(long)]
        max_dimension: Option<u32>,
        /// Encoder quality in (0, 1]
        #[arg(long)]
        quality: Option<f32>,
    },
    /// Send an enquiry, attaching the accepted images
    Send {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,
        #[arg(long, default_value = "")]
        phone: String,
        /// basic, standard, ultimate, consultation or other
        #[arg(long)]
        service: Option<Service>,
        /// Post the fields to the spreadsheet webhook instead (no attachments)
        #[arg(long)]
        webhook: bool,
        /// Images to attach
        files: Vec<PathBuf>,
    },
}

#[derive(Serialize)]
struct SendSummary {
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    batch: Option<BatchSummary>,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn base_config(embroidery: bool) -> anyhow::Result<IntakeConfig> {
    if embroidery {
        return Ok(IntakeConfig::embroidery_site());
    }
    IntakeConfig::from_env().context("Failed to load intake configuration")
}

async fn run_batch(session: &IntakeSession, paths: &[PathBuf]) -> anyhow::Result<BatchReport> {
    let files = paths
        .iter()
        .map(|p| load_raw_file(p))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let report = session.submit_batch(files).await;
    if let Some(notice) = report.skip_notice() {
        eprintln!("{}", notice);
    }
    Ok(report)
}

fn into_anyhow(err: IntakeError) -> anyhow::Error {
    log_intake_error(&err);
    let message = err.client_message();
    anyhow::Error::new(err).context(message)
}

async fn compress(
    config: IntakeConfig,
    files: &[PathBuf],
    out_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let max_total_size = config.max_total_size;
    let session = IntakeSession::new(config).map_err(into_anyhow)?;
    let report = run_batch(&session, files).await?;

    let mut summary = BatchSummary::from_report(&report, max_total_size);
    if let Some(dir) = out_dir {
        let paths = write_accepted(&report, dir)?;
        for (entry, path) in summary.accepted.iter_mut().zip(paths) {
            entry.path = Some(path);
        }
    }
    print_json(&summary)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = base_config(cli.embroidery)?;

    match cli.command {
        Commands::Compress {
            files,
            out_dir,
            max_dimension,
            quality,
        } => {
            let config = apply_overrides(config, max_dimension, quality).map_err(into_anyhow)?;
            compress(config, &files, out_dir.as_deref()).await?;
        }
        Commands::Send {
            first_name,
            last_name,
            email,
            message,
            phone,
            service,
            webhook,
            files,
        } => {
            let form = ContactForm {
                first_name,
                last_name,
                email,
                phone,
                service,
                message,
                honey: String::new(),
            };
            let client = SubmissionClient::from_env()
                .context("Failed to create submission client. Check FORMPIX_SEND_URL")?;

            let (outcome, batch) = if webhook {
                if !files.is_empty() {
                    tracing::warn!(
                        files = files.len(),
                        "Webhook submissions carry no attachments; ignoring files"
                    );
                }
                let outcome = client.send_to_webhook(&form).await.map_err(into_anyhow)?;
                (outcome, None)
            } else {
                let max_total_size = config.max_total_size;
                let session = IntakeSession::new(config).map_err(into_anyhow)?;
                let report = run_batch(&session, &files).await?;
                let outcome = client
                    .submit_session(&form, &session)
                    .await
                    .map_err(into_anyhow)?;
                (outcome, Some(BatchSummary::from_report(&report, max_total_size)))
            };

            let outcome = match outcome {
                SubmissionOutcome::Sent => "sent",
                SubmissionOutcome::Suppressed => "suppressed",
            };
            print_json(&SendSummary { outcome, batch })?;
        }
    }

    Ok(())
}
