use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::{error, info, warn};

use deleted_sms_report::auth::login;
use deleted_sms_report::logging::init_logging;
use deleted_sms_report::validation::InputValidator;
use deleted_sms_report::{AppConfig, Credentials, OutputFormat, Pipeline, ReportError, RestClient};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Extension ID whose deleted messages are reported
    #[arg(short, long)]
    extension_id: Option<String>,

    /// Length of the trailing window in days
    #[arg(short, long)]
    days: Option<u32>,

    /// Records requested per page
    #[arg(long)]
    per_page: Option<u32>,

    /// Report format (xlsx, csv or json)
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Directory for the tabular reports
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Path of the readable transcript
    #[arg(long)]
    readable_path: Option<String>,

    /// Print the transcript only, write no report files
    #[arg(long)]
    no_export: bool,

    /// Whole-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Also write JSON logs to this file (rotated daily)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Command-line flags win over every configuration source
    fn apply(&self, config: &mut AppConfig) {
        if let Some(id) = &self.extension_id {
            config.provider.extension_id.clone_from(id);
        }
        if let Some(days) = self.days {
            config.provider.window_days = days;
        }
        if let Some(per_page) = self.per_page {
            config.provider.per_page = per_page;
        }
        if let Some(timeout) = self.timeout {
            config.provider.request_timeout_secs = timeout;
        }
        if let Some(format) = self.format {
            config.export.format = format;
        }
        if let Some(dir) = &self.output_dir {
            config.export.output_directory.clone_from(dir);
        }
        if let Some(path) = &self.readable_path {
            config.export.readable_path.clone_from(path);
        }
        if self.no_export {
            config.export.enabled = false;
        }
        if let Some(level) = &self.log_level {
            config.logging.level.clone_from(level);
        }
        if let Some(file) = &self.log_file {
            config.logging.file_path = Some(file.display().to_string());
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // A missing .env file is fine; the variables may come from the shell.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => return fail(&err, err.exit_code()),
    };

    let log_file = config.logging.file_path.as_deref().map(Path::new);
    let _log_guard = match init_logging(Some(&config.get_log_level()), log_file, config.logging.format == "json") {
        Ok(guard) => guard,
        Err(err) => return fail(&err, err.exit_code()),
    };
    warn_on_long_window(&config);

    match execute(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let report_error = err.downcast_ref::<ReportError>();
            let kind = report_error.map_or("other", ReportError::kind);
            error!(kind, error = %format!("{err:#}"), "Run failed");
            fail(&err, report_error.map_or(1, ReportError::exit_code))
        },
    }
}

fn load_config(cli: &Cli) -> deleted_sms_report::Result<AppConfig> {
    let mut config = AppConfig::load()?;
    cli.apply(&mut config);
    config.validate()?;
    Ok(config)
}

/// Must run after `init_logging`.
fn warn_on_long_window(config: &AppConfig) {
    let days = config.provider.window_days;
    if InputValidator::exceeds_retention(days) {
        warn!(days, "Deleted messages older than the provider's retention window will not be returned");
    }
}

#[allow(clippy::print_stderr)]
fn fail(err: &dyn std::fmt::Display, code: u8) -> ExitCode {
    eprintln!("Error: {err:#}");
    ExitCode::from(code)
}

/// Credentials are checked before any network call.
async fn execute(config: &AppConfig) -> Result<()> {
    let credentials = Credentials::from_env()?;
    info!(
        server_url = %credentials.server_url,
        extension_id = %config.provider.extension_id,
        "Starting deleted-sms-report"
    );

    let http = RestClient::http_client(config)?;
    let session = login(&http, &credentials).await?;
    let client = RestClient::new(http, session);

    let mut stdout = std::io::stdout();
    Pipeline::new(&client, config)
        .run(Utc::now(), &mut stdout)
        .await
        .context("Deleted message report failed")?;

    Ok(())
}
