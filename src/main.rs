//! ONTAP Facts
//!
//! Gathers ONTAP configuration facts over the REST API and prints them as
//! JSON on stdout. Logs go to stderr.

use clap::Parser;
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ontap_facts::{Error, FactCollector, GatherOutcome, Result, Settings, TransportFactory};

// =============================================================================
// CLI Arguments
// =============================================================================

/// ONTAP Facts - gather configuration facts from an ONTAP cluster
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML settings file with `connection` and `gather` sections
    #[arg(long, env = "ONTAP_CONFIG")]
    config: Option<PathBuf>,

    /// Cluster or SVM management address
    #[arg(long, env = "ONTAP_HOSTNAME")]
    hostname: Option<String>,

    /// User for basic authentication
    #[arg(long, env = "ONTAP_USERNAME")]
    username: Option<String>,

    /// Password for basic authentication
    #[arg(long, env = "ONTAP_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Use HTTPS
    #[arg(long, env = "ONTAP_HTTPS")]
    https: bool,

    /// Verify the server certificate (true/false)
    #[arg(long, env = "ONTAP_VALIDATE_CERTS")]
    validate_certs: Option<bool>,

    /// Override the default HTTP(S) port
    #[arg(long, env = "ONTAP_HTTP_PORT")]
    http_port: Option<u16>,

    /// Per-request timeout in seconds
    #[arg(long, env = "ONTAP_TIMEOUT")]
    timeout_secs: Option<u64>,

    /// Subsets to gather (comma separated), or `all`
    #[arg(long, value_delimiter = ',')]
    gather_subset: Option<Vec<String>>,

    /// Maximum records per page
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    max_records: Option<u32>,

    /// Fields to return (comma separated), or `*`
    #[arg(long, value_delimiter = ',')]
    fields: Option<Vec<String>>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

impl Args {
    /// Settings file contents overridden by explicit arguments
    fn settings(&self) -> Result<Settings> {
        let mut settings = match self.config {
            Some(ref path) => Settings::from_file(path)?,
            None => Settings::default(),
        };

        let connection = &mut settings.connection;
        if let Some(ref hostname) = self.hostname {
            connection.hostname = hostname.clone();
        }
        if self.username.is_some() {
            connection.username = self.username.clone();
        }
        if self.password.is_some() {
            connection.password = self.password.clone();
        }
        if self.https {
            connection.https = true;
        }
        if let Some(validate_certs) = self.validate_certs {
            connection.validate_certs = validate_certs;
        }
        if self.http_port.is_some() {
            connection.http_port = self.http_port;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            connection.timeout_secs = timeout_secs;
        }

        let gather = &mut settings.gather;
        if let Some(ref subsets) = self.gather_subset {
            gather.gather_subset = subsets.clone();
        }
        if let Some(max_records) = self.max_records {
            gather.max_records = max_records;
        }
        if self.fields.is_some() {
            gather.fields = self.fields.clone();
        }

        Ok(settings)
    }
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(&args);

    match run(&args).await {
        Ok(outcome) => match serde_json::to_string_pretty(&outcome) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::SUCCESS
            }
            Err(e) => report_failure(&Error::from(e)),
        },
        Err(e) => report_failure(&e),
    }
}

async fn run(args: &Args) -> Result<GatherOutcome> {
    let settings = args.settings()?;

    info!("Starting ONTAP fact gathering");
    info!("  Version: {}", ontap_facts::VERSION);
    info!("  Host: {}", settings.connection.hostname);
    info!("  Subsets: {:?}", settings.gather.gather_subset);

    let transport = TransportFactory::rest(&settings.connection)?;
    let collector = FactCollector::new(transport);

    collector.gather(&settings.gather).await
}

fn report_failure(err: &Error) -> ExitCode {
    error!("Fact gathering failed: {}", err);
    println!("{}", json!({"failed": true, "msg": err.to_string()}));

    ExitCode::from(err.exit_code())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());
    let filter = ["hyper=warn", "reqwest=warn", "rustls=warn"]
        .iter()
        .filter_map(|d| d.parse::<tracing_subscriber::filter::Directive>().ok())
        .fold(filter, |f, d| f.add_directive(d));

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
