mod error;
pub mod parser;

use crate::client::{self, Invocation};
use crate::config::{debug_enabled, process_env, Settings};
use crate::params::FlatParams;
use crate::services::{ServiceConfig, ServiceId};
use crate::transport::ReqwestTransport;
use colored::*;
pub use error::CliError;
use parser::Cli;
use std::process;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "C2_LOG";

// Parses the process arguments; clap prints usage and exits on error.
pub fn parse_args(service: &ServiceConfig) -> Cli {
    match Cli::parse_for(service, std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    }
}

/// Logs go to stderr. `DEBUG` or `-v` enables debug output, `-vv` trace;
/// `C2_LOG` takes a full filter and overrides both.
pub fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 if debug_enabled(&process_env) => LevelFilter::DEBUG,
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var(LOG_ENV_VAR)
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

pub async fn run(service: &ServiceConfig, cli: Cli) -> Result<String, CliError> {
    let settings = Settings::from_env(service, !cli.no_verify_ssl)?;
    let transport = ReqwestTransport::new(settings.verify_ssl)?;
    let invocation = Invocation::new(cli.action, FlatParams::from_pairs(&cli.parameters));
    client::execute(service, &settings, invocation, &transport).await
}

/// Entry point of every service binary.
pub async fn execute(id: ServiceId) {
    let service = ServiceConfig::get(id);
    let cli = parse_args(service);
    init_tracing(cli.verbose);

    match run(service, cli).await {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            process::exit(1);
        }
    }
}
