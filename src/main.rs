//! Provider publisher CLI entrypoint.
//!
//! This binary publishes the release named by `REF_NAME` to the private
//! Terraform registry, staging downloaded assets in the current directory.
//! Any failure aborts the run with a non-zero exit code.

use camino::Utf8Path;
use clap::Parser;
use log::info;
use provider_publisher::cli::Cli;
use provider_publisher::config::ReleaseConfig;
use provider_publisher::deploy::do_full_deploy;
use provider_publisher::error::Result;
use provider_publisher::http::UreqClient;
use std::io::Write;

fn main() {
    let _cli = Cli::parse();
    init_logging();
    let mut stderr = std::io::stderr();
    let exit_code = exit_code_for_run_result(run(), &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

fn run() -> Result<()> {
    let config = ReleaseConfig::from_env()?;
    let client = UreqClient::new();
    let report = do_full_deploy(&client, &config, Utf8Path::new("."))?;

    if report.version_created {
        info!("Created provider version {}", config.version);
    }
    for target in &report.platforms {
        info!("Published {}", target.filename);
    }
    Ok(())
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // stderr is gone; nothing useful left to report to.
    }
}
