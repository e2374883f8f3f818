//! Binary entry point: logging, configuration, run, summary

use crate::app::cli::args::Args;
use crate::app::demo::{run_demo, DemoSummary};
use crate::core::config::SedaConfig;
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::version::long_version;
use clap::Parser;
use colored::Colorize;
use std::time::Duration;

/// Initialize application startup
pub fn startup() {
    let args = Args::parse();
    let use_color = args.use_color();
    colored::control::set_override(use_color);

    if let Err(e) = init_logging(
        args.log_level.as_deref(),
        args.log_format.as_deref(),
        args.log_file_path().as_deref(),
        use_color,
    ) {
        eprintln!("Failed to initialise logging: {}", e);
        std::process::exit(1);
    }

    log::info!("seda {} starting", long_version());

    let config = match SedaConfig::discover(args.config_file.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log_error_with_context(&e, "Configuration loading");
            std::process::exit(1);
        }
    };
    log::debug!("Configuration: {:?}", config);

    let started = chrono::Local::now();
    let summary = run_demo(
        &config,
        args.events,
        Duration::from_secs(args.duration_secs),
    );
    print_summary(&summary, &started.format("%Y-%m-%d %H:%M:%S").to_string());

    if !summary.is_complete() {
        std::process::exit(2);
    }
}

fn print_summary(summary: &DemoSummary, started: &str) {
    println!("{}", "=== Stage graph summary ===".bold());
    println!("  {:<12} {}", "Started", started);
    println!("  {:<12} {:?}", "Elapsed", summary.elapsed);
    println!("  {:<12} {}", "Produced", summary.produced.to_string().green());
    if summary.rejected > 0 {
        println!("  {:<12} {}", "Rejected", summary.rejected.to_string().red());
    }
    let processed = summary.processed.to_string();
    println!(
        "  {:<12} {}",
        "Processed",
        if summary.is_complete() {
            processed.green()
        } else {
            processed.yellow()
        }
    );
    println!("  {:<12} {}", "Total", summary.total);
    println!("  {:<12} {}", "Heartbeats", summary.heartbeats);
}
