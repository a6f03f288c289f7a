use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use orientpress::{format_file_size, Cli, ConversionReport, ConversionResult, Pipeline};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG still overrides the level picked from --verbose
    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .init();

    match run(&cli) {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<ConversionReport> {
    let config = cli.to_config();
    let output = config.output.clone();

    let report = Pipeline::new(config)
        .run()
        .with_context(|| format!("Conversion into {} aborted", output.display()))?;

    print_report(&report);
    Ok(report)
}

fn print_report(report: &ConversionReport) {
    for result in &report.results {
        match result {
            ConversionResult::Converted { destination, .. } => {
                println!("done: {}", destination.display());
            }
            ConversionResult::Failed {
                source,
                stage,
                reason,
            } => {
                eprintln!("failed: {} ({} error: {})", source.display(), stage, reason);
            }
        }
    }

    let stats = report.stats();
    println!(
        "Converted {} images, {} failed ({} -> {}, {:.1}% smaller)",
        stats.converted_count,
        stats.failed_count,
        format_file_size(stats.total_size_before),
        format_file_size(stats.total_size_after),
        stats.savings_percent()
    );
}
