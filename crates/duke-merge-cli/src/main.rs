//! Duke Merge CLI - fill a Word template once per spreadsheet row

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use duke_merge::config::load_config;
use duke_merge::{Document, GenerateRequest, Generator, MergeConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Log level used when `RUST_LOG` is not set
const DEFAULT_LOG_FILTER: &str = "debug";

#[derive(Parser)]
#[command(name = "duke-merge")]
#[command(
    author,
    version,
    about = "Generate one filled Word document (and optional PDF) per spreadsheet row"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill the template for every row and save the results
    Generate {
        /// Spreadsheet with one row per document (xlsx, xlsm, csv, tsv)
        #[arg(short, long)]
        data: PathBuf,

        /// Word template containing placeholder tokens
        #[arg(short, long)]
        template: PathBuf,

        /// Directory for the generated files (created if missing)
        #[arg(short, long)]
        output: PathBuf,

        /// Also convert every document to PDF with LibreOffice
        #[arg(long)]
        pdf: bool,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Append the diagnostic log to this file
        #[arg(long, default_value = "duke-merge.log")]
        log_file: PathBuf,
    },

    /// Show the columns of a spreadsheet and the placeholders found in a template
    Info {
        /// Spreadsheet file
        #[arg(short, long)]
        data: PathBuf,

        /// Word template to check for placeholder tokens
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            data,
            template,
            output,
            pdf,
            config,
            log_file,
        } => {
            let request = GenerateRequest {
                spreadsheet: data,
                template,
                output_dir: output,
                convert_to_pdf: pdf,
            };
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
            generate(&request, config.as_deref(), &log_file, filter)
        }
        Commands::Info {
            data,
            template,
            config,
        } => show_info(&data, template.as_deref(), config.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn read_config(path: Option<&Path>) -> Result<MergeConfig> {
    match path {
        Some(path) => {
            anyhow::ensure!(path.exists(), "Config file '{}' not found", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load config '{}'", path.display()))
        }
        None => Ok(MergeConfig::default()),
    }
}

/// Plain-text subscriber appending timestamped events to `log_file`
fn log_subscriber(
    log_file: &Path,
    filter: EnvFilter,
) -> Result<impl tracing::Subscriber + Send + Sync + 'static> {
    let log = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file '{}'", log_file.display()))?;

    Ok(tracing_subscriber::fmt()
        .with_writer(Mutex::new(log))
        .with_ansi(false)
        .with_env_filter(filter)
        .finish())
}

fn generate(
    request: &GenerateRequest,
    config: Option<&Path>,
    log_file: &Path,
    filter: EnvFilter,
) -> Result<()> {
    let config = read_config(config)?;
    let subscriber = log_subscriber(log_file, filter)?;

    let report = tracing::subscriber::with_default(subscriber, || {
        Generator::new(config).generate(request)
    })
    .context("Document generation failed")?;

    println!(
        "Generated {} document(s) in '{}'",
        report.len(),
        request.output_dir.display()
    );
    Ok(())
}

fn show_info(data: &Path, template: Option<&Path>, config: Option<&Path>) -> Result<()> {
    let config = read_config(config)?;
    let rows = duke_merge::load_rows(data)
        .with_context(|| format!("Failed to open '{}'", data.display()))?;

    println!("File: {}", data.display());
    println!("Rows: {}", rows.len());
    println!("Columns:");
    for header in rows.headers() {
        println!("  {}", header);
    }

    let bindings = config.bindings();
    println!();
    println!("Placeholders:");
    let template_text = match template {
        Some(path) => Some(
            Document::open(path)
                .with_context(|| format!("Failed to open template '{}'", path.display()))?
                .text(),
        ),
        None => None,
    };
    for binding in &bindings {
        let column = if rows.headers().iter().any(|h| h == &binding.column) {
            "ok"
        } else {
            "missing column"
        };
        match &template_text {
            Some(text) => {
                let used = if text.contains(binding.token.as_str()) {
                    "in template"
                } else {
                    "not in template"
                };
                println!("  {} <- '{}' ({}, {})", binding.token, binding.column, column, used);
            }
            None => println!("  {} <- '{}' ({})", binding.token, binding.column, column),
        }
    }

    for (inner, outer) in bindings.overlapping_tokens() {
        println!("Warning: '{}' is contained in '{}'", inner, outer);
    }

    Ok(())
}
