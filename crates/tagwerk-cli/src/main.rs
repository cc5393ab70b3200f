// SPDX-License-Identifier: PMPL-1.0-or-later
//
// tagwerk — batch PDF to serial-tag sheet composer.
//
// Entry point. Initialises logging, parses arguments, and dispatches to
// the preprocessor (`clean`) or the compose pipeline (`compose`).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use tagwerk_compose::compose_run;
use tagwerk_core::error::{Result, TagwerkError};
use tagwerk_core::human_errors::humanize_error;
use tagwerk_core::{LayoutConfig, RunConfig};
use tagwerk_document::PdfPreprocessor;

#[derive(Parser)]
#[command(
    name = "tagwerk",
    version,
    about = "Compose a batch PDF into a sheet of tag rows (reference image + QR crop + serial)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the compose pipeline: one tag row per source page.
    Compose {
        /// Source batch PDF.
        #[arg(long)]
        pdf: Option<PathBuf>,
        /// Reference image repeated in every row.
        #[arg(long)]
        reference: Option<PathBuf>,
        /// Destination document.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Rasterisation density for symbol location.
        #[arg(long)]
        dpi: Option<u32>,
        /// Serial prefix, e.g. DESIMANDI.
        #[arg(long)]
        serial_prefix: Option<String>,
        /// First serial value.
        #[arg(long)]
        serial_start: Option<u64>,
        /// Increment between pages.
        #[arg(long)]
        serial_step: Option<u64>,
        /// Row layout preset.
        #[arg(long, value_enum)]
        layout: Option<LayoutArg>,
        /// JSON run configuration; explicit flags override its values.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Preprocess a batch PDF: drop blank pages, crop the right edge.
    Clean {
        /// Input PDF.
        #[arg(long)]
        input: PathBuf,
        /// Cleaned output PDF.
        #[arg(long)]
        output: PathBuf,
        /// Width to remove from the right edge, in inches.
        #[arg(long, default_value_t = 4.0)]
        crop_inches: f32,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LayoutArg {
    /// Serial on its own line below the symbol crop.
    Stacked,
    /// Serial inline after the reference image.
    Inline,
}

impl LayoutArg {
    fn to_config(self) -> LayoutConfig {
        match self {
            Self::Stacked => LayoutConfig::stacked(),
            Self::Inline => LayoutConfig::inline(),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            let human = humanize_error(&err);
            eprintln!("error: {}", human.message);
            eprintln!("  {}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<String> {
    match command {
        Command::Compose {
            pdf,
            reference,
            output,
            dpi,
            serial_prefix,
            serial_start,
            serial_step,
            layout,
            config,
        } => {
            let mut run_config = match config {
                Some(path) => load_config(&path)?,
                None => RunConfig::default(),
            };

            if let Some(path) = pdf {
                run_config.pdf_path = path;
            }
            if let Some(path) = reference {
                run_config.reference_image_path = path;
            }
            if let Some(path) = output {
                run_config.output_path = path;
            }
            if let Some(dpi) = dpi {
                run_config.dpi = dpi;
            }
            if let Some(prefix) = serial_prefix {
                run_config.serial.prefix = prefix;
            }
            if let Some(start) = serial_start {
                run_config.serial.start = start;
            }
            if let Some(step) = serial_step {
                run_config.serial.step = step;
            }
            if let Some(layout) = layout {
                run_config.layout = layout.to_config();
            }

            if run_config.pdf_path.as_os_str().is_empty() {
                return Err(TagwerkError::Pdf(missing_flag("--pdf")));
            }
            if run_config.reference_image_path.as_os_str().is_empty() {
                return Err(TagwerkError::ReferenceImage(missing_flag("--reference")));
            }
            if run_config.output_path.as_os_str().is_empty() {
                return Err(TagwerkError::Output(missing_flag("--output")));
            }

            let report = compose_run(&run_config)?;
            Ok(format!(
                "Composed {} tag rows ({} with symbol crops) into {}",
                report.pages,
                report.symbols_found,
                report.output_path.display()
            ))
        }
        Command::Clean {
            input,
            output,
            crop_inches,
        } => {
            let report = PdfPreprocessor::new(crop_inches).clean(&input, &output)?;
            Ok(format!(
                "Kept {} pages, removed {} blank pages, wrote {}",
                report.kept_pages,
                report.removed_pages,
                output.display()
            ))
        }
    }
}

fn load_config(path: &PathBuf) -> Result<RunConfig> {
    let text = std::fs::read_to_string(path)?;
    let config: RunConfig = serde_json::from_str(&text)?;
    Ok(config)
}

fn missing_flag(flag: &str) -> String {
    format!("no path given: pass {flag} or provide it in --config")
}
