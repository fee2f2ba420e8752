use clap::{Parser, Subcommand};
use mend_core::{extract, split_function_list, GoTextTemplate, Level, Report};
use mend_driver::{read_input, Driver, MendConfig};
use miette::{IntoDiagnostic, Result};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod render;

#[derive(Parser)]
#[command(name = "mend")]
#[command(author, version, about = "Report every error in a template, not just the first")]
struct Cli {
    /// Log recovery steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and execute a template, reporting every error found
    Check {
        /// Template file, or `-` for stdin
        template: PathBuf,

        /// JSON file with sample data
        #[arg(long, conflicts_with = "data_json")]
        data: Option<PathBuf>,

        /// Sample data as inline JSON
        #[arg(long)]
        data_json: Option<String>,

        /// Comma-separated names of functions the template may call
        #[arg(long)]
        functions: Option<String>,

        /// Name the engine gives the template
        #[arg(long)]
        name: Option<String>,

        /// Engine program, then one argument per repetition
        #[arg(long = "engine", allow_hyphen_values = true)]
        engine: Vec<String>,

        /// Automatic fixes tried before giving up
        #[arg(long)]
        max_fixes: Option<usize>,

        /// Config file (defaults to ./mend.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,

        /// Also print the numbered template source with markers
        #[arg(long)]
        listing: bool,
    },

    /// Show how an engine error message is understood
    Explain {
        /// Raw message from the template engine
        message: String,

        /// Treat the message as an execution error
        #[arg(long)]
        exec: bool,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Source snippets and a summary
    Human,
    /// The full report as JSON
    Json,
}

fn main() -> Result<ExitCode> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            template,
            data,
            data_json,
            functions,
            name,
            engine,
            max_fixes,
            config,
            format,
            listing,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(name) = name {
                config.engine.template_name = name;
            }
            if !engine.is_empty() {
                config.engine.command = engine;
            }
            if let Some(max_fixes) = max_fixes {
                config.recovery.max_fixes = max_fixes;
            }

            let driver = Driver::new(config)?;
            let text = read_input(&template)?;
            let data = match (data, data_json) {
                (Some(path), _) => Some(read_input(&path)?),
                (None, json) => json,
            };
            let functions = functions
                .as_deref()
                .map(split_function_list)
                .unwrap_or_default();

            let report = driver.check_source(text, data, &functions);
            print_report(&report, format, listing)?;

            if !report.is_clean() {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Explain { message, exec } => {
            let level = if exec {
                Level::ExecFailure
            } else {
                Level::ParseFailure
            };
            let diagnostic = extract(&GoTextTemplate, &message, level);
            println!(
                "{}",
                serde_json::to_string_pretty(&diagnostic).into_diagnostic()?
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// `--config`, else `mend.toml` in the working directory, else defaults.
fn load_config(path: Option<&Path>) -> Result<MendConfig> {
    if let Some(path) = path {
        return Ok(MendConfig::from_file(path)?);
    }
    let cwd = std::env::current_dir().into_diagnostic()?;
    Ok(MendConfig::discover(&cwd)?.unwrap_or_default())
}

fn print_report(report: &Report, format: OutputFormat, listing: bool) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report).into_diagnostic()?);
        }
        OutputFormat::Human => {
            if listing {
                print!("{}", render::render_listing(report));
            }
            let color = std::io::stdout().is_terminal();
            let text = render::render_human(report, color)
                .map_err(|e| miette::miette!("failed to render report: {}", e))?;
            print!("{}", text);
            if report.parsed && !report.output.is_empty() {
                println!("--- output ---");
                println!("{}", report.output);
            }
        }
    }
    Ok(())
}
