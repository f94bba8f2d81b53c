//! Sheetcalc - a command-line spreadsheet formula engine

mod config;
mod render;

use anyhow::{Context, Result, bail};
use clap::Parser;
use sheetcalc_core::{Document, RecalcMode};
use sheetcalc_engine::builtins::{Category, builtins};
use sheetcalc_engine::engine::{CHART_TYPE_SENTINEL, ERROR_SENTINEL, NAME_SENTINEL, REF_SENTINEL};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "sheetcalc", version, about = "Evaluate spreadsheet formulas from the command line")]
struct Cli {
    /// Spreadsheet document to open (.json)
    file: Option<PathBuf>,

    /// Evaluate a formula against the document and print the result
    #[arg(short = 'c', long = "command", value_name = "FORMULA")]
    command: Option<String>,

    /// Set a cell before anything else runs (repeatable), e.g. --set 'B1==SUM(A1:A3)'
    #[arg(long = "set", value_name = "ADDR=INPUT")]
    set: Vec<String>,

    /// Write the document to a file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the document as a markdown table
    #[arg(long)]
    print: bool,

    /// List the available functions and exit
    #[arg(long)]
    functions: bool,

    /// Only re-evaluate direct dependents of an edited cell
    #[arg(long)]
    direct: bool,

    /// Settings file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore any settings file
    #[arg(long)]
    no_config: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (settings, warnings) = config::load_settings(cli.config.as_deref(), cli.no_config);
    init_logging(settings.log_level.as_deref());
    for warning in warnings {
        log::warn!("{warning}");
    }

    match run(cli, settings) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: Option<&str>) {
    let env = env_logger::Env::default().default_filter_or(level.unwrap_or("warn"));
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli, settings: config::Settings) -> Result<ExitCode> {
    if cli.functions {
        print_functions()?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut doc = open_document(cli.file, &settings)?;
    if cli.direct {
        doc.recalc_mode = RecalcMode::Direct;
    }

    for assignment in &cli.set {
        let Some((address, input)) = assignment.split_once('=') else {
            bail!("--set expects ADDR=INPUT, got {assignment:?}");
        };
        doc.set_cell_from_address(address.trim(), input)
            .with_context(|| format!("Failed to set {}", address.trim()))?;
    }

    let mut code = ExitCode::SUCCESS;
    if let Some(formula) = &cli.command {
        let formula = if formula.starts_with('=') {
            formula.clone()
        } else {
            format!("={formula}")
        };
        let result = doc.evaluate(&formula);
        println!("{result}");
        if is_error(&result) {
            code = ExitCode::FAILURE;
        }
    }

    if let Some(path) = &cli.output {
        doc.save_as(path)
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
        eprintln!("Saved to {}", path.display());
    }

    let nothing_else = cli.command.is_none() && cli.output.is_none();
    if cli.print || nothing_else {
        let mut stdout = std::io::stdout().lock();
        render::write_markdown(&mut stdout, &doc)?;
        stdout.flush()?;
    }

    Ok(code)
}

fn open_document(file: Option<PathBuf>, settings: &config::Settings) -> Result<Document> {
    let mut doc = match &file {
        Some(path) if path.exists() => {
            let mut doc = Document::new();
            doc.load_file(path)
                .with_context(|| format!("Failed to open '{}'", path.display()))?;
            doc
        }
        _ => {
            let mut doc = Document::with_size(settings.rows, settings.cols);
            doc.file_path = file;
            doc
        }
    };
    doc.recalc_mode = settings.recalc;
    Ok(doc)
}

fn is_error(value: &str) -> bool {
    [ERROR_SENTINEL, NAME_SENTINEL, CHART_TYPE_SENTINEL, REF_SENTINEL].contains(&value)
}

fn print_functions() -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    let categories = [
        Category::Math,
        Category::Text,
        Category::DataQuality,
        Category::Conditional,
        Category::Chart,
    ];
    for category in categories {
        writeln!(stdout, "{}", category.label())?;
        for builtin in builtins().iter().filter(|b| b.category == category) {
            writeln!(
                stdout,
                "  {:<18} {:<40} {}",
                builtin.name, builtin.description, builtin.example
            )?;
        }
        writeln!(stdout)?;
    }
    Ok(())
}
