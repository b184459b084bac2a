mod definition;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dashboard_report::builder::ReportBuilder;
use dashboard_report::config::ReportConfig;
use dashboard_report::data::{records_from_json, DataPoint};
use dashboard_report::export::{self, ExportFile, ExportFormat, ExportSection, PdfOptions};
use dashboard_report::format::NumberFormat;
use dashboard_report::rules::{LocalStorage, RulesClient, RulesViewer};

use crate::definition::ReportDefinition;

/// Exports dashboard data to CSV, XLSX and PDF, and lists chatbot rules.
///
/// JSON inputs are read from a file, or from stdin when the path is `-`.  Fonts are looked up
/// in `fonts_dir` from the configuration, then `DASHBOARD_REPORT_FONTS_DIR`, then
/// `assets/fonts`, then the system Liberation Sans / Arial families.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Configuration file (defaults to the platform config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for generated files, overriding the configuration.
    #[arg(long, short = 'o', global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a JSON array of records as CSV.
    Csv {
        /// JSON array of objects.
        input: PathBuf,
        /// Base filename; the date and extension are appended.
        #[arg(long, default_value = "export")]
        name: String,
    },

    /// Export a JSON array of records as an XLSX workbook.
    Xlsx {
        input: PathBuf,
        #[arg(long, default_value = "export")]
        name: String,
        /// Worksheet name (defaults to the file name).
        #[arg(long)]
        sheet: Option<String>,
    },

    /// Render a JSON array of records as a paginated PDF table.
    #[command(name = "pdf-table", aliases = ["pdf_table", "table"])]
    PdfTable {
        input: PathBuf,
        #[arg(long, default_value = "export")]
        name: String,
        /// Title printed above the table.
        #[arg(long, default_value = "Export")]
        title: String,
    },

    /// Render a JSON array of `{title, data}` sections as a multi-page dashboard PDF.
    Dashboard {
        input: PathBuf,
        #[arg(long, default_value = "dashboard")]
        name: String,
        #[arg(long, default_value = "Dashboard")]
        title: String,
    },

    /// Render a custom report described in JSON (cover, sections, KPIs, charts, tables).
    Report {
        input: PathBuf,
        #[arg(long, default_value = "report")]
        name: String,
    },

    /// Fetch and list the chatbot rules.
    Rules {
        /// Only fetch rules of this category.
        #[arg(long)]
        category: Option<String>,
        /// Case-insensitive filter over descriptions, patterns and categories.
        #[arg(long)]
        search: Option<String>,
        /// Print examples and SQL templates too.
        #[arg(long)]
        details: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        print_error_sources(&err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = ReportConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let output_dir = cli
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output_dir.clone());
    let today = export::today();

    match cli.command {
        Commands::Csv { input, name } => {
            let records = read_records(&input)?;
            let text = export::to_csv(&records)?;
            write(ExportFile::new(&name, ExportFormat::Csv, today, text.into_bytes()), &output_dir)
        }
        Commands::Xlsx { input, name, sheet } => {
            let records = read_records(&input)?;
            let bytes = export::to_xlsx(&records, sheet.as_deref().unwrap_or(&name))?;
            write(ExportFile::new(&name, ExportFormat::Xlsx, today, bytes), &output_dir)
        }
        Commands::PdfTable { input, name, title } => {
            let records = read_records(&input)?;
            let options = PdfOptions::new(title).with_config(&config).with_date(today);
            let pdf = export::to_pdf_table(&records, &options)?;
            write(ExportFile::new(&name, ExportFormat::Pdf, today, pdf.bytes), &output_dir)
        }
        Commands::Dashboard { input, name, title } => {
            let sections: Vec<ExportSection> = serde_json::from_str(&read_input(&input)?)
                .with_context(|| format!("parsing sections from {}", input.display()))?;
            let options = PdfOptions::new(title).with_config(&config).with_date(today);
            let pdf = export::to_dashboard_pdf(&sections, &options)?;
            write(ExportFile::new(&name, ExportFormat::Pdf, today, pdf.bytes), &output_dir)
        }
        Commands::Report { input, name } => {
            let definition: ReportDefinition = serde_json::from_str(&read_input(&input)?)
                .with_context(|| format!("parsing report definition from {}", input.display()))?;
            let format = NumberFormat::default();
            let builder = ReportBuilder::new()
                .with_fonts_dir(config.fonts_dir.clone())
                .with_margins_mm(config.margins_mm)
                .with_palette(config.palette())
                .with_format(format);
            let builder = definition.apply(builder, &format);

            #[cfg(feature = "bookmarks")]
            let pdf = builder.render_with_bookmarks()?;
            #[cfg(not(feature = "bookmarks"))]
            let pdf = builder.render()?;

            write(ExportFile::new(&name, ExportFormat::Pdf, today, pdf.bytes), &output_dir)
        }
        Commands::Rules {
            category,
            search,
            details,
        } => list_rules(&config, category, search, details).await,
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("reading stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }
}

fn read_records(path: &Path) -> Result<Vec<DataPoint>> {
    let records = records_from_json(&read_input(path)?)
        .with_context(|| format!("parsing records from {}", path.display()))?;
    tracing::debug!("read {} records from {}", records.len(), path.display());
    Ok(records)
}

fn write(file: ExportFile, output_dir: &Path) -> Result<()> {
    let path = file.write_to(output_dir)?;
    println!("{}", path.display());
    Ok(())
}

async fn list_rules(
    config: &ReportConfig,
    category: Option<String>,
    search: Option<String>,
    details: bool,
) -> Result<()> {
    let storage_path = config.storage_path();
    let storage = LocalStorage::load(&storage_path)
        .with_context(|| format!("reading {}", storage_path.display()))?;
    let client = RulesClient::from_storage(config.api_base_url.clone(), &storage)?;

    let mut viewer = RulesViewer::new();
    viewer.select_category(category);
    // The viewer swallows fetch errors; the command surfaces them instead.
    let response = client
        .fetch_rules(viewer.selected_category())
        .await
        .with_context(|| format!("fetching {}", client.rules_url()))?;
    viewer.set_response(response);
    if let Some(search) = search {
        viewer.set_search(search);
    }

    for (category, indices) in viewer.grouped() {
        println!("{category}");
        for index in indices {
            let rule = &viewer.rules()[index];
            println!("  - {}", rule.description);
            if !rule.patterns.is_empty() {
                println!("    patterns: {}", rule.patterns.join(", "));
            }
            if details {
                if !rule.example.is_empty() {
                    println!("    example: {}", rule.example);
                }
                if !rule.sql_template.is_empty() {
                    println!("    sql: {}", rule.sql_template);
                }
            }
        }
    }
    if viewer.filtered().is_empty() {
        println!("No rules match.");
    }
    Ok(())
}

fn print_error_sources(error: &anyhow::Error) {
    for source in error.chain().skip(1) {
        eprintln!("  caused by: {}", source);
    }
}
