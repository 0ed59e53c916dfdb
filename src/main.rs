use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use proquest_results::aggregate::{InputSource, QueryIndex, ResultSet};
use proquest_results::config::{
    find_config_file, get_config, load_config, Config, LogFormat, LoggingConfig, CONFIG_FILE_NAME,
};
use proquest_results::document::ProQuestDocument;
use proquest_results::models::ResultRecord;
use proquest_results::utils::timestamped_path;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// ProQuest Results - Turn saved ProQuest search-result pages into a CSV dataset
#[derive(Parser, Debug)]
#[command(name = "proquest-results")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract bibliographic records from saved ProQuest search-result pages", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the query and records of one saved result page
    #[command(alias = "p")]
    Parse {
        /// Saved result page
        file: PathBuf,
    },

    /// Aggregate result pages and write them to a timestamped CSV file
    #[command(alias = "e")]
    Export {
        /// Directory of saved result pages (repeatable)
        #[arg(long = "dir", short = 'd', conflicts_with = "files")]
        dirs: Vec<PathBuf>,

        /// Saved result page (repeatable)
        #[arg(long = "file", short = 'f')]
        files: Vec<PathBuf>,

        /// Save-file template (default from configuration)
        #[arg(long, short)]
        savefile: Option<PathBuf>,

        /// Keep exact duplicate rows
        #[arg(long)]
        keep_duplicates: bool,

        /// Parse pages in parallel
        #[arg(long)]
        parallel: bool,
    },

    /// Show which pages were produced by which query
    #[command(alias = "q")]
    Queries {
        /// Directory of saved result pages (repeatable)
        #[arg(long = "dir", short = 'd', conflicts_with = "files")]
        dirs: Vec<PathBuf>,

        /// Saved result page (repeatable)
        #[arg(long = "file", short = 'f')]
        files: Vec<PathBuf>,
    },

    /// Write a configuration file with default settings
    InitConfig {
        /// Destination (default: ./proquest-results.toml)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration from file if specified or found in default locations
    let config_path = cli.config.clone().or_else(find_config_file);
    let config = match &config_path {
        Some(path) => load_config(path)?,
        None => get_config()?,
    };

    init_tracing(&cli, &config.logging);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    let format = resolve_format(cli.output);

    match cli.command {
        Commands::Parse { file } => {
            let document = ProQuestDocument::open_with(&file, &config.parse)?;
            output_document(&document, format)?;
        }

        Commands::Export {
            dirs,
            files,
            savefile,
            keep_duplicates,
            parallel,
        } => {
            let source = input_source(dirs, files, &config.output.source_directory);
            let mut options = config.parse.clone();
            options.parallel |= parallel;

            let set = ResultSet::new(source, options)?;
            let Some(table) = set.table()? else {
                tracing::warn!("No results found in {} files", set.files().len());
                return Ok(());
            };

            let mut table = table.clone();
            if config.output.remove_duplicates && !keep_duplicates {
                let removed = table.drop_duplicates();
                tracing::info!(
                    "Total results (after duplicates removed): {} ({} removed)",
                    table.len(),
                    removed
                );
            }

            let template = savefile.unwrap_or_else(|| config.output.savefile.clone());
            let path = timestamped_path(&template, Local::now().naive_local());
            table.save_csv(&path)?;

            if !cli.quiet {
                println!("{}", path.display());
            }
        }

        Commands::Queries { dirs, files } => {
            let source = input_source(dirs, files, &config.output.source_directory);
            let set = ResultSet::new(source, config.parse.clone())?;
            output_queries(set.query_to_files()?, format)?;
        }

        Commands::InitConfig { path, force } => {
            let path = path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists, use --force to overwrite",
                    path.display()
                );
            }
            Config::default().save(&path)?;
            if !cli.quiet {
                println!("Wrote default configuration to {}", path.display());
            }
        }
    }

    Ok(())
}

/// Initialize tracing based on verbosity and the logging configuration
fn init_tracing(cli: &Cli, logging: &LoggingConfig) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("proquest_results={}", level)),
    );
    let registry = tracing_subscriber::registry().with(env_filter);

    match logging.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

/// Build the input source from command-line arguments
///
/// Falls back to the configured source directory when nothing is given.
fn input_source(dirs: Vec<PathBuf>, files: Vec<PathBuf>, default_dir: &Path) -> InputSource {
    if !files.is_empty() {
        return InputSource::Files(files);
    }

    let mut dirs = dirs;
    match dirs.len() {
        0 => InputSource::directory(default_dir),
        1 => InputSource::Directory(dirs.remove(0)),
        _ => InputSource::Directories(dirs),
    }
}

fn resolve_format(format: OutputFormat) -> OutputFormat {
    if format == OutputFormat::Auto {
        if std::io::stdout().is_terminal() {
            OutputFormat::Table
        } else {
            OutputFormat::Json
        }
    } else {
        format
    }
}

fn output_document(document: &ProQuestDocument, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "file": document.path(),
                "query": document.query(),
                "results": document.results(),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Plain => {
            println!("Query: {}", document.query());
            println!("Results: {}", document.len());
            println!();
            for record in document.results() {
                output_plain(record);
            }
        }
        OutputFormat::Table | OutputFormat::Auto => {
            println!("Query: {} ({} results)", document.query(), document.len());
            output_table(document.results());
        }
    }
    Ok(())
}

fn output_plain(record: &ResultRecord) {
    let author = record.author.as_deref().unwrap_or("-");
    println!("{} - {}", record.title, author);
    if let Some(publication) = &record.publication {
        println!(
            "  {} Vol. {}, Iss. {} ({}): {}",
            publication,
            record.vol.as_deref().unwrap_or("?"),
            record.issue.as_deref().unwrap_or("?"),
            record.full_date.as_deref().unwrap_or("?"),
            record.pages.as_deref().unwrap_or("?")
        );
    }
    println!("  Fulltext: {}", record.link_details);
    println!("  PDF: {}", record.link_pdf);
    if record.ad {
        println!("  (probably an advertisement)");
    }
    println!();
}

fn output_table(records: &[ResultRecord]) {
    use comfy_table::{Attribute, Cell, Table};
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Title", "Author", "Publication", "Date", "Pages", "Ad"]);

    for record in records {
        table.add_row(vec![
            Cell::new(truncate(&record.title, 50)).add_attribute(Attribute::Bold),
            Cell::new(truncate(record.author.as_deref().unwrap_or(""), 30)),
            Cell::new(truncate(record.publication.as_deref().unwrap_or(""), 30)),
            Cell::new(record.full_date.as_deref().unwrap_or("")),
            Cell::new(record.pages.as_deref().unwrap_or("")),
            Cell::new(if record.ad { "yes" } else { "" }),
        ]);
    }
    println!("{table}");
}

/// Print the query index in document order
fn output_queries(index: &QueryIndex, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(index)?);
        }
        OutputFormat::Plain => {
            for (query, files) in index.iter() {
                println!("{}", query);
                for file in files {
                    println!("  {}", file.display());
                }
            }
        }
        OutputFormat::Table | OutputFormat::Auto => {
            use comfy_table::{Attribute, Cell, Table};
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["Query", "Files"]);

            for (query, files) in index.iter() {
                let files: Vec<String> = files
                    .iter()
                    .map(|f| f.display().to_string())
                    .collect();
                table.add_row(vec![
                    Cell::new(truncate(query, 60)).add_attribute(Attribute::Bold),
                    Cell::new(files.join("\n")),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}

/// Shorten text to `max` characters, marking the cut with "..."
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}
