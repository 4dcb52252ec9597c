//! Gradebook CLI
//!
//! Loads a student file (and optionally a course file), prints the records
//! before and after a parallel sort by identifier, builds the grade index and
//! runs `COURSE:GRADE` queries against it.

use anyhow::Context;
use clap::Parser;
use gradebook::config::{generate_default_config, parse_delimiter, ConfigSearch, LoggingConfig};
use gradebook::report::{render_index_stats, render_matches, render_records, render_sort_stats};
use gradebook::{
    Catalog, Config, DelimitedImporter, GradeQuery, IdKind, IngestError, LoadSummary,
    OutputSink, ParallelSorter, ReportFormat,
};
use std::fmt::Display;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "gradebook")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sort student records in parallel and query grades by course")]
struct Cli {
    /// Student file: name, identifier, category, year (default: students.csv)
    input: Option<PathBuf>,

    /// Course file: identifier, course[, grade]
    #[arg(short, long)]
    courses: Option<PathBuf>,

    /// Worker threads for the sort
    #[arg(short, long)]
    workers: Option<usize>,

    /// Single-character field delimiter
    #[arg(short, long, value_parser = parse_delimiter)]
    delimiter: Option<char>,

    /// Identifier type
    #[arg(long, value_enum)]
    id_kind: Option<IdKind>,

    /// Grade query, repeatable (e.g. DSA:8 or 701:9)
    #[arg(short = 'q', long = "query", value_name = "COURSE:GRADE")]
    queries: Vec<GradeQuery>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<ReportFormat>,

    /// Config file (default: search standard locations)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a default config file and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", generate_default_config());
        return ExitCode::SUCCESS;
    }

    match try_main(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: Cli) -> anyhow::Result<ExitCode> {
    // The subscriber needs the config's level, so search results are
    // reported once it is installed
    let mut search = match &cli.config {
        Some(path) => ConfigSearch {
            config: Config::load_with_env(path)?,
            source: Some(path.clone()),
            skipped: Vec::new(),
        },
        None => Config::search(&Config::default_paths()),
    };

    // Command-line flags win over file and environment
    let config = &mut search.config;
    if let Some(input) = cli.input {
        config.input.path = input;
    }
    if let Some(courses) = cli.courses {
        config.input.courses = Some(courses);
    }
    if let Some(workers) = cli.workers {
        config.sort.workers = workers;
    }
    if let Some(delimiter) = cli.delimiter {
        config.input.delimiter = delimiter;
    }
    if let Some(id_kind) = cli.id_kind {
        config.input.id_kind = id_kind;
    }
    if let Some(format) = cli.format {
        config.report.format = format;
    }

    search.config.validate()?;
    init_logging(&search.config.logging);
    search.log();
    let config = search.config;

    let queries = if cli.queries.is_empty() {
        config
            .report
            .queries
            .iter()
            .map(|q| q.parse::<GradeQuery>())
            .collect::<Result<Vec<_>, _>>()?
    } else {
        cli.queries
    };

    tracing::debug!("Effective config: {:?}", config);

    match config.input.id_kind {
        IdKind::Numeric => run::<u64>(&config, &queries),
        IdKind::Text => run::<String>(&config, &queries),
    }
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("gradebook={}", logging.level)),
    );
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries the report; diagnostics go to stderr
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

/// Why a run stopped before sorting; both exit with status 1
#[derive(Debug, thiserror::Error)]
enum LoadFailure {
    #[error("No records loaded: {0}")]
    Unreadable(#[from] IngestError),

    #[error("No records loaded from {0:?}")]
    Empty(PathBuf),
}

/// Load the configured files, treating an empty catalog as a failure
fn load_catalog<Id>(config: &Config) -> Result<(Catalog<Id>, LoadSummary), LoadFailure>
where
    Id: Ord + FromStr,
{
    let importer = DelimitedImporter::new().with_delimiter(config.input.delimiter_byte());
    let (catalog, summary) =
        Catalog::<Id>::load(&importer, &config.input.path, config.input.courses.as_deref())?;

    if catalog.is_empty() {
        return Err(LoadFailure::Empty(config.input.path.clone()));
    }
    Ok((catalog, summary))
}

fn run<Id>(config: &Config, queries: &[GradeQuery]) -> anyhow::Result<ExitCode>
where
    Id: Ord + FromStr + Display + Send + Sync,
{
    let format = config.report.format;
    let table = format == ReportFormat::Table;
    let mut out = io::stdout();

    let (catalog, summary) = match load_catalog::<Id>(config) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    tracing::info!(
        records = summary.records,
        skipped = summary.student_lines_skipped,
        enrollments = summary.enrollments,
        grades = summary.grades,
        "Catalog loaded"
    );
    if table {
        writeln!(
            out,
            "Loaded {} records ({} lines skipped)",
            summary.records, summary.student_lines_skipped
        )?;
        if config.input.courses.is_some() {
            writeln!(
                out,
                "Applied {} enrollments and {} grades ({} lines skipped)",
                summary.enrollments, summary.grades, summary.course_lines_skipped
            )?;
        }
        writeln!(out)?;
    }

    render_records(&mut out, format, "Before sort", catalog.records())?;

    // Worker progress lines share stdout with the table; machine formats keep
    // stdout clean
    let sink = if table {
        OutputSink::stdout()
    } else {
        OutputSink::stderr()
    };
    let sorter = ParallelSorter::with_config(config.sort.clone()).with_sink(Arc::new(sink));
    let sorted = catalog
        .sorted_view(&sorter)
        .context("Parallel sort failed")?;

    render_records(&mut out, format, "After sort", &sorted.records)?;

    let index = catalog.grade_index();

    if table {
        writeln!(out)?;
        render_sort_stats(&mut out, &sorted.stats)?;
        render_index_stats(&mut out, &index.stats())?;
    }

    for query in queries {
        let matches = index.find(&query.course, query.min_grade);
        tracing::debug!("Query {} matched {} records", query, matches.len());
        if table {
            writeln!(out)?;
        }
        render_matches(&mut out, format, query, &matches)?;
    }

    out.flush()?;
    Ok(ExitCode::SUCCESS)
}
