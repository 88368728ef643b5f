//! Query and explore historical space-launch records.
//!
//! The library loads a delimited launch table into an immutable
//! [`store::Dataset`], then answers read-only questions about it through
//! [`analytics`]. The `atlas` binary is a thin CLI over the same functions.

pub mod analytics;
pub mod config;
pub mod model;
pub mod store;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::{Value, json};

use crate::analytics::bucketing::parse_query_date;
use crate::analytics::{ExploreError, RecordFilter, Severity};
use crate::config::{AtlasConfig, ConfigError};
use crate::model::{Column, UnknownColumn};
use crate::store::{Dataset, LoadError, MissionStore};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser, Debug, Clone)]
#[command(
    name = "atlas",
    version,
    about = "Query and explore historical space-launch records"
)]
pub struct Cli {
    /// Launch table to load (overrides config and ATLAS_DATA).
    #[arg(long, global = true, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Config file to read instead of the default location.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long, global = true, alias = "robot")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Number of launches by a company
    Count { company: String },
    /// Percentage of a company's launches that succeeded
    SuccessRate { company: String },
    /// Missions launched between two YYYY-MM-DD dates, inclusive
    Range { start: String, end: String },
    /// Companies with the most launches
    Top {
        #[arg(allow_hyphen_values = true)]
        n: String,
    },
    /// Launch count per mission status
    Status,
    /// Launches in one calendar year
    Year {
        #[arg(allow_hyphen_values = true)]
        year: String,
    },
    /// Most frequently used rocket
    Rocket,
    /// Average launches per year over an inclusive year range
    Average {
        #[arg(allow_hyphen_values = true)]
        start: String,
        #[arg(allow_hyphen_values = true)]
        end: String,
    },
    /// Launches per country
    Countries,
    /// Launches per year for the most active companies
    Activity {
        /// Number of companies (defaults to config heatmap_top_n)
        #[arg(long, allow_hyphen_values = true)]
        top: Option<String>,
    },
    /// Value distribution of one column
    Histogram {
        column: String,
        /// Company/Rocket bins need more launches than this
        #[arg(long)]
        min_count: Option<u64>,
    },
    /// List records matching column values and a date window
    Filter {
        #[arg(long)]
        column: Option<String>,
        #[arg(long = "value")]
        values: Vec<String>,
        #[arg(long)]
        since: Option<String>,
        #[arg(long)]
        until: Option<String>,
    },
    /// Earliest and latest launch dates
    Bounds,
    /// Check dataset invariants
    Validate,
}

/// Parsed command line, ready to run.
#[derive(Debug, Clone)]
pub struct ParsedCli {
    pub cli: Cli,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error surfaced to the user, with a stable exit code and kind.
#[derive(Debug, Clone)]
pub struct CliError {
    pub code: i32,
    pub kind: &'static str,
    pub message: String,
    pub hint: Option<String>,
    pub retryable: bool,
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self {
            code: 2,
            kind: "usage",
            message: message.into(),
            hint: Some("run `atlas --help` for usage".into()),
            retryable: false,
        }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

impl From<LoadError> for CliError {
    fn from(err: LoadError) -> Self {
        let (code, hint) = match &err {
            LoadError::NotFound { .. } => (3, "pass --data <PATH> or set ATLAS_DATA"),
            LoadError::MissingColumns { .. } => (
                4,
                "the header must include Company, Location, Date, Time, Rocket, Mission, RocketStatus, Price, MissionStatus",
            ),
            LoadError::Io { .. } => (6, "check file permissions"),
            LoadError::Malformed(_) => (6, "check the delimiter setting and file encoding"),
        };
        Self {
            code,
            kind: err.kind(),
            message: err.to_string(),
            hint: Some(hint.into()),
            retryable: matches!(err, LoadError::Io { .. }),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self {
            code: 5,
            kind: "config",
            message: err.to_string(),
            hint: None,
            retryable: false,
        }
    }
}

impl From<ExploreError> for CliError {
    fn from(err: ExploreError) -> Self {
        let supported: Vec<&str> = analytics::HISTOGRAM_COLUMNS
            .iter()
            .map(|c| c.header())
            .collect();
        Self {
            code: 7,
            kind: "unsupported-column",
            message: err.to_string(),
            hint: Some(format!("supported columns: {}", supported.join(", "))),
            retryable: false,
        }
    }
}

impl From<UnknownColumn> for CliError {
    fn from(err: UnknownColumn) -> Self {
        Self {
            code: 7,
            kind: "unsupported-column",
            message: err.to_string(),
            hint: None,
            retryable: false,
        }
        .with_hint(format!(
            "columns: {}",
            Column::REQUIRED.map(|c| c.header()).join(", ")
        ))
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Parse raw arguments (including the program name).
///
/// `--help` and `--version` print and exit here.
pub fn parse_cli<I, T>(args: I) -> Result<ParsedCli, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(ParsedCli { cli }),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                err.exit()
            }
            _ => Err(CliError::usage(err.to_string().trim_end())),
        },
    }
}

/// Install the stderr `tracing` subscriber. Later calls are no-ops.
pub fn init_tracing(filter: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Resolve configuration: file, then environment, then flags.
pub fn resolve_config(cli: &Cli) -> Result<AtlasConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) if !path.exists() => {
            return Err(CliError {
                code: 5,
                kind: "config",
                message: format!("config file not found: {}", path.display()),
                hint: None,
                retryable: false,
            });
        }
        Some(path) => AtlasConfig::load_from(path)?,
        None => match AtlasConfig::config_path() {
            Ok(path) => AtlasConfig::load_from(&path)?,
            Err(ConfigError::NoConfigDir) => AtlasConfig::default(),
            Err(other) => return Err(other.into()),
        },
    };
    config.apply_env(|key| std::env::var(key).ok());
    if let Some(data) = &cli.data {
        config.data_path = data.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Load the dataset and run the parsed command, printing its output.
pub fn run_with_parsed(parsed: ParsedCli) -> Result<(), CliError> {
    let config = resolve_config(&parsed.cli)?;
    init_tracing(&config.log_filter);

    let store = MissionStore::open(&config.data_path, config.load_options()?)?;
    let dataset = store.snapshot();
    let output = execute(&parsed.cli.command, &dataset, &config)?;

    if parsed.cli.json {
        println!("{}", output.json);
    } else {
        println!("{}", output.text);
    }

    match output.failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Command execution
// ---------------------------------------------------------------------------

/// Rendered result of one command.
pub struct CommandOutput {
    pub json: Value,
    pub text: String,
    /// Set when the command printed a result but must still exit non-zero.
    pub failure: Option<CliError>,
}

impl CommandOutput {
    fn new(json: Value, text: String) -> Self {
        Self {
            json,
            text,
            failure: None,
        }
    }
}

/// Integer arguments arrive as text; anything that is not an integer maps to
/// the query's empty result rather than a usage error.
fn int_arg(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

fn date_flag(raw: Option<&str>, flag: &str) -> Result<Option<chrono::NaiveDate>, CliError> {
    match raw {
        None => Ok(None),
        Some(text) => parse_query_date(text)
            .map(Some)
            .ok_or_else(|| CliError::usage(format!("--{flag} expects YYYY-MM-DD, got '{text}'"))),
    }
}

fn ranked_text(title: &str, rows: &[(String, u64)]) -> String {
    let mut out = format!("{}", title.bold());
    for (key, count) in rows {
        out.push_str(&format!("\n  {count:>6}  {key}"));
    }
    out
}

/// Run one command against `dataset`.
pub fn execute(
    command: &Commands,
    dataset: &Dataset,
    config: &AtlasConfig,
) -> Result<CommandOutput, CliError> {
    use analytics::*;

    let started = std::time::Instant::now();
    let output = match command {
        Commands::Count { company } => {
            let n = mission_count_by_company(dataset, company);
            CommandOutput::new(
                json!({ "company": company, "missions": n }),
                format!("{company}: {n} missions"),
            )
        }
        Commands::SuccessRate { company } => {
            let rate = success_rate_with(dataset, company, config.success_rule);
            CommandOutput::new(
                json!({
                    "company": company,
                    "success_rate": rate,
                    "rule": config.success_rule.to_string(),
                }),
                format!("{company}: {rate:.2}% success"),
            )
        }
        Commands::Range { start, end } => {
            let missions = missions_by_date_range(dataset, start, end);
            let text = if missions.is_empty() {
                format!("no missions between {start} and {end}")
            } else {
                missions.join("\n")
            };
            CommandOutput::new(
                json!({
                    "start": start,
                    "end": end,
                    "count": missions.len(),
                    "missions": missions,
                }),
                text,
            )
        }
        Commands::Top { n } => {
            let top = int_arg(n)
                .map(|n| top_companies_by_mission_count(dataset, n))
                .unwrap_or_default();
            let rows: Vec<Value> = top
                .iter()
                .map(|(company, count)| json!({ "company": company, "missions": count }))
                .collect();
            CommandOutput::new(
                json!({ "n": n, "companies": rows }),
                ranked_text("Top companies by launches", &top),
            )
        }
        Commands::Status => {
            let counts = mission_status_count(dataset);
            let total: u64 = counts.values().sum();
            let mut rows: Vec<(String, u64)> =
                counts.iter().map(|(k, v)| (k.clone(), *v)).collect();
            rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            CommandOutput::new(
                json!({ "statuses": counts, "total": total }),
                ranked_text("Launches by mission status", &rows),
            )
        }
        Commands::Year { year } => {
            let n = int_arg(year).map_or(0, |y| missions_by_year(dataset, y));
            CommandOutput::new(
                json!({ "year": year, "missions": n }),
                format!("{year}: {n} missions"),
            )
        }
        Commands::Rocket => {
            let rocket = most_used_rocket(dataset);
            CommandOutput::new(json!({ "rocket": rocket }), rocket)
        }
        Commands::Average { start, end } => {
            let avg = match (int_arg(start), int_arg(end)) {
                (Some(s), Some(e)) => average_missions_per_year(dataset, s, e),
                _ => 0.0,
            };
            CommandOutput::new(
                json!({ "start": start, "end": end, "average": avg }),
                format!("{start}..={end}: {avg:.2} missions per year"),
            )
        }
        Commands::Countries => {
            let countries = missions_by_country(dataset);
            let rows: Vec<Value> = countries
                .iter()
                .map(|(country, count)| json!({ "country": country, "missions": count }))
                .collect();
            CommandOutput::new(
                json!({ "countries": rows }),
                ranked_text("Launches by country", &countries),
            )
        }
        Commands::Activity { top } => {
            let top_n = match top {
                Some(raw) => int_arg(raw).unwrap_or(0),
                None => config.heatmap_top_n,
            };
            let matrix = company_activity(dataset, top_n);
            let mut text = format!("{}", "Company activity by year".bold());
            for row in &matrix.rows {
                let active: Vec<String> = matrix
                    .years
                    .iter()
                    .zip(&row.per_year)
                    .filter(|(_, n)| **n > 0)
                    .map(|(y, n)| format!("{y}:{n}"))
                    .collect();
                text.push_str(&format!(
                    "\n  {:>6}  {}  [{}]",
                    row.total,
                    row.company,
                    active.join(" ")
                ));
            }
            CommandOutput::new(json!(matrix), text)
        }
        Commands::Histogram { column, min_count } => {
            let column: Column = column.parse()?;
            let hist = histogram(
                dataset,
                column,
                min_count.unwrap_or(config.histogram_min_count),
            )?;
            let rows: Vec<(String, u64)> = hist
                .bins
                .iter()
                .map(|b| (b.label.clone(), b.count))
                .collect();
            let text = ranked_text(&hist.title, &rows);
            CommandOutput::new(json!(hist), text)
        }
        Commands::Filter {
            column,
            values,
            since,
            until,
        } => {
            let column = column.as_deref().map(str::parse::<Column>).transpose()?;
            let filter = RecordFilter {
                column,
                values: values.clone(),
                since: date_flag(since.as_deref(), "since")?,
                until: date_flag(until.as_deref(), "until")?,
            };
            let records = filter_records(dataset, &filter);
            let text = records
                .iter()
                .map(|r| format!("{}  {:<24}  {}  [{}]", r.date, r.company, r.mission, r.mission_status))
                .collect::<Vec<_>>()
                .join("\n");
            CommandOutput::new(
                json!({ "count": records.len(), "records": records }),
                text,
            )
        }
        Commands::Bounds => match date_bounds(dataset) {
            Some((earliest, latest)) => CommandOutput::new(
                json!({ "earliest": earliest, "latest": latest }),
                format!("{earliest} .. {latest}"),
            ),
            None => CommandOutput::new(
                json!({ "earliest": null, "latest": null }),
                "dataset is empty".to_string(),
            ),
        },
        Commands::Validate => {
            let report = run_validation(dataset);
            let mut text = String::new();
            for check in &report.checks {
                let mark = match (check.ok, check.severity) {
                    (true, _) => "ok".green(),
                    (false, Severity::Error) => "FAIL".red(),
                    (false, _) => "warn".yellow(),
                };
                text.push_str(&format!("[{mark}] {}: {}\n", check.id, check.details));
            }
            let errors = report.count_failures(Severity::Error);
            let mut output = CommandOutput::new(report.to_json(), text.trim_end().to_string());
            if errors > 0 {
                output.failure = Some(CliError {
                    code: 4,
                    kind: "data-validation",
                    message: format!("{errors} validation checks failed"),
                    hint: None,
                    retryable: false,
                });
            }
            output
        }
    };
    tracing::debug!(
        ?command,
        elapsed_us = started.elapsed().as_micros() as u64,
        "query finished"
    );
    Ok(output)
}
