use log::{debug, info};

use bolsa_votos::*;
use snafu::{prelude::*, Snafu};

use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::args::{Args, ChartFormat, MissingCandidate};
use crate::analysis::config_reader::*;
use crate::analysis::io_common::resolve_path;

pub mod charts;
pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_parquet;
pub mod report;

/// The steps of the analysis that work on the loaded tables.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Stage {
    Prepare,
    Margin,
    Ranking,
    Correlation,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Prepare => "preparation of the data",
            Stage::Margin => "national margin",
            Stage::Ranking => "reverse ranking",
            Stage::Correlation => "correlation",
        };
        write!(f, "{}", name)
    }
}

/// The class of an error, as reported to the user.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ErrorKind {
    DataLoad,
    DataShape,
    CandidateNotFound,
    CorrelationUndefined,
    Output,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::DataLoad => "DataLoadError",
            ErrorKind::DataShape => "DataShapeError",
            ErrorKind::CandidateNotFound => "CandidateNotFoundError",
            ErrorKind::CorrelationUndefined => "CorrelationUndefinedError",
            ErrorKind::Output => "OutputError",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AnalysisError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: u64,
    },
    #[snafu(display("Line {lineno} of {path} is too short: no value for column {column}"))]
    CsvLineTooShort {
        path: String,
        lineno: u64,
        column: String,
    },
    #[snafu(display("Line {lineno} of {path}: cannot read {value:?} as a number (column {column})"))]
    CsvNumber {
        path: String,
        lineno: u64,
        column: String,
        value: String,
    },
    #[snafu(display("Cannot read {value:?} as an amount in {path}"))]
    AmountParse { path: String, value: String },
    #[snafu(display("Unknown text encoding {label:?}"))]
    UnknownEncoding { label: String },
    #[snafu(display("Invalid delimiter {delimiter:?}: a single ASCII character is expected"))]
    InvalidDelimiter { delimiter: String },
    #[snafu(display("Error reading parquet file {path}"))]
    ParquetRead {
        source: parquet::errors::ParquetError,
        path: String,
    },
    #[snafu(display("Error reading the columns of {path}"))]
    ArrowRead {
        source: arrow::error::ArrowError,
        path: String,
    },
    #[snafu(display("Error opening configuration file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing configuration file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("No {table} file: use --{table} or the configuration file"))]
    MissingSource { table: String },
    #[snafu(display("Unknown value {value:?} for option {option}"))]
    InvalidOption { option: String, value: String },

    #[snafu(display("Column {column} not found in {path}"))]
    MissingColumn { column: String, path: String },
    #[snafu(display("Column {column} of {path} has an unsupported type: {data_type}"))]
    UnsupportedColumnType {
        column: String,
        path: String,
        data_type: String,
    },

    #[snafu(display("Step failed: {stage}"))]
    StageFailed {
        stage: Stage,
        source: AnalysisErrors,
    },

    #[snafu(display("Error creating directory {path}"))]
    CreatingDirectory {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error rendering chart {path}: {message}"))]
    ChartRendering { path: String, message: String },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error serializing the summary"))]
    SerializingSummary { source: serde_json::Error },
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::MissingColumn { .. } | AnalysisError::UnsupportedColumnType { .. } => {
                ErrorKind::DataShape
            }
            AnalysisError::StageFailed { source, .. } => match source {
                AnalysisErrors::DataShape { .. } => ErrorKind::DataShape,
                AnalysisErrors::CandidateNotFound { .. } => ErrorKind::CandidateNotFound,
                AnalysisErrors::CorrelationUndefined { .. } => ErrorKind::CorrelationUndefined,
            },
            AnalysisError::CreatingDirectory { .. }
            | AnalysisError::ChartRendering { .. }
            | AnalysisError::WritingSummary { .. }
            | AnalysisError::SerializingSummary { .. } => ErrorKind::Output,
            _ => ErrorKind::DataLoad,
        }
    }
}

pub type BAResult<T> = Result<T, Box<AnalysisError>>;

#[derive(Debug, Clone)]
pub struct ChartSettings {
    pub directory: PathBuf,
    pub format: ChartFormat,
}

/// Everything needed for one run, after merging the command line and the configuration
/// file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub votes: FileSource,
    pub welfare: FileSource,
    pub rules: AnalysisRules,
    pub charts: Option<ChartSettings>,
    pub out: Option<String>,
}

/// The results of all the steps.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub rows: Vec<JoinedRow>,
    pub summary: NationalSummary,
    pub margin: MarginReport,
    pub ranking: StateRanking,
    pub correlations: BTreeMap<String, f64>,
}

impl Analysis {
    /// The rows of the candidate, with the most votes first.
    pub fn candidate_rows(&self, selector: &CandidateSelector) -> Vec<&JoinedRow> {
        let mut res: Vec<&JoinedRow> = self
            .rows
            .iter()
            .filter(|r| selector.matches(&r.candidate))
            .collect();
        res.sort_by(|r1, r2| r2.votes.cmp(&r1.votes).then_with(|| r1.state.cmp(&r2.state)));
        res
    }

    /// The total paid in each state, largest first.
    pub fn welfare_by_state(&self) -> Vec<(String, f64)> {
        let by_state: BTreeMap<&str, f64> = self
            .rows
            .iter()
            .map(|r| (r.state.as_str(), r.amount))
            .collect();
        let mut res: Vec<(String, f64)> = by_state
            .into_iter()
            .map(|(s, a)| (s.to_string(), a))
            .collect();
        res.sort_by(|(s1, a1), (s2, a2)| a2.total_cmp(a1).then_with(|| s1.cmp(s2)));
        res
    }
}

fn pick_source(
    cli_path: &Option<String>,
    configured: &Option<FileSource>,
    root: Option<&Path>,
    table: &str,
) -> BAResult<FileSource> {
    match (cli_path, configured) {
        (Some(p), Some(cfs)) => Ok(FileSource {
            file_path: p.clone(),
            ..cfs.clone()
        }),
        (Some(p), None) => Ok(FileSource::new(p)),
        (None, Some(cfs)) => Ok(FileSource {
            file_path: resolve_path(root, &cfs.file_path),
            ..cfs.clone()
        }),
        (None, None) => Err(Box::new(MissingSourceSnafu { table }.build())),
    }
}

/// Merges the command line arguments with the configuration file, if any.
///
/// Paths given on the command line are used as is, paths of the configuration file
/// are relative to the directory of that file.
pub fn resolve_settings(args: &Args) -> BAResult<Settings> {
    let (config, root): (AnalysisConfig, Option<PathBuf>) = match &args.config {
        Some(p) => {
            let config = read_config(p)?;
            (config, Path::new(p).parent().map(|d| d.to_path_buf()))
        }
        None => (AnalysisConfig::default(), None),
    };
    debug!("resolve_settings: config: {:?}", config);
    let root_p = root.as_deref();

    let votes = pick_source(&args.votes, &config.sources.votes, root_p, "votes")?;
    let mut welfare = pick_source(&args.welfare, &config.sources.welfare, root_p, "welfare")?;
    if let Some(p) = &args.welfare_type {
        welfare.provider = Some(p.clone());
    }

    let mut rules = config.rules.to_rules()?;
    if let Some(mc) = args.missing_candidate {
        rules.missing_candidate_policy = match mc {
            MissingCandidate::DropState => MissingCandidatePolicy::DropState,
            MissingCandidate::TreatAsZero => MissingCandidatePolicy::TreatAsZero,
        };
    }

    let render_charts = !args.no_charts && config.output.render_charts.unwrap_or(true);
    let charts = if render_charts {
        let directory = match (&args.charts_dir, &config.output.charts_directory) {
            (Some(d), _) => PathBuf::from(d),
            (None, Some(d)) => PathBuf::from(resolve_path(root_p, d)),
            (None, None) => PathBuf::from("charts"),
        };
        let format = match args.chart_format {
            Some(f) => f,
            None => config.output.chart_format()?,
        };
        Some(ChartSettings { directory, format })
    } else {
        None
    };

    Ok(Settings {
        votes,
        welfare,
        rules,
        charts,
        out: args.out.clone(),
    })
}

fn timed<T>(step: &str, f: impl FnOnce() -> T) -> T {
    info!("{}...", step);
    let start = Instant::now();
    let res = f();
    info!("{}: done in {:?}", step, start.elapsed());
    res
}

fn load_data(settings: &Settings) -> BAResult<(Vec<RawVoteRecord>, Vec<RawWelfareRecord>)> {
    let votes = match settings.votes.provider("votes")? {
        Provider::Csv => io_csv::read_votes_csv(&settings.votes)?,
        Provider::Parquet => {
            return Err(Box::new(
                InvalidOptionSnafu {
                    option: "sources.votes.provider",
                    value: "parquet",
                }
                .build(),
            ))
        }
    };
    let welfare = match settings.welfare.provider("welfare")? {
        Provider::Csv => io_csv::read_welfare_csv(&settings.welfare)?,
        Provider::Parquet => io_parquet::read_welfare_parquet(&settings.welfare)?,
    };
    info!(
        "Loaded {:?} vote records and {:?} welfare records",
        votes.len(),
        welfare.len()
    );
    Ok((votes, welfare))
}

/// Runs all the steps, from the files to the correlations.
pub fn run_analysis(settings: &Settings) -> BAResult<Analysis> {
    let rules = &settings.rules;
    let (votes, welfare) = timed("Loading data", || load_data(settings))?;

    let rows = timed("Preparing data", || {
        prepare(&votes, &welfare, rules).context(StageFailedSnafu {
            stage: Stage::Prepare,
        })
    })?;
    // The raw tables are not needed past this point.
    drop(votes);
    drop(welfare);

    let (summary, margin) = timed("Totalling national votes", || {
        let summary = summarize(&rows);
        margin_report(&summary, rules)
            .map(|m| (summary, m))
            .context(StageFailedSnafu {
                stage: Stage::Margin,
            })
    })?;

    let ranking = timed("Ranking states", || {
        rank_states(&rows, rules).context(StageFailedSnafu {
            stage: Stage::Ranking,
        })
    })?;

    let correlations = timed("Correlating votes and payments", || {
        correlate(&rows).context(StageFailedSnafu {
            stage: Stage::Correlation,
        })
    })?;

    Ok(Analysis {
        rows,
        summary,
        margin,
        ranking,
        correlations,
    })
}

/// The whole program: analysis, console report, charts and JSON summary.
pub fn run_command(args: &Args) -> BAResult<()> {
    let settings = resolve_settings(args)?;
    info!("settings: {:?}", settings);

    let analysis = run_analysis(&settings)?;
    report::print_report(&analysis, &settings.rules);

    if let Some(chart_settings) = &settings.charts {
        let paths = timed("Rendering charts", || {
            charts::render_charts(&analysis, &settings.rules, chart_settings)
        })?;
        for p in paths {
            info!("Chart written to {}", p.display());
        }
    }

    if let Some(out) = &settings.out {
        let js = report::summary_to_json(&analysis, &settings.rules);
        report::write_summary(&js, out)?;
    }
    Ok(())
}
