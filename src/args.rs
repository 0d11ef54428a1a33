use clap::Parser;

#[derive(clap::ValueEnum, Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChartFormat {
    Svg,
    Png,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Eq, PartialEq)]
pub enum MissingCandidate {
    DropState,
    TreatAsZero,
}

/// This program compares the results of the 2022 presidential runoff with the payments
/// of the Bolsa Família program, state by state.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The configuration of the analysis, in JSON format.
    /// All the other options take precedence over the content of this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The results by voting section, in CSV format.
    #[clap(long, value_parser)]
    pub votes: Option<String>,

    /// (file path) The welfare payments.
    #[clap(long, value_parser)]
    pub welfare: Option<String>,

    /// (csv or parquet) The type of the welfare file. Guessed from the extension by default.
    #[clap(long, value_parser)]
    pub welfare_type: Option<String>,

    /// (directory, default charts) Where the charts are written.
    #[clap(long, value_parser)]
    pub charts_dir: Option<String>,

    /// (default svg) The format of the charts.
    #[clap(long, value_enum)]
    pub chart_format: Option<ChartFormat>,

    /// If passed as an argument, no chart will be rendered.
    #[clap(long, takes_value = false)]
    pub no_charts: bool,

    /// (file path or 'stdout') If specified, the results will be written in JSON format to the given
    /// location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (default drop-state) What to do with a state where one of the two candidates has no votes.
    #[clap(long, value_enum)]
    pub missing_candidate: Option<MissingCandidate>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
