use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Audit the buildability of many repositories
#[derive(Parser, Debug)]
#[command(
    name = "buildscout",
    about = "Audit the buildability of many repositories",
    version,
    author,
    long_about = "buildscout clones repositories listed in a CSV file, classifies each one by \
                  its root-level build files and runs a configure, build and test cycle for \
                  the supported build systems (Meson and CMake). One JSON record per \
                  repository is appended to a results file."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Audit every repository listed in a CSV file",
        long_about = "Reads the repo_url column of the input CSV and, for each URL in order, \
                      clones the repository, detects its build system, runs the staged build \
                      and appends the result to the output file. The cloned tree is deleted \
                      after every build attempt.\n\n\
                      Examples:\n  \
                      buildscout run --csv repos.csv\n  \
                      buildscout run --csv repos.csv --workspace /tmp/ws --timeout 600 --jobs 8"
    )]
    Run(RunArgs),

    #[command(
        about = "Classify a local directory without building it",
        long_about = "Prints the detected build system and the marker files that matched. \
                      Nothing is executed and nothing is deleted.\n\n\
                      Examples:\n  \
                      buildscout detect\n  \
                      buildscout detect /path/to/repo --format json"
    )]
    Detect(DetectArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    #[arg(long, value_name = "FILE", help = "CSV file with a repo_url column")]
    pub csv: PathBuf,

    #[arg(
        long,
        value_name = "DIR",
        default_value = "workspace",
        help = "Directory that receives the clones"
    )]
    pub workspace: PathBuf,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        default_value = "results/results.jsonl",
        help = "Results file (JSON Lines, appended)"
    )]
    pub out: PathBuf,

    #[arg(
        long,
        value_name = "SECONDS",
        help = "Timeout for the clone and for each build step [env: BUILDSCOUT_TIMEOUT]"
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'j',
        long,
        value_name = "N",
        help = "Upper bound for build parallelism [env: BUILDSCOUT_MAX_JOBS]"
    )]
    pub jobs: Option<usize>,
}

#[derive(Parser, Debug, Clone)]
pub struct DetectArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to repository (defaults to current directory)"
    )]
    pub repository_path: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
