//! # pricecast
//!
//! Reads one forecast request from stdin and writes one JSON result to
//! stdout. Logs go to stderr.

use clap::Parser;
use pricecast::config::{ModelFamily, PipelineConfig};
use pricecast::pipeline::Pipeline;
use pricecast::response::{ErrorResult, Outcome};
use pricecast::ForecastError;
use std::io::Read;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "pricecast")]
#[command(about = "Short-horizon price forecasting over stdin/stdout", long_about = None)]
struct Cli {
    /// Model family to run
    #[arg(short, long, value_enum, default_value_t = ModelFamily::Prophet)]
    model: ModelFamily,

    /// Seed for the synthetic series used when input is too short
    #[arg(long)]
    seed: Option<u64>,

    /// Skip the primary model and use the linear fallback only
    #[arg(long)]
    no_primary: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn pipeline_config(&self) -> PipelineConfig {
        let config = PipelineConfig::new(self.model).with_disable_primary(self.no_primary);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }

    fn default_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.default_filter());

    let config = cli.pipeline_config();
    let family = config.family;

    let mut input = String::new();
    let outcome = match std::io::stdin().read_to_string(&mut input) {
        Ok(_) => Pipeline::new(config).run(&input),
        Err(e) => {
            let error = ForecastError::MalformedInput(e.to_string());
            tracing::error!(%error, "failed to read stdin");
            Outcome::from(ErrorResult::from_error(&error, family.tag()))
        }
    };

    ExitCode::from(outcome.emit(std::io::stdout().lock()))
}
