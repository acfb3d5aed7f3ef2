use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use nold_contracts::listing::ListingRecord;
use nold_contracts::prompt::DEFAULT_PROMPT;
use nold_engine::{
    load_image, missing_fields, CategorizeError, Categorizer, CategorizerConfig,
    ChatCompletionClient, Submission, SubmissionReport,
};
use serde::Serialize;
use tracing::debug;

const EXIT_FAILURE: i32 = 1;
const EXIT_INVALID_INPUT: i32 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "nold",
    version,
    about = "Categorize second-hand fashion listings from photos"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send photos to the vision model and print the listing.
    Submit(SubmitArgs),
    /// Print the default instruction prompt.
    Prompt,
}

#[derive(Debug, Args)]
struct SubmitArgs {
    /// Item photo (jpg, jpeg or png). Repeat for several photos.
    #[arg(long = "image", value_name = "PATH")]
    images: Vec<PathBuf>,
    /// Falls back to OPENAI_API_KEY.
    #[arg(long)]
    api_key: Option<String>,
    #[arg(long, conflicts_with = "prompt_file")]
    prompt: Option<String>,
    #[arg(long, value_name = "PATH")]
    prompt_file: Option<PathBuf>,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    max_tokens: Option<u64>,
    #[arg(long, value_name = "DIR")]
    responses_dir: Option<PathBuf>,
    /// Print a JSON report instead of the rendered listing.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    listing: Option<&'a ListingRecord>,
    parse_error: Option<&'a str>,
    total_tokens: u64,
    cost_usd: f64,
    response_log: Option<String>,
}

impl<'a> JsonReport<'a> {
    fn new(report: &'a SubmissionReport) -> Self {
        Self {
            listing: report.listing.record(),
            parse_error: report.listing.parse_error(),
            total_tokens: report.total_tokens,
            cost_usd: report.cost_usd,
            response_log: report
                .response_log
                .as_ref()
                .map(|path| path.display().to_string()),
        }
    }
}

fn main() {
    init_tracing();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("nold error: {err:#}");
            std::process::exit(EXIT_FAILURE);
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Submit(args) => run_submit(args),
        Command::Prompt => {
            print!("{DEFAULT_PROMPT}");
            Ok(0)
        }
    }
}

fn run_submit(args: SubmitArgs) -> Result<i32> {
    let config = submit_config(&args, CategorizerConfig::from_env());
    let prompt = resolve_prompt(&args)?;
    let credential = args
        .api_key
        .clone()
        .or_else(openai_api_key)
        .unwrap_or_default();
    debug!(
        images = args.images.len(),
        responses_dir = %config.responses_dir.display(),
        "starting submission"
    );

    let mut categorizer = Categorizer::from_config(config);
    let outcome = submit_paths(&mut categorizer, credential, prompt, &args.images)?;
    report_outcome(
        outcome,
        args.json,
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    )
}

// Missing inputs are rejected before any image file is opened.
fn submit_paths<C: ChatCompletionClient>(
    categorizer: &mut Categorizer<C>,
    credential: String,
    prompt: String,
    paths: &[PathBuf],
) -> Result<Result<SubmissionReport, CategorizeError>> {
    let missing = missing_fields(&credential, paths.len());
    if !missing.is_empty() {
        return Ok(Err(CategorizeError::Validation { missing }));
    }
    let images = paths
        .iter()
        .map(|path| load_image(path))
        .collect::<Result<Vec<_>>>()?;
    Ok(categorizer.submit(&Submission {
        credential,
        prompt,
        images,
    }))
}

fn report_outcome(
    outcome: Result<SubmissionReport, CategorizeError>,
    json: bool,
    out: &mut impl Write,
    err_out: &mut impl Write,
) -> Result<i32> {
    let report = match outcome {
        Ok(report) => report,
        Err(err) => {
            writeln!(err_out, "nold error: {err}")?;
            return Ok(if err.is_validation() {
                EXIT_INVALID_INPUT
            } else {
                EXIT_FAILURE
            });
        }
    };

    if json {
        let view = JsonReport::new(&report);
        writeln!(out, "{}", serde_json::to_string_pretty(&view)?)?;
    } else {
        for line in report.render_lines() {
            writeln!(out, "{line}")?;
        }
    }
    Ok(0)
}

fn submit_config(args: &SubmitArgs, mut config: CategorizerConfig) -> CategorizerConfig {
    if let Some(model) = args
        .model
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        config.model = model.to_string();
    }
    if let Some(max_tokens) = args.max_tokens {
        config.max_tokens = max_tokens;
    }
    if let Some(dir) = args.responses_dir.clone() {
        config.responses_dir = dir;
    }
    config
}

fn resolve_prompt(args: &SubmitArgs) -> Result<String> {
    if let Some(prompt) = args.prompt.clone() {
        return Ok(prompt);
    }
    if let Some(path) = args.prompt_file.as_ref() {
        return fs::read_to_string(path)
            .with_context(|| format!("failed reading prompt file {}", path.display()));
    }
    Ok(DEFAULT_PROMPT.to_string())
}

fn first_non_empty_env(keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Ok(value) = env::var(key) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn openai_api_key() -> Option<String> {
    first_non_empty_env(&["OPENAI_API_KEY", "OPENAI_API_KEY_BACKUP"])
}
