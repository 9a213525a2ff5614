use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser as ClapParser;
use serde_json::Value;
use tracing::*;

use crate::config::Config;
use crate::flatten::{flatten_answers, FlattenOptions};
use crate::merge::merge_answers;

mod config;
mod flatten;
mod logging;
mod merge;

#[derive(Debug, ClapParser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The path to the questions JSON file.
    #[arg(default_value = "questions.json")]
    questions: PathBuf,

    /// The path to the answers JSON file.
    #[arg(default_value = "answers.json")]
    answers: PathBuf,

    /// Where the merged document is written.
    #[arg(short, long, default_value = "output/merged.json")]
    output: PathBuf,

    /// The path to an optional TOML configuration file.
    #[arg(long, default_value = "formfill.toml")]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    logging::setup_logging();

    let cli = Args::parse();

    debug!(questions = ?cli.questions, answers = ?cli.answers, output = ?cli.output);

    let config = config::load(&cli.config)?;
    run(&cli, &config)
}

fn run(cli: &Args, config: &Config) -> anyhow::Result<()> {
    let questions_json = match fs::read_to_string(&cli.questions) {
        Ok(file) => file,
        Err(e) => {
            error!(path = ?cli.questions, "failed to read questions input");
            return Err(e)
                .with_context(|| format!("failed to read file `{}`", cli.questions.display()));
        }
    };
    let answers_json = match fs::read_to_string(&cli.answers) {
        Ok(file) => file,
        Err(e) => {
            error!(path = ?cli.answers, "failed to read answers input");
            return Err(e)
                .with_context(|| format!("failed to read file `{}`", cli.answers.display()));
        }
    };

    info!("loaded JSON files");

    let mut questions: Value = serde_json::from_str(&questions_json)
        .with_context(|| format!("failed to parse questions JSON `{}`", cli.questions.display()))?;
    let answers: Value = serde_json::from_str(&answers_json)
        .with_context(|| format!("failed to parse answers JSON `{}`", cli.answers.display()))?;

    // Shape checks: these stop the run without producing output, but they are
    // user errors, not faults.
    if !answers.is_object() {
        error!("invalid answers document: top level is not a JSON object");
        return Ok(());
    }
    if !(questions.is_object() || questions.is_array()) {
        error!("invalid questions document: top level is not a JSON object or array");
        return Ok(());
    }

    let options = FlattenOptions {
        key_policy: config.key_policy,
        array_policy: config.array_policy,
    };
    let extracted = flatten_answers(&answers, &options);
    info!("extracted {} answers", extracted.len());

    let stats = merge_answers(&mut questions, &extracted);

    if config.report_unmatched && !stats.unmatched.is_empty() {
        warn!(
            "{} field(s) without a matching answer: {}",
            stats.unmatched.len(),
            stats.unmatched.join(", ")
        );
    }

    let output_json = serde_json::to_string_pretty(&questions)
        .context("failed to serialize merged document")?;

    if let Some(parent) = cli.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory `{}`", parent.display())
            })?;
        }
    }
    fs::write(&cli.output, output_json)
        .with_context(|| format!("failed to write file `{}`", cli.output.display()))?;

    info!(
        "processed {} fields ({} matched), wrote {}",
        stats.fields_seen,
        stats.matched,
        cli.output.display()
    );

    Ok(())
}
