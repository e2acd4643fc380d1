//! Practice client: wires the core grader and ink surface to the remote
//! lesson and OCR services.

pub mod config;
pub mod controller;
pub mod ocr;

use std::path::PathBuf;

use anyhow::Context;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::{Parser, Subcommand};
use lingo_core::{grade, word_diff, DiffType, ExerciseKind};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ClientConfig;
use crate::ocr::OcrClient;

#[derive(Parser)]
#[command(name = "lingo-practice", version, about = "Grade answers and run drawings through OCR")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Grade an answer against its target.
    Grade {
        /// speaking_word, speaking_sentence, listening, writing or generic
        #[arg(long, default_value = "generic")]
        kind: String,
        #[arg(long, default_value_t = 1)]
        difficulty: i32,
        /// Listening-choice option (repeatable)
        #[arg(long = "option")]
        options: Vec<String>,
        answer: String,
        target: String,
    },
    /// Send a PNG drawing to the OCR service and print the text.
    Ocr {
        path: PathBuf,
        /// Only print the first recognized character.
        #[arg(long)]
        letter: bool,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::Grade {
            kind,
            difficulty,
            options,
            answer,
            target,
        } => {
            let kind: ExerciseKind = kind.into();
            let result = grade(kind, difficulty, &answer, &target, options.as_slice());
            println!("{}", serde_json::to_string_pretty(&result)?);
            println!("{}", result.feedback(&target));
            if !result.is_correct {
                let diff: Vec<String> = word_diff(&answer, &target)
                    .into_iter()
                    .map(|seg| match seg.diff_type {
                        DiffType::Same => seg.text,
                        DiffType::Added => format!("[+{}]", seg.text),
                        DiffType::Removed => format!("[-{}]", seg.text),
                    })
                    .collect();
                println!("{}", diff.join(" "));
            }
        }
        Command::Ocr { path, letter } => {
            let config = ClientConfig::from_env()?;
            tracing::info!(ocr = %config.endpoints.ocr, "using OCR service");
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let client = OcrClient::new(&config)?;
            let text = client.convert(&STANDARD.encode(bytes)).await?;
            if letter {
                println!("{}", ocr::first_letter(&text).map(String::from).unwrap_or_default());
            } else {
                println!("{text}");
            }
        }
    }

    Ok(())
}
