//! Command parsing and execution.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use insight_core::{AudienceRegistry, DocumentRecord, InsightConfig};
use insight_ingest::{Normalizer, SourceSpec};
use insight_llm::{create_generator, LLMConfig};
use insight_runtime::{Coordinator, IngestOutcome};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ingest(Vec<String>),
    Regenerate(PathBuf),
    Audiences,
    Help,
}

/// Parse arguments (without the program name).
pub fn parse_args(args: &[String]) -> Result<Command, String> {
    let Some(first) = args.first() else {
        return Ok(Command::Help);
    };
    match first.as_str() {
        "ingest" => {
            if args.len() < 2 {
                return Err("Usage: insight ingest <source>...".into());
            }
            Ok(Command::Ingest(args[1..].to_vec()))
        }
        "regenerate" => match args.get(1) {
            Some(path) if args.len() == 2 => Ok(Command::Regenerate(PathBuf::from(path))),
            _ => Err("Usage: insight regenerate <record.json>".into()),
        },
        "audiences" => Ok(Command::Audiences),
        "--help" | "-h" | "help" => Ok(Command::Help),
        other => Err(format!("Unknown command: {}", other)),
    }
}

/// Accept either a bare record or a complete ingest outcome.
pub fn parse_record(json: &str) -> anyhow::Result<DocumentRecord> {
    if let Ok(record) = serde_json::from_str::<DocumentRecord>(json) {
        return Ok(record);
    }
    let outcome: IngestOutcome =
        serde_json::from_str(json).context("expected a document record or ingest outcome")?;
    outcome
        .into_record()
        .context("a degraded outcome has no record to regenerate; ingest the source again")
}

/// Everything a command needs, built once from the data directory.
pub struct App {
    coordinator: Arc<Coordinator>,
    normalizer: Arc<Normalizer>,
}

impl App {
    pub fn load(data_dir: &Path) -> anyhow::Result<Self> {
        let config = InsightConfig::from_env(data_dir)?;
        let llm = LLMConfig::load(&config.data_paths.llm_config_file);
        let service = create_generator(&llm);
        let audiences = AudienceRegistry::load(&config.data_paths.audiences_file)?;
        let coordinator = Coordinator::new(service, &config.pipeline, audiences)?;
        let normalizer = Normalizer::new()?;

        Ok(Self {
            coordinator: Arc::new(coordinator),
            normalizer: Arc::new(normalizer),
        })
    }

    /// Ingest every source concurrently and print the outcomes in argument
    /// order. Returns the number of sources that did not complete.
    pub async fn ingest_all(&self, sources: &[String]) -> anyhow::Result<usize> {
        let mut tasks = JoinSet::new();
        for (index, arg) in sources.iter().enumerate() {
            let coordinator = self.coordinator.clone();
            let normalizer = self.normalizer.clone();
            let arg = arg.clone();
            tasks.spawn(async move {
                let result = async {
                    let spec = SourceSpec::parse(&arg)?;
                    let source = normalizer.load(&spec).await?;
                    Ok::<_, insight_core::Error>(coordinator.ingest(source).await)
                }
                .await;
                (index, arg, result)
            });
        }

        let mut finished = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            let (index, arg, result) = joined?;
            finished.insert(index, (arg, result));
        }

        let mut failures = 0;
        let mut outcomes = Vec::new();
        for (arg, result) in finished.into_values() {
            match result {
                Ok(outcome) => {
                    if !outcome.is_complete() {
                        warn!("{} was stored without a digest", arg);
                        failures += 1;
                    }
                    outcomes.push(outcome);
                }
                Err(e) => {
                    error!("Failed to ingest {}: {}", arg, e);
                    failures += 1;
                }
            }
        }

        info!(
            "Ingested {} of {} sources",
            sources.len() - failures,
            sources.len()
        );
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
        Ok(failures)
    }

    pub async fn regenerate(&self, path: &Path) -> anyhow::Result<()> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let record = parse_record(&json)?;
        let outcome = self.coordinator.regenerate(record).await;
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        Ok(())
    }

    pub fn print_audiences(&self) -> anyhow::Result<()> {
        let profiles = self.coordinator.audiences().profiles();
        println!("{}", serde_json::to_string_pretty(profiles)?);
        Ok(())
    }
}
