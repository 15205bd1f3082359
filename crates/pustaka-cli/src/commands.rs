//! `analyze` and `graph` subcommands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use serde::Serialize;
use tracing::warn;

use pustaka_core::config::validate_threshold;
use pustaka_core::{Language, PustakaConfig};
use pustaka_graph::{GraphStats, Neighbor, SimilarityEdge, SimilarityEngine};
use pustaka_ingest::{read_text, Keyword, ReferenceEntry};
use pustaka_runtime::{Document, Orchestrator, ProcessingStatus, Strategy};

/// A parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Analyze {
        files: Vec<PathBuf>,
    },
    Graph {
        files: Vec<PathBuf>,
        threshold: Option<f64>,
    },
    Help,
}

impl Command {
    /// Parse arguments after the program name.
    pub fn parse(args: &[String]) -> anyhow::Result<Self> {
        let Some((name, rest)) = args.split_first() else {
            return Ok(Self::Help);
        };

        match name.as_str() {
            "analyze" => {
                let files = file_args(rest)?;
                Ok(Self::Analyze { files })
            }
            "graph" => {
                let mut threshold = None;
                let mut paths = Vec::new();
                let mut iter = rest.iter();
                while let Some(arg) = iter.next() {
                    if arg == "--threshold" {
                        let raw = iter.next().context("--threshold needs a value")?;
                        let value: f64 = raw
                            .parse()
                            .with_context(|| format!("invalid threshold {:?}", raw))?;
                        validate_threshold(value)?;
                        threshold = Some(value);
                    } else {
                        paths.push(arg.clone());
                    }
                }
                let files = file_args(&paths)?;
                Ok(Self::Graph { files, threshold })
            }
            "--help" | "-h" | "help" => Ok(Self::Help),
            other => bail!("Unknown command: {}. Use 'pustaka help' for usage.", other),
        }
    }
}

fn file_args(args: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    if args.is_empty() {
        bail!("at least one file is required");
    }
    Ok(args.iter().map(PathBuf::from).collect())
}

pub fn print_help() {
    println!("Pustaka: document intelligence for scholarly texts");
    println!();
    println!("Usage: pustaka <command> [args]");
    println!();
    println!("Commands:");
    println!("  analyze <file>...                    Analyze plain-text files");
    println!("  graph <file>... [--threshold X]      Analyze files and print the similarity graph");
    println!("  help                                 Show this help message");
    println!();
    println!("Environment:");
    println!("  PUSTAKA_CONFIG       Path to a JSON config file (default: pustaka.json)");
    println!("  RUST_LOG             Log filter (default: info)");
}

/// Analysis of one input file.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAnalysis {
    pub file: String,
    pub id: i64,
    pub status: ProcessingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword_strategy: Option<Strategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_strategy: Option<Strategy>,
    pub keywords: Vec<Keyword>,
    pub summary: String,
    pub references: Vec<ReferenceEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Similarity graph over the analyzed files.
#[derive(Debug, Serialize)]
pub struct GraphOutput {
    pub documents: Vec<FileAnalysis>,
    pub edges: Vec<SimilarityEdge>,
    pub neighbors: Vec<NeighborList>,
    pub stats: GraphStats,
}

#[derive(Debug, Serialize)]
pub struct NeighborList {
    pub id: i64,
    pub neighbors: Vec<Neighbor>,
}

/// Load each file as a document; ids follow argument order from 1.
fn load_documents(files: &[PathBuf]) -> Vec<Document> {
    files
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let id = i as i64 + 1;
            match read_text(path) {
                Ok(text) => Document::new(id, text),
                Err(e) => {
                    warn!("Cannot read {}: {}", path.display(), e);
                    Document::without_text(id)
                }
            }
        })
        .collect()
}

pub async fn analyze(
    config: Arc<PustakaConfig>,
    files: &[PathBuf],
) -> anyhow::Result<Vec<FileAnalysis>> {
    let orchestrator = Orchestrator::new(config)?;
    let (_, outputs) = run_pipeline(&orchestrator, files).await;
    Ok(outputs)
}

pub async fn graph(
    config: Arc<PustakaConfig>,
    files: &[PathBuf],
    threshold: Option<f64>,
) -> anyhow::Result<GraphOutput> {
    let threshold = threshold.unwrap_or(config.similarity.threshold);
    let limit = config.similarity.neighbor_limit.max(1);
    let orchestrator = Orchestrator::new(config)?;
    let (docs, documents) = run_pipeline(&orchestrator, files).await;

    let corpus = Orchestrator::corpus(&docs);
    let engine = SimilarityEngine::new();
    let edges = engine.build_graph(&corpus, threshold)?;
    let snapshot = engine.graph(&corpus)?;

    let neighbors = snapshot
        .doc_ids()
        .iter()
        .map(|&id| NeighborList {
            id,
            neighbors: snapshot.neighbors(id, limit),
        })
        .collect();

    Ok(GraphOutput {
        documents,
        edges,
        neighbors,
        stats: snapshot.stats(threshold),
    })
}

async fn run_pipeline(
    orchestrator: &Orchestrator,
    files: &[PathBuf],
) -> (Vec<Document>, Vec<FileAnalysis>) {
    let mut docs = load_documents(files);
    let results = orchestrator.process_many(&mut docs).await;

    let outputs = docs
        .iter()
        .zip(files)
        .zip(results)
        .map(|((doc, path), result)| {
            let report = result.as_ref().ok();
            FileAnalysis {
                file: display_name(path),
                id: doc.id,
                status: doc.status,
                language: doc.language,
                keyword_strategy: report.map(|r| r.keyword_strategy),
                summary_strategy: report.map(|r| r.summary_strategy),
                keywords: doc.keywords.clone(),
                summary: doc.summary.clone(),
                references: doc.references.clone(),
                error: result.err().map(|e| e.to_string()),
            }
        })
        .collect();

    (docs, outputs)
}

fn display_name(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
