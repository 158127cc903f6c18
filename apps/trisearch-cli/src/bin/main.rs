use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use trisearch_core::catalog;
use trisearch_core::config::Config;
use trisearch_core::traits::{Embedder, SearchBackend};
use trisearch_core::types::{EmbeddedProgram, IndexedDocument, SearchResult};
use trisearch_elastic::ElasticsearchBackend;
use trisearch_embed::default_embedder;
use trisearch_qdrant::QdrantBackend;
use trisearch_typesense::TypesenseBackend;

const PROGRAM_BASE_URL: &str = "https://asuonline.asu.edu";
const DEFAULT_LIMIT: usize = 5;

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() {
        eprintln!("Usage: {} <ingest|query|repl> [args...]", prog);
        eprintln!("  ingest [--reuse-embeddings]");
        eprintln!("  query <qdrant|elasticsearch|typesense> \"<text>\" [--limit N]");
        eprintln!("  repl");
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

/// The three backend clients, constructed once at startup and shared
/// read-only by every query.
fn build_backends(config: &Config) -> Vec<Box<dyn SearchBackend>> {
    vec![
        Box::new(QdrantBackend::new(config.qdrant_url())),
        Box::new(ElasticsearchBackend::new(config.elasticsearch_url())),
        Box::new(TypesenseBackend::new(config.typesense_url(), config.typesense_api_key())),
    ]
}

fn select<'a>(
    backends: &'a [Box<dyn SearchBackend>],
    name: &str,
) -> Option<&'a dyn SearchBackend> {
    backends.iter().find(|b| b.name() == name).map(|b| b.as_ref())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let (cmd, args) = parse_args();
    match cmd.as_str() {
        "ingest" => ingest(&config, &args).await,
        "query" => query(&config, &args).await,
        "repl" => repl(&config).await,
        _ => {
            eprintln!("Unknown command: {}", cmd);
            std::process::exit(1);
        }
    }
}

async fn ingest(config: &Config, args: &[String]) -> anyhow::Result<()> {
    let reuse = args.iter().any(|a| a == "--reuse-embeddings");
    let catalog_path = PathBuf::from(config.catalog_path());
    let artifact_path = PathBuf::from(config.embeddings_artifact_path());

    let embedded = if reuse && artifact_path.exists() {
        println!("Reusing embeddings from {}", artifact_path.display());
        catalog::load_embedded(&artifact_path)?
    } else {
        let programs = catalog::load_programs(&catalog_path)?;
        println!("Generating embeddings for {} programs...", programs.len());
        let embedder = default_embedder()?;
        let pb = ProgressBar::new(programs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        let mut embedded = Vec::with_capacity(programs.len());
        // One provider call per record; the vector is shared by all three
        // backends below.
        for program in programs {
            pb.set_message(program.title.clone());
            let embedding = embedder.embed(&program.long_description).await?;
            embedded.push(EmbeddedProgram { program, embedding });
            pb.inc(1);
        }
        pb.finish_with_message("embeddings done");
        catalog::save_embedded(&artifact_path, &embedded)?;
        println!("Saved embeddings artifact to {}", artifact_path.display());
        embedded
    };

    let docs: Vec<IndexedDocument> =
        embedded.into_iter().map(IndexedDocument::with_random_id).collect();

    // Each backend is ingested independently; a failure in one does not stop
    // the others.
    let mut failures = 0usize;
    for backend in build_backends(config) {
        match backend.reload(&docs).await {
            Ok(count) => println!("✓ {}: inserted {} documents", backend.name(), count),
            Err(e) => {
                failures += 1;
                eprintln!("✗ {}: {}", backend.name(), e);
            }
        }
    }
    if failures > 0 {
        eprintln!("{failures} backend(s) failed; the others are loaded and queryable.");
    }
    Ok(())
}

async fn query(config: &Config, args: &[String]) -> anyhow::Result<()> {
    let engine = args.first().cloned().unwrap_or_else(|| {
        eprintln!("Usage: trisearch query <qdrant|elasticsearch|typesense> \"<text>\" [--limit N]");
        std::process::exit(1)
    });
    let text = args.get(1).cloned().unwrap_or_else(|| {
        eprintln!("Usage: trisearch query <qdrant|elasticsearch|typesense> \"<text>\" [--limit N]");
        std::process::exit(1)
    });
    let mut limit = DEFAULT_LIMIT;
    let mut i = 2;
    while i < args.len() {
        if args[i] == "--limit" {
            match args.get(i + 1).and_then(|v| v.parse::<usize>().ok()) {
                Some(l) => {
                    limit = l;
                    i += 1;
                }
                None => {
                    eprintln!("Error: --limit requires a number");
                    std::process::exit(1);
                }
            }
        }
        i += 1;
    }

    let backends = build_backends(config);
    let Some(backend) = select(&backends, &engine) else {
        eprintln!("Unknown engine: {} (expected qdrant, elasticsearch, or typesense)", engine);
        std::process::exit(1);
    };
    let embedder = default_embedder()?;
    run_query(backend, embedder.as_ref(), &text, limit).await;
    Ok(())
}

async fn run_query(backend: &dyn SearchBackend, embedder: &dyn Embedder, text: &str, limit: usize) {
    // The query embedding is recomputed on every call, repeated text included.
    let query_vector = match embedder.embed(text).await {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error embedding query: {}", e);
            return;
        }
    };
    match backend.search(&query_vector, limit).await {
        Ok(results) => print_results(backend.name(), text, &results),
        Err(e) => {
            eprintln!("Error searching {}: {}", backend.name(), e);
            eprintln!("Make sure all services are running and data has been ingested.");
        }
    }
}

fn print_results(engine: &str, text: &str, results: &[SearchResult]) {
    println!("\nResults from {} for \"{}\" ({} found)", engine, text, results.len());
    if results.is_empty() {
        println!("No results found. Try a different query.");
        return;
    }
    for (i, result) in results.iter().enumerate() {
        println!("\n  {}. {} (score {:.4})", i + 1, result.title, result.score);
        println!("     {}{}", PROGRAM_BASE_URL, result.url);
        println!("     {}", result.short_description);
    }
    println!();
}

async fn repl(config: &Config) -> anyhow::Result<()> {
    let backends = build_backends(config);
    let embedder = default_embedder()?;
    let mut engine = "qdrant".to_string();

    println!("trisearch repl: compare Qdrant, Elasticsearch, and Typesense");
    println!("  /engine <name>  - switch engine (qdrant, elasticsearch, typesense)");
    println!("  /quit           - exit");
    println!("  <query>         - search the current engine");
    println!();

    loop {
        print!("{}> ", engine);
        io::stdout().flush()?;
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        match input.split_once(' ') {
            _ if input == "/quit" || input == "/q" => break,
            Some(("/engine", name)) => {
                let name = name.trim();
                if select(&backends, name).is_some() {
                    engine = name.to_string();
                    println!("Switched to {}", engine);
                } else {
                    println!("Unknown engine: {} (expected qdrant, elasticsearch, or typesense)", name);
                }
            }
            _ if input.starts_with('/') => {
                println!("Unknown command: {}", input);
            }
            _ => {
                // `engine` only ever holds a name validated by `select` above.
                if let Some(backend) = select(&backends, &engine) {
                    run_query(backend, embedder.as_ref(), input, DEFAULT_LIMIT).await;
                }
            }
        }
    }
    Ok(())
}
