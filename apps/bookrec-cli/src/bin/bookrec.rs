use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bookrec_cli::display;
use bookrec_core::config::{Config, Settings};
use bookrec_embed::embedder_from_settings;
use bookrec_hybrid::{RecommendRequest, Recommender};
use bookrec_store::MetadataStore;
use bookrec_vector::{BookIndexWriter, LanceBookIndex};

#[derive(Parser, Debug)]
#[command(name = "bookrec", about = "Hybrid semantic book recommendations")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Embed the metadata table into the LanceDB index.
    Index {
        /// Only index the first N books.
        #[arg(long)]
        limit: Option<usize>,
        /// Delete the index directory first instead of refusing to overwrite.
        #[arg(long)]
        rebuild: bool,
    },
    /// Recommend books for a free-text description.
    Recommend {
        /// What the reader is in the mood for.
        query: Vec<String>,
        #[arg(long, default_value = display::ALL)]
        category: String,
        /// Happy, Surprising, Angry, Suspenseful, Sad, or All.
        #[arg(long, default_value = display::ALL)]
        tone: String,
        #[arg(long)]
        top_k: Option<usize>,
        /// Print results as JSON lines.
        #[arg(long)]
        json: bool,
    },
    /// Run every query in a file and write a ranked report.
    Batch {
        /// One query per line; `#` starts a comment line.
        #[arg(long)]
        queries: PathBuf,
        #[arg(long, default_value = "artifacts/prediction/results.txt")]
        out: PathBuf,
        #[arg(long, default_value = display::ALL)]
        category: String,
        #[arg(long, default_value = display::ALL)]
        tone: String,
        #[arg(long)]
        top_k: Option<usize>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).try_init();
}

fn load_store(settings: &Settings) -> anyhow::Result<MetadataStore> {
    let (store, lineage, report) = MetadataStore::open(&settings.data)?;
    tracing::info!(tier = %lineage.tier, loaded = report.loaded, rejected = report.rejected, duplicates = report.duplicates, malformed = report.malformed, "metadata ready");
    Ok(store)
}

fn run_index(settings: &Settings, limit: Option<usize>, rebuild: bool) -> anyhow::Result<()> {
    let store = load_store(settings)?;
    let mut books: Vec<_> = store.iter().cloned().collect();
    if let Some(limit) = limit {
        println!("🔢 Limiting indexing to {limit} books");
        books.truncate(limit);
    }
    let db_dir = settings.lancedb_dir();
    if rebuild && db_dir.exists() {
        tracing::warn!(path = %db_dir.display(), "removing existing index");
        std::fs::remove_dir_all(&db_dir)?;
    }
    std::fs::create_dir_all(&db_dir).with_context(|| format!("creating {}", db_dir.display()))?;
    let embedder = embedder_from_settings(&settings.embedding)?;
    let uri = db_dir.to_string_lossy().to_string();
    let written = tokio::runtime::Runtime::new()?.block_on(async {
        let writer = BookIndexWriter::new(&uri, &settings.index.table, &*embedder).await?;
        if writer.table_exists().await? {
            bail!("table '{}' already exists in {}; pass --rebuild to replace it", settings.index.table, uri);
        }
        writer.index_books(&books).await
    })?;
    println!("\n✅ Indexed {written} books into {}", db_dir.display());
    println!("💡 To get recommendations, use: bookrec recommend '<description>'");
    Ok(())
}

fn build_request(query: String, category: &str, tone: &str, top_k: Option<usize>) -> RecommendRequest {
    let mut request = RecommendRequest::new(query);
    if let Some(c) = display::category_filter(Some(category)) { request = request.with_category(&c); }
    if let Some(t) = display::tone_filter(Some(tone)) { request = request.with_tone(&t); }
    if let Some(k) = top_k { request = request.with_top_k(k); }
    request
}

fn open_engine(settings: Settings) -> anyhow::Result<Recommender<LanceBookIndex>> {
    let store = load_store(&settings)?;
    let embedder = embedder_from_settings(&settings.embedding)?;
    let index = LanceBookIndex::open(&settings.lancedb_dir(), &settings.index.table, embedder)?;
    Ok(Recommender::new(store, index, settings.recommender)?)
}

fn run_recommend(settings: Settings, query: String, category: &str, tone: &str, top_k: Option<usize>, json: bool) -> anyhow::Result<()> {
    let request = build_request(query, category, tone, top_k);
    if let Some(message) = request.guidance() {
        println!("{message}");
        return Ok(());
    }

    let engine = open_engine(settings)?;
    let (results, stats) = engine.recommend_request(&request)?;
    tracing::debug!(?stats, "query finished");

    if results.is_empty() {
        println!("{}", display::NO_MATCHES);
        return Ok(());
    }
    for (rank, rec) in results.iter().enumerate() {
        if json { println!("{}", serde_json::to_string(rec)?); } else { println!("{}\n", display::render(rank + 1, rec)); }
    }
    Ok(())
}

fn run_batch(settings: Settings, queries: &Path, out: &Path, category: &str, tone: &str, top_k: Option<usize>) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(queries).with_context(|| format!("reading {}", queries.display()))?;
    let requests: Vec<RecommendRequest> =
        display::parse_queries(&text).into_iter().map(|q| build_request(q, category, tone, top_k)).collect();
    if requests.is_empty() { bail!("no queries in {}", queries.display()); }

    let engine = open_engine(settings)?;
    tracing::info!(queries = requests.len(), out = %out.display(), "starting batch prediction");
    let outcomes = engine.recommend_batch(&requests);

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let mut file = BufWriter::new(File::create(out).with_context(|| format!("creating {}", out.display()))?);
    display::write_batch_report(&mut file, &outcomes)?;
    file.flush()?;

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    println!("\n✅ {} queries processed ({} failed), report saved to {}", outcomes.len(), failed, out.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;
    match cli.command {
        Command::Index { limit, rebuild } => run_index(&settings, limit, rebuild),
        Command::Recommend { query, category, tone, top_k, json } => {
            run_recommend(settings, query.join(" "), &category, &tone, top_k, json)
        }
        Command::Batch { queries, out, category, tone, top_k } => run_batch(settings, &queries, &out, &category, &tone, top_k),
    }
}
