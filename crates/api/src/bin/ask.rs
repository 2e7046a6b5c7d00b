//! One-shot batch flow: read a corpus, build the knowledge base, answer a
//! single question and print the answer with its sources.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use api::config::AppConfig;
use ingest::FileReader;
use query::Mode;

#[derive(Parser)]
#[command(name = "ask", version, about = "Answer one question against a corpus")]
struct Args {
    /// Corpus file (.txt/.md) or directory of them.
    #[arg(long)]
    file: PathBuf,
    /// The question to answer.
    #[arg(long)]
    question: String,
    /// Retrieval mode: local, global or auto.
    #[arg(long, default_value = "auto")]
    mode: Mode,
    /// YAML config file; defaults apply for anything it omits.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let config = AppConfig::load(args.config.as_deref())?;
    let pipeline = api::build_pipeline(&config);

    let text = FileReader::read_path(&args.file).await?;
    let base = pipeline.build(&text).await?;
    let stats = base.stats();
    println!(
        "Built knowledge base: {} chunks, {} entities, {} relations, {} communities",
        stats.chunks, stats.entities, stats.relations, stats.communities
    );

    let answer = base.answer(&args.question, args.mode).await?;

    println!("\n=== Answer ({} mode) ===", answer.mode);
    println!("{}", answer.answer);
    if !answer.chunk_ids.is_empty() {
        println!("\nSource chunks: {:?}", answer.chunk_ids);
    }
    if !answer.community_ids.is_empty() {
        println!("Source communities: {:?}", answer.community_ids);
    }
    Ok(())
}
