/*
newsbrief - CLI entry point
Fetches headlines or search results, and produces three-line summaries.
*/

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use common::Config;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use newsbrief::cache::ResponseCache;
use newsbrief::news::{HeadlinesQuery, NewsClient, SearchQuery};
use newsbrief::{Article, NewsContext, SummaryRequest, SummaryResult, Summarizer};

#[derive(Parser, Debug)]
#[command(name = "newsbrief", about = "News headlines and three-line summaries")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Print JSON instead of plain text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Latest headlines
    Headlines {
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Search all articles
    Search {
        query: String,
        #[arg(long)]
        page_size: Option<u32>,
        #[arg(long)]
        sort_by: Option<String>,
        #[arg(long)]
        language: Option<String>,
    },
    /// Summarize a single article in three lines
    Summarize {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        url: Option<String>,
        /// Fail instead of building a summary from the raw fields
        #[arg(long)]
        no_fallback: bool,
    },
    /// Fetch headlines (or search results) and summarize each one
    Digest {
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        page_size: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI args
    let args = Args::parse();

    // Initialize logging (stderr so stdout stays clean for output)
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    // Credentials may live in a local .env file
    if let Ok(path) = dotenv::dotenv() {
        info!(path = ?path, ".env loaded");
    }

    let mut config = load_config(args.config.as_deref()).await?;
    if let Command::Summarize { no_fallback: true, .. } = args.command {
        config.llm.fallback = Some(false);
    }

    // Each command builds only the clients it talks to, so `headlines` works
    // without an LLM key and `summarize` without a news key.
    match args.command {
        Command::Headlines { country, category, page_size } => {
            let news = init(news_client(&config))?;
            let query = HeadlinesQuery { country, category, page_size };
            let articles = news.top_headlines(&query).await?;
            print_articles(&articles, args.json)?;
        }
        Command::Search { query, page_size, sort_by, language } => {
            let news = init(news_client(&config))?;
            let query = SearchQuery { query, page_size, sort_by, language };
            let articles = news.search(&query).await?;
            print_articles(&articles, args.json)?;
        }
        Command::Summarize { title, description, url, .. } => {
            let summarizer = init(Summarizer::from_config(&config))?;
            let request = SummaryRequest { title, description, url };
            let summary = summarizer.summarize(&request).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", summary);
            }
        }
        Command::Digest { query, page_size } => {
            let ctx = init(NewsContext::from_config(&config))?;
            let articles = match query {
                Some(q) => {
                    let query = SearchQuery { page_size, ..SearchQuery::new(q) };
                    ctx.news.search(&query).await?
                }
                None => {
                    let query = HeadlinesQuery { page_size, ..Default::default() };
                    ctx.news.top_headlines(&query).await?
                }
            };
            let digest = ctx.digest(articles, config.digest.concurrency()).await;
            print_digest(&digest, args.json)?;
        }
    }

    Ok(())
}

fn news_client(config: &Config) -> Result<NewsClient> {
    let cache = Arc::new(ResponseCache::new(config.news.cache_ttl()));
    NewsClient::from_config(&config.news, cache).context("failed to initialize news client")
}

fn init<T>(built: Result<T>) -> Result<T> {
    built.map_err(|e| {
        error!("failed to initialize: {:#}", e);
        e
    })
}

/// config.default.toml is layered under --config (or ./config.toml when present)
async fn load_config(explicit: Option<&std::path::Path>) -> Result<Config> {
    let default_path = PathBuf::from("config.default.toml");

    let override_path = match explicit {
        Some(p) if !p.exists() => {
            error!(path = ?p, "specified config file not found");
            anyhow::bail!("Config file not found: {}", p.display());
        }
        Some(p) => Some(p.to_path_buf()),
        None => Some(PathBuf::from("config.toml")).filter(|p| p.exists()),
    };

    let config = Config::load_with_defaults(Some(&default_path), override_path.as_deref())
        .await
        .context("failed to load configuration")?;
    info!(default_path = ?default_path, override_path = ?override_path, "configuration loaded");
    Ok(config)
}

fn print_articles(articles: &[Article], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(articles)?);
        return Ok(());
    }
    for (i, article) in articles.iter().enumerate() {
        println!("{}. {}", i + 1, article.title);
        if let Some(source) = &article.source_name {
            println!("   {}", source);
        }
        println!("   {}", article.url);
    }
    Ok(())
}

fn print_digest(digest: &[(Article, SummaryResult)], json: bool) -> Result<()> {
    if json {
        let items: Vec<_> = digest
            .iter()
            .map(|(article, summary)| serde_json::json!({ "article": article, "summary": summary.lines() }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }
    for (article, summary) in digest {
        println!("# {}", article.title);
        println!("{}", article.url);
        for line in summary.lines() {
            println!("  {}", line);
        }
        println!();
    }
    Ok(())
}
