use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use perch::client::HttpSearchService;
use perch::config::CONFIG;
use perch::engine::TweetIndex;
use perch::fault;
use perch::form::{QUERY_FIELD, QueryForm};
use perch::server;
use perch::session::SearchSession;

#[derive(Parser)]
#[command(name = "perch")]
#[command(about = "Tweet search: a demo service and the page client that renders its hits")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the demo search service
    Serve {
        /// Listen address, host:port
        #[arg(long)]
        bind: Option<String>,

        /// Tab-separated tweet corpus; omit for the built-in sample
        #[arg(long)]
        tweets: Option<PathBuf>,
    },

    /// Send one search and print the rendered results page
    Search {
        /// Query text; omit to match every document
        query: Option<String>,

        /// Search service endpoint
        #[arg(long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber (handles both tracing and log crate)
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { bind, tweets } => serve(bind, tweets).await,
        Commands::Search { query, url } => search_once(query, url).await,
    }
}

async fn serve(bind: Option<String>, tweets: Option<PathBuf>) -> anyhow::Result<()> {
    let corpus = tweets.or_else(|| CONFIG.tweets_file.clone().map(PathBuf::from));
    let index = match corpus {
        Some(path) => TweetIndex::load(&path)?,
        None => {
            let index = TweetIndex::sample();
            log::info!(
                "no tweets file configured, serving the {}-tweet sample",
                index.len()
            );
            index
        }
    };

    let app = server::create_router(Arc::new(index));
    let addr = bind.unwrap_or_else(|| CONFIG.bind_addr.clone());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    log::info!("listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn search_once(query: Option<String>, url: Option<String>) -> anyhow::Result<()> {
    // Transport faults surface as one line on stderr.
    fault::set_fault_handler(|message, _| eprintln!("search failed: {message}"));

    let endpoint = url.unwrap_or_else(|| CONFIG.search_url.clone());
    let service = Arc::new(HttpSearchService::new(endpoint));
    let session = SearchSession::new(service);

    let mut form = QueryForm::new();
    if let Some(query) = query {
        form.set_field(QUERY_FIELD, query);
    }

    let mut pages = session.subscribe();
    session.search(&form);

    tokio::time::timeout(Duration::from_secs(10), pages.changed())
        .await
        .context("search did not complete within 10s")??;

    println!("{}", pages.borrow().to_html());
    Ok(())
}
