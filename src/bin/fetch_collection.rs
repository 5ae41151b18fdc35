//! Fetch a list endpoint and print its elements as JSON lines.
//!
//! ```sh
//! export RIDGELINE_BASE_URL='https://analytics.example.com/api'
//! export RIDGELINE_CONSUMER_KEY=... RIDGELINE_CONSUMER_SECRET=...
//!
//! # Without RIDGELINE_TOKEN/RIDGELINE_TOKEN_SECRET an out-of-band
//! # authorization is run first.
//! cargo run --bin fetch-collection -- reports reports 50
//! ```
//!
//! With a page size the endpoint is walked page by page; without one it is
//! fetched as a single cached list.

use std::io::{BufRead, Write};

use ridgeline_analytics::{AnalyticsClient, ElementParser, Result};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        eprintln!("Usage: fetch-collection <path> <field> [page-size]");
        std::process::exit(2);
    }

    let page_size = match args.get(2).map(|s| s.parse::<usize>()) {
        None => None,
        Some(Ok(size)) if size > 0 => Some(size),
        Some(_) => {
            eprintln!("Error: page size must be a positive integer");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(&args[0], &args[1], page_size).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(path: &str, field: &str, page_size: Option<usize>) -> Result<()> {
    let client = AnalyticsClient::from_env()?;

    if !client.credentials().has_token() {
        authorize(&client).await?;
    }

    let parser = ElementParser::<Value>::deserialize();

    let items = match page_size {
        Some(size) => {
            let mut collection = client.new_paginated(path, field, parser);
            collection.load_size(size).await?;
            while collection.has_next_page() {
                let before = collection.len();
                collection.load_next().await?;
                if collection.len() == before {
                    break;
                }
            }
            collection.items().to_vec()
        }
        None => {
            let mut collection = client.new_cached(path, field, parser);
            collection.load().await?;
            collection.to_list()
        }
    };

    info!(path, count = items.len(), "Fetched collection");

    let mut stdout = std::io::stdout().lock();
    for item in &items {
        let _ = writeln!(stdout, "{item}");
    }
    Ok(())
}

async fn authorize(client: &AnalyticsClient) -> Result<()> {
    let request = client.request_token("oob").await?;
    let url = client.authorization_url(&request.oauth_token)?;

    eprintln!("Open this URL and approve access:\n\n  {url}\n");
    eprint!("Verifier: ");
    let _ = std::io::stderr().flush();

    let verifier = match read_verifier(std::io::stdin().lock()) {
        Ok(verifier) => verifier,
        Err(e) => {
            eprintln!("Error: failed to read verifier: {e}");
            std::process::exit(1);
        }
    };

    let access = client.access_token(&verifier).await?;
    eprintln!("\nAuthorized. To skip this step next time:");
    eprintln!("  export RIDGELINE_TOKEN='{}'", access.oauth_token);
    eprintln!("  export RIDGELINE_TOKEN_SECRET='{}'\n", access.oauth_token_secret);
    Ok(())
}

fn read_verifier(mut input: impl BufRead) -> std::io::Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}
