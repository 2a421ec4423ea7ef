//! wgcrawl command line
//!
//! Crawls one listing page and prints the records as JSON, or with
//! `--request` answers a request payload read from stdin.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tokio::io::AsyncReadExt;
use tracing::error;
use tracing_subscriber::EnvFilter;
use wgcrawl_core::{BASE_URL, ClientConfig, CrawlConfig, Crawler, DEFAULT_LISTING_URL};
use wgcrawl_handler::{Handler, HandlerError, Result, validate_url};

#[derive(Parser, Debug)]
#[command(name = "wgcrawl")]
#[command(about = "Crawl wg-gesucht.de listing pages into JSON records")]
#[command(version)]
struct Cli {
    /// Listing page to crawl
    #[arg(default_value = DEFAULT_LISTING_URL)]
    url: String,

    /// Read a {"url": ...} request from stdin and print the handler response
    #[arg(long)]
    request: bool,

    /// Origin relative card links are resolved against
    #[arg(long, env = "WGCRAWL_BASE_ORIGIN", default_value = BASE_URL)]
    base_origin: String,

    /// Detail pages fetched at the same time
    #[arg(long, env = "WGCRAWL_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, env = "WGCRAWL_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Overall crawl deadline in seconds, 0 disables it
    #[arg(long, env = "WGCRAWL_DEADLINE_SECS", default_value_t = 120)]
    deadline_secs: u64,

    /// Status answered to malformed request payloads
    #[arg(long, env = "WGCRAWL_CLIENT_ERROR_STATUS", default_value_t = 400)]
    client_error_status: u16,
}

impl Cli {
    fn crawler(&self) -> Result<Crawler> {
        let client = ClientConfig {
            timeout_secs: self.timeout_secs,
            ..ClientConfig::default()
        };
        let config = CrawlConfig {
            base_origin: self.base_origin.clone(),
            concurrency: self.concurrency,
            deadline: (self.deadline_secs > 0).then(|| Duration::from_secs(self.deadline_secs)),
        };
        Ok(Crawler::with_config(client, config)?)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = if cli.request {
        answer_request(&cli).await
    } else {
        crawl(&cli).await
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "wgcrawl failed");
            ExitCode::FAILURE
        }
    }
}

async fn crawl(cli: &Cli) -> Result<ExitCode> {
    let url = validate_url(&cli.url)?;
    let records = cli.crawler()?.crawl(url.as_str()).await;

    let json = serde_json::to_string_pretty(&records).map_err(HandlerError::Encode)?;
    println!("{json}");
    Ok(ExitCode::SUCCESS)
}

async fn answer_request(cli: &Cli) -> Result<ExitCode> {
    let mut body = String::new();
    tokio::io::stdin().read_to_string(&mut body).await?;

    let handler = Handler::new(cli.crawler()?).with_client_error_status(cli.client_error_status);
    let response = handler.handle(&body).await;

    let json = serde_json::to_string_pretty(&response).map_err(HandlerError::Encode)?;
    println!("{json}");

    Ok(if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
