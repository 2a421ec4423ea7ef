//! Two-stage crawl pipeline
//!
//! A producer task fetches the listing page and pushes every discovered
//! detail URL into a bounded channel. The consumer spawns one task per URL
//! (bounded by a semaphore), each fetching and extracting one page. Records
//! are buffered with their discovery index and returned in discovery order.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::{JoinError, JoinSet};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::client::{ClientConfig, Fetcher, HttpFetcher};
use crate::error::Result;
use crate::parser::{discover_links, extract_report};
use crate::types::ListingRecord;
use crate::url::BASE_URL;

/// Configuration for a crawl run
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Origin relative card hrefs are resolved against
    pub base_origin: String,
    /// Maximum number of detail pages fetched at the same time (default: 4)
    pub concurrency: usize,
    /// Overall crawl deadline; pages still in flight when it elapses are dropped
    pub deadline: Option<Duration>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_origin: BASE_URL.to_string(),
            concurrency: 4,
            deadline: Some(Duration::from_secs(120)),
        }
    }
}

/// Crawls one listing page and every detail page it links to
pub struct Crawler<F: Fetcher = HttpFetcher> {
    fetcher: Arc<F>,
    config: CrawlConfig,
}

impl Crawler<HttpFetcher> {
    /// Create a new crawler with default configuration
    ///
    /// # Errors
    /// Returns error if HTTP client initialization fails
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default(), CrawlConfig::default())
    }

    /// Create a new crawler with custom client and crawl configuration
    ///
    /// # Errors
    /// Returns error if HTTP client initialization fails
    pub fn with_config(client: ClientConfig, config: CrawlConfig) -> Result<Self> {
        let fetcher = HttpFetcher::with_config(client)?;
        Ok(Self::with_fetcher(fetcher, config))
    }
}

impl<F: Fetcher> Crawler<F> {
    /// Create a crawler on top of any [`Fetcher`]
    pub fn with_fetcher(fetcher: F, config: CrawlConfig) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            config,
        }
    }

    /// Crawl configuration in use
    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Fetches a listing page and returns the detail URLs of its cards
    ///
    /// # Returns
    /// URLs in document order; empty if the page could not be fetched or
    /// contains no cards
    pub async fn discover(&self, listing_url: &str) -> Vec<String> {
        discover_with(&*self.fetcher, listing_url, &self.config.base_origin).await
    }

    /// Fetches a detail page and extracts its listing record
    ///
    /// # Returns
    /// `None` if the page could not be fetched
    pub async fn extract(&self, detail_url: &str) -> Option<ListingRecord> {
        extract_with(&*self.fetcher, detail_url).await
    }

    /// Runs a full crawl for one listing page
    ///
    /// # Returns
    /// One record per successfully fetched detail page, in discovery order.
    /// Pages that failed to fetch, or were still in flight when the
    /// deadline elapsed, are absent.
    ///
    /// # Example
    /// ```no_run
    /// # async fn example() -> wgcrawl_core::Result<()> {
    /// use wgcrawl_core::{Crawler, DEFAULT_LISTING_URL};
    /// let crawler = Crawler::new()?;
    /// for record in crawler.crawl(DEFAULT_LISTING_URL).await {
    ///     println!("{}: {} €", record.title, record.rent_base);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn crawl(&self, listing_url: &str) -> Vec<ListingRecord> {
        let started = Instant::now();
        let concurrency = self.config.concurrency.max(1);
        let deadline = self.config.deadline.map(|d| started + d);

        info!(url = %listing_url, concurrency, deadline = ?self.config.deadline, "Starting crawl");

        let (tx, mut rx) = mpsc::channel::<(usize, String)>(concurrency * 2);
        let producer = tokio::spawn(produce_links(
            Arc::clone(&self.fetcher),
            listing_url.to_string(),
            self.config.base_origin.clone(),
            tx,
        ));

        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut tasks: JoinSet<(usize, Option<ListingRecord>)> = JoinSet::new();
        let mut records: Vec<(usize, ListingRecord)> = Vec::new();

        let pipeline = async {
            while let Some((index, url)) = rx.recv().await {
                let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                    break;
                };
                let fetcher = Arc::clone(&self.fetcher);
                tasks.spawn(async move {
                    let _permit = permit;
                    (index, extract_with(&*fetcher, &url).await)
                });

                while let Some(done) = tasks.try_join_next() {
                    collect(done, &mut records);
                }
            }

            while let Some(done) = tasks.join_next().await {
                collect(done, &mut records);
            }
        };

        let completed = match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, pipeline).await.is_ok(),
            None => {
                pipeline.await;
                true
            }
        };

        if completed {
            match producer.await {
                Ok(discovered) => debug!(url = %listing_url, discovered, "Discovery finished"),
                Err(e) => warn!(url = %listing_url, error = %e, "Discovery task failed"),
            }
        } else {
            warn!(
                url = %listing_url,
                in_flight = tasks.len(),
                "Crawl deadline elapsed, dropping pages still in flight"
            );
            producer.abort();
            tasks.abort_all();
        }

        records.sort_by_key(|(index, _)| *index);
        let records: Vec<ListingRecord> = records.into_iter().map(|(_, record)| record).collect();

        info!(
            url = %listing_url,
            records = records.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Crawl finished"
        );

        records
    }
}

fn collect(
    done: std::result::Result<(usize, Option<ListingRecord>), JoinError>,
    records: &mut Vec<(usize, ListingRecord)>,
) {
    match done {
        Ok((index, Some(record))) => records.push((index, record)),
        Ok((_, None)) => {}
        Err(e) => warn!(error = %e, "Detail task failed"),
    }
}

/// Discovery stage: pushes `(index, url)` pairs into the channel
async fn produce_links<F: Fetcher>(
    fetcher: Arc<F>,
    listing_url: String,
    base_origin: String,
    tx: mpsc::Sender<(usize, String)>,
) -> usize {
    let links = discover_with(&*fetcher, &listing_url, &base_origin).await;
    let count = links.len();

    for (index, link) in links.into_iter().enumerate() {
        if tx.send((index, link)).await.is_err() {
            break;
        }
    }

    count
}

async fn discover_with<F: Fetcher>(
    fetcher: &F,
    listing_url: &str,
    base_origin: &str,
) -> Vec<String> {
    let html = match fetcher.fetch(listing_url).await {
        Ok(html) => html,
        Err(e) => {
            warn!(url = %listing_url, error = %e, "Failed to fetch listing page");
            return Vec::new();
        }
    };

    match discover_links(&html, base_origin) {
        Ok(links) if links.is_empty() => {
            info!(url = %listing_url, "No offer cards on listing page");
            links
        }
        Ok(links) => {
            info!(url = %listing_url, count = links.len(), "Found offer links");
            links
        }
        Err(e) => {
            warn!(url = %listing_url, error = %e, "Failed to parse listing page");
            Vec::new()
        }
    }
}

async fn extract_with<F: Fetcher>(fetcher: &F, detail_url: &str) -> Option<ListingRecord> {
    let html = match fetcher.fetch(detail_url).await {
        Ok(html) => html,
        Err(e) => {
            warn!(url = %detail_url, error = %e, "Failed to fetch detail page");
            return None;
        }
    };

    let report = extract_report(detail_url, &html);
    if !report.missing.is_empty() {
        let missing: Vec<&str> = report.missing.iter().map(|f| f.name()).collect();
        debug!(url = %detail_url, ?missing, "Fields fell back to defaults");
    }

    Some(report.record)
}
