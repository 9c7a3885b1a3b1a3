use crate::browser::{BrowserError, Surface};
use crate::config::CrawlConfig;
use crate::extract;
use crate::models::{Region, Subregion};
use crate::navigator::{CaptchaPrompt, Navigator};
use crate::pool::SurfacePool;
use crate::sink::SharedSink;
use crate::urls::UrlBuilder;
use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, error, info};
use std::sync::Arc;
use tokio::task;

/// Fatal crawl failures. Page-shape violations never show up here; they
/// are contained per subregion and only logged.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error("sink write failed: {0}")]
    Sink(#[from] std::io::Error),

    #[error("crawl task panicked: {0}")]
    TaskPanic(String),
}

/// Counters reported at the end of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CrawlStats {
    pub regions: usize,
    pub subregions_ok: usize,
    pub subregions_skipped: usize,
    pub records: usize,
}

/// Walks the region → subregion → station tree.
///
/// Regions are crawled sequentially: their listing fetches are cheap,
/// and the subregion fan-out below already keeps the whole pool busy.
/// Subregions within one region run concurrently, bounded by the pool.
pub struct Crawler<S: Surface> {
    pool: Arc<SurfacePool<S>>,
    navigator: Arc<Navigator>,
    prompt: Arc<dyn CaptchaPrompt>,
    urls: UrlBuilder,
    root_url: String,
    exception_regions: Vec<String>,
}

impl<S: Surface> Crawler<S> {
    pub fn new(
        config: &CrawlConfig,
        pool: Arc<SurfacePool<S>>,
        prompt: Arc<dyn CaptchaPrompt>,
    ) -> Self {
        Self {
            pool,
            navigator: Arc::new(Navigator::new()),
            prompt,
            urls: config.url_builder(),
            root_url: config.root_url.clone(),
            exception_regions: config.exception_regions.clone(),
        }
    }

    /// Crawl the whole tree, streaming records into `sink`.
    pub async fn run(&self, sink: SharedSink) -> Result<CrawlStats, CrawlError> {
        info!("fetching regions");
        let regions = self.fetch_regions().await?;
        info!("total region count: {}", regions.len());

        let mut stats = CrawlStats {
            regions: regions.len(),
            ..CrawlStats::default()
        };

        for region in &regions {
            let subregions = self.fetch_subregions(region).await?;
            debug!(
                "total subregion count for {}/{}: {}",
                region.name,
                region.id,
                subregions.len()
            );

            let mut tasks: FuturesUnordered<_> = subregions
                .into_iter()
                .map(|subregion| self.scrape_subregion(region, subregion, Arc::clone(&sink)))
                .collect();

            while let Some(outcome) = tasks.next().await {
                match outcome? {
                    Some(written) => {
                        stats.subregions_ok += 1;
                        stats.records += written;
                    }
                    None => stats.subregions_skipped += 1,
                }
            }
        }

        info!(
            "crawl finished: {} regions, {} subregions ({} skipped), {} records",
            stats.regions, stats.subregions_ok, stats.subregions_skipped, stats.records
        );
        Ok(stats)
    }

    /// Enumerate regions from the root listing page.
    async fn fetch_regions(&self) -> Result<Vec<Region>, CrawlError> {
        let entries = self.fetch_listing(self.root_url.clone()).await?;
        Ok(entries
            .into_iter()
            .map(|entry| Region {
                id: entry.token,
                name: entry.name,
            })
            .collect())
    }

    /// Enumerate one region's subregions, or synthesize the region
    /// itself for exception regions that have no sub-level.
    async fn fetch_subregions(&self, region: &Region) -> Result<Vec<Subregion>, CrawlError> {
        if self.exception_regions.contains(&region.id) {
            info!("exception region: {}/{}", region.name, region.id);
            return Ok(vec![Subregion::from_region(region)]);
        }

        debug!("loading region listing: {}/{}", region.name, region.id);
        let entries = self
            .fetch_listing(self.urls.region_listing(&region.id))
            .await?;
        Ok(entries
            .into_iter()
            .map(|entry| Subregion {
                id: entry.token,
                name: entry.name,
                parent_region_id: region.id.clone(),
            })
            .collect())
    }

    /// Scrape one subregion's results page and write its records.
    /// Returns `Ok(None)` when the page's shape was rejected and the
    /// subregion skipped.
    async fn scrape_subregion(
        &self,
        region: &Region,
        subregion: Subregion,
        sink: SharedSink,
    ) -> Result<Option<usize>, CrawlError> {
        debug!(
            "loading subregion results: {}/{}",
            subregion.name, subregion.id
        );
        let html = self
            .fetch_page(self.urls.subregion_results(&subregion.id))
            .await?;

        let pairs = match extract::parse_results_page(&html) {
            Ok(pairs) => pairs,
            Err(err) => {
                error!(
                    "skipping subregion {}/{}: {}",
                    subregion.name, subregion.id, err
                );
                return Ok(None);
            }
        };

        let records = extract::build_records(region, &subregion, pairs);
        let written = records.len();
        {
            let mut sink = sink.lock().unwrap();
            for record in &records {
                sink.write_record(record)?;
            }
        }

        debug!(
            "subregion done: {}/{}, {} stations",
            subregion.name, subregion.id, written
        );
        Ok(Some(written))
    }

    async fn fetch_listing(&self, url: String) -> Result<Vec<extract::ListingEntry>, CrawlError> {
        let html = self.fetch_page(url).await?;
        Ok(extract::parse_listing(&html))
    }

    /// Acquire a surface, drive it to `url`, and return the loaded
    /// document. The surface goes back to the pool on every path.
    async fn fetch_page(&self, url: String) -> Result<String, CrawlError> {
        let surface = self.pool.acquire().await;
        let navigator = Arc::clone(&self.navigator);
        let prompt = Arc::clone(&self.prompt);

        let joined = task::spawn_blocking(move || {
            let result = navigator
                .goto(&surface, prompt.as_ref(), &url)
                .and_then(|()| surface.content());
            (surface, result)
        })
        .await;

        match joined {
            Ok((surface, result)) => {
                self.pool.release(surface);
                Ok(result?)
            }
            // The surface died with the panicking task; without a
            // replacement contract this ends the run.
            Err(err) => Err(CrawlError::TaskPanic(err.to_string())),
        }
    }
}
