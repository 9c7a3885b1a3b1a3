use izbirkom_scraper::browser::{BrowserManager, TabSurface};
use izbirkom_scraper::config::{Config, OutputFormat};
use izbirkom_scraper::crawler::Crawler;
use izbirkom_scraper::navigator::StdinPrompt;
use izbirkom_scraper::normalize;
use izbirkom_scraper::pool::SurfacePool;
use izbirkom_scraper::sink::{CsvSink, JsonLinesSink, RecordSink, SharedSink};
use log::{info, LevelFilter};
use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::{Arc, Mutex};

fn open_sink(config: &Config) -> std::io::Result<Box<dyn RecordSink>> {
    let file = BufWriter::new(File::create(&config.output_path)?);
    Ok(match config.output_format {
        OutputFormat::Csv => Box::new(CsvSink::new(file)?),
        OutputFormat::JsonLines => Box::new(JsonLinesSink::new(file)),
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    // `izbirkom-scraper normalize <in> <out>` sorts a finished CSV.
    let args: Vec<String> = std::env::args().collect();
    if args.len() == 4 && args[1] == "normalize" {
        normalize::normalize_csv(Path::new(&args[2]), Path::new(&args[3]))?;
        return Ok(());
    }

    let config = Config::load();
    let sink: SharedSink = Arc::new(Mutex::new(open_sink(&config)?));

    let browser_config = config.browser_config();
    let navigation_timeout = browser_config.navigation_timeout();
    let manager = BrowserManager::new(browser_config)?;

    let mut surfaces = Vec::with_capacity(config.crawl.pool_size);
    for _ in 0..config.crawl.pool_size {
        surfaces.push(TabSurface::new(manager.new_tab()?, navigation_timeout));
    }
    info!("browser ready with {} tabs", surfaces.len());

    let pool = Arc::new(SurfacePool::new(surfaces));
    let crawler = Crawler::new(&config.crawl, pool, Arc::new(StdinPrompt::new()));

    crawler.run(Arc::clone(&sink)).await?;
    sink.lock().unwrap().flush()?;

    info!("output written to {}", config.output_path);
    Ok(())
}
