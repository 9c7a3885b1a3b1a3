use crate::browser::BrowserConfig;
use crate::urls::{self, UrlBuilder};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Path of the output file.
    #[serde(default = "default_output_path")]
    pub output_path: String,

    #[serde(default)]
    pub output_format: OutputFormat,

    #[serde(default)]
    pub crawl: CrawlConfig,

    #[serde(default)]
    pub browser: BrowserSection,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Csv,
    JsonLines,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CrawlConfig {
    /// Number of browser tabs cycled through the pool.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Root listing page exposing the region selector.
    #[serde(default = "default_root_url")]
    pub root_url: String,

    /// Base path for region listing and results pages.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Voting-round identifier embedded in every URL.
    #[serde(default = "default_vrn")]
    pub vrn: String,

    /// Results-type code selecting the per-station statistics view.
    #[serde(default = "default_results_type")]
    pub results_type: String,

    /// Regions with no subregion level; each is crawled as its own sole
    /// subregion.
    #[serde(default = "default_exception_regions")]
    pub exception_regions: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BrowserSection {
    /// The CAPTCHA is solved by looking at the window, so the browser
    /// is visible unless explicitly turned off.
    #[serde(default)]
    pub headless: bool,

    #[serde(default = "default_window_width")]
    pub window_width: u32,

    #[serde(default = "default_window_height")]
    pub window_height: u32,

    /// Per-navigation timeout in seconds.
    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout_secs: u64,
}

fn default_output_path() -> String {
    "data.csv".to_string()
}
fn default_pool_size() -> usize {
    16
}
fn default_root_url() -> String {
    urls::DEFAULT_ROOT_URL.to_string()
}
fn default_base_url() -> String {
    urls::DEFAULT_BASE_URL.to_string()
}
fn default_vrn() -> String {
    urls::DEFAULT_VRN.to_string()
}
fn default_results_type() -> String {
    urls::DEFAULT_RESULTS_TYPE.to_string()
}
fn default_exception_regions() -> Vec<String> {
    vec![
        "100100164050019".to_string(), // Baikonur
        "100100164050020".to_string(), // territories outside the country
    ]
}
fn default_window_width() -> u32 {
    1280
}
fn default_window_height() -> u32 {
    1024
}
fn default_navigation_timeout() -> u64 {
    15
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            root_url: default_root_url(),
            base_url: default_base_url(),
            vrn: default_vrn(),
            results_type: default_results_type(),
            exception_regions: default_exception_regions(),
        }
    }
}

impl Default for BrowserSection {
    fn default() -> Self {
        Self {
            headless: false,
            window_width: default_window_width(),
            window_height: default_window_height(),
            navigation_timeout_secs: default_navigation_timeout(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            output_format: OutputFormat::Csv,
            crawl: CrawlConfig::default(),
            browser: BrowserSection::default(),
        }
    }
}

impl Config {
    /// Read `config.toml` from the working directory, falling back to
    /// the defaults when the file is missing or malformed.
    pub fn load() -> Self {
        let path = Path::new("config.toml");
        if path.exists() {
            if let Ok(content) = fs::read_to_string(path) {
                if let Ok(cfg) = toml::from_str::<Config>(&content) {
                    return cfg;
                }
            }
        }
        Self::default()
    }

    pub fn browser_config(&self) -> BrowserConfig {
        BrowserConfig {
            headless: self.browser.headless,
            window_size: (self.browser.window_width, self.browser.window_height),
            navigation_timeout_secs: self.browser.navigation_timeout_secs,
        }
    }
}

impl CrawlConfig {
    pub fn url_builder(&self) -> UrlBuilder {
        UrlBuilder::new(
            self.base_url.clone(),
            self.vrn.clone(),
            self.results_type.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_deployment() {
        let config = Config::default();
        assert_eq!(config.crawl.pool_size, 16);
        assert_eq!(config.output_path, "data.csv");
        assert_eq!(config.output_format, OutputFormat::Csv);
        assert_eq!(config.crawl.exception_regions.len(), 2);
        assert!(!config.browser.headless);
    }

    #[test]
    fn partial_toml_keeps_defaults_elsewhere() {
        let config: Config = toml::from_str(
            r#"
            output_format = "json-lines"

            [crawl]
            pool_size = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.output_format, OutputFormat::JsonLines);
        assert_eq!(config.crawl.pool_size, 4);
        assert_eq!(config.crawl.vrn, urls::DEFAULT_VRN);
        assert_eq!(config.browser.navigation_timeout_secs, 15);
    }
}
