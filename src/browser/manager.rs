use super::config::BrowserConfig;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;

/// Owns the browser process and hands out tabs.
pub struct BrowserManager {
    browser: Arc<Browser>,
    config: BrowserConfig,
}

impl BrowserManager {
    /// Launch a browser with the given configuration.
    pub fn new(config: BrowserConfig) -> Result<Self, BrowserError> {
        let launch_options = Self::build_launch_options(&config)?;

        let browser = Browser::new(launch_options)
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        Ok(Self {
            browser: Arc::new(browser),
            config,
        })
    }

    fn build_launch_options(config: &BrowserConfig) -> Result<LaunchOptions, BrowserError> {
        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some((config.window_size.0, config.window_size.1)))
            .build()
            .map_err(|e| BrowserError::Configuration(e.to_string()))?;

        Ok(options)
    }

    /// Open a new tab. Tabs are created once at startup and then cycled
    /// through the surface pool; a tab that dies is not replaced.
    pub fn new_tab(&self) -> Result<Arc<Tab>, BrowserError> {
        self.browser
            .new_tab()
            .map_err(|e| BrowserError::TabCreation(e.to_string()))
    }

    /// Get the browser configuration.
    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }
}

/// Errors that can occur during browser operations.
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("browser configuration error: {0}")]
    Configuration(String),

    #[error("tab creation failed: {0}")]
    TabCreation(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("script evaluation failed: {0}")]
    Evaluation(String),

    #[error("page content extraction failed: {0}")]
    ContentExtraction(String),

    #[error("human input channel closed: {0}")]
    HumanInputClosed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_options_build() {
        let config = BrowserConfig::headless();
        let options = BrowserManager::build_launch_options(&config);
        assert!(options.is_ok());
    }

    #[test]
    #[ignore] // Requires Chrome/Chromium to be installed
    fn browser_manager_creation() {
        let config = BrowserConfig::headless();
        if let Ok(manager) = BrowserManager::new(config) {
            assert!(manager.new_tab().is_ok());
        }
    }
}
