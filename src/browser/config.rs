use std::time::Duration;

/// Configuration for the shared browser instance.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run the browser in headless mode. Off by default: CAPTCHA
    /// challenges are solved by a human looking at the window.
    pub headless: bool,

    /// Browser window size.
    pub window_size: (u32, u32),

    /// Per-tab navigation timeout in seconds.
    pub navigation_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            window_size: (1280, 1024),
            navigation_timeout_secs: 15,
        }
    }
}

impl BrowserConfig {
    /// Headless configuration for automated runs where no CAPTCHA is
    /// expected (smoke tests, replays).
    pub fn headless() -> Self {
        Self {
            headless: true,
            ..Self::default()
        }
    }

    /// Navigation timeout as a `Duration`.
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_visible() {
        let config = BrowserConfig::default();
        assert!(!config.headless);
        assert_eq!(config.navigation_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn headless_config() {
        let config = BrowserConfig::headless();
        assert!(config.headless);
    }
}
