use super::manager::BrowserError;
use headless_chrome::Tab;
use std::sync::Arc;
use std::time::Duration;

/// The browsing capability the crawler needs from one tab.
///
/// The navigator and orchestrator only talk to this trait, so both can be
/// exercised against scripted in-memory surfaces instead of a live browser.
pub trait Surface: Send + 'static {
    /// Navigate to `url` and wait for the document to load, within the
    /// surface's navigation timeout.
    fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    /// Wait for an in-flight page transition (e.g. after activating a
    /// submit control) to complete.
    fn wait_for_navigation(&self) -> Result<(), BrowserError>;

    /// Whether the current document contains an element matching the
    /// CSS selector.
    fn has_element(&self, selector: &str) -> Result<bool, BrowserError>;

    /// Click the first element matching the CSS selector.
    fn click(&self, selector: &str) -> Result<(), BrowserError>;

    /// The current document's HTML.
    fn content(&self) -> Result<String, BrowserError>;
}

/// `Surface` implementation over a real browser tab.
pub struct TabSurface {
    tab: Arc<Tab>,
}

impl TabSurface {
    pub fn new(tab: Arc<Tab>, navigation_timeout: Duration) -> Self {
        tab.set_default_timeout(navigation_timeout);
        Self { tab }
    }

    fn query_selector_script(selector: &str, suffix: &str) -> String {
        format!(
            r#"document.querySelector('{}'){}"#,
            selector.replace('\'', "\\'"),
            suffix
        )
    }
}

impl Surface for TabSurface {
    fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.tab
            .navigate_to(url)
            .map_err(|e| BrowserError::Navigation(format!("{}: {}", url, e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| BrowserError::Navigation(format!("{}: {}", url, e)))?;

        Ok(())
    }

    fn wait_for_navigation(&self) -> Result<(), BrowserError> {
        self.tab
            .wait_until_navigated()
            .map_err(|e| BrowserError::Navigation(e.to_string()))?;

        Ok(())
    }

    fn has_element(&self, selector: &str) -> Result<bool, BrowserError> {
        let script = Self::query_selector_script(selector, " !== null");

        let result = self
            .tab
            .evaluate(&script, false)
            .map_err(|e| BrowserError::Evaluation(e.to_string()))?;

        Ok(result.value.and_then(|v| v.as_bool()).unwrap_or(false))
    }

    fn click(&self, selector: &str) -> Result<(), BrowserError> {
        let script = Self::query_selector_script(selector, ".click();");

        self.tab
            .evaluate(&script, false)
            .map_err(|e| BrowserError::Evaluation(format!("click on {}: {}", selector, e)))?;

        Ok(())
    }

    fn content(&self) -> Result<String, BrowserError> {
        self.tab
            .get_content()
            .map_err(|e| BrowserError::ContentExtraction(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_quotes_are_escaped() {
        let script = TabSurface::query_selector_script("a[href='x']", " !== null");
        assert_eq!(script, r#"document.querySelector('a[href=\'x\']') !== null"#);
    }
}
