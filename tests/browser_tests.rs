/// Browser surface tests
/// These tests require Chrome/Chromium to be installed
/// Run with: cargo test --test browser_tests -- --ignored
use izbirkom_scraper::browser::{BrowserConfig, BrowserManager, Surface, TabSurface};
use std::time::Duration;

fn surface(manager: &BrowserManager) -> TabSurface {
    TabSurface::new(
        manager.new_tab().expect("failed to open a tab"),
        Duration::from_secs(15),
    )
}

#[test]
#[ignore] // Requires Chrome/Chromium
fn browser_launches_and_opens_tabs() {
    let manager = BrowserManager::new(BrowserConfig::headless());
    assert!(
        manager.is_ok(),
        "Failed to launch browser. Is Chrome/Chromium installed?"
    );
    assert!(manager.unwrap().new_tab().is_ok());
}

#[test]
#[ignore] // Requires Chrome/Chromium and internet
fn navigation_and_content_extraction() {
    let manager =
        BrowserManager::new(BrowserConfig::headless()).expect("Chrome/Chromium not installed");
    let surface = surface(&manager);

    surface.navigate("https://example.com").unwrap();
    let html = surface.content().unwrap();

    assert!(html.contains("<html"), "Should contain HTML tags");
    assert!(html.len() > 100);
}

#[test]
#[ignore] // Requires Chrome/Chromium and internet
fn element_queries_see_the_loaded_document() {
    let manager =
        BrowserManager::new(BrowserConfig::headless()).expect("Chrome/Chromium not installed");
    let surface = surface(&manager);

    surface.navigate("https://example.com").unwrap();

    assert!(surface.has_element("h1").unwrap());
    assert!(!surface.has_element("#captchaImg").unwrap());
}
