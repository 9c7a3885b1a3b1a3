//! Browser automation layer.
//!
//! The results site renders its tables server-side but sits behind a
//! session/CAPTCHA gate, so every page is fetched through a real browser
//! tab rather than a plain HTTP client. This module owns the browser
//! process and exposes each tab through the [`Surface`] trait, which is
//! the only contact point the rest of the crate has with the browser.
//!
//! # Example
//!
//! ```no_run
//! use izbirkom_scraper::browser::{BrowserConfig, BrowserManager, Surface, TabSurface};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BrowserConfig::default();
//! let timeout = config.navigation_timeout();
//! let manager = BrowserManager::new(config)?;
//!
//! let surface = TabSurface::new(manager.new_tab()?, timeout);
//! surface.navigate("https://example.com")?;
//! let html = surface.content()?;
//!
//! println!("fetched {} bytes", html.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod manager;
pub mod surface;

// Re-export main types for convenience
pub use config::BrowserConfig;
pub use manager::{BrowserError, BrowserManager};
pub use surface::{Surface, TabSurface};
