// Library interface for izbirkom_scraper
// This allows tests and external crates to use the crawler components

pub mod browser;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod models;
pub mod navigator;
pub mod normalize;
pub mod pool;
pub mod sink;
pub mod urls;
