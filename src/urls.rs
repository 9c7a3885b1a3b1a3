/// Root listing page: exposes the region selector for the whole vote.
pub const DEFAULT_ROOT_URL: &str = "http://www.vybory.izbirkom.ru/region/region/izbirkom?action=show&root=1&tvd=100100163596969&vrn=100100163596966";

/// Base path shared by region listing and results pages.
pub const DEFAULT_BASE_URL: &str = "http://www.vybory.izbirkom.ru/region/amur";

/// Voting-round identifier.
pub const DEFAULT_VRN: &str = "100100163596966";

/// Results-type code selecting the per-station statistics view.
pub const DEFAULT_RESULTS_TYPE: &str = "465";

/// Builds the site's listing and results URLs from the configured
/// base path, voting round and results-type code.
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    base: String,
    vrn: String,
    results_type: String,
}

impl UrlBuilder {
    pub fn new(base: impl Into<String>, vrn: impl Into<String>, results_type: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            vrn: vrn.into(),
            results_type: results_type.into(),
        }
    }

    /// Listing page of one region's subregions.
    pub fn region_listing(&self, region: &str) -> String {
        format!("{}?action=show&vrn={}&tvd={}", self.base, self.vrn, region)
    }

    /// Results page with the per-station tables of one subregion.
    pub fn subregion_results(&self, subregion: &str) -> String {
        format!(
            "{}?action=show&vrn={}&tvd={}&type={}",
            self.base, self.vrn, subregion, self.results_type
        )
    }

    /// Detail page for a single station. Not used by the crawl itself,
    /// kept for parity with the site's URL scheme.
    pub fn station_results(&self, subregion: &str, station: &str) -> String {
        format!(
            "{}?action=show&vrn={}&tvd={}&vibid={}&type={}",
            self.base, self.vrn, subregion, station, self.results_type
        )
    }
}

impl Default for UrlBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_VRN, DEFAULT_RESULTS_TYPE)
    }
}
