use serde::Serialize;

/// Root-level administrative unit, parsed from the root listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Opaque `tvd` token embedded in the listing option's value.
    pub id: String,
    pub name: String,
}

/// Second-level unit, parsed from a region's listing page. Exception
/// regions have no listing of their own and are crawled as a single
/// subregion equal to the region itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subregion {
    pub id: String,
    pub name: String,
    pub parent_region_id: String,
}

impl Subregion {
    /// Synthesize the sole subregion of an exception region; it points
    /// back at the region itself.
    pub fn from_region(region: &Region) -> Self {
        Self {
            id: region.id.clone(),
            name: region.name.clone(),
            parent_region_id: region.id.clone(),
        }
    }
}

/// One polling station's statistics from a subregion results page.
/// Constructed once, written to the sink, then discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationRecord {
    pub region_id: String,
    pub subregion_id: String,
    /// `vibid` token from the station header's link; some page variants
    /// render the header without one.
    pub station_id: Option<String>,
    pub region_name: String,
    pub subregion_name: String,
    pub station_name: String,
    pub registered: u32,
    pub attended: u32,
    pub voted: u32,
    pub invalid: u32,
    pub yes: u32,
    pub no: u32,
}
