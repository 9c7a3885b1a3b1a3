//! Pure extraction of per-station statistics from a results page.
//!
//! Everything here works on an already-fetched HTML snapshot; no browser
//! types appear. The awkward part of the source site is that a results
//! page with many stations splits them across two tables: the "main"
//! table carries chunks of seven physical rows, and a prefix of stations
//! overflows into a second left-aligned table whose columns are already
//! aligned to the seven logical rows. The site interleaves one overflow
//! column after each main chunk, so a naive row-major parse silently
//! attributes statistics to the wrong station. `merge_columns` restores
//! the document order.

use crate::models::{Region, StationRecord, Subregion};
use log::debug;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Header row cells of the station table; each cell links one station.
const STATION_HEADER_CELLS: &str = "table table div > table tr:nth-child(1) td";

/// Value cells of the left-hand table: the subregion totals column
/// followed by any overflowed station columns.
const OVERFLOW_VALUE_CELLS: &str =
    r#"table table td > table[align="left"] tr:not(:nth-child(1)) td:nth-child(3)"#;

/// Metric rows of the main station table, header row excluded.
const MAIN_TABLE_ROWS: &str = "table table div > table tr:not(:nth-child(1))";

/// Options of the region/subregion selector on a listing page.
const LISTING_OPTIONS: &str = r#"form[name="go_reg"] option"#;

/// Physical rows per logical station column: registered, attended,
/// voted, invalid, a blank spacer, yes, no.
pub const METRIC_ROWS: usize = 7;

/// Index of the known-blank spacer row within a column.
const SPACER_ROW: usize = 4;

const REGISTERED_ROW: usize = 0;
const ATTENDED_ROW: usize = 1;
const VOTED_ROW: usize = 2;
const INVALID_ROW: usize = 3;
const YES_ROW: usize = 5;
const NO_ROW: usize = 6;

/// One station's metric cells, indexed by logical row. `None` marks a
/// cell that is absent from the document.
pub type MetricColumn = Vec<Option<String>>;

/// Station identity from one header cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationHeader {
    pub id: Option<String>,
    pub name: String,
}

/// One option of a listing page's region/subregion selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub token: String,
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("overflow table has {0} value cells, not a multiple of {METRIC_ROWS}")]
    OverflowShape(usize),

    #[error("main table has {0} metric rows, not a multiple of {METRIC_ROWS}")]
    MainShape(usize),

    #[error("merged {columns} metric columns for {stations} station headers")]
    CountMismatch { columns: usize, stations: usize },
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

/// Text of the cell's `<b>` value element, if any.
fn cell_value(cell: ElementRef) -> Option<String> {
    let bold = selector("b");
    cell.select(&bold)
        .next()
        .map(|b| b.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Parse a listing page's selector options into `(token, name)` entries.
/// Options whose value embeds no `tvd` token (headings, placeholders)
/// are dropped.
pub fn parse_listing(html: &str) -> Vec<ListingEntry> {
    let document = Html::parse_document(html);
    let options = selector(LISTING_OPTIONS);
    let token_pattern = Regex::new(r"&tvd=(\d+)").unwrap();

    document
        .select(&options)
        .filter_map(|option| {
            let value = option.value().attr("value")?;
            let token = token_pattern.captures(value)?[1].to_string();
            let name = option.text().collect::<String>().trim().to_string();
            Some(ListingEntry { token, name })
        })
        .collect()
}

/// Header cells in document order; this order is the canonical station
/// index for the whole page.
fn parse_station_headers(document: &Html) -> Vec<StationHeader> {
    let cells = selector(STATION_HEADER_CELLS);
    let anchors = selector("a");
    let station_pattern = Regex::new(r"&vibid=(\d+)").unwrap();

    document
        .select(&cells)
        .map(|cell| {
            let anchor = cell.select(&anchors).next();
            let name = anchor
                .map(|a| a.text().collect::<String>())
                .unwrap_or_else(|| cell.text().collect::<String>())
                .trim()
                .to_string();
            let id = anchor
                .and_then(|a| a.value().attr("href"))
                .and_then(|href| station_pattern.captures(href))
                .map(|captures| captures[1].to_string());
            StationHeader { id, name }
        })
        .collect()
}

/// Station columns of the overflow table. The table's first column group
/// holds the subregion totals and is excluded.
fn parse_overflow_columns(document: &Html) -> Result<Vec<MetricColumn>, ExtractError> {
    let cells = selector(OVERFLOW_VALUE_CELLS);
    let values: Vec<Option<String>> = document.select(&cells).map(cell_value).collect();

    if values.len() % METRIC_ROWS != 0 {
        return Err(ExtractError::OverflowShape(values.len()));
    }

    Ok(values
        .chunks_exact(METRIC_ROWS)
        .skip(1) // subregion totals column
        .map(|chunk| chunk.to_vec())
        .collect())
}

/// Station columns of the main table, grouped by seven-row chunk in
/// document order. A chunk's column count is the narrowest of its
/// non-spacer rows; chunks with no columns are dropped.
fn parse_main_chunks(document: &Html) -> Result<Vec<Vec<MetricColumn>>, ExtractError> {
    let row_selector = selector(MAIN_TABLE_ROWS);
    let cell_selector = selector("td");

    let rows: Vec<ElementRef> = document.select(&row_selector).collect();
    if rows.len() % METRIC_ROWS != 0 {
        return Err(ExtractError::MainShape(rows.len()));
    }

    let mut chunks = Vec::new();
    for chunk_rows in rows.chunks_exact(METRIC_ROWS) {
        let cells: Vec<Vec<Option<String>>> = chunk_rows
            .iter()
            .map(|row| row.select(&cell_selector).map(cell_value).collect())
            .collect();

        let width = cells
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != SPACER_ROW)
            .map(|(_, row)| row.len())
            .min()
            .unwrap_or(0);
        if width == 0 {
            continue;
        }

        let columns: Vec<MetricColumn> = (0..width)
            .map(|column| {
                cells
                    .iter()
                    .map(|row| row.get(column).cloned().flatten())
                    .collect()
            })
            .collect();
        chunks.push(columns);
    }

    Ok(chunks)
}

/// Restore document order across the split: each main chunk is followed
/// by one overflow column while any remain, and leftover overflow
/// columns are appended at the end.
pub fn merge_columns(main: Vec<Vec<MetricColumn>>, overflow: Vec<MetricColumn>) -> Vec<MetricColumn> {
    let mut overflow = overflow.into_iter();
    let mut merged = Vec::new();

    for chunk in main {
        merged.extend(chunk);
        if let Some(column) = overflow.next() {
            merged.push(column);
        }
    }
    merged.extend(overflow);

    merged
}

/// Extract one results page into `(station, column)` pairs.
///
/// The station count and the merged column count must agree exactly;
/// a mismatch means the page's shape was misread and padding or dropping
/// would attribute statistics to the wrong stations.
pub fn parse_results_page(html: &str) -> Result<Vec<(StationHeader, MetricColumn)>, ExtractError> {
    let document = Html::parse_document(html);

    let stations = parse_station_headers(&document);
    let overflow = parse_overflow_columns(&document)?;
    let main = parse_main_chunks(&document)?;
    let merged = merge_columns(main, overflow);

    if merged.len() != stations.len() {
        debug!("raw merged columns: {:?}", merged);
        return Err(ExtractError::CountMismatch {
            columns: merged.len(),
            stations: stations.len(),
        });
    }

    Ok(stations.into_iter().zip(merged).collect())
}

fn metric(column: &MetricColumn, row: usize) -> u32 {
    column
        .get(row)
        .and_then(|value| value.as_deref())
        .and_then(|text| text.trim().parse().ok())
        .unwrap_or(0)
}

/// Zip extracted pairs into sink-ready records. Missing or unparsable
/// metric cells become zero; a page with partial numbers is worth more
/// than no page at all.
pub fn build_records(
    region: &Region,
    subregion: &Subregion,
    pairs: Vec<(StationHeader, MetricColumn)>,
) -> Vec<StationRecord> {
    pairs
        .into_iter()
        .map(|(station, column)| StationRecord {
            region_id: region.id.clone(),
            subregion_id: subregion.id.clone(),
            station_id: station.id,
            region_name: region.name.clone(),
            subregion_name: subregion.name.clone(),
            station_name: station.name,
            registered: metric(&column, REGISTERED_ROW),
            attended: metric(&column, ATTENDED_ROW),
            voted: metric(&column, VOTED_ROW),
            invalid: metric(&column, INVALID_ROW),
            yes: metric(&column, YES_ROW),
            no: metric(&column, NO_ROW),
        })
        .collect()
}
