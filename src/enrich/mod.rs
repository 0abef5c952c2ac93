use anyhow::{Context, Result};

use crate::api::Coordinates;
use crate::table::Table;

/// Header names of the appended coordinate columns
pub const LATITUDE_COLUMN: &str = "latitude";
pub const LONGITUDE_COLUMN: &str = "longitude";

/// Counts reported after an enrichment pass
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct EnrichStats {
    /// Rows whose venue resolved to coordinates
    pub resolved: usize,
    /// Rows the service returned no candidate for
    pub unresolved: usize,
}

/// Append `latitude`/`longitude` columns resolved from the venue column.
///
/// Issues one lookup per row, in row order. A lookup returning `Ok(None)`
/// leaves both cells empty for that row. The first lookup error aborts the
/// whole pass and leaves the table untouched. Existing cells are never
/// modified, and no row is dropped or reordered.
///
/// # Arguments
/// * `table` - Records to enrich, mutated in place on success
/// * `venue_column` - Name of the column holding the venue text
/// * `lookup` - Resolver for one venue query (see [`crate::api::GeocodeClient::lookup`])
pub fn enrich_table<F>(table: &mut Table, venue_column: &str, mut lookup: F) -> Result<EnrichStats>
where
    F: FnMut(&str) -> Result<Option<Coordinates>>,
{
    let venue_idx = table.require_column(venue_column)?;

    let mut stats = EnrichStats::default();
    let mut latitudes = Vec::with_capacity(table.rows.len());
    let mut longitudes = Vec::with_capacity(table.rows.len());

    for row in &table.rows {
        let venue = row.get(venue_idx).map(String::as_str).unwrap_or("");
        match lookup(venue).context(format!("Geocoding failed for venue {:?}", venue))? {
            Some(coords) => {
                stats.resolved += 1;
                latitudes.push(coords.lat.to_string());
                longitudes.push(coords.lng.to_string());
            }
            None => {
                stats.unresolved += 1;
                latitudes.push(String::new());
                longitudes.push(String::new());
            }
        }
    }

    table.push_column(LATITUDE_COLUMN, latitudes);
    table.push_column(LONGITUDE_COLUMN, longitudes);

    Ok(stats)
}
