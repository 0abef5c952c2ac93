use anyhow::Result;

use crate::countries::is_european;
use crate::table::Table;

/// Filter competition records down to European countries.
///
/// Retains rows whose country cell, after stripping any trailing
/// ", region" qualifier, is on the allowlist. Retained rows pass through
/// unchanged and keep their input order; rows with a missing or empty
/// country cell are dropped.
///
/// # Arguments
/// * `table` - Input records
/// * `country_column` - Name of the column holding the country value
///
/// # Returns
/// * A new table with the same headers and only the matching rows
/// * `Err` if `country_column` is not present
pub fn filter_competitions(table: &Table, country_column: &str) -> Result<Table> {
    let idx = table.require_column(country_column)?;

    let rows = table
        .rows
        .iter()
        .filter(|row| row.get(idx).is_some_and(|cell| is_european(cell)))
        .cloned()
        .collect();

    Ok(Table {
        headers: table.headers.clone(),
        rows,
    })
}
