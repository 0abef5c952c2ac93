use anyhow::{Context, Result, anyhow};
use csv::{ReaderBuilder, Writer};
use std::path::Path;

/// An in-memory CSV table.
///
/// Cells stay as raw strings; no typed schema is imposed. Row order is
/// preserved by both [`read_csv`] and [`Table::write_csv`].
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Column names, from the header row
    pub headers: Vec<String>,
    /// Data rows, one Vec of cells per row
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Position of a column by exact header name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Resolve a column that must exist, naming the available headers on failure
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| {
            anyhow!(
                "Column {:?} not found; available columns: {}",
                name,
                self.headers.join(", ")
            )
        })
    }

    /// Append a column. `values` must hold one cell per existing row.
    pub fn push_column(&mut self, name: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.rows.len());
        self.headers.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    /// Write the table as CSV: the header row, then data rows in order
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = Writer::from_path(path)
            .context(format!("Failed to create output file: {:?}", path))?;
        writer
            .write_record(&self.headers)
            .context("Failed to write CSV header")?;
        for row in &self.rows {
            writer
                .write_record(row)
                .context(format!("Failed to write CSV row to {:?}", path))?;
        }
        writer
            .flush()
            .context(format!("Failed to flush output file: {:?}", path))?;
        Ok(())
    }
}

/// Read a CSV file into a [`Table`].
///
/// The first record is taken as the header row. Fails if the file is
/// missing, unreadable, or not valid CSV.
pub fn read_csv(path: &Path) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .from_path(path)
        .context(format!("Failed to open input file: {:?}", path))?;

    let headers = reader
        .headers()
        .context(format!("Failed to read CSV header from {:?}", path))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context(format!("Failed to read CSV record from {:?}", path))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    fn write_temp_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_read_csv() {
        let file = write_temp_csv("name,country,venue\nWorld Cup,France,Paris\nOpen,Japan,Tokyo\n");
        let table = read_csv(file.path()).unwrap();

        assert_eq!(table.headers, vec!["name", "country", "venue"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["World Cup", "France", "Paris"]);
        assert_eq!(table.rows[1], vec!["Open", "Japan", "Tokyo"]);
    }

    #[test]
    fn test_read_csv_missing_file() {
        let result = read_csv(Path::new("does-not-exist.csv"));
        assert!(result.is_err());
    }

    #[test]
    fn test_read_preserves_quoted_commas() {
        let file = write_temp_csv("country,venue\n\"France, Île-de-France\",Stade de France\n");
        let table = read_csv(file.path()).unwrap();
        assert_eq!(table.rows[0][0], "France, Île-de-France");
    }

    #[test]
    fn test_round_trip_preserves_rows_and_order() {
        let table = Table {
            headers: vec!["country".to_string(), "venue".to_string()],
            rows: vec![
                vec!["Spain".to_string(), "Madrid Arena".to_string()],
                vec!["France, Île-de-France".to_string(), "Bercy".to_string()],
            ],
        };

        let file = NamedTempFile::new().unwrap();
        table.write_csv(file.path()).unwrap();
        let read_back = read_csv(file.path()).unwrap();

        assert_eq!(read_back, table);
    }

    #[test]
    fn test_column_lookup() {
        let table = Table {
            headers: vec!["country".to_string(), "venue".to_string()],
            rows: vec![],
        };

        assert_eq!(table.column_index("venue"), Some(1));
        assert_eq!(table.column_index("date"), None);
        assert!(table.require_column("country").is_ok());

        let err = table.require_column("date").unwrap_err();
        assert!(err.to_string().contains("date"));
        assert!(err.to_string().contains("country, venue"));
    }

    #[test]
    fn test_push_column() {
        let mut table = Table {
            headers: vec!["venue".to_string()],
            rows: vec![vec!["Bercy".to_string()], vec!["Stadhalle".to_string()]],
        };

        table.push_column("latitude", vec!["48.8".to_string(), String::new()]);

        assert_eq!(table.headers, vec!["venue", "latitude"]);
        assert_eq!(table.rows[0], vec!["Bercy", "48.8"]);
        assert_eq!(table.rows[1], vec!["Stadhalle", ""]);
    }
}
