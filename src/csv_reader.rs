use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

use crate::error::ValidationError;

/// Raw CSV contents: header row plus string records
#[derive(Debug, Clone)]
pub struct CsvData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Reject anything that does not carry a `.csv` extension.
///
/// Only the file name is checked; contents are never sniffed.
pub fn check_extension(path: &Path) -> std::result::Result<(), ValidationError> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        Ok(())
    } else {
        Err(ValidationError::WrongFileType(path.display().to_string()))
    }
}

/// Read a CSV file after checking its extension
pub fn read_csv_file(path: &Path) -> Result<CsvData> {
    check_extension(path)?;
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    read_csv(file).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Read CSV from any reader. Records may be ragged; every cell is trimmed.
pub fn read_csv<R: Read>(reader: R) -> Result<CsvData> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(String::from)
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV record {}", line + 1))?;
        rows.push(record.iter().map(String::from).collect());
    }

    tracing::debug!(columns = headers.len(), rows = rows.len(), "read csv");

    Ok(CsvData { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_extension() {
        assert!(check_extension(Path::new("data/cars.csv")).is_ok());
        assert!(check_extension(Path::new("CARS.CSV")).is_ok());
        assert_eq!(
            check_extension(Path::new("cars.txt")),
            Err(ValidationError::WrongFileType("cars.txt".into()))
        );
        assert!(check_extension(Path::new("csv")).is_err());
    }

    #[test]
    fn test_read_csv_trims_and_allows_ragged_rows() {
        let input = "name, value ,group\na, 1 ,x\nb,2\n";
        let csv = read_csv(input.as_bytes()).unwrap();
        assert_eq!(csv.headers, vec!["name", "value", "group"]);
        assert_eq!(csv.rows.len(), 2);
        assert_eq!(csv.rows[0], vec!["a", "1", "x"]);
        assert_eq!(csv.rows[1], vec!["b", "2"]);
    }
}
