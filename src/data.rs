use anyhow::{anyhow, Result};
use serde_json::Value;

use crate::error::ValidationError;

/// Rows of raw string values under a header.
///
/// A dataset is never mutated after loading; drilldown produces a new one
/// through [`Dataset::subset`].
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Create a Dataset from parsed CSV contents
    pub fn from_csv(csv: crate::csv_reader::CsvData) -> Self {
        Self {
            headers: csv.headers,
            rows: csv.rows,
        }
    }

    /// Create a Dataset from a JSON Array of Objects
    pub fn from_json(value: &Value) -> Result<Self> {
        let array = value
            .as_array()
            .ok_or_else(|| anyhow!("Input data must be a JSON array of objects"))?;

        let first = array
            .first()
            .ok_or_else(|| anyhow!("Input data array is empty"))?
            .as_object()
            .ok_or_else(|| anyhow!("Items in array must be objects"))?;

        let headers: Vec<String> = first.keys().cloned().collect();

        let mut rows = Vec::with_capacity(array.len());
        for item in array {
            let obj = item
                .as_object()
                .ok_or_else(|| anyhow!("Items in array must be objects"))?;

            let row = headers
                .iter()
                .map(|header| match obj.get(header) {
                    Some(Value::String(s)) => Ok(s.clone()),
                    Some(Value::Number(n)) => Ok(n.to_string()),
                    Some(Value::Bool(b)) => Ok(b.to_string()),
                    Some(Value::Null) | None => Ok(String::new()),
                    _ => Err(anyhow!("Unsupported value type for field '{}'", header)),
                })
                .collect::<Result<Vec<_>>>()?;
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column index for a header, matched case-insensitively
    pub fn column_index(&self, key: &str) -> std::result::Result<usize, ValidationError> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(key))
            .ok_or_else(|| ValidationError::UnknownColumn(key.to_string()))
    }

    /// All values of one column, in row order. Short rows yield "".
    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(String::as_str).unwrap_or(""))
    }

    pub fn value(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Display name of a row (column 0)
    pub fn name(&self, row: usize) -> &str {
        self.value(row, 0)
    }

    /// New dataset holding the given rows, in the given order.
    /// Indices outside the dataset are skipped.
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        let rows = indices
            .iter()
            .filter_map(|&i| self.rows.get(i).cloned())
            .collect();
        Dataset {
            headers: self.headers.clone(),
            rows,
        }
    }
}

/// Parse a raw cell as a number, ignoring surrounding whitespace.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_data() -> Dataset {
        Dataset::new(
            vec!["name".into(), "Height".into(), "group".into()],
            vec![
                vec!["a".into(), "1.5".into(), "x".into()],
                vec!["b".into(), "2".into()],
                vec!["c".into(), "3".into(), "y".into()],
            ],
        )
    }

    #[test]
    fn test_column_index_case_insensitive() {
        let data = make_data();
        assert_eq!(data.column_index("height").unwrap(), 1);
        assert_eq!(
            data.column_index("weight"),
            Err(ValidationError::UnknownColumn("weight".into()))
        );
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let data = make_data();
        let groups: Vec<&str> = data.column(2).collect();
        assert_eq!(groups, vec!["x", "", "y"]);
    }

    #[test]
    fn test_subset_keeps_order_and_headers() {
        let data = make_data();
        let sub = data.subset(&[2, 0, 9]);
        assert_eq!(sub.headers, data.headers);
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.name(0), "c");
        assert_eq!(sub.name(1), "a");
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 4.25 "), Some(4.25));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("red"), None);
        assert_eq!(parse_number("NaN"), None);
    }

    #[test]
    fn test_from_json() {
        let value = serde_json::json!([
            {"name": "a", "v": 1, "ok": true},
            {"name": "b", "v": null, "ok": false}
        ]);
        let data = Dataset::from_json(&value).unwrap();
        assert_eq!(data.len(), 2);
        let v = data.column_index("v").unwrap();
        assert_eq!(data.value(0, v), "1");
        assert_eq!(data.value(1, v), "");
    }
}
