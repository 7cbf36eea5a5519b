use std::io::Read;

use crate::error::{FeedError, Result};

/// A feed as published: the header row plus every data row as strings.
///
/// No typing happens here; the feed shapes coerce cells when building tidy
/// records, so a schema problem is reported against the column it affects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Parse CSV with a header row. Ragged rows are a parse error.
    pub fn from_csv<R: Read>(reader: R) -> std::result::Result<Self, csv::Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.iter().map(|h| h.to_string()).collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(|f| f.to_string()).collect());
        }
        Ok(Self { headers, rows })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Resolve every required column, or fail naming all that are absent.
    pub fn require_columns<S: AsRef<str>>(&self, feed: &str, columns: &[S]) -> Result<Vec<usize>> {
        let mut indices = Vec::with_capacity(columns.len());
        let mut missing = Vec::new();
        for column in columns {
            match self.column_index(column.as_ref()) {
                Some(idx) => indices.push(idx),
                None => missing.push(column.as_ref().to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(FeedError::schema(
                feed,
                format!("missing expected columns: {}", missing.join(", ")),
            ));
        }
        Ok(indices)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_headers_and_rows() {
        let csv = "date,state,cases\n2020-03-01, Washington ,10\n2020-03-02,Washington,\n";
        let table = RawTable::from_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["date", "state", "cases"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][1], "Washington");
        assert_eq!(table.rows[1][2], "");
    }

    #[test]
    fn ragged_rows_fail_to_parse() {
        let csv = "date,state\n2020-03-01,Washington,extra\n";
        assert!(RawTable::from_csv(csv.as_bytes()).is_err());
    }

    #[test]
    fn reports_every_missing_column() {
        let table = RawTable::from_csv("date,state\n".as_bytes()).unwrap();
        let err = table
            .require_columns("us_states", &["date", "cases", "deaths"])
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("cases, deaths"), "{}", message);
        assert!(table.is_empty());
    }
}
