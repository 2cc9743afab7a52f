/// Minimal CSV reading for label files.
///
/// Supported format:
/// - UTF-8, comma-separated, one record per line
/// - Double-quoted fields with embedded commas and doubled quotes (`""`)
/// - Blank lines are skipped

use crate::error::{Error, Result};

/// A header row plus the data rows that follow it.
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Parses text whose first non-blank line is a header.
    pub fn parse(text: &str) -> Result<CsvTable> {
        let mut lines = text.lines()
            .map(|l| l.trim_end_matches('\r'))
            .filter(|l| !l.trim().is_empty());
        let header = lines.next()
            .map(parse_csv_row)
            .ok_or_else(|| Error::data("CSV file is empty"))?
            .into_iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();
        let rows = lines.map(parse_csv_row).collect();
        Ok(CsvTable { header, rows })
    }

    /// Position of a header column, compared case-insensitively.
    pub fn column(&self, name: &str) -> Result<usize> {
        self.header.iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::data(format!(
                "CSV header {:?} has no '{}' column", self.header, name
            )))
    }
}

/// Parses a single CSV row, handling double-quoted fields.
pub fn parse_csv_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    // Escaped quote inside quoted field.
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_fields_keep_commas_and_quotes() {
        assert_eq!(
            parse_csv_row(r#"377.jpg,"MIDDLE, maybe","say ""hi""""#),
            vec!["377.jpg", "MIDDLE, maybe", r#"say "hi""#]
        );
    }

    #[test]
    fn table_finds_columns_case_insensitively() {
        let table = CsvTable::parse("ID,Class\r\n1.jpg,OLD\r\n\r\n2.jpg,YOUNG\r\n").unwrap();
        assert_eq!(table.column("class").unwrap(), 1);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec!["2.jpg", "YOUNG"]);
        assert!(table.column("age").is_err());
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(CsvTable::parse("\n\n").is_err());
    }
}
