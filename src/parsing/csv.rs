use thiserror::Error;

use crate::utils::validation::{check_row_limit, MAX_CATALOG_ROWS};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("File is empty: no header row found")]
    Empty,

    #[error("Invalid CSV format: {0}")]
    InvalidFormat(String),

    #[error("Too many rows: {0} exceeds maximum allowed ({MAX_CATALOG_ROWS})")]
    TooManyRows(usize),
}

/// A delimited table with a header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Header names, trimmed
    pub headers: Vec<String>,

    /// Data rows, in file order. Rows may be shorter or longer than the header.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Position of a header, compared exactly after trimming
    #[must_use]
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell text, or `""` if the row is short
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map_or("", String::as_str)
    }
}

/// Parse CSV text with a header row.
///
/// Fields may be quoted with `"`; inside quotes the delimiter and newlines are
/// literal and `""` is an escaped quote. Blank lines are skipped and a leading
/// UTF-8 BOM is ignored.
///
/// # Errors
///
/// Returns `ParseError::Empty` if there is no header row,
/// `ParseError::InvalidFormat` for an unterminated quoted field, or
/// `ParseError::TooManyRows` if the limit is exceeded.
pub fn parse_csv_text(text: &str, delimiter: char) -> Result<Table, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = RecordReader::new(text, delimiter);

    let headers = match records.next_record()? {
        Some(header) => header.into_iter().map(|h| h.trim().to_string()).collect(),
        None => return Err(ParseError::Empty),
    };

    let mut rows = Vec::new();
    while let Some(record) = records.next_record()? {
        if check_row_limit(rows.len(), MAX_CATALOG_ROWS).is_some() {
            return Err(ParseError::TooManyRows(rows.len() + 1));
        }
        rows.push(record);
    }

    Ok(Table { headers, rows })
}

/// Streaming reader over quoted, delimited records
struct RecordReader<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    delimiter: char,
    line: usize,
}

impl<'a> RecordReader<'a> {
    fn new(text: &'a str, delimiter: char) -> Self {
        Self {
            chars: text.chars().peekable(),
            delimiter,
            line: 1,
        }
    }

    /// Next non-blank record, or `None` at end of input
    fn next_record(&mut self) -> Result<Option<Vec<String>>, ParseError> {
        loop {
            if self.chars.peek().is_none() {
                return Ok(None);
            }
            let record = self.read_record()?;
            let blank = record.len() == 1 && record[0].trim().is_empty();
            if !blank {
                return Ok(Some(record));
            }
        }
    }

    fn read_record(&mut self) -> Result<Vec<String>, ParseError> {
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut at_field_start = true;

        while let Some(c) = self.chars.next() {
            match c {
                '"' if at_field_start => {
                    self.read_quoted(&mut field)?;
                    at_field_start = false;
                }
                '\r' if self.chars.peek() == Some(&'\n') => {}
                '\n' => {
                    self.line += 1;
                    fields.push(field);
                    return Ok(fields);
                }
                c if c == self.delimiter => {
                    fields.push(std::mem::take(&mut field));
                    at_field_start = true;
                }
                c => {
                    field.push(c);
                    at_field_start = at_field_start && c.is_whitespace();
                    if at_field_start {
                        // leading whitespace before an opening quote is dropped
                        field.clear();
                    }
                }
            }
        }

        fields.push(field);
        Ok(fields)
    }

    fn read_quoted(&mut self, field: &mut String) -> Result<(), ParseError> {
        let start_line = self.line;
        while let Some(c) = self.chars.next() {
            match c {
                '"' if self.chars.peek() == Some(&'"') => {
                    self.chars.next();
                    field.push('"');
                }
                '"' => return Ok(()),
                '\n' => {
                    self.line += 1;
                    field.push(c);
                }
                c => field.push(c),
            }
        }
        Err(ParseError::InvalidFormat(format!(
            "Unterminated quoted field starting on line {start_line}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_text() {
        let csv = "Test Name,Search Names,Calculated range,Unit,Loinc
Glucose,\"Gluc, Blood Sugar\",70-100,mg/dL,2345-7
Sodium,Na,135-145,mmol/L,2951-2
";

        let table = parse_csv_text(csv, ',').unwrap();
        assert_eq!(
            table.headers,
            ["Test Name", "Search Names", "Calculated range", "Unit", "Loinc"]
        );
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.cell(0, 1), "Gluc, Blood Sugar");
        assert_eq!(table.cell(1, 4), "2951-2");
    }

    #[test]
    fn test_escaped_quotes_and_embedded_newlines() {
        let csv = "a,b\n\"say \"\"hi\"\"\",\"line one\nline two\"\n";
        let table = parse_csv_text(csv, ',').unwrap();
        assert_eq!(table.cell(0, 0), "say \"hi\"");
        assert_eq!(table.cell(0, 1), "line one\nline two");
    }

    #[test]
    fn test_crlf_bom_and_blank_lines() {
        let csv = "\u{feff}Test Name , Unit\r\n\r\nGlucose,mg/dL\r\n\r\n";
        let table = parse_csv_text(csv, ',').unwrap();
        assert_eq!(table.headers, ["Test Name", "Unit"]);
        assert_eq!(table.rows, vec![vec!["Glucose".to_string(), "mg/dL".to_string()]]);
    }

    #[test]
    fn test_short_rows_read_as_empty_cells() {
        let table = parse_csv_text("a,b,c\n1\n", ',').unwrap();
        assert_eq!(table.cell(0, 0), "1");
        assert_eq!(table.cell(0, 2), "");
        assert_eq!(table.cell(5, 0), "");
    }

    #[test]
    fn test_quote_after_leading_space() {
        let table = parse_csv_text("a,b\nx, \"1,2\"\n", ',').unwrap();
        assert_eq!(table.cell(0, 1), "1,2");
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(parse_csv_text("", ','), Err(ParseError::Empty)));
        assert!(matches!(parse_csv_text("\n\n  \n", ','), Err(ParseError::Empty)));
    }

    #[test]
    fn test_unterminated_quote() {
        let result = parse_csv_text("a,b\n\"open,2\n", ',');
        assert!(matches!(result, Err(ParseError::InvalidFormat(_))));
    }

    #[test]
    fn test_header_only_has_no_rows() {
        let table = parse_csv_text("Test Name,Unit\n", ',').unwrap();
        assert!(table.rows.is_empty());
        assert_eq!(table.column("Unit"), Some(1));
        assert_eq!(table.column("Loinc"), None);
    }
}
