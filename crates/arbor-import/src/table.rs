//! CSV reading with separator detection.

use csv::ReaderBuilder;

use crate::error::ImportError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Untyped tabular input: a header row and string cells.
///
/// Blank cells are empty strings; rows may be shorter or longer than the
/// header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Cell at (`row`, `column`), empty when the row is short.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map_or("", String::as_str)
    }
}

/// Pick `;` or `,` from the first non-empty line.
///
/// Spreadsheet exports in locales with a decimal comma use `;`. Ties go to `,`.
#[must_use]
pub fn detect_delimiter(text: &str) -> u8 {
    let Some(first) = text.lines().find(|line| !line.trim().is_empty()) else {
        return b',';
    };
    let commas = first.matches(',').count();
    let semicolons = first.matches(';').count();
    if semicolons > commas { b';' } else { b',' }
}

/// Parse CSV bytes into a [`Table`].
///
/// `delimiter` of `None` auto-detects between `,` and `;`.
///
/// # Errors
///
/// Returns `ImportError::Csv` for malformed CSV (e.g. invalid UTF-8), and
/// `ImportError::MissingColumns` when the header has fewer than two columns.
pub fn read_table(input: &[u8], delimiter: Option<u8>) -> Result<Table, ImportError> {
    let input = input.strip_prefix(UTF8_BOM).unwrap_or(input);
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&String::from_utf8_lossy(input)));

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(true)
        .from_reader(input);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();
    if headers.len() < 2 {
        return Err(ImportError::MissingColumns {
            found: headers.len(),
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    tracing::debug!(
        delimiter = %char::from(delimiter),
        columns = headers.len(),
        rows = rows.len(),
        "read import table"
    );
    Ok(Table { headers, rows })
}
