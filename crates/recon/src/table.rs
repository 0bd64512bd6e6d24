//! Sheet loading: header skip, duplicate header renaming, typed cells,
//! dex range filtering.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde_json::{Number, Value};

use crate::config::DexRange;
use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One spreadsheet cell. Text is kept as exported; typed views are derived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    raw: String,
    text_only: bool,
}

static BLANK: Cell = Cell {
    raw: String::new(),
    text_only: true,
};

impl Cell {
    pub fn new(raw: impl Into<String>, text_only: bool) -> Self {
        Self {
            raw: raw.into(),
            text_only,
        }
    }

    pub fn text(&self) -> &str {
        self.raw.trim()
    }

    pub fn is_blank(&self) -> bool {
        self.text().is_empty()
    }

    /// `TRUE`/`FALSE` in any case; anything else is not a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        let text = self.text();
        if text.eq_ignore_ascii_case("true") {
            Some(true)
        } else if text.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }

    pub fn is_true(&self) -> bool {
        self.as_bool() == Some(true)
    }

    pub fn is_false(&self) -> bool {
        self.as_bool() == Some(false)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.text().parse().ok()
    }

    /// JSON value for this cell: integers and decimals become numbers unless
    /// the column is declared as text.
    pub fn to_json(&self) -> Value {
        let text = self.text();
        if !self.text_only {
            if let Ok(n) = text.parse::<i64>() {
                return Value::Number(n.into());
            }
            if text.contains(['.', 'e', 'E']) {
                if let Some(n) = text.parse::<f64>().ok().and_then(Number::from_f64) {
                    return Value::Number(n);
                }
            }
        }
        Value::String(text.to_string())
    }

    /// Lower-cased, split on `sep`, pieces trimmed, empty pieces dropped.
    pub fn to_list(&self, sep: char) -> Vec<Value> {
        self.text()
            .to_lowercase()
            .split(sep)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Value::String(s.to_string()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// One sheet row keyed by (de-duplicated) header name.
#[derive(Debug, Clone, Default)]
pub struct TabularRow {
    /// 1-based line in the exported CSV.
    pub line: u64,
    pub cells: HashMap<String, Cell>,
}

impl TabularRow {
    /// Cell for `column`, blank when the row is short or the column is absent.
    pub fn cell(&self, column: &str) -> &Cell {
        self.cells.get(column).unwrap_or(&BLANK)
    }

    /// Build a row from `(column, text)` pairs. Every cell is typed.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            line: 0,
            cells: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), Cell::new(v, false)))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: String,
}

/// Options controlling how an exported sheet is read.
#[derive(Debug, Clone, Default)]
pub struct TableOptions {
    /// Raw records before the header row.
    pub header_skip: usize,
    /// Columns never coerced to numbers.
    pub text_columns: Vec<String>,
    pub dex_range: Option<DexRange>,
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<TabularRow>,
    pub skipped: Vec<SkippedRow>,
}

impl Table {
    /// Parse an exported sheet.
    pub fn from_csv(csv_data: &str, options: &TableOptions) -> Result<Self, ReconError> {
        let csv_data = csv_data.trim_start_matches('\u{feff}');
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let mut records = reader.records();

        for _ in 0..options.header_skip {
            match records.next() {
                Some(record) => {
                    record.map_err(|e| ReconError::Csv(e.to_string()))?;
                }
                None => return Err(ReconError::Csv("sheet ends before the header row".into())),
            }
        }

        let header_record = match records.next() {
            Some(record) => record.map_err(|e| ReconError::Csv(e.to_string()))?,
            None => return Err(ReconError::Csv("sheet has no header row".into())),
        };
        let headers = dedupe_headers(header_record.iter());

        let text_columns: HashSet<&str> =
            options.text_columns.iter().map(String::as_str).collect();

        let mut table = Table {
            headers,
            rows: Vec::new(),
            skipped: Vec::new(),
        };

        if let Some(ref range) = options.dex_range {
            table.require_columns([range.column.as_str()])?;
        }

        for record in records {
            let record = record.map_err(|e| ReconError::Csv(e.to_string()))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            if record.iter().all(|v| v.trim().is_empty()) {
                continue;
            }

            let mut cells = HashMap::with_capacity(table.headers.len());
            for (i, header) in table.headers.iter().enumerate() {
                let raw = record.get(i).unwrap_or("");
                let text_only = text_columns.contains(header.as_str());
                cells.insert(header.clone(), Cell::new(raw, text_only));
            }
            let row = TabularRow { line, cells };

            if let Some(ref range) = options.dex_range {
                let cell = row.cell(&range.column);
                match cell.as_i64() {
                    Some(n) if range.contains(n) => {}
                    Some(_) => continue,
                    None => {
                        let reason = format!(
                            "column '{}' is not a number: '{}'",
                            range.column,
                            cell.text()
                        );
                        tracing::warn!(line, %reason, "skipping row");
                        table.skipped.push(SkippedRow { line, reason });
                        continue;
                    }
                }
            }

            table.rows.push(row);
        }

        tracing::debug!(
            rows = table.rows.len(),
            skipped = table.skipped.len(),
            columns = table.headers.len(),
            "loaded sheet"
        );
        Ok(table)
    }

    /// Fail with `MissingColumn` for the first column not in the header.
    pub fn require_columns<'a>(
        &self,
        columns: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), ReconError> {
        for column in columns {
            if !self.headers.iter().any(|h| h == column) {
                return Err(ReconError::MissingColumn {
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Repeated header names get `.1`, `.2`, … suffixes in order of appearance.
fn dedupe_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut headers = Vec::new();
    for name in raw {
        let name = name.trim().to_string();
        let count = seen.entry(name.clone()).or_insert(0);
        if *count == 0 {
            headers.push(name);
        } else {
            headers.push(format!("{name}.{count}"));
        }
        *count += 1;
    }
    headers
}
