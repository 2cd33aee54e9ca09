use std::fs::File;
use std::path::Path;

use contracts::domain::product::ProductRow;
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};

use super::error::{ImportError, RowError};

const REQUIRED_COLUMNS: &[&str] = &["sku", "name"];

/// Column-to-field mapping derived from the header row. Unknown columns
/// are ignored; matching is case-insensitive on trimmed header names.
#[derive(Debug, Clone)]
struct HeaderIndex {
    sku: usize,
    name: usize,
    description: Option<usize>,
    price: Option<usize>,
    quantity: Option<usize>,
    active: Option<usize>,
}

impl HeaderIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self, ImportError> {
        let position = |wanted: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(wanted))
        };

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| position(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(missing));
        }

        Ok(Self {
            // Positions for required columns exist, checked above
            sku: position("sku").unwrap_or(0),
            name: position("name").unwrap_or(0),
            description: position("description"),
            price: position("price"),
            quantity: position("quantity"),
            active: position("active"),
        })
    }

    fn field<'r>(&self, record: &'r StringRecord, index: usize) -> &'r str {
        record.get(index).unwrap_or("").trim()
    }

    fn convert(&self, record: &StringRecord) -> Result<ProductRow, String> {
        let sku = self.field(record, self.sku);
        if sku.is_empty() {
            return Err("SKU is required and cannot be empty".to_string());
        }

        let name = self.field(record, self.name);
        if name.is_empty() {
            return Err("Name is required and cannot be empty".to_string());
        }

        let description = self
            .description
            .map(|i| self.field(record, i))
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        let price = match self.price.map(|i| self.field(record, i)) {
            Some(s) if !s.is_empty() => match s.parse::<f64>() {
                Ok(p) if p >= 0.0 => Some(p),
                Ok(_) => return Err(format!("Price cannot be negative: {}", s)),
                Err(_) => return Err(format!("Invalid price value: {}", s)),
            },
            _ => None,
        };

        let quantity = match self.quantity.map(|i| self.field(record, i)) {
            Some(s) if !s.is_empty() => match s.parse::<i32>() {
                Ok(q) if q >= 0 => q,
                Ok(_) => return Err(format!("Quantity cannot be negative: {}", s)),
                Err(_) => return Err(format!("Invalid quantity value: {}", s)),
            },
            _ => 0,
        };

        let active = match self.active.map(|i| self.field(record, i)) {
            Some(s) if !s.is_empty() => {
                matches!(s.to_lowercase().as_str(), "true" | "1" | "yes" | "y")
            }
            _ => true,
        };

        Ok(ProductRow {
            sku: sku.to_string(),
            name: name.to_string(),
            description,
            price,
            quantity,
            active,
        })
    }
}

/// Streaming CSV reader for product imports. Validates the header up
/// front (fatal on missing required columns), then yields one tagged
/// result per data line: a validated [`ProductRow`] or a [`RowError`].
/// Restart means re-opening the file.
pub struct RowParser {
    records: StringRecordsIntoIter<File>,
    header: HeaderIndex,
    /// Data lines consumed so far; line numbers reported to the caller
    /// are offset by the header line.
    consumed: u64,
}

impl RowParser {
    pub fn open(path: &Path) -> Result<Self, ImportError> {
        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(file);

        let headers = reader.headers()?.clone();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(ImportError::EmptyFile);
        }
        let header = HeaderIndex::from_headers(&headers)?;

        Ok(Self {
            records: reader.into_records(),
            header,
            consumed: 0,
        })
    }

    /// Count data lines without materializing rows; used for total_rows
    /// before processing begins. Rows that will later fail validation
    /// still count.
    pub fn count_data_rows(path: &Path) -> Result<u64, ImportError> {
        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(file);
        // Consume the header so it is not counted
        let _ = reader.headers()?;
        let mut count = 0u64;
        for record in reader.into_records() {
            let _ = record;
            count += 1;
        }
        Ok(count)
    }
}

impl Iterator for RowParser {
    type Item = Result<ProductRow, RowError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        self.consumed += 1;
        let line = self.consumed + 1;
        match record {
            Ok(rec) => Some(
                self.header
                    .convert(&rec)
                    .map_err(|message| RowError { line, message }),
            ),
            // Malformed quoting or line termination confined to one row:
            // surface as a row-level error and keep going.
            Err(e) => Some(Err(RowError {
                line,
                message: format!("Malformed row: {}", e),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_csv(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("rowparser-{}.csv", uuid::Uuid::new_v4()));
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parses_valid_rows_with_defaults() {
        let path = write_csv("sku,name\nA1,Widget\nB2,Gadget\n");
        let rows: Vec<_> = RowParser::open(&path).unwrap().collect();
        std::fs::remove_file(&path).ok();

        assert_eq!(rows.len(), 2);
        let first = rows[0].as_ref().unwrap();
        assert_eq!(first.sku, "A1");
        assert_eq!(first.name, "Widget");
        assert_eq!(first.price, None);
        assert_eq!(first.quantity, 0);
        assert!(first.active);
    }

    #[test]
    fn maps_all_known_columns_and_ignores_unknown() {
        let path = write_csv(
            "unknown,sku,name,description,price,quantity,active\n\
             x,A1,Widget,Nice widget,9.99,5,false\n",
        );
        let rows: Vec<_> = RowParser::open(&path).unwrap().collect();
        std::fs::remove_file(&path).ok();

        let row = rows[0].as_ref().unwrap();
        assert_eq!(row.sku, "A1");
        assert_eq!(row.description.as_deref(), Some("Nice widget"));
        assert_eq!(row.price, Some(9.99));
        assert_eq!(row.quantity, 5);
        assert!(!row.active);
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let path = write_csv("name,price\nWidget,9.99\n");
        let result = RowParser::open(&path);
        std::fs::remove_file(&path).ok();

        match result {
            Err(ImportError::MissingColumns(cols)) => assert_eq!(cols, vec!["sku".to_string()]),
            other => panic!("expected MissingColumns, got {:?}", other.err()),
        }
    }

    #[test]
    fn empty_file_is_fatal() {
        let path = write_csv("");
        let result = RowParser::open(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ImportError::EmptyFile)));
    }

    #[test]
    fn empty_sku_is_a_row_error_not_a_stream_error() {
        let path = write_csv("sku,name\n,Bad\nA1,Good\n");
        let rows: Vec<_> = RowParser::open(&path).unwrap().collect();
        std::fs::remove_file(&path).ok();

        assert_eq!(rows.len(), 2);
        let err = rows[0].as_ref().unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("SKU"));
        assert!(rows[1].is_ok());
    }

    #[test]
    fn bad_numeric_values_are_row_errors() {
        let path = write_csv(
            "sku,name,price,quantity\n\
             A1,Widget,abc,1\n\
             A2,Widget,-1.0,1\n\
             A3,Widget,1.0,xyz\n\
             A4,Widget,1.0,-2\n\
             A5,Widget,1.0,2\n",
        );
        let rows: Vec<_> = RowParser::open(&path).unwrap().collect();
        std::fs::remove_file(&path).ok();

        assert!(rows[0].is_err());
        assert!(rows[1].is_err());
        assert!(rows[2].is_err());
        assert!(rows[3].is_err());
        let ok = rows[4].as_ref().unwrap();
        assert_eq!(ok.sku, "A5");
        assert_eq!(ok.quantity, 2);
    }

    #[test]
    fn active_accepts_lenient_booleans() {
        let path = write_csv(
            "sku,name,active\nA1,W,yes\nA2,W,Y\nA3,W,1\nA4,W,TRUE\nA5,W,no\nA6,W,\n",
        );
        let rows: Vec<_> = RowParser::open(&path).unwrap().collect();
        std::fs::remove_file(&path).ok();

        let actives: Vec<bool> = rows.iter().map(|r| r.as_ref().unwrap().active).collect();
        assert_eq!(actives, vec![true, true, true, true, false, true]);
    }

    #[test]
    fn count_includes_rows_that_will_fail_validation() {
        let path = write_csv("sku,name,price\nA1,Widget,9.99\n,Bad,1\nA1,Widget2,10.99\n");
        let count = RowParser::count_data_rows(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(count, 3);
    }

    #[test]
    fn short_rows_yield_row_errors_for_missing_required_fields() {
        // flexible mode: a truncated row simply has no sku/name fields
        let path = write_csv("sku,name,price\nA1\nA2,Widget,1.5\n");
        let rows: Vec<_> = RowParser::open(&path).unwrap().collect();
        std::fs::remove_file(&path).ok();

        assert_eq!(rows.len(), 2);
        assert!(rows[0].is_err());
        assert!(rows[1].is_ok());
    }
}
