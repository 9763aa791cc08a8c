//! Unused-pixel exception list
//!
//! CSV with one header line and rows `module, side, bar, paddle`, all
//! 1-indexed as printed on the detector cabling sheets.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use super::GeometryError;

/// Pixel address in cabling-sheet (1-indexed) coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelId {
    pub module: u32,
    pub side: u32,
    pub bar: u32,
    pub paddle: u32,
}

impl PixelId {
    pub fn new(module: u32, side: u32, bar: u32, paddle: u32) -> Self {
        Self {
            module,
            side,
            bar,
            paddle,
        }
    }
}

/// Row as written by the spreadsheet export (numbers may carry `.0`)
#[derive(Debug, Deserialize)]
struct CsvRow(f64, f64, f64, f64);

/// Multiset of unused pixels
///
/// Duplicate rows are kept: each occurrence counts once towards the
/// x-position shift of the following channels.
#[derive(Debug, Clone, Default)]
pub struct UnusedPixels {
    counts: HashMap<PixelId, u32>,
    rows: usize,
}

impl UnusedPixels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the list from a CSV file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GeometryError> {
        let file = File::open(path.as_ref())?;
        let pixels = Self::from_reader(file)?;
        debug!(
            path = %path.as_ref().display(),
            rows = pixels.len(),
            "Loaded unused pixel list"
        );
        Ok(pixels)
    }

    /// Parse CSV text (header line first)
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self, GeometryError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(rdr);

        let mut pixels = Self::new();
        for (index, row) in csv_reader.deserialize::<CsvRow>().enumerate() {
            let CsvRow(module, side, bar, paddle) = row?;
            // Header is line 1
            let line = index + 2;
            let id = PixelId::new(
                to_index(module, line, "module")?,
                to_index(side, line, "side")?,
                to_index(bar, line, "bar")?,
                to_index(paddle, line, "paddle")?,
            );
            pixels.insert(id);
        }
        Ok(pixels)
    }

    pub fn insert(&mut self, id: PixelId) {
        *self.counts.entry(id).or_insert(0) += 1;
        self.rows += 1;
    }

    /// Number of rows listing this pixel
    pub fn count(&self, id: &PixelId) -> u32 {
        self.counts.get(id).copied().unwrap_or(0)
    }

    pub fn contains(&self, id: &PixelId) -> bool {
        self.count(id) > 0
    }

    /// Number of rows read, duplicates included
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
}

impl FromIterator<PixelId> for UnusedPixels {
    fn from_iter<I: IntoIterator<Item = PixelId>>(iter: I) -> Self {
        let mut pixels = Self::new();
        for id in iter {
            pixels.insert(id);
        }
        pixels
    }
}

fn to_index(value: f64, line: usize, column: &str) -> Result<u32, GeometryError> {
    if value.fract() != 0.0 || value < 1.0 || value > u32::MAX as f64 {
        return Err(GeometryError::InvalidRow {
            line,
            reason: format!("{} must be a positive integer, got {}", column, value),
        });
    }
    Ok(value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_integer_rows() {
        let csv = "module,side,bar,paddle\n1,2,14,1\n4,1,3,16\n";
        let pixels = UnusedPixels::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(pixels.len(), 2);
        assert!(pixels.contains(&PixelId::new(1, 2, 14, 1)));
        assert!(pixels.contains(&PixelId::new(4, 1, 3, 16)));
        assert!(!pixels.contains(&PixelId::new(1, 1, 14, 1)));
    }

    #[test]
    fn parse_float_rows_with_spaces() {
        let csv = "Module, Side, Bar, Pixel\n 2.0, 1.0, 7.0, 9.0\n";
        let pixels = UnusedPixels::from_reader(csv.as_bytes()).unwrap();
        assert!(pixels.contains(&PixelId::new(2, 1, 7, 9)));
    }

    #[test]
    fn header_only_is_empty() {
        let pixels = UnusedPixels::from_reader("module,side,bar,paddle\n".as_bytes()).unwrap();
        assert!(pixels.is_empty());
    }

    #[test]
    fn duplicates_are_counted() {
        let csv = "module,side,bar,paddle\n1,2,14,1\n1,2,14,1\n";
        let pixels = UnusedPixels::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(pixels.len(), 2);
        assert_eq!(pixels.count(&PixelId::new(1, 2, 14, 1)), 2);
    }

    #[test]
    fn fractional_value_is_rejected() {
        let csv = "module,side,bar,paddle\n1,2,14,1\n1,2.5,14,1\n";
        match UnusedPixels::from_reader(csv.as_bytes()) {
            Err(GeometryError::InvalidRow { line, reason }) => {
                assert_eq!(line, 3);
                assert!(reason.contains("side"));
            }
            other => panic!("expected InvalidRow, got {:?}", other),
        }
    }

    #[test]
    fn zero_index_is_rejected() {
        let csv = "module,side,bar,paddle\n0,1,1,1\n";
        assert!(matches!(
            UnusedPixels::from_reader(csv.as_bytes()),
            Err(GeometryError::InvalidRow { line: 2, .. })
        ));
    }

    #[test]
    fn non_numeric_is_csv_error() {
        let csv = "module,side,bar,paddle\none,1,1,1\n";
        assert!(matches!(
            UnusedPixels::from_reader(csv.as_bytes()),
            Err(GeometryError::Csv(_))
        ));
    }

    #[test]
    fn collect_from_iterator() {
        let pixels: UnusedPixels = vec![PixelId::new(1, 1, 1, 1), PixelId::new(1, 1, 1, 2)]
            .into_iter()
            .collect();
        assert_eq!(pixels.len(), 2);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        assert!(matches!(
            UnusedPixels::load("/nonexistent/unusedPixels_parsed.csv"),
            Err(GeometryError::Io(_))
        ));
    }
}
