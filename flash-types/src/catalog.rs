// SPDX-License-Identifier: GPL-3.0-only

//! Device catalog
//!
//! The catalog is a static CSV table listing every valid combination of
//! vendor, product, module, JetPack release and storage target. It is read
//! once at start-up and never mutated.

use crate::error::CatalogError;
use serde::Deserialize;
use std::fmt;

// Compiled-in fallback used when no catalog file can be found on disk.
const EMBEDDED_CATALOG: &str = include_str!("../resources/template.csv");

/// One of the five catalog columns, in cascade order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Vendor,
    Product,
    Module,
    Jetpack,
    Storage,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Vendor,
        Column::Product,
        Column::Module,
        Column::Jetpack,
        Column::Storage,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::Vendor => 0,
            Self::Product => 1,
            Self::Module => 2,
            Self::Jetpack => 3,
            Self::Storage => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Column name as written in the CSV header.
    pub fn header(self) -> &'static str {
        match self {
            Self::Vendor => "Vendor",
            Self::Product => "Product",
            Self::Module => "Module",
            Self::Jetpack => "Jetpack",
            Self::Storage => "Storage",
        }
    }

    /// The column whose options depend on this one.
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    /// Columns that come before this one in the cascade.
    pub fn preceding(self) -> &'static [Column] {
        &Self::ALL[..self.index()]
    }

    /// Columns whose options are derived (directly or not) from this one.
    pub fn dependents(self) -> &'static [Column] {
        &Self::ALL[self.index() + 1..]
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// A single valid device configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub struct CatalogRow {
    pub vendor: String,
    pub product: String,
    pub module: String,
    pub jetpack: String,
    pub storage: String,
}

impl CatalogRow {
    pub fn value(&self, column: Column) -> &str {
        match column {
            Column::Vendor => &self.vendor,
            Column::Product => &self.product,
            Column::Module => &self.module,
            Column::Jetpack => &self.jetpack,
            Column::Storage => &self.storage,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    rows: Vec<CatalogRow>,
}

impl Catalog {
    /// Parse a catalog from CSV text.
    ///
    /// Header names are matched case-insensitively, cells are trimmed, blank
    /// lines are skipped and extra columns are ignored.
    pub fn parse_csv(text: &str) -> Result<Self, CatalogError> {
        let text = text.trim_start_matches('\u{feff}');
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers: csv::StringRecord = reader
            .headers()?
            .iter()
            .map(|h| h.to_ascii_lowercase())
            .collect();

        for column in Column::ALL {
            let key = column.header().to_ascii_lowercase();
            if !headers.iter().any(|h| h == key) {
                return Err(CatalogError::MissingColumn(column.header()));
            }
        }
        reader.set_headers(headers.clone());

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let row: CatalogRow = record.deserialize(Some(&headers))?;

            if let Some(column) = Column::ALL.into_iter().find(|c| row.value(*c).is_empty()) {
                return Err(CatalogError::EmptyField {
                    line,
                    column: column.header(),
                });
            }

            rows.push(row);
        }

        if rows.is_empty() {
            return Err(CatalogError::Empty);
        }

        Ok(Self { rows })
    }

    /// The catalog compiled into the binary.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::parse_csv(EMBEDDED_CATALOG)
    }

    pub fn rows(&self) -> &[CatalogRow] {
        &self.rows
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
    fn parses_case_insensitive_headers_and_trims_cells() {
        let csv = "vendor , PRODUCT,Module,JetPack,storage,Notes\n\
                   NVIDIA , AGX Orin DevKit ,AGX Orin,6.2, nvme ,first\n\
                   \n\
                   NVIDIA,Orin Nano DevKit,Orin Nano,6.0,sd,\n";

        let catalog = Catalog::parse_csv(csv).unwrap();
        assert_eq!(catalog.len(), 2);

        let row = &catalog.rows()[0];
        assert_eq!(row.vendor, "NVIDIA");
        assert_eq!(row.product, "AGX Orin DevKit");
        assert_eq!(row.storage, "nvme");
        assert_eq!(row.value(Column::Jetpack), "6.2");
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let csv = "Vendor,Product,Module,Storage\nNVIDIA,DevKit,Nano,sd\n";
        let err = Catalog::parse_csv(csv).unwrap_err();
        assert!(matches!(err, CatalogError::MissingColumn("Jetpack")));
    }

    #[test]
    fn empty_cell_is_rejected_with_its_line() {
        let csv = "Vendor,Product,Module,Jetpack,Storage\n\
                   NVIDIA,DevKit,Nano,4.6.4,sd\n\
                   NVIDIA,DevKit,,4.6.4,sd\n";
        match Catalog::parse_csv(csv).unwrap_err() {
            CatalogError::EmptyField { line, column } => {
                assert_eq!(line, 3);
                assert_eq!(column, "Module");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn header_only_catalog_is_empty_error() {
        let err = Catalog::parse_csv("Vendor,Product,Module,Jetpack,Storage\n").unwrap_err();
        assert!(matches!(err, CatalogError::Empty));
    }

    #[test]
    fn short_row_is_a_csv_error() {
        let csv = "Vendor,Product,Module,Jetpack,Storage\nNVIDIA,DevKit,Nano\n";
        assert!(matches!(
            Catalog::parse_csv(csv).unwrap_err(),
            CatalogError::Csv(_)
        ));
    }

    #[test]
    fn embedded_catalog_is_valid() {
        let catalog = Catalog::embedded().unwrap();
        assert!(!catalog.is_empty());
        assert!(catalog.rows().iter().any(|r| r.vendor == "NVIDIA"));
    }

    #[test]
    fn column_navigation() {
        assert_eq!(Column::Vendor.next(), Some(Column::Product));
        assert_eq!(Column::Storage.next(), None);
        assert_eq!(Column::Module.preceding(), &[Column::Vendor, Column::Product]);
        assert_eq!(Column::Jetpack.dependents(), &[Column::Storage]);
        assert!(Column::Storage.dependents().is_empty());
    }
}
