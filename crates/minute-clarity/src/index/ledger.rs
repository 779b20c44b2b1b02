//! Flat CSV ledger of ingested files

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::types::FileType;

/// One row of the ingestion ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRow {
    #[serde(rename = "Input_Type")]
    pub input_type: String,
    #[serde(rename = "File_Name")]
    pub file_name: String,
    #[serde(rename = "File_Type")]
    pub file_type: String,
    #[serde(rename = "Executed_Time")]
    pub executed_time: DateTime<Utc>,
}

impl LedgerRow {
    /// Create a row for an ingested document
    pub fn document(file_name: String, file_type: FileType) -> Self {
        Self {
            input_type: "Document".to_string(),
            file_name,
            file_type: file_type.extension().to_string(),
            executed_time: Utc::now(),
        }
    }
}

/// Tabular record of ingested files, persisted alongside the index
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    /// Create a ledger handle for the given CSV path
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Check whether the ledger file exists
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read all rows; a missing ledger reads as empty
    pub fn read_rows(&self) -> Result<Vec<LedgerRow>> {
        if !self.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            rows.push(row?);
        }
        Ok(rows)
    }

    /// Append rows, preserving existing content
    pub fn append(&self, new_rows: &[LedgerRow]) -> Result<()> {
        let mut rows = self.read_rows()?;
        rows.extend_from_slice(new_rows);
        self.write_rows(&rows)
    }

    /// Replace the whole ledger with the given rows
    pub fn replace(&self, rows: &[LedgerRow]) -> Result<()> {
        self.write_rows(rows)
    }

    /// Remove rows whose `File_Name` is in `file_names`
    ///
    /// Returns the number of rows removed. A missing ledger is an error
    /// because removal only makes sense after an ingestion has run.
    pub fn remove_rows(&self, file_names: &[String]) -> Result<usize> {
        if !self.exists() {
            return Err(Error::ledger(format!(
                "ledger file not found at '{}'",
                self.path.display()
            )));
        }
        let rows = self.read_rows()?;
        let before = rows.len();
        let kept: Vec<LedgerRow> = rows
            .into_iter()
            .filter(|row| !file_names.contains(&row.file_name))
            .collect();
        let removed = before - kept.len();
        self.write_rows(&kept)?;
        Ok(removed)
    }

    fn write_rows(&self, rows: &[LedgerRow]) -> Result<()> {
        let mut writer = csv::Writer::from_path(&self.path)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_in(dir: &tempfile::TempDir) -> Ledger {
        Ledger::new(dir.path().join("db_details.csv"))
    }

    #[test]
    fn test_missing_ledger_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir);
        assert!(!ledger.exists());
        assert!(ledger.read_rows().unwrap().is_empty());
    }

    #[test]
    fn test_append_and_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir);

        ledger
            .append(&[
                LedgerRow::document("report.pdf".to_string(), FileType::Pdf),
                LedgerRow::document("notes.docx".to_string(), FileType::Docx),
            ])
            .unwrap();
        ledger
            .append(&[LedgerRow::document("sheet.xlsx".to_string(), FileType::Xlsx)])
            .unwrap();

        let rows = ledger.read_rows().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].file_name, "report.pdf");
        assert_eq!(rows[0].file_type, ".pdf");
        assert_eq!(rows[0].input_type, "Document");
        assert_eq!(rows[1].file_type, ".docx");
        assert_eq!(rows[2].file_name, "sheet.xlsx");
    }

    #[test]
    fn test_remove_rows_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir);
        ledger
            .append(&[
                LedgerRow::document("keep.txt".to_string(), FileType::Txt),
                LedgerRow::document("drop.txt".to_string(), FileType::Txt),
            ])
            .unwrap();

        let removed = ledger.remove_rows(&["drop.txt".to_string()]).unwrap();
        assert_eq!(removed, 1);

        let rows = ledger.read_rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].file_name, "keep.txt");
    }

    #[test]
    fn test_remove_from_missing_ledger_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir);
        assert!(ledger.remove_rows(&["any.txt".to_string()]).is_err());
    }
}
