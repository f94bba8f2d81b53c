use super::{Document, check_grid_size};
use crate::error::{Result, SheetError};
use crate::storage::{DocumentFile, read_document, write_document};
use std::path::{Path, PathBuf};

impl Document {
    /// Create a new document and load a file if provided.
    /// A path that does not exist yet becomes the save target.
    pub fn with_file(path: Option<PathBuf>) -> Result<Self> {
        let mut doc = Self::new();
        if let Some(p) = path {
            if p.exists() {
                doc.load_file(&p)?;
            } else {
                doc.file_path = Some(p);
            }
        }
        Ok(doc)
    }

    /// Load from file, replacing the current contents.
    ///
    /// Stored values are refreshed by re-evaluating every formula. A file
    /// whose formulas form a cycle still loads; its stored values are kept.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let file = read_document(path)?;
        self.apply_file(file)?;

        match self.recalculate_all() {
            Ok(n) => log::debug!("Loaded {} ({n} formula cell(s))", path.display()),
            Err(SheetError::CircularDependency(err)) => {
                log::warn!("{}: {err}; keeping stored values", path.display());
            }
            Err(err) => return Err(err),
        }

        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }

    fn apply_file(&mut self, file: DocumentFile) -> Result<()> {
        check_grid_size(file.row_count, file.col_count)?;
        self.name = file.name;
        self.row_count = file.row_count;
        self.col_count = file.col_count;
        self.cells = file.data;
        let outside = self.cells.keys().filter(|c| !self.contains(c)).count();
        if outside > 0 {
            log::warn!("{outside} stored cell(s) lie outside the {}x{} grid", self.row_count, self.col_count);
        }
        self.fill_empty();
        Ok(())
    }

    pub fn to_file(&self) -> DocumentFile {
        DocumentFile {
            name: self.name.clone(),
            data: self.cells.clone(),
            row_count: self.row_count,
            col_count: self.col_count,
        }
    }

    /// Save to current file path.
    /// Returns the path saved to.
    pub fn save_file(&mut self) -> Result<PathBuf> {
        let Some(path) = self.file_path.clone() else {
            return Err(SheetError::NoFilePath);
        };
        self.save_as(&path)?;
        Ok(path)
    }

    /// Save to `path` and make it the current file path.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        write_document(path, &self.to_file())?;
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::json::MAX_DOCUMENT_BYTES;
    use pretty_assertions::assert_eq;
    use sheetcalc_engine::engine::CellRef;

    #[test]
    fn test_save_without_path_fails() {
        let mut doc = Document::new();
        assert!(matches!(doc.save_file(), Err(SheetError::NoFilePath)));
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.json");

        let mut doc = Document::with_size(10, 5);
        doc.name = "Budget".into();
        doc.set_cell_from_address("A1", "4").unwrap();
        doc.set_cell_from_address("B1", "=SUM(A1)").unwrap();
        doc.save_as(&path).unwrap();
        assert!(!doc.modified);

        let loaded = Document::with_file(Some(path.clone())).unwrap();
        assert_eq!(loaded.name, "Budget");
        assert_eq!((loaded.row_count, loaded.col_count), (10, 5));
        assert_eq!(loaded.cells, doc.cells);
        assert_eq!(loaded.file_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_load_refreshes_stale_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stale.json");
        std::fs::write(
            &path,
            r#"{"data":{"A1":{"value":"2"},"B1":{"value":"999","formula":"=SUM(A1)"}}}"#,
        )
        .unwrap();

        let doc = Document::with_file(Some(path)).unwrap();
        assert_eq!(doc.get_cell_display(&CellRef::new(1, 0)), "2");
        assert!(!doc.modified);
    }

    #[test]
    fn test_load_keeps_values_of_cyclic_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cycle.json");
        std::fs::write(
            &path,
            r#"{"data":{"A1":{"value":"1","formula":"=SUM(B1)"},"B1":{"value":"2","formula":"=SUM(A1)"}}}"#,
        )
        .unwrap();

        let doc = Document::with_file(Some(path)).unwrap();
        assert_eq!(doc.get_cell_display(&CellRef::new(0, 0)), "1");
        assert_eq!(doc.get_cell_display(&CellRef::new(1, 0)), "2");
    }

    #[test]
    fn test_missing_file_becomes_save_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.json");
        let mut doc = Document::with_file(Some(path.clone())).unwrap();
        doc.set_cell_from_address("A1", "x").unwrap();
        assert_eq!(doc.save_file().unwrap(), path);
        assert!(path.exists());
    }

    #[test]
    fn test_load_rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.json");
        let f = std::fs::File::create(&path).unwrap();
        f.set_len(MAX_DOCUMENT_BYTES + 1).unwrap();

        let mut doc = Document::new();
        let err = doc.load_file(&path).unwrap_err();
        assert!(matches!(err, SheetError::Io(_)));
        assert!(doc.file_path.is_none());
    }

    #[test]
    fn test_load_rejects_oversized_grid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.json");
        std::fs::write(&path, r#"{"rowCount":1000000000,"colCount":1000}"#).unwrap();

        let mut doc = Document::with_size(2, 2);
        doc.set_cell_from_address("A1", "keep").unwrap();
        let err = doc.load_file(&path).unwrap_err();
        assert!(matches!(
            err,
            SheetError::GridTooLarge { rows: 1_000_000_000, cols: 1000, .. }
        ));
        assert_eq!((doc.row_count, doc.col_count), (2, 2));
        assert_eq!(doc.cells.len(), 4);
        assert_eq!(doc.get_cell_display(&CellRef::new(0, 0)), "keep");
        assert!(doc.file_path.is_none());
    }

    #[test]
    fn test_malformed_json_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let mut doc = Document::new();
        assert!(matches!(doc.load_file(&path), Err(SheetError::Json(_))));
    }
}
