//! Document store - generated documents under `<data>/dash-xml/`

use std::fs;
use std::path::PathBuf;

use crate::core::document::Document;
use crate::core::error::DashboardError;
use crate::xml;

pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of a document by name, e.g. `acme` or `AllOrgs`
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.xml", name))
    }

    /// Write a document, creating the directory if needed
    pub fn write(&self, name: &str, document: &Document) -> Result<PathBuf, DashboardError> {
        fs::create_dir_all(&self.dir).map_err(|e| DashboardError::io(&self.dir, e))?;
        let path = self.path(name);
        xml::write_file(&path, &document.to_node())?;
        tracing::debug!(path = %path.display(), "wrote document");
        Ok(path)
    }

    /// Read a previously written document.
    ///
    /// A missing file, unparsable XML or a rootless file is `MalformedDocument`.
    pub fn read(&self, name: &str) -> Result<Document, DashboardError> {
        let path = self.path(name);
        if !path.is_file() {
            return Err(DashboardError::malformed(&path, "document does not exist"));
        }
        let root = xml::read_file(&path)
            .map_err(|e| DashboardError::malformed(&path, e.to_string()))?
            .ok_or_else(|| DashboardError::malformed(&path, "no root element"))?;
        Document::from_node(root, &path)
    }
}
