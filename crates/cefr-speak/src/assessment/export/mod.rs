mod certificate;
mod report;

pub use certificate::{certificate_id, issue_certificate, Certificate};
pub use report::{ResultsReport, SubskillLine};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use super::domain::CefrLevel;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("certificate requires {target}, latest result is {achieved}")]
    CertificateLocked {
        achieved: CefrLevel,
        target: CefrLevel,
    },
    #[error("export could not be written: {0}")]
    Io(#[from] io::Error),
}

/// A rendered document with the file name it should be saved under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub file_name: String,
    pub body: String,
}

impl ExportDocument {
    /// Writes the document into `dir`, creating it if needed, and returns the
    /// full path.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.body)?;
        info!(path = %path.display(), "export written");
        Ok(path)
    }
}

/// Greedy word wrap; words longer than `width` get a line of their own.
pub(crate) fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
