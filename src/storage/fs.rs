use super::PageStore;
use crate::model::{StorageError, Subject, DATE_FORMAT};
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One directory per subject holding one `{date}.html` file per capture day.
pub struct FsPageStore {
    root: PathBuf,
}

impl FsPageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn capture_path(&self, subject: &Subject, date: NaiveDate) -> PathBuf {
        self.root
            .join(subject.as_str())
            .join(format!("{}.html", date.format(DATE_FORMAT)))
    }
}

impl PageStore for FsPageStore {
    fn load(&self, subject: &Subject, date: NaiveDate) -> Result<String, StorageError> {
        let path = self.capture_path(subject, date);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound {
                subject: subject.clone(),
                date,
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, subject: &Subject, date: NaiveDate, text: &str) -> Result<(), StorageError> {
        let path = self.capture_path(subject, date);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, text)?;
        debug!("Wrote capture {}", path.display());
        Ok(())
    }

    fn subjects(&self) -> Result<Vec<Subject>, StorageError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut subjects = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                subjects.push(Subject::new(name));
            }
        }
        subjects.sort();
        Ok(subjects)
    }
}
