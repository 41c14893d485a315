// Page store: raw captures keyed by subject and capture date
pub mod fs;
pub mod sqlite;

pub use fs::FsPageStore;
pub use sqlite::SqlitePageStore;

use crate::model::{StorageError, Subject};
use chrono::NaiveDate;

pub trait PageStore {
    /// Returns the capture text, or `StorageError::NotFound` when none was saved.
    fn load(&self, subject: &Subject, date: NaiveDate) -> Result<String, StorageError>;

    /// Saves a capture, replacing any earlier one for the same day.
    fn save(&self, subject: &Subject, date: NaiveDate, text: &str) -> Result<(), StorageError>;

    /// All subjects with stored captures, sorted by name.
    fn subjects(&self) -> Result<Vec<Subject>, StorageError>;
}

#[cfg(test)]
pub use memory::MemoryPageStore;

#[cfg(test)]
mod memory {
    use super::PageStore;
    use crate::model::{StorageError, Subject};
    use chrono::NaiveDate;
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    #[derive(Default)]
    pub struct MemoryPageStore {
        pages: RefCell<BTreeMap<(Subject, NaiveDate), String>>,
    }

    impl MemoryPageStore {
        pub fn insert(&mut self, subject: &Subject, date: NaiveDate, text: &str) {
            self.pages.get_mut().insert((subject.clone(), date), text.to_string());
        }
    }

    impl PageStore for MemoryPageStore {
        fn load(&self, subject: &Subject, date: NaiveDate) -> Result<String, StorageError> {
            self.pages
                .borrow()
                .get(&(subject.clone(), date))
                .cloned()
                .ok_or_else(|| StorageError::NotFound { subject: subject.clone(), date })
        }

        fn save(&self, subject: &Subject, date: NaiveDate, text: &str) -> Result<(), StorageError> {
            self.pages.borrow_mut().insert((subject.clone(), date), text.to_string());
            Ok(())
        }

        fn subjects(&self) -> Result<Vec<Subject>, StorageError> {
            let mut subjects: Vec<Subject> = self.pages.borrow().keys().map(|(s, _)| s.clone()).collect();
            subjects.dedup();
            Ok(subjects)
        }
    }
}
