use super::PageStore;
use crate::model::{StorageError, Subject, DATE_FORMAT};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

/// Captures kept in a single SQLite file instead of a directory tree.
pub struct SqlitePageStore {
    conn: Connection,
}

impl SqlitePageStore {
    /// Opens the database and creates the captures table if needed.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        Self::with_connection(Connection::open(db_path)?)
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS captures (
                subject TEXT NOT NULL,
                capture_date TEXT NOT NULL,
                body TEXT NOT NULL,
                captured_at TEXT NOT NULL,
                PRIMARY KEY (subject, capture_date)
            );
            ",
        )?;

        Ok(Self { conn })
    }
}

impl PageStore for SqlitePageStore {
    fn load(&self, subject: &Subject, date: NaiveDate) -> Result<String, StorageError> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM captures WHERE subject = ?1 AND capture_date = ?2",
                params![subject.as_str(), date.format(DATE_FORMAT).to_string()],
                |row| row.get(0),
            )
            .optional()?;

        body.ok_or_else(|| StorageError::NotFound {
            subject: subject.clone(),
            date,
        })
    }

    fn save(&self, subject: &Subject, date: NaiveDate, text: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO captures (subject, capture_date, body, captured_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                subject.as_str(),
                date.format(DATE_FORMAT).to_string(),
                text,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn subjects(&self) -> Result<Vec<Subject>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT subject FROM captures ORDER BY subject ASC")?;

        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut subjects = Vec::new();
        for row in rows {
            subjects.push(Subject(row?));
        }

        Ok(subjects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn round_trips_and_overwrites() {
        let store = SqlitePageStore::in_memory().unwrap();
        let subject = Subject::new("5-14-2022-oakland");
        store.save(&subject, date("2022-01-01"), "old").unwrap();
        store.save(&subject, date("2022-01-01"), "new").unwrap();

        assert_eq!(store.load(&subject, date("2022-01-01")).unwrap(), "new");
        assert_eq!(store.subjects().unwrap(), vec![subject]);
    }

    #[test]
    fn missing_day_is_not_found() {
        let store = SqlitePageStore::in_memory().unwrap();
        store.save(&Subject::new("la"), date("2022-01-01"), "x").unwrap();
        let err = store.load(&Subject::new("la"), date("2022-01-02")).unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn lists_distinct_subjects() {
        let store = SqlitePageStore::in_memory().unwrap();
        store.save(&Subject::new("b"), date("2022-01-01"), "x").unwrap();
        store.save(&Subject::new("a"), date("2022-01-01"), "x").unwrap();
        store.save(&Subject::new("a"), date("2022-01-02"), "x").unwrap();
        assert_eq!(store.subjects().unwrap(), vec![Subject::new("a"), Subject::new("b")]);
    }
}
