// Core types: prices, capture keys, time series and the error taxonomy
use chrono::{Days, NaiveDate};
use std::fmt;
use thiserror::Error;

/// A single ticket price, whole currency units.
pub type Price = u64;

/// Prices for one capture date, in order of appearance in the page.
pub type PriceList = Vec<Price>;

/// Canonical `YYYY-MM-DD` form used for storage keys and series indexing.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// City/event identity grouping the captures of one listing page.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Subject(pub String);

impl Subject {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Location and event date recovered from an event URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureKey {
    pub city: String,
    pub event_date: String,
}

impl CaptureKey {
    pub fn subject(&self) -> Subject {
        Subject(format!("{}-{}", self.event_date, self.city))
    }
}

/// Daily values starting at `start`, one per calendar day with no gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub start: NaiveDate,
    pub values: Vec<f64>,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Last date covered, or `None` for an empty series.
    pub fn end(&self) -> Option<NaiveDate> {
        let offset = self.values.len().checked_sub(1)?;
        self.start.checked_add_days(Days::new(offset as u64))
    }

    /// Pairs every value with the day it belongs to.
    pub fn dates(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.start.iter_days().zip(self.values.iter().copied())
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("no capture for {subject} on {date}")]
    NotFound { subject: Subject, date: NaiveDate },
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("segment {index} has no price before `{closing}`")]
    MissingPrice { index: usize, closing: String },
    #[error("price `{digits}` in segment {index} is out of range")]
    InvalidNumber { index: usize, digits: String },
}

/// Failure to turn one stored capture into a price list.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no capture for {subject} on {date}")]
    NotFound { subject: Subject, date: NaiveDate },
    #[error("malformed capture for {subject} on {date}: {source}")]
    MalformedInput {
        subject: Subject,
        date: NaiveDate,
        #[source]
        source: ParserError,
    },
    #[error(transparent)]
    Storage(StorageError),
}

#[derive(Debug, Error, PartialEq)]
pub enum ReduceError {
    #[error("cannot compute a statistic over an empty price list")]
    EmptyPriceList,
}

#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("end date {end} is before start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error(transparent)]
    Extract(ExtractError),
    #[error("statistic failed for {date}: {source}")]
    Statistic {
        date: NaiveDate,
        #[source]
        source: ReduceError,
    },
}

impl SeriesError {
    /// True when the failure comes from unusable capture content rather than I/O.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            SeriesError::Extract(ExtractError::MalformedInput { .. }) | SeriesError::Statistic { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    HttpError(String),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected response status {0}")]
    InvalidResponse(u16),
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("url does not look like an event page: {0}")]
    UnrecognizedUrl(String),
    #[error("failed to read url list {path}: {source}")]
    UrlList {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
