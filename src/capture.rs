// Capture pipeline: url list -> rendered page -> ASCII text in the page store
use crate::model::{CaptureError, CaptureKey};
use crate::scraper::PageFetcher;
use crate::storage::PageStore;
use crate::utils::to_ascii;
use chrono::NaiveDate;
use std::fs;
use tracing::info;

/// Reads one url per line, trimmed, skipping blank lines.
pub fn read_url_list(path: &str) -> Result<Vec<String>, CaptureError> {
    let content = fs::read_to_string(path).map_err(|source| CaptureError::UrlList {
        path: path.to_string(),
        source,
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Slugs become a storage directory name, so they must stay a single path component.
fn is_path_safe(slug: &str) -> bool {
    !slug.is_empty() && !slug.contains(['/', '\\']) && !slug.contains("..")
}

impl CaptureKey {
    /// Parses `.../{performer}-{city}-tickets-{eventDate}/event...`.
    /// The city takes the longest match, so cities containing `-tickets-` stay whole.
    pub fn from_url(url: &str, performer: &str) -> Result<Self, CaptureError> {
        let unrecognized = || CaptureError::UnrecognizedUrl(url.to_string());

        let prefix = format!("/{}-", performer);
        let start = url.find(&prefix).ok_or_else(unrecognized)? + prefix.len();
        let rest = &url[start..];
        let head = &rest[..rest.rfind("/event").ok_or_else(unrecognized)?];
        let split = head.rfind("-tickets-").ok_or_else(unrecognized)?;

        let city = &head[..split];
        let event_date = &head[split + "-tickets-".len()..];
        if !is_path_safe(city) || !is_path_safe(event_date) {
            return Err(unrecognized());
        }

        Ok(Self {
            city: city.to_string(),
            event_date: event_date.to_string(),
        })
    }
}

pub struct CaptureRunner<'a, F: PageFetcher, S: PageStore + ?Sized> {
    fetcher: &'a F,
    store: &'a S,
    performer: String,
}

impl<'a, F: PageFetcher, S: PageStore + ?Sized> CaptureRunner<'a, F, S> {
    pub fn new(fetcher: &'a F, store: &'a S, performer: impl Into<String>) -> Self {
        Self {
            fetcher,
            store,
            performer: performer.into(),
        }
    }

    /// Captures every url once under `today`. The first failure stops the run;
    /// pages saved before it are kept.
    pub fn run(&self, urls: &[String], today: NaiveDate) -> Result<usize, CaptureError> {
        for (i, url) in urls.iter().enumerate() {
            let key = CaptureKey::from_url(url, &self.performer)?;
            let subject = key.subject();
            info!("[{}/{}] Capturing {} ({})", i + 1, urls.len(), subject, url);

            let page = self.fetcher.fetch(url).map_err(|source| CaptureError::Fetch {
                url: url.clone(),
                source,
            })?;

            let text = to_ascii(&page);
            self.store.save(&subject, today, &text)?;
            info!("Saved {} bytes for {} on {}", text.len(), subject, today);
        }

        Ok(urls.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FetchError, Subject};
    use crate::storage::MemoryPageStore;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::PathBuf;

    const OAKLAND: &str = "https://www.stubhub.com/twice-oakland-tickets-5-14-2022/event/150000001/";
    const LA: &str = "https://www.stubhub.com/twice-los-angeles-tickets-2-19-2022/event/150000002/";

    struct CannedFetcher {
        pages: HashMap<String, Result<String, u16>>,
        calls: RefCell<Vec<String>>,
    }

    impl CannedFetcher {
        fn new(pages: &[(&str, Result<&str, u16>)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, page)| (url.to_string(), page.map(str::to_string)))
                    .collect(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl PageFetcher for CannedFetcher {
        fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.calls.borrow_mut().push(url.to_string());
            match self.pages.get(url) {
                Some(Ok(page)) => Ok(page.clone()),
                Some(Err(status)) => Err(FetchError::InvalidResponse(*status)),
                None => Err(FetchError::HttpError("unknown host".into())),
            }
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 1, 3).unwrap()
    }

    #[test]
    fn parses_city_and_event_date() {
        let key = CaptureKey::from_url(LA, "twice").unwrap();
        assert_eq!(key.city, "los-angeles");
        assert_eq!(key.event_date, "2-19-2022");
        assert_eq!(key.subject(), Subject::new("2-19-2022-los-angeles"));
    }

    #[test]
    fn rejects_urls_of_other_shapes() {
        for url in [
            "https://www.stubhub.com/bts-oakland-tickets-5-14-2022/event/1/",
            "https://www.stubhub.com/twice-oakland-5-14-2022/event/1/",
            "https://www.stubhub.com/twice-oakland-tickets-5-14-2022/",
            "https://www.stubhub.com/twice--tickets-5-14-2022/event/1/",
            "https://www.stubhub.com/twice-../../etc-tickets-5-14-2022/event/1/",
            "https://www.stubhub.com/twice-oakland-tickets-5-14-2022/../../x/event/1/",
            "https://www.stubhub.com/twice-oak\\land-tickets-5-14-2022/event/1/",
            "https://www.stubhub.com/twice-..-tickets-5-14-2022/event/1/",
        ] {
            let err = CaptureKey::from_url(url, "twice").unwrap_err();
            assert!(matches!(err, CaptureError::UnrecognizedUrl(_)), "{url}");
        }
    }

    #[test]
    fn saves_ascii_page_under_capture_date() {
        let fetcher = CannedFetcher::new(&[(OAKLAND, Ok("<div>$45 · café</div>")), (LA, Ok("<p>la</p>"))]);
        let store = MemoryPageStore::default();
        let runner = CaptureRunner::new(&fetcher, &store, "twice");

        let captured = runner.run(&[OAKLAND.to_string(), LA.to_string()], today()).unwrap();
        assert_eq!(captured, 2);
        assert_eq!(
            store.load(&Subject::new("5-14-2022-oakland"), today()).unwrap(),
            "<div>$45  caf</div>"
        );
        assert_eq!(store.load(&Subject::new("2-19-2022-los-angeles"), today()).unwrap(), "<p>la</p>");
    }

    #[test]
    fn recapture_same_day_overwrites() {
        let store = MemoryPageStore::default();
        let first = CannedFetcher::new(&[(OAKLAND, Ok("old"))]);
        CaptureRunner::new(&first, &store, "twice").run(&[OAKLAND.to_string()], today()).unwrap();
        let second = CannedFetcher::new(&[(OAKLAND, Ok("new"))]);
        CaptureRunner::new(&second, &store, "twice").run(&[OAKLAND.to_string()], today()).unwrap();

        assert_eq!(store.load(&Subject::new("5-14-2022-oakland"), today()).unwrap(), "new");
    }

    #[test]
    fn fetch_failure_stops_remaining_captures() {
        let fetcher = CannedFetcher::new(&[(OAKLAND, Ok("ok")), (LA, Err(503))]);
        let store = MemoryPageStore::default();
        let third = "https://www.stubhub.com/twice-dallas-tickets-2-23-2022/event/3/".to_string();
        let urls = vec![OAKLAND.to_string(), LA.to_string(), third];

        let err = CaptureRunner::new(&fetcher, &store, "twice").run(&urls, today()).unwrap_err();
        assert!(matches!(err, CaptureError::Fetch { source: FetchError::InvalidResponse(503), .. }));
        assert_eq!(fetcher.calls.borrow().len(), 2);
        assert_eq!(store.subjects().unwrap(), vec![Subject::new("5-14-2022-oakland")]);
    }

    #[test]
    fn url_list_is_trimmed_and_skips_blanks() {
        let mut path = std::env::temp_dir();
        path.push("ticket_sniper_urls.txt");
        fs::write(&path, format!("  {OAKLAND}  \n\n{LA}\r\n   \n")).unwrap();

        let urls = read_url_list(path.to_str().unwrap()).unwrap();
        assert_eq!(urls, vec![OAKLAND.to_string(), LA.to_string()]);
    }

    #[test]
    fn missing_url_list_is_reported() {
        let path: PathBuf = std::env::temp_dir().join("ticket_sniper_no_such_urls.txt");
        let _ = fs::remove_file(&path);
        let err = read_url_list(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, CaptureError::UrlList { .. }));
    }
}
