use crate::model::FetchError;

/// Returns the rendered text of a page.
pub trait PageFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}
