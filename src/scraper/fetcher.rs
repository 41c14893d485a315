use crate::model::FetchError;
use crate::scraper::traits::PageFetcher;

use reqwest::blocking::Client;
use std::thread;
use std::time::Duration;
use tracing::debug;

pub struct HttpFetcher {
    client: Client,
    settle_delay: Duration,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration, settle_delay: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::HttpError(e.to_string()))?;

        Ok(Self { client, settle_delay })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::HttpError(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(FetchError::InvalidResponse(response.status().as_u16()));
        }

        let body = response.text().map_err(|e| FetchError::HttpError(e.to_string()))?;

        // Fixed wait after each load; the listing markup is filled in client-side.
        debug!("Loaded {} ({} bytes), settling for {:?}", url, body.len(), self.settle_delay);
        thread::sleep(self.settle_delay);

        Ok(body)
    }
}
