// Marker-based price extraction from captured listing pages
use crate::model::{ExtractError, ParserError, PriceList, StorageError, Subject};
use crate::storage::PageStore;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

pub trait Parser {
    fn parse(&self, text: &str) -> Result<PriceList, ParserError>;
}

/// Textual markers surrounding each price in the captured markup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MarkerSpec {
    /// Substring immediately preceding each price.
    pub price_marker: String,
    /// Tag opener that must directly follow the price digits.
    pub closing_marker: String,
    /// Segments after the last marker split that hold no listing.
    pub trailing_segments: usize,
}

impl Default for MarkerSpec {
    fn default() -> Self {
        Self {
            price_marker: "AdvisoryPriceDisplay__content\">$".into(),
            closing_marker: "</div".into(),
            trailing_segments: 2,
        }
    }
}

pub struct PriceParser {
    markers: MarkerSpec,
}

impl PriceParser {
    pub fn new(markers: MarkerSpec) -> Self {
        Self { markers }
    }

    /// Finds the first digit run that ends right where `closing_marker` starts.
    fn first_price<'a>(&self, segment: &'a str) -> Option<&'a str> {
        segment
            .match_indices(self.markers.closing_marker.as_str())
            .find_map(|(end, _)| {
                let head = &segment[..end];
                let digits = head.bytes().rev().take_while(u8::is_ascii_digit).count();
                (digits > 0).then(|| &head[end - digits..])
            })
    }
}

impl Default for PriceParser {
    fn default() -> Self {
        Self::new(MarkerSpec::default())
    }
}

impl Parser for PriceParser {
    fn parse(&self, text: &str) -> Result<PriceList, ParserError> {
        let segments: Vec<&str> = text.split(self.markers.price_marker.as_str()).collect();
        // Leading text before the first marker is never a listing.
        let end = segments.len().saturating_sub(self.markers.trailing_segments);
        let listings = segments.get(1..end).unwrap_or_default();

        let mut prices = Vec::with_capacity(listings.len());
        for (index, segment) in listings.iter().enumerate() {
            let digits = self.first_price(segment).ok_or_else(|| ParserError::MissingPrice {
                index,
                closing: self.markers.closing_marker.clone(),
            })?;
            let price = digits.parse().map_err(|_| ParserError::InvalidNumber {
                index,
                digits: digits.to_string(),
            })?;
            prices.push(price);
        }

        debug!("Parsed {} prices from {} segments", prices.len(), segments.len());
        Ok(prices)
    }
}

/// Reads the capture for one date from a store and parses its prices.
#[derive(Default)]
pub struct PriceExtractor {
    parser: PriceParser,
}

impl PriceExtractor {
    pub fn new(parser: PriceParser) -> Self {
        Self { parser }
    }

    pub fn extract<S: PageStore + ?Sized>(
        &self,
        store: &S,
        subject: &Subject,
        date: NaiveDate,
    ) -> Result<PriceList, ExtractError> {
        let text = store.load(subject, date).map_err(|e| match e {
            StorageError::NotFound { subject, date } => ExtractError::NotFound { subject, date },
            other => ExtractError::Storage(other),
        })?;

        self.parser.parse(&text).map_err(|source| ExtractError::MalformedInput {
            subject: subject.clone(),
            date,
            source,
        })
    }
}
