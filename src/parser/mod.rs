pub mod price_parser;

pub use price_parser::{MarkerSpec, PriceExtractor, PriceParser};
