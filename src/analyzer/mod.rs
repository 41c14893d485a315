// Analyzer module: statistics over daily price lists and the series builder.

pub mod series;
pub mod statistics;

pub use series::SeriesBuilder;
pub use statistics::Statistic;
