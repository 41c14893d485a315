use crate::analyzer::statistics::Reducer;
use crate::model::{ExtractError, SeriesError, Subject, TimeSeries};
use crate::parser::PriceExtractor;
use crate::storage::PageStore;
use chrono::NaiveDate;
use tracing::debug;

/// Number of calendar days in `start..=end`; zero when the range is inverted.
pub fn day_count(start: NaiveDate, end: NaiveDate) -> usize {
    usize::try_from((end - start).num_days() + 1).unwrap_or(0)
}

/// Folds per-day captures of one subject into a gap-free daily series.
pub struct SeriesBuilder<'a, S: PageStore + ?Sized> {
    store: &'a S,
    extractor: PriceExtractor,
}

impl<'a, S: PageStore + ?Sized> SeriesBuilder<'a, S> {
    pub fn new(store: &'a S, extractor: PriceExtractor) -> Self {
        Self { store, extractor }
    }

    /// Days without a capture repeat the previous value, starting from `0.0`.
    /// Malformed captures and failing statistics abort the whole series.
    pub fn build<R: Reducer + ?Sized>(
        &self,
        subject: &Subject,
        start: NaiveDate,
        end: NaiveDate,
        reducer: &R,
    ) -> Result<TimeSeries, SeriesError> {
        if start > end {
            return Err(SeriesError::InvalidRange { start, end });
        }

        let days = day_count(start, end);
        let (values, _) = start.iter_days().take(days).try_fold(
            (Vec::with_capacity(days), 0.0),
            |(mut values, carry), date| -> Result<(Vec<f64>, f64), SeriesError> {
                let value = match self.extractor.extract(self.store, subject, date) {
                    Ok(prices) => reducer
                        .reduce(&prices)
                        .map_err(|source| SeriesError::Statistic { date, source })?,
                    Err(ExtractError::NotFound { .. }) => {
                        debug!("No capture for {} on {}, carrying {}", subject, date, carry);
                        carry
                    }
                    Err(e) => return Err(SeriesError::Extract(e)),
                };
                values.push(value);
                Ok((values, value))
            },
        )?;

        Ok(TimeSeries { start, values })
    }
}
