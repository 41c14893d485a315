use crate::model::{Price, ReduceError};

/// Collapses one day's prices into a single series value.
pub trait Reducer {
    fn reduce(&self, prices: &[Price]) -> Result<f64, ReduceError>;
}

impl<F> Reducer for F
where
    F: Fn(&[Price]) -> Result<f64, ReduceError>,
{
    fn reduce(&self, prices: &[Price]) -> Result<f64, ReduceError> {
        self(prices)
    }
}

/// Built-in statistics. All of them reject an empty price list.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Statistic {
    /// Cheapest ticket of the day.
    #[default]
    Min,
    Max,
    Mean,
    Median,
    /// Number of tickets priced strictly below the threshold.
    CountBelow(Price),
}

impl Reducer for Statistic {
    fn reduce(&self, prices: &[Price]) -> Result<f64, ReduceError> {
        if prices.is_empty() {
            return Err(ReduceError::EmptyPriceList);
        }

        let value = match *self {
            Statistic::Min => prices.iter().copied().min().unwrap_or_default() as f64,
            Statistic::Max => prices.iter().copied().max().unwrap_or_default() as f64,
            Statistic::Mean => {
                prices.iter().map(|&p| p as f64).sum::<f64>() / prices.len() as f64
            }
            Statistic::Median => {
                let mut sorted = prices.to_vec();
                sorted.sort_unstable();
                let mid = sorted.len() / 2;
                if sorted.len() % 2 == 0 {
                    (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
                } else {
                    sorted[mid] as f64
                }
            }
            Statistic::CountBelow(threshold) => {
                prices.iter().filter(|&&p| p < threshold).count() as f64
            }
        };

        Ok(value)
    }
}
