//! Primary source with a fallback on failure.

use tracing::warn;

use super::{DataError, MarketDataSource, Timeframe};
use crate::domain::Bar;

/// Tries `primary`; on any error, logs and serves `fallback` instead.
///
/// An empty primary result is passed through unchanged.
pub struct FallbackSource<P, F> {
    primary: P,
    fallback: F,
}

impl<P: MarketDataSource, F: MarketDataSource> FallbackSource<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: MarketDataSource, F: MarketDataSource> MarketDataSource for FallbackSource<P, F> {
    fn name(&self) -> &str {
        self.primary.name()
    }

    fn fetch_bars(&self, pair: &str, timeframe: Timeframe) -> Result<Vec<Bar>, DataError> {
        match self.primary.fetch_bars(pair, timeframe) {
            Ok(bars) => Ok(bars),
            Err(err) => {
                warn!(
                    source = self.primary.name(),
                    fallback = self.fallback.name(),
                    error = %err,
                    "fetch failed, using fallback"
                );
                self.fallback.fetch_bars(pair, timeframe)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{CsvSource, SyntheticSource};

    #[test]
    fn failing_primary_falls_back() {
        let source = FallbackSource::new(
            CsvSource::new("/nonexistent/bars.csv"),
            SyntheticSource::new(1, 1_700_000_000),
        );
        let bars = source.fetch_bars("EUR/USD", Timeframe::H1).unwrap();
        assert_eq!(bars.len(), 101);
    }

    #[test]
    fn healthy_primary_is_used() {
        let primary = SyntheticSource::new(1, 1_700_000_000).with_bars(10);
        let source = FallbackSource::new(primary, SyntheticSource::new(2, 1_700_000_000));
        assert_eq!(source.fetch_bars("EUR/USD", Timeframe::H1).unwrap().len(), 10);
    }
}
