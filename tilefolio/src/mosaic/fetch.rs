//! Per-tile fetch results.

use crate::coord::{TileAddress, TileRange};
use crate::provider::ProviderError;

/// A tile body that arrived.
#[derive(Debug, Clone)]
pub struct TileSuccess {
    pub tile: TileAddress,
    /// Encoded image (PNG or JPEG)
    pub data: Vec<u8>,
}

/// A tile that could not be fetched.
#[derive(Debug, Clone)]
pub struct TileFailure {
    pub tile: TileAddress,
    pub error: ProviderError,
}

/// Outcome of fetching every tile of one cell.
///
/// Each entry is tagged with its address, so placement on the mosaic does
/// not depend on the order in which fetches completed.
#[derive(Debug, Clone)]
pub struct TileFetchResults {
    range: TileRange,
    pub successes: Vec<TileSuccess>,
    pub failures: Vec<TileFailure>,
}

impl TileFetchResults {
    pub fn new(range: TileRange) -> Self {
        Self {
            range,
            successes: Vec::with_capacity(range.count()),
            failures: Vec::new(),
        }
    }

    /// Builds the result set from `(tile, outcome)` pairs.
    pub fn from_outcomes<I>(range: TileRange, outcomes: I) -> Self
    where
        I: IntoIterator<Item = (TileAddress, Result<Vec<u8>, ProviderError>)>,
    {
        let mut results = Self::new(range);
        for (tile, outcome) in outcomes {
            match outcome {
                Ok(data) => results.add_success(tile, data),
                Err(error) => results.add_failure(tile, error),
            }
        }
        results
    }

    pub fn add_success(&mut self, tile: TileAddress, data: Vec<u8>) {
        self.successes.push(TileSuccess { tile, data });
    }

    pub fn add_failure(&mut self, tile: TileAddress, error: ProviderError) {
        self.failures.push(TileFailure { tile, error });
    }

    /// The tile block these results cover.
    pub fn range(&self) -> &TileRange {
        &self.range
    }

    #[inline]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    #[inline]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range() -> TileRange {
        TileRange {
            z: 3,
            min_x: 2,
            max_x: 3,
            min_y: 4,
            max_y: 4,
        }
    }

    #[test]
    fn test_from_outcomes_splits_by_result() {
        let a = TileAddress::new(3, 2, 4).unwrap();
        let b = TileAddress::new(3, 3, 4).unwrap();
        let results = TileFetchResults::from_outcomes(
            range(),
            vec![
                (b, Err(ProviderError::HttpError("HTTP 404".into()))),
                (a, Ok(vec![7, 7])),
            ],
        );

        assert_eq!(results.success_count(), 1);
        assert_eq!(results.failure_count(), 1);
        assert_eq!(results.successes[0].tile, a);
        assert_eq!(results.successes[0].data, vec![7u8, 7]);
        assert_eq!(results.failures[0].tile, b);
    }
}
