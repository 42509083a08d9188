//! Bit statistics over a monochrome grid.
//!
//! These are sanity checks on the rendered noise, not proofs of
//! randomness. A batch that fails them is still written; the numbers are
//! only reported.

use crate::codec::MonochromeGrid;

/// Summary statistics of a grid's row-major bit stream.
#[derive(Debug, Clone, PartialEq)]
pub struct BitStatistics {
    /// Fraction of white (1) pixels.
    pub ones_ratio: f64,
    /// Deviation of `ones_ratio` from 0.5, in [-0.5, 0.5].
    pub bias: f64,
    /// Lag-1 autocorrelation of the bit stream.
    pub autocorrelation: f64,
    /// Number of bits analyzed.
    pub sample_size: usize,
}

impl BitStatistics {
    /// Analyzes every cell of `grid` in row-major order.
    pub fn analyze(grid: &MonochromeGrid) -> Self {
        let bits = grid.cells();
        let ones_ratio = Self::ones_ratio(bits);

        Self {
            ones_ratio,
            bias: ones_ratio - 0.5,
            autocorrelation: Self::autocorrelation(bits, ones_ratio),
            sample_size: bits.len(),
        }
    }

    fn ones_ratio(bits: &[bool]) -> f64 {
        if bits.is_empty() {
            return 0.0;
        }
        bits.iter().filter(|&&b| b).count() as f64 / bits.len() as f64
    }

    /// Computes lag-1 autocorrelation around the given mean.
    fn autocorrelation(bits: &[bool], mean: f64) -> f64 {
        if bits.len() < 2 {
            return 0.0;
        }

        let value = |b: bool| if b { 1.0 } else { 0.0 };
        let variance: f64 = bits.iter().map(|&b| (value(b) - mean).powi(2)).sum();

        if variance == 0.0 {
            return 1.0; // All same value = perfect correlation
        }

        let covariance: f64 = bits
            .windows(2)
            .map(|w| (value(w[0]) - mean) * (value(w[1]) - mean))
            .sum();

        covariance / variance
    }

    /// Returns true if results look reasonable (not proof of quality).
    pub fn looks_reasonable(&self) -> bool {
        // Loose bounds only; small grids are noisy
        self.bias.abs() < 0.1 && self.autocorrelation.abs() < 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternating_bits() {
        let grid = MonochromeGrid::from_text_rows(&["01010101", "01010101"]).unwrap();
        let stats = BitStatistics::analyze(&grid);

        assert!((stats.ones_ratio - 0.5).abs() < 1e-9);
        assert!(stats.bias.abs() < 1e-9);
        // Alternating stream is strongly anti-correlated
        assert!(stats.autocorrelation < -0.8);
        assert!(!stats.looks_reasonable());
    }

    #[test]
    fn test_constant_grid() {
        let grid = MonochromeGrid::from_text_rows(&["1111", "1111"]).unwrap();
        let stats = BitStatistics::analyze(&grid);

        assert_eq!(stats.sample_size, 8);
        assert!((stats.bias - 0.5).abs() < 1e-9);
        assert_eq!(stats.autocorrelation, 1.0);
        assert!(!stats.looks_reasonable());
    }

    #[test]
    fn test_single_cell() {
        let grid = MonochromeGrid::from_text_rows(&["0"]).unwrap();
        let stats = BitStatistics::analyze(&grid);

        assert_eq!(stats.ones_ratio, 0.0);
        assert_eq!(stats.autocorrelation, 0.0);
    }
}
