use serde::Serialize;

use super::moving_averages::SMA;

/// One Bollinger reading: middle band (SMA) and the bands `mult` standard
/// deviations above and below it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Band {
    pub middle: f64,
    pub upper: f64,
    pub lower: f64,
}

impl Band {
    /// Where `price` sits relative to the bands: 0 at the middle, +1 on the
    /// upper band, -1 on the lower band
    ///
    /// None when the bands have collapsed onto the middle (zero variance).
    pub fn position(&self, price: f64) -> Option<f64> {
        let half_width = self.upper - self.middle;
        if half_width > 0.0 {
            Some((price - self.middle) / half_width)
        } else {
            None
        }
    }
}

/// Bollinger Bands
/// Middle band is SMA(period); upper/lower are middle +/- mult * population
/// standard deviation over the same lagging window
pub struct BollingerBands {
    period: usize,
    mult: f64,
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self::new(20, 2.0)
    }
}

impl BollingerBands {
    pub fn new(period: usize, mult: f64) -> Self {
        Self { period, mult }
    }

    /// Calculate bands for a price series
    /// Returns a vector of the same length as input; first `period` entries
    /// are absent, matching the SMA warmup
    pub fn calculate(&self, prices: &[f64]) -> Vec<Option<Band>> {
        let middle = SMA::new(self.period).calculate(prices);

        middle
            .iter()
            .enumerate()
            .map(|(i, avg)| {
                let avg = (*avg)?;
                let window = &prices[i - self.period..i];
                let variance = window.iter().map(|x| (x - avg).powi(2)).sum::<f64>()
                    / self.period as f64;
                let sd = variance.sqrt();

                Some(Band {
                    middle: avg,
                    upper: avg + self.mult * sd,
                    lower: avg - self.mult * sd,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bollinger_warmup_is_absent() {
        let prices: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
        let result = BollingerBands::default().calculate(&prices);

        assert_eq!(result.len(), 25);
        assert!(result[..20].iter().all(|b| b.is_none()));
        assert!(result[20..].iter().all(|b| b.is_some()));
    }

    #[test]
    fn test_bollinger_short_input() {
        let prices = vec![1.0, 2.0, 3.0];
        let result = BollingerBands::default().calculate(&prices);
        assert_eq!(result, vec![None, None, None]);
    }

    #[test]
    fn test_bollinger_known_window() {
        // Window for index 4 is [2, 4, 4, 4]: mean 3.5, variance 0.75
        let prices = vec![2.0, 4.0, 4.0, 4.0, 100.0];
        let result = BollingerBands::new(4, 2.0).calculate(&prices);

        let band = result[4].unwrap();
        let sd = 0.75_f64.sqrt();
        assert!((band.middle - 3.5).abs() < 1e-12);
        assert!((band.upper - (3.5 + 2.0 * sd)).abs() < 1e-12);
        assert!((band.lower - (3.5 - 2.0 * sd)).abs() < 1e-12);
    }

    #[test]
    fn test_bollinger_middle_matches_sma() {
        let prices: Vec<f64> = (0..40).map(|i| 10.0 + (i % 5) as f64).collect();
        let bands = BollingerBands::new(20, 2.0).calculate(&prices);
        let sma = SMA::new(20).calculate(&prices);

        for (band, avg) in bands.iter().zip(&sma) {
            assert_eq!(band.map(|b| b.middle), *avg);
        }
    }

    #[test]
    fn test_bollinger_constant_prices_collapse() {
        let prices = vec![3.0; 30];
        let result = BollingerBands::default().calculate(&prices);

        for band in result[20..].iter().map(|b| b.unwrap()) {
            assert_eq!(band.middle, 3.0);
            assert_eq!(band.upper, 3.0);
            assert_eq!(band.lower, 3.0);
            assert_eq!(band.position(3.0), None);
        }
    }

    #[test]
    fn test_band_position() {
        let band = Band {
            middle: 10.0,
            upper: 12.0,
            lower: 8.0,
        };

        assert_eq!(band.position(10.0), Some(0.0));
        assert_eq!(band.position(12.0), Some(1.0));
        assert_eq!(band.position(8.0), Some(-1.0));
        assert_eq!(band.position(11.5), Some(0.75));
    }

    #[test]
    fn test_bollinger_multiplier_scales_width() {
        let prices: Vec<f64> = (0..30).map(|i| (i as f64 * 0.7).cos()).collect();
        let narrow = BollingerBands::new(20, 1.0).calculate(&prices);
        let wide = BollingerBands::new(20, 3.0).calculate(&prices);

        let n = narrow[25].unwrap();
        let w = wide[25].unwrap();
        let n_width = n.upper - n.middle;
        let w_width = w.upper - w.middle;
        assert!((w_width - 3.0 * n_width).abs() < 1e-12);
    }
}
