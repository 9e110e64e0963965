use super::IndicatorSeries;

/// Simple Moving Average (SMA)
/// Arithmetic mean of the `period` prices strictly preceding each index
pub struct SMA {
    period: usize,
}

impl SMA {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// Calculate SMA for a price series
    /// Returns a vector of the same length as input
    /// First `period` values are absent (warmup period)
    ///
    /// The window for index i is `prices[i - period..i]`, so the average lags
    /// one step behind the current price. Bollinger bands rely on this.
    pub fn calculate(&self, prices: &[f64]) -> IndicatorSeries {
        let mut result = vec![None; prices.len()];

        if self.period == 0 {
            return result;
        }

        for i in self.period..prices.len() {
            let window = &prices[i - self.period..i];
            let sum: f64 = window.iter().sum();
            result[i] = Some(sum / self.period as f64);
        }

        result
    }
}

/// Exponential Moving Average (EMA)
/// Gives more weight to recent prices using exponential smoothing
pub struct EMA {
    period: usize,
}

impl EMA {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// Smoothing factor (k) for EMA calculation
    /// k = 2 / (period + 1)
    fn smoothing_factor(&self) -> f64 {
        2.0 / (self.period as f64 + 1.0)
    }

    /// Calculate EMA for a price series
    /// Returns a vector of the same length as input, with no warmup gap:
    /// the filter is seeded directly on the first raw price
    pub fn calculate(&self, prices: &[f64]) -> Vec<f64> {
        let k = self.smoothing_factor();
        let mut result = Vec::with_capacity(prices.len());

        // EMA(t) = Price(t) * k + EMA(t-1) * (1 - k)
        for &price in prices {
            let next = match result.last() {
                Some(&prev_ema) => price * k + prev_ema * (1.0 - k),
                None => price,
            };
            result.push(next);
        }

        result
    }
}
