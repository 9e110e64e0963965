use super::moving_averages::EMA;

/// MACD line, signal line and histogram, each aligned with the input prices
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub hist: Vec<f64>,
}

/// Moving Average Convergence Divergence
/// MACD = EMA(fast) - EMA(slow), signal = EMA(MACD, signal_period)
pub struct MACD {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Default for MACD {
    fn default() -> Self {
        Self::new(12, 26, 9)
    }
}

impl MACD {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast_period,
            slow_period,
            signal_period,
        }
    }

    /// Calculate MACD for a price series
    /// All three series have the same length as input and no warmup gap,
    /// since the underlying EMAs are seeded on the first price
    pub fn calculate(&self, prices: &[f64]) -> MacdSeries {
        let fast = EMA::new(self.fast_period).calculate(prices);
        let slow = EMA::new(self.slow_period).calculate(prices);

        let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = EMA::new(self.signal_period).calculate(&macd);
        let hist = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();

        MacdSeries { macd, signal, hist }
    }
}
