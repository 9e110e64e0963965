use super::IndicatorSeries;

/// rs used when the smoothed average loss is zero
const ZERO_LOSS_RS: f64 = 100.0;

/// Relative Strength Index (RSI)
/// Measures momentum by comparing magnitude of recent gains to recent losses
/// Returns values between 0-100:
/// - Below 30: Oversold (potentially undervalued)
/// - Above 70: Overbought (potentially overvalued)
pub struct RSI {
    period: usize,
}

impl Default for RSI {
    fn default() -> Self {
        Self::new(14)
    }
}

impl RSI {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// Calculate RSI for a price series using Wilder's smoothing method
    ///
    /// The series is built over price deltas, so it is one entry shorter than
    /// `prices`. The first `period` entries are absent; the seed averages over
    /// those deltas are never emitted themselves.
    ///
    /// A zero average loss pins rs to 100, which puts the reading at
    /// 100 - 100/101 (about 99.01) rather than 100.
    pub fn calculate(&self, prices: &[f64]) -> IndicatorSeries {
        let deltas: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
        let mut result = vec![None; deltas.len()];

        if self.period == 0 || deltas.len() < self.period {
            return result;
        }

        let period = self.period as f64;

        // Seed with a simple average over the first `period` deltas
        let (gains, losses) = deltas[..self.period]
            .iter()
            .fold((0.0, 0.0), |(gains, losses), &d| {
                if d >= 0.0 {
                    (gains + d, losses)
                } else {
                    (gains, losses + d.abs())
                }
            });

        let mut avg_gain = gains / period;
        let mut avg_loss = losses / period;

        // avg = ((prev_avg * (period - 1)) + current) / period
        for (i, &d) in deltas.iter().enumerate().skip(self.period) {
            let gain = d.max(0.0);
            let loss = (-d).max(0.0);

            avg_gain = (avg_gain * (period - 1.0) + gain) / period;
            avg_loss = (avg_loss * (period - 1.0) + loss) / period;

            let rs = if avg_loss == 0.0 {
                ZERO_LOSS_RS
            } else {
                avg_gain / avg_loss
            };

            result[i] = Some(100.0 - (100.0 / (1.0 + rs)));
        }

        result
    }
}
