// Technical indicators module
// Pure calculation functions over closing prices, oldest first

pub mod bollinger;
pub mod macd;
pub mod moving_averages;
pub mod rsi;

pub use bollinger::{Band, BollingerBands};
pub use macd::{MacdSeries, MACD};
pub use moving_averages::{EMA, SMA};
pub use rsi::RSI;

/// Indicator output aligned with its source prices; `None` marks entries
/// that are not computable yet
pub type IndicatorSeries = Vec<Option<f64>>;

/// Last present value of a series
pub fn latest<T: Copy>(series: &[Option<T>]) -> Option<T> {
    series.iter().rev().find_map(|v| *v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_skips_absent_tail() {
        assert_eq!(latest(&[None, Some(1.0), Some(2.0)]), Some(2.0));
        assert_eq!(latest(&[Some(1.0), None]), Some(1.0));
        assert_eq!(latest::<f64>(&[None, None]), None);
        assert_eq!(latest::<f64>(&[]), None);
    }
}
