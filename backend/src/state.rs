use crate::api_client::ApiClient;
use crate::config::AppConfig;
use crate::models::*;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<RwLock<AppStateInner>>,
    pub config: Arc<AppConfig>,
    pub client: ApiClient,
}

pub struct AppStateInner {
    /// Most recent report per watched pair
    pub latest: HashMap<Pair, SignalReport>,
    /// Every emitted signal, oldest first, capped at `history_size`
    pub history: VecDeque<SignalRecord>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let client = ApiClient::new(config.market.base_url.clone());

        Self {
            inner: Arc::new(RwLock::new(AppStateInner {
                latest: HashMap::new(),
                history: VecDeque::new(),
            })),
            config: Arc::new(config),
            client,
        }
    }

    /// Request key if given, otherwise the configured one
    pub fn resolve_api_key(&self, requested: Option<String>) -> Option<String> {
        requested
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .or_else(|| self.config.market.api_key.clone())
    }

    /// Store a watched pair's report and record its signal
    pub async fn update_latest(&self, report: SignalReport) {
        let mut state = self.inner.write().await;
        Self::push_record(&mut state, SignalRecord::from(&report), self.config.history_size);
        state.latest.insert(report.symbol.clone(), report);
    }

    /// Record a signal evaluated on demand
    pub async fn record_signal(&self, report: &SignalReport) {
        let mut state = self.inner.write().await;
        Self::push_record(&mut state, SignalRecord::from(report), self.config.history_size);
    }

    fn push_record(state: &mut AppStateInner, record: SignalRecord, capacity: usize) {
        if capacity == 0 {
            return;
        }
        state.history.push_back(record);

        // Maintain bounded history
        while state.history.len() > capacity {
            state.history.pop_front();
        }
    }

    /// Latest watched reports, ordered by pair
    pub async fn latest_reports(&self) -> Vec<SignalReport> {
        let state = self.inner.read().await;
        let mut reports: Vec<SignalReport> = state.latest.values().cloned().collect();
        reports.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        reports
    }

    /// Recorded signals, newest first, optionally for one pair
    pub async fn history(&self, pair: Option<&str>, limit: usize) -> Vec<SignalRecord> {
        let state = self.inner.read().await;
        state
            .history
            .iter()
            .rev()
            .filter(|r| pair.map_or(true, |p| r.pair.eq_ignore_ascii_case(p)))
            .take(limit)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::{SignalDecision, SignalKind};
    use chrono::{NaiveDate, Utc};

    fn report(symbol: &str, price: f64) -> SignalReport {
        let datetime = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap();

        SignalReport {
            symbol: symbol.to_string(),
            interval: "1min".to_string(),
            price,
            latest: Candle {
                datetime,
                open: price,
                high: price,
                low: price,
                close: price,
                volume: None,
            },
            rsi: None,
            macd: None,
            macd_signal: None,
            macd_hist: None,
            bb: BandsReading::default(),
            band_position: None,
            signal: SignalDecision::wait(),
            score: None,
            policy: "votes",
            evaluated_at: Utc::now(),
        }
    }

    fn state_with_history(size: usize) -> AppState {
        let config = AppConfig {
            history_size: size,
            ..AppConfig::default()
        };
        AppState::new(config)
    }

    #[tokio::test]
    async fn test_latest_keeps_one_report_per_pair() {
        let state = state_with_history(10);
        state.update_latest(report("GBP/USD", 1.25)).await;
        state.update_latest(report("EUR/USD", 1.08)).await;
        state.update_latest(report("EUR/USD", 1.09)).await;

        let latest = state.latest_reports().await;
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].symbol, "EUR/USD");
        assert_eq!(latest[0].price, 1.09);
        assert_eq!(latest[1].symbol, "GBP/USD");
    }

    #[tokio::test]
    async fn test_history_is_bounded_and_newest_first() {
        let state = state_with_history(3);
        for i in 0..5 {
            state.record_signal(&report("EUR/USD", i as f64)).await;
        }

        let history = state.history(None, 10).await;
        let prices: Vec<f64> = history.iter().map(|r| r.price).collect();
        assert_eq!(prices, vec![4.0, 3.0, 2.0]);
        assert!(history.iter().all(|r| r.signal == SignalKind::Wait));
    }

    #[tokio::test]
    async fn test_history_filters_by_pair() {
        let state = state_with_history(10);
        state.record_signal(&report("EUR/USD", 1.0)).await;
        state.record_signal(&report("USD/JPY", 150.0)).await;
        state.update_latest(report("EUR/USD", 2.0)).await;

        let history = state.history(Some("eur/usd"), 10).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].price, 2.0);

        assert_eq!(state.history(None, 1).await.len(), 1);
    }

    #[tokio::test]
    async fn test_huge_history_size_does_not_preallocate() {
        let state = state_with_history(usize::MAX);
        state.record_signal(&report("EUR/USD", 1.0)).await;

        assert_eq!(state.history(None, usize::MAX).await.len(), 1);
    }

    #[test]
    fn test_resolve_api_key() {
        let mut config = AppConfig::default();
        config.market.api_key = Some("configured".to_string());
        let state = AppState::new(config);

        assert_eq!(state.resolve_api_key(Some("mine".into())).as_deref(), Some("mine"));
        assert_eq!(state.resolve_api_key(Some("  ".into())).as_deref(), Some("configured"));
        assert_eq!(state.resolve_api_key(None).as_deref(), Some("configured"));

        let state = state_with_history(1);
        assert_eq!(state.resolve_api_key(None), None);
    }
}
