use super::{
    Assessment, Indicator, IndicatorVote, Readings, SignalDecision, SignalKind, SignalPolicy,
    Vote, VoteThresholds,
};

const SCORE_MAGNITUDE: i32 = 90;

/// RSI-only scoring: +90 when oversold, -90 when overbought, 0 otherwise
/// MACD and Bollinger readings are ignored
pub struct RsiScorePolicy {
    thresholds: VoteThresholds,
}

impl RsiScorePolicy {
    pub fn new(thresholds: VoteThresholds) -> Self {
        Self { thresholds }
    }

    /// Score in [-90, 90]; an absent RSI scores 0
    pub fn score(&self, rsi: Option<f64>) -> i32 {
        match rsi {
            Some(v) if v < self.thresholds.rsi_oversold => SCORE_MAGNITUDE,
            Some(v) if v > self.thresholds.rsi_overbought => -SCORE_MAGNITUDE,
            _ => 0,
        }
    }
}

impl SignalPolicy for RsiScorePolicy {
    fn assess(&self, readings: &Readings) -> Assessment {
        let score = self.score(readings.rsi);

        let signal = match score.signum() {
            1 => SignalDecision {
                kind: SignalKind::Buy,
                votes: vec![IndicatorVote::new(Indicator::Rsi, Vote::Buy)],
            },
            -1 => SignalDecision {
                kind: SignalKind::Sell,
                votes: vec![IndicatorVote::new(Indicator::Rsi, Vote::Sell)],
            },
            _ => SignalDecision::wait(),
        };

        Assessment {
            signal,
            score: Some(score),
        }
    }

    fn name(&self) -> &'static str {
        "rsi_score"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RsiScorePolicy {
        RsiScorePolicy::new(VoteThresholds::default())
    }

    #[test]
    fn test_score_thresholds() {
        let policy = policy();
        assert_eq!(policy.score(Some(10.0)), 90);
        assert_eq!(policy.score(Some(29.9)), 90);
        assert_eq!(policy.score(Some(30.0)), 0);
        assert_eq!(policy.score(Some(70.0)), 0);
        assert_eq!(policy.score(Some(99.0)), -90);
        assert_eq!(policy.score(None), 0);
    }

    #[test]
    fn test_assess_ignores_macd_and_bollinger() {
        let readings = Readings {
            rsi: Some(50.0),
            macd: Some(3.0),
            bollinger: Some(-2.0),
        };
        let result = policy().assess(&readings);

        assert_eq!(result.score, Some(0));
        assert_eq!(result.signal, SignalDecision::wait());
    }

    #[test]
    fn test_assess_overbought_sells() {
        let readings = Readings {
            rsi: Some(100.0 - 100.0 / 101.0),
            ..Readings::default()
        };
        let result = policy().assess(&readings);

        assert_eq!(result.score, Some(-90));
        assert_eq!(result.signal.kind, SignalKind::Sell);
        assert_eq!(
            result.signal.votes,
            vec![IndicatorVote::new(Indicator::Rsi, Vote::Sell)]
        );
    }

    #[test]
    fn test_assess_oversold_buys() {
        let readings = Readings {
            rsi: Some(12.0),
            ..Readings::default()
        };
        let result = policy().assess(&readings);
        assert_eq!(result.score, Some(90));
        assert_eq!(result.signal.kind, SignalKind::Buy);
    }
}
