use super::{
    Assessment, Indicator, IndicatorVote, Readings, SignalDecision, SignalKind, SignalPolicy,
    Vote, VoteThresholds,
};

/// Vote-based aggregation: RSI, MACD and Bollinger each vote Buy, Sell or
/// abstain; the first two cast votes decide
pub struct VotePolicy {
    thresholds: VoteThresholds,
}

impl VotePolicy {
    pub fn new(thresholds: VoteThresholds) -> Self {
        Self { thresholds }
    }

    /// Overbought -> Sell, oversold -> Buy, otherwise abstain
    fn rsi_vote(&self, rsi: f64) -> Option<Vote> {
        if rsi > self.thresholds.rsi_overbought {
            Some(Vote::Sell)
        } else if rsi < self.thresholds.rsi_oversold {
            Some(Vote::Buy)
        } else {
            None
        }
    }

    /// Never abstains
    fn macd_vote(&self, macd: f64) -> Vote {
        if macd > self.thresholds.macd_zero_line {
            Vote::Buy
        } else {
            Vote::Sell
        }
    }

    /// Price near upper band -> Sell, near lower band -> Buy
    fn bollinger_vote(&self, position: f64) -> Option<Vote> {
        if position > self.thresholds.bollinger_upper {
            Some(Vote::Sell)
        } else if position < self.thresholds.bollinger_lower {
            Some(Vote::Buy)
        } else {
            None
        }
    }

    /// Votes in RSI, MACD, Bollinger order; absent readings abstain
    pub fn cast_votes(&self, readings: &Readings) -> Vec<IndicatorVote> {
        let rsi = readings
            .rsi
            .and_then(|v| self.rsi_vote(v))
            .map(|vote| IndicatorVote::new(Indicator::Rsi, vote));
        let macd = readings
            .macd
            .map(|v| IndicatorVote::new(Indicator::Macd, self.macd_vote(v)));
        let bollinger = readings
            .bollinger
            .and_then(|v| self.bollinger_vote(v))
            .map(|vote| IndicatorVote::new(Indicator::Bollinger, vote));

        [rsi, macd, bollinger].into_iter().flatten().collect()
    }
}

/// Two or more votes: the first two must agree, otherwise Mixed.
/// One vote wins on its own. No votes means Wait.
pub fn aggregate(votes: Vec<IndicatorVote>) -> SignalDecision {
    let kind = match votes.as_slice() {
        [] => SignalKind::Wait,
        [only] => only.vote.into(),
        [first, second, ..] => {
            if first.vote == second.vote {
                first.vote.into()
            } else {
                SignalKind::Mixed
            }
        }
    };

    SignalDecision { kind, votes }
}

impl SignalPolicy for VotePolicy {
    fn assess(&self, readings: &Readings) -> Assessment {
        Assessment {
            signal: aggregate(self.cast_votes(readings)),
            score: None,
        }
    }

    fn name(&self) -> &'static str {
        "votes"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> VotePolicy {
        VotePolicy::new(VoteThresholds::default())
    }

    fn readings(rsi: Option<f64>, macd: Option<f64>, bollinger: Option<f64>) -> Readings {
        Readings {
            rsi,
            macd,
            bollinger,
        }
    }

    #[test]
    fn test_rsi_and_macd_agree_on_buy() {
        let result = policy().assess(&readings(Some(25.0), Some(0.002), None));

        assert_eq!(result.signal.kind, SignalKind::Buy);
        assert_eq!(
            result.signal.votes,
            vec![
                IndicatorVote::new(Indicator::Rsi, Vote::Buy),
                IndicatorVote::new(Indicator::Macd, Vote::Buy),
            ]
        );
        assert_eq!(result.score, None);
    }

    #[test]
    fn test_rsi_sell_macd_buy_is_mixed() {
        let result = policy().assess(&readings(Some(75.0), Some(0.5), None));
        assert_eq!(result.signal.kind, SignalKind::Mixed);
        assert_eq!(result.signal.votes.len(), 2);
    }

    #[test]
    fn test_macd_alone_decides() {
        // RSI neutral, Bollinger inside the bands
        let result = policy().assess(&readings(Some(50.0), Some(1.0), Some(0.1)));

        assert_eq!(result.signal.kind, SignalKind::Buy);
        assert_eq!(
            result.signal.votes,
            vec![IndicatorVote::new(Indicator::Macd, Vote::Buy)]
        );
    }

    #[test]
    fn test_macd_zero_votes_sell() {
        let result = policy().assess(&readings(None, Some(0.0), None));
        assert_eq!(result.signal.kind, SignalKind::Sell);
    }

    #[test]
    fn test_only_first_two_votes_count() {
        // RSI sell, MACD sell, Bollinger buy -> first two agree
        let result = policy().assess(&readings(Some(80.0), Some(-1.0), Some(-0.9)));
        assert_eq!(result.signal.kind, SignalKind::Sell);
        assert_eq!(result.signal.votes.len(), 3);

        // MACD buy, Bollinger sell -> disagree
        let result = policy().assess(&readings(Some(50.0), Some(1.0), Some(0.9)));
        assert_eq!(result.signal.kind, SignalKind::Mixed);
    }

    #[test]
    fn test_bollinger_thresholds_are_strict() {
        let policy = policy();
        assert_eq!(policy.bollinger_vote(0.5), None);
        assert_eq!(policy.bollinger_vote(-0.5), None);
        assert_eq!(policy.bollinger_vote(0.51), Some(Vote::Sell));
        assert_eq!(policy.bollinger_vote(-0.51), Some(Vote::Buy));
    }

    #[test]
    fn test_rsi_thresholds_are_strict() {
        let policy = policy();
        assert_eq!(policy.rsi_vote(70.0), None);
        assert_eq!(policy.rsi_vote(30.0), None);
        assert_eq!(policy.rsi_vote(70.01), Some(Vote::Sell));
        assert_eq!(policy.rsi_vote(29.99), Some(Vote::Buy));
    }

    #[test]
    fn test_no_readings_waits() {
        // Only reachable when MACD itself is absent
        let result = policy().assess(&Readings::default());
        assert_eq!(result.signal, SignalDecision::wait());
    }

    #[test]
    fn test_custom_thresholds() {
        let policy = VotePolicy::new(VoteThresholds {
            rsi_overbought: 60.0,
            rsi_oversold: 40.0,
            macd_zero_line: 0.5,
            bollinger_upper: 0.8,
            bollinger_lower: -0.8,
        });

        let result = policy.assess(&readings(Some(65.0), Some(0.4), Some(0.7)));
        assert_eq!(result.signal.kind, SignalKind::Sell);
        assert_eq!(result.signal.votes.len(), 2);
    }

    #[test]
    fn test_aggregate_single_bollinger_vote() {
        let votes = vec![IndicatorVote::new(Indicator::Bollinger, Vote::Sell)];
        assert_eq!(aggregate(votes).kind, SignalKind::Sell);
    }
}
