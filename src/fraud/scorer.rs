//! Score aggregation and caching.

use chrono::{Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::FraudConfig;
use crate::fraud::signal::{FraudSignal, SignalKind};

/// Aggregates fraud signals into a per-user score.
///
/// Scores are cached and the cache entry is dropped whenever a new signal
/// arrives for the user. A user with no signal history scores 0.
pub struct FraudScorer {
    config: FraudConfig,
    signals: RwLock<HashMap<String, Vec<FraudSignal>>>,
    score_cache: RwLock<HashMap<String, u32>>,
}

impl FraudScorer {
    pub fn new(config: FraudConfig) -> Self {
        Self {
            config,
            signals: RwLock::new(HashMap::new()),
            score_cache: RwLock::new(HashMap::new()),
        }
    }

    /// Record a signal with the configured weight for its kind.
    pub async fn observe(&self, user_id: &str, kind: SignalKind) -> FraudSignal {
        let weight = self.config.weights.weight_for(kind);
        let signal = FraudSignal::new(user_id, kind, weight);
        self.record(signal.clone()).await;
        signal
    }

    /// Append a signal and invalidate the user's cached score.
    pub async fn record(&self, signal: FraudSignal) {
        let user_id = signal.user_id.clone();

        {
            let mut signals = self.signals.write().await;
            signals.entry(user_id.clone()).or_default().push(signal);
        }

        let mut cache = self.score_cache.write().await;
        cache.remove(&user_id);

        debug!(user_id = %user_id, "Fraud signal recorded, score cache invalidated");
    }

    /// Current score for a user: weighted sum of signals observed within the
    /// trailing window, clamped to [0, 100]. Deterministic for a given
    /// signal set; no history yields 0, never an error.
    pub async fn score(&self, user_id: &str) -> u32 {
        {
            let cache = self.score_cache.read().await;
            if let Some(score) = cache.get(user_id) {
                return *score;
            }
        }

        let score = self.recompute(user_id).await;

        let mut cache = self.score_cache.write().await;
        cache.insert(user_id.to_string(), score);
        score
    }

    async fn recompute(&self, user_id: &str) -> u32 {
        let cutoff = Utc::now() - Duration::days(self.config.window_days as i64);

        let signals = self.signals.read().await;
        let sum: i64 = signals
            .get(user_id)
            .map(|list| {
                list.iter()
                    .filter(|s| s.observed_at >= cutoff)
                    .map(|s| s.weight as i64)
                    .sum()
            })
            .unwrap_or(0);

        sum.clamp(0, 100) as u32
    }

    /// High-risk flag surfaced to moderators; also blocks new payouts.
    pub async fn is_high_risk(&self, user_id: &str) -> bool {
        self.score(user_id).await > self.config.payout_block_threshold
    }

    /// Whether the user's current score blocks payout assignment.
    pub async fn blocks_payout(&self, user_id: &str) -> bool {
        self.is_high_risk(user_id).await
    }

    /// Threshold consumed downstream; exposed rather than hardcoded.
    pub fn payout_block_threshold(&self) -> u32 {
        self.config.payout_block_threshold
    }

    /// Signal history for a user, oldest first.
    pub async fn signals_for(&self, user_id: &str) -> Vec<FraudSignal> {
        let signals = self.signals.read().await;
        signals.get(user_id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_no_history_scores_zero() {
        let scorer = FraudScorer::new(FraudConfig::default());
        assert_eq!(scorer.score("nobody").await, 0);
        assert!(!scorer.blocks_payout("nobody").await);
    }

    #[tokio::test]
    async fn test_weighted_sum_and_clamp() {
        let scorer = FraudScorer::new(FraudConfig::default());

        scorer.observe("mallory", SignalKind::VelocitySpike).await; // +30
        scorer.observe("mallory", SignalKind::DuplicateDevice).await; // +25
        assert_eq!(scorer.score("mallory").await, 55);

        // Pile on enough weight to exceed the cap.
        for _ in 0..5 {
            scorer.observe("mallory", SignalKind::VelocitySpike).await;
        }
        assert_eq!(scorer.score("mallory").await, 100);
    }

    #[tokio::test]
    async fn test_signals_outside_window_ignored() {
        let scorer = FraudScorer::new(FraudConfig::default());

        let stale = FraudSignal::new("mallory", SignalKind::VelocitySpike, 30)
            .observed_at(Utc::now() - Duration::days(120));
        scorer.record(stale).await;

        assert_eq!(scorer.score("mallory").await, 0);
    }

    #[tokio::test]
    async fn test_threshold_boundary() {
        let scorer = FraudScorer::new(FraudConfig::default());

        // 30 + 20 = exactly the default threshold of 50: not yet blocking.
        scorer.observe("edge", SignalKind::VelocitySpike).await;
        scorer.observe("edge", SignalKind::IpOverlap).await;
        assert_eq!(scorer.score("edge").await, 50);
        assert!(!scorer.blocks_payout("edge").await);

        scorer.observe("edge", SignalKind::ReportBurst).await;
        assert!(scorer.blocks_payout("edge").await);
    }

    #[tokio::test]
    async fn test_cache_invalidated_on_new_signal() {
        let scorer = FraudScorer::new(FraudConfig::default());

        assert_eq!(scorer.score("mallory").await, 0);
        scorer.observe("mallory", SignalKind::NewAccount).await;
        assert_eq!(scorer.score("mallory").await, 15);
    }
}
