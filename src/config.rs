//! Engine configuration.
//!
//! Rate tables, fraud weights, and moderation/payout thresholds are
//! configuration inputs rather than hardcoded constants, so the same engine
//! can be run (and tested) against different rule tables. Values load from
//! `FORUM_ENGINE_*` environment variables over compiled defaults and are
//! validated after load.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

use crate::fraud::SignalKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Earnings rate table.
    pub earnings: EarningsRates,
    /// Fraud scoring weights and thresholds.
    pub fraud: FraudConfig,
    /// Moderation configuration.
    pub moderation: ModerationConfig,
    /// Payout batch configuration.
    pub payout: PayoutConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Fixed-rate earnings rules, per counter kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarningsRates {
    /// Cumulative likes per threshold crossing.
    pub like_divisor: u64,
    /// Cents realized per like threshold crossing.
    pub like_cents: i64,
    /// Cumulative replies per threshold crossing.
    pub reply_divisor: u64,
    /// Cents realized per reply threshold crossing.
    pub reply_cents: i64,
}

impl Default for EarningsRates {
    fn default() -> Self {
        Self {
            like_divisor: 1_000,
            like_cents: 50,
            reply_divisor: 200,
            reply_cents: 50,
        }
    }
}

/// Per-signal weights applied when aggregating a fraud score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalWeights {
    pub velocity_spike: i32,
    pub new_account: i32,
    pub duplicate_device: i32,
    pub ip_overlap: i32,
    pub report_burst: i32,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            velocity_spike: 30,
            new_account: 15,
            duplicate_device: 25,
            ip_overlap: 20,
            report_burst: 10,
        }
    }
}

impl SignalWeights {
    pub fn weight_for(&self, kind: SignalKind) -> i32 {
        match kind {
            SignalKind::VelocitySpike => self.velocity_spike,
            SignalKind::NewAccount => self.new_account,
            SignalKind::DuplicateDevice => self.duplicate_device,
            SignalKind::IpOverlap => self.ip_overlap,
            SignalKind::ReportBurst => self.report_burst,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudConfig {
    /// Score above which new payouts are blocked and the user is surfaced
    /// to moderators as high risk.
    pub payout_block_threshold: u32,
    /// Trailing window over which signals contribute to the score.
    pub window_days: u32,
    /// Weight table for signal aggregation.
    pub weights: SignalWeights,
}

impl Default for FraudConfig {
    fn default() -> Self {
        Self {
            payout_block_threshold: 50,
            window_days: 90,
            weights: SignalWeights::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationConfig {
    /// Classifier confidence at or above which content is auto-hidden.
    pub auto_hide_confidence: f64,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            auto_hide_confidence: 0.95,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutConfig {
    /// A user's summed unassigned cents must reach this before inclusion in
    /// a batch; smaller balances carry forward to the next period.
    pub minimum_payout_cents: i64,
}

impl Default for PayoutConfig {
    fn default() -> Self {
        Self {
            minimum_payout_cents: 1_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string.
    pub postgres_url: String,
    /// Enable PostgreSQL (if false, the engine runs fully in memory).
    pub postgres_enabled: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            postgres_url: "postgresql://localhost:5432/forum_engine".to_string(),
            postgres_enabled: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            earnings: EarningsRates::default(),
            fraud: FraudConfig::default(),
            moderation: ModerationConfig::default(),
            payout: PayoutConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables over defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Earnings rates
        if let Ok(divisor) = env::var("FORUM_ENGINE_LIKE_DIVISOR") {
            config.earnings.like_divisor = divisor
                .parse()
                .context("Invalid FORUM_ENGINE_LIKE_DIVISOR value")?;
        }

        if let Ok(cents) = env::var("FORUM_ENGINE_LIKE_CENTS") {
            config.earnings.like_cents = cents
                .parse()
                .context("Invalid FORUM_ENGINE_LIKE_CENTS value")?;
        }

        if let Ok(divisor) = env::var("FORUM_ENGINE_REPLY_DIVISOR") {
            config.earnings.reply_divisor = divisor
                .parse()
                .context("Invalid FORUM_ENGINE_REPLY_DIVISOR value")?;
        }

        if let Ok(cents) = env::var("FORUM_ENGINE_REPLY_CENTS") {
            config.earnings.reply_cents = cents
                .parse()
                .context("Invalid FORUM_ENGINE_REPLY_CENTS value")?;
        }

        // Fraud scoring
        if let Ok(threshold) = env::var("FORUM_ENGINE_FRAUD_PAYOUT_BLOCK_THRESHOLD") {
            config.fraud.payout_block_threshold = threshold
                .parse()
                .context("Invalid FORUM_ENGINE_FRAUD_PAYOUT_BLOCK_THRESHOLD value")?;
        }

        if let Ok(days) = env::var("FORUM_ENGINE_FRAUD_WINDOW_DAYS") {
            config.fraud.window_days = days
                .parse()
                .context("Invalid FORUM_ENGINE_FRAUD_WINDOW_DAYS value")?;
        }

        // Moderation
        if let Ok(confidence) = env::var("FORUM_ENGINE_AUTO_HIDE_CONFIDENCE") {
            config.moderation.auto_hide_confidence = confidence
                .parse()
                .context("Invalid FORUM_ENGINE_AUTO_HIDE_CONFIDENCE value")?;
        }

        // Payouts
        if let Ok(minimum) = env::var("FORUM_ENGINE_MINIMUM_PAYOUT_CENTS") {
            config.payout.minimum_payout_cents = minimum
                .parse()
                .context("Invalid FORUM_ENGINE_MINIMUM_PAYOUT_CENTS value")?;
        }

        // Database
        if let Ok(url) = env::var("FORUM_ENGINE_POSTGRES_URL") {
            config.database.postgres_url = url;
        }

        if let Ok(enabled) = env::var("FORUM_ENGINE_POSTGRES_ENABLED") {
            config.database.postgres_enabled = enabled
                .parse()
                .context("Invalid FORUM_ENGINE_POSTGRES_ENABLED value")?;
        }

        // Logging
        if let Ok(level) = env::var("FORUM_ENGINE_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration consistency.
    pub fn validate(&self) -> Result<()> {
        if self.earnings.like_divisor == 0 || self.earnings.reply_divisor == 0 {
            return Err(anyhow::anyhow!("rate divisors must be non-zero"));
        }

        if self.earnings.like_cents < 0 || self.earnings.reply_cents < 0 {
            return Err(anyhow::anyhow!("rate amounts must be non-negative"));
        }

        if !(0.0..=1.0).contains(&self.moderation.auto_hide_confidence) {
            return Err(anyhow::anyhow!(
                "auto-hide confidence must be within [0.0, 1.0], got {}",
                self.moderation.auto_hide_confidence
            ));
        }

        if self.fraud.payout_block_threshold > 100 {
            return Err(anyhow::anyhow!(
                "fraud payout block threshold must be within [0, 100], got {}",
                self.fraud.payout_block_threshold
            ));
        }

        if self.payout.minimum_payout_cents < 0 {
            return Err(anyhow::anyhow!("minimum payout must be non-negative"));
        }

        Ok(())
    }
}
