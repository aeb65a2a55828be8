//! Earnings Calculator
//!
//! Converts engagement counter deltas into monetary ledger entries under
//! fixed-rate rules. Earnings are realized only the first time a counter
//! crosses a multiple of its divisor; entries are keyed by
//! `(content_id, rule, threshold_index)` so recomputation is idempotent and
//! no threshold crossing is ever paid twice. Amounts are integer cents.

pub mod calculator;
pub mod entry;

pub use calculator::EarningsCalculator;
pub use entry::{EarningsLedgerEntry, EarningsStore, RateRule};
