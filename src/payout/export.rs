//! CSV export and digest.
//!
//! The export serializes per-user totals and entry references
//! deterministically, so the stored SHA-256 lets a later audit verify the
//! delivered file independent of the delivery channel's integrity.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::earnings::EarningsLedgerEntry;

/// Build the export CSV for a batch. One `entry` row per assigned entry,
/// ordered by user id then entry id, followed by one `total` row per user.
pub fn build_csv(batch_id: &str, period_id: &str, entries: &[EarningsLedgerEntry]) -> String {
    let mut by_user: BTreeMap<&str, Vec<&EarningsLedgerEntry>> = BTreeMap::new();
    for entry in entries {
        by_user.entry(entry.user_id.as_str()).or_default().push(entry);
    }

    let mut csv = String::from("record,batch_id,period_id,user_id,entry_id,content_id,amount_cents\n");

    for (user_id, user_entries) in &mut by_user {
        user_entries.sort_by(|a, b| a.id.cmp(&b.id));
        for entry in user_entries.iter() {
            csv.push_str(&format!(
                "entry,{},{},{},{},{},{}\n",
                batch_id, period_id, user_id, entry.id, entry.content_id, entry.amount_cents
            ));
        }
        let total: i64 = user_entries.iter().map(|e| e.amount_cents).sum();
        csv.push_str(&format!(
            "total,{},{},{},,,{}\n",
            batch_id, period_id, user_id, total
        ));
    }

    csv
}

/// SHA-256 of the CSV bytes, hex-encoded.
pub fn csv_sha256(csv: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(csv.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Seam to the external export collaborator.
pub trait ExportSink: Send + Sync {
    fn deliver(&self, period_id: &str, csv: &str) -> anyhow::Result<()>;
}

/// Accepts and drops every export. Default wiring.
pub struct NullExportSink;

impl ExportSink for NullExportSink {
    fn deliver(&self, _period_id: &str, _csv: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Collects exports in memory; used in tests.
#[derive(Default)]
pub struct RecordingExportSink {
    exports: Mutex<Vec<(String, String)>>,
}

impl RecordingExportSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exports(&self) -> Vec<(String, String)> {
        self.exports.lock().unwrap().clone()
    }
}

impl ExportSink for RecordingExportSink {
    fn deliver(&self, period_id: &str, csv: &str) -> anyhow::Result<()> {
        self.exports
            .lock()
            .unwrap()
            .push((period_id.to_string(), csv.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::earnings::RateRule;

    #[test]
    fn test_csv_is_deterministic_and_totalled() {
        let mut e1 = EarningsLedgerEntry::new("bob", "topic_1", RateRule::Likes, 1, 50);
        let mut e2 = EarningsLedgerEntry::new("alice", "topic_2", RateRule::Replies, 1, 50);
        let mut e3 = EarningsLedgerEntry::new("alice", "topic_2", RateRule::Likes, 1, 50);
        e1.id = "earn_b1".to_string();
        e2.id = "earn_a2".to_string();
        e3.id = "earn_a1".to_string();

        let entries = vec![e1, e2, e3];
        let csv = build_csv("batch_1", "2025-02B", &entries);

        // Users in lexicographic order, entries sorted within a user.
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[1].starts_with("entry,batch_1,2025-02B,alice,earn_a1"));
        assert!(lines[2].starts_with("entry,batch_1,2025-02B,alice,earn_a2"));
        assert_eq!(lines[3], "total,batch_1,2025-02B,alice,,,100");
        assert!(lines[4].starts_with("entry,batch_1,2025-02B,bob,earn_b1"));
        assert_eq!(lines[5], "total,batch_1,2025-02B,bob,,,50");

        // Same input, same digest.
        let reshuffled = vec![entries[2].clone(), entries[0].clone(), entries[1].clone()];
        let csv2 = build_csv("batch_1", "2025-02B", &reshuffled);
        assert_eq!(csv_sha256(&csv), csv_sha256(&csv2));
    }

    #[test]
    fn test_sha256_hex_shape() {
        let digest = csv_sha256("record\n");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
