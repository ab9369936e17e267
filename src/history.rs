use crate::verdict::Verdict;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Text,
    Url,
}

impl EntryKind {
    fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Text => "text",
            EntryKind::Url => "url",
        }
    }

    fn parse(value: &str) -> Self {
        match value {
            "url" => EntryKind::Url,
            _ => EntryKind::Text,
        }
    }
}

/// One analyzed input, as persisted. `percentage` is the numeric risk for
/// text analyses; URL analyses store no percentage and are normalized from
/// the verdict when computing statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub username: String,
    pub kind: EntryKind,
    pub input: String,
    pub verdict: Verdict,
    pub percentage: Option<u8>,
    pub timestamp: DateTime<Utc>,
}

/// Aggregated per-user statistics over the history. Percentages are
/// integer-truncated shares of the normalized risk buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub total: u64,
    pub avg_risk: u8,
    pub safe_pct: u8,
    pub suspicious_pct: u8,
    pub phishing_pct: u8,
}

/// SQLite-backed analysis history. Connections are opened per operation;
/// the store itself is cheap to clone around as a path.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    db_path: String,
}

impl HistoryStore {
    pub fn new(db_path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create history directory: {}", parent.display())
                })?;
            }
        }

        let store = Self {
            db_path: db_path.to_string(),
        };
        store.open()?;
        Ok(store)
    }

    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)
            .with_context(|| format!("Failed to open history database: {}", self.db_path))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS history (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL,
                kind TEXT NOT NULL,
                input TEXT NOT NULL,
                verdict TEXT NOT NULL,
                percentage INTEGER,
                timestamp TEXT NOT NULL
            )",
            [],
        )?;

        Ok(conn)
    }

    pub fn append(&self, entry: &HistoryEntry) -> Result<()> {
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO history (username, kind, input, verdict, percentage, timestamp)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                entry.username,
                entry.kind.as_str(),
                entry.input,
                entry.verdict.to_string(),
                entry.percentage,
                entry.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// All of a user's entries in insertion order.
    pub fn list(&self, username: &str) -> Result<Vec<HistoryEntry>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(
            "SELECT username, kind, input, verdict, percentage, timestamp
             FROM history WHERE username = ? ORDER BY id ASC",
        )?;

        let entries = stmt
            .query_map(params![username], |row| {
                let kind: String = row.get(1)?;
                let verdict: String = row.get(3)?;
                let timestamp: String = row.get(5)?;
                Ok(HistoryEntry {
                    username: row.get(0)?,
                    kind: EntryKind::parse(&kind),
                    input: row.get(2)?,
                    verdict: Verdict::parse_label(&verdict).unwrap_or(Verdict::Suspicious),
                    percentage: row.get(4)?,
                    timestamp: DateTime::parse_from_rfc3339(&timestamp)
                        .map(|t| t.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now()),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Delete a user's entries, returning how many were removed.
    pub fn clear(&self, username: &str) -> Result<usize> {
        let conn = self.open()?;
        let deleted = conn.execute("DELETE FROM history WHERE username = ?", params![username])?;
        Ok(deleted)
    }

    /// Per-user statistics. Rows without a stored percentage (URL analyses)
    /// are normalized from the verdict: Safe counts as risk 10, Malicious
    /// as 90, anything else as 50.
    pub fn stats(&self, username: &str) -> Result<UserStats> {
        let conn = self.open()?;
        let mut stmt =
            conn.prepare("SELECT verdict, percentage FROM history WHERE username = ?")?;

        let risks = stmt
            .query_map(params![username], |row| {
                let verdict: String = row.get(0)?;
                let percentage: Option<u8> = row.get(1)?;
                Ok(percentage.unwrap_or_else(|| {
                    match Verdict::parse_label(&verdict) {
                        Some(Verdict::Safe) => 10,
                        Some(Verdict::Malicious) => 90,
                        _ => 50,
                    }
                }))
            })?
            .collect::<std::result::Result<Vec<u8>, _>>()?;

        let total = risks.len() as u64;
        if total == 0 {
            return Ok(UserStats {
                total: 0,
                avg_risk: 0,
                safe_pct: 0,
                suspicious_pct: 0,
                phishing_pct: 0,
            });
        }

        let sum: u64 = risks.iter().map(|r| *r as u64).sum();
        let safe = risks.iter().filter(|r| **r <= 33).count() as u64;
        let phishing = risks.iter().filter(|r| **r > 66).count() as u64;
        let suspicious = total - safe - phishing;

        Ok(UserStats {
            total,
            avg_risk: (sum / total) as u8,
            safe_pct: (safe * 100 / total) as u8,
            suspicious_pct: (suspicious * 100 / total) as u8,
            phishing_pct: (phishing * 100 / total) as u8,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> HistoryStore {
        let path = std::env::temp_dir().join(format!(
            "phishguard-history-{}-{}.db",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        HistoryStore::new(path.to_str().unwrap()).unwrap()
    }

    fn entry(username: &str, kind: EntryKind, verdict: Verdict, percentage: Option<u8>) -> HistoryEntry {
        HistoryEntry {
            username: username.to_string(),
            kind,
            input: "input".to_string(),
            verdict,
            percentage,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_append_and_list_round_trip() {
        let store = temp_store("roundtrip");
        let first = entry("alice", EntryKind::Text, Verdict::Suspicious, Some(54));
        let second = entry("alice", EntryKind::Url, Verdict::Safe, None);
        store.append(&first).unwrap();
        store.append(&second).unwrap();

        let entries = store.list("alice").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, EntryKind::Text);
        assert_eq!(entries[0].verdict, Verdict::Suspicious);
        assert_eq!(entries[0].percentage, Some(54));
        assert_eq!(entries[1].kind, EntryKind::Url);
        assert_eq!(entries[1].percentage, None);
    }

    #[test]
    fn test_clear_removes_only_that_user() {
        let store = temp_store("clear");
        store
            .append(&entry("alice", EntryKind::Text, Verdict::Safe, Some(5)))
            .unwrap();
        store
            .append(&entry("alice", EntryKind::Url, Verdict::Safe, None))
            .unwrap();
        store
            .append(&entry("bob", EntryKind::Text, Verdict::Malicious, Some(90)))
            .unwrap();

        assert_eq!(store.clear("alice").unwrap(), 2);
        assert!(store.list("alice").unwrap().is_empty());
        assert_eq!(store.list("bob").unwrap().len(), 1);
    }

    #[test]
    fn test_stats_normalizes_url_rows() {
        let store = temp_store("stats");
        // Text analysis with stored risk 80, and two URL analyses whose
        // verdicts normalize to 10 (Safe) and 90 (Malicious).
        store
            .append(&entry("alice", EntryKind::Text, Verdict::Malicious, Some(80)))
            .unwrap();
        store
            .append(&entry("alice", EntryKind::Url, Verdict::Safe, None))
            .unwrap();
        store
            .append(&entry("alice", EntryKind::Url, Verdict::Malicious, None))
            .unwrap();

        let stats = store.stats("alice").unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.avg_risk, 60);
        assert_eq!(stats.safe_pct, 33);
        assert_eq!(stats.suspicious_pct, 0);
        assert_eq!(stats.phishing_pct, 66);
    }

    #[test]
    fn test_stats_for_unknown_user_are_empty() {
        let store = temp_store("empty");
        let stats = store.stats("nobody").unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.avg_risk, 0);
    }

    #[test]
    fn test_suspicious_url_row_normalizes_to_midpoint() {
        let store = temp_store("midpoint");
        store
            .append(&entry("alice", EntryKind::Url, Verdict::Suspicious, None))
            .unwrap();
        let stats = store.stats("alice").unwrap();
        assert_eq!(stats.avg_risk, 50);
        assert_eq!(stats.suspicious_pct, 100);
    }
}
