use crate::config::Config;
use crate::history::{EntryKind, HistoryEntry, HistoryStore};
use crate::providers::{AiAnalyzer, AiUrlReply, BlacklistProvider, BlacklistReply, ProviderError};
use crate::scoring::{combine_verdicts, score_text, score_url};
use crate::verdict::{CombinedVerdict, ScoreResult, TextScoreResult, Verdict};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;

/// Full result of a URL analysis: the always-available local heuristic plus
/// the combined verdict across whatever sources answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlAnalysis {
    pub url: String,
    pub heuristic: ScoreResult,
    pub combined: CombinedVerdict,
}

/// Orchestrates an analysis: runs the local heuristic inline, issues the
/// remote lookups concurrently with per-lookup timeouts, feeds the combiner
/// and appends to history. A failing or slow source degrades to "absent";
/// it never aborts the analysis.
pub struct AnalysisEngine {
    blacklist: Option<Box<dyn BlacklistProvider>>,
    ai: Option<Box<dyn AiAnalyzer>>,
    history: Option<HistoryStore>,
    blacklist_timeout: Duration,
    ai_timeout: Duration,
}

impl AnalysisEngine {
    pub fn new(config: &Config) -> Self {
        Self {
            blacklist: None,
            ai: None,
            history: None,
            blacklist_timeout: Duration::from_secs(config.blacklist_timeout_seconds),
            ai_timeout: Duration::from_secs(config.ai_timeout_seconds),
        }
    }

    pub fn with_blacklist(mut self, provider: Box<dyn BlacklistProvider>) -> Self {
        self.blacklist = Some(provider);
        self
    }

    pub fn with_ai(mut self, analyzer: Box<dyn AiAnalyzer>) -> Self {
        self.ai = Some(analyzer);
        self
    }

    pub fn with_history(mut self, store: HistoryStore) -> Self {
        self.history = Some(store);
        self
    }

    pub async fn analyze_url(&self, url: &str, username: &str) -> UrlAnalysis {
        let heuristic = score_url(url);
        log::info!(
            "Heuristic verdict for {url}: {} ({}%)",
            heuristic.verdict,
            heuristic.score
        );

        // The two remote lookups are independent; run them concurrently.
        let (blacklist, ai) = tokio::join!(self.blacklist_lookup(url), self.ai_url_lookup(url));

        let combined = combine_verdicts(Some(&heuristic), blacklist.as_ref(), ai.as_ref());
        log::info!("Combined verdict for {url}: {}", combined.verdict);

        self.record(username, EntryKind::Url, url, combined.verdict, None);

        UrlAnalysis {
            url: url.to_string(),
            heuristic,
            combined,
        }
    }

    pub async fn analyze_text(&self, text: &str, username: &str) -> TextScoreResult {
        let result = match &self.ai {
            None => score_text(text),
            Some(ai) => match timeout(self.ai_timeout, ai.analyze_text(text)).await {
                Ok(Ok(reply)) => {
                    let score = reply.percentage.min(100);
                    let verdict = Verdict::parse_label(&reply.verdict)
                        .unwrap_or_else(|| Verdict::from_text_score(score));
                    TextScoreResult {
                        score,
                        verdict,
                        reasons: reply.reasons,
                        url_results: reply.url_results,
                    }
                }
                Ok(Err(ProviderError::NotConfigured)) => {
                    log::debug!("AI analyzer not configured, using local text scorer");
                    score_text(text)
                }
                Ok(Err(e)) => {
                    log::warn!("AI text analysis failed: {e}");
                    Self::local_fallback(text, &e.to_string())
                }
                Err(_) => {
                    log::warn!("AI text analysis timed out");
                    Self::local_fallback(text, "timed out")
                }
            },
        };

        self.record(
            username,
            EntryKind::Text,
            text,
            result.verdict,
            Some(result.score),
        );

        result
    }

    fn local_fallback(text: &str, detail: &str) -> TextScoreResult {
        let mut local = score_text(text);
        local
            .reasons
            .insert(0, format!("local fallback after provider error: {detail}"));
        local
    }

    async fn blacklist_lookup(&self, url: &str) -> Option<BlacklistReply> {
        let provider = self.blacklist.as_deref()?;
        match timeout(self.blacklist_timeout, provider.check(url)).await {
            Ok(Ok(reply)) => {
                log::debug!("Blacklist verdict for {url}: {:?}", reply.verdict);
                Some(reply)
            }
            Ok(Err(ProviderError::NotConfigured)) => {
                log::debug!("Blacklist provider not configured");
                None
            }
            Ok(Err(e)) => {
                log::warn!("Blacklist lookup failed for {url}: {e}");
                None
            }
            Err(_) => {
                log::warn!("Blacklist lookup timed out for {url}");
                None
            }
        }
    }

    async fn ai_url_lookup(&self, url: &str) -> Option<AiUrlReply> {
        let analyzer = self.ai.as_deref()?;
        match timeout(self.ai_timeout, analyzer.analyze_url(url)).await {
            Ok(Ok(reply)) => {
                log::debug!("AI verdict for {url}: {}", reply.verdict);
                Some(reply)
            }
            Ok(Err(ProviderError::NotConfigured)) => {
                log::debug!("AI analyzer not configured");
                None
            }
            Ok(Err(e)) => {
                log::warn!("AI analysis failed for {url}: {e}");
                None
            }
            Err(_) => {
                log::warn!("AI analysis timed out for {url}");
                None
            }
        }
    }

    /// History is best-effort: a storage failure is logged, never surfaced.
    fn record(
        &self,
        username: &str,
        kind: EntryKind,
        input: &str,
        verdict: Verdict,
        percentage: Option<u8>,
    ) {
        if let Some(store) = &self.history {
            let entry = HistoryEntry {
                username: username.to_string(),
                kind,
                input: input.to_string(),
                verdict,
                percentage,
                timestamp: Utc::now(),
            };
            if let Err(e) = store.append(&entry) {
                log::warn!("Failed to record history entry: {e}");
            }
        }
    }
}
