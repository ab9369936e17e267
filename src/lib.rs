pub mod auth;
pub mod config;
pub mod engine;
pub mod history;
pub mod providers;
pub mod scoring;
pub mod verdict;

pub use auth::{StaticTokenVerifier, TokenVerifier};
pub use config::{BlocklistConfig, Config, HistoryConfig};
pub use engine::{AnalysisEngine, UrlAnalysis};
pub use history::{EntryKind, HistoryEntry, HistoryStore, UserStats};
pub use providers::{
    AiAnalyzer, AiTextReply, AiUrlReply, BlacklistProvider, BlacklistReply, BlacklistVerdict,
    DomainBlocklist, ProviderError,
};
pub use scoring::{combine_verdicts, extract_urls, score_text, score_url};
pub use verdict::{
    CombinedVerdict, ScoreResult, ScoredUrl, Source, SourceBreakdown, SourceVerdict,
    TextScoreResult, Verdict,
};
