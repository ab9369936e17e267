//! Collaborator contracts for the remote detection sources.
//!
//! The engine only depends on these traits; HTTP clients for concrete
//! providers live in embedding applications. The one implementation shipped
//! here is the local [`blocklist::DomainBlocklist`].

pub mod blocklist;

use crate::verdict::ScoredUrl;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use blocklist::DomainBlocklist;

/// Why a source produced no verdict. `NotConfigured` means the source has
/// no credentials/endpoint and should be silently skipped; `Transient`
/// covers timeouts, network failures and provider-side errors. Either way
/// the source is simply absent from the combiner's input set.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider not configured")]
    NotConfigured,
    #[error("provider error: {0}")]
    Transient(String),
}

/// What a blacklist can actually assert: a hit is strong evidence, a miss
/// is weak evidence, and `Unknown` means the lookup could not answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlacklistVerdict {
    Safe,
    Malicious,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlacklistReply {
    pub verdict: BlacklistVerdict,
    pub reason: String,
}

/// AI analyzer reply for a URL. The verdict label is kept raw here and
/// normalized once, at the combiner boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiUrlReply {
    pub verdict: String,
    pub score: u8,
    pub reason: String,
}

/// AI analyzer reply for free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiTextReply {
    pub verdict: String,
    pub percentage: u8,
    pub reasons: Vec<String>,
    pub url_results: Vec<ScoredUrl>,
}

#[async_trait]
pub trait BlacklistProvider: Send + Sync {
    async fn check(&self, url: &str) -> Result<BlacklistReply, ProviderError>;
}

#[async_trait]
pub trait AiAnalyzer: Send + Sync {
    async fn analyze_url(&self, url: &str) -> Result<AiUrlReply, ProviderError>;
    async fn analyze_text(&self, text: &str) -> Result<AiTextReply, ProviderError>;
}
