use serde::{Deserialize, Serialize};
use std::fmt;

/// Three-tier classification shared by every detection source.
///
/// The text path historically reports these as Seguro/Sospechoso/Phishing;
/// `text_label` preserves those labels for display while the enum stays
/// the single canonical representation everywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Safe,
    Suspicious,
    Malicious,
}

impl Verdict {
    /// Derive a verdict from a URL risk score (0-100).
    pub fn from_score(score: u8) -> Self {
        if score > 60 {
            Verdict::Malicious
        } else if score > 30 {
            Verdict::Suspicious
        } else {
            Verdict::Safe
        }
    }

    /// Derive a verdict from a text risk score (0-100). The text path uses
    /// wider bands than the URL path.
    pub fn from_text_score(score: u8) -> Self {
        if score > 66 {
            Verdict::Malicious
        } else if score > 33 {
            Verdict::Suspicious
        } else {
            Verdict::Safe
        }
    }

    /// Parse an externally supplied verdict label. Accepts the canonical
    /// English names plus the Spanish label families used by upstream
    /// providers ("Maliciosa", "Sospechoso", "Segura", "Phishing", ...).
    /// Returns `None` for anything unrecognized so the caller can fall back
    /// to a numeric score.
    pub fn parse_label(label: &str) -> Option<Self> {
        let lower = label.trim().to_lowercase();
        // "malicios" covers both "malicious" and "maliciosa"/"malicioso".
        if lower.contains("malicios") || lower.contains("phishing") {
            Some(Verdict::Malicious)
        } else if lower.contains("suspicious") || lower.contains("sospech") {
            Some(Verdict::Suspicious)
        } else if lower.contains("safe") || lower.contains("segur") {
            Some(Verdict::Safe)
        } else {
            None
        }
    }

    /// Display label for the text analysis path.
    pub fn text_label(&self) -> &'static str {
        match self {
            Verdict::Safe => "Seguro",
            Verdict::Suspicious => "Sospechoso",
            Verdict::Malicious => "Phishing",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verdict::Safe => "Safe",
            Verdict::Suspicious => "Suspicious",
            Verdict::Malicious => "Malicious",
        };
        write!(f, "{name}")
    }
}

/// The independent detection sources the combiner reconciles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    Heuristic,
    Blacklist,
    Ai,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Source::Heuristic => "Heuristic",
            Source::Blacklist => "Blacklist",
            Source::Ai => "AI",
        };
        write!(f, "{name}")
    }
}

/// Result of scoring a single URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u8,
    pub verdict: Verdict,
    pub reasons: Vec<String>,
}

/// One embedded URL and its score, reported by the text scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredUrl {
    pub url: String,
    pub result: ScoreResult,
}

/// Result of scoring free text: overall score plus per-URL detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextScoreResult {
    pub score: u8,
    pub verdict: Verdict,
    pub reasons: Vec<String>,
    pub url_results: Vec<ScoredUrl>,
}

/// One source's contribution to a combined verdict. `verdict` is `None`
/// when the source answered but abstained (a blacklist "Unknown"), in
/// which case `weight` is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceVerdict {
    pub source: Source,
    pub verdict: Option<Verdict>,
    pub weight: u32,
    pub reason: String,
}

/// Per-source breakdown attached to a combined verdict. A `None` entry
/// means that source was not consulted or failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceBreakdown {
    pub heuristic: Option<SourceVerdict>,
    pub blacklist: Option<SourceVerdict>,
    pub ai: Option<SourceVerdict>,
}

/// Final verdict for a URL after the weighted vote across sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedVerdict {
    pub verdict: Verdict,
    pub reason: String,
    pub breakdown: SourceBreakdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_score_thresholds() {
        assert_eq!(Verdict::from_score(0), Verdict::Safe);
        assert_eq!(Verdict::from_score(30), Verdict::Safe);
        assert_eq!(Verdict::from_score(31), Verdict::Suspicious);
        assert_eq!(Verdict::from_score(60), Verdict::Suspicious);
        assert_eq!(Verdict::from_score(61), Verdict::Malicious);
        assert_eq!(Verdict::from_score(100), Verdict::Malicious);
    }

    #[test]
    fn test_text_score_thresholds() {
        assert_eq!(Verdict::from_text_score(33), Verdict::Safe);
        assert_eq!(Verdict::from_text_score(34), Verdict::Suspicious);
        assert_eq!(Verdict::from_text_score(66), Verdict::Suspicious);
        assert_eq!(Verdict::from_text_score(67), Verdict::Malicious);
    }

    #[test]
    fn test_parse_label_synonyms() {
        assert_eq!(Verdict::parse_label("Malicious"), Some(Verdict::Malicious));
        assert_eq!(Verdict::parse_label("Maliciosa"), Some(Verdict::Malicious));
        assert_eq!(Verdict::parse_label("phishing"), Some(Verdict::Malicious));
        assert_eq!(
            Verdict::parse_label("Sospechosa"),
            Some(Verdict::Suspicious)
        );
        assert_eq!(Verdict::parse_label("SUSPICIOUS"), Some(Verdict::Suspicious));
        assert_eq!(Verdict::parse_label("Segura"), Some(Verdict::Safe));
        assert_eq!(Verdict::parse_label(" safe "), Some(Verdict::Safe));
        assert_eq!(Verdict::parse_label("Desconocido"), None);
        assert_eq!(Verdict::parse_label(""), None);
    }

    #[test]
    fn test_text_labels() {
        assert_eq!(Verdict::Safe.text_label(), "Seguro");
        assert_eq!(Verdict::Suspicious.text_label(), "Sospechoso");
        assert_eq!(Verdict::Malicious.text_label(), "Phishing");
    }
}
