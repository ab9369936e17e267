use crate::providers::{AiUrlReply, BlacklistReply, BlacklistVerdict};
use crate::verdict::{CombinedVerdict, ScoreResult, Source, SourceBreakdown, SourceVerdict, Verdict};

/// Weighted vote tally across the three verdict buckets.
#[derive(Debug, Default)]
struct VoteTally {
    safe: u32,
    suspicious: u32,
    malicious: u32,
}

impl VoteTally {
    fn add(&mut self, verdict: Verdict, weight: u32) {
        match verdict {
            Verdict::Safe => self.safe += weight,
            Verdict::Suspicious => self.suspicious += weight,
            Verdict::Malicious => self.malicious += weight,
        }
    }

    /// Resolve the tally. The rules are evaluated in strict priority order:
    /// any meaningful malicious weight wins, disagreement or moderate
    /// suspicion stays suspicious, a clear safe majority is safe, and an
    /// inconclusive tally defaults to suspicious. Note that a single safe
    /// source with nothing voting against it is enough for rule 3.
    fn decide(&self) -> Verdict {
        if self.malicious >= 2 {
            Verdict::Malicious
        } else if self.suspicious >= 2 || (self.malicious > 0 && self.safe > 0) {
            Verdict::Suspicious
        } else if self.safe > self.malicious + self.suspicious {
            Verdict::Safe
        } else {
            Verdict::Suspicious
        }
    }
}

/// Merge up to three independently obtained source verdicts for one URL
/// into a single decision with an explanatory trail.
///
/// Pure: no I/O, no logging, no hidden state. Absent sources simply do not
/// vote; with no sources at all the cautious default is Suspicious.
///
/// Weights: the blacklist counts 5 on a known-bad hit (its positive answers
/// are near-certain) but only 1 on a miss (absence from a blacklist proves
/// nothing), the AI counts 2, the local heuristic 1.
pub fn combine_verdicts(
    heuristic: Option<&ScoreResult>,
    blacklist: Option<&BlacklistReply>,
    ai: Option<&AiUrlReply>,
) -> CombinedVerdict {
    let mut tally = VoteTally::default();
    let mut reasons: Vec<String> = Vec::new();
    let mut breakdown = SourceBreakdown::default();

    if let Some(h) = heuristic {
        let reason = format!("Heuristic: {} - {}", h.verdict, h.reasons.join("; "));
        tally.add(h.verdict, 1);
        reasons.push(reason.clone());
        breakdown.heuristic = Some(SourceVerdict {
            source: Source::Heuristic,
            verdict: Some(h.verdict),
            weight: 1,
            reason,
        });
    }

    if let Some(b) = blacklist {
        match b.verdict {
            BlacklistVerdict::Malicious => {
                tally.add(Verdict::Malicious, 5);
                let reason = format!("Blacklist: {}", b.reason);
                reasons.push(reason.clone());
                breakdown.blacklist = Some(SourceVerdict {
                    source: Source::Blacklist,
                    verdict: Some(Verdict::Malicious),
                    weight: 5,
                    reason,
                });
            }
            BlacklistVerdict::Safe => {
                tally.add(Verdict::Safe, 1);
                let reason = format!("Blacklist: {}", b.reason);
                reasons.push(reason.clone());
                breakdown.blacklist = Some(SourceVerdict {
                    source: Source::Blacklist,
                    verdict: Some(Verdict::Safe),
                    weight: 1,
                    reason,
                });
            }
            // An abstaining blacklist neither votes nor appears in the
            // reason trail, but the breakdown still records the answer.
            BlacklistVerdict::Unknown => {
                breakdown.blacklist = Some(SourceVerdict {
                    source: Source::Blacklist,
                    verdict: None,
                    weight: 0,
                    reason: b.reason.clone(),
                });
            }
        }
    }

    if let Some(a) = ai {
        // Normalize the provider's free-form label exactly once, here at
        // the boundary; an unrecognized label falls back to the numeric
        // confidence score.
        let verdict = Verdict::parse_label(&a.verdict)
            .unwrap_or_else(|| Verdict::from_score(a.score.min(100)));
        let reason = format!("AI: {verdict} - {}", a.reason);
        tally.add(verdict, 2);
        reasons.push(reason.clone());
        breakdown.ai = Some(SourceVerdict {
            source: Source::Ai,
            verdict: Some(verdict),
            weight: 2,
            reason,
        });
    }

    let reason = if reasons.is_empty() {
        "insufficient information".to_string()
    } else {
        reasons.join(" | ")
    };

    CombinedVerdict {
        verdict: tally.decide(),
        reason,
        breakdown,
    }
}
