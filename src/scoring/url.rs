use crate::verdict::{ScoreResult, Verdict};
use url::{Host, Url};

/// TLDs that are free or near-free to register and show up in phishing
/// campaigns far out of proportion to legitimate use.
const HIGH_RISK_TLDS: &[&str] = &[
    ".tk", ".ml", ".ga", ".cf", ".gq", ".xyz", ".top", ".club", ".work",
];

/// Keywords that phishing URLs use to look like account or security pages.
const PHISHING_KEYWORDS: &[&str] = &[
    "login",
    "signin",
    "account",
    "verify",
    "secure",
    "update",
    "confirm",
    "banking",
    "paypal",
    "amazon",
    "microsoft",
    "apple",
    "password",
    "suspend",
    "locked",
    "security",
    "validation",
];

/// Common misspellings of well-known brands seen in lookalike domains.
const BRAND_IMPERSONATION: &[&str] = &[
    "paypa1", "paypa-", "paypai", "amaz0n", "amazom", "micros0ft", "g00gle", "gooogle", "appleid",
    "netfiix", "whatsap",
];

/// Score a single URL with additive heuristics. Never fails: input that
/// cannot be parsed gets the fixed fallback score of 50 (Suspicious).
///
/// Signals are evaluated in a fixed order and each triggered signal appends
/// one reason, so identical input always produces an identical result.
/// Host-shape signals (subdomains, hyphens, brand lookalikes, digits) only
/// apply to domain hosts; an IP-literal host is scored by its own signal.
pub fn score_url(url: &str) -> ScoreResult {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => {
            return ScoreResult {
                score: 50,
                verdict: Verdict::Suspicious,
                reasons: vec!["malformed URL".to_string()],
            };
        }
    };

    let mut score: u32 = 0;
    let mut reasons: Vec<String> = Vec::new();

    // The url crate lowercases domain hosts during parsing.
    let domain = match parsed.host() {
        Some(Host::Domain(d)) => Some(d.to_string()),
        _ => None,
    };
    let url_lower = url.to_lowercase();

    // 1. IP address instead of a domain name
    if matches!(parsed.host(), Some(Host::Ipv4(_))) {
        score += 35;
        reasons.push("IP address used instead of a domain name".to_string());
    }

    // 2. Long URLs are often used to hide the real destination
    if url.len() > 100 {
        score += 20;
        reasons.push("excessively long URL".to_string());
    } else if url.len() > 75 {
        score += 10;
        reasons.push("very long URL".to_string());
    }

    // 3. Subdomain stuffing (e.g. secure.login.paypal.fake-site.com)
    if let Some(domain) = &domain {
        let labels = domain.split('.').count();
        if labels > 3 {
            score += 25;
            reasons.push(format!("too many subdomains ({labels} labels)"));
        } else if labels > 2 {
            score += 10;
            reasons.push(format!("multiple subdomains ({labels} labels)"));
        }
    }

    // 4. Hyphen stuffing in the host
    if let Some(domain) = &domain {
        let hyphens = domain.matches('-').count();
        if hyphens > 3 {
            score += 20;
            reasons.push("excessive hyphens in the domain".to_string());
        } else if hyphens > 1 {
            score += 5;
            reasons.push("multiple hyphens in the domain".to_string());
        }
    }

    // 5. Angle brackets never belong in a legitimate URL
    if url.contains('<') || url.contains('>') {
        score += 15;
        reasons.push("suspicious characters in the URL".to_string());
    }

    // 6. High-risk TLD
    if let Some(domain) = &domain {
        if HIGH_RISK_TLDS.iter().any(|tld| domain.ends_with(tld)) {
            score += 25;
            reasons.push("high-risk TLD (free/spam-prone)".to_string());
        }
    }

    // 7. Phishing keywords anywhere in the URL
    let keyword_count = PHISHING_KEYWORDS
        .iter()
        .filter(|kw| url_lower.contains(**kw))
        .count();
    if keyword_count >= 3 {
        score += 30;
        reasons.push(format!("multiple phishing keywords ({keyword_count})"));
    } else if keyword_count == 2 {
        score += 20;
        reasons.push("phishing keywords detected".to_string());
    } else if keyword_count == 1 {
        score += 10;
        reasons.push("phishing keyword detected".to_string());
    }

    // 8. Brand lookalike in the host
    if let Some(domain) = &domain {
        if BRAND_IMPERSONATION.iter().any(|brand| domain.contains(brand)) {
            score += 40;
            reasons.push("possible impersonation of a known brand".to_string());
        }
    }

    // 9. Explicit non-standard port
    if let Some(port) = parsed.port() {
        if port != 80 && port != 443 {
            score += 15;
            reasons.push(format!("non-standard port ({port})"));
        }
    }

    // 10. '@' can hide the real destination host
    if url.contains('@') {
        score += 35;
        reasons.push("'@' character detected (obfuscation technique)".to_string());
    }

    // 11. Digits in the host are unusual for legitimate brands
    if let Some(domain) = &domain {
        if domain.chars().any(|c| c.is_ascii_digit()) {
            score += 8;
            reasons.push("digits in the domain".to_string());
        }
    }

    // 12. Heavy percent-encoding
    if url.matches('%').count() > 3 {
        score += 15;
        reasons.push("suspicious URL encoding".to_string());
    }

    // 13. Anything other than HTTPS
    if parsed.scheme() != "https" {
        score += 10;
        reasons.push("does not use HTTPS".to_string());
    }

    let score = score.min(100) as u8;
    if reasons.is_empty() {
        reasons.push("no obvious signals".to_string());
    }

    ScoreResult {
        score,
        verdict: Verdict::from_score(score),
        reasons,
    }
}
