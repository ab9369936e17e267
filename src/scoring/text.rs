use crate::scoring::url::score_url;
use crate::verdict::{ScoredUrl, TextScoreResult, Verdict};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref URL_PATTERN: Regex = Regex::new(r"https?://[\w\-./~:?&=#%+\[\]]+").unwrap();
    static ref UPPERCASE_RUN: Regex = Regex::new(r"[A-Z]{5,}").unwrap();
}

/// Urgency and credential-harvesting vocabulary. Each keyword found adds 18
/// points to the text score.
const KEYWORDS_HIGH: &[&str] = &[
    "transferir",
    "verifique",
    "verificar",
    "bloqueada",
    "urgente",
    "inmediatamente",
    "confirmar",
    "credenciales",
    "contraseña",
    "pago",
];

/// Weaker pressure vocabulary, 8 points each.
const KEYWORDS_MEDIUM: &[&str] = &["problema", "alerta", "suscrito", "ganó", "felicitaciones"];

/// Extract embedded scheme-prefixed URLs in first-occurrence order.
/// The iterator is lazy and the function can be called again on the same
/// text to restart the scan.
pub fn extract_urls(text: &str) -> impl Iterator<Item = &str> {
    URL_PATTERN.find_iter(text).map(|m| m.as_str())
}

/// Score free text for phishing indicators. Never fails.
///
/// Keyword hits contribute points without a reason entry; embedded URLs and
/// the style signals (shouting, exclamation marks) each add one reason.
pub fn score_text(text: &str) -> TextScoreResult {
    let mut score: f64 = 0.0;
    let mut reasons: Vec<String> = Vec::new();

    let text_lower = text.to_lowercase();
    let high_hits = KEYWORDS_HIGH
        .iter()
        .filter(|kw| text_lower.contains(**kw))
        .count();
    let medium_hits = KEYWORDS_MEDIUM
        .iter()
        .filter(|kw| text_lower.contains(**kw))
        .count();
    score += high_hits as f64 * 18.0;
    score += medium_hits as f64 * 8.0;

    let mut url_results: Vec<ScoredUrl> = Vec::new();
    for url in extract_urls(text) {
        let result = score_url(url);
        score += result.score as f64 * 0.6;
        reasons.push(format!("URL detected: {url} ({})", result.verdict));
        url_results.push(ScoredUrl {
            url: url.to_string(),
            result,
        });
    }

    if UPPERCASE_RUN.is_match(text) {
        score += 8.0;
        reasons.push("all-caps text (alarmist tone)".to_string());
    }

    if text.matches('!').count() >= 2 {
        score += 6.0;
        reasons.push("excessive exclamation marks".to_string());
    }

    let score = score.clamp(0.0, 100.0) as u8;

    TextScoreResult {
        score,
        verdict: Verdict::from_text_score(score),
        reasons,
        url_results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_high_keywords() {
        let result = score_text("urgente: debe verificar su contraseña");
        assert_eq!(result.score, 54);
        assert_eq!(result.verdict, Verdict::Suspicious);
        assert!(result.url_results.is_empty());
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn test_empty_text_is_safe() {
        let result = score_text("");
        assert_eq!(result.score, 0);
        assert_eq!(result.verdict, Verdict::Safe);
    }

    #[test]
    fn test_benign_text_is_safe() {
        let result = score_text("nos vemos mañana en la reunión de equipo");
        assert_eq!(result.score, 0);
        assert_eq!(result.verdict, Verdict::Safe);
    }

    #[test]
    fn test_embedded_url_contributes_scaled_score() {
        // The embedded URL scores 65 (Malicious); 0.6 * 65 = 39.
        let result = score_text("visita http://192.168.0.1/login/verify ahora");
        assert_eq!(result.score, 39);
        assert_eq!(result.verdict, Verdict::Suspicious);
        assert_eq!(result.url_results.len(), 1);
        assert_eq!(result.url_results[0].url, "http://192.168.0.1/login/verify");
        assert_eq!(result.url_results[0].result.score, 65);
        assert_eq!(
            result.reasons,
            vec!["URL detected: http://192.168.0.1/login/verify (Malicious)".to_string()]
        );
    }

    #[test]
    fn test_keywords_and_style_signals_reach_phishing() {
        // Five high keywords (90) + all-caps run (8) + exclamations (6),
        // clamped to 100.
        let result =
            score_text("URGENTE!! verifique su contraseña bloqueada inmediatamente");
        assert_eq!(result.score, 100);
        assert_eq!(result.verdict, Verdict::Malicious);
        assert_eq!(result.verdict.text_label(), "Phishing");
        assert_eq!(
            result.reasons,
            vec![
                "all-caps text (alarmist tone)".to_string(),
                "excessive exclamation marks".to_string(),
            ]
        );
    }

    #[test]
    fn test_extract_urls_in_order() {
        let text = "primero http://a.example.com/x luego https://b.example.org/y fin";
        let urls: Vec<&str> = extract_urls(text).collect();
        assert_eq!(
            urls,
            vec!["http://a.example.com/x", "https://b.example.org/y"]
        );
    }

    #[test]
    fn test_extract_urls_is_restartable() {
        let text = "ver https://example.com/login";
        let first: Vec<&str> = extract_urls(text).collect();
        let second: Vec<&str> = extract_urls(text).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_extract_urls_ignores_schemeless_hosts() {
        let urls: Vec<&str> = extract_urls("visita example.com o www.example.org").collect();
        assert!(urls.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let text = "ALERTA! su pago fue bloqueado: http://pagos-seguros.xyz/verify !";
        assert_eq!(score_text(text), score_text(text));
    }
}
