use crate::config::BlocklistConfig;
use crate::providers::{BlacklistProvider, BlacklistReply, BlacklistVerdict, ProviderError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use url::Url;

/// Local reputation source backed by a list of known-bad domains and host
/// patterns. A listed domain also covers its subdomains.
pub struct DomainBlocklist {
    domains: Vec<String>,
    patterns: Vec<Regex>,
}

impl DomainBlocklist {
    pub fn new(config: &BlocklistConfig) -> Result<Self> {
        let mut domains: Vec<String> = config
            .domains
            .iter()
            .map(|d| d.trim().to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();

        if let Some(path) = &config.file {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read blocklist file: {path}"))?;
            for line in content.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                domains.push(line.to_lowercase());
            }
        }

        let patterns = config
            .host_patterns
            .iter()
            .map(|p| {
                Regex::new(p).with_context(|| format!("Invalid blocklist host pattern: {p}"))
            })
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "Loaded domain blocklist: {} domains, {} patterns",
            domains.len(),
            patterns.len()
        );

        Ok(Self { domains, patterns })
    }

    /// Look up a URL's host against the list. No host to extract means the
    /// list cannot answer at all, which is an `Unknown`, not a `Safe`.
    pub fn lookup(&self, url: &str) -> BlacklistReply {
        let host = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_lowercase()));

        let host = match host {
            Some(host) => host,
            None => {
                return BlacklistReply {
                    verdict: BlacklistVerdict::Unknown,
                    reason: "no host to look up".to_string(),
                };
            }
        };

        for domain in &self.domains {
            if host == *domain || host.ends_with(&format!(".{domain}")) {
                return BlacklistReply {
                    verdict: BlacklistVerdict::Malicious,
                    reason: format!("host matches blocklisted domain {domain}"),
                };
            }
        }

        for pattern in &self.patterns {
            if pattern.is_match(&host) {
                return BlacklistReply {
                    verdict: BlacklistVerdict::Malicious,
                    reason: format!("host matches blocklist pattern {pattern}"),
                };
            }
        }

        // A miss only means the host is not on this list.
        BlacklistReply {
            verdict: BlacklistVerdict::Safe,
            reason: "not found on local blocklist (absence is not a safety guarantee)".to_string(),
        }
    }
}

#[async_trait]
impl BlacklistProvider for DomainBlocklist {
    async fn check(&self, url: &str) -> Result<BlacklistReply, ProviderError> {
        Ok(self.lookup(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocklist() -> DomainBlocklist {
        DomainBlocklist::new(&BlocklistConfig {
            domains: vec!["evil.example".to_string(), "phish.test".to_string()],
            host_patterns: vec![r"^paypal-.*\.com$".to_string()],
            file: None,
        })
        .unwrap()
    }

    #[test]
    fn test_listed_domain_is_malicious() {
        let reply = blocklist().lookup("https://evil.example/login");
        assert_eq!(reply.verdict, BlacklistVerdict::Malicious);
        assert!(reply.reason.contains("evil.example"));
    }

    #[test]
    fn test_subdomain_of_listed_domain_is_malicious() {
        let reply = blocklist().lookup("https://secure.evil.example/");
        assert_eq!(reply.verdict, BlacklistVerdict::Malicious);
    }

    #[test]
    fn test_pattern_match_is_malicious() {
        let reply = blocklist().lookup("https://paypal-verify.com/");
        assert_eq!(reply.verdict, BlacklistVerdict::Malicious);
    }

    #[test]
    fn test_unlisted_host_is_weakly_safe() {
        let reply = blocklist().lookup("https://example.com/");
        assert_eq!(reply.verdict, BlacklistVerdict::Safe);
        assert!(reply.reason.contains("not found"));
    }

    #[test]
    fn test_suffix_overlap_is_not_a_match() {
        // "notevil.example" must not match the "evil.example" entry.
        let reply = blocklist().lookup("https://notevil.example/");
        assert_eq!(reply.verdict, BlacklistVerdict::Safe);
    }

    #[test]
    fn test_hostless_input_is_unknown() {
        let reply = blocklist().lookup("not a url");
        assert_eq!(reply.verdict, BlacklistVerdict::Unknown);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let result = DomainBlocklist::new(&BlocklistConfig {
            domains: vec![],
            host_patterns: vec!["[invalid".to_string()],
            file: None,
        });
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_provider_trait_check() {
        let reply = blocklist().check("https://phish.test/").await.unwrap();
        assert_eq!(reply.verdict, BlacklistVerdict::Malicious);
    }
}
