use std::collections::HashMap;

/// Resolves an opaque token to a username. `None` means the token is
/// invalid. Token issuance and session handling are the embedding
/// application's problem; the core only needs to attribute history entries.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Option<String>;
}

/// Token table from configuration. Accepts tokens with or without the
/// conventional "Bearer " prefix.
pub struct StaticTokenVerifier {
    tokens: HashMap<String, String>,
}

impl StaticTokenVerifier {
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }
}

impl TokenVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> Option<String> {
        let token = token.trim();
        let token = token
            .strip_prefix("Bearer ")
            .or_else(|| token.strip_prefix("bearer "))
            .unwrap_or(token)
            .trim();

        if token.is_empty() {
            return None;
        }

        self.tokens.get(token).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> StaticTokenVerifier {
        let mut tokens = HashMap::new();
        tokens.insert("tok-alice".to_string(), "alice".to_string());
        StaticTokenVerifier::new(tokens)
    }

    #[test]
    fn test_known_token_resolves() {
        assert_eq!(verifier().verify("tok-alice"), Some("alice".to_string()));
    }

    #[test]
    fn test_bearer_prefix_is_stripped() {
        assert_eq!(
            verifier().verify("Bearer tok-alice"),
            Some("alice".to_string())
        );
    }

    #[test]
    fn test_unknown_token_is_invalid() {
        assert_eq!(verifier().verify("tok-mallory"), None);
    }

    #[test]
    fn test_empty_token_is_invalid() {
        assert_eq!(verifier().verify(""), None);
        assert_eq!(verifier().verify("Bearer "), None);
    }
}
