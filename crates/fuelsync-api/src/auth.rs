use secrecy::SecretString;

/// Source of the bearer token attached to every request attempt.
///
/// The client asks on every attempt and never caches the answer, so a
/// provider backed by a session store picks up rotated tokens immediately.
/// Returning `None` sends the request without an `Authorization` header.
pub trait TokenProvider: Send + Sync {
    fn bearer_token(&self) -> Option<SecretString>;
}

/// A fixed token, or no token at all.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<SecretString>);

impl StaticToken {
    pub fn new(token: SecretString) -> Self {
        Self(Some(token))
    }

    /// Provider that never supplies a token.
    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl TokenProvider for StaticToken {
    fn bearer_token(&self) -> Option<SecretString> {
        self.0.clone()
    }
}
