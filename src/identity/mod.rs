use dashmap::DashMap;
use thiserror::Error;

/// Custom error type for identity resolution
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),
}

pub type Result<T> = std::result::Result<T, IdentityError>;

/// Resolves an opaque caller credential to a stable user id.
///
/// Token issuance and expiry mechanics live in the surrounding application;
/// the core only needs the lookup.
pub trait IdentityProvider: Send + Sync {
    fn resolve_user(&self, credential: &str) -> Result<String>;
}

/// In-memory credential map for embedding applications and tests
#[derive(Default)]
pub struct StaticIdentityProvider {
    sessions: DashMap<String, String>,
}

impl StaticIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a credential for a user, returning the previous mapping if
    /// one existed
    pub fn insert_session(&self, credential: &str, user_id: &str) -> Option<String> {
        self.sessions
            .insert(credential.to_string(), user_id.to_string())
    }

    pub fn revoke_session(&self, credential: &str) -> Option<String> {
        self.sessions.remove(credential).map(|(_, user_id)| user_id)
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn resolve_user(&self, credential: &str) -> Result<String> {
        self.sessions
            .get(credential)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                IdentityError::Unauthenticated("Invalid or expired credential".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_registered_credential() {
        let provider = StaticIdentityProvider::new();
        provider.insert_session("token-1", "user-1");

        assert_eq!(provider.resolve_user("token-1").unwrap(), "user-1");
    }

    #[test]
    fn rejects_unknown_and_revoked_credentials() {
        let provider = StaticIdentityProvider::new();
        provider.insert_session("token-1", "user-1");
        provider.revoke_session("token-1");

        assert!(matches!(
            provider.resolve_user("token-1"),
            Err(IdentityError::Unauthenticated(_))
        ));
        assert!(provider.resolve_user("never-issued").is_err());
    }
}
