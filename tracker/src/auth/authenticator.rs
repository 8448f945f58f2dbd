use std::sync::Arc;

use async_trait::async_trait;
use tracker_core::{AuthError, Authenticator};

use super::token::TokenService;
use crate::domain::{Account, Store};

/// Verifies the JWT, then loads the account named by its `email` claim.
pub struct AccountAuthenticator {
    tokens: Arc<TokenService>,
    store: Arc<dyn Store>,
}

impl AccountAuthenticator {
    pub fn new(tokens: Arc<TokenService>, store: Arc<dyn Store>) -> Self {
        Self { tokens, store }
    }
}

#[async_trait]
impl Authenticator for AccountAuthenticator {
    type Identity = Account;

    async fn authenticate(&self, token: &str) -> Result<Account, AuthError> {
        let claims = self
            .tokens
            .verify(token)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        match self.store.credentials_by_email(&claims.email) {
            Ok(Some(credentials)) => Ok(credentials.account),
            Ok(None) => Err(AuthError::UnknownIdentity),
            Err(e) => {
                tracing::warn!(error = %e, email = %claims.email, "identity lookup failed");
                Err(AuthError::UnknownIdentity)
            }
        }
    }
}
