// Token authentication
//
// `POST /auth/login` exchanges a username/password for a bearer token.
// Storing the token (and attaching it to requests) is the caller's job;
// see `ApiClient::set_auth_token`.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::TokenResponse;

/// Username/password pair for `POST /auth/login`.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    pub username: String,
    pub password: SecretString,
}

impl LoginCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

impl ApiClient {
    /// Authenticate with the backend.
    ///
    /// Returns the token response untouched: the client does NOT start using
    /// the token on its own.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<TokenResponse, Error> {
        debug!(username = %credentials.username, "logging in");

        let body = json!({
            "username": credentials.username,
            "password": credentials.password.expose_secret(),
        });

        let token: TokenResponse = self.post("/auth/login", Some(&body)).await?;
        debug!(token_type = %token.token_type, "login successful");
        Ok(token)
    }
}
