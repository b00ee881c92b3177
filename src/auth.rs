//! Bearer tokens and the redirect-based sign-in flow.
//!
//! The identity provider is reached through the API server: the user opens
//! the login URL in a browser and is redirected back with the token in the
//! `token` query parameter. Nothing here inspects the token.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use std::fmt;
use url::Url;

/// Query parameter carrying the token on the redirect back to the client.
pub const TOKEN_QUERY_PARAM: &str = "token";

/// Path of the provider login endpoint, relative to the API base URL.
const LOGIN_PATH: &str = "auth/google";

/// An opaque credential attached to every API call.
///
/// `Debug` never prints the token itself.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wrap a raw token, rejecting blank input.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the token is empty after trimming.
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation("token is empty".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The raw token, for building the `Authorization` header or persisting it.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// The URL the user opens to start signing in.
///
/// # Errors
///
/// Returns an error if the configured API URL is invalid.
pub fn login_url(config: &ClientConfig) -> Result<Url> {
    Ok(config.api_base()?.join(LOGIN_PATH)?)
}

/// Extract the token from the URL the provider redirected back to.
///
/// Returns `None` if the input is not a URL or carries no non-empty token.
#[must_use]
pub fn token_from_callback(callback: &str) -> Option<BearerToken> {
    let url = Url::parse(callback.trim()).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == TOKEN_QUERY_PARAM)
        .and_then(|(_, value)| BearerToken::new(&value).ok())
}

/// Accept either a callback URL or a pasted raw token.
///
/// # Errors
///
/// Returns a validation error if the input is a URL without a token, or blank.
pub fn token_from_input(input: &str) -> Result<BearerToken> {
    if let Some(token) = token_from_callback(input) {
        return Ok(token);
    }
    if Url::parse(input.trim()).is_ok() {
        return Err(Error::Validation(format!(
            "callback URL has no '{TOKEN_QUERY_PARAM}' parameter"
        )));
    }
    BearerToken::new(input)
}
