//! The signed-in session.
//!
//! A [`Session`] is created once at startup from the token store and passed
//! to whatever needs credentials. Signing in persists the token; signing out
//! forgets it both in memory and on disk.

use crate::api::HttpTaskApi;
use crate::auth::{self, BearerToken};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::traits::TokenStore;

/// Session context holding the current bearer token.
#[derive(Debug)]
pub struct Session<S: TokenStore> {
    store: S,
    token: Option<BearerToken>,
}

impl<S: TokenStore> Session<S> {
    /// Restore the session persisted by a previous run, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the token store cannot be read.
    pub fn restore(store: S) -> Result<Self> {
        let token = store.load()?;
        tracing::debug!(signed_in = token.is_some(), "session restored");
        Ok(Self { store, token })
    }

    /// Adopt a new token and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be persisted; the session is
    /// left unchanged in that case.
    pub fn sign_in(&mut self, token: BearerToken) -> Result<()> {
        self.store.save(&token)?;
        self.token = Some(token);
        tracing::info!("signed in");
        Ok(())
    }

    /// Sign in from the provider's callback URL or a pasted raw token.
    ///
    /// # Errors
    ///
    /// Returns a validation error if no token can be extracted, or an error
    /// if it cannot be persisted.
    pub fn sign_in_from(&mut self, input: &str) -> Result<()> {
        self.sign_in(auth::token_from_input(input)?)
    }

    /// Forget the token in the store and in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted token cannot be removed; the
    /// session stays signed in in that case.
    pub fn sign_out(&mut self) -> Result<()> {
        self.store.clear()?;
        self.token = None;
        tracing::info!("signed out");
        Ok(())
    }

    /// The current token, if signed in.
    #[must_use]
    pub const fn token(&self) -> Option<&BearerToken> {
        self.token.as_ref()
    }

    /// Whether a token is held.
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }

    /// Build an authenticated API client for this session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSignedIn`] without a token, or an error if the
    /// client cannot be built from the config.
    pub fn api(&self, config: &ClientConfig) -> Result<HttpTaskApi> {
        let token = self.token.clone().ok_or(Error::NotSignedIn)?;
        HttpTaskApi::new(config, token)
    }
}
