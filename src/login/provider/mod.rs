// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the oidc_login project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Identity providers
//!
//! An identity provider is the capability the login routes delegate the
//! whole protocol to. The routes only know the [`IdentityProvider`] trait:
//!
//! - [`IdentityProvider::begin`] produces the URL the browser is redirected
//!   to, plus the [`PendingAuth`] secrets that must come back with the callback
//! - [`IdentityProvider::complete`] turns the callback query into a [`User`]
//! - [`IdentityProvider::logout`] ends the provider side of the session
//!
//! Providers are looked up by name in a [`ProviderRegistry`] built once at
//! startup by [`register_providers`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{error, info};
use rocket::form::FromForm;
use serde::{Deserialize, Serialize};

use crate::config::{Config, OPENID_CONNECT_PROVIDER};
use crate::login::error::AuthError;

mod openid_connect;
mod registry;

pub use openid_connect::OpenIdConnectProvider;
pub use registry::ProviderRegistry;

/// Identity of a user as reported by a provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Name of the provider that authenticated the user
    pub provider: String,
    /// Subject identifier at the provider
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub nick_name: Option<String>,
    /// Raw (encoded) identity token
    pub id_token: String,
    /// Expiry of the identity token
    pub expires_at: Option<DateTime<Utc>>,
    /// Full provider payload. Never serialized, so it never reaches a cookie.
    #[serde(skip)]
    pub raw_data: serde_json::Value,
}

/// Secrets generated when a login starts and checked when it completes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAuth {
    /// CSRF token echoed back by the provider as `state`
    pub state: String,
    pub nonce: String,
    pub pkce_verifier: String,
}

/// Where to send the browser to start a login
#[derive(Debug, Clone)]
pub struct AuthRedirect {
    pub url: String,
    pub pending: PendingAuth,
}

/// Query parameters of the provider callback
#[derive(FromForm, Debug, Clone, Default)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Capability offered by an identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Start a login
    async fn begin(&self) -> Result<AuthRedirect, AuthError>;

    /// Finish a login from the callback parameters
    ///
    /// `pending` is what [`IdentityProvider::begin`] produced for this
    /// browser, if anything was stored.
    async fn complete(
        &self,
        pending: Option<PendingAuth>,
        params: CallbackParams,
    ) -> Result<User, AuthError>;

    /// End the provider side of a session
    async fn logout(&self, user: Option<User>) -> Result<(), AuthError>;
}

/// Build the registry of available providers
///
/// The OpenID Connect provider needs its discovery document. When discovery
/// fails the error is logged and the provider is left out: the server still
/// runs, and logins answer with an error instead of taking the process down.
pub async fn register_providers(config: &Config) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();

    info!("Discovering OpenID Connect provider at {}", config.discovery_url());
    match OpenIdConnectProvider::discover(config).await {
        Ok(provider) => {
            registry.register(OPENID_CONNECT_PROVIDER, Arc::new(provider));
        }
        Err(err) => {
            error!("OpenID Connect provider not registered: {}", err);
        }
    }

    registry
}
