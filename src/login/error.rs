// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the oidc_login project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use thiserror::Error;

/// Errors of the provider login flow
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No provider registered under the name '{0}'")]
    UnknownProvider(String),

    #[error("Provider rejected the authorization request: {error} ({})", .description.as_deref().unwrap_or("no description"))]
    ProviderRejected {
        error: String,
        description: Option<String>,
    },

    #[error("Callback is missing the authorization code")]
    MissingCode,

    #[error("No pending authorization for this callback")]
    MissingPendingAuth,

    #[error("Callback state does not match the pending authorization")]
    StateMismatch,

    #[error("Provider discovery failed: {0}")]
    Discovery(String),

    #[error("Provider client misconfigured: {0}")]
    Configuration(String),

    #[error("Authorization code exchange failed: {0}")]
    TokenExchange(String),

    #[error("Token response carries no ID token")]
    MissingIdToken,

    #[error("ID token rejected: {0}")]
    InvalidIdToken(String),
}
