// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the oidc_login project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! OpenID Connect provider
//!
//! Authorization code flow with PKCE on top of the `openidconnect` crate.
//! Everything protocol related (discovery, JWKS retrieval, ID token signature,
//! issuer, audience, expiry and nonce checks) is performed by the crate; this
//! module only carries the secrets between the two legs of the flow and maps
//! the verified claims to a [`User`].

use async_trait::async_trait;
use log::{debug, info};
use openidconnect::core::{CoreClient, CoreIdTokenClaims, CoreProviderMetadata, CoreResponseType};
use openidconnect::{
    AuthenticationFlow, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointMaybeSet,
    EndpointNotSet, EndpointSet, IssuerUrl, Nonce, PkceCodeChallenge, PkceCodeVerifier,
    RedirectUrl, Scope, TokenResponse,
};

use super::{AuthRedirect, CallbackParams, IdentityProvider, PendingAuth, User};
use crate::config::{Config, OPENID_CONNECT_PROVIDER};
use crate::login::error::AuthError;

/// Client built from a discovery document: authorization endpoint known,
/// token and userinfo endpoints optional.
type DiscoveredClient = CoreClient<
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointMaybeSet,
    EndpointMaybeSet,
>;

pub struct OpenIdConnectProvider {
    name: String,
    client: DiscoveredClient,
    http_client: reqwest::Client,
    scopes: Vec<String>,
}

impl OpenIdConnectProvider {
    /// Fetch the provider metadata and build the client
    ///
    /// Discovery retrieves `<issuer>/.well-known/openid-configuration` and the
    /// JWKS it points to.
    pub async fn discover(config: &Config) -> Result<Self, AuthError> {
        // Provider calls never follow redirects
        let http_client = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|err| AuthError::Configuration(err.to_string()))?;

        let issuer_url = IssuerUrl::new(config.issuer_url())
            .map_err(|err| AuthError::Configuration(format!("invalid issuer URL: {}", err)))?;
        let redirect_url = RedirectUrl::new(config.callback_url.clone())
            .map_err(|err| AuthError::Configuration(format!("invalid callback URL: {}", err)))?;

        let metadata = CoreProviderMetadata::discover_async(issuer_url, &http_client)
            .await
            .map_err(|err| AuthError::Discovery(err.to_string()))?;
        info!(
            "Discovered OpenID Connect provider {}",
            metadata.issuer().as_str()
        );

        let client = CoreClient::from_provider_metadata(
            metadata,
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
        )
        .set_redirect_uri(redirect_url);

        Ok(Self {
            name: OPENID_CONNECT_PROVIDER.to_string(),
            client,
            http_client,
            scopes: config.scopes.clone(),
        })
    }
}

#[async_trait]
impl IdentityProvider for OpenIdConnectProvider {
    async fn begin(&self) -> Result<AuthRedirect, AuthError> {
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let (auth_url, csrf_token, nonce) = self
            .client
            .authorize_url(
                AuthenticationFlow::<CoreResponseType>::AuthorizationCode,
                CsrfToken::new_random,
                Nonce::new_random,
            )
            .add_scopes(self.scopes.iter().cloned().map(Scope::new))
            .set_pkce_challenge(pkce_challenge)
            .url();
        debug!("Authorization URL for {}: {}", self.name, auth_url);

        Ok(AuthRedirect {
            url: auth_url.to_string(),
            pending: PendingAuth {
                state: csrf_token.secret().clone(),
                nonce: nonce.secret().clone(),
                pkce_verifier: pkce_verifier.secret().clone(),
            },
        })
    }

    async fn complete(
        &self,
        pending: Option<PendingAuth>,
        params: CallbackParams,
    ) -> Result<User, AuthError> {
        if let Some(error) = params.error {
            return Err(AuthError::ProviderRejected {
                error,
                description: params.error_description,
            });
        }

        let pending = pending.ok_or(AuthError::MissingPendingAuth)?;
        if params.state.as_deref() != Some(pending.state.as_str()) {
            return Err(AuthError::StateMismatch);
        }
        let code = params.code.ok_or(AuthError::MissingCode)?;

        let token_response = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .map_err(|err| AuthError::Configuration(err.to_string()))?
            .set_pkce_verifier(PkceCodeVerifier::new(pending.pkce_verifier))
            .request_async(&self.http_client)
            .await
            .map_err(|err| AuthError::TokenExchange(err.to_string()))?;

        let id_token = token_response.id_token().ok_or(AuthError::MissingIdToken)?;
        let claims = id_token
            .claims(&self.client.id_token_verifier(), &Nonce::new(pending.nonce))
            .map_err(|err| AuthError::InvalidIdToken(err.to_string()))?;

        let user = user_from_claims(&self.name, claims, id_token.to_string());
        debug!("User {} authenticated by {}", user.user_id, self.name);
        Ok(user)
    }

    async fn logout(&self, user: Option<User>) -> Result<(), AuthError> {
        // Tokens are not stored server side, nothing to revoke
        if let Some(user) = user {
            debug!("User {} logged out from {}", user.user_id, self.name);
        }
        Ok(())
    }
}

fn user_from_claims(provider: &str, claims: &CoreIdTokenClaims, id_token: String) -> User {
    User {
        provider: provider.to_string(),
        user_id: claims.subject().as_str().to_string(),
        email: claims.email().map(|email| email.as_str().to_string()),
        name: claims
            .name()
            .and_then(|name| name.get(None))
            .map(|name| name.as_str().to_string()),
        nick_name: claims
            .preferred_username()
            .map(|username| username.as_str().to_string())
            .or_else(|| {
                claims
                    .nickname()
                    .and_then(|nickname| nickname.get(None))
                    .map(|nickname| nickname.as_str().to_string())
            }),
        id_token,
        expires_at: Some(claims.expiration()),
        raw_data: serde_json::to_value(claims).unwrap_or_default(),
    }
}
