// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the oidc_login project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration module
//!
//! The login server is configured entirely from the process environment.
//! [`Config::from_env`] reads the variables once at startup; the resulting
//! struct is then shared read-only (behind an `Arc`) with the provider
//! registration code and the Rocket handlers.
//!
//! | Variable                 | Field                   | Default                                              |
//! |--------------------------|-------------------------|------------------------------------------------------|
//! | `OPENID_CONNECT_KEY`     | `client_id`             | empty                                                |
//! | `OPENID_CONNECT_SECRET`  | `client_secret`         | empty                                                |
//! | `ASGARDEO_ORG_NAME`      | `org_name`              | empty                                                |
//! | `OPENID_CONNECT_ISSUER`  | `issuer_override`       | derived from `org_name`                              |
//! | `OPENID_CONNECT_SCOPES`  | `scopes`                | none (only `openid`)                                 |
//! | `CALLBACK_URL`           | `callback_url`          | `http://localhost:<port>/auth/openid-connect/callback` |
//! | `SESSION_SECRET`         | `session_secret`        | random key generated at startup                      |
//! | `LISTEN_ADDRESS`         | `address`               | `0.0.0.0`                                            |
//! | `LISTEN_PORT`            | `port`                  | `8000`                                               |

use base64::Engine;
use log::warn;
use thiserror::Error;

/// Name under which the OpenID Connect provider is registered and routed
/// (`/auth/openid-connect`, `/logout/openid-connect`).
pub const OPENID_CONNECT_PROVIDER: &str = "openid-connect";

/// Decoded lengths Rocket accepts for its `secret_key` (256 or 512 bits).
const SESSION_SECRET_LENGTHS: [usize; 2] = [32, 64];

/// Errors raised while reading the configuration from the environment
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {variable}: {reason}")]
    InvalidValue { variable: String, reason: String },

    #[error("SESSION_SECRET must be base64 encoded: {reason}")]
    SessionSecretEncoding { reason: String },

    #[error("SESSION_SECRET must decode to 32 or 64 bytes, got {len}")]
    SessionSecretLength { len: usize },
}

/// Runtime configuration of the login server.
#[derive(Debug, Clone)]
pub struct Config {
    /// OAuth client identifier registered at the identity provider.
    pub client_id: String,

    /// OAuth client secret registered at the identity provider.
    pub client_secret: String,

    /// Asgardeo organization (tenant) name.
    ///
    /// Used to build the issuer URL and displayed on the home page.
    pub org_name: String,

    /// Explicit issuer URL, replacing the one derived from `org_name`.
    pub issuer_override: Option<String>,

    /// Scopes requested in addition to `openid`.
    pub scopes: Vec<String>,

    /// Redirect URI the provider sends the browser back to.
    pub callback_url: String,

    /// Base64 encoded key used to encrypt and sign the cookies.
    pub session_secret: Option<String>,

    /// The network address the server will bind to.
    pub address: String,

    /// The TCP port the server will listen on.
    pub port: u16,
}

fn default_callback_url(port: u16) -> String {
    format!(
        "http://localhost:{}/auth/{}/callback",
        port, OPENID_CONNECT_PROVIDER
    )
}

fn default_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            org_name: String::new(),
            issuer_override: None,
            scopes: Vec::new(),
            callback_url: default_callback_url(default_port()),
            session_secret: None,
            address: default_address(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration through an arbitrary variable lookup
    ///
    /// Empty values are treated as unset. Missing provider credentials are
    /// not an error: the server still starts and serves its landing page,
    /// but no provider can be registered.
    ///
    /// ### Errors
    ///
    /// * [`ConfigError::InvalidValue`] if `LISTEN_PORT` is not a port number
    /// * [`ConfigError::SessionSecretEncoding`] / [`ConfigError::SessionSecretLength`]
    ///   if `SESSION_SECRET` is not a usable key
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Config::default();

        let port = match get("LISTEN_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|err| ConfigError::InvalidValue {
                    variable: "LISTEN_PORT".to_string(),
                    reason: err.to_string(),
                })?,
            None => defaults.port,
        };

        let session_secret = get("SESSION_SECRET").map(|secret| secret.trim().to_string());
        if let Some(secret) = &session_secret {
            validate_session_secret(secret)?;
        }

        let config = Config {
            client_id: get("OPENID_CONNECT_KEY").unwrap_or_default(),
            client_secret: get("OPENID_CONNECT_SECRET").unwrap_or_default(),
            org_name: get("ASGARDEO_ORG_NAME").unwrap_or_default(),
            issuer_override: get("OPENID_CONNECT_ISSUER"),
            scopes: get("OPENID_CONNECT_SCOPES")
                .map(|scopes| scopes.split_whitespace().map(String::from).collect())
                .unwrap_or_default(),
            callback_url: get("CALLBACK_URL").unwrap_or_else(|| default_callback_url(port)),
            session_secret,
            address: get("LISTEN_ADDRESS").unwrap_or(defaults.address),
            port,
        };

        if config.client_id.is_empty() || config.client_secret.is_empty() {
            warn!("OPENID_CONNECT_KEY or OPENID_CONNECT_SECRET is not set");
        }
        if config.org_name.is_empty() && config.issuer_override.is_none() {
            warn!("ASGARDEO_ORG_NAME is not set and no OPENID_CONNECT_ISSUER override given");
        }

        Ok(config)
    }

    /// Issuer URL of the identity provider
    ///
    /// Must match the `issuer` of the discovery document byte for byte.
    ///
    /// The discovery document is served under
    /// `<issuer>/.well-known/openid-configuration`.
    pub fn issuer_url(&self) -> String {
        match &self.issuer_override {
            Some(issuer) => issuer.clone(),
            None => format!("https://api.asgardeo.io/t/{}/oauth2/token", self.org_name),
        }
    }

    /// URL of the provider's discovery document
    pub fn discovery_url(&self) -> String {
        format!(
            "{}/.well-known/openid-configuration",
            self.issuer_url().trim_end_matches('/')
        )
    }

    /// Cookie key handed to Rocket as `secret_key`
    ///
    /// Without a configured `SESSION_SECRET` a random key is generated, so
    /// sessions do not survive a restart.
    pub fn secret_key(&self) -> String {
        match &self.session_secret {
            Some(secret) => secret.clone(),
            None => {
                warn!("SESSION_SECRET is not set, generating a random cookie key");
                generate_session_secret()
            }
        }
    }
}

fn validate_session_secret(secret: &str) -> Result<(), ConfigError> {
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(secret.trim())
        .map_err(|err| ConfigError::SessionSecretEncoding {
            reason: err.to_string(),
        })?;
    if !SESSION_SECRET_LENGTHS.contains(&decoded.len()) {
        return Err(ConfigError::SessionSecretLength { len: decoded.len() });
    }
    Ok(())
}

/// Generate a random session secret key for cookie-based sessions.
fn generate_session_secret() -> String {
    use rand::Rng;
    let mut rng = rand::rng();
    let secret: [u8; 32] = rng.random();
    base64::engine::general_purpose::STANDARD.encode(secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.address, "0.0.0.0");
        assert_eq!(
            config.callback_url,
            "http://localhost:8000/auth/openid-connect/callback"
        );
        assert!(config.scopes.is_empty());
        assert!(config.session_secret.is_none());
    }

    #[test]
    fn test_reads_provider_credentials() {
        let config = Config::from_lookup(lookup_from(&[
            ("OPENID_CONNECT_KEY", "client-id"),
            ("OPENID_CONNECT_SECRET", "client-secret"),
            ("ASGARDEO_ORG_NAME", "acme"),
            ("OPENID_CONNECT_SCOPES", "profile  email"),
        ]))
        .unwrap();

        assert_eq!(config.client_id, "client-id");
        assert_eq!(config.client_secret, "client-secret");
        assert_eq!(config.org_name, "acme");
        assert_eq!(config.scopes, vec!["profile", "email"]);
    }

    #[test]
    fn test_issuer_and_discovery_url_derived_from_org() {
        let config = Config {
            org_name: "acme".to_string(),
            ..Config::default()
        };
        assert_eq!(
            config.issuer_url(),
            "https://api.asgardeo.io/t/acme/oauth2/token"
        );
        assert_eq!(
            config.discovery_url(),
            "https://api.asgardeo.io/t/acme/oauth2/token/.well-known/openid-configuration"
        );
    }

    #[test]
    fn test_issuer_override_wins() {
        let config = Config::from_lookup(lookup_from(&[
            ("ASGARDEO_ORG_NAME", "acme"),
            ("OPENID_CONNECT_ISSUER", "https://idp.example.com/"),
        ]))
        .unwrap();
        assert_eq!(config.issuer_url(), "https://idp.example.com/");
        assert_eq!(
            config.discovery_url(),
            "https://idp.example.com/.well-known/openid-configuration"
        );
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config =
            Config::from_lookup(lookup_from(&[("LISTEN_PORT", ""), ("CALLBACK_URL", "  ")]))
                .unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.callback_url, default_callback_url(8000));
    }

    #[test]
    fn test_default_callback_follows_listen_port() {
        let config = Config::from_lookup(lookup_from(&[("LISTEN_PORT", "9000")])).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(
            config.callback_url,
            "http://localhost:9000/auth/openid-connect/callback"
        );

        let config = Config::from_lookup(lookup_from(&[
            ("LISTEN_PORT", "9000"),
            ("CALLBACK_URL", "https://login.example.com/auth/openid-connect/callback"),
        ]))
        .unwrap();
        assert_eq!(
            config.callback_url,
            "https://login.example.com/auth/openid-connect/callback"
        );
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("LISTEN_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref variable, .. } if variable == "LISTEN_PORT"));
    }

    #[test]
    fn test_session_secret_validation() {
        let short = base64::engine::general_purpose::STANDARD.encode([7u8; 16]);
        let err = Config::from_lookup(lookup_from(&[("SESSION_SECRET", short.as_str())]))
            .unwrap_err();
        assert_eq!(err, ConfigError::SessionSecretLength { len: 16 });

        let odd = base64::engine::general_purpose::STANDARD.encode([7u8; 48]);
        let err =
            Config::from_lookup(lookup_from(&[("SESSION_SECRET", odd.as_str())])).unwrap_err();
        assert_eq!(err, ConfigError::SessionSecretLength { len: 48 });

        let key = base64::engine::general_purpose::STANDARD.encode([7u8; 64]);
        let padded = format!(" {} ", key);
        let config =
            Config::from_lookup(lookup_from(&[("SESSION_SECRET", padded.as_str())])).unwrap();
        assert_eq!(config.session_secret, Some(key));

        let err = Config::from_lookup(lookup_from(&[("SESSION_SECRET", "%%%")])).unwrap_err();
        assert!(matches!(err, ConfigError::SessionSecretEncoding { .. }));
    }

    #[test]
    fn test_generated_secret_is_usable() {
        let config = Config::default();
        let secret = config.secret_key();
        assert!(validate_session_secret(&secret).is_ok());
        // A fresh key on each call
        assert_ne!(secret, config.secret_key());
    }
}
