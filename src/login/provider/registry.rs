// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the oidc_login project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use super::IdentityProvider;

/// Providers available to the login routes, keyed by route name
///
/// Filled once at startup, then only read.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn IdentityProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provider` under `name`, replacing any previous one
    pub fn register(&mut self, name: &str, provider: Arc<dyn IdentityProvider>) {
        debug!("Registering identity provider '{}'", name);
        self.providers.insert(name.to_string(), provider);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn IdentityProvider>> {
        self.providers.get(name).cloned()
    }

    /// Registered provider names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::login::error::AuthError;
    use crate::login::provider::{AuthRedirect, CallbackParams, PendingAuth, User};
    use async_trait::async_trait;

    struct NamedProvider(&'static str);

    #[async_trait]
    impl IdentityProvider for NamedProvider {
        async fn begin(&self) -> Result<AuthRedirect, AuthError> {
            Ok(AuthRedirect {
                url: format!("https://{}.example.com/authorize", self.0),
                pending: PendingAuth {
                    state: "state".to_string(),
                    nonce: "nonce".to_string(),
                    pkce_verifier: "verifier".to_string(),
                },
            })
        }

        async fn complete(
            &self,
            _pending: Option<PendingAuth>,
            _params: CallbackParams,
        ) -> Result<User, AuthError> {
            Err(AuthError::MissingCode)
        }

        async fn logout(&self, _user: Option<User>) -> Result<(), AuthError> {
            Ok(())
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = ProviderRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("openid-connect").is_none());
    }

    #[rocket::async_test]
    async fn test_lookup_by_name() {
        let mut registry = ProviderRegistry::new();
        registry.register("beta", Arc::new(NamedProvider("beta")));
        registry.register("alpha", Arc::new(NamedProvider("alpha")));

        assert_eq!(registry.names(), vec!["alpha", "beta"]);
        assert!(registry.get("gamma").is_none());

        let redirect = registry.get("alpha").unwrap().begin().await.unwrap();
        assert_eq!(redirect.url, "https://alpha.example.com/authorize");
    }

    #[rocket::async_test]
    async fn test_register_replaces_existing() {
        let mut registry = ProviderRegistry::new();
        registry.register("idp", Arc::new(NamedProvider("first")));
        registry.register("idp", Arc::new(NamedProvider("second")));

        assert_eq!(registry.names(), vec!["idp"]);
        let redirect = registry.get("idp").unwrap().begin().await.unwrap();
        assert!(redirect.url.contains("second"));
    }
}
