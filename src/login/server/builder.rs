// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the oidc_login project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Rocket server builder and configuration

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, warn};
use rocket::config::LogLevel;
use rocket::figment::Figment;
use rocket::{routes, Build, Rocket};

use super::handlers::*;
use crate::config::Config;
use crate::login::provider::ProviderRegistry;
use crate::login::templates::Templates;

/// Rocket configuration derived from the application configuration
pub fn figment(config: &Config) -> Figment {
    rocket::Config::figment()
        .merge(("ident", format!("oidc_login/{}", env!("CARGO_PKG_VERSION"))))
        .merge(("address", config.address.clone()))
        .merge(("port", config.port))
        .merge(("secret_key", config.secret_key()))
        .merge(("log_level", LogLevel::Normal))
}

/// Build a configured Rocket server instance
///
/// ### Parameters
///
/// * `figment` - The Rocket configuration, see [`figment`]
/// * `config` - The application configuration
/// * `registry` - The identity providers the login routes delegate to
///
/// ### Errors
///
/// Fails when the page templates cannot be registered.
pub fn build_rocket(
    figment: Figment,
    config: Arc<Config>,
    registry: ProviderRegistry,
) -> Result<Rocket<Build>> {
    let templates = Templates::new().context("Failed to register page templates")?;

    if registry.is_empty() {
        warn!("No identity provider registered, logins will be refused");
    } else {
        debug!("Identity providers: {:?}", registry.names());
    }

    let rocket = rocket::custom(figment)
        .mount(
            "/",
            routes![index, begin_auth, auth_callback, home, logout],
        )
        .manage(config)
        .manage(registry)
        .manage(templates);
    Ok(rocket)
}
