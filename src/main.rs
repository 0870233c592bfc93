// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the oidc_login project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Main entry point for the OpenID Connect login demo
use std::sync::Arc;

use anyhow::Result;
use env_logger::Env;
use log::info;

use oidc_login::config::Config;
use oidc_login::login::provider::register_providers;
use oidc_login::login::server::{build_rocket, figment};

#[rocket::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Arc::new(Config::from_env()?);
    let registry = register_providers(&config).await;
    let figment = figment(&config);

    info!("Listening on {}:{}", config.address, config.port);
    build_rocket(figment, config, registry)?.launch().await?;
    Ok(())
}
