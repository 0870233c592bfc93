// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the oidc_login project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Web server for the login demo
//!
//! A Rocket instance exposing five routes:
//!
//! | Route                            | Handler                      |
//! |----------------------------------|------------------------------|
//! | `GET /`                          | [`handlers::index`]          |
//! | `GET /auth/<provider>`           | [`handlers::begin_auth`]     |
//! | `GET /auth/<provider>/callback`  | [`handlers::auth_callback`]  |
//! | `GET /home`                      | [`handlers::home`]           |
//! | `GET /logout/<provider>`         | [`handlers::logout`]         |
//!
//! The configuration, the provider registry and the templates are managed
//! state, built once before launch and only read afterwards.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use oidc_login::config::Config;
//! use oidc_login::login::provider::register_providers;
//! use oidc_login::login::server;
//!
//! async fn start_server() -> anyhow::Result<()> {
//!     let config = Arc::new(Config::from_env()?);
//!     let registry = register_providers(&config).await;
//!     let figment = server::figment(&config);
//!     server::build_rocket(figment, config, registry)?.launch().await?;
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod handlers;

pub use self::builder::{build_rocket, figment};
