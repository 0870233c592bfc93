// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the oidc_login project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Login with an external identity provider
//!
//! - [`provider`] the identity provider capability and its OpenID Connect
//!   implementation
//! - [`session`] the cookie backed session and pending login state
//! - [`templates`] the HTML pages
//! - [`server`] the Rocket routes tying them together

pub mod error;
pub mod provider;
pub mod server;
pub mod session;
pub mod templates;
