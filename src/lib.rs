// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the oidc_login project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! OpenID Connect login demo
//!
//! A small web application delegating authentication to an OpenID Connect
//! provider (an Asgardeo organization by default). Users log in through the
//! provider, the identity token is kept in an encrypted session cookie and
//! shown back on a protected page.

pub mod config;
pub mod login;
