// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the oidc_login project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Route handlers of the login demo
//!
//! The handlers never expose error details: failures are logged and answered
//! with a bare status code or a redirect.

use std::sync::Arc;

use log::{debug, error, info, warn};
use rocket::http::{CookieJar, Status};
use rocket::response::content::RawHtml;
use rocket::response::Redirect;
use rocket::{get, uri, Responder, State};

use crate::config::Config;
use crate::login::error::AuthError;
use crate::login::provider::{CallbackParams, ProviderRegistry};
use crate::login::session::{self, SessionUser};
use crate::login::templates::Templates;

/// Response of the pages that may send the browser elsewhere
#[derive(Responder)]
pub enum PageResponse {
    Page(RawHtml<String>),
    Redirect(Redirect),
    Failure(Status),
}

/// Landing page
///
/// # URL
///
/// `GET /`
#[get("/")]
pub fn index(templates: &State<Templates>) -> Result<RawHtml<String>, Status> {
    templates.render_index().map(RawHtml).map_err(|err| {
        error!("Failed to render landing page: {}", err);
        Status::InternalServerError
    })
}

/// Start a login with `provider`
///
/// Stores the pending authorization secrets in their cookie and redirects
/// (307) the browser to the provider's authorization endpoint.
///
/// # URL
///
/// `GET /auth/<provider>`
///
/// # Returns
///
/// - `307 Temporary Redirect` to the provider
/// - `400 Bad Request` for an unknown provider or when the login cannot start
#[get("/auth/<provider>")]
pub async fn begin_auth(
    provider: &str,
    registry: &State<ProviderRegistry>,
    cookies: &CookieJar<'_>,
) -> Result<Redirect, Status> {
    let Some(identity_provider) = registry.get(provider) else {
        warn!("{}", AuthError::UnknownProvider(provider.to_string()));
        return Err(Status::BadRequest);
    };

    let redirect = identity_provider.begin().await.map_err(|err| {
        error!("Cannot start login with {}: {}", provider, err);
        Status::BadRequest
    })?;

    session::store_pending(cookies, provider, &redirect.pending).map_err(|err| {
        error!("Cannot store pending login for {}: {}", provider, err);
        Status::InternalServerError
    })?;

    debug!("Redirecting to {} for login", provider);
    Ok(Redirect::temporary(redirect.url))
}

/// Provider callback
///
/// Completes the login, stores the user in the session cookie and redirects
/// (302) to `/home`.
///
/// # URL
///
/// `GET /auth/<provider>/callback?code=...&state=...`
///
/// # Returns
///
/// - `302 Found` to `/home` once the session is stored
/// - `500 Internal Server Error` when the login cannot be completed
#[get("/auth/<provider>/callback?<params..>")]
pub async fn auth_callback(
    provider: &str,
    params: CallbackParams,
    registry: &State<ProviderRegistry>,
    cookies: &CookieJar<'_>,
) -> Result<Redirect, Status> {
    let pending = session::take_pending(cookies, provider);

    let result = match registry.get(provider) {
        Some(identity_provider) => identity_provider.complete(pending, params).await,
        None => Err(AuthError::UnknownProvider(provider.to_string())),
    };
    let user = result.map_err(|err| {
        error!("Login callback for {} failed: {}", provider, err);
        Status::InternalServerError
    })?;

    let record = session::store_user(cookies, user).map_err(|err| {
        error!("Problem saving session data: {}", err);
        Status::InternalServerError
    })?;
    info!("User {} logged in with {}", record.user.user_id, provider);

    Ok(Redirect::found(uri!("/home")))
}

/// Page of the logged in user
///
/// # URL
///
/// `GET /home`
///
/// # Returns
///
/// - `200 OK` with the organization and the identity token
/// - `307 Temporary Redirect` to `/` without a valid session
#[get("/home")]
pub fn home(
    session: Option<SessionUser>,
    config: &State<Arc<Config>>,
    templates: &State<Templates>,
) -> PageResponse {
    let Some(SessionUser(record)) = session else {
        debug!("No valid session, redirecting to the landing page");
        return PageResponse::Redirect(Redirect::temporary(uri!("/")));
    };

    match templates.render_home(&config.org_name, &record.user) {
        Ok(html) => PageResponse::Page(RawHtml(html)),
        Err(err) => {
            error!("Failed to render home page: {}", err);
            PageResponse::Failure(Status::InternalServerError)
        }
    }
}

/// Log out
///
/// Provider logout is best effort: its failures are logged only. The session
/// and any pending login are cleared in every case.
///
/// # URL
///
/// `GET /logout/<provider>`
///
/// # Returns
///
/// `307 Temporary Redirect` to `/`
#[get("/logout/<provider>")]
pub async fn logout(
    provider: &str,
    session: Option<SessionUser>,
    registry: &State<ProviderRegistry>,
    cookies: &CookieJar<'_>,
) -> Redirect {
    let user = session.map(|SessionUser(record)| record.user);

    match registry.get(provider) {
        Some(identity_provider) => {
            if let Err(err) = identity_provider.logout(user).await {
                warn!("Logout fail for {}: {}", provider, err);
            }
        }
        None => warn!("{}", AuthError::UnknownProvider(provider.to_string())),
    }

    session::clear_user(cookies);
    session::clear_pending(cookies);
    Redirect::temporary(uri!("/"))
}
