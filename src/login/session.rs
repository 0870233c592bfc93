// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the oidc_login project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Cookie backed sessions
//!
//! The server keeps no session state. Everything lives in two Rocket private
//! cookies, encrypted and authenticated with the `secret_key`:
//!
//! - `auth` holds the [`SessionRecord`] of the logged in user (one hour)
//! - `auth_pending` holds the [`PendingAuth`] secrets between the redirect to
//!   the provider and its callback (ten minutes)
//!
//! Both are HTTP-only, scoped to `/`, and `SameSite=Lax` so that they are sent
//! along with the top-level navigation coming back from the provider.

use chrono::{DateTime, TimeDelta, Utc};
use log::debug;
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::request::{FromRequest, Outcome};
use rocket::time::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::login::provider::{PendingAuth, User};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "auth";

/// Name of the pending authorization cookie
pub const PENDING_COOKIE: &str = "auth_pending";

/// Lifetime of a session, in seconds
pub const SESSION_MAX_AGE_SECS: i64 = 3600;

const PENDING_MAX_AGE_SECS: i64 = 600;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session data serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The authenticated user stored in the session cookie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user: User,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Create a record for `user`, valid for one hour from `now`
    ///
    /// The raw provider payload is dropped here.
    pub fn new(mut user: User, now: DateTime<Utc>) -> Self {
        user.raw_data = serde_json::Value::Null;
        Self {
            user,
            issued_at: now,
            expires_at: now + TimeDelta::seconds(SESSION_MAX_AGE_SECS),
        }
    }

    /// A record is usable when it carries an identity token and has not expired
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.user.id_token.is_empty() && now < self.expires_at
    }
}

#[derive(Serialize, Deserialize)]
struct StoredPending {
    provider: String,
    #[serde(flatten)]
    pending: PendingAuth,
}

/// Encode a session record into a cookie value
///
/// The private jar encrypts and encodes the JSON itself.
pub fn encode_session(record: &SessionRecord) -> Result<String, SessionError> {
    Ok(serde_json::to_string(record)?)
}

/// Decode a cookie value produced by [`encode_session`]
///
/// Returns `None` for anything that is not the JSON of a [`SessionRecord`].
pub fn decode_session(cookie_value: &str) -> Option<SessionRecord> {
    serde_json::from_str(cookie_value).ok()
}

fn private_cookie(name: &'static str, value: String, max_age_secs: i64) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie.set_max_age(Duration::seconds(max_age_secs));
    cookie.set_same_site(SameSite::Lax);
    cookie
}

/// Store `user` as the logged in user, replacing any previous session
pub fn store_user(cookies: &CookieJar<'_>, user: User) -> Result<SessionRecord, SessionError> {
    let record = SessionRecord::new(user, Utc::now());
    let value = encode_session(&record)?;
    cookies.add_private(private_cookie(SESSION_COOKIE, value, SESSION_MAX_AGE_SECS));
    Ok(record)
}

/// The valid session record of the request, if any
pub fn current_session(cookies: &CookieJar<'_>) -> Option<SessionRecord> {
    let cookie = cookies.get_private(SESSION_COOKIE)?;
    let record = decode_session(cookie.value());
    if record.is_none() {
        debug!("Session cookie could not be decoded");
    }
    record.filter(|record| record.is_valid(Utc::now()))
}

pub fn clear_user(cookies: &CookieJar<'_>) {
    cookies.remove_private(SESSION_COOKIE);
}

/// Remember the secrets of a login started with `provider`
pub fn store_pending(
    cookies: &CookieJar<'_>,
    provider: &str,
    pending: &PendingAuth,
) -> Result<(), SessionError> {
    let stored = StoredPending {
        provider: provider.to_string(),
        pending: pending.clone(),
    };
    let value = serde_json::to_string(&stored)?;
    cookies.add_private(private_cookie(PENDING_COOKIE, value, PENDING_MAX_AGE_SECS));
    Ok(())
}

/// Consume the pending login of `provider`
///
/// The cookie is removed whatever it holds, so a pending login can only be
/// completed once.
pub fn take_pending(cookies: &CookieJar<'_>, provider: &str) -> Option<PendingAuth> {
    let cookie = cookies.get_private(PENDING_COOKIE)?;
    cookies.remove_private(PENDING_COOKIE);

    let stored: StoredPending = serde_json::from_str(cookie.value()).ok()?;
    if stored.provider != provider {
        debug!(
            "Pending login belongs to provider '{}', not '{}'",
            stored.provider, provider
        );
        return None;
    }
    Some(stored.pending)
}

pub fn clear_pending(cookies: &CookieJar<'_>) {
    cookies.remove_private(PENDING_COOKIE);
}

/// Request guard for a valid session
pub struct SessionUser(pub SessionRecord);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SessionUser {
    type Error = ();

    async fn from_request(request: &'r rocket::Request<'_>) -> Outcome<Self, Self::Error> {
        match current_session(request.cookies()) {
            Some(record) => {
                debug!("Session found for user {}", record.user.user_id);
                Outcome::Success(SessionUser(record))
            }
            None => Outcome::Forward(Status::Unauthorized),
        }
    }
}
