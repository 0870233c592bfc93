// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the oidc_login project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! HTML pages
//!
//! The templates are compiled into the binary and registered once when the
//! server is built, so a broken template stops the server at startup rather
//! than on the first request.

use handlebars::{Handlebars, RenderError, TemplateError};
use serde_json::json;

use crate::config::OPENID_CONNECT_PROVIDER;
use crate::login::provider::User;

const INDEX_TEMPLATE: &str = "index";
const HOME_TEMPLATE: &str = "home";

pub struct Templates {
    handlebars: Handlebars<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, TemplateError> {
        let mut handlebars = Handlebars::new();
        handlebars.register_template_string(
            INDEX_TEMPLATE,
            include_str!("../../resources/ui/index.hbs"),
        )?;
        handlebars
            .register_template_string(HOME_TEMPLATE, include_str!("../../resources/ui/home.hbs"))?;
        Ok(Self { handlebars })
    }

    /// Landing page with the login link
    pub fn render_index(&self) -> Result<String, RenderError> {
        self.handlebars.render(
            INDEX_TEMPLATE,
            &json!({ "provider": OPENID_CONNECT_PROVIDER }),
        )
    }

    /// Page showing the organization and identity token of a logged in user
    pub fn render_home(&self, org: &str, user: &User) -> Result<String, RenderError> {
        let provider = if user.provider.is_empty() {
            OPENID_CONNECT_PROVIDER
        } else {
            user.provider.as_str()
        };
        self.handlebars.render(
            HOME_TEMPLATE,
            &json!({
                "org": org,
                "id_token": user.id_token,
                "name": user.name.as_deref().or(user.nick_name.as_deref()),
                "provider": provider,
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_links_to_provider() {
        let templates = Templates::new().unwrap();
        let html = templates.render_index().unwrap();
        assert!(html.contains(r#"href="/auth/openid-connect""#));
    }

    #[test]
    fn test_home_shows_org_and_token() {
        let templates = Templates::new().unwrap();
        let user = User {
            provider: "openid-connect".to_string(),
            id_token: "abc123".to_string(),
            name: Some("Jane".to_string()),
            ..User::default()
        };

        let html = templates.render_home("acme", &user).unwrap();

        assert!(html.contains("abc123"));
        assert!(html.contains("<strong>acme</strong>"));
        assert!(html.contains("Welcome, Jane"));
        assert!(html.contains(r#"href="/logout/openid-connect""#));
    }

    #[test]
    fn test_home_escapes_html() {
        let templates = Templates::new().unwrap();
        let user = User {
            id_token: "<script>alert(1)</script>".to_string(),
            ..User::default()
        };

        let html = templates.render_home("acme", &user).unwrap();

        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("Welcome</h1>"));
    }
}
