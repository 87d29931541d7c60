//! httpOnly session cookies.
//!
//! Browsers hold the access and refresh tokens in httpOnly cookies; API
//! clients keep using the bearer header. The refresh cookie is scoped to the
//! auth routes so it is not sent with every request.

use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};

use crate::config::CookieConfig;

#[derive(Debug, Clone)]
pub struct CookieHelper {
    config: CookieConfig,
    access_token_expiry_secs: i64,
    refresh_token_expiry_secs: i64,
}

impl CookieHelper {
    pub fn new(
        config: CookieConfig,
        access_token_expiry_secs: i64,
        refresh_token_expiry_secs: i64,
    ) -> Self {
        Self {
            config,
            access_token_expiry_secs,
            refresh_token_expiry_secs,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn access_cookie(&self, token: &str) -> String {
        self.build_cookie(
            &self.config.access_token_name,
            token,
            &self.config.access_token_path,
            self.access_token_expiry_secs,
        )
    }

    pub fn refresh_cookie(&self, token: &str) -> String {
        self.build_cookie(
            &self.config.refresh_token_name,
            token,
            &self.config.refresh_token_path,
            self.refresh_token_expiry_secs,
        )
    }

    /// Appends both session cookies. No-op when cookies are disabled.
    pub fn set_session(&self, headers: &mut HeaderMap, access_token: &str, refresh_token: &str) {
        if !self.config.enabled {
            return;
        }
        append(headers, &self.access_cookie(access_token));
        append(headers, &self.refresh_cookie(refresh_token));
    }

    /// Appends expired cookies so the browser drops the session.
    pub fn clear_session(&self, headers: &mut HeaderMap) {
        if !self.config.enabled {
            return;
        }
        append(
            headers,
            &self.build_cookie(
                &self.config.access_token_name,
                "",
                &self.config.access_token_path,
                0,
            ),
        );
        append(
            headers,
            &self.build_cookie(
                &self.config.refresh_token_name,
                "",
                &self.config.refresh_token_path,
                0,
            ),
        );
    }

    pub fn extract_access_token<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        if !self.config.enabled {
            return None;
        }
        extract_cookie(headers, &self.config.access_token_name)
    }

    pub fn extract_refresh_token<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        if !self.config.enabled {
            return None;
        }
        extract_cookie(headers, &self.config.refresh_token_name)
    }

    fn build_cookie(&self, name: &str, value: &str, path: &str, max_age: i64) -> String {
        let mut cookie = format!("{name}={value}; Path={path}; Max-Age={max_age}; HttpOnly");
        if max_age == 0 {
            cookie.push_str("; Expires=Thu, 01 Jan 1970 00:00:00 GMT");
        }
        if !self.config.domain.is_empty() {
            cookie.push_str(&format!("; Domain={}", self.config.domain));
        }
        if self.config.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; SameSite={}", self.config.same_site));
        cookie
    }
}

fn append(headers: &mut HeaderMap, cookie: &str) {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            headers.append(SET_COOKIE, value);
        }
        Err(_) => tracing::warn!("Skipping cookie with invalid header characters"),
    }
}

/// Finds `name` across every `Cookie` header of the request.
pub fn extract_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(cookie_name, value)| *cookie_name == name && !value.is_empty())
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn helper(config: CookieConfig) -> CookieHelper {
        CookieHelper::new(config, 3600, 2_592_000)
    }

    #[test]
    fn test_access_cookie_attributes() {
        let cookie = helper(CookieConfig::default()).access_cookie("tok");
        assert!(cookie.starts_with("cm_access_token=tok; Path=/; Max-Age=3600; HttpOnly"));
        assert!(cookie.contains("; Secure"));
        assert!(cookie.ends_with("SameSite=Lax"));
        assert!(!cookie.contains("Domain="));
    }

    #[test]
    fn test_refresh_cookie_is_scoped_to_auth_routes() {
        let cookie = helper(CookieConfig::default()).refresh_cookie("r");
        assert!(cookie.contains("Path=/api/v1/auth"));
        assert!(cookie.contains("Max-Age=2592000"));
    }

    #[test]
    fn test_domain_and_insecure() {
        let cookie = helper(CookieConfig {
            domain: "clinic.example".to_string(),
            secure: false,
            same_site: "Strict".to_string(),
            ..CookieConfig::default()
        })
        .access_cookie("t");
        assert!(cookie.contains("Domain=clinic.example"));
        assert!(!cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Strict"));
    }

    #[test]
    fn test_clear_session_expires_both() {
        let mut headers = HeaderMap::new();
        helper(CookieConfig::default()).clear_session(&mut headers);
        let cookies: Vec<_> = headers.get_all(SET_COOKIE).iter().collect();
        assert_eq!(cookies.len(), 2);
        for cookie in cookies {
            let cookie = cookie.to_str().unwrap();
            assert!(cookie.contains("Max-Age=0"));
            assert!(cookie.contains("1970"));
        }
    }

    #[test]
    fn test_disabled_helper_is_inert() {
        let helper = helper(CookieConfig {
            enabled: false,
            ..CookieConfig::default()
        });
        let mut headers = HeaderMap::new();
        helper.set_session(&mut headers, "a", "r");
        assert!(headers.is_empty());

        headers.insert(COOKIE, HeaderValue::from_static("cm_access_token=a"));
        assert!(helper.extract_access_token(&headers).is_none());
    }

    #[test]
    fn test_extract_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; cm_access_token=abc.def; cm_refresh_token="),
        );
        let helper = helper(CookieConfig::default());
        assert_eq!(helper.extract_access_token(&headers), Some("abc.def"));
        assert_eq!(helper.extract_refresh_token(&headers), None);
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }
}
