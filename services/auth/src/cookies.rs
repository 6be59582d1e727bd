//! Session cookies
//!
//! Both tokens travel as HTTP-only, same-site-lax cookies scoped to `/`, so
//! page scripts never see them. The `secure` flag is left off to match the
//! plain-HTTP development setup the UI runs against.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::jwt::TokenPair;

/// Cookie carrying the short-lived access token
pub const ACCESS_COOKIE: &str = "accessToken";
/// Cookie carrying the long-lived refresh token
pub const REFRESH_COOKIE: &str = "refreshToken";

fn session_cookie(name: &'static str, value: String, max_age_secs: u64) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(false)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(max_age_secs as i64))
        .build()
}

/// Add both session cookies, with max-ages equal to the token lifetimes
pub fn with_session_cookies(jar: CookieJar, pair: TokenPair) -> CookieJar {
    jar.add(session_cookie(
        ACCESS_COOKIE,
        pair.access_token,
        pair.access_expires_in,
    ))
    .add(session_cookie(
        REFRESH_COOKIE,
        pair.refresh_token,
        pair.refresh_expires_in,
    ))
}

fn expired_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, "")).path("/").build();
    cookie.make_removal();
    cookie
}

/// Instruct the client to discard both session cookies
///
/// Removal cookies are emitted even when the request carried neither cookie.
pub fn without_session_cookies(jar: CookieJar) -> CookieJar {
    jar.add(expired_cookie(ACCESS_COOKIE))
        .add(expired_cookie(REFRESH_COOKIE))
}

/// Read the access token, if the client sent a non-empty one
pub fn access_token(jar: &CookieJar) -> Option<String> {
    jar.get(ACCESS_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> TokenPair {
        TokenPair {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            access_expires_in: 900,
            refresh_expires_in: 604800,
        }
    }

    #[test]
    fn test_session_cookie_attributes() {
        let jar = with_session_cookies(CookieJar::new(), pair());

        let access = jar.get(ACCESS_COOKIE).unwrap();
        assert_eq!(access.value(), "access");
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.secure(), Some(false));
        assert_eq!(access.same_site(), Some(SameSite::Lax));
        assert_eq!(access.path(), Some("/"));
        assert_eq!(access.max_age(), Some(Duration::seconds(900)));

        let refresh = jar.get(REFRESH_COOKIE).unwrap();
        assert_eq!(refresh.max_age(), Some(Duration::seconds(604800)));
    }

    #[test]
    fn test_clearing_removes_both_cookies() {
        let jar = without_session_cookies(with_session_cookies(CookieJar::new(), pair()));
        for name in [ACCESS_COOKIE, REFRESH_COOKIE] {
            let cookie = jar.get(name).unwrap();
            assert_eq!(cookie.value(), "");
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        }
        assert_eq!(access_token(&jar), None);
    }
}
