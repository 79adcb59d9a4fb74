use time::Duration;
use tower_cookies::{cookie::SameSite, Cookie, Cookies};

use crate::config::AppConfig;

pub const SESSION_COOKIE: &str = "access_token";

/// Http-only cookie holding the session token; expires together with it.
pub fn session_cookie(token: String, config: &AppConfig) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(config.cookie_secure);
    cookie.set_max_age(Duration::minutes(config.jwt.ttl_minutes));
    cookie
}

pub fn clear_session(cookies: &Cookies) {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookies.remove(cookie);
}
