//! services/studio/src/web/cookie.rs
//!
//! Reading and writing the `session` cookie that ties a browser to its session.

use axum::http::{header, HeaderMap};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session";

/// Extracts the session id from the `Cookie` header, if present and well formed.
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|c| {
            let c = c.trim();
            c.strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
        })
        .and_then(|raw| Uuid::parse_str(raw).ok())
}

/// The `Set-Cookie` value for a freshly opened session. Lives as long as the browser session.
pub fn session_cookie(session_id: Uuid, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/",
        SESSION_COOKIE, session_id
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn finds_the_session_among_other_cookies() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; session={}; lang=en", id)).unwrap(),
        );
        assert_eq!(session_id(&headers), Some(id));
    }

    #[test]
    fn ignores_missing_or_malformed_sessions() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_id(&headers), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("session=not-a-uuid"));
        assert_eq!(session_id(&headers), None);

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("sessionx=6f1c1f5e-4b8e-4a53-9d3b-1c1b9c1e2f3a"),
        );
        assert_eq!(session_id(&headers), None);
    }

    #[test]
    fn secure_flag_is_optional() {
        let id = Uuid::new_v4();
        assert!(!session_cookie(id, false).contains("Secure"));
        assert!(session_cookie(id, true).ends_with("; Secure"));
        assert!(session_cookie(id, false).starts_with(&format!("session={};", id)));
    }
}
