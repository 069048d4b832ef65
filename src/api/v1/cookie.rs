use crate::domain_model::*;
use crate::logger::*;
use warp::Reply;
use warp::http::HeaderValue;
use warp::http::header::SET_COOKIE;

pub const USER_ID_COOKIE: &str = "user_id";
pub const SESSION_COOKIE: &str = "access_token";
pub const REFRESH_HEADER: &str = "refresh";

/// RFC 6265 `cookie-octet`s only: visible ASCII without `"`, `,`, `;`
/// and `\`.
pub fn is_cookie_value(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|b| matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E))
}

fn cookie(name: &str, value: &str, clear: bool) -> String {
    let mut cookie = format!("{}={}; Path=/; HttpOnly; Secure; SameSite=Strict", name, value);
    if clear {
        cookie.push_str("; Max-Age=0");
    }
    cookie
}

/// Reply wrapper appending `Set-Cookie` headers for the session cookies.
pub struct WithSessionCookies<R> {
    inner: R,
    cookies: Vec<String>,
}

impl<R: Reply> Reply for WithSessionCookies<R> {
    fn into_response(self) -> warp::reply::Response {
        let mut response = self.inner.into_response();
        for cookie in self.cookies {
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    response.headers_mut().append(SET_COOKIE, value);
                }
                Err(e) => error!("dropping unencodable Set-Cookie header: {}", e),
            }
        }
        response
    }
}

pub fn set_session_cookies<R: Reply>(
    reply: R,
    user_id: &UserId,
    short_id: &ShortId,
) -> WithSessionCookies<R> {
    WithSessionCookies {
        inner: reply,
        cookies: vec![
            cookie(USER_ID_COOKIE, user_id.as_str(), false),
            cookie(SESSION_COOKIE, short_id.as_str(), false),
        ],
    }
}

pub fn clear_session_cookies<R: Reply>(reply: R) -> WithSessionCookies<R> {
    WithSessionCookies {
        inner: reply,
        cookies: vec![
            cookie(USER_ID_COOKIE, "", true),
            cookie(SESSION_COOKIE, "", true),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_values_are_restricted_to_cookie_octets() {
        assert!(is_cookie_value("u1"));
        assert!(is_cookie_value("user-42_x.y@example.com"));
        assert!(!is_cookie_value(""));
        assert!(!is_cookie_value("u1; Domain=evil.example"));
        assert!(!is_cookie_value("a b"));
        assert!(!is_cookie_value("a,b"));
        assert!(!is_cookie_value("\"quoted\""));
        assert!(!is_cookie_value("back\\slash"));
        assert!(!is_cookie_value("jos\u{e9}"));
    }
}
