use vercel_runtime::{Body, Response};

use crate::config::Settings;

const ALLOW_METHODS: &str = "POST, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";
const MAX_AGE: &str = "86400";

/// Which origins may read responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsPolicy {
    /// `Access-Control-Allow-Origin: *`.
    Permissive,
    /// Echo the request origin only when it is listed.
    AllowList(Vec<String>),
}

impl CorsPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        if settings.allowed_origins.is_empty() {
            CorsPolicy::Permissive
        } else {
            CorsPolicy::AllowList(settings.allowed_origins.clone())
        }
    }

    fn allow_origin<'a>(&self, origin: Option<&'a str>) -> Option<&'a str> {
        match self {
            CorsPolicy::Permissive => Some("*"),
            CorsPolicy::AllowList(allowed) => {
                origin.filter(|o| allowed.iter().any(|a| a == o.trim_end_matches('/')))
            }
        }
    }
}

pub fn add_cors(mut resp: Response<Body>, policy: &CorsPolicy, origin: Option<&str>) -> Response<Body> {
    if let Some(allowed) = policy.allow_origin(origin) {
        set_header(&mut resp, "access-control-allow-origin", allowed);
    }
    if matches!(policy, CorsPolicy::AllowList(_)) {
        set_header(&mut resp, "vary", "Origin");
    }
    set_header(&mut resp, "access-control-allow-methods", ALLOW_METHODS);
    set_header(&mut resp, "access-control-allow-headers", ALLOW_HEADERS);
    set_header(&mut resp, "access-control-max-age", MAX_AGE);
    resp
}

fn set_header(resp: &mut Response<Body>, name: &'static str, value: &str) {
    // Origins arrive as header values already, so parsing only fails on
    // input that could not have been a header in the first place.
    if let Ok(v) = value.parse() {
        resp.headers_mut().insert(name, v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> Response<Body> {
        Response::builder().body(Body::Empty).unwrap()
    }

    fn header<'a>(resp: &'a Response<Body>, name: &str) -> Option<&'a str> {
        resp.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn permissive_policy_allows_everyone() {
        let resp = add_cors(empty(), &CorsPolicy::Permissive, Some("https://evil.example"));
        assert_eq!(header(&resp, "access-control-allow-origin"), Some("*"));
        assert_eq!(header(&resp, "access-control-allow-methods"), Some("POST, OPTIONS"));
        assert_eq!(header(&resp, "vary"), None);
    }

    #[test]
    fn allow_list_echoes_known_origin() {
        let policy = CorsPolicy::AllowList(vec!["https://app.example".into()]);
        let resp = add_cors(empty(), &policy, Some("https://app.example"));
        assert_eq!(header(&resp, "access-control-allow-origin"), Some("https://app.example"));
        assert_eq!(header(&resp, "vary"), Some("Origin"));
    }

    #[test]
    fn allow_list_omits_unknown_origin() {
        let policy = CorsPolicy::AllowList(vec!["https://app.example".into()]);
        let resp = add_cors(empty(), &policy, Some("https://other.example"));
        assert_eq!(header(&resp, "access-control-allow-origin"), None);
        let resp = add_cors(empty(), &policy, None);
        assert_eq!(header(&resp, "access-control-allow-origin"), None);
    }

    #[test]
    fn policy_follows_settings() {
        assert_eq!(CorsPolicy::from_settings(&Settings::default()), CorsPolicy::Permissive);
        let settings = Settings { allowed_origins: vec!["https://a".into()], ..Settings::default() };
        assert_eq!(
            CorsPolicy::from_settings(&settings),
            CorsPolicy::AllowList(vec!["https://a".into()])
        );
    }
}
