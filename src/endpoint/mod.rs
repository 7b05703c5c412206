//! Endpoint normalization.
//!
//! Turns whatever the user typed into the connection dialog into a base URL that
//! operation paths can be appended to.

use url::Url;

/// Canonicalize a user-entered endpoint.
///
/// A missing scheme defaults to `http://`. Query string, fragment and userinfo are
/// dropped and exactly one trailing `/` is stripped, so a path ending in `//` keeps one.
/// Input that still does not parse as a URL is returned with the scheme prefix applied
/// and nothing else changed; the caller will see the failure as a network error on
/// dispatch.
pub fn normalize(raw: &str) -> String {
    let raw = raw.trim();
    let prefixed = if has_scheme(raw) {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };

    let url = match Url::parse(&prefixed) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!("Keeping unparseable endpoint {:?}: {}", prefixed, e);
            return prefixed;
        }
    };

    let Some(host) = url.host_str() else {
        return prefixed;
    };

    let mut base = format!("{}://{}", url.scheme(), host);
    if let Some(port) = url.port() {
        base.push(':');
        base.push_str(&port.to_string());
    }
    base.push_str(url.path());

    strip_trailing_slash(base)
}

/// `letter (letter | digit | + | . | -)* "://"`, case-insensitive.
fn has_scheme(raw: &str) -> bool {
    let Some((scheme, _)) = raw.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
}

fn strip_trailing_slash(mut path: String) -> String {
    if path.ends_with('/') {
        path.pop();
    }
    path
}

/// Remembers the last raw endpoint so it is only re-normalized when it changes.
#[derive(Debug, Default)]
pub struct EndpointCache {
    last_raw: Option<String>,
    normalized: String,
}

impl EndpointCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base URL for `raw`, normalizing only if `raw` differs from the previous call.
    pub fn resolve(&mut self, raw: &str) -> &str {
        if self.last_raw.as_deref() != Some(raw) {
            self.normalized = normalize(raw);
            tracing::debug!("Endpoint {:?} normalized to {}", raw, self.normalized);
            self.last_raw = Some(raw.to_string());
        }
        &self.normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_defaults_to_http() {
        assert_eq!(normalize("play.dgraph.io"), "http://play.dgraph.io");
    }

    #[test]
    fn test_trailing_slash_stripped() {
        assert_eq!(normalize("https://x.io/"), "https://x.io");
        assert_eq!(normalize("http://x.io/api/"), "http://x.io/api");
    }

    #[test]
    fn test_port_kept_query_and_fragment_dropped() {
        assert_eq!(
            normalize("localhost:8080/?debug=true#top"),
            "http://localhost:8080"
        );
        assert_eq!(
            normalize("https://cloud.example.com:9443/graphql?x=1"),
            "https://cloud.example.com:9443/graphql"
        );
    }

    #[test]
    fn test_default_port_elided() {
        assert_eq!(normalize("https://x.io:443/"), "https://x.io");
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        assert_eq!(normalize("HTTPS://Play.Dgraph.io"), "https://play.dgraph.io");
    }

    #[test]
    fn test_unparseable_input_only_gets_prefix() {
        assert_eq!(normalize("exa mple:99999"), "http://exa mple:99999");
    }

    #[test]
    fn test_idempotent() {
        for raw in [
            "play.dgraph.io",
            "https://x.io/",
            "localhost:8080",
            "http://127.0.0.1:8080/alpha/",
            "https://cloud.example.com/graphql?x=1#frag",
            "[::1]:8080",
        ] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {}", raw);
        }
    }

    #[test]
    fn test_only_one_trailing_slash_stripped() {
        // Repeated trailing slashes are not collapsed, so this input takes two passes to
        // reach a fixed point.
        let once = normalize("x.io//");
        assert_eq!(once, "http://x.io/");
        assert_eq!(normalize(&once), "http://x.io");
        assert_eq!(normalize("http://x.io/api//"), "http://x.io/api/");
    }

    #[test]
    fn test_has_scheme() {
        assert!(has_scheme("git+ssh://host"));
        assert!(has_scheme("Http://host"));
        assert!(!has_scheme("localhost:8080"));
        assert!(!has_scheme("1http://host"));
        assert!(!has_scheme("://host"));
    }

    #[test]
    fn test_cache_renormalizes_only_on_change() {
        let mut cache = EndpointCache::new();
        assert_eq!(cache.resolve("localhost:8080/"), "http://localhost:8080");
        assert_eq!(cache.last_raw.as_deref(), Some("localhost:8080/"));

        assert_eq!(cache.resolve("localhost:8080/"), "http://localhost:8080");
        assert_eq!(cache.resolve("https://x.io"), "https://x.io");
        assert_eq!(cache.last_raw.as_deref(), Some("https://x.io"));
    }
}
