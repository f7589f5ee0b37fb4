use axum::http::{
    request::Parts,
    HeaderValue,
    Method
};
use tower_http::cors::{
    AllowOrigin,
    Any,
    CorsLayer
};

/// 允許的跨來源 origin 樣式。
///
/// - `*`：任何 origin
/// - `https://*.example.com`：該 scheme 下 example.com 的任一子網域（不含 example.com 本身）
/// - 其他字串：完全相符（忽略結尾的 `/`）
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OriginPattern {
    Any,
    Exact(String),
    Subdomain { scheme: String, suffix: String }
}

impl OriginPattern {
    pub fn parse(pattern: &str) -> OriginPattern {
        let pattern = pattern.trim().trim_end_matches('/');
        if pattern == "*" {
            return OriginPattern::Any;
        }
        match pattern.split_once("://*.") {
            Some((scheme, domain)) if !domain.is_empty() => OriginPattern::Subdomain {
                scheme: format!("{}://", scheme),
                suffix: format!(".{}", domain)
            },
            _ => OriginPattern::Exact(pattern.to_owned())
        }
    }

    pub fn matches(&self, origin: &str) -> bool {
        let origin = origin.trim_end_matches('/');
        match self {
            OriginPattern::Any => true,
            OriginPattern::Exact(expected) => origin == expected,
            OriginPattern::Subdomain { scheme, suffix } => origin
                .strip_prefix(scheme.as_str())
                .and_then(|host| host.strip_suffix(suffix.as_str()))
                .is_some_and(|label| !label.is_empty() && !label.contains('/'))
        }
    }
}

/// 依設定建立 CORS layer；只開放 GET。
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let patterns: Vec<OriginPattern> = allowed_origins
        .iter()
        .map(|pattern| OriginPattern::parse(pattern))
        .collect();

    let layer = CorsLayer::new().allow_methods([Method::GET]);
    if patterns.contains(&OriginPattern::Any) {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _parts: &Parts| {
            origin
                .to_str()
                .map(|origin| patterns.iter().any(|pattern| pattern.matches(origin)))
                .unwrap_or(false)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_patterns() {
        assert_eq!(OriginPattern::parse(" * "), OriginPattern::Any);
        assert_eq!(
            OriginPattern::parse("http://localhost:3000/"),
            OriginPattern::Exact("http://localhost:3000".to_owned())
        );
        assert_eq!(
            OriginPattern::parse("https://*.example.com"),
            OriginPattern::Subdomain { scheme: "https://".to_owned(), suffix: ".example.com".to_owned() }
        );
    }

    #[test]
    fn exact_pattern_matches_only_itself() {
        let pattern = OriginPattern::parse("http://localhost:3000");
        assert!(pattern.matches("http://localhost:3000"));
        assert!(!pattern.matches("http://localhost:3001"));
        assert!(!pattern.matches("https://localhost:3000"));
    }

    #[test]
    fn subdomain_pattern_requires_a_label() {
        let pattern = OriginPattern::parse("https://*.example.com");
        assert!(pattern.matches("https://app.example.com"));
        assert!(pattern.matches("https://a.b.example.com"));
        assert!(!pattern.matches("https://example.com"));
        assert!(!pattern.matches("http://app.example.com"));
        assert!(!pattern.matches("https://evil.com/.example.com"));
    }
}
