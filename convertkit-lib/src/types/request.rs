use reqwest::Method;
use serde_json::Value;
use std::fmt::Display;
use url::Url;

/// Everything needed to perform one API call, independent of credentials
/// and transport.
///
/// A description is reused verbatim every time its call is attempted, so a
/// throttled call is re-sent exactly as it was first submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescription {
    /// HTTP verb
    pub method: Method,

    /// Path relative to the API base URL, e.g. `subscribers/42`
    pub path: String,

    /// Query parameters in the order they are appended to the URL
    pub query: Vec<(String, String)>,

    /// JSON body, sent for any method when present
    pub body: Option<Value>,
}

impl RequestDescription {
    /// Create a description for the given method and path with no query and
    /// no body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// A `GET` request
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// A `POST` request
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// A `PUT` request
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// A `DELETE` request
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append query parameters, keeping their order.
    #[must_use]
    pub fn with_query<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Resolve this description against the API base URL.
    ///
    /// Trailing slashes of the base and leading slashes of the path are
    /// collapsed into a single separator.
    ///
    /// # Errors
    ///
    /// Returns an error if the joined string is not a valid URL.
    pub fn url(&self, base: &Url) -> Result<Url, url::ParseError> {
        let joined = format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            self.path.trim_start_matches('/')
        );
        let mut url = Url::parse(&joined)?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }
}

impl Display for RequestDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} /{}", self.method, self.path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case("https://api.convertkit.com/v3/", "account", "https://api.convertkit.com/v3/account")]
    #[case("https://api.convertkit.com/v3", "/account", "https://api.convertkit.com/v3/account")]
    #[case("https://api.convertkit.com/v3//", "//tags/1/subscribe", "https://api.convertkit.com/v3/tags/1/subscribe")]
    fn test_url_joining(#[case] base: &str, #[case] path: &str, #[case] expected: &str) {
        let base = Url::parse(base).unwrap();
        let url = RequestDescription::get(path).url(&base).unwrap();
        assert_eq!(url.as_str(), expected);
    }

    #[test]
    fn test_query_keeps_order() {
        let base = Url::parse("https://api.convertkit.com/v3/").unwrap();
        let url = RequestDescription::get("subscribers")
            .with_query([("page", "2"), ("sort_order", "desc")])
            .with_query([("api_secret", "s3cr3t")])
            .url(&base)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.convertkit.com/v3/subscribers?page=2&sort_order=desc&api_secret=s3cr3t"
        );
    }

    #[test]
    fn test_no_query_leaves_url_bare() {
        let base = Url::parse("https://api.convertkit.com/v3/").unwrap();
        let url = RequestDescription::delete("custom_fields/7").url(&base).unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_display_and_body() {
        let desc = RequestDescription::post("/tags").with_body(json!({ "tag": { "name": "vip" } }));
        assert_eq!(desc.to_string(), "POST /tags");
        assert_eq!(desc.body, Some(json!({ "tag": { "name": "vip" } })));
    }
}
