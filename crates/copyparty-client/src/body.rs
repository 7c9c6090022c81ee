//! Response body shaping.
//!
//! copyparty answers some endpoints with JSON and others with plain text or HTML depending on
//! server version and flags; file endpoints return arbitrary bytes. The helpers here turn those
//! into JSON-friendly values without failing the call.

use base64::Engine as _;
use serde::Serialize;
use serde_json::Value;
use url::Url;

/// A response body that was JSON if it could be, raw text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Body {
    Json(Value),
    Raw(String),
}

impl Body {
    /// Parse as JSON, falling back to (lossy) UTF-8 text.
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(v) => Self::Json(v),
            Err(_) => Self::Raw(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            Self::Raw(_) => None,
        }
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Json(v) => v,
            Self::Raw(s) => Value::String(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Text,
    Base64,
}

/// File-ish response content, either as text or base64.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilePayload {
    pub path: String,
    pub content_type: String,
    pub size: usize,
    pub content: String,
    pub encoding: Encoding,
}

impl FilePayload {
    /// Build a payload, preferring text unless `force_base64` is set or the bytes are not UTF-8.
    #[must_use]
    pub fn new(path: &str, content_type: String, bytes: &[u8], force_base64: bool) -> Self {
        let (content, encoding) = text_or_base64(bytes, force_base64);
        Self {
            path: path.to_string(),
            content_type,
            size: bytes.len(),
            content,
            encoding,
        }
    }
}

pub(crate) fn text_or_base64(bytes: &[u8], force_base64: bool) -> (String, Encoding) {
    if !force_base64 && let Ok(s) = std::str::from_utf8(bytes) {
        return (s.to_string(), Encoding::Text);
    }
    (
        base64::engine::general_purpose::STANDARD.encode(bytes),
        Encoding::Base64,
    )
}

/// Resolve a server-relative URL (e.g. `/share/abc`) against the configured base URL.
///
/// Absolute URLs and values that do not look like URLs are returned unchanged.
#[must_use]
pub fn absolutize_url(base_url: &str, url: &str) -> String {
    if !url.starts_with('/') {
        return url.to_string();
    }
    Url::parse(base_url)
        .and_then(|base| base.join(url))
        .map_or_else(|_| format!("{base_url}{url}"), |u| u.to_string())
}

/// Rewrite every relative `url` string field inside `value` to absolute form.
pub(crate) fn absolutize_url_fields(base_url: &str, value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (k, v) in map.iter_mut() {
                if k == "url"
                    && let Value::String(s) = v
                {
                    *s = absolutize_url(base_url, s);
                } else {
                    absolutize_url_fields(base_url, v);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                absolutize_url_fields(base_url, item);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn body_falls_back_to_raw_text() {
        assert_eq!(Body::parse(br#"{"dirs":[]}"#), Body::Json(json!({"dirs": []})));
        assert_eq!(
            Body::parse(b"<html>hi</html>"),
            Body::Raw("<html>hi</html>".to_string())
        );
        assert_eq!(
            serde_json::to_value(Body::Raw("x".to_string())).expect("serialize"),
            json!("x")
        );
    }

    #[test]
    fn payload_uses_base64_for_invalid_utf8() {
        let bytes = [0xff, 0xfe, 0x00, 0x41];
        let p = FilePayload::new(
            "/a.bin",
            "application/octet-stream".to_string(),
            &bytes,
            false,
        );
        assert_eq!(p.encoding, Encoding::Base64);
        assert_eq!(p.size, 4);
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&p.content)
            .expect("base64");
        assert_eq!(decoded, bytes);

        let p = FilePayload::new("/a.txt", "text/plain".to_string(), b"hello", false);
        assert_eq!(p.encoding, Encoding::Text);
        assert_eq!(p.content, "hello");

        let p = FilePayload::new("/a.txt", "text/plain".to_string(), b"hello", true);
        assert_eq!(p.encoding, Encoding::Base64);
        assert_eq!(p.content, "aGVsbG8=");
    }

    #[test]
    fn relative_urls_become_absolute() {
        assert_eq!(
            absolutize_url("http://files.local:3923", "/share/abc"),
            "http://files.local:3923/share/abc"
        );
        assert_eq!(
            absolutize_url("http://files.local:3923", "https://elsewhere/x"),
            "https://elsewhere/x"
        );

        let mut v = json!({"shares": [{"k": "abc", "url": "/share/abc"}], "url": "/share/top"});
        absolutize_url_fields("http://h:1", &mut v);
        assert_eq!(v["shares"][0]["url"], "http://h:1/share/abc");
        assert_eq!(v["url"], "http://h:1/share/top");
    }
}
