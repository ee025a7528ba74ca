//! Configured response headers.
//!
//! Entries have the form `Name:Value` and are split on the first colon, so
//! values may contain further colons (`Location:http://host:8080/`).
//! The name is taken as written; surrounding whitespace of the value is
//! trimmed, so `Cache-Control: no-store` works.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    #[error("{0:?} has no ':' between name and value")]
    MissingSeparator(String),

    #[error("invalid header name in {0:?}")]
    InvalidName(String),

    #[error("invalid header value in {0:?}")]
    InvalidValue(String),
}

/// Split one `Name:Value` entry into a typed header pair.
pub fn parse_entry(entry: &str) -> Result<(HeaderName, HeaderValue), HeaderError> {
    let (name, value) = entry
        .split_once(':')
        .ok_or_else(|| HeaderError::MissingSeparator(entry.to_string()))?;

    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| HeaderError::InvalidName(entry.to_string()))?;
    let value = HeaderValue::from_str(value.trim())
        .map_err(|_| HeaderError::InvalidValue(entry.to_string()))?;

    Ok((name, value))
}

/// Headers set on every behavior response, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct ResponseHeaders {
    entries: Vec<(HeaderName, HeaderValue)>,
}

impl ResponseHeaders {
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Result<Self, HeaderError> {
        let entries = entries
            .iter()
            .map(|entry| parse_entry(entry.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// Set every configured header, replacing any earlier value of the same
    /// name. A later entry with a repeated name wins.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for (name, value) in &self.entries {
            headers.insert(name.clone(), value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_colon() {
        let (name, value) = parse_entry("Location:http://localhost:8080/x").unwrap();
        assert_eq!(name, "location");
        assert_eq!(value, "http://localhost:8080/x");
    }

    #[test]
    fn trims_only_the_value() {
        let (name, value) = parse_entry("Content-Type: text/plain ").unwrap();
        assert_eq!(name, "content-type");
        assert_eq!(value, "text/plain");

        assert_eq!(
            parse_entry(" Age:1"),
            Err(HeaderError::InvalidName(" Age:1".into()))
        );
        assert_eq!(
            parse_entry("Age :1"),
            Err(HeaderError::InvalidName("Age :1".into()))
        );
    }

    #[test]
    fn rejects_malformed_entries() {
        assert_eq!(
            parse_entry("Age"),
            Err(HeaderError::MissingSeparator("Age".into()))
        );
        assert_eq!(
            parse_entry("Bad Name:1"),
            Err(HeaderError::InvalidName("Bad Name:1".into()))
        );
        assert_eq!(
            parse_entry("Age:\u{7f}"),
            Err(HeaderError::InvalidValue("Age:\u{7f}".into()))
        );
    }

    #[test]
    fn later_entries_replace_earlier_ones() {
        let headers = ResponseHeaders::parse(&["Age:1", "X-Test:a", "Age:2"]).unwrap();
        let mut map = HeaderMap::new();
        map.insert("age", HeaderValue::from_static("0"));
        headers.apply(&mut map);

        assert_eq!(headers.len(), 3);
        assert_eq!(map.get("age").unwrap(), "2");
        assert_eq!(map.get("x-test").unwrap(), "a");
        assert_eq!(map.get_all("age").iter().count(), 1);
    }
}
