use axum::extract::Query;
use axum::http::Uri;
use serde::Deserialize;
use tracing::debug;

/// Initial dropdown selections taken from the page's query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UrlDefaults {
    pub county: Option<String>,
    pub category: Option<String>,
}

impl UrlDefaults {
    /// Parse `?county=..&category=..`. Other parameters are ignored, and an
    /// unparsable query yields no defaults.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        if query.is_empty() {
            return Self::default();
        }

        let uri: Uri = match format!("/?{query}").parse() {
            Ok(uri) => uri,
            Err(e) => {
                debug!("Ignoring malformed query string {:?}: {}", query, e);
                return Self::default();
            }
        };
        match Query::<UrlDefaults>::try_from_uri(&uri) {
            Ok(Query(defaults)) => defaults,
            Err(e) => {
                debug!("Ignoring malformed query string {:?}: {}", query, e);
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.county.is_none() && self.category.is_none()
    }
}
