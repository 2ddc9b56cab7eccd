use crate::error::ConfigError;
use http::HeaderMap;
use http::header::{CONNECTION, CONTENT_LENGTH, HOST, HeaderName, TRANSFER_ENCODING};
use regex::Regex;

/// Describe the connection to the knot server, never the backend call.
static NEVER_FORWARDED: [HeaderName; 4] = [HOST, CONTENT_LENGTH, TRANSFER_ENCODING, CONNECTION];

/// Decides which client request headers reach a backend service.
///
/// Every pattern must match the whole header name, ignoring case.
/// An empty filter forwards nothing.
#[derive(Debug, Clone, Default)]
pub struct AllowedHeadersFilter {
    patterns: Vec<Regex>,
}

impl AllowedHeadersFilter {
    pub fn new<I, S>(patterns: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(&format!("(?i)^(?:{pattern})$")).map_err(|source| {
                    ConfigError::Pattern {
                        pattern: pattern.to_string(),
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn allows(&self, name: &HeaderName) -> bool {
        !NEVER_FORWARDED.contains(name) && self.patterns.iter().any(|p| p.is_match(name.as_str()))
    }

    /// Allowed headers of `headers`, keeping every value of repeated names.
    pub fn filter(&self, headers: &HeaderMap) -> HeaderMap {
        let mut filtered = HeaderMap::new();
        for (name, value) in headers {
            if self.allows(name) {
                filtered.append(name.clone(), value.clone());
            }
        }
        filtered
    }
}
