//! Request value providers
//!
//! A provider resolves a key to zero-or-more string values from one source
//! of the inbound request. The registry maps source names (as they appear in
//! field tags) to providers; built-ins cover `path`, `query`, and `header`.
//! The registry is immutable once the binder owning it is built and is
//! shared read-only across requests.

use std::collections::HashMap;
use std::sync::Arc;

use http::HeaderMap;

/// Source name for path-template parameters
pub const PATH: &str = "path";
/// Source name for query-string parameters
pub const QUERY: &str = "query";
/// Source name for header values
pub const HEADER: &str = "header";

/// Transport-independent view of the request pieces providers read from
///
/// Assembled once per request at the transport boundary; query pairs keep
/// their wire order so repeated keys bind in order.
#[derive(Debug, Clone, Default)]
pub struct RequestParts {
    path_params: Vec<(String, String)>,
    query: Vec<(String, String)>,
    headers: HeaderMap,
}

impl RequestParts {
    /// Build request parts from raw transport pieces
    pub fn new(
        path_params: Vec<(String, String)>,
        raw_query: &str,
        headers: HeaderMap,
    ) -> Self {
        let query = url::form_urlencoded::parse(raw_query.as_bytes())
            .into_owned()
            .collect();
        Self {
            path_params,
            query,
            headers,
        }
    }

    /// Value of a path parameter, if the template captured it
    pub fn path_param(&self, key: &str) -> Option<&str> {
        self.path_params
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Whether the query string carries the key at all
    pub fn has_query_key(&self, key: &str) -> bool {
        self.query.iter().any(|(name, _)| name == key)
    }

    /// Every query value for the key, in wire order
    pub fn query_values(&self, key: &str) -> Vec<String> {
        self.query
            .iter()
            .filter(|(name, _)| name == key)
            .map(|(_, value)| value.clone())
            .collect()
    }

    /// Every header value for the name that is valid UTF-8
    pub fn header_values(&self, name: &str) -> Vec<String> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_owned)
            .collect()
    }
}

/// A named lookup: request parts + key → zero-or-more string values
pub type Provider = Arc<dyn Fn(&RequestParts, &str) -> Option<Vec<String>> + Send + Sync>;

/// Named providers consulted during tag resolution
///
/// Frozen once the owning binder is built; concurrent reads need no locking.
#[derive(Clone)]
pub struct ProviderRegistry {
    providers: HashMap<String, Provider>,
}

impl ProviderRegistry {
    /// Registry with the built-in `path`, `query`, and `header` providers
    pub fn with_defaults() -> Self {
        let mut registry = Self {
            providers: HashMap::new(),
        };

        registry.register(PATH, |parts, key| {
            let value = parts.path_param(key)?;
            if value.is_empty() {
                return None;
            }
            Some(vec![value.to_owned()])
        });

        registry.register(QUERY, |parts, key| {
            if !parts.has_query_key(key) {
                return None;
            }
            Some(parts.query_values(key))
        });

        registry.register(HEADER, |parts, key| {
            let values = parts.header_values(key);
            if values.is_empty() {
                return None;
            }
            Some(values)
        });

        registry
    }

    /// Register a provider under a source name
    ///
    /// Only reachable while the owning binder is still being configured.
    pub(crate) fn register<F>(&mut self, name: &str, provider: F)
    where
        F: Fn(&RequestParts, &str) -> Option<Vec<String>> + Send + Sync + 'static,
    {
        self.providers.insert(name.to_owned(), Arc::new(provider));
    }

    /// Look up a provider by source name
    pub fn get(&self, name: &str) -> Option<&Provider> {
        self.providers.get(name)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ProviderRegistry")
            .field("sources", &names)
            .finish()
    }
}
