use std::fmt;

use crate::internal::filters::Filters;

pub const DEFAULT_ENDPOINT: &str = "https://pixabay.com/api/";

/// Parameters for one page of results, derived from the feed state.
///
/// `q` holds the raw search text; it is encoded only when the request is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParams {
    pub page: u32,
    pub q: Option<String>,
    pub category: Option<String>,
    pub filters: Filters,
}

impl RequestParams {
    pub fn page(page: u32) -> Self {
        Self {
            page,
            q: None,
            category: None,
            filters: Filters::new(),
        }
    }

    pub fn with_query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }
}

impl Default for RequestParams {
    fn default() -> Self {
        Self::page(1)
    }
}

/// Query parameters sent with every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDefaults {
    pub key: String,
    pub per_page: u32,
    pub safesearch: bool,
    pub editors_choice: bool,
}

impl QueryDefaults {
    fn pairs(&self) -> Vec<(String, String)> {
        vec![
            ("key".to_string(), self.key.clone()),
            ("per_page".to_string(), self.per_page.to_string()),
            ("safesearch".to_string(), self.safesearch.to_string()),
            ("editors_choice".to_string(), self.editors_choice.to_string()),
        ]
    }
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            key: String::new(),
            per_page: 25,
            safesearch: true,
            editors_choice: true,
        }
    }
}

/// A fully built GET request: endpoint plus ordered query pairs.
///
/// Values are stored in wire form, i.e. `q` is already percent-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    endpoint: String,
    query: Vec<(String, String)>,
}

impl RequestDescriptor {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Wire value of the first parameter named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn url(&self) -> String {
        self.render(false)
    }

    fn render(&self, redact_key: bool) -> String {
        let mut url = self.endpoint.clone();
        for (i, (key, value)) in self.query.iter().enumerate() {
            match (i, url.contains('?')) {
                (0, false) => url.push('?'),
                _ if url.ends_with('?') || url.ends_with('&') => {}
                _ => url.push('&'),
            }
            let value = match (redact_key, key.as_str()) {
                (true, "key") => "***",
                _ => value.as_str(),
            };
            url.push_str(key);
            url.push('=');
            url.push_str(value);
        }
        url
    }
}

/// Renders the URL with the credential masked, for logs.
impl fmt::Display for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(true))
    }
}

/// Build the request for `params` against `endpoint`.
///
/// Without params the descriptor holds only the defaults. With params, `page`,
/// every filter, `category` and `q` are appended in that order. Only `q` is
/// percent-encoded; everything else is forwarded as given.
pub fn build(
    endpoint: &str,
    defaults: &QueryDefaults,
    params: Option<&RequestParams>,
) -> RequestDescriptor {
    let mut query = defaults.pairs();

    if let Some(params) = params {
        query.push(("page".to_string(), params.page.to_string()));
        for (key, value) in &params.filters {
            query.push((key.clone(), value.clone()));
        }
        if let Some(category) = &params.category {
            query.push(("category".to_string(), category.clone()));
        }
        if let Some(q) = &params.q {
            query.push(("q".to_string(), urlencoding::encode(q).into_owned()));
        }
    }

    let descriptor = RequestDescriptor {
        endpoint: endpoint.to_string(),
        query,
    };
    tracing::debug!(url = %descriptor, "final url");
    descriptor
}
