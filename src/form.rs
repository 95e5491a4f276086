use std::collections::HashMap;

use crate::models::SearchRequest;

/// Name of the form field the search request is built from.
pub const QUERY_FIELD: &str = "query";

/// Named text inputs of the search page. The session reads the `"query"`
/// field when a search is triggered; everything else is inert.
#[derive(Debug, Default, Clone)]
pub struct QueryForm {
    fields: HashMap<String, String>,
}

impl QueryForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Package the current query value into a request. A form without a
    /// query field yields `query: None` rather than an error; an empty field
    /// is kept as `Some("")`.
    pub fn collect_request(&self) -> SearchRequest {
        SearchRequest {
            query: self.field(QUERY_FIELD).map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_query_field_degrades_to_none() {
        let form = QueryForm::new();
        assert_eq!(form.collect_request(), SearchRequest { query: None });
    }

    #[test]
    fn test_empty_query_is_preserved() {
        let mut form = QueryForm::new();
        form.set_field(QUERY_FIELD, "");
        assert_eq!(
            form.collect_request(),
            SearchRequest {
                query: Some(String::new())
            }
        );
    }

    #[test]
    fn test_query_value_is_packaged_verbatim() {
        let mut form = QueryForm::new();
        form.set_field(QUERY_FIELD, "  rust lang  ");
        form.set_field("unrelated", "ignored");
        assert_eq!(
            form.collect_request(),
            SearchRequest {
                query: Some("  rust lang  ".to_string())
            }
        );
    }
}
