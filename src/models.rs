use serde::{Deserialize, Serialize};

/// Markup the service wraps around matched terms inside fragment entries.
/// The renderer lets exactly these tokens through its sanitizer.
pub const HIGHLIGHT_OPEN: &str = "<span class=\"hl\">";
pub const HIGHLIGHT_CLOSE: &str = "</span>";

/// Body of the `search` call. `query` is `None` when the form has no query
/// field; an empty string is a real value and is sent as `""`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Number of documents matching the query, before any result cap.
    pub total_hits: u64,
    /// Number of documents in the searched index.
    pub total_docs: u64,
    /// Search execution time in milliseconds.
    pub time: u64,
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Relevance score reported by the service. Carried on the wire but not
    /// part of the rendered markup.
    pub score: f32,
    pub fields: HitFields,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitFields {
    pub user: String,
    pub num_followers: u64,
    /// Pre-formatted relative age, e.g. `"2h"`. The renderer appends " ago".
    pub timestamp: String,
    pub content: String,
    /// Highlighted excerpts of the matched text. Only the first entry is
    /// rendered; later entries are ignored.
    pub fragment: Vec<String>,
    /// Unused by the renderer; the demo service always sends "/".
    #[serde(default)]
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_query_or_null() {
        let req = SearchRequest {
            query: Some("rust".to_string()),
        };
        assert_eq!(serde_json::to_string(&req).unwrap(), r#"{"query":"rust"}"#);

        let req = SearchRequest { query: None };
        assert_eq!(serde_json::to_string(&req).unwrap(), r#"{"query":null}"#);

        // An empty query field is preserved, not collapsed to null.
        let req = SearchRequest {
            query: Some(String::new()),
        };
        assert_eq!(serde_json::to_string(&req).unwrap(), r#"{"query":""}"#);
    }

    #[test]
    fn test_response_uses_camel_case_totals() {
        let body = r#"{
            "totalHits": 2,
            "totalDocs": 100,
            "time": 7,
            "hits": [{
                "score": 0.5,
                "fields": {
                    "user": "alice",
                    "num_followers": 10,
                    "timestamp": "2h",
                    "content": "hello world",
                    "fragment": ["hello world"],
                    "path": "/"
                }
            }]
        }"#;
        let resp: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.total_hits, 2);
        assert_eq!(resp.total_docs, 100);
        assert_eq!(resp.time, 7);
        assert_eq!(resp.hits.len(), 1);
        assert_eq!(resp.hits[0].fields.user, "alice");
        assert_eq!(resp.hits[0].fields.fragment, vec!["hello world"]);
    }

    #[test]
    fn test_response_without_hits_is_rejected() {
        // An absent hit list is a malformed response, not an empty one.
        let body = r#"{"totalHits": 0, "totalDocs": 0, "time": 1}"#;
        assert!(serde_json::from_str::<SearchResponse>(body).is_err());
    }

    #[test]
    fn test_missing_path_defaults_to_empty() {
        let body = r#"{
            "score": 1.0,
            "fields": {
                "user": "bob",
                "num_followers": 3,
                "timestamp": "5m",
                "content": "x",
                "fragment": ["x"]
            }
        }"#;
        let hit: SearchHit = serde_json::from_str(body).unwrap();
        assert_eq!(hit.fields.path, "");
    }
}
