use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Uniform search result, whatever the server version.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub total_hits: u64,
    pub raw_documents: Vec<Value>,
}

impl SearchResult {
    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }

    /// `_source` of each returned hit, in server order.
    pub fn raw_hits(&self) -> &[Value] {
        &self.raw_documents
    }

    pub fn is_empty(&self) -> bool {
        self.total_hits == 0
    }
}

/// One entry of `hits.hits`, in every supported response format.
#[derive(Debug, Deserialize)]
pub(crate) struct Hit {
    #[serde(rename = "_source", default)]
    source: Option<Value>,
}

/// Build the uniform result from a total and the returned hits. The server
/// has already applied the limit, so hits are kept as they are. A hit with
/// no `_source` keeps its position as `null`.
pub(crate) fn adapt(total_hits: u64, hits: Vec<Hit>) -> SearchResult {
    if total_hits == 0 {
        return SearchResult {
            total_hits,
            raw_documents: Vec::new(),
        };
    }

    let raw_documents = hits
        .into_iter()
        .map(|hit| hit.source.unwrap_or(Value::Null))
        .collect();

    SearchResult {
        total_hits,
        raw_documents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hits(value: Value) -> Vec<Hit> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_keeps_server_order() {
        let result = adapt(
            7,
            hits(json!([
                {"_id": "b", "_source": {"n": 2}},
                {"_id": "a", "_source": {"n": 1}}
            ])),
        );

        assert_eq!(result.total_hits(), 7);
        assert_eq!(result.raw_hits(), &[json!({"n": 2}), json!({"n": 1})]);
    }

    #[test]
    fn test_zero_total_is_empty_not_absent() {
        let result = adapt(0, Vec::new());
        assert!(result.is_empty());
        assert_eq!(result.raw_documents, Vec::<Value>::new());

        let serialized = serde_json::to_value(&result).unwrap();
        assert_eq!(serialized["raw_documents"], json!([]));
    }

    #[test]
    fn test_missing_source_is_null() {
        let result = adapt(2, hits(json!([{"_id": "a"}, {"_source": {"n": 1}}])));
        assert_eq!(result.raw_hits(), &[Value::Null, json!({"n": 1})]);
    }
}
