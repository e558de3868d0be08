//! Backend for 6.x servers.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::backend::{Backend, ProtocolVersion};
use super::result::{Hit, SearchResult, adapt};
use super::transport::HttpTransport;
use crate::error::{Result, Stage};
use crate::query::condition::parse_raw;
use crate::query::{BoolOp, QueryNode};

#[derive(Debug)]
pub struct V6Backend {
    transport: HttpTransport,
}

impl V6Backend {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(base_url)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Debug, Deserialize)]
struct Hits {
    total: TotalHits,
    #[serde(default)]
    hits: Vec<Hit>,
}

/// 6.x reports a plain count; servers answering with the newer
/// `{"value": n, "relation": "eq"}` object are read the same way.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TotalHits {
    Count(u64),
    Object { value: u64 },
}

impl TotalHits {
    fn value(&self) -> u64 {
        match self {
            TotalHits::Count(value) | TotalHits::Object { value } => *value,
        }
    }
}

#[async_trait]
impl Backend for V6Backend {
    fn protocol(&self) -> ProtocolVersion {
        ProtocolVersion::V6
    }

    fn translate(&self, node: &QueryNode) -> Result<Value> {
        Ok(match node {
            QueryNode::Raw { query } => parse_raw(query)?,
            QueryNode::Term { field, value } => {
                json!({ "term": { field: { "value": value } } })
            }
            QueryNode::Prefix { field, value } => {
                json!({ "prefix": { field: { "value": value } } })
            }
            QueryNode::Range {
                from: None,
                to: None,
                ..
            } => json!({ "match_all": {} }),
            QueryNode::Range { field, from, to } => {
                let mut bounds = Map::new();
                if let Some(from) = from {
                    bounds.insert("gte".to_string(), from.to_json());
                }
                if let Some(to) = to {
                    bounds.insert("lte".to_string(), to.to_json());
                }
                json!({ "range": { field: bounds } })
            }
            QueryNode::Bool { op, queries } => {
                let clauses = queries
                    .iter()
                    .map(|q| self.translate(q))
                    .collect::<Result<Vec<_>>>()?;
                match op {
                    BoolOp::And => json!({ "bool": { "must": clauses } }),
                    BoolOp::Or => json!({
                        "bool": { "should": clauses, "minimum_should_match": 1 }
                    }),
                }
            }
        })
    }

    async fn search(&self, index: &str, body: &Value) -> Result<SearchResult> {
        let response: SearchResponse = self
            .transport
            .post_json(Stage::Execute, &[index, "_search"], body)
            .await?;

        Ok(adapt(response.hits.total.value(), response.hits.hits))
    }
}
