//! Backend for 2.x servers.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use super::backend::{Backend, ProtocolVersion};
use super::result::{Hit, SearchResult, adapt};
use super::transport::HttpTransport;
use crate::error::{Result, Stage};
use crate::query::condition::parse_raw;
use crate::query::{BoolOp, QueryNode};

#[derive(Debug)]
pub struct V2Backend {
    transport: HttpTransport,
}

impl V2Backend {
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
    total: u64,
    #[serde(default)]
    hits: Vec<Hit>,
}

#[async_trait]
impl Backend for V2Backend {
    fn protocol(&self) -> ProtocolVersion {
        ProtocolVersion::V2
    }

    fn translate(&self, node: &QueryNode) -> Result<Value> {
        Ok(match node {
            QueryNode::Raw { query } => parse_raw(query)?,
            QueryNode::Term { field, value } => json!({ "term": { field: value } }),
            QueryNode::Prefix { field, value } => json!({ "prefix": { field: value } }),
            QueryNode::Range {
                from: None,
                to: None,
                ..
            } => json!({ "match_all": {} }),
            QueryNode::Range { field, from, to } => json!({
                "range": {
                    field: {
                        "from": from.as_ref().map(|v| v.to_json()),
                        "to": to.as_ref().map(|v| v.to_json()),
                        "include_lower": true,
                        "include_upper": true,
                    }
                }
            }),
            QueryNode::Bool { op, queries } => {
                let clauses = queries
                    .iter()
                    .map(|q| self.translate(q))
                    .collect::<Result<Vec<_>>>()?;
                match op {
                    BoolOp::And => json!({ "bool": { "must": clauses } }),
                    BoolOp::Or => json!({ "bool": { "should": clauses } }),
                }
            }
        })
    }

    async fn search(&self, index: &str, body: &Value) -> Result<SearchResult> {
        let response: SearchResponse = self
            .transport
            .post_json(Stage::Execute, &[index, "_search"], body)
            .await?;

        Ok(adapt(response.hits.total, response.hits.hits))
    }
}
